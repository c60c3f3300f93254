use std::io::Read;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicU8, Ordering};

/// Integer upload percentage, `sent / total * 100` rounded, clamped to 100.
pub fn percent_of(sent: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    let pct = (sent as f64 / total as f64 * 100.0).round();
    pct.clamp(0.0, 100.0) as u8
}

type Listener = Arc<dyn Fn(u8) + Send + Sync>;

/// Shared upload-progress cell. The form's progress indicator reads it;
/// the transport writes it from whatever thread the body is streamed on.
#[derive(Clone, Default)]
pub struct ProgressHandle {
    percent: Arc<AtomicU8>,
    listener: Option<Listener>,
}

impl std::fmt::Debug for ProgressHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressHandle")
            .field("percent", &self.percent())
            .field("listener", &self.listener.is_some())
            .finish()
    }
}

impl ProgressHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Attach an observer notified on every percentage change.
    pub fn with_listener(mut self, listener: impl Fn(u8) + Send + Sync + 'static) -> Self {
        self.listener = Some(Arc::new(listener));
        self
    }

    pub fn percent(&self) -> u8 {
        self.percent.load(Ordering::Relaxed)
    }

    pub fn reset(&self) {
        self.percent.store(0, Ordering::Relaxed);
    }

    pub fn report(&self, sent: u64, total: u64) {
        if total == 0 {
            return;
        }
        let pct = percent_of(sent, total);
        let prev = self.percent.swap(pct, Ordering::Relaxed);
        if prev != pct {
            if let Some(listener) = &self.listener {
                listener(pct);
            }
        }
    }
}

/// Reader wrapper counting bytes handed to the HTTP body.
///
/// All file parts of one request share `sent`, so progress is reported over
/// the combined size of every file in the form.
pub struct ProgressReader<R> {
    inner: R,
    sent: Arc<AtomicU64>,
    total: u64,
    handle: ProgressHandle,
}

impl<R: Read> ProgressReader<R> {
    pub fn new(inner: R, sent: Arc<AtomicU64>, total: u64, handle: ProgressHandle) -> Self {
        Self {
            inner,
            sent,
            total,
            handle,
        }
    }
}

impl<R: Read> Read for ProgressReader<R> {
    fn read(&mut self, buf: &mut [u8]) -> std::io::Result<usize> {
        let n = self.inner.read(buf)?;
        if n > 0 {
            let sent = self.sent.fetch_add(n as u64, Ordering::Relaxed) + n as u64;
            self.handle.report(sent, self.total);
        }
        Ok(n)
    }
}
