use std::time::{Duration, Instant};

use serde::Serialize;

/// How long a toast stays on screen. Each notice expires on its own clock.
pub const TOAST_TTL: Duration = Duration::from_millis(3500);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

impl Severity {
    pub fn marker(&self) -> &'static str {
        match self {
            Severity::Info => "i",
            Severity::Success => "\u{2713}",
            Severity::Warning => "!",
            Severity::Error => "\u{2717}",
        }
    }
}

#[derive(Debug, Clone)]
pub struct Toast {
    pub id: u64,
    pub message: String,
    pub severity: Severity,
    pub posted_at: Instant,
}

impl Toast {
    pub fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.posted_at) >= ttl
    }
}

/// Fixed on-screen queue of transient notices.
///
/// No batching, no cancellation: a notice only leaves the queue once its own
/// TTL has elapsed.
#[derive(Debug)]
pub struct ToastQueue {
    notices: Vec<Toast>,
    next_id: u64,
    seen: u64,
    ttl: Duration,
}

impl Default for ToastQueue {
    fn default() -> Self {
        Self::with_ttl(TOAST_TTL)
    }
}

impl ToastQueue {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_ttl(ttl: Duration) -> Self {
        Self {
            notices: Vec::new(),
            next_id: 0,
            seen: 0,
            ttl,
        }
    }

    pub fn toast(&mut self, message: &str, severity: Severity) -> u64 {
        self.toast_at(message, severity, Instant::now())
    }

    pub fn toast_at(&mut self, message: &str, severity: Severity, now: Instant) -> u64 {
        self.expire(now);
        let id = self.next_id;
        self.next_id += 1;
        log::info!("[toast:{:?}] {}", severity, message);
        self.notices.push(Toast {
            id,
            message: message.to_string(),
            severity,
            posted_at: now,
        });
        id
    }

    /// Notices still visible at `now`, oldest first.
    pub fn active(&self, now: Instant) -> Vec<&Toast> {
        self.notices
            .iter()
            .filter(|t| !t.is_expired(now, self.ttl))
            .collect()
    }

    /// Drop every notice whose TTL has elapsed and return them.
    pub fn expire(&mut self, now: Instant) -> Vec<Toast> {
        let ttl = self.ttl;
        let (expired, kept): (Vec<Toast>, Vec<Toast>) = self
            .notices
            .drain(..)
            .partition(|t| t.is_expired(now, ttl));
        self.notices = kept;
        expired
    }

    /// Notices posted since the previous call that are still on screen,
    /// for consumers that print rather than display.
    pub fn take_unseen(&mut self) -> Vec<Toast> {
        self.take_unseen_at(Instant::now())
    }

    pub fn take_unseen_at(&mut self, now: Instant) -> Vec<Toast> {
        let seen = self.seen;
        self.seen = self.next_id;
        self.notices
            .iter()
            .filter(|t| t.id >= seen && !t.is_expired(now, self.ttl))
            .cloned()
            .collect()
    }

    /// Every queued notice. Expired ones linger until the next post.
    pub fn all(&self) -> &[Toast] {
        &self.notices
    }

    pub fn len(&self) -> usize {
        self.notices.len()
    }

    pub fn is_empty(&self) -> bool {
        self.notices.is_empty()
    }
}
