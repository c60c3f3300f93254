use serde::Serialize;

/// Player settings for a video card: inline, looping, muted, with controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VideoPlayer {
    pub controls: bool,
    pub looping: bool,
    pub muted: bool,
    pub autoplay: bool,
}

impl Default for VideoPlayer {
    fn default() -> Self {
        Self {
            controls: true,
            looping: true,
            muted: true,
            autoplay: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ResultCard {
    Image {
        title: String,
        url: String,
        opens_preview: bool,
    },
    Video {
        title: String,
        url: String,
        player: VideoPlayer,
    },
}

impl ResultCard {
    pub fn url(&self) -> &str {
        match self {
            ResultCard::Image { url, .. } | ResultCard::Video { url, .. } => url,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            ResultCard::Image { title, .. } | ResultCard::Video { title, .. } => title,
        }
    }
}

/// Mount point for result cards. Holds at most one card at a time.
#[derive(Debug, Clone, PartialEq)]
pub struct ResultContainer {
    id: String,
    cards: Vec<ResultCard>,
    renders: u64,
}

impl ResultContainer {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            cards: Vec::new(),
            renders: 0,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn cards(&self) -> &[ResultCard] {
        &self.cards
    }

    pub fn current(&self) -> Option<&ResultCard> {
        self.cards.first()
    }

    /// Number of cards mounted over the container's lifetime.
    pub fn render_count(&self) -> u64 {
        self.renders
    }

    pub fn clear(&mut self) {
        self.cards.clear();
    }

    fn mount(&mut self, card: ResultCard) {
        self.clear();
        self.cards.push(card);
        self.renders += 1;
    }

    /// Click on the mounted card: image cards wired for preview open the
    /// shared overlay. Returns whether the overlay opened.
    pub fn click(&self, overlay: &mut PreviewOverlay) -> bool {
        match self.current() {
            Some(ResultCard::Image {
                url,
                opens_preview: true,
                ..
            }) => {
                overlay.open(url);
                true
            }
            _ => false,
        }
    }
}

/// Clear the container, then mount a still-image card.
pub fn render_image(container: &mut ResultContainer, title: &str, url: &str) {
    container.mount(ResultCard::Image {
        title: title.to_string(),
        url: url.to_string(),
        opens_preview: true,
    });
}

/// Clear the container, then mount an inline video card.
pub fn render_video(container: &mut ResultContainer, title: &str, url: &str) {
    container.mount(ResultCard::Video {
        title: title.to_string(),
        url: url.to_string(),
        player: VideoPlayer::default(),
    });
}

/// Full-screen image preview shared by every image card on the page.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewOverlay {
    showing: Option<String>,
}

impl PreviewOverlay {
    pub fn open(&mut self, url: &str) {
        self.showing = Some(url.to_string());
    }

    pub fn close(&mut self) {
        self.showing = None;
    }

    pub fn showing(&self) -> Option<&str> {
        self.showing.as_deref()
    }
}
