use crate::notify::toast::Toast;
use crate::render::result::{ResultCard, ResultContainer};

// ============================================================================
// HTML fragments: result cards, toasts
// ============================================================================

pub fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

pub fn card_html(card: &ResultCard) -> String {
    match card {
        ResultCard::Image {
            title,
            url,
            opens_preview,
        } => {
            let zoom = if *opens_preview {
                " data-preview=\"1\""
            } else {
                ""
            };
            format!(
                "<div class=\"card result\"><h2>{title}</h2><img src=\"{url}\" alt=\"{title}\"{zoom}></div>",
                title = escape_html(title),
                url = escape_html(url),
                zoom = zoom,
            )
        }
        ResultCard::Video { title, url, player } => {
            let mut attrs = String::new();
            if player.controls {
                attrs.push_str(" controls");
            }
            if player.looping {
                attrs.push_str(" loop");
            }
            if player.muted {
                attrs.push_str(" muted");
            }
            if player.autoplay {
                attrs.push_str(" autoplay");
            }
            format!(
                "<div class=\"card result\"><h2>{title}</h2><video src=\"{url}\"{attrs} playsinline></video></div>",
                title = escape_html(title),
                url = escape_html(url),
                attrs = attrs,
            )
        }
    }
}

/// The container's current content. Empty container renders an empty div.
pub fn container_html(container: &ResultContainer) -> String {
    let inner: String = container.cards().iter().map(card_html).collect();
    format!(
        "<div id=\"{}\">{}</div>",
        escape_html(container.id()),
        inner
    )
}

pub fn toast_html(toast: &Toast) -> String {
    let class = format!("{:?}", toast.severity).to_lowercase();
    format!(
        "<div class=\"toast {}\">{}</div>",
        class,
        escape_html(&toast.message)
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_markup_characters() {
        assert_eq!(
            escape_html(r#"<a href="x">'&'</a>"#),
            "&lt;a href=&quot;x&quot;&gt;&#39;&amp;&#39;&lt;/a&gt;"
        );
    }
}
