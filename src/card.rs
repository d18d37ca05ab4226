//! The agreement card: an HTML fragment with bound display slots.
//!
//! The card is held as its backing markup. Queries (images, slot contents)
//! go through `scraper`; in-place edits are performed as targeted surgery on
//! the markup itself so that the fragment stays byte-faithful apart from the
//! attributes and text being rewritten.
//!
//! Display locations are leaf elements carrying `data-slot="requester"` or
//! `data-slot="recipient"`. A role may be bound to any number of locations
//! (the document body copy and the signature line in the stock template).

use std::sync::LazyLock;

use regex::Regex;
use scraper::{Html, Selector};

use crate::Role;

/// Slot elements must be leaves, so their content is everything up to the
/// closing tag.
static REQUESTER_SLOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<[^>]*\bdata-slot="requester"[^>]*>)[^<]*(</)"#).unwrap()
});

static RECIPIENT_SLOT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(<[^>]*\bdata-slot="recipient"[^>]*>)[^<]*(</)"#).unwrap()
});

fn slot_re(role: Role) -> &'static Regex {
    match role {
        Role::Requester => &REQUESTER_SLOT_RE,
        Role::Recipient => &RECIPIENT_SLOT_RE,
    }
}

/// Escape text for insertion into markup.
pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}

/// The visual region that gets rasterized into the shareable image.
#[derive(Debug, Clone)]
pub struct Card {
    html: String,
}

impl Card {
    /// Wrap an HTML fragment as a card.
    pub fn from_html(html: impl Into<String>) -> Self {
        Self { html: html.into() }
    }

    /// The stock agreement card.
    pub fn default_template() -> Self {
        Self::from_html(DEFAULT_TEMPLATE)
    }

    /// The card's current markup.
    pub fn html(&self) -> &str {
        &self.html
    }

    /// Source attributes of every image element in the card, in document
    /// order.
    pub fn image_sources(&self) -> Vec<String> {
        let doc = Html::parse_fragment(&self.html);
        let sel = Selector::parse("img[src]").unwrap();
        doc.select(&sel)
            .filter_map(|n| n.value().attr("src").map(str::to_string))
            .collect()
    }

    /// Replace one image source attribute with another. `from` is the DOM
    /// value (as [`image_sources`](Self::image_sources) reports it), so the
    /// markup is probed under both quote styles and under the
    /// entity-escaped spelling of the value. Returns whether any occurrence
    /// was rewritten.
    pub fn rewrite_image_source(&mut self, from: &str, to: &str) -> bool {
        let escaped = escape_html(from);
        let mut spellings = vec![from.to_string()];
        if escaped != from {
            spellings.push(escaped);
        }

        let mut rewritten = false;
        for spelling in &spellings {
            for quote in ['"', '\''] {
                let needle = format!("src={quote}{spelling}{quote}");
                if self.html.contains(&needle) {
                    let replacement = format!("src={quote}{to}{quote}");
                    self.html = self.html.replace(&needle, &replacement);
                    rewritten = true;
                }
            }
        }
        rewritten
    }

    /// Write `value` into every display location bound to `role`. The value
    /// is escaped on the way in.
    pub fn set_slot_text(&mut self, role: Role, value: &str) {
        let escaped = escape_html(value);
        self.html = slot_re(role)
            .replace_all(&self.html, |caps: &regex::Captures| {
                format!("{}{}{}", &caps[1], escaped, &caps[2])
            })
            .into_owned();
    }

    /// Current text of every display location bound to `role`, in document
    /// order.
    pub fn slot_texts(&self, role: Role) -> Vec<String> {
        let doc = Html::parse_fragment(&self.html);
        let sel = Selector::parse(&format!("[data-slot=\"{}\"]", role.slot())).unwrap();
        doc.select(&sel)
            .map(|n| n.text().collect::<String>())
            .collect()
    }
}

/// The stock card markup: title, body copy naming both participants, and a
/// signature line per participant.
const DEFAULT_TEMPLATE: &str = r#"<div class="agreement-card">
  <img class="seal" src="assets/heart-seal.png" alt="seal">
  <h1>Love Agreement</h1>
  <p>This document certifies that <span data-slot="requester">Your Name</span>
  and <span data-slot="recipient">Their Name</span> agree to the terms of
  affection set out below, effective immediately and renewable forever.</p>
  <p>Both parties promise to share snacks, split playlists, and laugh at each
  other's worst jokes without exception.</p>
  <p class="signature">Signed, <span data-slot="requester">Your Name</span></p>
  <p class="signature">Accepted, <span data-slot="recipient">Their Name</span></p>
</div>
"#;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_slot_text_updates_every_location() {
        let mut card = Card::default_template();
        card.set_slot_text(Role::Requester, "Ada");
        let texts = card.slot_texts(Role::Requester);
        assert_eq!(texts.len(), 2);
        assert!(texts.iter().all(|t| t == "Ada"));
        // The other role is untouched
        assert!(card
            .slot_texts(Role::Recipient)
            .iter()
            .all(|t| t == "Their Name"));
    }

    #[test]
    fn set_slot_text_is_repeatable() {
        let mut card = Card::default_template();
        card.set_slot_text(Role::Recipient, "Grace");
        card.set_slot_text(Role::Recipient, "Grace Hopper");
        assert!(card
            .slot_texts(Role::Recipient)
            .iter()
            .all(|t| t == "Grace Hopper"));
    }

    #[test]
    fn slot_text_is_escaped() {
        let mut card = Card::from_html(r#"<span data-slot="requester">x</span>"#);
        card.set_slot_text(Role::Requester, "<b>Ada & co</b>");
        assert!(card.html().contains("&lt;b&gt;Ada &amp; co&lt;/b&gt;"));
        // scraper unescapes on read
        assert_eq!(card.slot_texts(Role::Requester), vec!["<b>Ada & co</b>"]);
    }

    #[test]
    fn image_sources_and_rewrite() {
        let mut card = Card::from_html(
            r#"<div><img src="a.png"><img src="data:image/png;base64,AA=="></div>"#,
        );
        assert_eq!(
            card.image_sources(),
            vec!["a.png", "data:image/png;base64,AA=="]
        );
        assert!(card.rewrite_image_source("a.png", "data:image/png;base64,BB=="));
        assert_eq!(card.image_sources()[0], "data:image/png;base64,BB==");
        assert!(!card.rewrite_image_source("never-there.png", "x"));
    }

    #[test]
    fn rewrite_matches_entity_escaped_sources() {
        let mut card =
            Card::from_html(r#"<div><img src="http://h/a.png?a=1&amp;b=2"></div>"#);
        // scraper reports the unescaped DOM value
        let src = card.image_sources()[0].clone();
        assert_eq!(src, "http://h/a.png?a=1&b=2");
        assert!(card.rewrite_image_source(&src, "data:image/png;base64,AA=="));
        assert_eq!(card.image_sources(), vec!["data:image/png;base64,AA=="]);
    }

    #[test]
    fn rewrite_matches_single_quoted_attributes() {
        let mut card = Card::from_html(r#"<div><img src='a.png'></div>"#);
        assert!(card.rewrite_image_source("a.png", "data:image/png;base64,AA=="));
        assert_eq!(card.image_sources(), vec!["data:image/png;base64,AA=="]);
    }
}
