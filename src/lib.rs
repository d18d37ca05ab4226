//! Lovecard
//!
//! A small pipeline that renders a personalized "agreement card" from two
//! participant names into a shareable PNG, then delivers it through a native
//! share surface or a plain file download.
//!
//! # Pipeline
//!
//! - **Text binding**: participant names are written into every bound slot
//!   of the card, with fixed placeholders for empty input
//! - **Asset inlining**: externally-referenced images inside the card are
//!   fetched concurrently and rewritten as self-contained `data:` URIs
//! - **Rasterization**: a [`Rasterizer`](rendering::Rasterizer) backend
//!   captures the card as a PNG surface
//! - **Delivery**: the artifact is offered for download (always) or native
//!   share (when the platform supports it, with download fallback)
//!
//! # Example
//!
//! ```no_run
//! use lovecard::{Card, CardConfig};
//!
//! # async fn demo() -> lovecard::Result<()> {
//! let mut pipeline = lovecard::new_pipeline(CardConfig::default())?;
//! let mut card = Card::default_template();
//! let rendered = pipeline.generate(&mut card, "Ada", "Grace").await?;
//! pipeline.download(&rendered, "Ada", "Grace")?;
//! # Ok(())
//! # }
//! ```

use std::fmt;
use std::sync::Arc;

pub mod error;
pub use error::{Error, Result};

pub mod card;
pub use card::Card;

pub mod binder;

pub mod inline;
pub use inline::AssetInliner;

pub mod rendering;
pub use rendering::{RasterOptions, RasterSurface, Rasterizer};

pub mod share;
pub use share::{Delivery, DeliveryOutcome, FileSaver, ShareError, SharePayload, SharePlatform};

pub mod pipeline;
pub use pipeline::Pipeline;

/// Configuration for the card pipeline
///
/// Defaults reproduce the stock agreement card: placeholder names for empty
/// input, the `Love_Agreement` filename prefix, and 2x rasterization with a
/// transparent background.
///
/// # Examples
///
/// ```
/// let cfg = lovecard::CardConfig::default();
/// assert_eq!(cfg.default_requester, "Your Name");
/// assert_eq!(cfg.filename_prefix, "Love_Agreement");
/// ```
#[derive(Debug, Clone)]
pub struct CardConfig {
    /// Placeholder shown when the requester name is empty
    pub default_requester: String,
    /// Placeholder shown when the recipient name is empty
    pub default_recipient: String,
    /// Title used for the native share payload
    pub share_title: String,
    /// Message body for the native share payload; `{requester}` and
    /// `{recipient}` are substituted with the resolved names
    pub share_text_template: String,
    /// Prefix for generated filenames
    pub filename_prefix: String,
    /// User agent string sent with asset fetches
    pub user_agent: String,
    /// Timeout for asset fetches in milliseconds
    pub fetch_timeout_ms: u64,
    /// Card viewport used by the built-in raster backend
    pub viewport: Viewport,
    /// Rasterizer configuration
    pub raster: RasterOptions,
}

impl Default for CardConfig {
    fn default() -> Self {
        Self {
            default_requester: "Your Name".to_string(),
            default_recipient: "Their Name".to_string(),
            share_title: "Love Agreement".to_string(),
            share_text_template: "Check out this Love Agreement between {requester} and {recipient}!"
                .to_string(),
            filename_prefix: "Love_Agreement".to_string(),
            user_agent: "Mozilla/5.0 (X11; Linux x86_64) lovecard/0.1".to_string(),
            fetch_timeout_ms: 30000,
            viewport: Viewport::default(),
            raster: RasterOptions::default(),
        }
    }
}

/// Viewport dimensions for the card region
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            width: 640,
            height: 800,
        }
    }
}

/// The two participant roles on the card
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// The person creating the card
    Requester,
    /// The person the card is addressed to
    Recipient,
}

impl Role {
    /// The `data-slot` attribute value that marks display locations bound
    /// to this role.
    pub fn slot(&self) -> &'static str {
        match self {
            Role::Requester => "requester",
            Role::Recipient => "recipient",
        }
    }

    /// The placeholder substituted when this role's input is empty.
    pub fn placeholder<'a>(&self, config: &'a CardConfig) -> &'a str {
        match self {
            Role::Requester => &config.default_requester,
            Role::Recipient => &config.default_recipient,
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.slot())
    }
}

/// The rendered artifact, held in both delivery representations.
///
/// Both fields always come from the same capture: the only constructor
/// consumes one [`RasterSurface`] and derives the pair from it.
#[derive(Debug, Clone)]
pub struct RenderedCard {
    /// `data:image/png;base64,...` string, suitable as a hyperlink target
    pub data_url: String,
    /// Raw PNG bytes, suitable as a share attachment
    pub png: Vec<u8>,
}

impl RenderedCard {
    /// Derive both delivery representations from one raster surface.
    pub fn from_surface(surface: RasterSurface) -> Self {
        use base64::{engine::general_purpose::STANDARD, Engine as _};
        let data_url = format!("data:image/png;base64,{}", STANDARD.encode(&surface.png_data));
        Self {
            data_url,
            png: surface.png_data,
        }
    }
}

/// A user-facing notification raised by the pipeline
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// Generation was requested with an empty name field
    MissingName(Role),
    /// The platform cannot share this payload; a download was started instead
    ShareUnsupported,
    /// The capture backend failed; the generation cycle was aborted
    GenerationFailed,
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::MissingName(_) => f.write_str("Please enter both names first!"),
            Notice::ShareUnsupported => {
                f.write_str("Sharing is not supported here. Downloading instead.")
            }
            Notice::GenerationFailed => {
                f.write_str("Something went wrong while generating the agreement image.")
            }
        }
    }
}

/// Callback invoked for user-facing notices
pub type NoticeHandler = Arc<dyn Fn(&Notice) + Send + Sync>;

/// Create a pipeline with the built-in raster backend, a disk saver writing
/// to the current directory, and no native share surface (share requests
/// fall back to download).
pub fn new_pipeline(config: CardConfig) -> Result<Pipeline<rendering::BlockRasterizer>> {
    let rasterizer = rendering::BlockRasterizer::new(config.viewport);
    let saver = Arc::new(share::DiskSaver::new("."));
    let platform = Arc::new(share::NoSharePlatform);
    Pipeline::new(config, rasterizer, platform, saver)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CardConfig::default();
        assert_eq!(config.default_requester, "Your Name");
        assert_eq!(config.default_recipient, "Their Name");
        assert_eq!(config.raster.scale, 2.0);
        assert!(config.raster.background.is_none());
    }

    #[test]
    fn test_role_slots() {
        assert_eq!(Role::Requester.slot(), "requester");
        assert_eq!(Role::Recipient.slot(), "recipient");
    }

    #[test]
    fn test_rendered_card_pairs_representations() {
        let surface = RasterSurface {
            width: 1,
            height: 1,
            png_data: vec![1, 2, 3],
        };
        let card = RenderedCard::from_surface(surface);
        assert!(card.data_url.starts_with("data:image/png;base64,"));
        assert_eq!(card.png, vec![1, 2, 3]);
    }
}
