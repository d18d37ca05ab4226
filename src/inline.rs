//! Asset inlining: rewrite externally-referenced images as `data:` URIs.
//!
//! Rasterizer backends cannot be handed a card that still points at remote
//! images without risking a tainted or incomplete capture, so every image
//! source is fetched and re-encoded as a self-contained data URI before the
//! capture runs. All fetches for one pass run concurrently and the pass
//! completes only when every conversion has either landed or been skipped.

use std::time::Duration;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use futures::future::join_all;
use url::Url;

use crate::{Card, CardConfig, Error, Result};

/// Converts a card's external image references into inline data URIs.
pub struct AssetInliner {
    client: reqwest::Client,
    base: Option<Url>,
}

impl AssetInliner {
    /// Build an inliner from the pipeline configuration.
    pub fn new(config: &CardConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_millis(config.fetch_timeout_ms))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| {
                Error::InitializationError(format!("Failed to build HTTP client: {}", e))
            })?;
        Ok(Self { client, base: None })
    }

    /// Resolve relative image sources against `base`.
    pub fn with_base(mut self, base: Url) -> Self {
        self.set_base(base);
        self
    }

    pub fn set_base(&mut self, base: Url) {
        self.base = Some(base);
    }

    /// Convert every non-inline image source in the card.
    ///
    /// Conversions run concurrently; the returned future resolves once all
    /// of them have completed. A failed conversion is logged and skipped,
    /// leaving that image externally referenced (the capture backend may
    /// then degrade or fail on it). A card with no images resolves
    /// immediately with no network activity and no mutation.
    pub async fn inline(&self, card: &mut Card) -> Result<()> {
        let sources: Vec<String> = card
            .image_sources()
            .into_iter()
            .filter(|src| !src.starts_with("data:"))
            .collect();
        if sources.is_empty() {
            return Ok(());
        }

        let fetches = sources.iter().map(|src| self.fetch_data_uri(src));
        let results = join_all(fetches).await;

        for (src, result) in sources.iter().zip(results) {
            match result {
                Ok(data_uri) => {
                    if !card.rewrite_image_source(src, &data_uri) {
                        log::warn!(
                            "Fetched {} but found no matching src attribute to rewrite; \
                             leaving it external",
                            src
                        );
                    }
                }
                Err(e) => {
                    log::warn!("Failed to inline image {}: {}; leaving it external", src, e);
                }
            }
        }
        Ok(())
    }

    async fn fetch_data_uri(&self, src: &str) -> Result<String> {
        let target = self.resolve(src)?;
        let resp = self
            .client
            .get(target.clone())
            .send()
            .await
            .map_err(|e| Error::NetworkError(format!("Failed to fetch {}: {}", target, e)))?;
        if !resp.status().is_success() {
            return Err(Error::NetworkError(format!(
                "{} returned {}",
                target,
                resp.status()
            )));
        }

        let mime = resp
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|s| s.split(';').next().unwrap_or(s).trim().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        let bytes = resp
            .bytes()
            .await
            .map_err(|e| Error::NetworkError(format!("Failed to read {}: {}", target, e)))?;

        Ok(format!("data:{};base64,{}", mime, STANDARD.encode(&bytes)))
    }

    fn resolve(&self, src: &str) -> Result<Url> {
        match Url::parse(src) {
            Ok(u) => Ok(u),
            Err(_) => match &self.base {
                Some(base) => base.join(src).map_err(|e| {
                    Error::NetworkError(format!("Cannot resolve {}: {}", src, e))
                }),
                None => Err(Error::NetworkError(format!(
                    "Relative image source {} with no base URL",
                    src
                ))),
            },
        }
    }
}
