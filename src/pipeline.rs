//! The generation cycle: validate, bind, inline, capture, deliver.
//!
//! The pipeline is a plain command surface: a UI layer dispatches into it,
//! it never hooks events itself. Per cycle it walks
//! `Idle -> Validating -> (blocked | Capturing) -> Ready -> Sharing |
//! Downloading -> Idle`.

use std::sync::Arc;

use url::Url;

use crate::binder;
use crate::rendering::Rasterizer;
use crate::share::{Delivery, DeliveryOutcome, FileSaver, SharePlatform};
use crate::{AssetInliner, Card, CardConfig, Error, Notice, RenderedCard, Result, Role};

/// Pipeline phase, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Validating,
    Capturing,
    Ready,
    Sharing,
    Downloading,
}

/// Drives one card through generation and delivery.
pub struct Pipeline<R: Rasterizer> {
    config: CardConfig,
    inliner: AssetInliner,
    rasterizer: R,
    delivery: Delivery,
    phase: Phase,
}

impl<R: Rasterizer> Pipeline<R> {
    pub fn new(
        config: CardConfig,
        rasterizer: R,
        platform: Arc<dyn SharePlatform>,
        saver: Arc<dyn FileSaver>,
    ) -> Result<Self> {
        let inliner = AssetInliner::new(&config)?;
        let delivery = Delivery::new(config.clone(), platform, saver);
        Ok(Self {
            config,
            inliner,
            rasterizer,
            delivery,
            phase: Phase::Idle,
        })
    }

    /// Resolve relative image sources in the card against `base`.
    pub fn with_asset_base(mut self, base: Url) -> Self {
        self.inliner.set_base(base);
        self
    }

    /// Register a callback for user-facing notices.
    pub fn on_notice<F>(&mut self, cb: F)
    where
        F: Fn(&Notice) + Send + Sync + 'static,
    {
        self.delivery.on_notice(cb);
    }

    /// Remove a previously registered notice callback if any.
    pub fn clear_on_notice(&mut self) {
        self.delivery.clear_on_notice();
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    fn set_phase(&mut self, next: Phase) {
        log::debug!("pipeline phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }

    /// Run one generation cycle over the card.
    ///
    /// Raw emptiness of either name blocks generation before anything is
    /// mutated or captured (whitespace-only input passes and binds to the
    /// placeholders). Binding and inlining always complete before the
    /// capture backend sees the card.
    pub async fn generate(
        &mut self,
        card: &mut Card,
        requester: &str,
        recipient: &str,
    ) -> Result<RenderedCard> {
        self.set_phase(Phase::Validating);
        for (raw, role) in [(requester, Role::Requester), (recipient, Role::Recipient)] {
            if raw.is_empty() {
                self.delivery.notify(&Notice::MissingName(role));
                self.set_phase(Phase::Idle);
                return Err(Error::MissingName(role));
            }
        }

        binder::bind(card, requester, recipient, &self.config);

        self.set_phase(Phase::Capturing);
        if let Err(e) = self.inliner.inline(card).await {
            self.delivery.notify(&Notice::GenerationFailed);
            self.set_phase(Phase::Idle);
            return Err(e);
        }

        let surface = match self.rasterizer.rasterize(card, &self.config.raster) {
            Ok(s) => s,
            Err(e) => {
                self.delivery.notify(&Notice::GenerationFailed);
                self.set_phase(Phase::Idle);
                return Err(e);
            }
        };

        self.set_phase(Phase::Ready);
        Ok(RenderedCard::from_surface(surface))
    }

    /// Save the artifact through the download path.
    pub fn download(
        &mut self,
        card: &RenderedCard,
        requester: &str,
        recipient: &str,
    ) -> Result<()> {
        self.set_phase(Phase::Downloading);
        let (req, rec) = self.resolved_names(requester, recipient);
        let res = self.delivery.download(card, &req, &rec);
        self.set_phase(Phase::Idle);
        res
    }

    /// Offer the artifact to the platform share surface, with download
    /// fallback semantics (see [`Delivery::share`]).
    pub fn share(
        &mut self,
        card: &RenderedCard,
        requester: &str,
        recipient: &str,
    ) -> Result<DeliveryOutcome> {
        self.set_phase(Phase::Sharing);
        let (req, rec) = self.resolved_names(requester, recipient);
        let res = self.delivery.share(card, &req, &rec);
        self.set_phase(Phase::Idle);
        res
    }

    /// Direct access to the delivery coordinator.
    pub fn delivery(&self) -> &Delivery {
        &self.delivery
    }

    /// The trimmed-or-placeholder names delivery will use.
    pub fn resolved_names(&self, requester: &str, recipient: &str) -> (String, String) {
        (
            binder::resolve_name(requester, Role::Requester, &self.config).to_string(),
            binder::resolve_name(recipient, Role::Recipient, &self.config).to_string(),
        )
    }
}
