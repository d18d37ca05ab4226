//! Delivery: download and native-share affordances for a rendered card.
//!
//! The platform share surface and the file-save mechanism both sit behind
//! traits; tests drive the coordinator with recording fakes and the demo
//! binary plugs in [`DiskSaver`].

use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::Serialize;
use thiserror::Error;

use crate::{CardConfig, Error, Notice, NoticeHandler, RenderedCard, Result};

/// Content handed to the platform share surface.
#[derive(Debug, Clone, Serialize)]
pub struct SharePayload {
    pub title: String,
    pub text: String,
    pub file_name: String,
    /// PNG attachment bytes
    #[serde(skip)]
    pub data: Vec<u8>,
}

/// Outcome of a platform share attempt.
///
/// User cancellation is deliberately not an [`enum@Error`]: dismissing the
/// share sheet is a silent no-op.
#[derive(Error, Debug)]
pub enum ShareError {
    #[error("share cancelled by user")]
    Cancelled,
    #[error("share failed: {0}")]
    Failed(String),
}

/// A native share surface.
pub trait SharePlatform: Send + Sync {
    /// Whether this platform can share exactly this payload.
    fn can_share(&self, payload: &SharePayload) -> bool;

    /// Invoke the share surface. May block until the user picks a target
    /// or dismisses the sheet.
    fn share(&self, payload: &SharePayload) -> std::result::Result<(), ShareError>;
}

/// A platform with no share surface at all; every share request falls back
/// to download.
pub struct NoSharePlatform;

impl SharePlatform for NoSharePlatform {
    fn can_share(&self, _payload: &SharePayload) -> bool {
        false
    }

    fn share(&self, _payload: &SharePayload) -> std::result::Result<(), ShareError> {
        Err(ShareError::Failed("no share surface available".to_string()))
    }
}

/// Client-local file save of an encoded artifact.
pub trait FileSaver: Send + Sync {
    fn save(&self, file_name: &str, data_url: &str) -> Result<()>;
}

/// Writes artifacts into a directory on disk.
pub struct DiskSaver {
    dir: PathBuf,
}

impl DiskSaver {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }
}

impl FileSaver for DiskSaver {
    fn save(&self, file_name: &str, data_url: &str) -> Result<()> {
        let payload = data_url
            .splitn(2, "base64,")
            .nth(1)
            .ok_or_else(|| Error::SaveError("artifact is not a base64 data URL".to_string()))?;
        let bytes = STANDARD
            .decode(payload)
            .map_err(|e| Error::SaveError(format!("invalid artifact encoding: {}", e)))?;

        // Keep user-supplied names from escaping the target directory
        let safe_name: String = file_name
            .chars()
            .map(|c| if c == '/' || c == '\\' { '_' } else { c })
            .collect();

        std::fs::create_dir_all(&self.dir)
            .map_err(|e| Error::SaveError(format!("cannot create {:?}: {}", self.dir, e)))?;
        let path = self.dir.join(safe_name);
        std::fs::write(&path, bytes)
            .map_err(|e| Error::SaveError(format!("cannot write {:?}: {}", path, e)))
    }
}

/// How a delivery request concluded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryOutcome {
    /// The platform share surface accepted the payload
    Shared,
    /// The artifact went out through the download path
    Downloaded,
    /// The user dismissed the share sheet
    Cancelled,
    /// Another share was already in flight; this trigger was dropped
    Ignored,
}

/// Resets the sharing flag on every exit path.
struct ShareGuard<'a>(&'a AtomicBool);

impl<'a> ShareGuard<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        if flag.swap(true, Ordering::SeqCst) {
            None
        } else {
            Some(Self(flag))
        }
    }
}

impl Drop for ShareGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Exposes the download and share affordances for rendered cards.
pub struct Delivery {
    config: CardConfig,
    platform: Arc<dyn SharePlatform>,
    saver: Arc<dyn FileSaver>,
    on_notice: Option<NoticeHandler>,
    sharing: AtomicBool,
}

impl Delivery {
    pub fn new(
        config: CardConfig,
        platform: Arc<dyn SharePlatform>,
        saver: Arc<dyn FileSaver>,
    ) -> Self {
        Self {
            config,
            platform,
            saver,
            on_notice: None,
            sharing: AtomicBool::new(false),
        }
    }

    /// Register a callback for user-facing notices.
    pub fn on_notice<F>(&mut self, cb: F)
    where
        F: Fn(&Notice) + Send + Sync + 'static,
    {
        self.on_notice = Some(Arc::new(cb));
    }

    /// Remove a previously registered notice callback if any.
    pub fn clear_on_notice(&mut self) {
        self.on_notice = None;
    }

    pub(crate) fn notify(&self, notice: &Notice) {
        if let Some(cb) = &self.on_notice {
            cb(notice);
        }
    }

    /// Filename for the download path, built from both names.
    pub fn download_file_name(&self, requester: &str, recipient: &str) -> String {
        format!(
            "{}_{}_{}.png",
            self.config.filename_prefix, requester, recipient
        )
    }

    /// Filename for the share attachment, built from the requester.
    pub fn share_file_name(&self, requester: &str) -> String {
        format!("{}_{}.png", self.config.filename_prefix, requester)
    }

    /// Trigger a client-local save of the artifact. Always available.
    pub fn download(&self, card: &RenderedCard, requester: &str, recipient: &str) -> Result<()> {
        self.saver
            .save(&self.download_file_name(requester, recipient), &card.data_url)
    }

    /// Offer the artifact to the platform share surface.
    ///
    /// Falls back to [`download`](Self::download) when the platform cannot
    /// share the payload or the share fails for any reason other than user
    /// cancellation. A trigger that arrives while another share is in
    /// flight returns [`DeliveryOutcome::Ignored`] without touching the
    /// platform.
    pub fn share(
        &self,
        card: &RenderedCard,
        requester: &str,
        recipient: &str,
    ) -> Result<DeliveryOutcome> {
        let _guard = match ShareGuard::acquire(&self.sharing) {
            Some(g) => g,
            None => return Ok(DeliveryOutcome::Ignored),
        };

        let payload = SharePayload {
            title: self.config.share_title.clone(),
            text: self
                .config
                .share_text_template
                .replace("{requester}", requester)
                .replace("{recipient}", recipient),
            file_name: self.share_file_name(requester),
            data: card.png.clone(),
        };

        if !self.platform.can_share(&payload) {
            self.notify(&Notice::ShareUnsupported);
            self.download(card, requester, recipient)?;
            return Ok(DeliveryOutcome::Downloaded);
        }

        match self.platform.share(&payload) {
            Ok(()) => Ok(DeliveryOutcome::Shared),
            Err(ShareError::Cancelled) => Ok(DeliveryOutcome::Cancelled),
            Err(ShareError::Failed(e)) => {
                let summary = serde_json::to_string(&payload).unwrap_or_default();
                log::error!(
                    "Sharing failed: {}; payload {}; falling back to download",
                    e,
                    summary
                );
                self.download(card, requester, recipient)?;
                Ok(DeliveryOutcome::Downloaded)
            }
        }
    }
}
