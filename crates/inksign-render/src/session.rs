//! Signing session: owns the current document, the ink surface and the
//! compositor, and guards document loads with a generation counter.
//!
//! Loads run in two halves. [`SigningSession::begin_load`] hands out a
//! [`LoadTicket`]; the (possibly slow) decode runs elsewhere; the result is
//! committed through [`SigningSession::commit_load`] only if no newer load
//! was started in the meantime.

use crate::adapter::{AdapterConfig, RasterAdapter};
use crate::compositor::{CompositeResult, Compositor, CompositorConfig};
use crate::error::SignResult;
use crate::ink::RenderToRaster;
use crate::kind::DocumentKind;
use crate::raster::DocumentRaster;
use inksign_core::{InkConfig, InkSurface};
use serde::{Deserialize, Serialize};

/// File name offered to the user for the exported image.
pub const SUGGESTED_FILE_NAME: &str = "signed-document.png";

/// Configuration for every component of a session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SigningConfig {
    pub ink: InkConfig,
    pub adapter: AdapterConfig,
    pub compositor: CompositorConfig,
}

/// Identifies one load request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LoadTicket {
    generation: u64,
}

impl LoadTicket {
    pub fn generation(&self) -> u64 {
        self.generation
    }
}

/// What happened to a finished load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// The document became current.
    Committed { width: u32, height: u32 },
    /// A newer load was started; the result was discarded.
    Superseded,
}

/// One user's signing workflow.
#[derive(Debug)]
pub struct SigningSession {
    adapter: RasterAdapter,
    compositor: Compositor,
    ink: InkSurface,
    document: Option<DocumentRaster>,
    generation: u64,
}

impl SigningSession {
    /// Create a session with the built-in page rasterizer.
    pub fn new(width_hint: u32, config: SigningConfig) -> SignResult<Self> {
        let adapter = RasterAdapter::new(config.adapter);
        Self::with_adapter(width_hint, config.ink, adapter, config.compositor)
    }

    /// Create a session around an already configured adapter.
    pub fn with_adapter(
        width_hint: u32,
        ink: InkConfig,
        adapter: RasterAdapter,
        compositor: CompositorConfig,
    ) -> SignResult<Self> {
        let ink = InkSurface::new(width_hint, ink)?;
        log::info!("Signing session ready, ink surface {}x{}", ink.width(), ink.height());
        Ok(Self {
            adapter,
            compositor: Compositor::new(compositor),
            ink,
            document: None,
            generation: 0,
        })
    }

    pub fn adapter(&self) -> &RasterAdapter {
        &self.adapter
    }

    pub fn ink(&self) -> &InkSurface {
        &self.ink
    }

    pub fn ink_mut(&mut self) -> &mut InkSurface {
        &mut self.ink
    }

    /// The current document, if one has been loaded.
    pub fn document(&self) -> Option<&DocumentRaster> {
        self.document.as_ref()
    }

    /// Start a load. Any ticket issued earlier becomes stale.
    pub fn begin_load(&mut self) -> LoadTicket {
        self.generation += 1;
        LoadTicket {
            generation: self.generation,
        }
    }

    /// True if `ticket` belongs to the most recent load.
    pub fn is_current(&self, ticket: LoadTicket) -> bool {
        ticket.generation == self.generation
    }

    /// Commit the result of a load started with `ticket`.
    ///
    /// A stale ticket is discarded whether the load succeeded or not. A failed
    /// load returns its error and leaves the current document in place.
    pub fn commit_load(
        &mut self,
        ticket: LoadTicket,
        result: SignResult<DocumentRaster>,
    ) -> SignResult<LoadOutcome> {
        if !self.is_current(ticket) {
            log::info!(
                "Discarding load #{} superseded by #{}",
                ticket.generation,
                self.generation
            );
            return Ok(LoadOutcome::Superseded);
        }

        match result {
            Ok(raster) => {
                let (width, height) = raster.dimensions();
                self.document = Some(raster);
                log::info!("Load #{} committed: {}x{}", ticket.generation, width, height);
                Ok(LoadOutcome::Committed { width, height })
            }
            Err(e) => {
                log::warn!("Load #{} failed: {}", ticket.generation, e);
                Err(e)
            }
        }
    }

    /// Decode `bytes` for `ticket` and commit the result.
    pub fn finish_load(
        &mut self,
        ticket: LoadTicket,
        bytes: &[u8],
        declared_kind: &str,
    ) -> SignResult<LoadOutcome> {
        let result = self.adapter.load(bytes, declared_kind);
        self.commit_load(ticket, result)
    }

    /// Load and commit in one step.
    pub fn load(&mut self, bytes: &[u8], declared_kind: &str) -> SignResult<LoadOutcome> {
        let ticket = self.begin_load();
        self.finish_load(ticket, bytes, declared_kind)
    }

    /// Load with a kind detected from the content.
    pub fn load_sniffed(&mut self, bytes: &[u8]) -> SignResult<LoadOutcome> {
        let ticket = self.begin_load();
        let result = self.adapter.load_sniffed(bytes);
        self.commit_load(ticket, result)
    }

    /// Load with an already resolved kind.
    pub fn load_kind(&mut self, bytes: &[u8], kind: DocumentKind) -> SignResult<LoadOutcome> {
        let ticket = self.begin_load();
        let result = self.adapter.load_kind(bytes, kind);
        self.commit_load(ticket, result)
    }

    /// Drop the current document. Pending loads are invalidated too.
    pub fn unload_document(&mut self) {
        self.generation += 1;
        self.document = None;
    }

    /// Flatten the current ink onto the current document.
    pub fn export(&self) -> SignResult<CompositeResult> {
        let signature = self.ink.render_to_raster()?;
        let result = self.compositor.compose(self.document.as_ref(), &signature)?;
        log::info!(
            "Exported {}x{} signed document ({} bytes)",
            result.width(),
            result.height(),
            result.as_bytes().len()
        );
        Ok(result)
    }
}
