//! Diagnostics gate.
//!
//! wgpu reports errors that are not tied to a returned `Result` through the
//! device's uncaptured-error handler. [`Diagnostics::install`] routes those
//! reports into a FIFO queue; [`Diagnostics::check`] drains it after each
//! resource-creating call and turns any pending error into a
//! [`DiagnosticsError`].

use std::collections::VecDeque;
use std::fmt;
use std::sync::{Arc, Mutex, MutexGuard};

/// Environment variable overriding [`DiagnosticsMode`] (`on` / `off`).
pub const DIAGNOSTICS_ENV: &str = "LODESTAR_GPU_DIAGNOSTICS";

/// Whether drained GPU errors fail the calling operation.
#[derive(Debug, Copy, Clone, Default, Eq, PartialEq)]
pub enum DiagnosticsMode {
    /// Pending errors are returned as `Err`.
    #[default]
    Enabled,
    /// Pending errors are drained and logged as warnings only.
    Disabled,
}

impl DiagnosticsMode {
    /// Reads [`DIAGNOSTICS_ENV`]. Unknown values are ignored.
    pub fn from_env() -> Option<Self> {
        let value = std::env::var(DIAGNOSTICS_ENV).ok()?;
        Self::parse(&value)
    }

    fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "on" | "1" | "true" | "enabled" => Some(Self::Enabled),
            "off" | "0" | "false" | "disabled" => Some(Self::Disabled),
            _ => None,
        }
    }
}

/// Classification of a driver-reported error.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum GpuErrorKind {
    Validation,
    OutOfMemory,
    Internal,
    Unrecognized,
}

impl GpuErrorKind {
    pub fn name(self) -> &'static str {
        match self {
            GpuErrorKind::Validation => "GPU_VALIDATION_ERROR",
            GpuErrorKind::OutOfMemory => "GPU_OUT_OF_MEMORY",
            GpuErrorKind::Internal => "GPU_INTERNAL_ERROR",
            GpuErrorKind::Unrecognized => "GPU_UNRECOGNIZED_ERROR",
        }
    }
}

/// One drained error.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct GpuErrorRecord {
    pub kind: GpuErrorKind,
    pub description: String,
}

impl GpuErrorRecord {
    pub fn new(kind: GpuErrorKind, description: impl Into<String>) -> Self {
        Self {
            kind,
            description: description.into(),
        }
    }
}

impl From<&wgpu::Error> for GpuErrorRecord {
    fn from(err: &wgpu::Error) -> Self {
        #[allow(unreachable_patterns)]
        match err {
            wgpu::Error::Validation { description, .. } => {
                Self::new(GpuErrorKind::Validation, description.clone())
            }
            wgpu::Error::OutOfMemory { .. } => Self::new(GpuErrorKind::OutOfMemory, err.to_string()),
            wgpu::Error::Internal { description, .. } => {
                Self::new(GpuErrorKind::Internal, description.clone())
            }
            _ => Self::new(GpuErrorKind::Unrecognized, err.to_string()),
        }
    }
}

impl From<&wgpu::SurfaceError> for GpuErrorRecord {
    fn from(err: &wgpu::SurfaceError) -> Self {
        let kind = match err {
            wgpu::SurfaceError::OutOfMemory => GpuErrorKind::OutOfMemory,
            _ => GpuErrorKind::Unrecognized,
        };
        Self::new(kind, format!("surface acquire: {err}"))
    }
}

impl fmt::Display for GpuErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.kind.name(), self.description)
    }
}

/// One or more GPU errors were pending after `context`.
#[derive(Debug, Clone, thiserror::Error)]
#[error("{context} failed with {} GPU error(s): {}", .errors.len(), summary(.errors))]
pub struct DiagnosticsError {
    pub context: String,
    pub errors: Vec<GpuErrorRecord>,
}

fn summary(errors: &[GpuErrorRecord]) -> String {
    errors
        .iter()
        .map(|e| e.kind.name())
        .collect::<Vec<_>>()
        .join(", ")
}

/// Handle to the pending-error queue. Clones share the queue.
#[derive(Debug, Clone, Default)]
pub struct Diagnostics {
    mode: DiagnosticsMode,
    queue: Arc<Mutex<VecDeque<GpuErrorRecord>>>,
}

impl Diagnostics {
    pub fn new(mode: DiagnosticsMode) -> Self {
        Self {
            mode,
            queue: Arc::default(),
        }
    }

    pub fn mode(&self) -> DiagnosticsMode {
        self.mode
    }

    /// Routes the device's uncaptured errors into this queue.
    pub fn install(&self, device: &wgpu::Device) {
        let queue = Arc::clone(&self.queue);
        device.on_uncaptured_error(Arc::new(move |err: wgpu::Error| {
            lock(&queue).push_back(GpuErrorRecord::from(&err));
        }));
    }

    /// Enqueues an error that did not come through the device handler.
    ///
    /// [`Gpu`](super::Gpu) reports fatal surface acquisition failures here.
    pub fn report(&self, record: GpuErrorRecord) {
        lock(&self.queue).push_back(record);
    }

    /// Pops the oldest pending error.
    pub fn next_error(&self) -> Option<GpuErrorRecord> {
        lock(&self.queue).pop_front()
    }

    pub fn pending(&self) -> usize {
        lock(&self.queue).len()
    }

    /// Drains every pending error.
    ///
    /// Each drained error is logged. With [`DiagnosticsMode::Enabled`] a
    /// non-empty drain is returned as `Err`; the queue is empty afterwards
    /// either way.
    pub fn check(&self, context: &str) -> Result<(), DiagnosticsError> {
        let errors: Vec<GpuErrorRecord> = std::iter::from_fn(|| self.next_error()).collect();
        if errors.is_empty() {
            return Ok(());
        }

        match self.mode {
            DiagnosticsMode::Enabled => {
                for e in &errors {
                    log::error!("{context}: {e}");
                }
                Err(DiagnosticsError {
                    context: context.to_string(),
                    errors,
                })
            }
            DiagnosticsMode::Disabled => {
                for e in &errors {
                    log::warn!("{context}: {e} (diagnostics disabled)");
                }
                Ok(())
            }
        }
    }
}

fn lock(queue: &Mutex<VecDeque<GpuErrorRecord>>) -> MutexGuard<'_, VecDeque<GpuErrorRecord>> {
    // A panic while holding the lock leaves the queue itself intact.
    queue.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn validation(msg: &str) -> GpuErrorRecord {
        GpuErrorRecord::new(GpuErrorKind::Validation, msg)
    }

    #[test]
    fn empty_queue_passes() {
        let d = Diagnostics::new(DiagnosticsMode::Enabled);
        assert!(d.check("noop").is_ok());
    }

    #[test]
    fn check_drains_everything_in_order() {
        let d = Diagnostics::new(DiagnosticsMode::Enabled);
        d.report(validation("first"));
        d.report(GpuErrorRecord::new(GpuErrorKind::OutOfMemory, "second"));

        let err = d.check("create buffer").unwrap_err();
        assert_eq!(err.context, "create buffer");
        assert_eq!(err.errors.len(), 2);
        assert_eq!(err.errors[0].description, "first");
        assert_eq!(err.errors[1].kind, GpuErrorKind::OutOfMemory);
        assert_eq!(d.pending(), 0);

        // Nothing left for the next call.
        assert!(d.check("create buffer").is_ok());
    }

    #[test]
    fn error_message_names_each_kind() {
        let d = Diagnostics::new(DiagnosticsMode::Enabled);
        d.report(validation("bad"));
        d.report(GpuErrorRecord::new(GpuErrorKind::Internal, "boom"));

        let msg = d.check("pipeline").unwrap_err().to_string();
        assert!(msg.contains("pipeline"));
        assert!(msg.contains("GPU_VALIDATION_ERROR"));
        assert!(msg.contains("GPU_INTERNAL_ERROR"));
    }

    #[test]
    fn disabled_mode_drains_without_failing() {
        let d = Diagnostics::new(DiagnosticsMode::Disabled);
        d.report(validation("ignored"));
        assert!(d.check("draw").is_ok());
        assert_eq!(d.pending(), 0);
    }

    #[test]
    fn clones_share_the_queue() {
        let d = Diagnostics::new(DiagnosticsMode::Enabled);
        let other = d.clone();
        other.report(validation("shared"));
        assert_eq!(d.next_error(), Some(validation("shared")));
        assert_eq!(d.next_error(), None);
    }

    #[test]
    fn surface_out_of_memory_fails_the_gate() {
        let d = Diagnostics::new(DiagnosticsMode::Enabled);
        d.report(GpuErrorRecord::from(&wgpu::SurfaceError::OutOfMemory));

        let err = d.check("surface acquire").unwrap_err();
        assert_eq!(err.errors[0].kind, GpuErrorKind::OutOfMemory);
        assert!(err.errors[0].description.starts_with("surface acquire"));
    }

    #[test]
    fn mode_parses_common_spellings() {
        assert_eq!(DiagnosticsMode::parse("OFF"), Some(DiagnosticsMode::Disabled));
        assert_eq!(DiagnosticsMode::parse(" on "), Some(DiagnosticsMode::Enabled));
        assert_eq!(DiagnosticsMode::parse("maybe"), None);
    }
}
