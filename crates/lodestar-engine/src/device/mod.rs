//! GPU device, surface and diagnostics.
//!
//! This module is responsible for:
//! - creating the wgpu Instance/Adapter/Device/Queue
//! - creating and configuring the Surface (swapchain) plus its depth buffer
//! - acquiring, clearing and presenting frames
//! - collecting driver-reported errors behind the diagnostics gate

mod diagnostics;
mod gpu;
mod init;
mod surface;

pub use diagnostics::{
    Diagnostics, DiagnosticsError, DiagnosticsMode, GpuErrorKind, GpuErrorRecord, DIAGNOSTICS_ENV,
};
pub use gpu::{Gpu, GpuFrame};
pub use init::GpuInit;
pub use surface::SurfaceErrorAction;
