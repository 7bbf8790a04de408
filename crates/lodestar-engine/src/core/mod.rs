//! Application-facing contracts.
//!
//! [`App`] is the capability interface the frame loop drives; [`AppCtx`] is
//! what each hook may touch. Neither leaks platform internals.

mod app;
mod ctx;

pub use app::App;
pub use ctx::AppCtx;
