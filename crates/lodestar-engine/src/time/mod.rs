//! Frame timing.
//!
//! The clock works on millisecond ticks supplied by the platform so it can be
//! driven by a scripted source in tests. Usage per loop iteration:
//! `tick(now)` at the top, `end_frame()` after present.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime, MonotonicTicks};
