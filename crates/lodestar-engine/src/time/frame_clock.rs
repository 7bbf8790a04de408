use std::time::Instant;

/// Frame timing snapshot.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct FrameTime {
    /// Seconds elapsed between the previous frame's tick and this one.
    pub dt: f32,

    /// Platform tick (milliseconds) taken at the top of the frame.
    pub now_ms: u64,

    /// Number of frames completed before this one.
    pub frame_index: u64,
}

/// Millisecond counter anchored at construction.
#[derive(Debug, Clone)]
pub struct MonotonicTicks {
    origin: Instant,
}

impl MonotonicTicks {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }

    pub fn ticks_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }
}

impl Default for MonotonicTicks {
    fn default() -> Self {
        Self::new()
    }
}

/// Tracks `tprev`/`tnow` and the derived delta time.
///
/// `dt` is `(tnow - tprev) / 1000`. The subtraction saturates, so a tick
/// source that goes backwards yields `dt == 0` rather than a negative value.
#[derive(Debug, Clone)]
pub struct FrameClock {
    tprev: u64,
    tnow: u64,
    dt: f32,
    frame_index: u64,
}

impl FrameClock {
    /// Starts the clock with `tprev = tnow = now_ms` and `dt = 0`.
    pub fn start(now_ms: u64) -> Self {
        Self {
            tprev: now_ms,
            tnow: now_ms,
            dt: 0.0,
            frame_index: 0,
        }
    }

    /// Records the tick for the frame that is starting.
    pub fn tick(&mut self, now_ms: u64) -> FrameTime {
        self.tnow = now_ms;
        self.dt = now_ms.saturating_sub(self.tprev) as f32 / 1000.0;
        self.snapshot()
    }

    /// Closes the current frame: `tprev = tnow`.
    pub fn end_frame(&mut self) {
        self.tprev = self.tnow;
        self.frame_index = self.frame_index.wrapping_add(1);
    }

    pub fn snapshot(&self) -> FrameTime {
        FrameTime {
            dt: self.dt,
            now_ms: self.tnow,
            frame_index: self.frame_index,
        }
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    pub fn now_ms(&self) -> u64 {
        self.tnow
    }

    pub fn prev_ms(&self) -> u64 {
        self.tprev
    }

    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn start_has_zero_dt() {
        let c = FrameClock::start(500);
        assert_eq!(c.dt(), 0.0);
        assert_eq!(c.now_ms(), 500);
        assert_eq!(c.prev_ms(), 500);
    }

    #[test]
    fn dt_is_seconds_between_frames() {
        let mut c = FrameClock::start(1000);
        let ft = c.tick(1016);
        assert!((ft.dt - 0.016).abs() < 1e-6);
        c.end_frame();

        let ft = c.tick(1050);
        assert!((ft.dt - 0.034).abs() < 1e-6);
        assert_eq!(ft.frame_index, 1);
    }

    #[test]
    fn dt_never_negative() {
        let mut c = FrameClock::start(100);
        let mut now = 100;
        for step in [0u64, 3, 0, 17, 1, 250] {
            now += step;
            assert!(c.tick(now).dt >= 0.0);
            c.end_frame();
        }

        // A source going backwards clamps instead of underflowing.
        assert_eq!(c.tick(10).dt, 0.0);
    }

    #[test]
    fn tprev_only_moves_at_end_of_frame() {
        let mut c = FrameClock::start(0);
        c.tick(40);
        assert_eq!(c.prev_ms(), 0);
        c.end_frame();
        assert_eq!(c.prev_ms(), 40);
    }

    #[test]
    fn monotonic_ticks_do_not_decrease() {
        let t = MonotonicTicks::new();
        let a = t.ticks_ms();
        let b = t.ticks_ms();
        assert!(b >= a);
    }
}
