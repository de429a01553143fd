//! Per-frame writer of time and pivot
//!
//! Runs once per redraw, after input has moved the tracked object and
//! before the flame material uploads its snapshot.

use std::time::Instant;

use cgmath::Vector3;

use super::params::ParameterState;

/// Source of elapsed animation time.
pub trait FrameClock {
    /// Seconds since the clock started.
    fn elapsed_seconds(&mut self) -> f32;
}

/// Wall-clock time since construction.
#[derive(Debug, Clone, Copy)]
pub struct InstantClock {
    start: Instant,
}

impl InstantClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }
}

impl Default for InstantClock {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameClock for InstantClock {
    fn elapsed_seconds(&mut self) -> f32 {
        self.start.elapsed().as_secs_f32()
    }
}

/// Anything that can report the world position of the flame's anchor object.
pub trait TrackedTransform {
    /// `None` while the object is temporarily absent.
    fn world_position(&self) -> Option<Vector3<f32>>;
}

/// Bookkeeping for trace logging only.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FrameStats {
    pub frame_count: u64,
    pub last_delta: f32,
}

/// Writes `elapsed_time` and `pivot_position` into [`ParameterState`].
pub struct FrameUpdater<C: FrameClock = InstantClock> {
    clock: C,
    last_time: f32,
    stats: FrameStats,
}

impl FrameUpdater<InstantClock> {
    /// Updater driven by real time, starting now.
    pub fn new() -> Self {
        Self::with_clock(InstantClock::new())
    }
}

impl Default for FrameUpdater<InstantClock> {
    fn default() -> Self {
        Self::new()
    }
}

impl<C: FrameClock> FrameUpdater<C> {
    pub fn with_clock(clock: C) -> Self {
        Self {
            clock,
            last_time: 0.0,
            stats: FrameStats::default(),
        }
    }

    /// Advances the parameter state to the current frame.
    ///
    /// Time never goes backwards: a reading below the last written value, a
    /// negative reading or a non-finite one keeps the previous time. An absent
    /// tracked object keeps the previous pivot.
    pub fn update(&mut self, params: &mut ParameterState, tracked: &impl TrackedTransform) {
        let reading = self.clock.elapsed_seconds();
        let now = if reading.is_finite() && reading > self.last_time {
            reading
        } else {
            self.last_time
        };

        self.stats.last_delta = now - self.last_time;
        self.stats.frame_count += 1;
        self.last_time = now;
        params.set_elapsed_time(now);

        match tracked.world_position() {
            Some(position) => params.set_pivot_position(position),
            None => log::trace!("tracked object absent, holding pivot"),
        }

        log::trace!(
            "frame {} t={:.3}s dt={:.4}s",
            self.stats.frame_count,
            now,
            self.stats.last_delta
        );
    }

    pub fn stats(&self) -> FrameStats {
        self.stats
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct ScriptedClock {
        readings: Vec<f32>,
        next: usize,
    }

    impl ScriptedClock {
        fn new(readings: &[f32]) -> Self {
            Self {
                readings: readings.to_vec(),
                next: 0,
            }
        }
    }

    impl FrameClock for ScriptedClock {
        fn elapsed_seconds(&mut self) -> f32 {
            let value = self.readings[self.next.min(self.readings.len() - 1)];
            self.next += 1;
            value
        }
    }

    struct Tracked(Option<Vector3<f32>>);

    impl TrackedTransform for Tracked {
        fn world_position(&self) -> Option<Vector3<f32>> {
            self.0
        }
    }

    #[test]
    fn test_time_never_decreases() {
        let clock = ScriptedClock::new(&[0.1, 0.3, 0.25, 0.5, f32::NAN, -1.0, 0.7]);
        let mut updater = FrameUpdater::with_clock(clock);
        let mut params = ParameterState::default();
        let tracked = Tracked(Some(Vector3::new(0.0, 0.0, 0.0)));

        let mut previous = params.elapsed_time();
        for _ in 0..7 {
            updater.update(&mut params, &tracked);
            let now = params.elapsed_time();
            assert!(now >= previous, "{now} < {previous}");
            previous = now;
        }
        assert_eq!(previous, 0.7);
        assert_eq!(updater.stats().frame_count, 7);
    }

    #[test]
    fn test_pivot_follows_tracked_object_exactly() {
        let mut updater = FrameUpdater::with_clock(ScriptedClock::new(&[0.016]));
        let mut params = ParameterState::default();

        updater.update(&mut params, &Tracked(Some(Vector3::new(2.0, 0.5, -1.0))));
        assert_eq!(params.pivot_position(), Vector3::new(2.0, 0.5, -1.0));
    }

    #[test]
    fn test_absent_object_holds_last_pivot() {
        let mut updater = FrameUpdater::with_clock(ScriptedClock::new(&[0.1, 0.2]));
        let mut params = ParameterState::default();

        updater.update(&mut params, &Tracked(Some(Vector3::new(1.0, 1.0, 1.0))));
        updater.update(&mut params, &Tracked(None));
        assert_eq!(params.pivot_position(), Vector3::new(1.0, 1.0, 1.0));
        assert_eq!(params.elapsed_time(), 0.2);
    }

    #[test]
    fn test_update_leaves_tuned_fields_alone() {
        let mut updater = FrameUpdater::with_clock(ScriptedClock::new(&[1.0]));
        let mut params = ParameterState::default();
        params.set_flame_color([0.1, 0.2, 0.3]);

        updater.update(&mut params, &Tracked(None));
        assert_eq!(params.flame_color(), [0.1, 0.2, 0.3]);
        assert_eq!(updater.stats().last_delta, 1.0);
    }
}
