//! Time-based smoothing of drawn values.

use std::time::Duration;

use bon::Builder;

use crate::error::Error;

/// Longest time step fed to the integrator, in milliseconds.
pub const MAX_STEP_MS: f32 = 100.0;

/// Interval between frames while the loop is running (~30 Hz).
pub const TICK_INTERVAL: Duration = Duration::from_millis(33);

/// The loop idles after this many movement + presence cycles without a
/// model update.
pub const IDLE_CYCLES: f32 = 10.0;

/// Fading snippets below this presence are dropped.
pub const REMOVAL_THRESHOLD: f32 = 0.1;

/// The two time constants of the engine.
#[derive(Debug, Clone, Copy, PartialEq, Builder)]
pub struct Timing {
    /// Nominal time for an interpolated value to reach its target (ms).
    #[builder(default = 100.0)]
    pub movement_ms: f32,
    /// Nominal time for a fade in or out (ms).
    #[builder(default = 100.0)]
    pub presence_ms: f32,
}

impl Default for Timing {
    fn default() -> Self {
        Timing::builder().build()
    }
}

impl Timing {
    pub fn validate(&self) -> Result<(), Error> {
        for (name, value) in [("movement", self.movement_ms), ("presence", self.presence_ms)] {
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidTiming { name, value });
            }
        }
        Ok(())
    }

    /// Presence of a fresh snippet: negative, so it waits one movement
    /// duration before it starts fading in.
    pub fn initial_presence(&self) -> f32 {
        -self.movement_ms / self.presence_ms
    }

    /// Time without model updates after which the frame loop stops.
    pub fn idle_after(&self) -> Duration {
        Duration::from_secs_f32(IDLE_CYCLES * (self.movement_ms + self.presence_ms) / 1000.0)
    }
}

/// Clamp a measured frame interval to something the integrator can digest.
pub fn clamp_step(elapsed_ms: f32) -> f32 {
    if elapsed_ms.is_finite() {
        elapsed_ms.clamp(0.0, MAX_STEP_MS)
    } else {
        MAX_STEP_MS
    }
}

/// The smoothed state of one interpolated call site.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Intermediate {
    pub value: f32,
    pub rate: f32,
}

impl Intermediate {
    /// Start at rest on `target`.
    pub fn at(target: f32) -> Self {
        Self {
            value: target,
            rate: 0.0,
        }
    }

    /// A call site whose first value is not known yet; the first finite
    /// target it sees is taken as is.
    pub fn unset() -> Self {
        Self {
            value: f32::NAN,
            rate: 0.0,
        }
    }

    /// Advance toward `target` by `dt` milliseconds with movement duration
    /// `movement` and return the new value.
    ///
    /// Critically damped, and clamped so the value never passes the target.
    pub fn step(&mut self, target: f32, dt: f32, movement: f32) -> f32 {
        if !target.is_finite() {
            return if self.value.is_finite() { self.value } else { 0.0 };
        }
        if !self.value.is_finite() || !self.rate.is_finite() {
            *self = Intermediate::at(target);
            return self.value;
        }

        let error = target - self.value;
        self.rate += dt * (error - 2.0 * self.rate * movement) / (movement * movement);

        let delta = dt * self.rate;
        self.value = if delta > 0.0 {
            target.min(self.value + delta)
        } else {
            target.max(self.value - delta.abs())
        };
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_timing() {
        let timing = Timing::default();
        assert_eq!(timing.movement_ms, 100.0);
        assert_eq!(timing.presence_ms, 100.0);
        assert_eq!(timing.initial_presence(), -1.0);
        assert_eq!(timing.idle_after(), Duration::from_secs(2));
        assert!(timing.validate().is_ok());
    }

    #[test]
    fn test_builder_rejects_non_positive() {
        let timing = Timing::builder().presence_ms(0.0).build();
        assert!(matches!(
            timing.validate(),
            Err(Error::InvalidTiming { name: "presence", .. })
        ));
    }

    #[test]
    fn test_unset_takes_first_finite_target() {
        let mut value = Intermediate::unset();
        assert_eq!(value.step(f32::NAN, 33.0, 100.0), 0.0);
        assert_eq!(value.step(80.0, 33.0, 100.0), 80.0);
        assert_eq!(value, Intermediate::at(80.0));
    }

    #[test]
    fn test_hundred_ms_of_frames_is_partial() {
        // Three ~33 ms frames: the value is on its way, not teleported.
        let mut im = Intermediate::at(0.0);
        let mut v = 0.0;
        for _ in 0..3 {
            v = im.step(100.0, 33.0, 100.0);
        }
        assert!(v > 0.0 && v < 100.0, "got {v}");
    }

    #[test]
    fn test_full_movement_step_lands_on_target() {
        let mut im = Intermediate::at(0.0);
        assert_eq!(im.step(100.0, 100.0, 100.0), 100.0);
    }

    #[test]
    fn test_converges_without_oscillation() {
        let mut im = Intermediate::at(0.0);
        let mut values = Vec::new();
        for _ in 0..40 {
            values.push(im.step(100.0, 33.0, 100.0));
        }
        assert!((values.last().unwrap() - 100.0).abs() < 1.0);
        assert!(values.windows(2).all(|w| w[1] >= w[0]));
        assert!(values.iter().all(|v| *v <= 100.0));
    }

    #[test]
    fn test_no_overshoot_from_above() {
        let mut im = Intermediate::at(50.0);
        for dt in [1.0, 16.0, 33.0, 100.0, 100.0, 7.0, 100.0, 100.0] {
            let v = im.step(-20.0, dt, 100.0);
            assert!(v >= -20.0);
        }
    }

    #[test]
    fn test_no_overshoot_with_small_movement() {
        // A movement duration far below dt makes the raw integrator unstable.
        let mut im = Intermediate::at(0.0);
        for _ in 0..20 {
            let v = im.step(10.0, 100.0, 5.0);
            assert!(v <= 10.0 && v >= 0.0);
        }
    }

    #[test]
    fn test_nan_target_does_not_poison_state() {
        let mut im = Intermediate::at(5.0);
        assert_eq!(im.step(f32::NAN, 33.0, 100.0), 5.0);
        assert_eq!(im, Intermediate::at(5.0));
        let v = im.step(10.0, 33.0, 100.0);
        assert!(v.is_finite() && v > 5.0);
    }

    #[test]
    fn test_clamp_step() {
        assert_eq!(clamp_step(250.0), MAX_STEP_MS);
        assert_eq!(clamp_step(-3.0), 0.0);
        assert_eq!(clamp_step(f32::NAN), MAX_STEP_MS);
        assert_eq!(clamp_step(16.0), 16.0);
    }
}
