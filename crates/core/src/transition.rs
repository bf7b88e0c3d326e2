use std::time::Duration;

/// Symmetric cubic easing, slow at both ends.
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0) * 2.0;
    if t <= 1.0 {
        t * t * t / 2.0
    } else {
        let t = t - 2.0;
        (t * t * t + 2.0) / 2.0
    }
}

/// Wall-clock driven progress of one zoom transition. The clock only owns
/// `t`; the geometry being interpolated lives with the renderer.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    duration: Duration,
    elapsed: Duration,
}

impl Transition {
    pub fn new(duration: Duration) -> Self {
        Self {
            duration,
            elapsed: Duration::ZERO,
        }
    }

    pub fn tick(&mut self, dt: Duration) {
        self.elapsed = self.elapsed.saturating_add(dt).min(self.duration);
    }

    /// Linear progress in `[0, 1]`. A zero duration is complete at once.
    pub fn progress(&self) -> f64 {
        if self.duration.is_zero() {
            1.0
        } else {
            self.elapsed.as_secs_f64() / self.duration.as_secs_f64()
        }
    }

    pub fn eased(&self) -> f64 {
        ease_cubic_in_out(self.progress())
    }

    pub fn is_complete(&self) -> bool {
        self.elapsed >= self.duration
    }

    pub fn duration(&self) -> Duration {
        self.duration
    }
}
