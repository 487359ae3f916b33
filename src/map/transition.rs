use std::time::Duration;

/// Cubic ease-in-out over t in [0, 1]
pub fn ease_cubic_in_out(t: f64) -> f64 {
    let t = t.clamp(0.0, 1.0);
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

/// A value moving toward a target over a fixed duration.
///
/// Retargeting mid-flight starts a new tween from the current value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    elapsed: Duration,
    duration: Duration,
}

impl Tween {
    pub fn at(value: f64) -> Self {
        Self {
            from: value,
            to: value,
            elapsed: Duration::ZERO,
            duration: Duration::ZERO,
        }
    }

    pub fn value(&self) -> f64 {
        if self.elapsed >= self.duration {
            return self.to;
        }
        let t = self.elapsed.as_secs_f64() / self.duration.as_secs_f64();
        self.from + (self.to - self.from) * ease_cubic_in_out(t)
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn is_running(&self) -> bool {
        self.elapsed < self.duration
    }

    pub fn retarget(&mut self, to: f64, duration: Duration) {
        *self = Self {
            from: self.value(),
            to,
            elapsed: Duration::ZERO,
            duration,
        };
    }

    pub fn snap(&mut self, to: f64) {
        *self = Self::at(to);
    }

    pub fn tick(&mut self, dt: Duration) {
        self.elapsed = (self.elapsed + dt).min(self.duration);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ease_endpoints() {
        assert_eq!(ease_cubic_in_out(0.0), 0.0);
        assert_eq!(ease_cubic_in_out(0.5), 0.5);
        assert_eq!(ease_cubic_in_out(1.0), 1.0);
    }

    #[test]
    fn test_tween_reaches_target() {
        let mut tween = Tween::at(0.0);
        tween.retarget(10.0, Duration::from_millis(250));
        assert!(tween.is_running());
        tween.tick(Duration::from_millis(125));
        assert_eq!(tween.value(), 5.0);
        tween.tick(Duration::from_millis(500));
        assert!(!tween.is_running());
        assert_eq!(tween.value(), 10.0);
    }

    #[test]
    fn test_retarget_starts_from_current() {
        let mut tween = Tween::at(0.0);
        tween.retarget(10.0, Duration::from_millis(100));
        tween.tick(Duration::from_millis(50));
        tween.retarget(2.0, Duration::from_millis(100));
        assert_eq!(tween.value(), 5.0);
        assert_eq!(tween.target(), 2.0);
    }
}
