//! Distance-based throttling of real-time stroke updates.

use kurbo::Point;

/// Decides when an in-progress stroke is worth re-broadcasting.
///
/// The reference point only moves when an update actually goes out, so slow
/// drags still emit once the accumulated travel passes the threshold.
#[derive(Debug, Clone, Copy)]
pub struct RealtimeThrottle {
    min_distance: f64,
    last_sent: Option<Point>,
}

impl RealtimeThrottle {
    pub fn new(min_distance: f64) -> Self {
        Self {
            min_distance,
            last_sent: None,
        }
    }

    /// Record a point as already sent.
    pub fn anchor(&mut self, point: Point) {
        self.last_sent = Some(point);
    }

    /// Point of the last emitted update.
    pub fn last_sent(&self) -> Option<Point> {
        self.last_sent
    }

    /// Returns true, and re-anchors, if `point` is strictly farther than the
    /// threshold from the last sent point. An unanchored throttle always emits.
    pub fn should_emit(&mut self, point: Point) -> bool {
        let due = self
            .last_sent
            .is_none_or(|last| last.distance(point) > self.min_distance);
        if due {
            self.last_sent = Some(point);
        }
        due
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unanchored_emits() {
        let mut throttle = RealtimeThrottle::new(5.0);
        assert!(throttle.should_emit(Point::new(1.0, 1.0)));
        assert_eq!(throttle.last_sent(), Some(Point::new(1.0, 1.0)));
    }

    #[test]
    fn test_threshold_is_strict() {
        let mut throttle = RealtimeThrottle::new(5.0);
        throttle.anchor(Point::ZERO);
        assert!(!throttle.should_emit(Point::new(3.0, 4.0)));
        assert!(throttle.should_emit(Point::new(3.0, 4.1)));
    }

    #[test]
    fn test_accumulates_until_due() {
        let mut throttle = RealtimeThrottle::new(5.0);
        throttle.anchor(Point::ZERO);

        let emitted: Vec<bool> = (1..=12)
            .map(|i| throttle.should_emit(Point::new(f64::from(i), 0.0)))
            .collect();

        // Fires at x=6 then x=12
        assert_eq!(emitted.iter().filter(|e| **e).count(), 2);
        assert!(emitted[5]);
        assert!(emitted[11]);
        assert_eq!(throttle.last_sent(), Some(Point::new(12.0, 0.0)));
    }
}
