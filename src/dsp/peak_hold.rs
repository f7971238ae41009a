//! Peak-hold tracking for level meters.
//!
//! Retains the most recent local maximum of a level signal for a short time
//! after the signal has receded, so the eye can catch transients that the
//! bar itself has already dropped below.

/// How long a captured peak stays on screen before it expires, in seconds.
pub const HOLD_SECS: f64 = 2.0;

/// Peak marker state, advanced once per analysis block.
///
/// The marker moves through three regimes:
/// - `Idle`: no peak shown; waiting for the level to start rising again.
/// - `Rising`: the level is climbing, so the previous local maximum has not
///   happened yet. Nothing is drawn, but the next fall will capture a peak.
/// - `Holding`: a local maximum was just passed; its value is displayed until
///   it is overtaken by a higher one, cancelled by a new rise, or expires
///   after [`HOLD_SECS`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PeakHold {
    /// Expired or never captured; nothing is drawn.
    Idle,
    /// The level is rising; armed to capture the next local maximum.
    Rising,
    /// Displaying a captured local maximum.
    Holding {
        /// The captured level.
        value: f32,
        /// Clock time at which the capture happened, in seconds.
        set_at: f64,
    },
}

impl PeakHold {
    /// Advances the state for one block.
    ///
    /// `amplitude` is the level just computed for this block, `previous` the
    /// level of the block before it, and `now` the current monotonic clock in
    /// seconds (the same clock must be used for every call).
    pub fn update(&mut self, amplitude: f32, previous: f32, now: f64) {
        if amplitude < previous {
            // The level just passed a local maximum. Capture it unless we are
            // idle, or already holding something at least as high.
            match *self {
                PeakHold::Rising => {
                    *self = PeakHold::Holding {
                        value: previous,
                        set_at: now,
                    };
                }
                PeakHold::Holding { value, .. } if value < previous => {
                    *self = PeakHold::Holding {
                        value: previous,
                        set_at: now,
                    };
                }
                _ => {}
            }
        } else if amplitude > previous {
            // A rise always cancels whatever was held.
            *self = PeakHold::Rising;
        }

        // Held peaks expire; Idle and Rising never do.
        if let PeakHold::Holding { set_at, .. } = *self {
            if now - set_at > HOLD_SECS {
                *self = PeakHold::Idle;
            }
        }
    }

    /// The level at which to draw the marker, if one should be drawn at all.
    #[inline]
    pub fn marker(&self) -> Option<f32> {
        match *self {
            PeakHold::Holding { value, .. } => Some(value),
            _ => None,
        }
    }

    /// Returns true when no peak is shown and none is being tracked.
    #[inline]
    pub fn is_idle(&self) -> bool {
        matches!(self, PeakHold::Idle)
    }
}

impl Default for PeakHold {
    fn default() -> Self {
        PeakHold::Idle
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_starts_idle() {
        let peak = PeakHold::default();
        assert!(peak.is_idle());
        assert_eq!(peak.marker(), None);
    }

    #[test]
    fn test_falling_from_idle_captures_nothing() {
        let mut peak = PeakHold::Idle;
        peak.update(0.2, 0.5, 0.0);
        assert_eq!(peak, PeakHold::Idle);
    }

    #[test]
    fn test_rise_arms() {
        let mut peak = PeakHold::Idle;
        peak.update(0.5, 0.1, 0.0);
        assert_eq!(peak, PeakHold::Rising);
        assert_eq!(peak.marker(), None);
    }

    #[test]
    fn test_fall_after_rise_captures_previous() {
        let mut peak = PeakHold::Idle;
        peak.update(0.5, 0.1, 0.0);
        peak.update(0.3, 0.5, 0.1);
        assert_eq!(
            peak,
            PeakHold::Holding {
                value: 0.5,
                set_at: 0.1
            }
        );
        assert_eq!(peak.marker(), Some(0.5));
    }

    #[test]
    fn test_flat_signal_leaves_hold_in_place() {
        let mut peak = PeakHold::Holding {
            value: 0.5,
            set_at: 0.0,
        };
        peak.update(0.3, 0.3, 1.0);
        assert_eq!(peak.marker(), Some(0.5));
    }

    #[test]
    fn test_higher_local_maximum_replaces_hold() {
        let mut peak = PeakHold::Holding {
            value: 0.5,
            set_at: 0.0,
        };
        peak.update(0.6, 0.7, 1.0);
        assert_eq!(
            peak,
            PeakHold::Holding {
                value: 0.7,
                set_at: 1.0
            }
        );
    }

    #[test]
    fn test_lower_local_maximum_keeps_hold() {
        let mut peak = PeakHold::Holding {
            value: 0.5,
            set_at: 0.0,
        };
        peak.update(0.2, 0.3, 1.0);
        assert_eq!(peak.marker(), Some(0.5));
    }

    #[test]
    fn test_rise_cancels_hold() {
        let mut peak = PeakHold::Holding {
            value: 0.5,
            set_at: 0.0,
        };
        peak.update(0.6, 0.3, 1.0);
        assert_eq!(peak, PeakHold::Rising);
        assert_eq!(peak.marker(), None);
    }

    #[test]
    fn test_hold_expires_after_two_seconds() {
        let mut peak = PeakHold::Idle;
        peak.update(0.5, 0.1, 0.0);
        peak.update(0.3, 0.5, 0.1);

        // Flat signal just inside the hold window: still showing.
        peak.update(0.3, 0.3, 2.05);
        assert_eq!(peak.marker(), Some(0.5));

        // Past the window: expired.
        peak.update(0.3, 0.3, 2.2);
        assert_eq!(peak, PeakHold::Idle);
    }

    #[test]
    fn test_rising_never_expires() {
        let mut peak = PeakHold::Idle;
        peak.update(0.5, 0.1, 0.0);
        peak.update(0.5, 0.5, 100.0);
        assert_eq!(peak, PeakHold::Rising);
    }

    #[test]
    fn test_fresh_capture_is_not_expired_in_the_same_call() {
        let mut peak = PeakHold::Rising;
        // A capture at t=10 must survive the expiry check of that same update.
        peak.update(0.3, 0.5, 10.0);
        assert_eq!(peak.marker(), Some(0.5));
    }
}
