//! Pure view helpers: value deltas and threshold states.

use crate::params::WidgetParams;

pub const ARROW_UP_CLASS: &str = "icon-arrow-up";
pub const ARROW_DOWN_CLASS: &str = "icon-arrow-down";
pub const ARROW_FLAT_CLASS: &str = "icon-minus";

pub const CRITICAL_CLASS: &str = "threshold-critical";
pub const CAUTION_CLASS: &str = "threshold-caution";

/// Percentage delta between two readings plus a directional indicator class.
#[derive(Debug, Clone, PartialEq)]
pub struct Difference {
    pub old_value: f64,
    pub percentage_diff: f64,
    pub arrow_class: &'static str,
}

/// Computes the percentage change from `old_value` to `new_value`.
/// Returns `None` when the base is non-positive or either value is not a
/// finite number, since no meaningful percentage exists.
pub fn set_difference(old_value: f64, new_value: f64) -> Option<Difference> {
    if !old_value.is_finite() || !new_value.is_finite() || old_value <= 0.0 {
        return None;
    }

    let percentage_diff = (new_value - old_value) / old_value * 100.0;
    let arrow_class = if percentage_diff > 0.0 {
        ARROW_UP_CLASS
    } else if percentage_diff < 0.0 {
        ARROW_DOWN_CLASS
    } else {
        ARROW_FLAT_CLASS
    };

    Some(Difference {
        old_value,
        percentage_diff,
        arrow_class,
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThresholdState {
    Critical,
    Caution,
    Ok,
}

impl ThresholdState {
    /// The tile state class for this state. Critical and caution are
    /// mutually exclusive by construction; `Ok` clears both.
    pub fn class(&self) -> Option<&'static str> {
        match self {
            ThresholdState::Critical => Some(CRITICAL_CLASS),
            ThresholdState::Caution => Some(CAUTION_CLASS),
            ThresholdState::Ok => None,
        }
    }
}

/// Compares `current` against the configured thresholds. Under the default
/// policy higher values are better, so a value at or below a threshold
/// trips it; under `lower_is_better` a value at or above a threshold trips
/// it. Critical wins over caution.
pub fn check_thresholds(current: f64, params: &WidgetParams) -> ThresholdState {
    if params.lower_is_better {
        if let Some(critical) = params.threshold_critical
            && current >= critical
        {
            return ThresholdState::Critical;
        }
        if let Some(caution) = params.threshold_caution
            && current >= caution
        {
            return ThresholdState::Caution;
        }
    } else {
        if let Some(critical) = params.threshold_critical
            && current <= critical
        {
            return ThresholdState::Critical;
        }
        if let Some(caution) = params.threshold_caution
            && current <= caution
        {
            return ThresholdState::Caution;
        }
    }

    ThresholdState::Ok
}
