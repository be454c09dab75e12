//! Mapping from wound progress to overall closure and pin targets.

use crate::constants::{DISSECTION_CLOSURE_SHARE, PROGRESS_MAX, PROGRESS_MIN};
use crate::model::WoundModel;

/// Overall closure on a 0-100 scale (0 = fully open, 100 = fully closed).
///
/// The first half tracks the dissection closing; once the dissection is
/// at 0 the second half tracks the incision closing.
pub fn overall_progress(model: &WoundModel) -> f32 {
    closure_from_layers(model.incision_progress(), model.dissection_progress())
}

/// Same mapping as [`overall_progress`] for raw layer values
pub fn closure_from_layers(incision: f32, dissection: f32) -> f32 {
    let half = DISSECTION_CLOSURE_SHARE;
    if dissection > PROGRESS_MIN {
        (PROGRESS_MAX - dissection) / PROGRESS_MAX * half
    } else {
        half + (PROGRESS_MAX - incision) / PROGRESS_MAX * (PROGRESS_MAX - half)
    }
}

/// Number of pins that should be visible at a given overall closure.
///
/// Rounds half up and clamps to `[0, total_pins]`.
pub fn target_for(overall: f32, total_pins: usize) -> usize {
    if !overall.is_finite() || overall <= PROGRESS_MIN {
        return 0;
    }
    let raw = (overall / PROGRESS_MAX * total_pins as f32).round();
    (raw as usize).min(total_pins)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WoundState;

    #[test]
    fn test_target_bounds_fifteen_pins() {
        assert_eq!(target_for(0.0, 15), 0);
        assert_eq!(target_for(100.0, 15), 15);
        assert_eq!(target_for(50.0, 15), 8);
        assert_eq!(target_for(130.0, 15), 15);
        assert_eq!(target_for(-4.0, 15), 0);
        assert_eq!(target_for(f32::NAN, 15), 0);
    }

    #[test]
    fn test_target_rounds_half_up() {
        // 10% of 15 = 1.5
        assert_eq!(target_for(10.0, 15), 2);
        // 3.2% of 15 = 0.48
        assert_eq!(target_for(3.2, 15), 0);
    }

    #[test]
    fn test_closure_segments() {
        // Fully opened wound
        assert_eq!(closure_from_layers(100.0, 100.0), 0.0);
        // Dissection half closed
        assert_eq!(closure_from_layers(100.0, 50.0), 25.0);
        // Dissection sealed, incision still open
        assert_eq!(closure_from_layers(100.0, 0.0), 50.0);
        // Incision half closed
        assert_eq!(closure_from_layers(50.0, 0.0), 75.0);
        // Healed
        assert_eq!(closure_from_layers(0.0, 0.0), 100.0);
    }

    #[test]
    fn test_overall_from_model() {
        let model = WoundModel::from_state(WoundState {
            incision_progress: 100.0,
            dissection_progress: 80.0,
            incision_complete: true,
            dissection_complete: true,
            is_stitching: true,
        });
        assert_eq!(overall_progress(&model), 10.0);
    }
}
