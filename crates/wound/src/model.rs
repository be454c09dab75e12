//! Wound progress model
//!
//! Two continuous layers (incision, dissection) each with a progress value in
//! `[0, 100]` and a completion flag. The model only exposes raw operations;
//! the ordering rules between tools (dissection requires a complete incision)
//! are enforced by [`crate::router::ContactRouter`]. Stitching is the one
//! place the model enforces order itself: the deeper dissection layer always
//! closes before the incision.

use tracing::{debug, info};

use crate::constants::{PROGRESS_MAX, PROGRESS_MIN};
use crate::types::{BlendChannel, WoundState};

/// Clamp a progress value into `[0, 100]`, mapping NaN to 0.
pub fn clamp_progress(value: f32) -> f32 {
    if value.is_nan() {
        PROGRESS_MIN
    } else {
        value.clamp(PROGRESS_MIN, PROGRESS_MAX)
    }
}

/// Result of a single stitching step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StitchOutcome {
    /// Dissection closed partially
    ClosedDissection,
    /// Dissection reached 0 and its completion flag was cleared
    DissectionSealed,
    /// Incision closed partially
    ClosedIncision,
    /// Incision reached 0; the wound has no open layer left
    IncisionSealed,
    /// Nothing open to close
    Nothing,
}

impl StitchOutcome {
    pub fn changed(self) -> bool {
        self != StitchOutcome::Nothing
    }
}

/// Progress state of one wound
#[derive(Debug, Clone, Default, PartialEq)]
pub struct WoundModel {
    incision_progress: f32,
    dissection_progress: f32,
    incision_complete: bool,
    dissection_complete: bool,
    is_stitching: bool,
}

impl WoundModel {
    /// Create an intact wound (both layers at 0)
    pub fn new() -> Self {
        Self::default()
    }

    /// Restore a model from a snapshot; progress values are clamped
    pub fn from_state(state: WoundState) -> Self {
        Self {
            incision_progress: clamp_progress(state.incision_progress),
            dissection_progress: clamp_progress(state.dissection_progress),
            incision_complete: state.incision_complete,
            dissection_complete: state.dissection_complete,
            is_stitching: state.is_stitching,
        }
    }

    pub fn snapshot(&self) -> WoundState {
        WoundState {
            incision_progress: self.incision_progress,
            dissection_progress: self.dissection_progress,
            incision_complete: self.incision_complete,
            dissection_complete: self.dissection_complete,
            is_stitching: self.is_stitching,
        }
    }

    /// Return to the intact state for a new training session
    pub fn reset(&mut self) {
        *self = Self::default();
        info!("Wound model reset");
    }

    pub fn incision_progress(&self) -> f32 {
        self.incision_progress
    }

    pub fn dissection_progress(&self) -> f32 {
        self.dissection_progress
    }

    pub fn incision_complete(&self) -> bool {
        self.incision_complete
    }

    pub fn dissection_complete(&self) -> bool {
        self.dissection_complete
    }

    pub fn is_stitching(&self) -> bool {
        self.is_stitching
    }

    pub fn set_stitching(&mut self, stitching: bool) {
        self.is_stitching = stitching;
    }

    /// Current blend-shape weight for a mesh channel
    pub fn channel_weight(&self, channel: BlendChannel) -> f32 {
        match channel {
            BlendChannel::Incision => self.incision_progress,
            BlendChannel::Dissection => self.dissection_progress,
        }
    }

    /// Open the incision by `step`.
    ///
    /// Marks the incision complete as soon as it reaches 100. Returns whether
    /// the model changed.
    pub fn incise(&mut self, step: f32) -> bool {
        let (progress, complete) = (&mut self.incision_progress, &mut self.incision_complete);
        let changed = open_layer(progress, complete, step);
        if changed && *complete {
            info!("Incision complete");
        }
        changed
    }

    /// Open the dissection by `step`. Same contract as [`Self::incise`].
    pub fn dissect(&mut self, step: f32) -> bool {
        let (progress, complete) = (&mut self.dissection_progress, &mut self.dissection_complete);
        let changed = open_layer(progress, complete, step);
        if changed && *complete {
            info!("Dissection complete");
        }
        changed
    }

    /// Close the wound by `step`, dissection first, then incision.
    ///
    /// Any open dissection is closed before the incision, including one the
    /// spreader left partially open.
    pub fn advance_stitch(&mut self, step: f32) -> StitchOutcome {
        if self.dissection_progress > PROGRESS_MIN {
            self.dissection_progress = clamp_progress(self.dissection_progress - step);
            debug!("Stitching dissection: {:.1}", self.dissection_progress);

            if self.dissection_progress <= PROGRESS_MIN {
                self.dissection_complete = false;
                info!("Dissection layer closed");
                return StitchOutcome::DissectionSealed;
            }
            StitchOutcome::ClosedDissection
        } else if self.incision_complete && self.incision_progress > PROGRESS_MIN {
            self.incision_progress = clamp_progress(self.incision_progress - step);
            debug!("Stitching incision: {:.1}", self.incision_progress);

            if self.incision_progress <= PROGRESS_MIN {
                self.incision_complete = false;
                self.is_stitching = false;
                info!("Incision closed");
                return StitchOutcome::IncisionSealed;
            }
            StitchOutcome::ClosedIncision
        } else {
            StitchOutcome::Nothing
        }
    }

    /// Both layers at exactly 0 with no completion flag set
    pub fn is_fully_healed(&self) -> bool {
        self.incision_progress == PROGRESS_MIN
            && self.dissection_progress == PROGRESS_MIN
            && !self.incision_complete
            && !self.dissection_complete
    }

    /// There is an opened layer to close
    pub fn can_stitch(&self) -> bool {
        self.incision_complete
            || self.dissection_complete
            || self.dissection_progress > PROGRESS_MIN
    }
}

fn open_layer(progress: &mut f32, complete: &mut bool, step: f32) -> bool {
    if *progress < PROGRESS_MAX {
        *progress = clamp_progress(*progress + step);
        if *progress >= PROGRESS_MAX {
            *complete = true;
        }
        true
    } else if !*complete {
        *complete = true;
        true
    } else {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn opened(incision: f32, dissection: f32) -> WoundModel {
        WoundModel::from_state(WoundState {
            incision_progress: incision,
            dissection_progress: dissection,
            incision_complete: incision >= PROGRESS_MAX,
            dissection_complete: dissection >= PROGRESS_MAX,
            is_stitching: false,
        })
    }

    #[test]
    fn test_new_model_is_healed() {
        let model = WoundModel::new();
        assert!(model.is_fully_healed());
        assert!(!model.can_stitch());
    }

    #[test]
    fn test_incise_four_quarter_steps_completes() {
        let mut model = WoundModel::new();
        for _ in 0..4 {
            assert!(model.incise(25.0));
        }
        assert_eq!(model.incision_progress(), 100.0);
        assert!(model.incision_complete());
        assert!(!model.incise(25.0));
    }

    #[test]
    fn test_incise_clamps_overshoot() {
        let mut model = WoundModel::new();
        model.incise(70.0);
        model.incise(70.0);
        assert_eq!(model.incision_progress(), 100.0);
        assert!(model.incision_complete());
    }

    #[test]
    fn test_raw_full_progress_sets_flag_on_next_call() {
        let mut model = WoundModel::from_state(WoundState {
            incision_progress: 100.0,
            ..Default::default()
        });
        assert!(!model.incision_complete());
        assert!(model.incise(1.0));
        assert!(model.incision_complete());
        assert_eq!(model.incision_progress(), 100.0);
    }

    #[test]
    fn test_dissect_fixed_step_is_near_instant() {
        let mut model = opened(100.0, 0.0);
        model.dissect(99.0);
        assert_eq!(model.dissection_progress(), 99.0);
        assert!(!model.dissection_complete());
        model.dissect(99.0);
        assert_eq!(model.dissection_progress(), 100.0);
        assert!(model.dissection_complete());
    }

    #[test]
    fn test_stitch_closes_dissection_before_incision() {
        let mut model = WoundModel::from_state(WoundState {
            incision_progress: 100.0,
            dissection_progress: 30.0,
            incision_complete: true,
            dissection_complete: true,
            is_stitching: true,
        });

        assert_eq!(model.advance_stitch(2.0), StitchOutcome::ClosedDissection);
        assert_eq!(model.dissection_progress(), 28.0);
        assert_eq!(model.incision_progress(), 100.0);
    }

    #[test]
    fn test_stitch_seals_dissection_then_incision() {
        let mut model = opened(100.0, 100.0);
        model.set_stitching(true);

        let mut outcomes = Vec::new();
        loop {
            let outcome = model.advance_stitch(30.0);
            if outcome == StitchOutcome::Nothing {
                break;
            }
            outcomes.push(outcome);
        }

        assert_eq!(
            outcomes,
            vec![
                StitchOutcome::ClosedDissection,
                StitchOutcome::ClosedDissection,
                StitchOutcome::ClosedDissection,
                StitchOutcome::DissectionSealed,
                StitchOutcome::ClosedIncision,
                StitchOutcome::ClosedIncision,
                StitchOutcome::ClosedIncision,
                StitchOutcome::IncisionSealed,
            ]
        );
        assert!(model.is_fully_healed());
        assert!(!model.is_stitching());
    }

    #[test]
    fn test_stitch_closes_partial_dissection_first() {
        let mut model = opened(100.0, 0.0);
        model.dissect(99.0);
        assert!(!model.dissection_complete());
        assert!(model.can_stitch());

        assert_eq!(model.advance_stitch(50.0), StitchOutcome::ClosedDissection);
        assert_eq!(model.dissection_progress(), 49.0);
        assert_eq!(model.incision_progress(), 100.0);
        assert_eq!(model.advance_stitch(50.0), StitchOutcome::DissectionSealed);
        assert_eq!(model.advance_stitch(50.0), StitchOutcome::ClosedIncision);
        assert_eq!(model.advance_stitch(50.0), StitchOutcome::IncisionSealed);
        assert!(model.is_fully_healed());
    }

    #[test]
    fn test_stitch_ignores_incomplete_layers() {
        // A partially opened incision has nothing to close yet.
        let mut model = opened(40.0, 0.0);
        assert!(!model.can_stitch());
        assert_eq!(model.advance_stitch(2.0), StitchOutcome::Nothing);
        assert_eq!(model.incision_progress(), 40.0);
    }

    #[test]
    fn test_fully_healed_requires_exact_zero() {
        let model = WoundModel::from_state(WoundState {
            incision_progress: 0.1,
            ..Default::default()
        });
        assert!(!model.is_fully_healed());

        let flagged = WoundModel::from_state(WoundState {
            incision_complete: true,
            ..Default::default()
        });
        assert!(!flagged.is_fully_healed());
    }

    #[test]
    fn test_restore_clamps_progress() {
        let model = WoundModel::from_state(WoundState {
            incision_progress: 250.0,
            dissection_progress: -3.0,
            ..Default::default()
        });
        assert_eq!(model.incision_progress(), 100.0);
        assert_eq!(model.dissection_progress(), 0.0);
        assert_eq!(clamp_progress(f32::NAN), 0.0);
    }

    #[test]
    fn test_progress_stays_in_range_for_mixed_steps() {
        let mut model = WoundModel::new();
        let steps = [3.7, 55.0, 0.25, 120.0, 9.9];
        for (i, step) in steps.iter().cycle().take(60).enumerate() {
            match i % 3 {
                0 => {
                    model.incise(*step);
                }
                1 => {
                    if model.incision_complete() {
                        model.dissect(*step);
                    }
                }
                _ => {
                    model.advance_stitch(*step);
                }
            }
            assert!((0.0..=100.0).contains(&model.incision_progress()));
            assert!((0.0..=100.0).contains(&model.dissection_progress()));
        }
    }

    #[test]
    fn test_channel_weights_track_progress() {
        let model = opened(100.0, 42.0);
        assert_eq!(model.channel_weight(BlendChannel::Incision), 100.0);
        assert_eq!(model.channel_weight(BlendChannel::Dissection), 42.0);
    }

    #[test]
    fn test_reset_returns_to_intact() {
        let mut model = opened(100.0, 100.0);
        model.set_stitching(true);
        model.reset();
        assert_eq!(model, WoundModel::new());
    }
}
