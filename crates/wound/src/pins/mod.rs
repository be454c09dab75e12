//! Staple pin scheduling
//!
//! The wound closes continuously but staple pins are discrete objects that
//! are either visible or hidden. [`PinScheduler`] derives a target pin count
//! from the wound's overall closure and walks the visible set toward it one
//! pin at a time, so every reveal can trigger its own sound and haptic pulse.
//!
//! ## Hysteresis
//!
//! Reconciliation only runs when overall closure moved by more than the
//! configured threshold since the last reconciliation. Tiny float deltas
//! between ticks therefore never toggle pins back and forth.
//!
//! ## Deactivation
//!
//! With [`DeactivationPolicy::Lifo`] the scheduler keeps an explicit
//! activation stack, so hiding pins exactly reverses the activation order and
//! the visible set is always the first N entries of the activation order.
//! [`DeactivationPolicy::HighestIndex`] reproduces the legacy behaviour of
//! hiding the highest-index visible pin instead.

mod order;
mod progress;

pub use order::activation_order;
pub use progress::{closure_from_layers, overall_progress, target_for};

use surgery_config::{ActivationOrder, DeactivationPolicy, SessionConfig};
use tracing::debug;

use crate::constants::INITIAL_CLOSURE_BASELINE;
use crate::model::WoundModel;

/// A single pin visibility change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinChange {
    Activated(usize),
    Deactivated(usize),
}

impl PinChange {
    pub fn index(self) -> usize {
        match self {
            PinChange::Activated(index) | PinChange::Deactivated(index) => index,
        }
    }

    pub fn visible(self) -> bool {
        matches!(self, PinChange::Activated(_))
    }
}

/// Keeps visible staple pins in step with wound closure
#[derive(Debug, Clone)]
pub struct PinScheduler {
    order: Vec<usize>,
    policy: DeactivationPolicy,
    hysteresis: f32,
    /// Visible pins, most recently activated last
    stack: Vec<usize>,
    visible: Vec<bool>,
    /// Overall closure at the last reconciliation
    last_progress: f32,
}

impl PinScheduler {
    pub fn new(
        total_pins: usize,
        order: ActivationOrder,
        policy: DeactivationPolicy,
        hysteresis: f32,
    ) -> Self {
        Self {
            order: activation_order(total_pins, order),
            policy,
            hysteresis,
            stack: Vec::with_capacity(total_pins),
            visible: vec![false; total_pins],
            last_progress: INITIAL_CLOSURE_BASELINE,
        }
    }

    /// Scheduler for `total_pins` pins using the config's policies
    pub fn from_config(config: &SessionConfig, total_pins: usize) -> Self {
        Self::new(
            total_pins,
            config.activation_order,
            config.deactivation_policy,
            config.pin_hysteresis,
        )
    }

    pub fn total_pins(&self) -> usize {
        self.visible.len()
    }

    pub fn active_count(&self) -> usize {
        self.stack.len()
    }

    pub fn activation_order(&self) -> &[usize] {
        &self.order
    }

    /// Visible pins in the order they were revealed
    pub fn active_pins(&self) -> &[usize] {
        &self.stack
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible.get(index).copied().unwrap_or(false)
    }

    pub fn last_progress(&self) -> f32 {
        self.last_progress
    }

    /// Reconcile against the model if stitching is active and closure moved
    /// past the hysteresis threshold.
    ///
    /// `stitch_active` should be true while the stitcher is working, including
    /// the tick whose stitch step sealed the wound and cleared the model's
    /// stitching flag.
    pub fn observe(&mut self, model: &WoundModel, stitch_active: bool) -> Vec<PinChange> {
        if !stitch_active {
            return Vec::new();
        }

        let overall = overall_progress(model);
        if (overall - self.last_progress).abs() <= self.hysteresis {
            return Vec::new();
        }

        self.last_progress = overall;
        self.reconcile_to(target_for(overall, self.total_pins()))
    }

    /// Step the visible set toward `target`, one pin at a time.
    pub fn reconcile_to(&mut self, target: usize) -> Vec<PinChange> {
        let target = target.min(self.total_pins());
        let mut changes = Vec::new();

        while self.active_count() != target {
            let change = if self.active_count() < target {
                self.activate_next()
            } else {
                self.deactivate_last()
            };
            match change {
                Some(change) => changes.push(change),
                None => break,
            }
        }

        changes
    }

    /// Reveal the next hidden pin in activation order.
    pub fn activate_next(&mut self) -> Option<PinChange> {
        let index = self
            .order
            .iter()
            .copied()
            .find(|&index| !self.visible[index])?;

        self.visible[index] = true;
        self.stack.push(index);
        debug!(
            "Activated stapler pin {}/{}",
            index + 1,
            self.total_pins()
        );
        Some(PinChange::Activated(index))
    }

    /// Hide one pin according to the deactivation policy; no-op when none
    /// are visible.
    pub fn deactivate_last(&mut self) -> Option<PinChange> {
        let index = match self.policy {
            DeactivationPolicy::Lifo => self.stack.pop()?,
            DeactivationPolicy::HighestIndex => {
                let index = self.visible.iter().rposition(|&visible| visible)?;
                self.stack.retain(|&active| active != index);
                index
            }
        };

        self.visible[index] = false;
        debug!(
            "Deactivated stapler pin {}/{}",
            index + 1,
            self.total_pins()
        );
        Some(PinChange::Deactivated(index))
    }

    /// Hide every pin and restore the closure baseline.
    pub fn reset_all_pins(&mut self) -> Vec<PinChange> {
        let changes: Vec<PinChange> = self
            .stack
            .drain(..)
            .rev()
            .map(PinChange::Deactivated)
            .collect();
        self.visible.fill(false);
        self.last_progress = INITIAL_CLOSURE_BASELINE;
        changes
    }

    /// Reveal every pin immediately, bypassing hysteresis (diagnostics).
    pub fn force_activate_all_pins(&mut self) -> Vec<PinChange> {
        let mut changes = Vec::new();
        while let Some(change) = self.activate_next() {
            changes.push(change);
        }
        changes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::WoundState;

    fn scheduler(total: usize, order: ActivationOrder, policy: DeactivationPolicy) -> PinScheduler {
        PinScheduler::new(total, order, policy, 0.5)
    }

    fn stitching(incision: f32, dissection: f32) -> WoundModel {
        WoundModel::from_state(WoundState {
            incision_progress: incision,
            dissection_progress: dissection,
            incision_complete: incision > 0.0,
            dissection_complete: dissection > 0.0,
            is_stitching: true,
        })
    }

    fn assert_visible_is_order_prefix(scheduler: &PinScheduler) {
        let n = scheduler.active_count();
        for (position, &index) in scheduler.activation_order().iter().enumerate() {
            assert_eq!(scheduler.is_visible(index), position < n, "pin {index}");
        }
    }

    #[test]
    fn test_new_scheduler_hides_everything() {
        let scheduler = scheduler(15, ActivationOrder::CenterOut, DeactivationPolicy::Lifo);
        assert_eq!(scheduler.total_pins(), 15);
        assert_eq!(scheduler.active_count(), 0);
        assert_eq!(scheduler.last_progress(), 100.0);
    }

    #[test]
    fn test_reconcile_steps_one_pin_at_a_time() {
        let mut scheduler = scheduler(15, ActivationOrder::CenterOut, DeactivationPolicy::Lifo);
        let changes = scheduler.reconcile_to(4);
        assert_eq!(
            changes,
            vec![
                PinChange::Activated(7),
                PinChange::Activated(6),
                PinChange::Activated(8),
                PinChange::Activated(5),
            ]
        );
        assert_visible_is_order_prefix(&scheduler);
    }

    #[test]
    fn test_lifo_deactivation_reverses_activation() {
        let mut scheduler = scheduler(15, ActivationOrder::CenterOut, DeactivationPolicy::Lifo);
        scheduler.reconcile_to(5);
        let changes = scheduler.reconcile_to(2);
        assert_eq!(
            changes,
            vec![
                PinChange::Deactivated(9),
                PinChange::Deactivated(5),
                PinChange::Deactivated(8),
            ]
        );
        assert_eq!(scheduler.active_pins(), &[7, 6]);
        assert_visible_is_order_prefix(&scheduler);
    }

    #[test]
    fn test_highest_index_deactivation_keeps_count_consistent() {
        let mut scheduler =
            scheduler(15, ActivationOrder::CenterOut, DeactivationPolicy::HighestIndex);
        scheduler.reconcile_to(4); // 7, 6, 8, 5
        let changes = scheduler.reconcile_to(3);
        assert_eq!(changes, vec![PinChange::Deactivated(8)]);

        // The next reveal picks the first hidden pin in order, never a
        // pin that is already visible.
        let changes = scheduler.reconcile_to(4);
        assert_eq!(changes, vec![PinChange::Activated(8)]);
        let visible = (0..15).filter(|&i| scheduler.is_visible(i)).count();
        assert_eq!(visible, scheduler.active_count());
    }

    #[test]
    fn test_deactivate_with_nothing_visible_is_noop() {
        let mut scheduler = scheduler(3, ActivationOrder::Sequential, DeactivationPolicy::Lifo);
        assert_eq!(scheduler.deactivate_last(), None);
        let mut legacy = PinScheduler::new(
            3,
            ActivationOrder::Sequential,
            DeactivationPolicy::HighestIndex,
            0.5,
        );
        assert_eq!(legacy.deactivate_last(), None);
    }

    #[test]
    fn test_observe_requires_stitching() {
        let mut scheduler = scheduler(15, ActivationOrder::CenterOut, DeactivationPolicy::Lifo);
        let model = stitching(100.0, 0.0);
        assert!(scheduler.observe(&model, false).is_empty());
        assert_eq!(scheduler.last_progress(), 100.0);

        let changes = scheduler.observe(&model, true);
        assert_eq!(changes.len(), 8);
        assert_eq!(scheduler.last_progress(), 50.0);
    }

    #[test]
    fn test_observe_hysteresis() {
        let mut scheduler = scheduler(15, ActivationOrder::CenterOut, DeactivationPolicy::Lifo);
        scheduler.observe(&stitching(100.0, 0.0), true); // overall 50

        // 0.4 units of overall closure: below threshold
        let changes = scheduler.observe(&stitching(99.2, 0.0), true);
        assert!(changes.is_empty());
        assert_eq!(scheduler.last_progress(), 50.0);

        // 0.6 units: crosses it
        scheduler.observe(&stitching(98.8, 0.0), true);
        assert!((scheduler.last_progress() - 50.6).abs() < 1e-4);
    }

    #[test]
    fn test_observe_is_idempotent() {
        let mut scheduler = scheduler(15, ActivationOrder::CenterOut, DeactivationPolicy::Lifo);
        let model = stitching(60.0, 0.0);
        let first = scheduler.observe(&model, true);
        assert!(!first.is_empty());
        assert!(scheduler.observe(&model, true).is_empty());
        assert!(scheduler.observe(&model, true).is_empty());
    }

    #[test]
    fn test_reopening_removes_pins() {
        let mut scheduler = scheduler(10, ActivationOrder::Sequential, DeactivationPolicy::Lifo);
        scheduler.observe(&stitching(20.0, 0.0), true);
        assert_eq!(scheduler.active_count(), 9);

        // Wound re-cut while the stitcher is still touching
        let changes = scheduler.observe(&stitching(100.0, 0.0), true);
        assert_eq!(changes.len(), 4);
        assert!(changes.iter().all(|change| !change.visible()));
        assert_eq!(scheduler.active_pins(), &[0, 1, 2, 3, 4]);
    }

    #[test]
    fn test_pin_count_tracks_closure_monotonically() {
        let mut scheduler = scheduler(15, ActivationOrder::CenterOut, DeactivationPolicy::Lifo);
        let mut model = stitching(100.0, 100.0);
        let mut last_count = 0;

        while !model.is_fully_healed() {
            model.advance_stitch(2.0);
            for change in scheduler.observe(&model, true) {
                assert!(change.visible());
            }
            assert!(scheduler.active_count() >= last_count);
            last_count = scheduler.active_count();
            assert_visible_is_order_prefix(&scheduler);
        }
        assert_eq!(scheduler.active_count(), 15);
    }

    #[test]
    fn test_reset_all_pins() {
        let mut scheduler = scheduler(6, ActivationOrder::CenterOut, DeactivationPolicy::Lifo);
        scheduler.observe(&stitching(50.0, 0.0), true);
        assert!(scheduler.active_count() > 0);

        let changes = scheduler.reset_all_pins();
        assert_eq!(changes.len(), 5);
        assert!(changes.iter().all(|change| !change.visible()));
        assert_eq!(scheduler.active_count(), 0);
        assert!((0..6).all(|i| !scheduler.is_visible(i)));
        assert_eq!(scheduler.last_progress(), 100.0);
    }

    #[test]
    fn test_force_activate_all_pins() {
        let mut scheduler = scheduler(5, ActivationOrder::CenterOut, DeactivationPolicy::Lifo);
        scheduler.reconcile_to(2);
        let changes = scheduler.force_activate_all_pins();
        assert_eq!(
            changes,
            vec![
                PinChange::Activated(3),
                PinChange::Activated(0),
                PinChange::Activated(4),
            ]
        );
        assert_eq!(scheduler.active_count(), 5);
        assert!(scheduler.force_activate_all_pins().is_empty());
    }

    #[test]
    fn test_zero_pins_is_inert() {
        let mut scheduler = scheduler(0, ActivationOrder::CenterOut, DeactivationPolicy::Lifo);
        assert!(scheduler.observe(&stitching(0.0, 0.0), true).is_empty());
        assert!(scheduler.force_activate_all_pins().is_empty());
        assert!(!scheduler.is_visible(0));
    }
}
