/// Lower bound of every progress value and blend-shape weight.
pub const PROGRESS_MIN: f32 = 0.0;

/// Upper bound of every progress value and blend-shape weight.
pub const PROGRESS_MAX: f32 = 100.0;

/// Share of overall closure covered by sealing the dissection layer.
pub const DISSECTION_CLOSURE_SHARE: f32 = 50.0;

/// Overall closure baseline at session start (nothing observed yet).
pub const INITIAL_CLOSURE_BASELINE: f32 = 100.0;
