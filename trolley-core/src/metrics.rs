//! Metric names emitted for every journey step. Each is labelled with [STEP_LABEL_KEY] set to the
//! step's normalized request name.

pub const STEP_SUCCESS: &str = "trolley_step_success";
pub const STEP_FAILURE: &str = "trolley_step_failure";
pub const STEP_LATENCY: &str = "trolley_step_latency";
pub const STEP_LABEL_KEY: &str = "step";
