use crate::payload::ProductId;
use thiserror::Error;

/// Why a step's response was rejected. These are recorded against the step and never abort the
/// journey.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StepFailure {
    #[error("Unexpected status {0}")]
    UnexpectedStatus(u16),

    #[error("Invalid JSON: {0}")]
    InvalidJson(String),

    #[error("Product catalogue response did not contain data")]
    EmptyCatalogue,

    #[error("Product collection missing numeric productId")]
    MissingProductId,

    #[error("Product endpoint did not return the expected id")]
    UnexpectedProductId {
        expected: ProductId,
        found: Option<ProductId>,
    },

    #[error("Collection response did not contain elements")]
    EmptyCollection,

    #[error("Payload missing fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),
}

/// Statuses the gateway client treats as success (2xx and 3xx).
pub(crate) fn check_status(status: u16) -> Result<(), StepFailure> {
    if (200..400).contains(&status) {
        Ok(())
    } else {
        Err(StepFailure::UnexpectedStatus(status))
    }
}
