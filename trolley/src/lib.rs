#![doc = include_str!("../README.md")]

pub mod cli;
pub mod journey;
pub mod payload;
pub mod reporter;
pub mod step;
pub mod swarm;
pub mod transport;

mod failure;
#[cfg(test)]
mod testing;

pub use trolley_core as core;

pub use failure::StepFailure;
pub use journey::{JourneyReport, JourneyRunner, Session, StepOutcome};
pub use reporter::{EventLog, Reporter, StepEvent};
pub use step::Step;
pub use swarm::{Swarm, SwarmError};
pub use transport::{HttpTransport, ReqwestTransport, StepRequest, StepResponse, TransportError};

pub mod prelude {
    pub use crate::core::{RunStatistics, SwarmConfig, ThinkTime};
    pub use crate::{
        HttpTransport, JourneyRunner, Reporter, ReqwestTransport, Step, StepOutcome, Swarm,
    };
}
