//! The marketplace journey a simulated user walks through.
//!
//! Steps run strictly in [Step::ALL] order. Each response is validated and reported; a rejected
//! response marks the step failed and the journey carries on. Only transport faults are returned
//! to the caller.
use crate::failure::check_status;
use crate::payload::{validate_collection, CatalogueEntry, Document, ProductDetail, ProductId};
use crate::reporter::{record, Reporter};
use crate::step::Step;
use crate::transport::{HttpTransport, StepRequest, StepResponse, TransportError};
use crate::StepFailure;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Per-user state. Holds the product picked from the catalogue until the next session starts.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct Session {
    product_id: Option<ProductId>,
}

impl Session {
    pub fn product_id(&self) -> Option<ProductId> {
        self.product_id
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    Passed,
    Failed(StepFailure),
    /// The detail step had no product id to look up.
    Skipped,
}

impl StepOutcome {
    pub fn is_passed(&self) -> bool {
        matches!(self, StepOutcome::Passed)
    }
}

/// Outcome of each step of one journey, in execution order.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct JourneyReport {
    outcomes: Vec<(Step, StepOutcome)>,
}

impl JourneyReport {
    pub fn outcome(&self, step: Step) -> Option<&StepOutcome> {
        self.outcomes
            .iter()
            .find(|(s, _)| *s == step)
            .map(|(_, outcome)| outcome)
    }

    pub fn outcomes(&self) -> &[(Step, StepOutcome)] {
        &self.outcomes
    }

    pub fn all_passed(&self) -> bool {
        self.outcomes.iter().all(|(_, outcome)| outcome.is_passed())
    }
}

pub struct JourneyRunner<T> {
    transport: T,
    session: Session,
}

impl<T: HttpTransport> JourneyRunner<T> {
    pub fn new(transport: T) -> Self {
        Self {
            transport,
            session: Session::default(),
        }
    }

    /// Forget anything a previous journey stored.
    pub fn start_session(&mut self) {
        self.session = Session::default();
    }

    pub fn session(&self) -> Session {
        self.session
    }

    pub fn product_id(&self) -> Option<ProductId> {
        self.session.product_id
    }

    /// Issue one step's request and report the validated result.
    pub async fn execute<R>(&mut self, step: Step, reporter: &R) -> Result<StepOutcome, TransportError>
    where
        R: Reporter + Sync + ?Sized,
    {
        let Some(path) = step.path(self.session.product_id) else {
            // The catalogue step already reported why there is no id.
            debug!("{step} skipped, no product id in session");
            return Ok(StepOutcome::Skipped);
        };

        let request = StepRequest::new(step, path);
        let response = self.transport.get(&request).await?;

        let result = self.validate(step, &response);
        record(reporter, step, response.elapsed, &result);

        Ok(match result {
            Ok(()) => StepOutcome::Passed,
            Err(failure) => StepOutcome::Failed(failure),
        })
    }

    /// Reset the session and run all five steps back to back, with no think-time.
    pub async fn run<R>(&mut self, reporter: &R) -> Result<JourneyReport, TransportError>
    where
        R: Reporter + Sync + ?Sized,
    {
        self.start_session();

        let mut report = JourneyReport::default();
        for step in Step::ALL {
            let outcome = self.execute(step, reporter).await?;
            report.outcomes.push((step, outcome));
        }
        Ok(report)
    }

    fn validate(&mut self, step: Step, response: &StepResponse) -> Result<(), StepFailure> {
        check_status(response.status)?;
        let document = Document::parse(&response.body)?;

        match step {
            Step::BrowseCatalogue => {
                let entry = CatalogueEntry::from_document(&document)?;
                self.session.product_id = Some(entry.product_id);
                Ok(())
            }
            Step::ViewProductDetails => {
                // The request is only made with an id in the session.
                let expected = self
                    .session
                    .product_id
                    .ok_or(StepFailure::MissingProductId)?;
                ProductDetail::from_document(&document).expect_id(expected)
            }
            Step::ReviewFavourites | Step::InspectShipping | Step::CheckPayments => {
                validate_collection(&document, step.required_fields())
            }
        }
    }
}
