//! The outreach pipeline: candidate address composition, company domain
//! resolution, and the staged orchestrator that narrates a run as a stream
//! of events.

pub mod compose;
pub mod error;
pub mod event;
pub mod orchestrator;
pub mod resolve;
pub mod result;
pub mod traits;

pub use compose::compose;
pub use error::PipelineError;
pub use event::{EventKind, EventPayload, Stage, StageEvent};
pub use orchestrator::{Orchestrator, OutreachRequest, RunHandle};
pub use resolve::resolve_domain;
pub use result::{FailedDispatch, RunResult};
pub use traits::{AddressVerifier, DispatchError, Dispatcher, EmployeeDirectory};
