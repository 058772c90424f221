// journey-domain library entry point
pub mod branch;
pub mod checkbox;
pub mod constants;
pub mod error;
pub mod identity;
pub mod journey;
pub mod step;
pub use branch::Branch;
pub use checkbox::{Checkbox, CheckboxesList};
pub use error::DomainError;
pub use identity::{JourneyKey, MemberRef};
pub use journey::{Journey, JourneyStage, StepSubmission};
pub use step::Step;
