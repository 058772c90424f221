//! journey-core: motor de progresión de journeys.
//!
//! Expone `JourneyService`, que orquesta lecturas y escrituras por page key
//! sobre un `JourneyStore`, el validador de navegación compartido y las
//! reglas enchufables por tipo de journey.
pub mod errors;
pub mod navigation;
pub mod responses;
pub mod rules;
pub mod service;
pub mod store;

pub use errors::{classify_error, ErrorClass, JourneyError, StoreError};
pub use navigation::{classify_page_key, PageKeyClass};
pub use responses::{CheckboxResponse, CheckboxesResponse, GenericDataResponse, JourneyResponse, StepSummary};
pub use rules::{DefaultJourneyRules, JourneyRules, JourneyRulesRegistry};
pub use service::JourneyService;
pub use store::{InMemoryJourneyStore, JourneyStore};

pub use journey_domain;
