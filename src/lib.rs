//! JourneyFlow Rust Library
//!
//! Fachada del motor de progresión de journeys:
//! - `config` expone la configuración leída del entorno (`CONFIG`).
//! - `retirement` registra las reglas del journey de jubilación.
//! - `journey_service` arma un `JourneyService` con ambas cosas sobre
//!   cualquier `JourneyStore`.
//!
//! Puede usarse desde `main.rs` o por otros crates/clientes.

pub mod config;
pub mod retirement;

pub use journey_core::{classify_error, CheckboxesResponse, ErrorClass, GenericDataResponse, InMemoryJourneyStore,
                       JourneyError, JourneyResponse, JourneyRules, JourneyRulesRegistry, JourneyService,
                       JourneyStore, StoreError};
pub use journey_domain::{Checkbox, Journey, JourneyKey, JourneyStage, MemberRef, StepSubmission};
pub use journey_persistence::{PersistenceError, PgJourneyStore};

use config::CONFIG;
use retirement::{RetirementRules, RETIREMENT_JOURNEY};

/// Registro con las reglas conocidas por la aplicación.
pub fn default_rules() -> JourneyRulesRegistry {
    JourneyRulesRegistry::new().register(RETIREMENT_JOURNEY, RetirementRules)
}

/// `JourneyService` con las reglas por defecto y el estado inicial de `CONFIG`.
pub fn journey_service<S: JourneyStore>(store: S) -> JourneyService<S> {
    JourneyService::new(store).with_rules(default_rules())
                              .with_default_status(CONFIG.default_status.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn retirement_rules_are_registered_by_default() {
        let rules = default_rules();
        assert!(rules.is_registered(RETIREMENT_JOURNEY));
        assert!(!rules.is_registered("transfer"));
    }

    #[test]
    fn service_starts_journeys_with_configured_status() {
        let service = journey_service(InMemoryJourneyStore::new());
        let member = MemberRef::new("RBS", "1");
        let journey = tokio_test::block_on(service.start_journey(&member, "transfer", "a", "b", None)).expect("start");
        assert_eq!(journey.status(), CONFIG.default_status);
    }
}
