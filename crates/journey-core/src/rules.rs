//! Reglas de negocio enchufables por tipo de journey.
//!
//! El motor no interpreta el contenido de las páginas: cada tipo de journey
//! (retirement, transfer, bereavement, ...) puede registrar un `JourneyRules`
//! que valida escrituras antes de mutar el journey y decide el estado tras un
//! avance. Los tipos sin reglas usan `DefaultJourneyRules`, que acepta todo.

use std::collections::HashMap;
use std::sync::Arc;

use journey_domain::{Checkbox, Journey};

pub trait JourneyRules: Send + Sync {
    /// Valida el JSON de un formulario. `Err` con el mensaje para el cliente.
    fn validate_generic_data(&self, _page_key: &str, _form_key: &str, _json: &str) -> Result<(), String> {
        Ok(())
    }

    fn validate_checkboxes(&self, _page_key: &str, _list_key: &str, _checkboxes: &[Checkbox]) -> Result<(), String> {
        Ok(())
    }

    /// Estado a fijar tras mover el cursor; `None` conserva el actual.
    fn status_after_advance(&self, _journey: &Journey) -> Option<String> {
        None
    }
}

#[derive(Debug, Default)]
pub struct DefaultJourneyRules;

impl JourneyRules for DefaultJourneyRules {}

/// Registro de reglas por tipo de journey.
#[derive(Clone)]
pub struct JourneyRulesRegistry {
    by_type: HashMap<String, Arc<dyn JourneyRules>>,
    fallback: Arc<dyn JourneyRules>,
}

impl Default for JourneyRulesRegistry {
    fn default() -> Self {
        Self { by_type: HashMap::new(),
               fallback: Arc::new(DefaultJourneyRules) }
    }
}

impl JourneyRulesRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registra (o reemplaza) las reglas de un tipo de journey.
    pub fn register(mut self, journey_type: impl Into<String>, rules: impl JourneyRules + 'static) -> Self {
        self.by_type.insert(journey_type.into(), Arc::new(rules));
        self
    }

    pub fn with_fallback(mut self, rules: impl JourneyRules + 'static) -> Self {
        self.fallback = Arc::new(rules);
        self
    }

    pub fn rules_for(&self, journey_type: &str) -> &dyn JourneyRules {
        self.by_type
            .get(journey_type)
            .unwrap_or(&self.fallback)
            .as_ref()
    }

    pub fn is_registered(&self, journey_type: &str) -> bool {
        self.by_type.contains_key(journey_type)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct NoEmptyJson;
    impl JourneyRules for NoEmptyJson {
        fn validate_generic_data(&self, _page_key: &str, form_key: &str, json: &str) -> Result<(), String> {
            if json.trim().is_empty() {
                return Err(format!("empty payload for form {form_key}"));
            }
            Ok(())
        }
    }

    #[test]
    fn unregistered_type_uses_fallback() {
        let registry = JourneyRulesRegistry::new().register("transfer", NoEmptyJson);
        assert!(registry.is_registered("transfer"));
        assert!(registry.rules_for("transfer").validate_generic_data("p", "f", " ").is_err());
        assert!(registry.rules_for("retirement").validate_generic_data("p", "f", " ").is_ok());
    }

    #[test]
    fn fallback_can_be_replaced() {
        let registry = JourneyRulesRegistry::new().with_fallback(NoEmptyJson);
        assert!(registry.rules_for("anything").validate_generic_data("p", "f", "").is_err());
    }
}
