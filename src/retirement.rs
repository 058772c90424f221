//! Reglas del journey de jubilación.
//!
//! Ejemplo de `JourneyRules`: los formularios deben traer JSON válido, las
//! declaraciones finales deben aceptarse todas y el journey queda
//! "Submitted" al llegar a la página terminal.
use journey_core::journey_domain::{Checkbox, Journey, JourneyStage};
use journey_core::JourneyRules;

pub const RETIREMENT_JOURNEY: &str = "retirement";
pub const DECLARATIONS_LIST: &str = "declarations";
pub const SUBMITTED_STATUS: &str = "Submitted";

#[derive(Debug, Default)]
pub struct RetirementRules;

impl JourneyRules for RetirementRules {
    fn validate_generic_data(&self, page_key: &str, form_key: &str, json: &str) -> Result<(), String> {
        serde_json::from_str::<serde_json::Value>(json).map(|_| ())
                                                       .map_err(|e| {
                                                           format!("form \"{form_key}\" on page \"{page_key}\" is not valid JSON: {e}")
                                                       })
    }

    fn validate_checkboxes(&self, _page_key: &str, list_key: &str, checkboxes: &[Checkbox]) -> Result<(), String> {
        if list_key != DECLARATIONS_LIST {
            return Ok(());
        }
        match checkboxes.iter().find(|c| !c.answer_value) {
            Some(c) => Err(format!("declaration \"{}\" must be accepted", c.key)),
            None => Ok(()),
        }
    }

    fn status_after_advance(&self, journey: &Journey) -> Option<String> {
        (journey.stage() == JourneyStage::Terminal).then(|| SUBMITTED_STATUS.to_string())
    }
}
