//! Respuestas expuestas a los handlers. Los nombres de campo serializados se
//! mantienen por compatibilidad con los clientes existentes.

use chrono::{DateTime, Utc};
use journey_domain::{Checkbox, CheckboxesList, Journey, JourneyStage, Step};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GenericDataResponse {
    pub form_key: String,
    /// JSON opaco tal como se guardó; vacío si nunca se guardó.
    pub generic_data_json: String,
}

impl GenericDataResponse {
    pub fn empty(form_key: &str) -> Self {
        Self { form_key: form_key.to_string(),
               generic_data_json: String::new() }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxResponse {
    pub key: String,
    pub answer_value: bool,
}

impl From<&Checkbox> for CheckboxResponse {
    fn from(c: &Checkbox) -> Self {
        Self { key: c.key.clone(),
               answer_value: c.answer_value }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxesResponse {
    pub checkboxes_list_key: String,
    pub checkboxes: Vec<CheckboxResponse>,
}

impl CheckboxesResponse {
    pub fn empty(list_key: &str) -> Self {
        Self { checkboxes_list_key: list_key.to_string(),
               checkboxes: Vec::new() }
    }

    pub fn from_list(list: &CheckboxesList) -> Self {
        Self { checkboxes_list_key: list.key().to_string(),
               checkboxes: list.checkboxes().iter().map(CheckboxResponse::from).collect() }
    }
}

/// Resumen de un step del camino vigente.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StepSummary {
    pub page_key: String,
    pub sequence_number: u32,
    pub submitted_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Formularios con datos, en orden de primera escritura.
    pub form_keys: Vec<String>,
    pub checkboxes_list_keys: Vec<String>,
}

impl From<&Step> for StepSummary {
    fn from(s: &Step) -> Self {
        Self { page_key: s.page_key().to_string(),
               sequence_number: s.sequence_number(),
               submitted_at: s.submitted_at(),
               updated_at: s.updated_at(),
               form_keys: s.generic_data_entries().map(|(k, _)| k.to_string()).collect(),
               checkboxes_list_keys: s.checkboxes_lists().iter().map(|l| l.key().to_string()).collect() }
    }
}

/// Resumen de un journey para los handlers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyResponse {
    pub journey_type: String,
    pub status: String,
    pub stage: JourneyStage,
    pub start_date: DateTime<Utc>,
    pub current_page_key: Option<String>,
    pub next_page_key: Option<String>,
    pub terminal_page_key: Option<String>,
    pub steps: Vec<StepSummary>,
}

impl From<&Journey> for JourneyResponse {
    fn from(j: &Journey) -> Self {
        Self { journey_type: j.journey_type().to_string(),
               status: j.status().to_string(),
               stage: j.stage(),
               start_date: j.start_date(),
               current_page_key: j.current_page_key().map(str::to_string),
               next_page_key: j.next_page_key().map(str::to_string),
               terminal_page_key: j.terminal_page_key().map(str::to_string),
               steps: j.active_branch()
                       .map(|b| b.steps().iter().map(StepSummary::from).collect())
                       .unwrap_or_default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use journey_domain::{JourneyKey, MemberRef};
    use serde_json::json;

    #[test]
    fn generic_data_wire_names() {
        let resp = GenericDataResponse::empty("form1");
        assert_eq!(serde_json::to_value(&resp).unwrap(),
                   json!({"formKey": "form1", "genericDataJson": ""}));
    }

    #[test]
    fn journey_summary_lists_active_steps_with_their_data_keys() {
        let now = chrono::Utc::now();
        let key = JourneyKey::new("retirement", &MemberRef::new("RBS", "1"));
        let mut journey = Journey::start(key, "Started", "p1", "p2", Some("hub".into()), now).expect("start");
        let step = journey.step_mut("p1").expect("p1");
        step.update_generic_data("contact", "{}", now);
        step.update_generic_data("address", "{}", now);
        step.update_checkboxes_list("consents", vec![Checkbox::new("c1", true)], now);

        let resp = JourneyResponse::from(&journey);
        assert_eq!(resp.stage, JourneyStage::Started);
        assert_eq!(resp.steps.len(), 1);
        let p1 = &resp.steps[0];
        assert_eq!(p1.page_key, "p1");
        assert_eq!(p1.sequence_number, 1);
        assert_eq!(p1.submitted_at, now);
        assert_eq!(p1.form_keys, vec!["contact", "address"]);
        assert_eq!(p1.checkboxes_list_keys, vec!["consents"]);

        let wire = serde_json::to_value(&resp).unwrap();
        assert_eq!(wire["steps"][0]["formKeys"], json!(["contact", "address"]));
        assert_eq!(wire["nextPageKey"], "p2");
    }

    #[test]
    fn checkboxes_wire_names() {
        let list = CheckboxesList::new("testKey", vec![Checkbox::new("a1", true)]);
        let resp = CheckboxesResponse::from_list(&list);
        assert_eq!(serde_json::to_value(&resp).unwrap(),
                   json!({"checkboxesListKey": "testKey", "checkboxes": [{"key": "a1", "answerValue": true}]}));
    }
}
