// step.rs
use chrono::{DateTime, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::{Checkbox, CheckboxesList};

/// Estado persistido de una página del journey.
///
/// Un step existe solo cuando su página fue alcanzada o escrita. Guarda los
/// datos genéricos por `form_key` (JSON opaco, nunca se interpreta) y las
/// listas de checkboxes nombradas. Nunca se elimina.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Step {
    page_key: String,
    sequence_number: u32,
    submitted_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    #[serde(default)]
    generic_data: IndexMap<String, String>,
    #[serde(default)]
    checkboxes_lists: Vec<CheckboxesList>,
}

impl Step {
    pub fn new(page_key: impl Into<String>, sequence_number: u32, now: DateTime<Utc>) -> Self {
        Self { page_key: page_key.into(),
               sequence_number,
               submitted_at: now,
               updated_at: now,
               generic_data: IndexMap::new(),
               checkboxes_lists: Vec::new() }
    }

    pub fn page_key(&self) -> &str {
        &self.page_key
    }

    /// Posición (1-based) dentro de su rama.
    pub fn sequence_number(&self) -> u32 {
        self.sequence_number
    }

    pub fn submitted_at(&self) -> DateTime<Utc> {
        self.submitted_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    /// JSON guardado para un formulario.
    pub fn generic_data(&self, form_key: &str) -> Option<&str> {
        self.generic_data.get(form_key).map(String::as_str)
    }

    /// Formularios guardados en orden de primera escritura.
    pub fn generic_data_entries(&self) -> impl Iterator<Item = (&str, &str)> {
        self.generic_data.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Upsert del JSON de un formulario (gana la última escritura).
    ///
    /// Devuelve `true` si el valor almacenado cambió; reescribir el mismo JSON
    /// no toca `updated_at`.
    pub fn update_generic_data(&mut self,
                               form_key: impl Into<String>,
                               json: impl Into<String>,
                               now: DateTime<Utc>)
                               -> bool {
        let json = json.into();
        let form_key = form_key.into();
        if self.generic_data.get(&form_key) == Some(&json) {
            return false;
        }
        self.generic_data.insert(form_key, json);
        self.updated_at = now;
        true
    }

    pub fn checkboxes_list(&self, key: &str) -> Option<&CheckboxesList> {
        self.checkboxes_lists.iter().find(|l| l.key() == key)
    }

    pub fn checkboxes_lists(&self) -> &[CheckboxesList] {
        &self.checkboxes_lists
    }

    /// Upsert de una lista completa por su clave. Si ya existe, sus respuestas
    /// se fusionan por clave de checkbox.
    pub fn add_checkboxes_list(&mut self, list: CheckboxesList, now: DateTime<Utc>) -> bool {
        let (key, answers) = list.into_parts();
        self.update_checkboxes_list(&key, answers, now)
    }

    /// Fusiona respuestas en la lista `key`, creándola si no existe.
    pub fn update_checkboxes_list<I>(&mut self, key: &str, answers: I, now: DateTime<Utc>) -> bool
        where I: IntoIterator<Item = Checkbox>
    {
        let changed = match self.checkboxes_lists.iter_mut().find(|l| l.key() == key) {
            Some(list) => list.merge(answers),
            None => {
                self.checkboxes_lists.push(CheckboxesList::new(key, answers));
                true
            }
        };
        if changed {
            self.updated_at = now;
        }
        changed
    }

    pub(crate) fn set_sequence_number(&mut self, sequence_number: u32) {
        self.sequence_number = sequence_number;
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.updated_at = now;
    }
}
