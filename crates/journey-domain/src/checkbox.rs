// checkbox.rs
use serde::{Deserialize, Serialize};

/// Respuesta individual de una lista de checkboxes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Checkbox {
    pub key: String,
    pub answer_value: bool,
}

impl Checkbox {
    pub fn new(key: impl Into<String>, answer_value: bool) -> Self {
        Self { key: key.into(),
               answer_value }
    }
}

/// Lista nombrada de checkboxes de un step.
///
/// Invariante: las claves de checkbox son únicas dentro de la lista y
/// conservan el orden en que se vieron por primera vez.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckboxesList {
    key: String,
    checkboxes: Vec<Checkbox>,
}

impl CheckboxesList {
    /// Crea una lista aplicando la misma semántica de upsert que `merge`: si
    /// una clave aparece repetida gana el último valor.
    pub fn new<I>(key: impl Into<String>, checkboxes: I) -> Self
        where I: IntoIterator<Item = Checkbox>
    {
        let mut list = Self { key: key.into(),
                              checkboxes: Vec::new() };
        list.merge(checkboxes);
        list
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn checkboxes(&self) -> &[Checkbox] {
        &self.checkboxes
    }

    pub fn is_empty(&self) -> bool {
        self.checkboxes.is_empty()
    }

    /// Valor respondido para una clave, si existe.
    pub fn answer(&self, checkbox_key: &str) -> Option<bool> {
        self.checkboxes
            .iter()
            .find(|c| c.key == checkbox_key)
            .map(|c| c.answer_value)
    }

    pub fn into_parts(self) -> (String, Vec<Checkbox>) {
        (self.key, self.checkboxes)
    }

    /// Upsert por clave de checkbox. Devuelve `true` si algo cambió.
    pub fn merge<I>(&mut self, answers: I) -> bool
        where I: IntoIterator<Item = Checkbox>
    {
        let mut changed = false;
        for answer in answers {
            match self.checkboxes.iter_mut().find(|c| c.key == answer.key) {
                Some(existing) => {
                    if existing.answer_value != answer.answer_value {
                        existing.answer_value = answer.answer_value;
                        changed = true;
                    }
                }
                None => {
                    self.checkboxes.push(answer);
                    changed = true;
                }
            }
        }
        changed
    }
}
