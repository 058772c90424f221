// branch.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Step;

/// Camino ordenado de steps dentro de un journey.
///
/// La rama activa es el camino vigente del miembro. Las ramas inactivas
/// guardan los steps que quedaron aparcados cuando el miembro cambió una
/// respuesta anterior y siguió otro camino.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    number: u32,
    is_active: bool,
    steps: Vec<Step>,
}

impl Branch {
    pub fn new(number: u32, is_active: bool) -> Self {
        Self { number,
               is_active,
               steps: Vec::new() }
    }

    pub fn number(&self) -> u32 {
        self.number
    }

    pub fn is_active(&self) -> bool {
        self.is_active
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    pub fn step(&self, page_key: &str) -> Option<&Step> {
        self.steps.iter().find(|s| s.page_key() == page_key)
    }

    pub fn step_mut(&mut self, page_key: &str) -> Option<&mut Step> {
        self.steps.iter_mut().find(|s| s.page_key() == page_key)
    }

    pub fn position(&self, page_key: &str) -> Option<usize> {
        self.steps.iter().position(|s| s.page_key() == page_key)
    }

    pub fn last_step(&self) -> Option<&Step> {
        self.steps.last()
    }

    pub fn contains(&self, page_key: &str) -> bool {
        self.position(page_key).is_some()
    }

    /// Agrega un step al final renumerándolo según su posición.
    pub(crate) fn push_step(&mut self, mut step: Step, now: DateTime<Utc>) -> &mut Step {
        step.set_sequence_number(self.steps.len() as u32 + 1);
        step.touch(now);
        self.steps.push(step);
        let last = self.steps.len() - 1;
        &mut self.steps[last]
    }

    /// Corta la rama después de `index` y devuelve la cola.
    pub(crate) fn split_off_after(&mut self, index: usize) -> Vec<Step> {
        self.steps.split_off(index + 1)
    }

    /// Crea una rama inactiva con los steps dados, renumerados desde 1.
    pub(crate) fn parked(number: u32, steps: Vec<Step>) -> Self {
        let mut branch = Self::new(number, false);
        for (i, mut step) in steps.into_iter().enumerate() {
            step.set_sequence_number(i as u32 + 1);
            branch.steps.push(step);
        }
        branch
    }

    /// Quita un step y renumera los restantes.
    pub(crate) fn remove_step(&mut self, page_key: &str) -> Option<Step> {
        let index = self.position(page_key)?;
        let step = self.steps.remove(index);
        for (i, s) in self.steps.iter_mut().enumerate() {
            s.set_sequence_number(i as u32 + 1);
        }
        Some(step)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn push_assigns_sequence_numbers() {
        let now = Utc::now();
        let mut branch = Branch::new(1, true);
        branch.push_step(Step::new("a", 0, now), now);
        branch.push_step(Step::new("b", 0, now), now);
        let seq: Vec<u32> = branch.steps().iter().map(|s| s.sequence_number()).collect();
        assert_eq!(seq, vec![1, 2]);
        assert_eq!(branch.last_step().map(|s| s.page_key()), Some("b"));
    }

    #[test]
    fn removing_renumbers_remaining_steps() {
        let now = Utc::now();
        let mut branch = Branch::parked(2, vec![Step::new("c", 3, now), Step::new("d", 4, now)]);
        assert!(!branch.is_active());
        assert_eq!(branch.step("c").map(|s| s.sequence_number()), Some(1));
        let removed = branch.remove_step("c").expect("step c");
        assert_eq!(removed.page_key(), "c");
        assert_eq!(branch.step("d").map(|s| s.sequence_number()), Some(1));
        assert!(branch.remove_step("zz").is_none());
    }
}
