// journey.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::constants::{CURRENT_PAGE_KEY_FIELD, FIRST_BRANCH_NUMBER, NEXT_PAGE_KEY_FIELD};
use crate::{Branch, DomainError, JourneyKey, Step};

/// Etapa derivada del journey.
///
/// Las transiciones válidas son:
/// - `NotStarted` -> `Started` (primer step materializado)
/// - `Started` -> `Terminal` (el cursor apunta a la página terminal)
///
/// No existe vuelta a `NotStarted`: ningún step se elimina.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JourneyStage {
    NotStarted,
    Started,
    Terminal,
}

/// Resultado de `Journey::submit_step`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepSubmission {
    /// Se materializó el step de la página siguiente.
    Advanced,
    /// Se reemplazó la página siguiente del último step.
    NextPageUpdated,
    /// Re-visita idempotente, sin cambios.
    Unchanged,
    /// El miembro cambió de camino; la cola anterior quedó aparcada en la rama
    /// indicada.
    Branched { parked_branch: u32 },
}

/// Raíz del agregado: un proceso de negocio multi-paso de un miembro.
///
/// Invariantes:
/// - `current_page_key` es el último step de la rama activa, o `None` solo
///   mientras no hay steps.
/// - `next_page_key` puede apuntar a una página sin step (aún no visitada).
/// - Las `page_key` son únicas entre todas las ramas.
/// - La página terminal nunca se materializa como step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Journey {
    key: JourneyKey,
    status: String,
    start_date: DateTime<Utc>,
    current_page_key: Option<String>,
    next_page_key: Option<String>,
    terminal_page_key: Option<String>,
    #[serde(default)]
    branches: Vec<Branch>,
    /// Token de concurrencia optimista gestionado por el store. No forma
    /// parte del payload serializado.
    #[serde(skip)]
    version: u64,
}

impl Journey {
    /// Crea un journey sin steps cuyo cursor apunta a la primera página.
    ///
    /// # Errores
    /// Retorna `DomainError::EmptyKey` si el tipo o la primera página están
    /// vacíos y `DomainError::InvalidPageKey` si la primera página es la
    /// terminal.
    pub fn new(key: JourneyKey,
               status: impl Into<String>,
               first_page_key: impl Into<String>,
               terminal_page_key: Option<String>,
               now: DateTime<Utc>)
               -> Result<Self, DomainError> {
        let first_page_key = first_page_key.into();
        if key.journey_type.is_empty() {
            return Err(DomainError::EmptyKey("journeyType"));
        }
        if first_page_key.is_empty() {
            return Err(DomainError::EmptyKey(NEXT_PAGE_KEY_FIELD));
        }
        if terminal_page_key.as_deref() == Some(first_page_key.as_str()) {
            return Err(DomainError::invalid_next_page_key());
        }
        Ok(Self { key,
                  status: status.into(),
                  start_date: now,
                  current_page_key: None,
                  next_page_key: Some(first_page_key),
                  terminal_page_key,
                  branches: Vec::new(),
                  version: 0 })
    }

    /// Crea un journey con su primer step ya materializado en la rama 1.
    ///
    /// # Errores
    /// Los mismos que `new` y `submit_step`.
    pub fn start(key: JourneyKey,
                 status: impl Into<String>,
                 current_page_key: &str,
                 next_page_key: &str,
                 terminal_page_key: Option<String>,
                 now: DateTime<Utc>)
                 -> Result<Self, DomainError> {
        if current_page_key.is_empty() {
            return Err(DomainError::EmptyKey(CURRENT_PAGE_KEY_FIELD));
        }
        if terminal_page_key.as_deref() == Some(current_page_key) {
            return Err(DomainError::invalid_current_page_key());
        }
        let mut journey = Self::new(key, status, current_page_key, terminal_page_key, now)?;
        journey.submit_step(current_page_key, next_page_key, now)?;
        Ok(journey)
    }

    pub fn key(&self) -> &JourneyKey {
        &self.key
    }

    pub fn journey_type(&self) -> &str {
        &self.key.journey_type
    }

    pub fn status(&self) -> &str {
        &self.status
    }

    /// Token de concurrencia optimista (0 = nunca persistido).
    pub fn version(&self) -> u64 {
        self.version
    }

    /// Lo fija el store al leer o escribir el journey.
    pub fn set_version(&mut self, version: u64) {
        self.version = version;
    }

    pub fn set_status(&mut self, status: impl Into<String>) {
        self.status = status.into();
    }

    pub fn start_date(&self) -> DateTime<Utc> {
        self.start_date
    }

    pub fn current_page_key(&self) -> Option<&str> {
        self.current_page_key.as_deref()
    }

    pub fn next_page_key(&self) -> Option<&str> {
        self.next_page_key.as_deref()
    }

    pub fn terminal_page_key(&self) -> Option<&str> {
        self.terminal_page_key.as_deref()
    }

    pub fn branches(&self) -> &[Branch] {
        &self.branches
    }

    pub fn active_branch(&self) -> Option<&Branch> {
        self.branches.iter().find(|b| b.is_active())
    }

    /// Page keys del camino vigente, en orden.
    pub fn active_page_keys(&self) -> Vec<&str> {
        self.active_branch()
            .map(|b| b.steps().iter().map(Step::page_key).collect())
            .unwrap_or_default()
    }

    pub fn stage(&self) -> JourneyStage {
        if self.branches.iter().all(Branch::is_empty) {
            return JourneyStage::NotStarted;
        }
        match self.next_page_key.as_deref() {
            Some(next) if self.is_terminal_page(next) => JourneyStage::Terminal,
            _ => JourneyStage::Started,
        }
    }

    /// Busca el step de una página recorriendo todas las ramas.
    pub fn step(&self, page_key: &str) -> Option<&Step> {
        self.branches.iter().find_map(|b| b.step(page_key))
    }

    pub fn step_mut(&mut self, page_key: &str) -> Option<&mut Step> {
        self.branches.iter_mut().find_map(|b| b.step_mut(page_key))
    }

    pub fn is_terminal_page(&self, page_key: &str) -> bool {
        self.terminal_page_key.as_deref() == Some(page_key)
    }

    /// `true` si la página es la siguiente del cursor (válida, aún sin visitar).
    pub fn is_next_page(&self, page_key: &str) -> bool {
        self.next_page_key.as_deref() == Some(page_key)
    }

    /// Materializa el step de la página siguiente en la rama activa y mueve el
    /// cursor hacia él. Si la página quedó aparcada en una rama inactiva, el
    /// step (con sus datos) vuelve al camino vigente.
    ///
    /// Tras avanzar, `next_page_key` queda vacío hasta el próximo
    /// `submit_step`.
    ///
    /// # Errores
    /// `InvalidPageKey("currentPageKey")` si `page_key` no es la página
    /// siguiente o es la terminal.
    pub fn advance_to(&mut self, page_key: &str, now: DateTime<Utc>) -> Result<&mut Step, DomainError> {
        if !self.is_next_page(page_key) || self.is_terminal_page(page_key) {
            return Err(DomainError::invalid_current_page_key());
        }
        if self.active_branch().is_some_and(|b| b.contains(page_key)) {
            return Err(DomainError::invalid_current_page_key());
        }
        let step = self.take_parked_step(page_key)
                       .unwrap_or_else(|| Step::new(page_key, 0, now));
        self.current_page_key = Some(page_key.to_string());
        self.next_page_key = None;
        let index = self.ensure_active_branch();
        Ok(self.branches[index].push_step(step, now))
    }

    /// Registra que el miembro envió `current_page_key` y que el flujo sigue
    /// en `next_page_key`.
    ///
    /// # Errores
    /// - `InvalidPageKey("currentPageKey")` si la página no está en el camino
    ///   vigente ni es la siguiente.
    /// - `InvalidPageKey("nextPageKey")` si la siguiente ya está en el camino
    ///   (produciría un ciclo) o coincide con la actual.
    pub fn submit_step(&mut self,
                       current_page_key: &str,
                       next_page_key: &str,
                       now: DateTime<Utc>)
                       -> Result<StepSubmission, DomainError> {
        if next_page_key.is_empty() {
            return Err(DomainError::EmptyKey(NEXT_PAGE_KEY_FIELD));
        }
        if current_page_key == next_page_key {
            return Err(DomainError::invalid_next_page_key());
        }
        if self.is_terminal_page(current_page_key) {
            return Err(DomainError::invalid_current_page_key());
        }

        if self.is_next_page(current_page_key) {
            if self.active_branch().is_some_and(|b| b.contains(next_page_key)) {
                return Err(DomainError::invalid_next_page_key());
            }
            self.advance_to(current_page_key, now)?;
            self.next_page_key = Some(next_page_key.to_string());
            return Ok(StepSubmission::Advanced);
        }

        let active = self.active_index().ok_or_else(DomainError::invalid_current_page_key)?;
        let position = self.branches[active].position(current_page_key)
                                            .ok_or_else(DomainError::invalid_current_page_key)?;
        let branch = &self.branches[active];

        // Último step del camino: solo cambia el destino.
        if position + 1 == branch.len() {
            if branch.contains(next_page_key) {
                return Err(DomainError::invalid_next_page_key());
            }
            if self.is_next_page(next_page_key) {
                return Ok(StepSubmission::Unchanged);
            }
            self.next_page_key = Some(next_page_key.to_string());
            if let Some(step) = self.branches[active].step_mut(current_page_key) {
                step.touch(now);
            }
            return Ok(StepSubmission::NextPageUpdated);
        }

        if branch.steps()[position + 1].page_key() == next_page_key {
            return Ok(StepSubmission::Unchanged);
        }
        if branch.steps()[..=position].iter().any(|s| s.page_key() == next_page_key) {
            return Err(DomainError::invalid_next_page_key());
        }

        let tail = self.branches[active].split_off_after(position);
        let parked_branch = self.next_branch_number();
        self.branches.push(Branch::parked(parked_branch, tail));
        self.current_page_key = Some(current_page_key.to_string());
        self.next_page_key = Some(next_page_key.to_string());
        if let Some(step) = self.branches[active].step_mut(current_page_key) {
            step.touch(now);
        }
        Ok(StepSubmission::Branched { parked_branch })
    }

    /// Página anterior en el camino vigente (navegación "atrás").
    ///
    /// Para la página siguiente o la terminal es la página actual.
    pub fn previous_page_key(&self, page_key: &str) -> Option<&str> {
        if self.is_next_page(page_key) || self.is_terminal_page(page_key) {
            return self.current_page_key.as_deref();
        }
        let branch = self.active_branch()?;
        let position = branch.position(page_key)?;
        position.checked_sub(1).map(|p| branch.steps()[p].page_key())
    }

    fn active_index(&self) -> Option<usize> {
        self.branches.iter().position(|b| b.is_active())
    }

    fn ensure_active_branch(&mut self) -> usize {
        if let Some(index) = self.active_index() {
            return index;
        }
        let number = self.next_branch_number();
        self.branches.push(Branch::new(number, true));
        self.branches.len() - 1
    }

    fn next_branch_number(&self) -> u32 {
        self.branches
            .iter()
            .map(Branch::number)
            .max()
            .map_or(FIRST_BRANCH_NUMBER, |n| n + 1)
    }

    /// Saca un step de las ramas inactivas; las ramas que quedan vacías se
    /// descartan.
    fn take_parked_step(&mut self, page_key: &str) -> Option<Step> {
        let step = self.branches
                       .iter_mut()
                       .filter(|b| !b.is_active())
                       .find_map(|b| b.remove_step(page_key));
        self.branches.retain(|b| b.is_active() || !b.is_empty());
        step
    }
}
