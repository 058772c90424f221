//! Orquestación de journeys.
//!
//! `JourneyService` resuelve el journey de la identidad indicada, valida la
//! page key pedida con el validador de navegación y delega en el step la
//! lectura o escritura. Las lecturas nunca mutan; las escrituras persisten el
//! agregado completo mediante el `JourneyStore`.
//!
//! Asimetría documentada entre tipos de dato sobre la página siguiente:
//! - datos genéricos: guardar siempre materializa el step y avanza el cursor;
//! - checkboxes: guardar una lista vacía es un no-op exitoso; solo con
//!   contenido se materializa el step.
//!
//! Guardar sobre la página terminal es un no-op exitoso en ambos casos.

use chrono::Utc;
use journey_domain::constants::{CURRENT_PAGE_KEY_FIELD, DEFAULT_STATUS};
use journey_domain::{Checkbox, DomainError, Journey, JourneyKey, MemberRef, StepSubmission};
use log::{debug, error, info, warn};

use crate::errors::{JourneyError, StoreError};
use crate::navigation::{classify_page_key, PageKeyClass};
use crate::responses::{CheckboxesResponse, GenericDataResponse};
use crate::rules::JourneyRulesRegistry;
use crate::store::JourneyStore;

pub struct JourneyService<S: JourneyStore> {
    store: S,
    rules: JourneyRulesRegistry,
    default_status: String,
}

impl<S: JourneyStore> JourneyService<S> {
    pub fn new(store: S) -> Self {
        Self { store,
               rules: JourneyRulesRegistry::default(),
               default_status: DEFAULT_STATUS.to_string() }
    }

    pub fn with_rules(mut self, rules: JourneyRulesRegistry) -> Self {
        self.rules = rules;
        self
    }

    /// Estado con el que nacen los journeys iniciados por este servicio.
    pub fn with_default_status(mut self, status: impl Into<String>) -> Self {
        self.default_status = status.into();
        self
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Punto de entrada común: `None` si el miembro no inició ese journey.
    pub async fn get_journey(&self, member: &MemberRef, journey_type: &str) -> Result<Option<Journey>, JourneyError> {
        let key = JourneyKey::new(journey_type, member);
        Ok(self.store.find(&key).await?)
    }

    /// Inicia un journey con su primera página ya materializada.
    ///
    /// # Errores
    /// `JourneyAlreadyStarted` si ya existe uno para la identidad (también
    /// cuando otro request lo creó en paralelo).
    pub async fn start_journey(&self,
                               member: &MemberRef,
                               journey_type: &str,
                               current_page_key: &str,
                               next_page_key: &str,
                               terminal_page_key: Option<&str>)
                               -> Result<Journey, JourneyError> {
        let key = JourneyKey::new(journey_type, member);
        if self.store.find(&key).await?.is_some() {
            return Err(JourneyError::JourneyAlreadyStarted { journey_type: journey_type.to_string() });
        }
        let mut journey = Journey::start(key,
                                         self.default_status.clone(),
                                         current_page_key,
                                         next_page_key,
                                         terminal_page_key.map(str::to_string),
                                         Utc::now())?;
        self.apply_status(&mut journey);
        let saved = self.store.save(&mut journey).await;
        match saved {
            Ok(()) => {}
            Err(StoreError::VersionConflict { .. }) => {
                warn!("start_journey:race key={}", journey.key());
                return Err(JourneyError::JourneyAlreadyStarted { journey_type: journey_type.to_string() });
            }
            Err(e) => return Err(self.store_failure(journey.key(), e)),
        }
        info!("journey started key={} current={current_page_key} next={next_page_key}",
              journey.key());
        Ok(journey)
    }

    /// Mueve el cursor: el miembro envió `current_page_key` y continúa en
    /// `next_page_key`. Las re-visitas sin cambios no escriben.
    pub async fn submit_step(&self,
                             member: &MemberRef,
                             journey_type: &str,
                             current_page_key: &str,
                             next_page_key: &str)
                             -> Result<StepSubmission, JourneyError> {
        let mut journey = self.load(member, journey_type).await?;
        let outcome = journey.submit_step(current_page_key, next_page_key, Utc::now())?;
        match outcome {
            StepSubmission::Unchanged => {
                debug!("submit_step:unchanged key={} page={current_page_key}", journey.key());
                return Ok(outcome);
            }
            StepSubmission::Branched { parked_branch } => {
                info!("journey branched key={} at={current_page_key} next={next_page_key} parked_branch={parked_branch}",
                      journey.key());
            }
            StepSubmission::Advanced | StepSubmission::NextPageUpdated => {
                info!("journey cursor moved key={} current={current_page_key} next={next_page_key}",
                      journey.key());
            }
        }
        self.apply_status(&mut journey);
        self.persist(&mut journey).await?;
        Ok(outcome)
    }

    /// Página anterior a `page_key` en el camino vigente.
    pub async fn previous_page_key(&self,
                                   member: &MemberRef,
                                   journey_type: &str,
                                   page_key: &str)
                                   -> Result<Option<String>, JourneyError> {
        let journey = self.load(member, journey_type).await?;
        if classify_page_key(&journey, page_key) == PageKeyClass::Unknown {
            return Err(JourneyError::step_not_found(page_key));
        }
        Ok(journey.previous_page_key(page_key).map(str::to_string))
    }

    pub async fn get_generic_data(&self,
                                  member: &MemberRef,
                                  journey_type: &str,
                                  page_key: &str,
                                  form_key: &str)
                                  -> Result<GenericDataResponse, JourneyError> {
        let journey = self.load(member, journey_type).await?;
        if classify_page_key(&journey, page_key).reads_empty() {
            return Ok(GenericDataResponse::empty(form_key));
        }
        let step = journey.step(page_key)
                          .ok_or_else(|| JourneyError::step_not_found(page_key))?;
        Ok(GenericDataResponse { form_key: form_key.to_string(),
                                 generic_data_json: step.generic_data(form_key).unwrap_or_default().to_string() })
    }

    pub async fn save_generic_data(&self,
                                   member: &MemberRef,
                                   journey_type: &str,
                                   page_key: &str,
                                   form_key: &str,
                                   json: &str)
                                   -> Result<(), JourneyError> {
        let mut journey = self.load(member, journey_type).await?;
        let class = classify_page_key(&journey, page_key);
        match class {
            PageKeyClass::Terminal => {
                debug!("save_generic_data:terminal page key={} page={page_key}", journey.key());
                return Ok(());
            }
            PageKeyClass::Unknown => return Err(JourneyError::InvalidPageKey(CURRENT_PAGE_KEY_FIELD)),
            PageKeyClass::Next | PageKeyClass::Visited => {}
        }
        if form_key.is_empty() {
            return Err(DomainError::EmptyKey("formKey").into());
        }
        self.rules
            .rules_for(journey_type)
            .validate_generic_data(page_key, form_key, json)
            .map_err(JourneyError::RuleViolation)?;

        let now = Utc::now();
        let changed = if class == PageKeyClass::Next {
            journey.advance_to(page_key, now)?
                   .update_generic_data(form_key, json, now);
            info!("journey advanced key={} current={page_key}", journey.key());
            self.apply_status(&mut journey);
            true
        } else {
            journey.step_mut(page_key)
                   .ok_or_else(|| JourneyError::step_not_found(page_key))?
                   .update_generic_data(form_key, json, now)
        };
        if !changed {
            debug!("save_generic_data:unchanged key={} page={page_key} form={form_key}",
                   journey.key());
            return Ok(());
        }
        self.persist(&mut journey).await
    }

    pub async fn get_checkboxes(&self,
                                member: &MemberRef,
                                journey_type: &str,
                                page_key: &str,
                                checkboxes_list_key: &str)
                                -> Result<CheckboxesResponse, JourneyError> {
        let journey = self.load(member, journey_type).await?;
        if classify_page_key(&journey, page_key).reads_empty() {
            return Ok(CheckboxesResponse::empty(checkboxes_list_key));
        }
        let step = journey.step(page_key)
                          .ok_or_else(|| JourneyError::step_not_found(page_key))?;
        Ok(step.checkboxes_list(checkboxes_list_key)
               .map(CheckboxesResponse::from_list)
               .unwrap_or_else(|| CheckboxesResponse::empty(checkboxes_list_key)))
    }

    pub async fn save_checkboxes(&self,
                                 member: &MemberRef,
                                 journey_type: &str,
                                 page_key: &str,
                                 checkboxes_list_key: &str,
                                 checkboxes: Vec<Checkbox>)
                                 -> Result<(), JourneyError> {
        let mut journey = self.load(member, journey_type).await?;
        let class = classify_page_key(&journey, page_key);
        match class {
            PageKeyClass::Terminal => {
                debug!("save_checkboxes:terminal page key={} page={page_key}", journey.key());
                return Ok(());
            }
            PageKeyClass::Next if checkboxes.is_empty() => {
                debug!("save_checkboxes:next page without answers key={} page={page_key}",
                       journey.key());
                return Ok(());
            }
            PageKeyClass::Unknown => return Err(JourneyError::step_not_found(page_key)),
            PageKeyClass::Next | PageKeyClass::Visited => {}
        }
        if checkboxes_list_key.is_empty() {
            return Err(DomainError::EmptyKey("checkboxesListKey").into());
        }
        self.rules
            .rules_for(journey_type)
            .validate_checkboxes(page_key, checkboxes_list_key, &checkboxes)
            .map_err(JourneyError::RuleViolation)?;

        let now = Utc::now();
        let changed = if class == PageKeyClass::Next {
            journey.advance_to(page_key, now)?
                   .update_checkboxes_list(checkboxes_list_key, checkboxes, now);
            info!("journey advanced key={} current={page_key}", journey.key());
            self.apply_status(&mut journey);
            true
        } else {
            journey.step_mut(page_key)
                   .ok_or_else(|| JourneyError::step_not_found(page_key))?
                   .update_checkboxes_list(checkboxes_list_key, checkboxes, now)
        };
        if !changed {
            debug!("save_checkboxes:unchanged key={} page={page_key} list={checkboxes_list_key}",
                   journey.key());
            return Ok(());
        }
        self.persist(&mut journey).await
    }

    async fn load(&self, member: &MemberRef, journey_type: &str) -> Result<Journey, JourneyError> {
        self.get_journey(member, journey_type)
            .await?
            .ok_or_else(|| JourneyError::not_started(journey_type))
    }

    async fn persist(&self, journey: &mut Journey) -> Result<(), JourneyError> {
        let saved = self.store.save(journey).await;
        saved.map_err(|e| self.store_failure(journey.key(), e))
    }

    fn store_failure(&self, key: &JourneyKey, err: StoreError) -> JourneyError {
        match &err {
            StoreError::VersionConflict { .. } => warn!("journey save conflict key={key}: {err}"),
            StoreError::Backend(_) => error!("journey save failed key={key}: {err}"),
        }
        err.into()
    }

    fn apply_status(&self, journey: &mut Journey) {
        let status = self.rules
                         .rules_for(journey.journey_type())
                         .status_after_advance(journey);
        if let Some(status) = status {
            journey.set_status(status);
        }
    }
}
