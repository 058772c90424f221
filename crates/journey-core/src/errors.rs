//! Errores del motor de journeys.
//!
//! Todo error de negocio se devuelve tipado; `ErrorClass` permite a la capa
//! HTTP traducirlos de forma determinista (404/400/409/500).

use journey_domain::DomainError;
use thiserror::Error;

/// Error del puerto `JourneyStore`. El motor no lo reinterpreta: se propaga
/// tal cual al llamador.
#[derive(Debug, Error)]
pub enum StoreError {
    /// La versión del journey no coincide con la almacenada (escritura
    /// concurrente sobre la misma identidad).
    #[error("version conflict for journey {key}: expected {expected}, found {found}")]
    VersionConflict { key: String, expected: u64, found: u64 },
    #[error("journey store backend error: {0}")]
    Backend(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl StoreError {
    pub fn backend<E>(err: E) -> Self
        where E: Into<Box<dyn std::error::Error + Send + Sync>>
    {
        StoreError::Backend(err.into())
    }
}

#[derive(Debug, Error)]
pub enum JourneyError {
    #[error("{journey_type} journey is not started yet")]
    JourneyNotStarted { journey_type: String },
    #[error("{journey_type} journey is already started")]
    JourneyAlreadyStarted { journey_type: String },
    #[error("Step with page key \"{page_key}\" not found")]
    StepNotFound { page_key: String },
    #[error("Invalid \"{0}\"")]
    InvalidPageKey(&'static str),
    #[error("{0}")]
    RuleViolation(String),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Clasificación gruesa para traducir errores a respuestas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    NotFound,
    BadRequest,
    Conflict,
    Fatal,
}

impl JourneyError {
    pub fn class(&self) -> ErrorClass {
        classify_error(self)
    }

    pub(crate) fn not_started(journey_type: &str) -> Self {
        JourneyError::JourneyNotStarted { journey_type: journey_type.to_string() }
    }

    pub(crate) fn step_not_found(page_key: &str) -> Self {
        JourneyError::StepNotFound { page_key: page_key.to_string() }
    }
}

impl From<DomainError> for JourneyError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::InvalidPageKey { field } => JourneyError::InvalidPageKey(field),
            DomainError::EmptyKey(_) => JourneyError::RuleViolation(err.to_string()),
        }
    }
}

pub fn classify_error(err: &JourneyError) -> ErrorClass {
    match err {
        JourneyError::JourneyNotStarted { .. } | JourneyError::StepNotFound { .. } => ErrorClass::NotFound,
        JourneyError::InvalidPageKey(_) | JourneyError::RuleViolation(_) => ErrorClass::BadRequest,
        JourneyError::JourneyAlreadyStarted { .. } => ErrorClass::Conflict,
        JourneyError::Store(StoreError::VersionConflict { .. }) => ErrorClass::Conflict,
        JourneyError::Store(StoreError::Backend(_)) => ErrorClass::Fatal,
    }
}
