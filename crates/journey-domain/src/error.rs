// error.rs
use thiserror::Error;

/// Errores de validación del modelo de journeys.
#[derive(Debug, Error, PartialEq, Eq, Clone)]
pub enum DomainError {
    /// La clave de página no es alcanzable desde el estado del journey.
    #[error("Invalid \"{field}\"")]
    InvalidPageKey { field: &'static str },

    #[error("\"{0}\" must not be empty")]
    EmptyKey(&'static str),
}

impl DomainError {
    pub fn invalid_current_page_key() -> Self {
        DomainError::InvalidPageKey { field: crate::constants::CURRENT_PAGE_KEY_FIELD }
    }

    pub fn invalid_next_page_key() -> Self {
        DomainError::InvalidPageKey { field: crate::constants::NEXT_PAGE_KEY_FIELD }
    }
}
