//! Constantes compartidas del dominio de journeys.
//!
//! Los nombres de campo se conservan tal como los reciben los clientes
//! existentes (camelCase), ya que forman parte de los mensajes de error.

/// Nombre del campo que identifica la página enviada por el cliente.
pub const CURRENT_PAGE_KEY_FIELD: &str = "currentPageKey";

/// Nombre del campo que identifica la página siguiente.
pub const NEXT_PAGE_KEY_FIELD: &str = "nextPageKey";

/// Estado con el que nace un journey si nadie indica otro.
pub const DEFAULT_STATUS: &str = "Started";

/// Número de la primera rama de un journey (las ramas se numeran desde 1).
pub const FIRST_BRANCH_NUMBER: u32 = 1;
