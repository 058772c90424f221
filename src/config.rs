//! Configuración central de la aplicación.
//! Carga variables de entorno (.env) y expone una estructura inmutable (`CONFIG`).
use std::env;

use journey_domain::constants::DEFAULT_STATUS;
use journey_persistence::{build_pool, DbConfig, PersistenceError, PgPool};
use once_cell::sync::Lazy;

/// Configuración global de la aplicación.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Estado con el que nacen los journeys (`JOURNEY_DEFAULT_STATUS`).
    pub default_status: String,
    /// Conexión Postgres; `None` si `DATABASE_URL` no está definido.
    pub database: Option<DbConfig>,
}

impl AppConfig {
    pub fn from_env() -> Self {
        journey_persistence::init_dotenv();
        let default_status = env::var("JOURNEY_DEFAULT_STATUS").ok()
                                                              .filter(|s| !s.trim().is_empty())
                                                              .unwrap_or_else(|| DEFAULT_STATUS.to_string());
        Self { default_status,
               database: DbConfig::from_env().ok() }
    }

    /// Pool Postgres ya migrado según `database`.
    ///
    /// # Errores
    /// `PersistenceError::Config` si no hay `DATABASE_URL`; errores del pool
    /// en otro caso.
    pub fn build_pool(&self) -> Result<PgPool, PersistenceError> {
        let db = self.database
                     .as_ref()
                     .ok_or_else(|| PersistenceError::Config("DATABASE_URL no definido".into()))?;
        build_pool(&db.url, db.min_connections, db.max_connections)
    }
}

/// Instancia global perezosa de configuración, evaluada una sola vez.
pub static CONFIG: Lazy<AppConfig> = Lazy::new(AppConfig::from_env);
