//! Implementación Postgres (Diesel) del `JourneyStore`.
//!
//! Cada journey ocupa una fila de `journeys`, identificada por la tupla
//! `(journey_type, business_group, reference_number)`. El grafo completo
//! (ramas, steps, datos de formularios y checkboxes) se guarda como JSONB en
//! `payload`; el resto de columnas replica el cursor para consultas y
//! diagnóstico.
//!
//! Concurrencia: la columna `version` implementa bloqueo optimista. Una
//! escritura con versión 0 es un `INSERT ... ON CONFLICT DO NOTHING`; las
//! demás son un `UPDATE` condicionado a la versión leída. Cero filas
//! afectadas se traduce en `PersistenceError::VersionConflict`.
//!
//! Diesel es síncrono: las llamadas corren en el pool bloqueante de tokio
//! (`spawn_blocking`) y reintentan errores transitorios con backoff corto.

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use journey_core::{JourneyStore, StoreError};
use journey_domain::{Journey, JourneyKey};
use log::{debug, error, warn};
use serde_json::Value;

use crate::error::PersistenceError;
use crate::migrations::run_pending_migrations;
use crate::schema::journeys;

/// Alias de tipo para el pool r2d2 de conexiones Postgres.
///
/// El pool se construye con `min_idle` y `max_size`; al construirlo se corren
/// las migraciones pendientes (una sola vez).
pub type PgPool = r2d2::Pool<ConnectionManager<PgConnection>>;
pub type PgPooledConnection = r2d2::PooledConnection<ConnectionManager<PgConnection>>;

/// Proveedor abstracto de conexiones.
///
/// Permite inyectar un pool real o un proveedor de pruebas sin acoplar el
/// store a r2d2. Debe devolver una conexión válida o
/// `PersistenceError::TransientIo`.
pub trait ConnectionProvider: Send + Sync + 'static {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError>;
}

/// `ConnectionProvider` respaldado por un `PgPool`.
pub struct PoolProvider {
    pub pool: PgPool,
}

impl ConnectionProvider for PoolProvider {
    fn connection(&self) -> Result<PgPooledConnection, PersistenceError> {
        self.pool
            .get()
            .map_err(|e| PersistenceError::TransientIo(format!("pool error: {e}")))
    }
}

/// Fila de `journeys` para lecturas (mismo orden que `schema.rs`).
#[derive(Queryable, Debug)]
pub struct JourneyRow {
    pub journey_type: String,
    pub business_group: String,
    pub reference_number: String,
    pub status: String,
    pub start_date: DateTime<Utc>,
    pub current_page_key: Option<String>,
    pub next_page_key: Option<String>,
    pub terminal_page_key: Option<String>,
    pub payload: Value,
    pub version: i64,
    pub updated_at: DateTime<Utc>,
}

/// Fila para insertar un journey nuevo (`updated_at` lo asigna la DB).
#[derive(Insertable, Debug)]
#[diesel(table_name = journeys)]
pub struct NewJourneyRow<'a> {
    pub journey_type: &'a str,
    pub business_group: &'a str,
    pub reference_number: &'a str,
    pub status: &'a str,
    pub start_date: DateTime<Utc>,
    pub current_page_key: Option<&'a str>,
    pub next_page_key: Option<&'a str>,
    pub terminal_page_key: Option<&'a str>,
    pub payload: &'a Value,
    pub version: i64,
}

/// Resultado de una escritura condicionada por versión.
enum WriteOutcome {
    Written,
    Stale { found: u64 },
}

/// Determina si un error es transitorio (recomendado reintentar con backoff).
///
/// Pool agotado y conexión cerrada llegan como `TransientIo`. Diesel reporta
/// el deadlock como `Unknown`; se detecta por texto.
fn is_retryable(e: &PersistenceError) -> bool {
    match e {
        PersistenceError::SerializationConflict | PersistenceError::TransientIo(_) => true,
        PersistenceError::Unknown(msg) => msg.to_lowercase().contains("deadlock detected"),
        _ => false,
    }
}

/// Retry simple con backoff lineal (hasta 3 reintentos: 15ms, 30ms, 45ms).
///
/// No altera la semántica de negocio: solo repite la unidad de trabajo de
/// `f`. Los conflictos de versión nunca se reintentan.
fn with_retry<F, T>(mut f: F) -> Result<T, PersistenceError>
    where F: FnMut() -> Result<T, PersistenceError>
{
    let mut attempts = 0;
    loop {
        match f() {
            Err(e) if is_retryable(&e) && attempts < 3 => {
                let delay_ms = 15 * ((attempts + 1) as u64);
                warn!("retryable error (attempt {}): {:?} -> sleeping {}ms",
                      attempts + 1,
                      e,
                      delay_ms);
                std::thread::sleep(std::time::Duration::from_millis(delay_ms));
                attempts += 1;
            }
            r => return r,
        }
    }
}

/// Reconstruye el agregado desde el JSONB y le asigna la versión de la fila.
fn journey_from_row(row: JourneyRow) -> Result<Journey, PersistenceError> {
    let mut journey: Journey = serde_json::from_value(row.payload)?;
    let key = journey.key();
    if key.journey_type != row.journey_type
       || key.business_group != row.business_group
       || key.reference_number != row.reference_number
    {
        return Err(PersistenceError::Payload(format!("payload key {key} does not match row {}:{}/{}",
                                                     row.journey_type,
                                                     row.business_group,
                                                     row.reference_number)));
    }
    journey.set_version(row.version as u64);
    Ok(journey)
}

fn load_journey(provider: &dyn ConnectionProvider, key: &JourneyKey) -> Result<Option<Journey>, PersistenceError> {
    let row: Option<JourneyRow> = with_retry(|| {
        let mut conn = provider.connection()?;
        journeys::table.filter(journeys::journey_type.eq(&key.journey_type))
                       .filter(journeys::business_group.eq(&key.business_group))
                       .filter(journeys::reference_number.eq(&key.reference_number))
                       .first::<JourneyRow>(&mut conn)
                       .optional()
                       .map_err(PersistenceError::from)
    })?;
    row.map(journey_from_row).transpose()
}

/// Inserta o actualiza el journey según su versión; devuelve la nueva versión.
fn write_journey(provider: &dyn ConnectionProvider, journey: &Journey) -> Result<u64, PersistenceError> {
    let key = journey.key();
    let expected = journey.version();
    let new_version = expected + 1;
    let payload = serde_json::to_value(journey)?;

    let outcome = with_retry(|| {
        let mut conn = provider.connection()?;
        conn.build_transaction()
            .read_write()
            .run(|tx_conn| {
                let by_key = journeys::table.filter(journeys::journey_type.eq(&key.journey_type))
                                            .filter(journeys::business_group.eq(&key.business_group))
                                            .filter(journeys::reference_number.eq(&key.reference_number));
                let affected = if expected == 0 {
                    let row = NewJourneyRow { journey_type: &key.journey_type,
                                              business_group: &key.business_group,
                                              reference_number: &key.reference_number,
                                              status: journey.status(),
                                              start_date: journey.start_date(),
                                              current_page_key: journey.current_page_key(),
                                              next_page_key: journey.next_page_key(),
                                              terminal_page_key: journey.terminal_page_key(),
                                              payload: &payload,
                                              version: new_version as i64 };
                    diesel::insert_into(journeys::table).values(&row)
                                                        .on_conflict_do_nothing()
                                                        .execute(tx_conn)?
                } else {
                    diesel::update(by_key.clone().filter(journeys::version.eq(expected as i64)))
                        .set((journeys::status.eq(journey.status()),
                              journeys::current_page_key.eq(journey.current_page_key()),
                              journeys::next_page_key.eq(journey.next_page_key()),
                              journeys::terminal_page_key.eq(journey.terminal_page_key()),
                              journeys::payload.eq(&payload),
                              journeys::version.eq(new_version as i64),
                              journeys::updated_at.eq(Utc::now())))
                        .execute(tx_conn)?
                };
                if affected == 1 {
                    return Ok(WriteOutcome::Written);
                }
                let found: Option<i64> = by_key.select(journeys::version).first(tx_conn).optional()?;
                Ok::<WriteOutcome, diesel::result::Error>(WriteOutcome::Stale { found: found.unwrap_or(0) as u64 })
            })
            .map_err(PersistenceError::from)
    })?;

    match outcome {
        WriteOutcome::Written => Ok(new_version),
        WriteOutcome::Stale { found } => Err(PersistenceError::VersionConflict { key: key.to_string(),
                                                                                 expected,
                                                                                 found }),
    }
}

/// `JourneyStore` sobre Postgres.
///
/// Los clones comparten el mismo `ConnectionProvider`.
pub struct PgJourneyStore<P: ConnectionProvider> {
    provider: Arc<P>,
}

impl<P: ConnectionProvider> PgJourneyStore<P> {
    /// Crea un store a partir de un `ConnectionProvider` (generalmente
    /// `PoolProvider`).
    pub fn new(provider: P) -> Self {
        Self { provider: Arc::new(provider) }
    }
}

impl<P: ConnectionProvider> Clone for PgJourneyStore<P> {
    fn clone(&self) -> Self {
        Self { provider: Arc::clone(&self.provider) }
    }
}

impl PgJourneyStore<PoolProvider> {
    pub fn from_pool(pool: PgPool) -> Self {
        Self::new(PoolProvider { pool })
    }
}

#[async_trait]
impl<P: ConnectionProvider> JourneyStore for PgJourneyStore<P> {
    async fn find(&self, key: &JourneyKey) -> Result<Option<Journey>, StoreError> {
        debug!("find:start key={key}");
        let provider = Arc::clone(&self.provider);
        let owned_key = key.clone();
        let loaded = tokio::task::spawn_blocking(move || load_journey(&*provider, &owned_key))
            .await
            .map_err(StoreError::backend)?;
        match loaded {
            Ok(found) => {
                debug!("find:done key={key} found={}", found.is_some());
                Ok(found)
            }
            Err(e) => {
                error!("find:error key={key} err={e:?}");
                Err(e.into())
            }
        }
    }

    async fn save(&self, journey: &mut Journey) -> Result<(), StoreError> {
        debug!("save:start key={} version={}", journey.key(), journey.version());
        let provider = Arc::clone(&self.provider);
        let snapshot = journey.clone();
        let written = tokio::task::spawn_blocking(move || write_journey(&*provider, &snapshot))
            .await
            .map_err(StoreError::backend)?;
        match written {
            Ok(version) => {
                journey.set_version(version);
                debug!("save:done key={} version={version}", journey.key());
                Ok(())
            }
            Err(e @ PersistenceError::VersionConflict { .. }) => {
                warn!("save:conflict {e}");
                Err(e.into())
            }
            Err(e) => {
                error!("save:error key={} err={e:?}", journey.key());
                Err(e.into())
            }
        }
    }
}

/// Construye un pool Postgres r2d2 a partir de URL y corre las migraciones
/// pendientes.
///
/// Si `min_size > max_size` se usa `min_size = max_size`; los tamaños 0 se
/// elevan a 1.
///
/// # Errores
/// `PersistenceError::TransientIo` ante errores del pool/manager.
pub fn build_pool(database_url: &str, min_size: u32, max_size: u32) -> Result<PgPool, PersistenceError> {
    let validated_min = min_size.max(1);
    let validated_max = max_size.max(1);
    if validated_min > validated_max {
        warn!("min_size > max_size ({validated_min} > {validated_max}), ajustando min=max");
    }
    let final_min = validated_min.min(validated_max);
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    let pool = r2d2::Pool::builder().min_idle(Some(final_min))
                                    .max_size(validated_max)
                                    .build(manager)
                                    .map_err(|e| PersistenceError::TransientIo(format!("pool build: {e}")))?;
    {
        let mut conn = pool.get()
                           .map_err(|e| PersistenceError::TransientIo(format!("pool get for migrations: {e}")))?;
        run_pending_migrations(&mut conn)?;
    }
    Ok(pool)
}

/// Helper de desarrollo: carga `.env`, lee `DbConfig` y construye un pool ya
/// migrado.
pub fn build_dev_pool_from_env() -> Result<PgPool, PersistenceError> {
    crate::config::init_dotenv();
    let cfg = crate::config::DbConfig::from_env()?;
    build_pool(&cfg.url, cfg.min_connections, cfg.max_connections)
}
