//! Puerto de persistencia de journeys.
//!
//! Contrato de concurrencia: el motor hace lectura-modificación-escritura sin
//! bloqueos propios. Cada implementación debe serializar escrituras sobre la
//! misma identidad comparando `Journey::version` con la versión almacenada y
//! rechazar con `StoreError::VersionConflict` si difieren.

mod memory;

use async_trait::async_trait;
use journey_domain::{Journey, JourneyKey};

use crate::errors::StoreError;

pub use memory::InMemoryJourneyStore;

#[async_trait]
pub trait JourneyStore: Send + Sync {
    /// Reconstruye el journey completo (ramas y steps) o `None` si no existe.
    async fn find(&self, key: &JourneyKey) -> Result<Option<Journey>, StoreError>;

    /// Persiste el agregado de forma atómica. En éxito incrementa
    /// `Journey::version`. Un journey con `version == 0` se inserta; si la
    /// identidad ya existe es un conflicto.
    async fn save(&self, journey: &mut Journey) -> Result<(), StoreError>;
}
