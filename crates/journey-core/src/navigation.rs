//! Validador de navegación compartido por lecturas y escrituras.
//!
//! Clasifica una page key contra el estado del journey. El orden importa:
//! la página terminal y la siguiente se resuelven antes que los steps
//! existentes, de modo que una página aún no visitada (o aparcada en una rama
//! inactiva y vuelta a ser la siguiente) se lee vacía.

use journey_domain::Journey;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageKeyClass {
    /// Marcador de fin del journey; siempre se lee vacío.
    Terminal,
    /// Página siguiente del cursor, válida pero sin step materializado.
    Next,
    /// Página con step existente (en cualquier rama).
    Visited,
    /// Ninguna de las anteriores.
    Unknown,
}

impl PageKeyClass {
    /// `true` para las páginas que se leen como vacías sin requerir step.
    pub fn reads_empty(self) -> bool {
        matches!(self, PageKeyClass::Terminal | PageKeyClass::Next)
    }
}

pub fn classify_page_key(journey: &Journey, page_key: &str) -> PageKeyClass {
    if journey.is_terminal_page(page_key) {
        PageKeyClass::Terminal
    } else if journey.is_next_page(page_key) {
        PageKeyClass::Next
    } else if journey.step(page_key).is_some() {
        PageKeyClass::Visited
    } else {
        PageKeyClass::Unknown
    }
}
