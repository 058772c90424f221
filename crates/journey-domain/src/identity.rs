// identity.rs
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identidad del miembro que realiza la petición.
///
/// Se deriva de los claims en la capa HTTP y se pasa explícitamente a cada
/// operación; el motor nunca la lee de un contexto global.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemberRef {
    pub business_group: String,
    pub reference_number: String,
}

impl MemberRef {
    pub fn new(business_group: impl Into<String>, reference_number: impl Into<String>) -> Self {
        Self { business_group: business_group.into(),
               reference_number: reference_number.into() }
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.business_group, self.reference_number)
    }
}

/// Identidad de un journey: `(journey_type, business_group, reference_number)`.
///
/// Invariante: existe como máximo un journey por tupla.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JourneyKey {
    pub journey_type: String,
    pub business_group: String,
    pub reference_number: String,
}

impl JourneyKey {
    pub fn new(journey_type: impl Into<String>, member: &MemberRef) -> Self {
        Self { journey_type: journey_type.into(),
               business_group: member.business_group.clone(),
               reference_number: member.reference_number.clone() }
    }

    /// Miembro dueño del journey.
    pub fn member(&self) -> MemberRef {
        MemberRef::new(self.business_group.clone(), self.reference_number.clone())
    }
}

impl fmt::Display for JourneyKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}/{}", self.journey_type, self.business_group, self.reference_number)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_built_from_member() {
        let member = MemberRef::new("RBS", "1234567");
        let key = JourneyKey::new("retirement", &member);
        assert_eq!(key.member(), member);
        assert_eq!(key.to_string(), "retirement:RBS/1234567");
    }
}
