//! Strongly-typed identifiers (avoid mixing strings/UUIDs arbitrarily).

use uuid::Uuid;

/// Application identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct ApplicationId(pub Uuid);

/// Member identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct MemberId(pub Uuid);

/// Indication identifier.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct IndicationId(pub Uuid);
