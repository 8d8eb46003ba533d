//! Indication (business introduction) types.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::{IndicationId, MemberId, MemberSummary};

/// Status of an indication.
///
/// NEW is the initial state. No transition graph is enforced between the
/// four values; only the recipient may change the status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum IndicationStatus {
    New,
    InContact,
    Closed,
    Declined,
}

/// Error type for parsing IndicationStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIndicationStatusError(pub String);

impl std::fmt::Display for ParseIndicationStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid indication status: {}", self.0)
    }
}

impl std::error::Error for ParseIndicationStatusError {}

impl FromStr for IndicationStatus {
    type Err = ParseIndicationStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NEW" => Ok(IndicationStatus::New),
            "IN_CONTACT" => Ok(IndicationStatus::InContact),
            "CLOSED" => Ok(IndicationStatus::Closed),
            "DECLINED" => Ok(IndicationStatus::Declined),
            _ => Err(ParseIndicationStatusError(s.to_string())),
        }
    }
}

impl IndicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            IndicationStatus::New => "NEW",
            IndicationStatus::InContact => "IN_CONTACT",
            IndicationStatus::Closed => "CLOSED",
            IndicationStatus::Declined => "DECLINED",
        }
    }
}

/// Indication record
#[derive(Clone, Debug)]
pub struct Indication {
    pub id: IndicationId,
    pub from_member_id: MemberId,
    pub to_member_id: MemberId,
    pub contact_info: String,
    pub description: String,
    pub status: IndicationStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Indication joined with the sender and recipient summaries.
#[derive(Clone, Debug)]
pub struct IndicationWithMembers {
    pub indication: Indication,
    pub from_member: MemberSummary,
    pub to_member: MemberSummary,
}

/// Parameters for creating an indication
#[derive(Clone, Debug)]
pub struct CreateIndicationParams {
    pub from_member_id: MemberId,
    pub to_member_id: MemberId,
    pub contact_info: String,
    pub description: String,
}
