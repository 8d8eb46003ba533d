//! Application types.

use std::str::FromStr;

use chrono::{DateTime, Utc};

use super::ApplicationId;

/// Review status of an application.
///
/// PENDING is the initial state; APPROVED and REJECTED are terminal.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ApplicationStatus {
    Pending,
    Approved,
    Rejected,
}

/// Error type for parsing ApplicationStatus from string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseApplicationStatusError(pub String);

impl std::fmt::Display for ParseApplicationStatusError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid application status: {}", self.0)
    }
}

impl std::error::Error for ParseApplicationStatusError {}

impl FromStr for ApplicationStatus {
    type Err = ParseApplicationStatusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "PENDING" => Ok(ApplicationStatus::Pending),
            "APPROVED" => Ok(ApplicationStatus::Approved),
            "REJECTED" => Ok(ApplicationStatus::Rejected),
            _ => Err(ParseApplicationStatusError(s.to_string())),
        }
    }
}

impl ApplicationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ApplicationStatus::Pending => "PENDING",
            ApplicationStatus::Approved => "APPROVED",
            ApplicationStatus::Rejected => "REJECTED",
        }
    }
}

/// Application record
#[derive(Clone, Debug)]
pub struct Application {
    pub id: ApplicationId,
    pub full_name: String,
    pub email: String,
    pub company: String,
    pub why_participate: String,
    pub status: ApplicationStatus,
    pub created_at: DateTime<Utc>,
    pub reviewed_at: Option<DateTime<Utc>>,
    pub rejection_reason: Option<String>,
}

/// Parameters for creating an application
#[derive(Clone, Debug)]
pub struct CreateApplicationParams {
    pub full_name: String,
    pub email: String,
    pub company: String,
    pub why_participate: String,
}
