//! Invitation token types.

use chrono::{DateTime, Utc};

use super::ApplicationId;

/// Invitation token record.
///
/// Minted atomically with an application's transition to APPROVED; usable
/// only while `used` is false and the current time is within `expires_at`.
#[derive(Clone, Debug)]
pub struct InvitationToken {
    pub token: String,
    pub application_id: ApplicationId,
    pub expires_at: DateTime<Utc>,
    pub used: bool,
    pub created_at: DateTime<Utc>,
}
