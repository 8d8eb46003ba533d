//! Member types.

use chrono::{DateTime, Utc};

use super::{ApplicationId, MemberId};

/// Member record
#[derive(Clone, Debug)]
pub struct Member {
    pub id: MemberId,
    pub application_id: ApplicationId,
    pub full_name: String,
    pub email: String,
    pub company: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub company_description: Option<String>,
    pub linkedin_url: Option<String>,
    /// Keyed hash of the member's auth secret; the plaintext is never stored.
    pub auth_secret_hash: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Public-safe member summary (directory and session payloads).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MemberSummary {
    pub id: MemberId,
    pub full_name: String,
    pub email: String,
    pub company: String,
}

impl From<&Member> for MemberSummary {
    fn from(member: &Member) -> Self {
        Self {
            id: member.id.clone(),
            full_name: member.full_name.clone(),
            email: member.email.clone(),
            company: member.company.clone(),
        }
    }
}

/// Parameters for creating a member
#[derive(Clone, Debug)]
pub struct CreateMemberParams {
    pub application_id: ApplicationId,
    pub full_name: String,
    pub email: String,
    pub company: String,
    pub phone: Option<String>,
    pub position: Option<String>,
    pub company_description: Option<String>,
    pub linkedin_url: Option<String>,
    pub auth_secret_hash: String,
}
