//! The Store trait that backends implement.

use chrono::{DateTime, Utc};

use crate::types::*;
use crate::StoreError;

/// The storage trait the server depends on.
///
/// Uniqueness (application email, one member per application, invitation
/// token) is enforced by the backend's unique constraints; the `Option`
/// lookups exist so callers can pre-check and produce friendly errors.
#[cfg_attr(feature = "test-support", mockall::automock)]
#[async_trait::async_trait]
pub trait Store: Send + Sync {
    // ─────────────────────────────────── Applications ───────────────────────────────────

    /// Create a new application with status PENDING.
    async fn create_application(
        &self,
        params: &CreateApplicationParams,
    ) -> Result<Application, StoreError>;

    /// Get application by ID.
    async fn get_application(&self, id: &ApplicationId) -> Result<Application, StoreError>;

    /// Get application by email, if one exists.
    async fn get_application_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Application>, StoreError>;

    /// List applications newest-first, optionally filtered by status.
    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, StoreError>;

    /// Approve a PENDING application and mint its invitation token.
    ///
    /// Atomic: the status flip to APPROVED (with `reviewed_at`) and the
    /// token insert commit together or not at all. Returns `Conflict` if
    /// the application is no longer PENDING.
    async fn approve_application(
        &self,
        id: &ApplicationId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<InvitationToken, StoreError>;

    /// Reject a PENDING application, storing the optional reason.
    /// Returns `Conflict` if the application is no longer PENDING.
    async fn reject_application(
        &self,
        id: &ApplicationId,
        reason: Option<&str>,
    ) -> Result<(), StoreError>;

    // ─────────────────────────────────── Invitations ────────────────────────────────────

    /// Get invitation token by its opaque token string.
    async fn get_invitation_by_token(&self, token: &str) -> Result<InvitationToken, StoreError>;

    /// Get the invitation token minted for an application, if any.
    async fn get_invitation_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<InvitationToken>, StoreError>;

    /// Mark an invitation token as used (single-use consumption).
    async fn mark_invitation_used(&self, token: &str) -> Result<(), StoreError>;

    // ───────────────────────────────────── Members ──────────────────────────────────────

    /// Create a member from a redeemed invitation.
    async fn create_member(&self, params: &CreateMemberParams) -> Result<Member, StoreError>;

    /// Get member by ID.
    async fn get_member(&self, id: &MemberId) -> Result<Member, StoreError>;

    /// Get member by email, if one exists.
    async fn get_member_by_email(&self, email: &str) -> Result<Option<Member>, StoreError>;

    /// Get the member created for an application, if any.
    async fn get_member_by_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<Member>, StoreError>;

    /// List all members, newest-first.
    async fn list_members(&self) -> Result<Vec<Member>, StoreError>;

    /// List the public directory: all members ordered by full name.
    async fn list_directory(&self) -> Result<Vec<MemberSummary>, StoreError>;

    /// Count all members.
    async fn count_members(&self) -> Result<i64, StoreError>;

    // ──────────────────────────────────── Indications ───────────────────────────────────

    /// Create an indication with status NEW.
    async fn create_indication(
        &self,
        params: &CreateIndicationParams,
    ) -> Result<Indication, StoreError>;

    /// Get indication by ID.
    async fn get_indication(&self, id: &IndicationId) -> Result<Indication, StoreError>;

    /// Get indication by ID, joined with both member summaries.
    async fn get_indication_with_members(
        &self,
        id: &IndicationId,
    ) -> Result<IndicationWithMembers, StoreError>;

    /// List indications sent by a member, newest-first, with summaries.
    async fn list_indications_from(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<IndicationWithMembers>, StoreError>;

    /// List indications received by a member, newest-first, with summaries.
    async fn list_indications_to(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<IndicationWithMembers>, StoreError>;

    /// Update an indication's status in place.
    async fn update_indication_status(
        &self,
        id: &IndicationId,
        status: IndicationStatus,
    ) -> Result<(), StoreError>;

    /// Count indications created at or after the given instant.
    async fn count_indications_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<i64, StoreError>;
}
