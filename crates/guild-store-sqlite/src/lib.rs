//! SQLite implementation of the guild [`Store`] trait.
//!
//! Ids are bound as UUID strings and timestamps as Unix milliseconds.
//! Unique-constraint violations surface as [`StoreError::AlreadyExists`];
//! they are the authoritative uniqueness guard behind the server's
//! friendlier pre-checks.

use chrono::{DateTime, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::{Row, SqlitePool};
use uuid::Uuid;

use guild_storage::{
    Application, ApplicationId, ApplicationStatus, CreateApplicationParams,
    CreateIndicationParams, CreateMemberParams, Indication, IndicationId, IndicationStatus,
    IndicationWithMembers, InvitationToken, Member, MemberId, MemberSummary, Store, StoreError,
};

static MIGRATOR: sqlx::migrate::Migrator = sqlx::migrate!("./migrations");

pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// `~/.guild/store.db` (creates dir with 0700 perms on unix)
    pub async fn open_default() -> Result<Self, StoreError> {
        let dir = dirs::home_dir()
            .ok_or_else(|| StoreError::Backend("no home dir".into()))?
            .join(".guild");
        std::fs::create_dir_all(&dir).map_err(|e| StoreError::Backend(e.to_string()))?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(&dir, std::fs::Permissions::from_mode(0o700))
                .map_err(|e| StoreError::Backend(e.to_string()))?;
        }
        let path = dir.join("store.db");
        let url = format!("sqlite://{}?mode=rwc", path.to_string_lossy());
        Self::open(&url).await
    }

    pub async fn open_in_memory() -> Result<Self, StoreError> {
        Self::open("sqlite::memory:").await
    }

    pub async fn open(url: &str) -> Result<Self, StoreError> {
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect(url)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        MIGRATOR
            .run(&pool)
            .await
            .map_err(|e| StoreError::Backend(e.to_string()))?;

        Ok(Self { pool })
    }
}

// ───────────────────────────── row mapping helpers ─────────────────────────────

fn parse_uuid(s: &str) -> Result<Uuid, StoreError> {
    Uuid::try_parse(s).map_err(|e| StoreError::Backend(e.to_string()))
}

fn from_millis(ms: i64) -> Result<DateTime<Utc>, StoreError> {
    DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| StoreError::Backend(format!("invalid timestamp: {ms}")))
}

fn insert_err(e: sqlx::Error) -> StoreError {
    let s = e.to_string();
    if s.contains("UNIQUE") {
        StoreError::AlreadyExists
    } else {
        StoreError::Backend(s)
    }
}

fn backend_err(e: sqlx::Error) -> StoreError {
    StoreError::Backend(e.to_string())
}

fn column<T>(res: Result<T, sqlx::Error>) -> Result<T, StoreError> {
    res.map_err(|e| StoreError::Backend(e.to_string()))
}

const APPLICATION_COLS: &str =
    "id, full_name, email, company, why_participate, status, created_at, reviewed_at, rejection_reason";

fn application_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Application, StoreError> {
    let id: String = column(row.try_get("id"))?;
    let status: String = column(row.try_get("status"))?;
    let created_at: i64 = column(row.try_get("created_at"))?;
    let reviewed_at: Option<i64> = column(row.try_get("reviewed_at"))?;
    Ok(Application {
        id: ApplicationId(parse_uuid(&id)?),
        full_name: column(row.try_get("full_name"))?,
        email: column(row.try_get("email"))?,
        company: column(row.try_get("company"))?,
        why_participate: column(row.try_get("why_participate"))?,
        status: status
            .parse::<ApplicationStatus>()
            .map_err(|e| StoreError::Backend(e.to_string()))?,
        created_at: from_millis(created_at)?,
        reviewed_at: reviewed_at.map(from_millis).transpose()?,
        rejection_reason: column(row.try_get("rejection_reason"))?,
    })
}

const INVITATION_COLS: &str = "token, application_id, expires_at, used, created_at";

fn invitation_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<InvitationToken, StoreError> {
    let application_id: String = column(row.try_get("application_id"))?;
    let expires_at: i64 = column(row.try_get("expires_at"))?;
    let used: i64 = column(row.try_get("used"))?;
    let created_at: i64 = column(row.try_get("created_at"))?;
    Ok(InvitationToken {
        token: column(row.try_get("token"))?,
        application_id: ApplicationId(parse_uuid(&application_id)?),
        expires_at: from_millis(expires_at)?,
        used: used != 0,
        created_at: from_millis(created_at)?,
    })
}

const MEMBER_COLS: &str = "id, application_id, full_name, email, company, phone, position, \
     company_description, linkedin_url, auth_secret_hash, created_at, updated_at";

fn member_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Member, StoreError> {
    let id: String = column(row.try_get("id"))?;
    let application_id: String = column(row.try_get("application_id"))?;
    let created_at: i64 = column(row.try_get("created_at"))?;
    let updated_at: i64 = column(row.try_get("updated_at"))?;
    Ok(Member {
        id: MemberId(parse_uuid(&id)?),
        application_id: ApplicationId(parse_uuid(&application_id)?),
        full_name: column(row.try_get("full_name"))?,
        email: column(row.try_get("email"))?,
        company: column(row.try_get("company"))?,
        phone: column(row.try_get("phone"))?,
        position: column(row.try_get("position"))?,
        company_description: column(row.try_get("company_description"))?,
        linkedin_url: column(row.try_get("linkedin_url"))?,
        auth_secret_hash: column(row.try_get("auth_secret_hash"))?,
        created_at: from_millis(created_at)?,
        updated_at: from_millis(updated_at)?,
    })
}

/// Indication columns joined with sender (f_) and recipient (t_) summaries.
const INDICATION_JOIN: &str = "SELECT i.id, i.from_member_id, i.to_member_id, i.contact_info, \
     i.description, i.status, i.created_at, i.updated_at, \
     f.full_name AS f_full_name, f.email AS f_email, f.company AS f_company, \
     t.full_name AS t_full_name, t.email AS t_email, t.company AS t_company \
     FROM indications i \
     JOIN members f ON f.id = i.from_member_id \
     JOIN members t ON t.id = i.to_member_id";

fn indication_from_row(row: &sqlx::sqlite::SqliteRow) -> Result<Indication, StoreError> {
    let id: String = column(row.try_get("id"))?;
    let from_member_id: String = column(row.try_get("from_member_id"))?;
    let to_member_id: String = column(row.try_get("to_member_id"))?;
    let status: String = column(row.try_get("status"))?;
    let created_at: i64 = column(row.try_get("created_at"))?;
    let updated_at: i64 = column(row.try_get("updated_at"))?;
    Ok(Indication {
        id: IndicationId(parse_uuid(&id)?),
        from_member_id: MemberId(parse_uuid(&from_member_id)?),
        to_member_id: MemberId(parse_uuid(&to_member_id)?),
        contact_info: column(row.try_get("contact_info"))?,
        description: column(row.try_get("description"))?,
        status: status
            .parse::<IndicationStatus>()
            .map_err(|e| StoreError::Backend(e.to_string()))?,
        created_at: from_millis(created_at)?,
        updated_at: from_millis(updated_at)?,
    })
}

fn indication_with_members_from_row(
    row: &sqlx::sqlite::SqliteRow,
) -> Result<IndicationWithMembers, StoreError> {
    let indication = indication_from_row(row)?;
    let from_member = MemberSummary {
        id: indication.from_member_id.clone(),
        full_name: column(row.try_get("f_full_name"))?,
        email: column(row.try_get("f_email"))?,
        company: column(row.try_get("f_company"))?,
    };
    let to_member = MemberSummary {
        id: indication.to_member_id.clone(),
        full_name: column(row.try_get("t_full_name"))?,
        email: column(row.try_get("t_email"))?,
        company: column(row.try_get("t_company"))?,
    };
    Ok(IndicationWithMembers {
        indication,
        from_member,
        to_member,
    })
}

#[async_trait::async_trait]
impl Store for SqliteStore {
    // ───────────────────────────── Applications ─────────────────────────────

    async fn create_application(
        &self,
        params: &CreateApplicationParams,
    ) -> Result<Application, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO applications(id, full_name, email, company, why_participate, status, created_at)
             VALUES(?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(&params.full_name)
        .bind(&params.email)
        .bind(&params.company)
        .bind(&params.why_participate)
        .bind(ApplicationStatus::Pending.as_str())
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;

        Ok(Application {
            id: ApplicationId(id),
            full_name: params.full_name.clone(),
            email: params.email.clone(),
            company: params.company.clone(),
            why_participate: params.why_participate.clone(),
            status: ApplicationStatus::Pending,
            created_at: now,
            reviewed_at: None,
            rejection_reason: None,
        })
    }

    async fn get_application(&self, id: &ApplicationId) -> Result<Application, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {APPLICATION_COLS} FROM applications WHERE id=?"
        ))
        .bind(id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => application_from_row(&row),
        }
    }

    async fn get_application_by_email(
        &self,
        email: &str,
    ) -> Result<Option<Application>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {APPLICATION_COLS} FROM applications WHERE email=?"
        ))
        .bind(email)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        row.map(|r| application_from_row(&r)).transpose()
    }

    async fn list_applications(
        &self,
        status: Option<ApplicationStatus>,
    ) -> Result<Vec<Application>, StoreError> {
        let rows = match status {
            Some(status) => {
                sqlx::query(&format!(
                    "SELECT {APPLICATION_COLS} FROM applications WHERE status=? \
                     ORDER BY created_at DESC, id DESC"
                ))
                .bind(status.as_str())
                .fetch_all(&self.pool)
                .await
            }
            None => {
                sqlx::query(&format!(
                    "SELECT {APPLICATION_COLS} FROM applications \
                     ORDER BY created_at DESC, id DESC"
                ))
                .fetch_all(&self.pool)
                .await
            }
        }
        .map_err(backend_err)?;

        rows.iter().map(application_from_row).collect()
    }

    async fn approve_application(
        &self,
        id: &ApplicationId,
        token: &str,
        expires_at: DateTime<Utc>,
    ) -> Result<InvitationToken, StoreError> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(backend_err)?;

        let updated = sqlx::query(
            "UPDATE applications SET status=?, reviewed_at=? WHERE id=? AND status=?",
        )
        .bind(ApplicationStatus::Approved.as_str())
        .bind(now.timestamp_millis())
        .bind(id.0.to_string())
        .bind(ApplicationStatus::Pending.as_str())
        .execute(&mut *tx)
        .await
        .map_err(backend_err)?;

        if updated.rows_affected() == 0 {
            // Not PENDING (or missing); roll back, nothing is written.
            return Err(StoreError::Conflict);
        }

        sqlx::query(
            "INSERT INTO invitation_tokens(token, application_id, expires_at, used, created_at)
             VALUES(?,?,?,0,?)",
        )
        .bind(token)
        .bind(id.0.to_string())
        .bind(expires_at.timestamp_millis())
        .bind(now.timestamp_millis())
        .execute(&mut *tx)
        .await
        .map_err(insert_err)?;

        tx.commit().await.map_err(backend_err)?;

        Ok(InvitationToken {
            token: token.to_string(),
            application_id: id.clone(),
            expires_at,
            used: false,
            created_at: now,
        })
    }

    async fn reject_application(
        &self,
        id: &ApplicationId,
        reason: Option<&str>,
    ) -> Result<(), StoreError> {
        let updated = sqlx::query(
            "UPDATE applications SET status=?, reviewed_at=?, rejection_reason=? \
             WHERE id=? AND status=?",
        )
        .bind(ApplicationStatus::Rejected.as_str())
        .bind(Utc::now().timestamp_millis())
        .bind(reason)
        .bind(id.0.to_string())
        .bind(ApplicationStatus::Pending.as_str())
        .execute(&self.pool)
        .await
        .map_err(backend_err)?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::Conflict);
        }
        Ok(())
    }

    // ───────────────────────────── Invitations ──────────────────────────────

    async fn get_invitation_by_token(&self, token: &str) -> Result<InvitationToken, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {INVITATION_COLS} FROM invitation_tokens WHERE token=?"
        ))
        .bind(token)
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => invitation_from_row(&row),
        }
    }

    async fn get_invitation_for_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<InvitationToken>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {INVITATION_COLS} FROM invitation_tokens WHERE application_id=?"
        ))
        .bind(application_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        row.map(|r| invitation_from_row(&r)).transpose()
    }

    async fn mark_invitation_used(&self, token: &str) -> Result<(), StoreError> {
        let updated = sqlx::query("UPDATE invitation_tokens SET used=1 WHERE token=?")
            .bind(token)
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    // ─────────────────────────────── Members ────────────────────────────────

    async fn create_member(&self, params: &CreateMemberParams) -> Result<Member, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO members(id, application_id, full_name, email, company, phone, position, \
             company_description, linkedin_url, auth_secret_hash, created_at, updated_at)
             VALUES(?,?,?,?,?,?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(params.application_id.0.to_string())
        .bind(&params.full_name)
        .bind(&params.email)
        .bind(&params.company)
        .bind(&params.phone)
        .bind(&params.position)
        .bind(&params.company_description)
        .bind(&params.linkedin_url)
        .bind(&params.auth_secret_hash)
        .bind(now.timestamp_millis())
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;

        Ok(Member {
            id: MemberId(id),
            application_id: params.application_id.clone(),
            full_name: params.full_name.clone(),
            email: params.email.clone(),
            company: params.company.clone(),
            phone: params.phone.clone(),
            position: params.position.clone(),
            company_description: params.company_description.clone(),
            linkedin_url: params.linkedin_url.clone(),
            auth_secret_hash: params.auth_secret_hash.clone(),
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_member(&self, id: &MemberId) -> Result<Member, StoreError> {
        let row = sqlx::query(&format!("SELECT {MEMBER_COLS} FROM members WHERE id=?"))
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_err)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => member_from_row(&row),
        }
    }

    async fn get_member_by_email(&self, email: &str) -> Result<Option<Member>, StoreError> {
        let row = sqlx::query(&format!("SELECT {MEMBER_COLS} FROM members WHERE email=?"))
            .bind(email)
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_err)?;

        row.map(|r| member_from_row(&r)).transpose()
    }

    async fn get_member_by_application(
        &self,
        application_id: &ApplicationId,
    ) -> Result<Option<Member>, StoreError> {
        let row = sqlx::query(&format!(
            "SELECT {MEMBER_COLS} FROM members WHERE application_id=?"
        ))
        .bind(application_id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        row.map(|r| member_from_row(&r)).transpose()
    }

    async fn list_members(&self) -> Result<Vec<Member>, StoreError> {
        let rows = sqlx::query(&format!(
            "SELECT {MEMBER_COLS} FROM members ORDER BY created_at DESC, id DESC"
        ))
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;

        rows.iter().map(member_from_row).collect()
    }

    async fn list_directory(&self) -> Result<Vec<MemberSummary>, StoreError> {
        let rows = sqlx::query_as::<_, (String, String, String, String)>(
            "SELECT id, full_name, email, company FROM members \
             ORDER BY full_name COLLATE NOCASE ASC, id ASC",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;

        let mut out = Vec::with_capacity(rows.len());
        for (id, full_name, email, company) in rows {
            out.push(MemberSummary {
                id: MemberId(parse_uuid(&id)?),
                full_name,
                email,
                company,
            });
        }
        Ok(out)
    }

    async fn count_members(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM members")
            .fetch_one(&self.pool)
            .await
            .map_err(backend_err)
    }

    // ───────────────────────────── Indications ──────────────────────────────

    async fn create_indication(
        &self,
        params: &CreateIndicationParams,
    ) -> Result<Indication, StoreError> {
        let id = Uuid::now_v7();
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO indications(id, from_member_id, to_member_id, contact_info, description, \
             status, created_at, updated_at)
             VALUES(?,?,?,?,?,?,?,?)",
        )
        .bind(id.to_string())
        .bind(params.from_member_id.0.to_string())
        .bind(params.to_member_id.0.to_string())
        .bind(&params.contact_info)
        .bind(&params.description)
        .bind(IndicationStatus::New.as_str())
        .bind(now.timestamp_millis())
        .bind(now.timestamp_millis())
        .execute(&self.pool)
        .await
        .map_err(insert_err)?;

        Ok(Indication {
            id: IndicationId(id),
            from_member_id: params.from_member_id.clone(),
            to_member_id: params.to_member_id.clone(),
            contact_info: params.contact_info.clone(),
            description: params.description.clone(),
            status: IndicationStatus::New,
            created_at: now,
            updated_at: now,
        })
    }

    async fn get_indication(&self, id: &IndicationId) -> Result<Indication, StoreError> {
        let row = sqlx::query(
            "SELECT id, from_member_id, to_member_id, contact_info, description, status, \
             created_at, updated_at FROM indications WHERE id=?",
        )
        .bind(id.0.to_string())
        .fetch_optional(&self.pool)
        .await
        .map_err(backend_err)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => indication_from_row(&row),
        }
    }

    async fn get_indication_with_members(
        &self,
        id: &IndicationId,
    ) -> Result<IndicationWithMembers, StoreError> {
        let row = sqlx::query(&format!("{INDICATION_JOIN} WHERE i.id=?"))
            .bind(id.0.to_string())
            .fetch_optional(&self.pool)
            .await
            .map_err(backend_err)?;

        match row {
            None => Err(StoreError::NotFound),
            Some(row) => indication_with_members_from_row(&row),
        }
    }

    async fn list_indications_from(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<IndicationWithMembers>, StoreError> {
        let rows = sqlx::query(&format!(
            "{INDICATION_JOIN} WHERE i.from_member_id=? ORDER BY i.created_at DESC, i.id DESC"
        ))
        .bind(member_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;

        rows.iter().map(indication_with_members_from_row).collect()
    }

    async fn list_indications_to(
        &self,
        member_id: &MemberId,
    ) -> Result<Vec<IndicationWithMembers>, StoreError> {
        let rows = sqlx::query(&format!(
            "{INDICATION_JOIN} WHERE i.to_member_id=? ORDER BY i.created_at DESC, i.id DESC"
        ))
        .bind(member_id.0.to_string())
        .fetch_all(&self.pool)
        .await
        .map_err(backend_err)?;

        rows.iter().map(indication_with_members_from_row).collect()
    }

    async fn update_indication_status(
        &self,
        id: &IndicationId,
        status: IndicationStatus,
    ) -> Result<(), StoreError> {
        let updated = sqlx::query("UPDATE indications SET status=?, updated_at=? WHERE id=?")
            .bind(status.as_str())
            .bind(Utc::now().timestamp_millis())
            .bind(id.0.to_string())
            .execute(&self.pool)
            .await
            .map_err(backend_err)?;

        if updated.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }

    async fn count_indications_since(&self, since: DateTime<Utc>) -> Result<i64, StoreError> {
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM indications WHERE created_at >= ?")
            .bind(since.timestamp_millis())
            .fetch_one(&self.pool)
            .await
            .map_err(backend_err)
    }
}
