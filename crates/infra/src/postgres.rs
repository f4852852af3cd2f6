//! Tiers 2 and 3: Postgres-backed admin lookups.
//!
//! ## Error Mapping
//!
//! SQLx errors become tier failures (never a denial), described as follows:
//!
//! | SQLx Error | PostgreSQL Code | Description |
//! |------------|-----------------|-------------|
//! | Database (undefined function) | `42883` | function missing |
//! | Database (undefined table) | `42P01` | table missing |
//! | Database (invalid text representation) | `22P02` | principal is not a valid uuid |
//! | Database (insufficient privilege) | `42501` | permission denied |
//! | PoolTimedOut / PoolClosed | N/A | pool unavailable |
//! | Other | N/A | passed through |

use async_trait::async_trait;
use sqlx::PgPool;
use tracing::instrument;

use admingate_auth::{PrincipalId, Tier, TierValidator, TierVerdict, ValidationError};

/// Role value that grants admin on the profile record.
pub const ADMIN_ROLE: &str = "admin";

/// Tier 2: `public.is_admin(user_id) -> bool`.
#[derive(Debug, Clone)]
pub struct RpcValidator {
    pool: PgPool,
}

impl RpcValidator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TierValidator for RpcValidator {
    fn tier(&self) -> Tier {
        Tier::Rpc
    }

    #[instrument(skip(self), fields(tier = "rpc"))]
    async fn validate(&self, principal: &PrincipalId) -> Result<TierVerdict, ValidationError> {
        let is_admin: Option<bool> = sqlx::query_scalar("SELECT public.is_admin($1::uuid)")
            .bind(principal.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(|e| ValidationError::rpc(describe_sqlx_error("is_admin", &e)))?;

        // NULL is not an answer.
        let is_admin = is_admin.ok_or_else(|| ValidationError::rpc("is_admin returned NULL"))?;
        Ok(TierVerdict::new(is_admin))
    }
}

/// Tier 3: read `profiles.role` directly.
#[derive(Debug, Clone)]
pub struct DirectQueryValidator {
    pool: PgPool,
}

impl DirectQueryValidator {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TierValidator for DirectQueryValidator {
    fn tier(&self) -> Tier {
        Tier::DirectQuery
    }

    #[instrument(skip(self), fields(tier = "direct_query"))]
    async fn validate(&self, principal: &PrincipalId) -> Result<TierVerdict, ValidationError> {
        let row: Option<Option<String>> =
            sqlx::query_scalar("SELECT role FROM public.profiles WHERE id = $1::uuid")
                .bind(principal.as_str())
                .fetch_optional(&self.pool)
                .await
                .map_err(|e| ValidationError::query(describe_sqlx_error("profiles.role", &e)))?;

        let role = row.ok_or_else(|| {
            ValidationError::query(format!("no profile row for principal '{principal}'"))
        })?;

        Ok(TierVerdict::new(role_grants_admin(role.as_deref())))
    }
}

/// A present row with a NULL or non-admin role is a definitive "no".
pub fn role_grants_admin(role: Option<&str>) -> bool {
    role == Some(ADMIN_ROLE)
}

fn describe_sqlx_error(operation: &str, err: &sqlx::Error) -> String {
    match err {
        sqlx::Error::Database(db_err) => {
            let msg = db_err.message();
            match db_err.code().as_deref() {
                Some("42883") => format!("{operation}: function missing ({msg})"),
                Some("42P01") => format!("{operation}: table missing ({msg})"),
                Some("22P02") => format!("{operation}: principal is not a valid uuid ({msg})"),
                Some("42501") => format!("{operation}: permission denied ({msg})"),
                Some(code) => format!("{operation}: database error {code} ({msg})"),
                None => format!("{operation}: database error ({msg})"),
            }
        }
        sqlx::Error::PoolTimedOut => format!("{operation}: connection pool timed out"),
        sqlx::Error::PoolClosed => format!("{operation}: connection pool closed"),
        other => format!("{operation}: {other}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_the_admin_role_grants() {
        assert!(role_grants_admin(Some("admin")));
        assert!(!role_grants_admin(Some("Admin")));
        assert!(!role_grants_admin(Some("user")));
        assert!(!role_grants_admin(None));
    }

    #[test]
    fn pool_errors_are_described() {
        let msg = describe_sqlx_error("is_admin", &sqlx::Error::PoolTimedOut);
        assert_eq!(msg, "is_admin: connection pool timed out");
    }
}
