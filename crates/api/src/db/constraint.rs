//! Engine-neutral description of constraint violations.
//!
//! Each engine reports integrity failures in its own dialect: `PostgreSQL`
//! uses SQLSTATE class `23`, `SQLite` uses extended result codes in the
//! `SQLITE_CONSTRAINT` family. A [`ConstraintAdapter`] per engine maps those
//! onto a [`ConstraintViolation`] so the error translator never needs to know
//! which engine it is running on.

use sqlx::error::DatabaseError;
use sqlx::postgres::PgDatabaseError;
use sqlx::sqlite::SqliteError;

/// Which kind of declared constraint rejected a write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstraintKind {
    /// A required column received no value.
    NotNull,
    /// A value duplicated one already present in a unique column.
    Unique,
    /// Any other integrity rule (foreign key, check, exclusion).
    Other,
}

/// A constraint violation reported by the store.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{detail}")]
pub struct ConstraintViolation {
    /// What kind of constraint failed.
    pub kind: ConstraintKind,
    /// The offending column, when the engine names one.
    pub column: Option<String>,
    /// The engine's own wording, for logs and the integrity-error response.
    pub detail: String,
}

impl ConstraintViolation {
    /// Decode a sqlx error into a constraint violation.
    ///
    /// Returns `None` for anything that is not an integrity failure, such as
    /// connection loss or a syntax error.
    #[must_use]
    pub fn from_sqlx(error: &sqlx::Error) -> Option<Self> {
        let sqlx::Error::Database(db_error) = error else {
            return None;
        };
        let db_error: &dyn DatabaseError = &**db_error;

        PostgresAdapter::describe(db_error).or_else(|| SqliteAdapter::describe(db_error))
    }
}

/// Maps one engine's native errors onto [`ConstraintViolation`].
pub trait ConstraintAdapter {
    /// Returns `None` if the error came from another engine or is not a
    /// constraint violation.
    fn describe(error: &dyn DatabaseError) -> Option<ConstraintViolation>;
}

// =============================================================================
// PostgreSQL
// =============================================================================

/// SQLSTATE class `23`: integrity constraint violation.
pub struct PostgresAdapter;

impl ConstraintAdapter for PostgresAdapter {
    fn describe(error: &dyn DatabaseError) -> Option<ConstraintViolation> {
        let pg = error.try_downcast_ref::<PgDatabaseError>()?;
        let kind = classify_sqlstate(pg.code())?;

        let column = pg
            .column()
            .map(str::to_owned)
            .or_else(|| pg.detail().and_then(column_from_key_detail));

        let detail = match pg.detail() {
            Some(extra) => format!("{}\nDETAIL:  {extra}", pg.message()),
            None => pg.message().to_owned(),
        };

        Some(ConstraintViolation {
            kind,
            column,
            detail,
        })
    }
}

fn classify_sqlstate(code: &str) -> Option<ConstraintKind> {
    match code {
        "23502" => Some(ConstraintKind::NotNull),
        "23505" => Some(ConstraintKind::Unique),
        _ if code.starts_with("23") => Some(ConstraintKind::Other),
        _ => None,
    }
}

/// Extract `email` from `Key (email)=(a@b.com) already exists.`
fn column_from_key_detail(detail: &str) -> Option<String> {
    let rest = detail.strip_prefix("Key (")?;
    let (columns, _) = rest.split_once(")=")?;
    Some(columns.to_owned())
}

// =============================================================================
// SQLite
// =============================================================================

/// Extended result codes of the `SQLITE_CONSTRAINT` family.
pub struct SqliteAdapter;

const SQLITE_CONSTRAINT: i64 = 19;
const SQLITE_CONSTRAINT_PRIMARYKEY: i64 = 1555;
const SQLITE_CONSTRAINT_NOTNULL: i64 = 1299;
const SQLITE_CONSTRAINT_UNIQUE: i64 = 2067;

impl ConstraintAdapter for SqliteAdapter {
    fn describe(error: &dyn DatabaseError) -> Option<ConstraintViolation> {
        error.try_downcast_ref::<SqliteError>()?;
        let code = error.code().and_then(|code| code.parse::<i64>().ok())?;
        let kind = classify_sqlite_code(code)?;

        let message = error.message();
        let column = match kind {
            ConstraintKind::NotNull | ConstraintKind::Unique => column_from_failed_message(message),
            ConstraintKind::Other => None,
        };

        Some(ConstraintViolation {
            kind,
            column,
            detail: message.to_owned(),
        })
    }
}

fn classify_sqlite_code(code: i64) -> Option<ConstraintKind> {
    match code {
        SQLITE_CONSTRAINT_NOTNULL => Some(ConstraintKind::NotNull),
        SQLITE_CONSTRAINT_UNIQUE | SQLITE_CONSTRAINT_PRIMARYKEY => Some(ConstraintKind::Unique),
        _ if code & 0xff == SQLITE_CONSTRAINT => Some(ConstraintKind::Other),
        _ => None,
    }
}

/// Extract `email` from `UNIQUE constraint failed: customers.email`.
///
/// Composite keys list every column; only the first is kept.
fn column_from_failed_message(message: &str) -> Option<String> {
    let (_, target) = message.split_once("constraint failed: ")?;
    let first = target.split(',').next()?.trim();
    let column = first.rsplit_once('.').map_or(first, |(_, column)| column);
    (!column.is_empty()).then(|| column.to_owned())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::tests::memory_pool;

    #[test]
    fn test_classify_sqlstate() {
        assert_eq!(classify_sqlstate("23502"), Some(ConstraintKind::NotNull));
        assert_eq!(classify_sqlstate("23505"), Some(ConstraintKind::Unique));
        assert_eq!(classify_sqlstate("23503"), Some(ConstraintKind::Other));
        assert_eq!(classify_sqlstate("23514"), Some(ConstraintKind::Other));
        assert_eq!(classify_sqlstate("42601"), None);
        assert_eq!(classify_sqlstate("08006"), None);
    }

    #[test]
    fn test_column_from_key_detail() {
        assert_eq!(
            column_from_key_detail("Key (email)=(ada@example.com) already exists."),
            Some("email".to_string())
        );
        assert_eq!(
            column_from_key_detail("Key (address_id)=(99) is not present in table \"addresses\"."),
            Some("address_id".to_string())
        );
        assert_eq!(column_from_key_detail("Failing row contains (1, null)."), None);
    }

    #[test]
    fn test_classify_sqlite_code() {
        assert_eq!(classify_sqlite_code(1299), Some(ConstraintKind::NotNull));
        assert_eq!(classify_sqlite_code(2067), Some(ConstraintKind::Unique));
        assert_eq!(classify_sqlite_code(1555), Some(ConstraintKind::Unique));
        // FOREIGN KEY and CHECK
        assert_eq!(classify_sqlite_code(787), Some(ConstraintKind::Other));
        assert_eq!(classify_sqlite_code(275), Some(ConstraintKind::Other));
        assert_eq!(classify_sqlite_code(19), Some(ConstraintKind::Other));
        // SQLITE_ERROR, SQLITE_BUSY
        assert_eq!(classify_sqlite_code(1), None);
        assert_eq!(classify_sqlite_code(5), None);
    }

    #[test]
    fn test_column_from_failed_message() {
        assert_eq!(
            column_from_failed_message("UNIQUE constraint failed: customers.email"),
            Some("email".to_string())
        );
        assert_eq!(
            column_from_failed_message("NOT NULL constraint failed: customers.f_name"),
            Some("f_name".to_string())
        );
        assert_eq!(
            column_from_failed_message("UNIQUE constraint failed: t.a, t.b"),
            Some("a".to_string())
        );
        assert_eq!(column_from_failed_message("FOREIGN KEY constraint failed"), None);
    }

    #[tokio::test]
    async fn test_sqlite_not_null_violation() {
        let pool = memory_pool().await;
        let err = sqlx::query(
            "INSERT INTO customers (f_name, email) VALUES (NULL, 'ada@example.com')",
        )
        .execute(&pool)
        .await
        .unwrap_err();

        let violation = ConstraintViolation::from_sqlx(&err).unwrap();
        assert_eq!(violation.kind, ConstraintKind::NotNull);
        assert_eq!(violation.column.as_deref(), Some("f_name"));
        assert!(violation.detail.contains("NOT NULL"));
    }

    #[tokio::test]
    async fn test_sqlite_unique_violation() {
        let pool = memory_pool().await;
        let insert = "INSERT INTO customers (f_name, email) VALUES ('Ada', 'ada@example.com')";
        sqlx::query(insert).execute(&pool).await.unwrap();
        let err = sqlx::query(insert).execute(&pool).await.unwrap_err();

        let violation = ConstraintViolation::from_sqlx(&err).unwrap();
        assert_eq!(violation.kind, ConstraintKind::Unique);
        assert_eq!(violation.column.as_deref(), Some("email"));
    }

    #[tokio::test]
    async fn test_sqlite_foreign_key_violation() {
        let pool = memory_pool().await;
        let err = sqlx::query(
            "INSERT INTO customers (f_name, email, address_id) VALUES ('Ada', 'ada@example.com', 999)",
        )
        .execute(&pool)
        .await
        .unwrap_err();

        let violation = ConstraintViolation::from_sqlx(&err).unwrap();
        assert_eq!(violation.kind, ConstraintKind::Other);
        assert_eq!(violation.column, None);
    }

    #[tokio::test]
    async fn test_non_constraint_error_is_not_a_violation() {
        let pool = memory_pool().await;
        let err = sqlx::query("SELECT * FROM no_such_table")
            .execute(&pool)
            .await
            .unwrap_err();

        assert!(ConstraintViolation::from_sqlx(&err).is_none());
        assert!(ConstraintViolation::from_sqlx(&sqlx::Error::RowNotFound).is_none());
    }
}
