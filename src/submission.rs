//! Server-side record of accepted submissions.
//!
//! One booking per school per month, one school per delivery date and one
//! order per teacher per delivery date. A key is claimed before the remote
//! submit and released again when the submit fails, so the user can retry.

use lunchbook_db::table::SubmissionKey;
use sea_query::{Expr, ExprTrait, Func, OnConflict, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::SqlitePool;
use time::{Date, Duration, OffsetDateTime};

/// Keys older than this guard nothing anymore and are pruned on startup.
pub const RETENTION: Duration = Duration::days(400);

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display, strum::AsRefStr)]
#[strum(serialize_all = "snake_case")]
pub enum SubmissionKind {
    Booking,
    BookingDate,
    Order,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Submission {
    pub kind: SubmissionKind,
    pub subject: String,
    pub target: String,
}

impl Submission {
    /// A school may book once per calendar month.
    pub fn booking(school: &str, delivery: Date) -> Self {
        Self {
            kind: SubmissionKind::Booking,
            subject: normalize(school),
            target: format!("{:04}-{:02}", delivery.year(), u8::from(delivery.month())),
        }
    }

    /// A delivery date goes to one school, even when two submit at once.
    pub fn booking_date(delivery: Date) -> Self {
        Self {
            kind: SubmissionKind::BookingDate,
            subject: "delivery".to_owned(),
            target: lunchbook_schedule::format_date(delivery),
        }
    }

    /// A teacher may order once per delivery date.
    pub fn order(email: &str, delivery: Date) -> Self {
        Self {
            kind: SubmissionKind::Order,
            subject: normalize(email),
            target: lunchbook_schedule::format_date(delivery),
        }
    }

    /// Sent along with the order so the sheet can drop replays too.
    pub fn idempotency_key(&self) -> String {
        format!("{}:{}:{}", self.kind, self.subject, self.target)
    }

    /// Returns `true` when the key was not recorded yet.
    pub async fn claim(&self, pool: &SqlitePool) -> anyhow::Result<bool> {
        let now = OffsetDateTime::now_utc().unix_timestamp();
        let statement = Query::insert()
            .into_table(SubmissionKey::Table)
            .columns([
                SubmissionKey::Kind,
                SubmissionKey::Subject,
                SubmissionKey::Target,
                SubmissionKey::CreatedAt,
            ])
            .values([
                self.kind.as_ref().into(),
                self.subject.to_owned().into(),
                self.target.to_owned().into(),
                now.into(),
            ])?
            .on_conflict(
                OnConflict::columns([
                    SubmissionKey::Kind,
                    SubmissionKey::Subject,
                    SubmissionKey::Target,
                ])
                .do_nothing()
                .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let result = sqlx::query_with(&sql, values).execute(pool).await?;

        Ok(result.rows_affected() == 1)
    }

    pub async fn release(&self, pool: &SqlitePool) -> anyhow::Result<()> {
        let statement = Query::delete()
            .from_table(SubmissionKey::Table)
            .and_where(Expr::col(SubmissionKey::Kind).eq(self.kind.as_ref()))
            .and_where(Expr::col(SubmissionKey::Subject).eq(self.subject.as_str()))
            .and_where(Expr::col(SubmissionKey::Target).eq(self.target.as_str()))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(pool).await?;

        Ok(())
    }

    pub async fn exists(&self, pool: &SqlitePool) -> anyhow::Result<bool> {
        let statement = Query::select()
            .expr(Func::count(Expr::col(SubmissionKey::Kind)))
            .from(SubmissionKey::Table)
            .and_where(Expr::col(SubmissionKey::Kind).eq(self.kind.as_ref()))
            .and_where(Expr::col(SubmissionKey::Subject).eq(self.subject.as_str()))
            .and_where(Expr::col(SubmissionKey::Target).eq(self.target.as_str()))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let (count,): (i64,) = sqlx::query_as_with(&sql, values).fetch_one(pool).await?;

        Ok(count > 0)
    }
}

/// Deletes keys claimed before `before`, returning how many went.
pub async fn prune(pool: &SqlitePool, before: OffsetDateTime) -> anyhow::Result<u64> {
    let statement = Query::delete()
        .from_table(SubmissionKey::Table)
        .and_where(Expr::col(SubmissionKey::CreatedAt).lt(before.unix_timestamp()))
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    let result = sqlx::query_with(&sql, values).execute(pool).await?;

    Ok(result.rows_affected())
}

fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
