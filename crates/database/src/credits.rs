//! Per-principal credit ledger with lazy monthly rollover.
//!
//! All operations take a connection so callers can run them inside their
//! own transaction. Each mutation is a single conditional statement, so
//! the check and the write happen atomically in the store:
//!
//! - [`ensure`] inserts the default entry if it is absent.
//! - [`rollover_if_needed`] resets one counter group when its period marker
//!   is not the current month.
//! - [`try_debit`] decrements a counter only if it would stay non-negative.

use chrono::NaiveDate;
use sqlx::SqliteConnection;
use tracing::{debug, info};

use crate::error::{DatabaseError, Result};
use crate::models::CreditLedger;
use crate::time::{first_of_month, now_iso};

/// Default monthly allotment for each counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Allotments {
    pub v1: i64,
    pub v2: i64,
    pub v3: i64,
    pub ocr_bill: i64,
    pub ocr_bank: i64,
}

/// Allotments given to every new ledger entry and restored on rollover.
pub const DEFAULT_ALLOTMENTS: Allotments = Allotments {
    v1: 10,
    v2: 20,
    v3: 30,
    ocr_bill: 12,
    ocr_bank: 13,
};

impl Allotments {
    fn amount(&self, counter: Counter) -> i64 {
        match counter {
            Counter::V1 => self.v1,
            Counter::V2 => self.v2,
            Counter::V3 => self.v3,
            Counter::OcrBill => self.ocr_bill,
            Counter::OcrBank => self.ocr_bank,
        }
    }
}

/// One of the five independent counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Counter {
    V1,
    V2,
    V3,
    OcrBill,
    OcrBank,
}

impl Counter {
    /// Get the database column name for this counter.
    pub fn column_name(&self) -> &'static str {
        match self {
            Counter::V1 => "v1",
            Counter::V2 => "v2",
            Counter::V3 => "v3",
            Counter::OcrBill => "ocr_bill",
            Counter::OcrBank => "ocr_bank",
        }
    }

    /// The group whose rollover resets this counter.
    pub fn group(&self) -> CounterGroup {
        match self {
            Counter::V1 | Counter::V2 | Counter::V3 => CounterGroup::Action,
            Counter::OcrBill | Counter::OcrBank => CounterGroup::Document,
        }
    }
}

/// Counters that roll over together, each group with its own period marker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CounterGroup {
    /// `v1`, `v2`, `v3`.
    Action,
    /// `ocr_bill`, `ocr_bank`.
    Document,
}

impl CounterGroup {
    pub fn counters(&self) -> &'static [Counter] {
        match self {
            CounterGroup::Action => &[Counter::V1, Counter::V2, Counter::V3],
            CounterGroup::Document => &[Counter::OcrBill, Counter::OcrBank],
        }
    }

    /// Column holding the first day of the group's last reset month.
    pub fn period_column(&self) -> &'static str {
        match self {
            CounterGroup::Action => "last_reset_month",
            CounterGroup::Document => "ocr_last_reset_month",
        }
    }
}

/// Outcome of a debit attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DebitOutcome {
    Debited,
    InsufficientCredits,
}

impl DebitOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, DebitOutcome::Debited)
    }
}

/// Get the ledger entry for a principal, creating it with default
/// allotments if absent.
///
/// The insert runs first so that, inside a transaction, the store's write
/// lock is taken before anything is read.
pub async fn ensure(conn: &mut SqliteConnection, user_id: &str, today: NaiveDate) -> Result<CreditLedger> {
    let period = first_of_month(today);
    let a = DEFAULT_ALLOTMENTS;

    let inserted = sqlx::query(
        r#"
        INSERT INTO user_credits
            (user_id, v1, v2, v3, ocr_bill, ocr_bank, last_reset_month, ocr_last_reset_month)
        VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        ON CONFLICT(user_id) DO NOTHING
        "#,
    )
    .bind(user_id)
    .bind(a.v1)
    .bind(a.v2)
    .bind(a.v3)
    .bind(a.ocr_bill)
    .bind(a.ocr_bank)
    .bind(period)
    .bind(period)
    .execute(&mut *conn)
    .await
    .map_err(DatabaseError::from_statement)?;

    if inserted.rows_affected() > 0 {
        debug!(user_id, "Created credit ledger entry");
    }

    get(conn, user_id).await
}

/// Fetch the ledger entry for a principal.
pub async fn get(conn: &mut SqliteConnection, user_id: &str) -> Result<CreditLedger> {
    sqlx::query_as::<_, CreditLedger>(
        r#"
        SELECT user_id, v1, v2, v3, ocr_bill, ocr_bank, last_reset_month, ocr_last_reset_month
        FROM user_credits
        WHERE user_id = ?
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut *conn)
    .await?
    .ok_or_else(|| DatabaseError::NotFound {
        entity: "CreditLedger",
        id: user_id.to_string(),
    })
}

/// Reset `group` to its default allotments if its period marker is not the
/// month containing `today`.
///
/// Returns whether a reset happened. A second call in the same month is a
/// no-op.
pub async fn rollover_if_needed(
    conn: &mut SqliteConnection,
    user_id: &str,
    group: CounterGroup,
    today: NaiveDate,
) -> Result<bool> {
    let period = first_of_month(today);
    let marker = group.period_column();

    let assignments = group
        .counters()
        .iter()
        .map(|c| format!("{} = {}", c.column_name(), DEFAULT_ALLOTMENTS.amount(*c)))
        .collect::<Vec<_>>()
        .join(", ");
    let sql = format!(
        "UPDATE user_credits SET {assignments}, {marker} = ?, updated_at = ? \
         WHERE user_id = ? AND {marker} <> ?"
    );

    let result = sqlx::query(&sql)
        .bind(period)
        .bind(now_iso())
        .bind(user_id)
        .bind(period)
        .execute(&mut *conn)
        .await?;

    let reset = result.rows_affected() > 0;
    if reset {
        info!(user_id, ?group, %period, "Monthly credit rollover");
    }
    Ok(reset)
}

/// Atomically decrement `counter` by `amount` unless that would take it
/// below zero.
pub async fn try_debit(
    conn: &mut SqliteConnection,
    user_id: &str,
    counter: Counter,
    amount: u32,
) -> Result<DebitOutcome> {
    let column = counter.column_name();
    let sql = format!(
        "UPDATE user_credits SET {column} = {column} - ?, updated_at = ? \
         WHERE user_id = ? AND {column} >= ?"
    );
    let amount = i64::from(amount);

    let result = sqlx::query(&sql)
        .bind(amount)
        .bind(now_iso())
        .bind(user_id)
        .bind(amount)
        .execute(&mut *conn)
        .await
        .map_err(DatabaseError::from_statement)?;

    if result.rows_affected() > 0 {
        return Ok(DebitOutcome::Debited);
    }

    // Distinguish an exhausted counter from a missing entry.
    get(conn, user_id).await?;
    Ok(DebitOutcome::InsufficientCredits)
}
