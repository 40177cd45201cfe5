//! Lazy account bootstrap: default plan, profile row and ledger entry.

use sqlx::{SqliteConnection, SqlitePool};
use tracing::debug;
use uuid::Uuid;

use crate::credits::{self, DEFAULT_ALLOTMENTS};
use crate::error::{DatabaseError, Result};
use crate::models::{Plan, Principal};
use crate::time::today;

/// Name of the plan every new profile is attached to.
pub const DEFAULT_PLAN: &str = "Free";

/// Make sure a principal has everything the rest of the system expects:
/// the default plan exists, the principal has a profile, and it has a
/// ledger entry.
///
/// Safe to call on every request; each step is an insert-if-absent so
/// concurrent calls for the same principal converge.
pub async fn ensure_account(pool: &SqlitePool, principal: &Principal) -> Result<()> {
    let mut tx = pool.begin().await?;
    let a = DEFAULT_ALLOTMENTS;

    let seeded = sqlx::query(
        r#"
        INSERT INTO plans
            (id, name, price_cents, credits_v1, credits_v2, credits_v3, ocr_bill_limit, ocr_bank_limit)
        SELECT ?, ?, 0, ?, ?, ?, ?, ?
        WHERE NOT EXISTS (SELECT 1 FROM plans)
        "#,
    )
    .bind(Uuid::new_v4().to_string())
    .bind(DEFAULT_PLAN)
    .bind(a.v1)
    .bind(a.v2)
    .bind(a.v3)
    .bind(a.ocr_bill)
    .bind(a.ocr_bank)
    .execute(&mut *tx)
    .await
    .map_err(DatabaseError::from_statement)?;

    if seeded.rows_affected() > 0 {
        debug!(plan = DEFAULT_PLAN, "Seeded default plan");
    }

    let plan_id = get_plan_by_name(&mut tx, DEFAULT_PLAN).await?.map(|plan| plan.id);

    sqlx::query(
        r#"
        INSERT INTO profiles (id, email, plan_id)
        VALUES (?, ?, ?)
        ON CONFLICT(id) DO NOTHING
        "#,
    )
    .bind(&principal.id)
    .bind(&principal.email)
    .bind(plan_id)
    .execute(&mut *tx)
    .await
    .map_err(DatabaseError::from_statement)?;

    credits::ensure(&mut tx, &principal.id, today()).await?;

    tx.commit().await?;
    Ok(())
}

/// Get a plan by name.
pub async fn get_plan_by_name(conn: &mut SqliteConnection, name: &str) -> Result<Option<Plan>> {
    let plan = sqlx::query_as::<_, Plan>(
        r#"
        SELECT id, name, price_cents, credits_v1, credits_v2, credits_v3, ocr_bill_limit, ocr_bank_limit
        FROM plans
        WHERE name = ?
        ORDER BY rowid
        LIMIT 1
        "#,
    )
    .bind(name)
    .fetch_optional(conn)
    .await?;

    Ok(plan)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::{test_db, test_user};

    #[tokio::test]
    async fn test_ensure_account_bootstraps_everything() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;

        ensure_account(db.pool(), &alice).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        let plan = get_plan_by_name(&mut conn, DEFAULT_PLAN).await.unwrap().unwrap();
        drop(conn);
        assert_eq!(plan.credits_v2, Some(20));
        assert_eq!(plan.ocr_bank_limit, Some(13));
        assert_eq!(plan.price_cents, Some(0));

        let (email, plan_id): (Option<String>, Option<String>) =
            sqlx::query_as("SELECT email, plan_id FROM profiles WHERE id = ?")
                .bind(&alice.id)
                .fetch_one(db.pool())
                .await
                .unwrap();
        assert_eq!(email.as_deref(), Some("alice@example.com"));
        assert_eq!(plan_id, Some(plan.id));

        let mut conn = db.pool().acquire().await.unwrap();
        let ledger = credits::get(&mut conn, &alice.id).await.unwrap();
        assert_eq!(ledger.v1, 10);
    }

    #[tokio::test]
    async fn test_ensure_account_is_idempotent() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;
        let bob = test_user(&db, "bob@example.com").await;

        ensure_account(db.pool(), &alice).await.unwrap();
        ensure_account(db.pool(), &alice).await.unwrap();
        ensure_account(db.pool(), &bob).await.unwrap();

        let plans: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM plans")
            .fetch_one(db.pool())
            .await
            .unwrap();
        let profiles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM profiles")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(plans, 1);
        assert_eq!(profiles, 2);
    }

    #[tokio::test]
    async fn test_ensure_account_keeps_spent_credits() {
        let db = test_db().await;
        let alice = test_user(&db, "alice@example.com").await;
        ensure_account(db.pool(), &alice).await.unwrap();

        let mut conn = db.pool().acquire().await.unwrap();
        credits::try_debit(&mut conn, &alice.id, credits::Counter::V1, 4)
            .await
            .unwrap();
        drop(conn);

        ensure_account(db.pool(), &alice).await.unwrap();
        let mut conn = db.pool().acquire().await.unwrap();
        assert_eq!(credits::get(&mut conn, &alice.id).await.unwrap().v1, 6);
    }
}
