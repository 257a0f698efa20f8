use std::collections::HashSet;

use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use super::{
    repo_types::{CreditTransaction, UnlockReceipt, TX_DEDUCT, TX_GRANT},
    settle::{apply_grant, plan_unlock, SettledRequest, UnlockPlan},
    LedgerError,
};

/// Lead ids the user has already unlocked.
pub async fn downloaded_lead_ids(db: &PgPool, user_id: Uuid) -> anyhow::Result<HashSet<Uuid>> {
    let rows: Vec<Uuid> = sqlx::query_scalar(
        r#"
        SELECT lead_id
          FROM download_history
         WHERE user_id = $1
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list download history")?;
    Ok(rows.into_iter().collect())
}

pub async fn list_transactions(db: &PgPool, user_id: Uuid) -> anyhow::Result<Vec<CreditTransaction>> {
    let rows = sqlx::query_as::<_, CreditTransaction>(
        r#"
        SELECT id, user_id, amount, type, description, request_id, created_at
          FROM credit_transactions
         WHERE user_id = $1
         ORDER BY created_at DESC
        "#,
    )
    .bind(user_id)
    .fetch_all(db)
    .await
    .context("list credit transactions")?;
    Ok(rows)
}

async fn insert_transaction_tx(
    tx: &mut Transaction<'_, Postgres>,
    user_id: Uuid,
    amount: i64,
    kind: &str,
    description: &str,
    request_id: Option<Uuid>,
) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO credit_transactions (user_id, amount, type, description, request_id)
        VALUES ($1, $2, $3, $4, $5)
        "#,
    )
    .bind(user_id)
    .bind(amount)
    .bind(kind)
    .bind(description)
    .bind(request_id)
    .execute(&mut **tx)
    .await
    .context("insert credit transaction")?;
    Ok(())
}

/// Locks the profile row and returns its balance.
async fn lock_balance_tx(tx: &mut Transaction<'_, Postgres>, user_id: Uuid) -> anyhow::Result<Option<i64>> {
    let credits: Option<i64> = sqlx::query_scalar(
        r#"
        SELECT credits
          FROM user_profiles
         WHERE id = $1
           FOR UPDATE
        "#,
    )
    .bind(user_id)
    .fetch_optional(&mut **tx)
    .await
    .context("lock profile")?;
    Ok(credits)
}

/// Charges for the locked subset of `lead_ids`, records the unlocks and the
/// deduction, all in one transaction. A settled `request_id` is replayed.
pub async fn unlock_and_charge(
    db: &PgPool,
    user_id: Uuid,
    lead_ids: &[Uuid],
    request_id: Uuid,
) -> Result<UnlockReceipt, LedgerError> {
    let mut tx = db.begin().await.context("begin tx")?;

    let balance = lock_balance_tx(&mut tx, user_id)
        .await?
        .ok_or(LedgerError::UnknownUser(user_id))?;

    let prior = sqlx::query_as::<_, (Vec<Uuid>, i64)>(
        r#"
        SELECT lead_ids, charged
          FROM download_requests
         WHERE user_id = $1 AND request_id = $2
        "#,
    )
    .bind(user_id)
    .bind(request_id)
    .fetch_optional(&mut *tx)
    .await
    .context("lookup download request")?
    .map(|(lead_ids, charged)| SettledRequest { lead_ids, charged });

    let unlocked: HashSet<Uuid> = sqlx::query_scalar::<_, Uuid>(
        r#"
        SELECT lead_id
          FROM download_history
         WHERE user_id = $1 AND lead_id = ANY($2)
        "#,
    )
    .bind(user_id)
    .bind(lead_ids)
    .fetch_all(&mut *tx)
    .await
    .context("read download history")?
    .into_iter()
    .collect();

    // Returning early drops the transaction, which rolls it back.
    let (newly_unlocked, cost) = match plan_unlock(prior.as_ref(), lead_ids, &unlocked, balance)? {
        UnlockPlan::Replay { charged } => {
            return Ok(UnlockReceipt {
                request_id,
                charged,
                newly_unlocked: Vec::new(),
                balance,
                replayed: true,
            })
        }
        UnlockPlan::Charge { newly_unlocked, cost } => (newly_unlocked, cost),
    };

    let mut remaining = balance;
    if cost > 0 {
        remaining = sqlx::query_scalar(
            r#"
            UPDATE user_profiles
               SET credits = credits - $2
             WHERE id = $1 AND credits >= $2
            RETURNING credits
            "#,
        )
        .bind(user_id)
        .bind(cost)
        .fetch_optional(&mut *tx)
        .await
        .context("deduct credits")?
        .ok_or(LedgerError::InsufficientCredits { needed: cost, available: balance })?;

        for lead_id in &newly_unlocked {
            sqlx::query(
                r#"
                INSERT INTO download_history (user_id, lead_id)
                VALUES ($1, $2)
                ON CONFLICT DO NOTHING
                "#,
            )
            .bind(user_id)
            .bind(lead_id)
            .execute(&mut *tx)
            .await
            .context("insert download history")?;
        }

        insert_transaction_tx(
            &mut tx,
            user_id,
            -cost,
            TX_DEDUCT,
            &format!("Downloaded {cost} leads"),
            Some(request_id),
        )
        .await?;
    }

    sqlx::query(
        r#"
        INSERT INTO download_requests (user_id, request_id, lead_ids, charged)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(user_id)
    .bind(request_id)
    .bind(lead_ids)
    .bind(cost)
    .execute(&mut *tx)
    .await
    .context("record download request")?;

    tx.commit().await.context("commit tx")?;

    Ok(UnlockReceipt {
        request_id,
        charged: cost,
        newly_unlocked,
        balance: remaining,
        replayed: false,
    })
}

/// Adds `amount` under a row lock and logs a grant. Returns the new balance.
pub async fn grant(db: &PgPool, user_id: Uuid, amount: i64) -> Result<i64, LedgerError> {
    let mut tx = db.begin().await.context("begin tx")?;

    let balance = lock_balance_tx(&mut tx, user_id)
        .await?
        .ok_or(LedgerError::UnknownUser(user_id))?;
    let credits = apply_grant(balance, amount)?;

    sqlx::query(
        r#"
        UPDATE user_profiles
           SET credits = $2
         WHERE id = $1
        "#,
    )
    .bind(user_id)
    .bind(credits)
    .execute(&mut *tx)
    .await
    .context("add credits")?;

    insert_transaction_tx(
        &mut tx,
        user_id,
        amount,
        TX_GRANT,
        &format!("Admin granted {amount} credits"),
        None,
    )
    .await?;

    tx.commit().await.context("commit tx")?;
    Ok(credits)
}
