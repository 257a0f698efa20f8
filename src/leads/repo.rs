use anyhow::Context;
use sqlx::{PgPool, Postgres, Transaction};

use super::repo_types::{Lead, NewLead};

const LEAD_COLUMNS: &str = "id, lead_id, company_name, contact_name, email, phone, industry, \
     location, company_size, revenue_range, capital_need, status, created_date";

/// Insert one lead within a transaction.
pub async fn insert_lead_tx(tx: &mut Transaction<'_, Postgres>, lead: &NewLead) -> anyhow::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO leads (lead_id, company_name, contact_name, email, phone, industry,
                           location, company_size, revenue_range, capital_need, status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(&lead.lead_id)
    .bind(&lead.company_name)
    .bind(&lead.contact_name)
    .bind(&lead.email)
    .bind(&lead.phone)
    .bind(&lead.industry)
    .bind(&lead.location)
    .bind(&lead.company_size)
    .bind(&lead.revenue_range)
    .bind(&lead.capital_need)
    .bind(&lead.status)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Insert the whole batch or nothing.
pub async fn insert_batch(db: &PgPool, leads: &[NewLead]) -> anyhow::Result<u64> {
    let mut tx = db.begin().await.context("begin tx")?;
    for lead in leads {
        insert_lead_tx(&mut tx, lead).await?;
    }
    tx.commit().await.context("commit tx")?;
    Ok(leads.len() as u64)
}

// ---- Queries ----

/// Leads newest first, optionally restricted to one status.
pub async fn list(db: &PgPool, status: Option<&str>) -> anyhow::Result<Vec<Lead>> {
    let rows = sqlx::query_as::<_, Lead>(&format!(
        r#"
        SELECT {LEAD_COLUMNS}
          FROM leads
         WHERE ($1::text IS NULL OR status = $1)
         ORDER BY created_date DESC
        "#
    ))
    .bind(status)
    .fetch_all(db)
    .await
    .context("list leads")?;
    Ok(rows)
}
