use time::OffsetDateTime;
use tracing::info;
use uuid::Uuid;

use super::{dto::Quote, repo_types::UnlockReceipt, selection::Selection, LedgerError};
use crate::export::{export_filename, write_records};
use crate::leads::repo_types::{Lead, STATUS_AVAILABLE};
use crate::store::MarketStore;

/// Fixed column order of a lead export.
pub const EXPORT_COLUMNS: [&str; 9] = [
    "Company Name",
    "Contact Name",
    "Email",
    "Phone",
    "Industry",
    "Location",
    "Company Size",
    "Revenue Range",
    "Capital Need",
];

pub fn export_row(lead: &Lead) -> Vec<(&'static str, &str)> {
    let values: [&str; 9] = [
        lead.company_name.as_str(),
        &lead.contact_name,
        &lead.email,
        &lead.phone,
        &lead.industry,
        &lead.location,
        &lead.company_size,
        &lead.revenue_range,
        &lead.capital_need,
    ];
    EXPORT_COLUMNS.into_iter().zip(values).collect()
}

/// A settled download: the receipt plus the CSV attachment.
#[derive(Debug)]
pub struct Download {
    pub receipt: UnlockReceipt,
    pub filename: String,
    pub csv: String,
    pub exported: usize,
}

/// Prices the selection. Ids that are not available leads are left out.
pub async fn quote(
    store: &dyn MarketStore,
    user_id: Uuid,
    selection: &Selection,
) -> Result<Quote, LedgerError> {
    let balance = store
        .get_profile(user_id)
        .await?
        .ok_or(LedgerError::UnknownUser(user_id))?
        .credits;
    let available = store.list_leads(Some(STATUS_AVAILABLE)).await?;
    let known = Selection::from_ids(
        available
            .iter()
            .map(|l| l.id)
            .filter(|id| selection.contains(*id)),
    );
    let unlocked = store.downloaded_lead_ids(user_id).await?;
    let cost = known.cost(&unlocked);
    Ok(Quote {
        selected: known.len(),
        cost,
        balance,
        sufficient: cost <= balance,
    })
}

/// Charges for newly unlocked leads, then renders every selected lead as CSV.
///
/// Nothing is exported unless the charge committed.
pub async fn download(
    store: &dyn MarketStore,
    user_id: Uuid,
    selection: &Selection,
    request_id: Uuid,
    on: time::Date,
) -> Result<Download, LedgerError> {
    if selection.is_empty() {
        return Err(LedgerError::EmptySelection);
    }

    let available = store.list_leads(Some(STATUS_AVAILABLE)).await?;
    let chosen: Vec<&Lead> = available
        .iter()
        .filter(|l| selection.contains(l.id))
        .collect();
    if chosen.len() != selection.len() {
        return Err(LedgerError::UnknownLeads(selection.len() - chosen.len()));
    }

    let receipt = store.unlock_leads(user_id, selection.ids(), request_id).await?;

    let rows: Vec<_> = chosen.iter().map(|l| export_row(l)).collect();
    let csv = write_records(&rows)
        .map_err(|e| LedgerError::Store(e.into()))?
        .unwrap_or_default();

    info!(
        %user_id,
        %request_id,
        exported = chosen.len(),
        charged = receipt.charged,
        balance = receipt.balance,
        replayed = receipt.replayed,
        "leads downloaded"
    );

    Ok(Download {
        receipt,
        filename: export_filename(on),
        csv,
        exported: chosen.len(),
    })
}

/// Accepts a JSON integer or a numeric string; anything else, or a value
/// below one, is rejected.
pub fn parse_grant_amount(raw: &serde_json::Value) -> Result<i64, LedgerError> {
    let amount = match raw {
        serde_json::Value::Number(n) => n.as_i64(),
        serde_json::Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    };
    match amount {
        Some(a) if a > 0 => Ok(a),
        _ => Err(LedgerError::InvalidAmount),
    }
}

pub async fn grant(
    store: &dyn MarketStore,
    admin_id: Uuid,
    user_id: Uuid,
    raw_amount: &serde_json::Value,
) -> Result<i64, LedgerError> {
    let amount = parse_grant_amount(raw_amount)?;
    let credits = store.grant_credits(user_id, amount).await?;
    info!(%admin_id, %user_id, amount, credits, "credits granted");
    Ok(credits)
}

pub fn today() -> time::Date {
    OffsetDateTime::now_utc().date()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::repo_types::NewUser;
    use crate::leads::repo_types::NewLead;
    use crate::store::MemoryStore;
    use serde_json::json;
    use time::macros::date;

    async fn seeded(credits: i64, leads: usize) -> (MemoryStore, Uuid, Vec<Uuid>) {
        let store = MemoryStore::new();
        let user = store
            .create_user(NewUser {
                email: "buyer@acme.com".into(),
                password_hash: "x".into(),
                name: "Buyer".into(),
                company: "Acme".into(),
            })
            .await
            .unwrap()
            .id;
        store.set_credits(user, credits);
        let batch = (0..leads)
            .map(|i| NewLead {
                lead_id: format!("LEAD-1-{}", i + 1),
                company_name: format!("Co {i}"),
                email: format!("c{i}@co.com"),
                status: "available".into(),
                ..Default::default()
            })
            .collect();
        store.insert_leads(batch).await.unwrap();
        let ids = store
            .list_leads(None)
            .await
            .unwrap()
            .into_iter()
            .map(|l| l.id)
            .collect();
        (store, user, ids)
    }

    #[tokio::test]
    async fn quote_drops_after_partial_download() {
        let (store, user, ids) = seeded(10, 3).await;
        let sel = Selection::from_ids(ids.clone());
        assert_eq!(quote(&store, user, &sel).await.unwrap().cost, 3);

        let one = Selection::from_ids([ids[0]]);
        download(&store, user, &one, Uuid::new_v4(), date!(2026 - 01 - 02))
            .await
            .unwrap();

        let q = quote(&store, user, &sel).await.unwrap();
        assert_eq!(q.cost, 2);
        assert_eq!(q.balance, 9);
        assert!(q.sufficient);
    }

    #[tokio::test]
    async fn download_exports_locked_and_unlocked_leads() {
        let (store, user, ids) = seeded(10, 2).await;
        download(&store, user, &Selection::from_ids([ids[0]]), Uuid::new_v4(), date!(2026 - 01 - 02))
            .await
            .unwrap();

        let out = download(&store, user, &Selection::from_ids(ids.clone()), Uuid::new_v4(), date!(2026 - 01 - 02))
            .await
            .unwrap();
        assert_eq!(out.exported, 2);
        assert_eq!(out.receipt.charged, 1);
        assert_eq!(out.filename, "verifiedmeasure_leads_2026-01-02.csv");
        assert!(out.csv.starts_with(
            "Company Name,Contact Name,Email,Phone,Industry,Location,Company Size,Revenue Range,Capital Need\n"
        ));
        assert_eq!(out.csv.lines().count(), 3);
    }

    #[tokio::test]
    async fn insufficient_credits_leave_everything_unchanged() {
        let (store, user, ids) = seeded(3, 5).await;
        let err = download(&store, user, &Selection::from_ids(ids), Uuid::new_v4(), today())
            .await
            .unwrap_err();
        assert!(err.to_string().starts_with("Not enough credits. You need 5 but have 3"));
        assert_eq!(store.get_profile(user).await.unwrap().unwrap().credits, 3);
        assert!(store.downloaded_lead_ids(user).await.unwrap().is_empty());
        assert!(store.all_transactions().is_empty());
    }

    #[tokio::test]
    async fn empty_or_unknown_selection_is_rejected() {
        let (store, user, _) = seeded(3, 1).await;
        let err = download(&store, user, &Selection::default(), Uuid::new_v4(), today())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::EmptySelection));

        let err = download(&store, user, &Selection::from_ids([Uuid::new_v4()]), Uuid::new_v4(), today())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::UnknownLeads(1)));
    }

    #[tokio::test]
    async fn quote_skips_unknown_leads() {
        let (store, user, mut ids) = seeded(10, 2).await;
        ids.push(Uuid::new_v4());
        let q = quote(&store, user, &Selection::from_ids(ids)).await.unwrap();
        assert_eq!((q.selected, q.cost), (2, 2));
    }

    #[tokio::test]
    async fn reused_request_id_exports_nothing_new() {
        let (store, user, ids) = seeded(1, 5).await;
        let request_id = Uuid::new_v4();

        let paid = download(&store, user, &Selection::from_ids([ids[0]]), request_id, today())
            .await
            .unwrap();
        assert_eq!(paid.receipt.charged, 1);

        let err = download(&store, user, &Selection::from_ids(ids.clone()), request_id, today())
            .await
            .unwrap_err();
        assert!(matches!(err, LedgerError::RequestReused));
        assert_eq!(store.downloaded_lead_ids(user).await.unwrap().len(), 1);

        // the genuine retry still replays
        let again = download(&store, user, &Selection::from_ids([ids[0]]), request_id, today())
            .await
            .unwrap();
        assert!(again.receipt.replayed);
        assert_eq!((again.receipt.charged, again.receipt.balance, again.exported), (1, 0, 1));
    }

    #[tokio::test]
    async fn oversized_grant_is_rejected() {
        let (store, user, _) = seeded(10, 0).await;
        let err = grant(&store, Uuid::new_v4(), user, &json!(i64::MAX)).await.unwrap_err();
        assert!(matches!(err, LedgerError::BalanceOverflow));
        assert_eq!(store.get_profile(user).await.unwrap().unwrap().credits, 10);
        assert!(store.all_transactions().is_empty());
    }

    #[tokio::test]
    async fn grant_fifty_on_ten() {
        let (store, user, _) = seeded(10, 0).await;
        let admin = Uuid::new_v4();
        assert_eq!(grant(&store, admin, user, &json!(50)).await.unwrap(), 60);

        let txs = store.list_transactions(user).await.unwrap();
        assert_eq!(txs.len(), 1);
        assert_eq!((txs[0].amount, txs[0].kind.as_str()), (50, "grant"));
    }

    #[tokio::test]
    async fn invalid_grant_amounts_write_nothing() {
        let (store, user, _) = seeded(10, 0).await;
        for bad in [json!(0), json!(-5), json!("abc"), json!(2.5), json!(null), json!("")] {
            let err = grant(&store, Uuid::new_v4(), user, &bad).await.unwrap_err();
            assert!(matches!(err, LedgerError::InvalidAmount), "{bad}");
        }
        assert_eq!(store.get_profile(user).await.unwrap().unwrap().credits, 10);
        assert!(store.all_transactions().is_empty());
    }

    #[test]
    fn numeric_strings_are_accepted() {
        assert_eq!(parse_grant_amount(&json!(" 25 ")).unwrap(), 25);
    }
}
