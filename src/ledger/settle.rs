//! Ledger decisions shared by every store. Stores load the inputs under their
//! lock or row lock, call in here, then write what the plan says.

use std::collections::HashSet;

use uuid::Uuid;

use super::{selection::locked_leads, LedgerError};

/// A download request that already committed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SettledRequest {
    pub lead_ids: Vec<Uuid>,
    pub charged: i64,
}

#[derive(Debug, PartialEq, Eq)]
pub enum UnlockPlan {
    /// Same request, same leads: answer with the recorded charge.
    Replay { charged: i64 },
    /// Charge one credit per lead in `newly_unlocked`.
    Charge { newly_unlocked: Vec<Uuid>, cost: i64 },
}

pub fn plan_unlock(
    prior: Option<&SettledRequest>,
    lead_ids: &[Uuid],
    unlocked: &HashSet<Uuid>,
    balance: i64,
) -> Result<UnlockPlan, LedgerError> {
    if let Some(prior) = prior {
        let settled: HashSet<&Uuid> = prior.lead_ids.iter().collect();
        let asked: HashSet<&Uuid> = lead_ids.iter().collect();
        if settled != asked {
            return Err(LedgerError::RequestReused);
        }
        return Ok(UnlockPlan::Replay { charged: prior.charged });
    }

    let newly_unlocked = locked_leads(lead_ids, unlocked);
    let cost = newly_unlocked.len() as i64;
    if cost > balance {
        return Err(LedgerError::InsufficientCredits { needed: cost, available: balance });
    }
    Ok(UnlockPlan::Charge { newly_unlocked, cost })
}

/// New balance after a grant; refuses to wrap.
pub fn apply_grant(balance: i64, amount: i64) -> Result<i64, LedgerError> {
    balance.checked_add(amount).ok_or(LedgerError::BalanceOverflow)
}
