use super::account::{Amount, Balance, Principal};
use super::clock::Timestamp;
use crate::error::{Result, TestamentError};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// A single entitlement: `amount` goes to `account` when the owner's
/// subscription lapses.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Beneficiary {
    pub account: Principal,
    pub amount: Balance,
}

/// A movement of custodied funds to a wallet.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Transfer {
    pub from: Principal,
    pub to: Principal,
    pub amount: Amount,
}

/// Everything the engine knows about one registered principal.
///
/// Registration, subscription, beneficiary ledger and custody live in one
/// record so that they are written, read and erased together.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
pub struct Testament {
    pub owner: Principal,
    pub registered_at: Timestamp,
    pub last_renewed_at: Timestamp,
    /// Ordered by first deposit.
    pub beneficiaries: Vec<Beneficiary>,
    /// Custody balance. Always equals the sum of `beneficiaries` amounts.
    pub held: Balance,
}

impl Testament {
    pub fn new(owner: Principal, now: Timestamp) -> Self {
        Self {
            owner,
            registered_at: now,
            last_renewed_at: now,
            beneficiaries: Vec::new(),
            held: Balance::ZERO,
        }
    }

    /// Credits custody and upserts the entry for `account`, keeping the
    /// position of an existing entry. Nothing changes if either the custody
    /// or the entry total would overflow.
    pub fn add_beneficiary(&mut self, account: Principal, amount: Amount) -> Result<&Beneficiary> {
        let deposit: Balance = amount.into();
        let held = self.held.checked_add(deposit).ok_or_else(|| overflow(&self.owner))?;
        let existing = self.beneficiaries.iter().position(|b| b.account == account);
        let entry = match existing {
            Some(index) => self.beneficiaries[index]
                .amount
                .checked_add(deposit)
                .ok_or_else(|| overflow(&self.owner))?,
            None => deposit,
        };

        self.held = held;
        let index = match existing {
            Some(index) => {
                self.beneficiaries[index].amount = entry;
                index
            }
            None => {
                self.beneficiaries.push(Beneficiary {
                    account,
                    amount: entry,
                });
                self.beneficiaries.len() - 1
            }
        };
        Ok(&self.beneficiaries[index])
    }

    pub fn renew(&mut self, now: Timestamp) {
        self.last_renewed_at = now;
    }

    pub fn expires_at(&self, window: Duration) -> Timestamp {
        self.last_renewed_at.saturating_add(window)
    }

    /// The subscription is valid while no more than `window` has elapsed
    /// since the last renewal.
    pub fn is_valid_at(&self, now: Timestamp, window: Duration) -> bool {
        now.elapsed_since(self.last_renewed_at) <= window
    }

    /// One transfer per entry, in ledger order.
    pub fn payout(&self) -> Result<Vec<Transfer>> {
        self.check_custody()?;
        self.beneficiaries
            .iter()
            .map(|b| {
                Ok(Transfer {
                    from: self.owner.clone(),
                    to: b.account.clone(),
                    amount: b.amount.try_into()?,
                })
            })
            .collect()
    }

    /// The whole custody balance back to the owner, if there is any.
    pub fn refund(&self) -> Result<Option<Transfer>> {
        self.check_custody()?;
        if self.held.is_zero() {
            return Ok(None);
        }
        Ok(Some(Transfer {
            from: self.owner.clone(),
            to: self.owner.clone(),
            amount: self.held.try_into()?,
        }))
    }

    fn check_custody(&self) -> Result<()> {
        let entitled = self
            .beneficiaries
            .iter()
            .try_fold(Balance::ZERO, |sum, b| sum.checked_add(b.amount));
        if entitled == Some(self.held) {
            Ok(())
        } else {
            let entitled = entitled.map_or_else(|| "more than fits".to_string(), |e| e.to_string());
            Err(TestamentError::InternalError(
                format!(
                    "Custody of {} holds {} but beneficiaries are entitled to {}",
                    self.owner, self.held, entitled
                )
                .into(),
            ))
        }
    }
}

fn overflow(owner: &Principal) -> TestamentError {
    TestamentError::ValidationError(format!("Deposit would overflow the custody of {}", owner))
}

/// Balance of every recipient after `transfers` are credited on top of
/// `current`. Nothing is written; one overflowing credit rejects the batch.
pub fn credited_balances<F>(transfers: &[Transfer], mut current: F) -> Result<HashMap<Principal, Balance>>
where
    F: FnMut(&Principal) -> Result<Balance>,
{
    let mut credited: HashMap<Principal, Balance> = HashMap::new();
    for transfer in transfers {
        let balance = match credited.get(&transfer.to) {
            Some(balance) => *balance,
            None => current(&transfer.to)?,
        };
        let next = balance.checked_add(transfer.amount.into()).ok_or_else(|| {
            TestamentError::TransferRejected {
                from: transfer.from.clone(),
                to: transfer.to.clone(),
                amount: transfer.amount.into(),
                reason: "recipient balance would overflow".to_string(),
            }
        })?;
        credited.insert(transfer.to.clone(), next);
    }
    Ok(credited)
}
