use crate::domain::account::{Balance, Principal};
use crate::domain::ports::{Ledger, TestamentStore, Wallet};
use crate::domain::testament::{Testament, Transfer, credited_balances};
use crate::error::{Result, TestamentError};
use async_trait::async_trait;
use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use tokio::sync::RwLock;

#[derive(Default)]
struct State {
    testaments: HashMap<Principal, Testament>,
    balances: HashMap<Principal, Balance>,
    rejecting: HashSet<Principal>,
}

/// A thread-safe in-memory ledger of testaments and wallet balances.
///
/// Both maps sit behind a single `Arc<RwLock<..>>`, so a settlement is seen
/// by readers either not at all or completely.
/// Ideal for testing or one-shot replays where persistence is not required.
///
/// Recipients registered through [`InMemoryStore::reject_funds_for`] refuse
/// incoming transfers, which makes the whole settlement fail.
#[derive(Default, Clone)]
pub struct InMemoryStore {
    state: Arc<RwLock<State>>,
}

impl InMemoryStore {
    /// Creates a new, empty in-memory ledger.
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn reject_funds_for(&self, principal: Principal) {
        self.state.write().await.rejecting.insert(principal);
    }

    pub async fn accept_funds_for(&self, principal: &Principal) {
        self.state.write().await.rejecting.remove(principal);
    }
}

#[async_trait]
impl TestamentStore for InMemoryStore {
    async fn store(&self, testament: Testament) -> Result<()> {
        let mut state = self.state.write().await;
        state.testaments.insert(testament.owner.clone(), testament);
        Ok(())
    }

    async fn get(&self, owner: &Principal) -> Result<Option<Testament>> {
        let state = self.state.read().await;
        Ok(state.testaments.get(owner).cloned())
    }

    async fn get_all(&self) -> Result<Vec<Testament>> {
        let state = self.state.read().await;
        Ok(state.testaments.values().cloned().collect())
    }
}

#[async_trait]
impl Wallet for InMemoryStore {
    async fn balance(&self, principal: &Principal) -> Result<Balance> {
        let state = self.state.read().await;
        Ok(state.balances.get(principal).copied().unwrap_or_default())
    }
}

#[async_trait]
impl Ledger for InMemoryStore {
    async fn settle(&self, owner: &Principal, transfers: &[Transfer]) -> Result<()> {
        let mut state = self.state.write().await;

        if let Some(refused) = transfers.iter().find(|t| state.rejecting.contains(&t.to)) {
            return Err(TestamentError::TransferRejected {
                from: refused.from.clone(),
                to: refused.to.clone(),
                amount: refused.amount.into(),
                reason: "recipient does not accept funds".to_string(),
            });
        }

        let credited = credited_balances(transfers, |principal| {
            Ok(state.balances.get(principal).copied().unwrap_or_default())
        })?;
        state.balances.extend(credited);
        state.testaments.remove(owner);
        Ok(())
    }
}
