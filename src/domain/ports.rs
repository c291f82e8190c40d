use super::account::{Balance, Principal};
use super::clock::Clock;
use super::testament::{Testament, Transfer};
use crate::error::Result;
use async_trait::async_trait;
use std::sync::Arc;

/// Keyed storage of testament records, one per registered principal.
#[async_trait]
pub trait TestamentStore: Send + Sync {
    async fn store(&self, testament: Testament) -> Result<()>;
    async fn get(&self, owner: &Principal) -> Result<Option<Testament>>;
    async fn get_all(&self) -> Result<Vec<Testament>>;
}

/// Destination of funds released from custody.
#[async_trait]
pub trait Wallet: Send + Sync {
    async fn balance(&self, principal: &Principal) -> Result<Balance>;
}

/// Testament records and wallets behind one commit boundary.
#[async_trait]
pub trait Ledger: TestamentStore + Wallet {
    /// Credits every transfer and erases the testament of `owner` as one
    /// write. On error neither the wallets nor the record have changed.
    async fn settle(&self, owner: &Principal, transfers: &[Transfer]) -> Result<()>;
}

pub type LedgerBox = Box<dyn Ledger>;
pub type ClockRef = Arc<dyn Clock>;
