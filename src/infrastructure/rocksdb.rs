use crate::domain::account::{Balance, Principal};
use crate::domain::ports::{Ledger, TestamentStore, Wallet};
use crate::domain::testament::{Testament, Transfer, credited_balances};
use crate::error::{Result, TestamentError};
use async_trait::async_trait;
use rocksdb::{ColumnFamilyDescriptor, DB, Options, WriteBatch};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use std::sync::Arc;

/// Column Family for storing testament records.
pub const CF_TESTAMENTS: &str = "testaments";
/// Column Family for storing wallet balances.
pub const CF_BALANCES: &str = "balances";

/// A persistent store implementation using RocksDB.
///
/// Handles storage for both `Testament` records and wallet balances using
/// separate Column Families. A settlement writes the credited balances and
/// deletes the testament in a single `WriteBatch`, so it is applied entirely
/// or not at all.
///
/// This struct is thread-safe (`Clone` shares the underlying `Arc<DB>`).
#[derive(Clone)]
pub struct RocksDBStore {
    db: Arc<DB>,
}

fn internal(message: String) -> TestamentError {
    TestamentError::InternalError(Box::new(std::io::Error::other(message)))
}

fn encode<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    serde_json::to_vec(value).map_err(|e| internal(format!("Serialization error: {}", e)))
}

fn decode<T: DeserializeOwned>(bytes: &[u8]) -> Result<T> {
    serde_json::from_slice(bytes).map_err(|e| internal(format!("Deserialization error: {}", e)))
}

impl RocksDBStore {
    /// Opens or creates a RocksDB instance at the specified path.
    ///
    /// Ensures that the required column families ("testaments" and "balances") exist.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let mut opts = Options::default();
        opts.create_if_missing(true);
        opts.create_missing_column_families(true);

        let cf_testaments = ColumnFamilyDescriptor::new(CF_TESTAMENTS, Options::default());
        let cf_balances = ColumnFamilyDescriptor::new(CF_BALANCES, Options::default());

        let db = DB::open_cf_descriptors(&opts, path, vec![cf_testaments, cf_balances])?;

        Ok(Self { db: Arc::new(db) })
    }

    fn cf(&self, name: &str) -> Result<&rocksdb::ColumnFamily> {
        self.db
            .cf_handle(name)
            .ok_or_else(|| internal(format!("Column family {} not found", name)))
    }
}

#[async_trait]
impl TestamentStore for RocksDBStore {
    async fn store(&self, testament: Testament) -> Result<()> {
        let cf = self.cf(CF_TESTAMENTS)?;
        let value = encode(&testament)?;
        self.db.put_cf(cf, testament.owner.as_str(), value)?;
        Ok(())
    }

    async fn get(&self, owner: &Principal) -> Result<Option<Testament>> {
        let cf = self.cf(CF_TESTAMENTS)?;
        match self.db.get_cf(cf, owner.as_str())? {
            Some(bytes) => Ok(Some(decode(&bytes)?)),
            None => Ok(None),
        }
    }

    async fn get_all(&self) -> Result<Vec<Testament>> {
        let cf = self.cf(CF_TESTAMENTS)?;

        let mut testaments = Vec::new();
        for item in self.db.iterator_cf(cf, rocksdb::IteratorMode::Start) {
            let (_key, value) = item?;
            testaments.push(decode(&value)?);
        }
        Ok(testaments)
    }
}

#[async_trait]
impl Wallet for RocksDBStore {
    async fn balance(&self, principal: &Principal) -> Result<Balance> {
        let cf = self.cf(CF_BALANCES)?;
        match self.db.get_cf(cf, principal.as_str())? {
            Some(bytes) => decode(&bytes),
            None => Ok(Balance::ZERO),
        }
    }
}

#[async_trait]
impl Ledger for RocksDBStore {
    async fn settle(&self, owner: &Principal, transfers: &[Transfer]) -> Result<()> {
        let cf_balances = self.cf(CF_BALANCES)?;
        let cf_testaments = self.cf(CF_TESTAMENTS)?;

        let credited = credited_balances(transfers, |principal| {
            match self.db.get_cf(cf_balances, principal.as_str())? {
                Some(bytes) => decode(&bytes),
                None => Ok(Balance::ZERO),
            }
        })?;

        let mut batch = WriteBatch::default();
        for (principal, balance) in &credited {
            batch.put_cf(cf_balances, principal.as_str(), encode(balance)?);
        }
        batch.delete_cf(cf_testaments, owner.as_str());
        self.db.write(batch)?;
        Ok(())
    }
}
