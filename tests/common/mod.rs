#![allow(dead_code)]

use rand::Rng;
use std::io::{Error, Write};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tempfile::NamedTempFile;
use testament::application::engine::TestamentEngine;
use testament::config::{EngineConfig, SECONDS_IN_A_DAY};
use testament::domain::account::Principal;
use testament::domain::clock::{ManualClock, Timestamp};
use testament::infrastructure::in_memory::InMemoryStore;

pub const HEADER: &str = "command, principal, beneficiary, amount, time";
pub const GENESIS: u64 = 1_600_000_000;

pub fn days(n: u64) -> Duration {
    Duration::from_secs(n * SECONDS_IN_A_DAY)
}

/// Unix time `n` days after `GENESIS`, as written in command logs.
pub fn day(n: u64) -> String {
    (GENESIS + n * SECONDS_IN_A_DAY).to_string()
}

pub fn principal(id: &str) -> Principal {
    Principal::new(id).unwrap()
}

pub fn engine() -> (TestamentEngine, InMemoryStore, Arc<ManualClock>) {
    let ledger = InMemoryStore::new();
    let clock = Arc::new(ManualClock::new(Timestamp(GENESIS)));
    let engine = TestamentEngine::new(
        Box::new(ledger.clone()),
        clock.clone(),
        EngineConfig::default(),
    );
    (engine, ledger, clock)
}

/// Writes a command log with the standard header followed by `rows`.
pub fn command_file(rows: &[&str]) -> NamedTempFile {
    let mut file = NamedTempFile::new().unwrap();
    writeln!(file, "{}", HEADER).unwrap();
    for row in rows {
        writeln!(file, "{}", row).unwrap();
    }
    file
}

/// Generates a log where `owners` principals register, fund a random number
/// of beneficiaries and all expire on day 61.
pub fn generate_csv(path: &Path, owners: usize) -> Result<(), Error> {
    let mut rng = rand::thread_rng();
    let mut wtr = csv::WriterBuilder::new().from_path(path)?;
    wtr.write_record(["command", "principal", "beneficiary", "amount", "time"])?;

    for owner in 1..=owners {
        let owner = format!("owner{}", owner);
        wtr.write_record(["register", owner.as_str(), "", "", day(0).as_str()])?;
        for _ in 0..rng.gen_range(1..=5) {
            let beneficiary = format!("heir{}", rng.gen_range(1..=20));
            let amount = rng.gen_range(1..=100).to_string();
            wtr.write_record([
                "add_beneficiary",
                owner.as_str(),
                beneficiary.as_str(),
                amount.as_str(),
                "",
            ])?;
        }
    }
    for owner in 1..=owners {
        let owner = format!("owner{}", owner);
        wtr.write_record([
            "control_valid_subscription",
            owner.as_str(),
            "",
            "",
            day(61).as_str(),
        ])?;
    }

    wtr.flush()?;
    Ok(())
}
