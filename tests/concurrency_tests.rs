use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use std::sync::Arc;
use testament::application::engine::TestamentEngine;
use testament::domain::account::{Balance, Principal};
use testament::domain::clock::Timestamp;
use testament::domain::ports::{LedgerBox, TestamentStore, Wallet};
use testament::domain::testament::Testament;
use testament::error::TestamentError;
use testament::infrastructure::in_memory::InMemoryStore;

mod common;

#[tokio::test]
async fn test_concurrent_controls_pay_out_once() {
    let (engine, _, clock) = common::engine();
    let engine = Arc::new(engine);
    let owner = common::principal("owner");
    engine.register(&owner).await.unwrap();
    engine
        .add_beneficiary(&owner, &common::principal("heir"), dec!(10))
        .await
        .unwrap();
    clock.advance(common::days(61));

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let engine = engine.clone();
            let owner = owner.clone();
            tokio::spawn(async move { engine.control_valid_subscription(&owner).await })
        })
        .collect();

    let mut triggered = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(events) => {
                assert_eq!(events.len(), 1);
                triggered += 1;
            }
            Err(e) => assert!(matches!(e, TestamentError::NotRegistered(_))),
        }
    }

    assert_eq!(triggered, 1);
    assert_eq!(
        engine.balance(&common::principal("heir")).await.unwrap(),
        Balance(dec!(10))
    );
}

#[tokio::test]
async fn test_concurrent_registrations_and_deposits() {
    let (engine, _, _) = common::engine();
    let engine = Arc::new(engine);

    let handles: Vec<_> = (0..50)
        .map(|i| {
            let engine = engine.clone();
            tokio::spawn(async move {
                let owner = common::principal(&format!("owner{}", i % 10));
                let _ = engine.register(&owner).await;
                engine
                    .add_beneficiary(&owner, &common::principal("heir"), dec!(1))
                    .await
                    .unwrap();
            })
        })
        .collect();
    for handle in handles {
        handle.await.unwrap();
    }

    let engine = Arc::into_inner(engine).expect("all tasks finished");
    let testaments = engine.into_results().await.unwrap();
    assert_eq!(testaments.len(), 10);
    for testament in testaments {
        assert_eq!(testament.beneficiaries.len(), 1);
        assert_eq!(testament.held, Balance(dec!(5)));
    }
}

async fn stored(engine: &TestamentEngine, owners: &[Principal]) -> usize {
    let mut count = 0;
    for owner in owners {
        if engine.is_stored(owner).await.unwrap() {
            count += 1;
        }
    }
    count
}

#[tokio::test]
async fn test_reads_wait_for_concurrent_payouts() {
    let (engine, _, clock) = common::engine();
    let engine = Arc::new(engine);
    let owners: Vec<Principal> = (0..20)
        .map(|i| common::principal(&format!("owner{}", i)))
        .collect();
    let heir = common::principal("heir");
    for owner in &owners {
        engine.register(owner).await.unwrap();
        engine.add_beneficiary(owner, &heir, dec!(1)).await.unwrap();
    }
    clock.advance(common::days(61));

    let handles: Vec<_> = owners
        .iter()
        .map(|owner| {
            let engine = engine.clone();
            let owner = owner.clone();
            tokio::spawn(async move { engine.control_valid_subscription(&owner).await })
        })
        .collect();

    // Erasures and credits only ever grow, so a balance read between two
    // counts of stored owners is bounded by both.
    for _ in 0..20 {
        let before = stored(&engine, &owners).await;
        let balance = engine.balance(&heir).await.unwrap();
        let after = stored(&engine, &owners).await;
        assert!(Balance(Decimal::from(owners.len() - before)) <= balance);
        assert!(balance <= Balance(Decimal::from(owners.len() - after)));
        tokio::task::yield_now().await;
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }
    assert_eq!(engine.balance(&heir).await.unwrap(), Balance(dec!(20)));
}

#[tokio::test]
async fn test_ledger_as_trait_object() {
    let ledger: LedgerBox = Box::new(InMemoryStore::new());

    // Verify Send + Sync by spawning a task
    let handle = tokio::spawn(async move {
        ledger
            .store(Testament::new(common::principal("owner"), Timestamp(1)))
            .await
            .unwrap();
        let testament = ledger.get(&common::principal("owner")).await.unwrap().unwrap();
        let balance = ledger.balance(&common::principal("owner")).await.unwrap();
        (testament, balance)
    });

    let (testament, balance) = handle.await.unwrap();
    assert_eq!(testament.owner.as_str(), "owner");
    assert!(balance.is_zero());
}
