use crate::config::EngineConfig;
use crate::domain::account::{Amount, Balance, Principal};
use crate::domain::clock::Timestamp;
use crate::domain::command::{Command, CommandType};
use crate::domain::event::TestamentEvent;
use crate::domain::ports::{ClockRef, LedgerBox, TestamentStore, Wallet};
use crate::domain::testament::{Beneficiary, Testament, Transfer};
use crate::error::{Result, TestamentError};
use rust_decimal::Decimal;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

/// The main entry point of the testament service.
///
/// `TestamentEngine` owns the ledger holding testaments and wallets, and the
/// clock used for liveness checks. Every operation, reads included, runs
/// under one lock, so no caller ever observes a payout halfway through.
pub struct TestamentEngine {
    ledger: LedgerBox,
    clock: ClockRef,
    config: EngineConfig,
    lock: Mutex<()>,
}

impl TestamentEngine {
    /// Creates a new `TestamentEngine` instance.
    ///
    /// # Arguments
    ///
    /// * `ledger` - Testament records and the wallets payouts are credited to.
    /// * `clock` - Source of the current time.
    /// * `config` - Validity window and other tunables.
    pub fn new(ledger: LedgerBox, clock: ClockRef, config: EngineConfig) -> Self {
        Self {
            ledger,
            clock,
            config,
            lock: Mutex::new(()),
        }
    }

    /// Registers `principal` and starts its subscription.
    pub async fn register(&self, principal: &Principal) -> Result<TestamentEvent> {
        let _guard = self.lock.lock().await;

        if self.ledger.get(principal).await?.is_some() {
            return Err(TestamentError::AlreadyRegistered(principal.clone()));
        }

        let now = self.clock.now();
        self.ledger
            .store(Testament::new(principal.clone(), now))
            .await?;
        info!(%principal, registered_at = %now, "Account registered");

        Ok(TestamentEvent::Registered {
            address: principal.clone(),
        })
    }

    /// Deposits `amount` into custody, earmarked for `beneficiary`.
    ///
    /// Repeated deposits to the same beneficiary accumulate into its
    /// existing entry. Returns the entry after the deposit.
    pub async fn add_beneficiary(
        &self,
        owner: &Principal,
        beneficiary: &Principal,
        amount: Decimal,
    ) -> Result<Beneficiary> {
        let amount = Amount::new(amount)?;
        let _guard = self.lock.lock().await;

        let mut testament = self.registered(owner).await?;
        let entry = testament
            .add_beneficiary(beneficiary.clone(), amount)?
            .clone();
        let held = testament.held;
        self.ledger.store(testament).await?;
        debug!(%owner, %beneficiary, %amount, %held, "Beneficiary deposit recorded");

        Ok(entry)
    }

    /// The beneficiary ledger of `owner`, in first-deposit order.
    pub async fn get_beneficiaries(&self, owner: &Principal) -> Result<Vec<Beneficiary>> {
        let _guard = self.lock.lock().await;
        Ok(self.registered(owner).await?.beneficiaries)
    }

    /// Restarts the validity window of `principal` from now.
    pub async fn renew_subscribe(&self, principal: &Principal) -> Result<()> {
        let _guard = self.lock.lock().await;

        let mut testament = self.registered(principal).await?;
        let now = self.clock.now();
        testament.renew(now);
        self.ledger.store(testament).await?;
        debug!(%principal, renewed_at = %now, "Subscription renewed");

        Ok(())
    }

    /// Withdraws from the service without triggering the testament.
    ///
    /// The custodied balance is returned to the owner and all of its state
    /// is erased, after which it may register again.
    pub async fn unsubscribe(&self, principal: &Principal) -> Result<TestamentEvent> {
        let _guard = self.lock.lock().await;

        let testament = self.registered(principal).await?;
        let refund: Vec<Transfer> = testament.refund()?.into_iter().collect();
        self.settle(principal, &refund).await?;
        info!(%principal, refunded = %testament.held, "Account unsubscribed");

        Ok(TestamentEvent::Unsubscribed {
            address: principal.clone(),
            refunded: testament.held,
        })
    }

    /// Liveness check, callable by anyone.
    ///
    /// Rejects with `SubscriptionStillValid` while the owner is within its
    /// validity window. Otherwise pays every beneficiary its entitlement,
    /// erases the owner's state and returns one `TestamentTriggered` event
    /// per beneficiary in ledger order.
    pub async fn control_valid_subscription(
        &self,
        principal: &Principal,
    ) -> Result<Vec<TestamentEvent>> {
        let _guard = self.lock.lock().await;

        let testament = self.registered(principal).await?;
        let now = self.clock.now();
        let window = self.config.validity_window;
        if testament.is_valid_at(now, window) {
            return Err(TestamentError::SubscriptionStillValid {
                owner: principal.clone(),
                expires_at: testament.expires_at(window),
            });
        }

        let payout = testament.payout()?;
        self.settle(principal, &payout).await?;
        info!(
            %principal,
            beneficiaries = payout.len(),
            total = %testament.held,
            "Testament triggered"
        );

        Ok(payout
            .into_iter()
            .map(|transfer| TestamentEvent::TestamentTriggered {
                from: transfer.from,
                to: transfer.to,
                amount: transfer.amount.into(),
            })
            .collect())
    }

    /// Whether any state is kept for `principal`.
    pub async fn is_stored(&self, principal: &Principal) -> Result<bool> {
        let _guard = self.lock.lock().await;
        Ok(self.ledger.get(principal).await?.is_some())
    }

    /// A snapshot of the full record of `principal`, if registered.
    pub async fn testament(&self, principal: &Principal) -> Result<Option<Testament>> {
        let _guard = self.lock.lock().await;
        self.ledger.get(principal).await
    }

    /// Funds credited to the wallet of `principal` by payouts and refunds.
    pub async fn balance(&self, principal: &Principal) -> Result<Balance> {
        let _guard = self.lock.lock().await;
        self.ledger.balance(principal).await
    }

    /// The instant after which the subscription of `principal` can be triggered.
    pub async fn expires_at(&self, principal: &Principal) -> Result<Timestamp> {
        let _guard = self.lock.lock().await;
        let testament = self.registered(principal).await?;
        Ok(testament.expires_at(self.config.validity_window))
    }

    /// Dispatches one replayed command to the matching operation.
    pub async fn process_command(&self, command: Command) -> Result<Vec<TestamentEvent>> {
        let principal = &command.principal;
        match command.command {
            CommandType::Register => Ok(vec![self.register(principal).await?]),
            CommandType::AddBeneficiary => {
                let beneficiary = command.beneficiary.ok_or_else(|| {
                    TestamentError::ValidationError("Missing beneficiary".to_string())
                })?;
                let amount = command.amount.ok_or_else(|| {
                    TestamentError::ValidationError("Missing amount".to_string())
                })?;
                self.add_beneficiary(principal, &beneficiary, amount).await?;
                Ok(Vec::new())
            }
            CommandType::RenewSubscribe => {
                self.renew_subscribe(principal).await?;
                Ok(Vec::new())
            }
            CommandType::Unsubscribe => Ok(vec![self.unsubscribe(principal).await?]),
            CommandType::ControlValidSubscription => {
                self.control_valid_subscription(principal).await
            }
        }
    }

    /// Consumes the engine and returns every live testament.
    pub async fn into_results(self) -> Result<Vec<Testament>> {
        self.ledger.get_all().await
    }

    async fn registered(&self, principal: &Principal) -> Result<Testament> {
        self.ledger
            .get(principal)
            .await?
            .ok_or_else(|| TestamentError::NotRegistered(principal.clone()))
    }

    /// Moves `transfers` out of custody and erases the record of `owner` in
    /// one ledger write. Must be called with the lock held.
    async fn settle(&self, owner: &Principal, transfers: &[Transfer]) -> Result<()> {
        self.ledger.settle(owner, transfers).await.inspect_err(|e| {
            warn!(%owner, error = %e, "Settlement aborted, nothing transferred");
        })
    }
}
