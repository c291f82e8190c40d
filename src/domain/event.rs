use super::account::{Balance, Principal};
use serde::{Deserialize, Serialize};

/// Notifications produced by state-changing operations, in emission order.
#[derive(Debug, Serialize, Deserialize, PartialEq, Clone)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TestamentEvent {
    Registered {
        address: Principal,
    },
    TestamentTriggered {
        from: Principal,
        to: Principal,
        amount: Balance,
    },
    Unsubscribed {
        address: Principal,
        refunded: Balance,
    },
}

impl TestamentEvent {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "registered",
            Self::TestamentTriggered { .. } => "testament_triggered",
            Self::Unsubscribed { .. } => "unsubscribed",
        }
    }
}
