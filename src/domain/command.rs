use super::account::Principal;
use super::clock::Timestamp;
use rust_decimal::Decimal;
use serde::Deserialize;

#[derive(Debug, Deserialize, PartialEq, Clone, Copy)]
#[serde(rename_all = "snake_case")]
pub enum CommandType {
    Register,
    AddBeneficiary,
    RenewSubscribe,
    Unsubscribe,
    ControlValidSubscription,
}

/// One row of a replayed command log.
#[derive(Debug, Deserialize, PartialEq, Clone)]
pub struct Command {
    pub command: CommandType,
    pub principal: Principal,
    /// Required by `add_beneficiary` only.
    pub beneficiary: Option<Principal>,
    /// Required by `add_beneficiary` only.
    pub amount: Option<Decimal>,
    /// When set, the replay clock is moved here before the command runs.
    pub time: Option<Timestamp>,
}
