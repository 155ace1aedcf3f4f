//! User actions against a reserve

use lendguard_risk::{OutflowSide, Side};
use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumString};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, EnumString, Display)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    Deposit,
    Borrow,
    Withdraw,
    Repay,
}

impl Action {
    /// Side of the obligation the action changes
    pub fn side(&self) -> Side {
        match self {
            Action::Deposit | Action::Withdraw => Side::Deposit,
            Action::Borrow | Action::Repay => Side::Borrow,
        }
    }

    /// Outflow the action draws from the market limiter, if any
    pub fn outflow_side(&self) -> Option<OutflowSide> {
        match self {
            Action::Borrow => Some(OutflowSide::Borrow),
            Action::Withdraw => Some(OutflowSide::Withdraw),
            Action::Deposit | Action::Repay => None,
        }
    }

    /// Returns true if the action spends tokens from the user's wallet
    pub fn spends_wallet(&self) -> bool {
        matches!(self, Action::Deposit | Action::Repay)
    }
}
