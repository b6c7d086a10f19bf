use schemars::JsonSchema;
use near_sdk::serde::{Deserialize, Serialize};
use thiserror::Error;
use crate::models::task::TaskInstance;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum LedgerError {
    #[error("reward already spent: reward {reward}, balance {balance}")]
    RewardAlreadySpent { reward: u32, balance: u32 },
    #[error("balance changed: expected {expected}, found {actual}")]
    StaleBalance { expected: u32, actual: u32 },
    #[error("balance {balance} cannot take {amount} more coins")]
    Overflow { balance: u32, amount: u32 },
    #[error("insufficient coins: required {required}, available {available}")]
    InsufficientBalance { required: u32, available: u32 },
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, JsonSchema)]
#[serde(crate = "near_sdk::serde")]
pub struct Toggled {
    pub completed: bool,
    pub completed_at: Option<u64>,
    pub balance: u32,
}

// Asking for the state the task is already in changes nothing.
pub fn toggle(
    instance: &TaskInstance,
    current_balance: u32,
    target_completed: bool,
    now: u64,
) -> Result<Toggled, LedgerError> {
    match (instance.completed, target_completed) {
        (false, true) => Ok(Toggled {
            completed: true,
            completed_at: Some(now),
            balance: deposit(current_balance, instance.reward)?,
        }),
        (true, false) => {
            if current_balance < instance.reward {
                return Err(LedgerError::RewardAlreadySpent {
                    reward: instance.reward,
                    balance: current_balance,
                });
            }
            Ok(Toggled {
                completed: false,
                completed_at: None,
                balance: current_balance - instance.reward,
            })
        },
        _ => Ok(Toggled {
            completed: instance.completed,
            completed_at: instance.completed_at,
            balance: current_balance,
        }),
    }
}

// Compare-and-swap on the balance the caller last saw.
pub fn check_expected(expected: Option<u32>, actual: u32) -> Result<(), LedgerError> {
    match expected {
        Some(expected) if expected != actual => {
            Err(LedgerError::StaleBalance { expected, actual })
        },
        _ => Ok(()),
    }
}

pub fn deposit(balance: u32, amount: u32) -> Result<u32, LedgerError> {
    balance
        .checked_add(amount)
        .ok_or(LedgerError::Overflow { balance, amount })
}

pub fn withdraw(balance: u32, amount: u32) -> Result<u32, LedgerError> {
    balance
        .checked_sub(amount)
        .ok_or(LedgerError::InsufficientBalance { required: amount, available: balance })
}
