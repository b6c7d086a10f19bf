use near_sdk::{env, AccountId};
use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use thiserror::Error;

pub type FamilyId = String;

#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema,
    Clone, PartialEq, Debug, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum StorageError {
    #[error("Insufficient balance: required {required}, available {available}")]
    InsufficientBalance { required: u128, available: u128 },
    #[error("Exceeds max size: size {size}, max allowed {max_allowed}")]
    ExceedsMaxSize { size: u64, max_allowed: u64 }
}

#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize,
    Debug, Clone, PartialEq, JsonSchema)]
#[serde(crate = "near_sdk::serde")]
pub struct StorageMetrics {
    pub base_size: u64,
    pub dynamic_size: u64,
    pub total_bytes: u64,
    pub cost_per_byte: u128,
    pub total_cost: u128,
}

impl StorageMetrics {
    pub fn for_size(base_size: u64, dynamic_size: u64) -> Self {
        let total_bytes = base_size + dynamic_size;
        let cost_per_byte = env::storage_byte_cost().as_yoctonear();
        Self {
            base_size,
            dynamic_size,
            total_bytes,
            cost_per_byte,
            total_cost: cost_per_byte * total_bytes as u128,
        }
    }
}

#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema,
    Debug, PartialEq, Clone, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum AccessError {
    #[error("Operation can only be performed by a parent of the family")]
    NotParent,
    #[error("Caller is not a member of the family")]
    NotMember,
    #[error("Operation can only be performed by the assignee or a parent")]
    NotAssignee,
    #[error("Assignee {0} is not a child of the family")]
    AssigneeNotChild(String),
}

// Caller and block time, read once per entry point.
#[derive(Debug, Clone, PartialEq)]
pub struct CallContext {
    pub caller: AccountId,
    pub now: u64,
}

impl CallContext {
    pub fn new(caller: AccountId, now: u64) -> Self {
        Self { caller, now }
    }

    pub fn from_env() -> Self {
        Self::new(env::predecessor_account_id(), env::block_timestamp())
    }
}

pub trait Assignable {
    fn get_assignee_id(&self) -> &AccountId;
    fn get_family_id(&self) -> &FamilyId;

    fn is_assignee(&self, ctx: &CallContext) -> bool {
        ctx.caller == *self.get_assignee_id()
    }
}

pub trait Storable {
    const BASE_STORAGE: u64;
    const MAX_STORAGE: u64;

    fn calculate_storage_metrics(&self) -> StorageMetrics;

    fn validate_storage(&self) -> Result<(), StorageError> {
        let metrics = self.calculate_storage_metrics();

        if metrics.total_bytes > Self::MAX_STORAGE {
            return Err(StorageError::ExceedsMaxSize {
                size: metrics.total_bytes,
                max_allowed: Self::MAX_STORAGE,
            });
        }

        let available = env::account_balance().as_yoctonear();
        if available < metrics.total_cost {
            return Err(StorageError::InsufficientBalance {
                required: metrics.total_cost,
                available,
            });
        }

        Ok(())
    }
}

// A batch is paid for as a whole, so each item passing on its own is not enough.
pub fn validate_total_storage<T: Storable>(items: &[T]) -> Result<(), StorageError> {
    let required: u128 = items.iter()
        .map(|item| item.calculate_storage_metrics().total_cost)
        .sum();

    let available = env::account_balance().as_yoctonear();
    if available < required {
        return Err(StorageError::InsufficientBalance { required, available });
    }
    Ok(())
}

// tab, LF and CR are allowed
pub fn contains_control_characters(text: &str) -> bool {
    text.chars().any(|c| {
        let code = c as u32;
        (code <= 0x08) || (0x0B..=0x0C).contains(&code) ||
        (0x0E..=0x1F).contains(&code) || (code == 0x7F)
    })
}
