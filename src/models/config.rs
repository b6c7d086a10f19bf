use schemars::JsonSchema;
use near_sdk::{
    borsh::{self, BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize}};

// === Storage Constants ===
pub mod storage {
    pub const TASK_BASE_STORAGE: u64 = 256;
    pub const TASK_MAX_STORAGE: u64 = 4096;
    pub const STORE_ITEM_BASE_STORAGE: u64 = 192;
    pub const STORE_ITEM_MAX_STORAGE: u64 = 4096;
    pub const FAMILY_BASE_STORAGE: u64 = 128;
    pub const FAMILY_MAX_STORAGE: u64 = 8192;
}

// === Task Related Constants ===
pub mod task {
    pub const MAX_TITLE_LENGTH: usize = 256;
    pub const MAX_DESCRIPTION_LENGTH: usize = 1024;
}

// === Store Related Constants ===
pub mod store {
    pub const MAX_NAME_LENGTH: usize = 256;
    pub const MAX_DESCRIPTION_LENGTH: usize = 1024;
    pub const MAX_IMAGE_REFERENCE_LENGTH: usize = 512;
}

// === Family Related Constants ===
pub mod family {
    pub const MAX_NAME_LENGTH: usize = 128;
    pub const MAX_DISPLAY_NAME_LENGTH: usize = 64;
    pub const MAX_MEMBERS: usize = 16;
}

// === Runtime Configuration ===
pub const DEFAULT_MAX_OCCURRENCES_PER_TEMPLATE: u32 = 366;
pub const DEFAULT_MAX_SCHEDULE_SPAN_DAYS: u32 = 366;
pub const DEFAULT_MAX_TASK_REWARD: u32 = 10_000;

#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema,
    Debug, Clone, Copy, PartialEq)]
#[serde(crate = "near_sdk::serde")]
pub struct ContractConfig {
    pub max_occurrences_per_template: u32,
    pub max_schedule_span_days: u32,
    pub max_task_reward: u32,
}

impl Default for ContractConfig {
    fn default() -> Self {
        Self {
            max_occurrences_per_template: DEFAULT_MAX_OCCURRENCES_PER_TEMPLATE,
            max_schedule_span_days: DEFAULT_MAX_SCHEDULE_SPAN_DAYS,
            max_task_reward: DEFAULT_MAX_TASK_REWARD,
        }
    }
}
