use near_sdk::{near, AccountId};

use crate::models::{FamilyId, Role, StoreItemId, TaskId};

#[near(event_json(standard = "chore_quest"))]
pub enum ChoreEvent {
    #[event_version("1.0.0")]
    FamilyCreated { family_id: FamilyId, founder: AccountId },

    #[event_version("1.0.0")]
    MemberAdded { family_id: FamilyId, account_id: AccountId, role: Role },

    #[event_version("1.0.0")]
    MemberRemoved { family_id: FamilyId, account_id: AccountId },

    #[event_version("1.0.0")]
    TasksScheduled {
        family_id: FamilyId,
        assignee: AccountId,
        task_ids: Vec<TaskId>,
        first_date: String,
        last_date: String,
    },

    #[event_version("1.0.0")]
    TaskToggled {
        family_id: FamilyId,
        task_id: TaskId,
        assignee: AccountId,
        completed: bool,
        balance: u32,
    },

    #[event_version("1.0.0")]
    TaskDeleted { family_id: FamilyId, task_id: TaskId },

    #[event_version("1.0.0")]
    StoreItemAdded { family_id: FamilyId, item_id: StoreItemId, cost: u32 },

    #[event_version("1.0.0")]
    StoreItemPurchased {
        family_id: FamilyId,
        item_id: StoreItemId,
        buyer: AccountId,
        cost: u32,
        balance: u32,
    },

    #[event_version("1.0.0")]
    StoreItemDeleted { family_id: FamilyId, item_id: StoreItemId },

    #[event_version("1.0.0")]
    BonusAwarded { family_id: FamilyId, account_id: AccountId, amount: u32, balance: u32 },
}
