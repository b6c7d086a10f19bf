use chrono::NaiveDate;
use near_sdk::borsh::{self, BorshDeserialize, BorshSerialize};
use near_sdk::serde::{Deserialize, Serialize};
use schemars::JsonSchema;
use thiserror::Error;
use near_sdk::{
    near, log, PanicOnDefault, AccountId,
    collections::{LookupMap, UnorderedMap, UnorderedSet},
};

pub mod events;
pub mod models;
use crate::events::ChoreEvent;
use crate::models::{
    ContractConfig, CallContext, FamilyId, Assignable,
    StorageError, AccessError, validate_total_storage,

    TaskTemplate, TaskInstance, TaskId, TaskAction,
    TaskError, TaskValidationError, TaskStateError, ScheduleError,

    LedgerError, Toggled,

    Family, Profile, Role, FamilyError, FamilyValidationError,

    StoreItem, StoreItemId, StoreItemInput,
    StoreItemError, StoreItemValidationError, StoreItemStateError,
};
use crate::models::ledger;

// === Core Enums ===
#[derive(Debug)]
pub enum IndexType {
    Family,
    StoreItem,
}

// === Return Types ===
#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema, Clone, Debug, PartialEq)]
#[serde(crate = "near_sdk::serde")]
pub enum Response<T, E> {
    Success(T),
    Error(E)
}

impl<T, E> Response<T, E> {
    pub fn from_result<E2>(result: Result<T, E2>, error_mapper: impl FnOnce(E2) -> E) -> Self {
        match result {
            Ok(t) => Response::Success(t),
            Err(e) => Response::Error(error_mapper(e)),
        }
    }

    pub fn into_result(self) -> Result<T, E> {
        match self {
            Response::Success(t) => Ok(t),
            Response::Error(e) => Err(e),
        }
    }
}

#[derive(Serialize, Deserialize, JsonSchema, Clone, Copy, Debug, PartialEq)]
#[serde(crate = "near_sdk::serde")]
pub struct DailyProgress {
    pub total: u32,
    pub completed: u32,
    pub coins_earned: u32,
}

// === Core Error Types ===
#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema, Clone, Debug, PartialEq, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum ContractError {
    // entity, message, details
    #[error("{} validation error: {}{}", .0, .1, .2.as_ref().map(|d| format!(" ({})", d)).unwrap_or_default())]
    ValidationError(String, String, Option<String>),
    #[error("Storage error: {0}")]
    StorageError(StorageError),
    #[error("Access error: {0}")]
    AccessError(AccessError),
    // entity, current_state, attempted_action, message
    #[error("{0} state error: {3} (current state: {1}, attempted: {2})")]
    StateError(String, String, String, String),
    // entity, reason
    #[error("{0} rejected: {1}")]
    PolicyRejection(String, String),
    // entity, id
    #[error("{0} not found: {1}")]
    NotFound(String, String),
    #[error("Operation error: {0}")]
    Operation(String)
}

// === Type aliases for response types ===
pub type FamilyResponse = Response<Family, ContractError>;
pub type FamilyListResponse = Response<Vec<Family>, ContractError>;
pub type FamilyActionResponse = Response<FamilyId, ContractError>;
pub type ProfileListResponse = Response<Vec<Profile>, ContractError>;

pub type TaskResponse = Response<TaskInstance, ContractError>;
pub type TaskListResponse = Response<Vec<TaskInstance>, ContractError>;
pub type TaskActionResponse = Response<TaskId, ContractError>;
pub type TaskBatchResponse = Response<Vec<TaskId>, ContractError>;
pub type ToggleResponse = Response<Toggled, ContractError>;
pub type ProgressResponse = Response<DailyProgress, ContractError>;

pub type StoreItemActionResponse = Response<StoreItemId, ContractError>;
pub type StoreItemListResponse = Response<Vec<StoreItem>, ContractError>;

pub type CoinsResponse = Response<u32, ContractError>;

// === Error Conversion Implementations ===
impl From<StorageError> for ContractError {
    fn from(err: StorageError) -> Self {
        ContractError::StorageError(err)
    }
}

impl From<AccessError> for ContractError {
    fn from(err: AccessError) -> Self {
        ContractError::AccessError(err)
    }
}

// Task error conversions
impl From<TaskError> for ContractError {
    fn from(err: TaskError) -> Self {
        match err {
            TaskError::Validation(err) => err.into(),
            TaskError::Schedule(err) => err.into(),
            TaskError::Storage(err) => ContractError::StorageError(err),
            TaskError::Access(err) => ContractError::AccessError(err),
            TaskError::State(err) => err.into()
        }
    }
}

impl From<TaskValidationError> for ContractError {
    fn from(err: TaskValidationError) -> Self {
        ContractError::ValidationError(
            "Task".to_string(),
            err.to_string(),
            None
        )
    }
}

impl From<ScheduleError> for ContractError {
    fn from(err: ScheduleError) -> Self {
        ContractError::ValidationError(
            "Schedule".to_string(),
            err.to_string(),
            None
        )
    }
}

impl From<TaskStateError> for ContractError {
    fn from(err: TaskStateError) -> Self {
        match err {
            TaskStateError::InvalidActionForState { completed, action } => ContractError::StateError(
                "Task".to_string(),
                if completed { "Completed".to_string() } else { "Pending".to_string() },
                format!("{:?}", action),
                "Invalid action for current state".to_string()
            )
        }
    }
}

// Ledger error conversions
impl From<LedgerError> for ContractError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::RewardAlreadySpent { .. } => ContractError::PolicyRejection(
                "Task".to_string(),
                err.to_string()
            ),
            LedgerError::InsufficientBalance { .. } => ContractError::PolicyRejection(
                "CoinBalance".to_string(),
                err.to_string()
            ),
            LedgerError::StaleBalance { expected, actual } => ContractError::StateError(
                "CoinBalance".to_string(),
                actual.to_string(),
                format!("update from {}", expected),
                "Balance changed since it was read".to_string()
            ),
            LedgerError::Overflow { .. } => ContractError::Operation(err.to_string()),
        }
    }
}

// Family error conversions
impl From<FamilyError> for ContractError {
    fn from(err: FamilyError) -> Self {
        match err {
            FamilyError::Validation(err) => err.into(),
            FamilyError::Storage(err) => ContractError::StorageError(err),
            FamilyError::Access(err) => ContractError::AccessError(err),
        }
    }
}

impl From<FamilyValidationError> for ContractError {
    fn from(err: FamilyValidationError) -> Self {
        ContractError::ValidationError(
            "Family".to_string(),
            err.to_string(),
            None
        )
    }
}

// Store error conversions
impl From<StoreItemError> for ContractError {
    fn from(err: StoreItemError) -> Self {
        match err {
            StoreItemError::Validation(err) => err.into(),
            StoreItemError::Storage(err) => ContractError::StorageError(err),
            StoreItemError::Access(err) => ContractError::AccessError(err),
            StoreItemError::State(err) => err.into(),
        }
    }
}

impl From<StoreItemValidationError> for ContractError {
    fn from(err: StoreItemValidationError) -> Self {
        ContractError::ValidationError(
            "StoreItem".to_string(),
            err.to_string(),
            None
        )
    }
}

impl From<StoreItemStateError> for ContractError {
    fn from(err: StoreItemStateError) -> Self {
        match err {
            StoreItemStateError::OutOfStock => ContractError::StateError(
                "StoreItem".to_string(),
                "OutOfStock".to_string(),
                "Purchase".to_string(),
                err.to_string()
            )
        }
    }
}

impl<T> From<Result<T, ContractError>> for Response<T, ContractError> {
    fn from(result: Result<T, ContractError>) -> Self {
        Response::from_result(result, |e| e)
    }
}

fn parse_date(date: &str) -> Result<NaiveDate, ContractError> {
    date.parse::<NaiveDate>().map_err(|e| ContractError::ValidationError(
        "Date".to_string(),
        format!("invalid date {}", date),
        Some(e.to_string())
    ))
}

fn day_key(assignee: &AccountId, date: &str) -> String {
    format!("{}:{}", assignee, date)
}

// === Core Data Structures ===
#[near(contract_state)]
#[derive(PanicOnDefault)]
pub struct Contract {
    config: ContractConfig,
    families: UnorderedMap<FamilyId, Family>,
    families_per_member: LookupMap<String, UnorderedSet<FamilyId>>,
    tasks: UnorderedMap<TaskId, TaskInstance>,
    tasks_per_day: LookupMap<String, Vec<TaskId>>,
    balances: LookupMap<(FamilyId, AccountId), u32>,
    store_items: UnorderedMap<StoreItemId, StoreItem>,
    store_items_per_family: LookupMap<FamilyId, UnorderedSet<StoreItemId>>,
    next_seq: u64,
}


#[near]
impl Contract {
    #[init]
    pub fn new(config: Option<ContractConfig>) -> Self {
        Self {
            config: config.unwrap_or_default(),
            families: UnorderedMap::new(b"f".to_vec()),
            families_per_member: LookupMap::new(b"fm".to_vec()),
            tasks: UnorderedMap::new(b"t".to_vec()),
            tasks_per_day: LookupMap::new(b"td".to_vec()),
            balances: LookupMap::new(b"b".to_vec()),
            store_items: UnorderedMap::new(b"s".to_vec()),
            store_items_per_family: LookupMap::new(b"sf".to_vec()),
            next_seq: 0,
        }
    }

    pub fn get_config(&self) -> ContractConfig {
        self.config
    }

    // Ids are derived from the sequence without advancing it, so a call
    // that fails validation leaves the sequence untouched.
    fn id_for(&self, prefix: &str, offset: u64) -> String {
        format!("{}-{}", prefix, self.next_seq + offset)
    }

    fn consume_ids(&mut self, count: u64) {
        self.next_seq += count;
    }

    fn add_to_index(&mut self, key: &str, id: &str, index_type: IndexType) {
        match index_type {
            IndexType::Family => {
                let member = key.to_string();
                let mut family_set = self.families_per_member
                    .get(&member)
                    .unwrap_or_else(|| UnorderedSet::new(format!("fm{}", key).as_bytes()));
                family_set.insert(&id.to_string());
                self.families_per_member.insert(&member, &family_set);
            },
            IndexType::StoreItem => {
                let family_id = key.to_string();
                let mut item_set = self.store_items_per_family
                    .get(&family_id)
                    .unwrap_or_else(|| UnorderedSet::new(format!("sf{}", key).as_bytes()));
                item_set.insert(&id.to_string());
                self.store_items_per_family.insert(&family_id, &item_set);
            },
        }
    }

    fn remove_from_index(&mut self, key: &str, id: &str, index_type: IndexType) {
        match index_type {
            IndexType::Family => {
                let member = key.to_string();
                if let Some(mut family_set) = self.families_per_member.get(&member) {
                    family_set.remove(&id.to_string());
                    self.families_per_member.insert(&member, &family_set);
                }
            },
            IndexType::StoreItem => {
                let family_id = key.to_string();
                if let Some(mut item_set) = self.store_items_per_family.get(&family_id) {
                    item_set.remove(&id.to_string());
                    self.store_items_per_family.insert(&family_id, &item_set);
                }
            },
        }
    }

    fn load_family(&self, family_id: &FamilyId) -> Result<Family, ContractError> {
        self.families.get(family_id).ok_or_else(|| ContractError::NotFound(
            "Family".to_string(),
            format!("Family {} not found", family_id)
        ))
    }

    fn load_task(&self, task_id: &TaskId) -> Result<TaskInstance, ContractError> {
        self.tasks.get(task_id).ok_or_else(|| ContractError::NotFound(
            "Task".to_string(),
            format!("Task {} not found", task_id)
        ))
    }

    fn load_store_item(&self, item_id: &StoreItemId) -> Result<StoreItem, ContractError> {
        self.store_items.get(item_id).ok_or_else(|| ContractError::NotFound(
            "StoreItem".to_string(),
            format!("Store item {} not found", item_id)
        ))
    }

    fn balance_of(&self, family_id: &FamilyId, account_id: &AccountId) -> u32 {
        self.balances
            .get(&(family_id.clone(), account_id.clone()))
            .unwrap_or(0)
    }

    fn set_balance(&mut self, family_id: &FamilyId, account_id: &AccountId, balance: u32) {
        self.balances.insert(&(family_id.clone(), account_id.clone()), &balance);
    }

    // === Family Management ===
    pub fn create_family(&mut self, name: String, display_name: String) -> FamilyActionResponse {
        let ctx = CallContext::from_env();
        let family_id = self.id_for("family", 0);

        let family = match Family::new(family_id.clone(), name, display_name, &ctx) {
            Ok(family) => family,
            Err(e) => return Response::Error(e.into())
        };

        self.consume_ids(1);
        self.families.insert(&family_id, &family);
        self.add_to_index(ctx.caller.as_str(), &family_id, IndexType::Family);

        ChoreEvent::FamilyCreated {
            family_id: family_id.clone(),
            founder: ctx.caller,
        }.emit();
        Response::Success(family_id)
    }

    pub fn add_family_member(
        &mut self,
        family_id: FamilyId,
        account_id: AccountId,
        display_name: String,
        role: Role,
    ) -> FamilyActionResponse {
        let ctx = CallContext::from_env();
        let mut family = match self.load_family(&family_id) {
            Ok(family) => family,
            Err(e) => return Response::Error(e)
        };

        if let Err(e) = family.add_member(account_id.clone(), display_name, role, &ctx) {
            return Response::Error(e.into());
        }

        self.families.insert(&family_id, &family);
        self.add_to_index(account_id.as_str(), &family_id, IndexType::Family);

        ChoreEvent::MemberAdded {
            family_id: family_id.clone(),
            account_id,
            role,
        }.emit();
        Response::Success(family_id)
    }

    // Tasks, balances and store items of a removed member are kept.
    pub fn remove_family_member(&mut self, family_id: FamilyId, account_id: AccountId) -> FamilyActionResponse {
        let ctx = CallContext::from_env();
        let mut family = match self.load_family(&family_id) {
            Ok(family) => family,
            Err(e) => return Response::Error(e)
        };

        if let Err(e) = family.remove_member(&account_id, &ctx) {
            return Response::Error(e.into());
        }

        self.families.insert(&family_id, &family);
        self.remove_from_index(account_id.as_str(), &family_id, IndexType::Family);

        ChoreEvent::MemberRemoved {
            family_id: family_id.clone(),
            account_id,
        }.emit();
        Response::Success(family_id)
    }

    pub fn get_family(&self, family_id: FamilyId) -> FamilyResponse {
        self.load_family(&family_id).into()
    }

    pub fn get_families_for(&self, account_id: AccountId) -> FamilyListResponse {
        let families: Vec<Family> = self.families_per_member
            .get(&account_id.to_string())
            .map(|set| set.iter().filter_map(|id| self.families.get(&id)).collect())
            .unwrap_or_default();
        Response::Success(families)
    }

    pub fn get_child_profiles(&self, family_id: FamilyId) -> ProfileListResponse {
        Response::from_result(
            self.load_family(&family_id).map(|family| family.child_profiles()),
            |e| e
        )
    }

    // === Task Management ===

    pub fn create_tasks(&mut self, family_id: FamilyId, template: TaskTemplate) -> TaskBatchResponse {
        let ctx = CallContext::from_env();
        self.schedule_tasks(&ctx, family_id, template).into()
    }

    fn schedule_tasks(
        &mut self,
        ctx: &CallContext,
        family_id: FamilyId,
        mut template: TaskTemplate,
    ) -> Result<Vec<TaskId>, ContractError> {
        let family = self.load_family(&family_id)?;
        family.require_parent(ctx)?;
        family.require_child(&template.assignee)?;

        let occurrences = template.occurrences(&self.config)?;
        let (first_date, last_date) = match (occurrences.first(), occurrences.last()) {
            (Some(first), Some(last)) => (first.date.to_string(), last.date.to_string()),
            _ => return Err(ScheduleError::NoValidDates.into()),
        };

        let mut instances = Vec::with_capacity(occurrences.len());
        for (offset, occurrence) in occurrences.into_iter().enumerate() {
            let id = self.id_for("task", offset as u64);
            instances.push(TaskInstance::from_occurrence(id, family_id.clone(), occurrence, ctx)?);
        }
        validate_total_storage(&instances)?;

        self.consume_ids(instances.len() as u64);
        for instance in &instances {
            self.tasks.insert(&instance.id, instance);
            let key = day_key(instance.get_assignee_id(), &instance.task_date);
            let mut day = self.tasks_per_day.get(&key).unwrap_or_default();
            day.push(instance.id.clone());
            self.tasks_per_day.insert(&key, &day);
        }

        let task_ids: Vec<TaskId> = instances.iter().map(|i| i.id.clone()).collect();
        ChoreEvent::TasksScheduled {
            family_id,
            assignee: template.assignee,
            task_ids: task_ids.clone(),
            first_date,
            last_date,
        }.emit();
        Ok(task_ids)
    }

    pub fn get_task(&self, task_id: TaskId) -> TaskResponse {
        self.load_task(&task_id).into()
    }

    pub fn get_tasks_for_day(&self, assignee: AccountId, date: String) -> TaskListResponse {
        let date = match parse_date(&date) {
            Ok(date) => date,
            Err(e) => return Response::Error(e)
        };

        let tasks: Vec<TaskInstance> = self.tasks_per_day
            .get(&day_key(&assignee, &date.to_string()))
            .unwrap_or_default()
            .iter()
            .filter_map(|task_id| self.tasks.get(task_id))
            .collect();
        Response::Success(tasks)
    }

    pub fn get_daily_progress(&self, assignee: AccountId, date: String) -> ProgressResponse {
        let tasks = match self.get_tasks_for_day(assignee, date) {
            Response::Success(tasks) => tasks,
            Response::Error(e) => return Response::Error(e)
        };

        let done = tasks.iter().filter(|t| t.completed);
        Response::Success(DailyProgress {
            total: tasks.len() as u32,
            completed: done.clone().count() as u32,
            coins_earned: done.map(|t| t.reward).sum(),
        })
    }

    pub fn toggle_task_completion(
        &mut self,
        task_id: TaskId,
        completed: bool,
        expected_balance: Option<u32>,
    ) -> ToggleResponse {
        let ctx = CallContext::from_env();
        self.apply_toggle(&ctx, task_id, completed, expected_balance).into()
    }

    fn apply_toggle(
        &mut self,
        ctx: &CallContext,
        task_id: TaskId,
        completed: bool,
        expected_balance: Option<u32>,
    ) -> Result<Toggled, ContractError> {
        let mut task = self.load_task(&task_id)?;
        let family_id = task.get_family_id().clone();
        let family = self.load_family(&family_id)?;

        let assignee_in_family = task.is_assignee(ctx) && family.member(&ctx.caller).is_some();
        if !assignee_in_family && !family.is_parent(&ctx.caller) {
            return Err(AccessError::NotAssignee.into());
        }
        task.validate_state_for_action(TaskAction::Toggle)?;

        let assignee = task.get_assignee_id().clone();
        let current = self.balance_of(&family_id, &assignee);
        ledger::check_expected(expected_balance, current)?;

        let toggled = ledger::toggle(&task, current, completed, ctx.now).map_err(|e| {
            log!("Toggle of {} refused: {}", task_id, e);
            ContractError::from(e)
        })?;
        if toggled.completed == task.completed {
            return Ok(toggled);
        }

        task.set_completion(toggled.completed, toggled.completed_at);
        self.tasks.insert(&task_id, &task);
        self.set_balance(&family_id, &assignee, toggled.balance);

        ChoreEvent::TaskToggled {
            family_id,
            task_id,
            assignee,
            completed: toggled.completed,
            balance: toggled.balance,
        }.emit();
        Ok(toggled)
    }

    pub fn delete_task(&mut self, task_id: TaskId) -> TaskActionResponse {
        let ctx = CallContext::from_env();
        let task = match self.load_task(&task_id) {
            Ok(task) => task,
            Err(e) => return Response::Error(e)
        };
        let family = match self.load_family(task.get_family_id()) {
            Ok(family) => family,
            Err(e) => return Response::Error(e)
        };

        if let Err(e) = family.require_parent(&ctx) {
            return Response::Error(e.into());
        }
        if let Err(e) = task.validate_state_for_action(TaskAction::Delete) {
            return Response::Error(e.into());
        }

        self.tasks.remove(&task_id);
        let key = day_key(task.get_assignee_id(), &task.task_date);
        if let Some(mut day) = self.tasks_per_day.get(&key) {
            day.retain(|id| id != &task_id);
            self.tasks_per_day.insert(&key, &day);
        }

        ChoreEvent::TaskDeleted {
            family_id: family.id,
            task_id: task_id.clone(),
        }.emit();
        Response::Success(task_id)
    }

    // === Coin balance management ===
    pub fn get_coin_balance(&self, family_id: FamilyId, account_id: AccountId) -> CoinsResponse {
        if let Err(e) = self.load_family(&family_id) {
            return Response::Error(e);
        }
        Response::Success(self.balance_of(&family_id, &account_id))
    }

    pub fn award_bonus(&mut self, family_id: FamilyId, account_id: AccountId, amount: u32) -> CoinsResponse {
        let ctx = CallContext::from_env();
        let family = match self.load_family(&family_id) {
            Ok(family) => family,
            Err(e) => return Response::Error(e)
        };

        if let Err(e) = family.require_parent(&ctx) {
            return Response::Error(e.into());
        }
        if let Err(e) = family.require_child(&account_id) {
            return Response::Error(e.into());
        }

        let balance = match ledger::deposit(self.balance_of(&family_id, &account_id), amount) {
            Ok(balance) => balance,
            Err(e) => return Response::Error(e.into())
        };
        self.set_balance(&family_id, &account_id, balance);

        ChoreEvent::BonusAwarded {
            family_id,
            account_id,
            amount,
            balance,
        }.emit();
        Response::Success(balance)
    }

    // === Store Management ===
    pub fn add_store_item(&mut self, family_id: FamilyId, item: StoreItemInput) -> StoreItemActionResponse {
        let ctx = CallContext::from_env();
        let family = match self.load_family(&family_id) {
            Ok(family) => family,
            Err(e) => return Response::Error(e)
        };

        if let Err(e) = family.require_parent(&ctx) {
            return Response::Error(e.into());
        }
        if let Err(e) = family.require_child(&item.assignee) {
            return Response::Error(e.into());
        }

        let item_id = self.id_for("item", 0);
        let item = match StoreItem::new(item_id.clone(), family_id.clone(), item, &ctx) {
            Ok(item) => item,
            Err(e) => return Response::Error(e.into())
        };

        self.consume_ids(1);
        self.store_items.insert(&item_id, &item);
        self.add_to_index(&family_id, &item_id, IndexType::StoreItem);

        ChoreEvent::StoreItemAdded {
            family_id,
            item_id: item_id.clone(),
            cost: item.cost,
        }.emit();
        Response::Success(item_id)
    }

    pub fn get_store_items(&self, family_id: FamilyId, assignee: Option<AccountId>) -> StoreItemListResponse {
        if let Err(e) = self.load_family(&family_id) {
            return Response::Error(e);
        }

        let items: Vec<StoreItem> = self.store_items_per_family
            .get(&family_id)
            .map(|set| {
                set.iter()
                    .filter_map(|id| self.store_items.get(&id))
                    .filter(|item| assignee.as_ref().map_or(true, |a| item.get_assignee_id() == a))
                    .collect()
            })
            .unwrap_or_default();
        Response::Success(items)
    }

    pub fn purchase_store_item(&mut self, item_id: StoreItemId, expected_balance: Option<u32>) -> CoinsResponse {
        let ctx = CallContext::from_env();
        self.apply_purchase(&ctx, item_id, expected_balance).into()
    }

    fn apply_purchase(
        &mut self,
        ctx: &CallContext,
        item_id: StoreItemId,
        expected_balance: Option<u32>,
    ) -> Result<u32, ContractError> {
        let mut item = self.load_store_item(&item_id)?;
        let family_id = item.get_family_id().clone();
        let family = self.load_family(&family_id)?;
        if !item.is_assignee(ctx) || family.member(&ctx.caller).is_none() {
            return Err(AccessError::NotAssignee.into());
        }

        if !item.is_available() {
            return Err(StoreItemStateError::OutOfStock.into());
        }

        let current = self.balance_of(&family_id, &ctx.caller);
        ledger::check_expected(expected_balance, current)?;

        item.take_one()?;
        let balance = ledger::withdraw(current, item.cost).map_err(|e| {
            log!("Purchase of {} refused: {}", item_id, e);
            ContractError::from(e)
        })?;

        self.store_items.insert(&item_id, &item);
        self.set_balance(&family_id, &ctx.caller, balance);

        ChoreEvent::StoreItemPurchased {
            family_id,
            item_id,
            buyer: ctx.caller.clone(),
            cost: item.cost,
            balance,
        }.emit();
        Ok(balance)
    }

    pub fn delete_store_item(&mut self, item_id: StoreItemId) -> StoreItemActionResponse {
        let ctx = CallContext::from_env();
        let item = match self.load_store_item(&item_id) {
            Ok(item) => item,
            Err(e) => return Response::Error(e)
        };
        let family_id = item.get_family_id().clone();
        let family = match self.load_family(&family_id) {
            Ok(family) => family,
            Err(e) => return Response::Error(e)
        };

        if let Err(e) = family.require_parent(&ctx) {
            return Response::Error(e.into());
        }

        self.store_items.remove(&item_id);
        self.remove_from_index(&family_id, &item_id, IndexType::StoreItem);

        ChoreEvent::StoreItemDeleted {
            family_id,
            item_id: item_id.clone(),
        }.emit();
        Response::Success(item_id)
    }
}
