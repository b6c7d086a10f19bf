use chrono::NaiveDate;
use schemars::JsonSchema;
use near_sdk::{
    borsh::{self, BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    AccountId};
use thiserror::Error;
use crate::models::traits::{
    contains_control_characters, AccessError, Assignable, CallContext, FamilyId,
    Storable, StorageError, StorageMetrics};
use crate::models::schedule::{Schedule, ScheduleError};
use crate::models::config::{task::*, storage::*, ContractConfig};

pub type TaskId = String;

// === Core State and Action Enums ===
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub enum TaskAction {
    Toggle,
    Delete,
}

// === Error Hierarchy ===
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum TaskError {
    #[error("Validation error: {0}")]
    Validation(TaskValidationError),
    #[error("Schedule error: {0}")]
    Schedule(ScheduleError),
    #[error("Storage error: {0}")]
    Storage(StorageError),
    #[error("Access error: {0}")]
    Access(AccessError),
    #[error("State error: {0}")]
    State(TaskStateError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum TaskValidationError {
    #[error("Title validation error: {reason:?} (length: {current_length})")]
    Title {
        reason: TitleError,
        current_length: usize,
    },
    #[error("Description validation error: {reason:?} (length: {current_length})")]
    Description {
        reason: DescriptionError,
        current_length: usize,
    },
    #[error("Reward validation error: {provided_reward} exceeds the maximum of {max_reward}")]
    Reward {
        provided_reward: u32,
        max_reward: u32,
    },
    #[error("Schedule produces {count} occurrences, at most {max} allowed")]
    TooManyOccurrences {
        count: usize,
        max: u32,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub enum TitleError {
    Empty,
    TooLong,
    InvalidCharacters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub enum DescriptionError {
    TooLong,
    InvalidCharacters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum TaskStateError {
    #[error("action {action:?} not allowed while completed = {completed}")]
    InvalidActionForState { completed: bool, action: TaskAction },
}

// === Core Data Structures ===

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, JsonSchema)]
#[serde(crate = "near_sdk::serde")]
pub struct TaskTemplate {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub reward: u32,
    #[schemars(with = "String")]
    pub assignee: AccountId,
    pub schedule: Schedule,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TaskOccurrence {
    pub date: NaiveDate,
    pub title: String,
    pub description: Option<String>,
    pub reward: u32,
    pub assignee: AccountId,
}

#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, Clone, Debug,
    PartialEq, JsonSchema)]
#[serde(crate = "near_sdk::serde")]
pub struct TaskInstance {
    pub id: TaskId,
    family_id: FamilyId,
    #[schemars(with = "String")]
    assignee: AccountId,
    #[schemars(with = "String")]
    created_by: AccountId,
    pub title: String,
    pub description: Option<String>,
    pub reward: u32,
    // YYYY-MM-DD
    pub task_date: String,
    pub completed: bool,
    pub completed_at: Option<u64>,
    pub created_at: u64,
}

// === Core Implementations ===
impl TaskTemplate {
    pub fn validate(&mut self, config: &ContractConfig) -> Result<(), TaskError> {
        self.validate_title()
            .map_err(TaskError::Validation)?;
        self.validate_description()
            .map_err(TaskError::Validation)?;
        if self.reward > config.max_task_reward {
            return Err(TaskError::Validation(TaskValidationError::Reward {
                provided_reward: self.reward,
                max_reward: config.max_task_reward,
            }));
        }
        Ok(())
    }

    pub fn occurrences(&mut self, config: &ContractConfig) -> Result<Vec<TaskOccurrence>, TaskError> {
        self.validate(config)?;

        let dates = self.schedule
            .expand(config.max_schedule_span_days)
            .map_err(TaskError::Schedule)?;
        if dates.len() > config.max_occurrences_per_template as usize {
            return Err(TaskError::Validation(TaskValidationError::TooManyOccurrences {
                count: dates.len(),
                max: config.max_occurrences_per_template,
            }));
        }

        Ok(dates
            .into_iter()
            .map(|date| TaskOccurrence {
                date,
                title: self.title.clone(),
                description: self.description.clone(),
                reward: self.reward,
                assignee: self.assignee.clone(),
            })
            .collect())
    }

    fn validate_title(&mut self) -> Result<(), TaskValidationError> {
        let trimmed = self.title.trim();
        if trimmed.is_empty() {
            return Err(TaskValidationError::Title {
                reason: TitleError::Empty,
                current_length: 0,
            });
        }
        if trimmed.len() > MAX_TITLE_LENGTH {
            return Err(TaskValidationError::Title {
                reason: TitleError::TooLong,
                current_length: trimmed.len(),
            });
        }
        if contains_control_characters(trimmed) {
            return Err(TaskValidationError::Title {
                reason: TitleError::InvalidCharacters,
                current_length: trimmed.len(),
            });
        }
        self.title = trimmed.to_string();
        Ok(())
    }

    fn validate_description(&mut self) -> Result<(), TaskValidationError> {
        let Some(description) = self.description.as_deref() else {
            return Ok(());
        };
        let trimmed = description.trim();
        if trimmed.len() > MAX_DESCRIPTION_LENGTH {
            return Err(TaskValidationError::Description {
                reason: DescriptionError::TooLong,
                current_length: trimmed.len(),
            });
        }
        if contains_control_characters(trimmed) {
            return Err(TaskValidationError::Description {
                reason: DescriptionError::InvalidCharacters,
                current_length: trimmed.len(),
            });
        }
        self.description = if trimmed.is_empty() {
            None
        } else {
            Some(trimmed.to_string())
        };
        Ok(())
    }
}

impl TaskInstance {
    pub fn from_occurrence(
        id: TaskId,
        family_id: FamilyId,
        occurrence: TaskOccurrence,
        ctx: &CallContext,
    ) -> Result<Self, TaskError> {
        let instance = Self {
            id,
            family_id,
            assignee: occurrence.assignee,
            created_by: ctx.caller.clone(),
            title: occurrence.title,
            description: occurrence.description,
            reward: occurrence.reward,
            task_date: occurrence.date.to_string(),
            completed: false,
            completed_at: None,
            created_at: ctx.now,
        };

        instance.validate_storage()
            .map_err(TaskError::Storage)?;
        Ok(instance)
    }

    pub(crate) fn set_completion(&mut self, completed: bool, completed_at: Option<u64>) {
        self.completed = completed;
        self.completed_at = completed_at;
    }

    pub fn validate_state_for_action(&self, action: TaskAction) -> Result<(), TaskStateError> {
        match (self.completed, action) {
            (true, TaskAction::Delete) => Err(TaskStateError::InvalidActionForState {
                completed: self.completed,
                action,
            }),
            _ => Ok(()),
        }
    }
}

impl Assignable for TaskInstance {
    fn get_assignee_id(&self) -> &AccountId {
        &self.assignee
    }

    fn get_family_id(&self) -> &FamilyId {
        &self.family_id
    }
}

impl Storable for TaskInstance {
    const BASE_STORAGE: u64 = TASK_BASE_STORAGE;
    const MAX_STORAGE: u64 = TASK_MAX_STORAGE;

    fn calculate_storage_metrics(&self) -> StorageMetrics {
        let dynamic_size =
            self.id.len() as u64 +
            self.family_id.len() as u64 +
            self.assignee.as_str().len() as u64 +
            self.created_by.as_str().len() as u64 +
            self.title.len() as u64 +
            self.description.as_ref().map_or(0, |d| d.len() as u64) +
            self.task_date.len() as u64;

        StorageMetrics::for_size(Self::BASE_STORAGE, dynamic_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use near_sdk::test_utils::{accounts, VMContextBuilder};
    use near_sdk::testing_env;

    fn template(schedule: Schedule) -> TaskTemplate {
        TaskTemplate {
            title: "  Brush teeth  ".to_string(),
            description: Some("Two full minutes.".to_string()),
            reward: 5,
            assignee: accounts(1),
            schedule,
        }
    }

    fn date(s: &str) -> NaiveDate {
        s.parse().unwrap()
    }

    #[test]
    fn occurrences_copy_template_fields() {
        let mut t = template(Schedule::Daily { start: date("2025-01-01"), end: Some(date("2025-01-03")) });
        let occurrences = t.occurrences(&ContractConfig::default()).unwrap();

        assert_eq!(occurrences.len(), 3);
        for (occurrence, day) in occurrences.iter().zip(["2025-01-01", "2025-01-02", "2025-01-03"]) {
            assert_eq!(occurrence.date, date(day));
            assert_eq!(occurrence.title, "Brush teeth");
            assert_eq!(occurrence.description.as_deref(), Some("Two full minutes."));
            assert_eq!(occurrence.reward, 5);
            assert_eq!(occurrence.assignee, accounts(1));
        }
    }

    #[test]
    fn blank_title_is_rejected_before_expansion() {
        let mut t = template(Schedule::ExplicitDates { dates: vec![] });
        t.title = "   ".to_string();
        let err = t.occurrences(&ContractConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            TaskError::Validation(TaskValidationError::Title { reason: TitleError::Empty, .. })
        ));
    }

    #[test]
    fn control_characters_are_rejected() {
        let mut t = template(Schedule::Once { date: date("2025-01-01") });
        t.title = "Feed\u{7}the cat".to_string();
        assert!(matches!(
            t.validate(&ContractConfig::default()),
            Err(TaskError::Validation(TaskValidationError::Title { reason: TitleError::InvalidCharacters, .. }))
        ));

        let mut t = template(Schedule::Once { date: date("2025-01-01") });
        t.description = Some("line one\nline two\u{1b}".to_string());
        assert!(matches!(
            t.validate(&ContractConfig::default()),
            Err(TaskError::Validation(TaskValidationError::Description { reason: DescriptionError::InvalidCharacters, .. }))
        ));
    }

    #[test]
    fn blank_description_becomes_none() {
        let mut t = template(Schedule::Once { date: date("2025-01-01") });
        t.description = Some("   ".to_string());
        t.validate(&ContractConfig::default()).unwrap();
        assert_eq!(t.description, None);
    }

    #[test]
    fn reward_above_limit_is_rejected() {
        let config = ContractConfig { max_task_reward: 100, ..ContractConfig::default() };
        let mut t = template(Schedule::Once { date: date("2025-01-01") });
        t.reward = 101;
        assert_eq!(
            t.validate(&config),
            Err(TaskError::Validation(TaskValidationError::Reward { provided_reward: 101, max_reward: 100 }))
        );
    }

    #[test]
    fn empty_expansion_surfaces_schedule_error() {
        let mut t = template(Schedule::ExplicitDates { dates: vec![] });
        assert_eq!(
            t.occurrences(&ContractConfig::default()),
            Err(TaskError::Schedule(ScheduleError::NoValidDates))
        );
    }

    #[test]
    fn occurrence_count_is_bounded() {
        let config = ContractConfig { max_occurrences_per_template: 2, ..ContractConfig::default() };
        let mut t = template(Schedule::Daily { start: date("2025-01-01"), end: Some(date("2025-01-03")) });
        assert_eq!(
            t.occurrences(&config),
            Err(TaskError::Validation(TaskValidationError::TooManyOccurrences { count: 3, max: 2 }))
        );
    }

    #[test]
    fn instance_starts_incomplete() {
        testing_env!(VMContextBuilder::new().build());
        let ctx = CallContext::new(accounts(0), 42);
        let mut t = template(Schedule::Once { date: date("2025-08-05") });
        let occurrence = t.occurrences(&ContractConfig::default()).unwrap().remove(0);

        let instance = TaskInstance::from_occurrence(
            "task-1".to_string(), "family-1".to_string(), occurrence, &ctx,
        ).unwrap();

        assert_eq!(instance.task_date, "2025-08-05");
        assert!(!instance.completed);
        assert_eq!(instance.completed_at, None);
        assert_eq!(instance.created_at, 42);
        assert_eq!(instance.created_by, accounts(0));
        assert_eq!(instance.get_assignee_id(), &accounts(1));
        assert!(instance.validate_state_for_action(TaskAction::Delete).is_ok());
    }

    #[test]
    fn completed_instance_cannot_be_deleted() {
        testing_env!(VMContextBuilder::new().build());
        let ctx = CallContext::new(accounts(0), 0);
        let mut t = template(Schedule::Once { date: date("2025-08-05") });
        let occurrence = t.occurrences(&ContractConfig::default()).unwrap().remove(0);
        let mut instance = TaskInstance::from_occurrence(
            "task-1".to_string(), "family-1".to_string(), occurrence, &ctx,
        ).unwrap();

        instance.set_completion(true, Some(7));
        assert_eq!(
            instance.validate_state_for_action(TaskAction::Delete),
            Err(TaskStateError::InvalidActionForState { completed: true, action: TaskAction::Delete })
        );
        assert!(instance.validate_state_for_action(TaskAction::Toggle).is_ok());
    }
}
