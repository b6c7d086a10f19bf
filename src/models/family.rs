use schemars::JsonSchema;
use near_sdk::{
    borsh::{self, BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    AccountId};
use thiserror::Error;
use crate::models::traits::{
    contains_control_characters, AccessError, CallContext, FamilyId,
    Storable, StorageError, StorageMetrics};
use crate::models::config::{family::*, storage::*};

// === Core State Enums ===
#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema,
    Debug, PartialEq, Eq, Clone, Copy)]
#[serde(crate = "near_sdk::serde", rename_all = "snake_case")]
pub enum Role {
    Parent,
    Child,
}

// === Error Hierarchy ===
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum FamilyError {
    #[error("Validation error: {0}")]
    Validation(FamilyValidationError),
    #[error("Storage error: {0}")]
    Storage(StorageError),
    #[error("Access error: {0}")]
    Access(AccessError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum FamilyValidationError {
    #[error("Family name error: {reason:?} (length: {current_length})")]
    Name { reason: NameError, current_length: usize },
    #[error("Display name error: {reason:?} (length: {current_length})")]
    DisplayName { reason: NameError, current_length: usize },
    #[error("{0} is already a member of the family")]
    DuplicateMember(String),
    #[error("Family already has the maximum of {max} members")]
    TooManyMembers { max: usize },
    #[error("{0} is not a member of the family")]
    UnknownMember(String),
    #[error("A family needs at least one parent")]
    LastParent,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub enum NameError {
    Empty,
    TooLong,
    InvalidCharacters,
}

impl From<AccessError> for FamilyError {
    fn from(err: AccessError) -> Self {
        FamilyError::Access(err)
    }
}

impl From<FamilyValidationError> for FamilyError {
    fn from(err: FamilyValidationError) -> Self {
        FamilyError::Validation(err)
    }
}

// === Core Data Structures ===
#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema,
    Debug, Clone, PartialEq)]
#[serde(crate = "near_sdk::serde")]
pub struct Member {
    #[schemars(with = "String")]
    pub account_id: AccountId,
    pub display_name: String,
    pub role: Role,
    pub joined_at: u64,
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(crate = "near_sdk::serde")]
pub struct Profile {
    #[schemars(with = "String")]
    pub account_id: AccountId,
    pub display_name: String,
    pub is_child: bool,
}

#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema,
    Debug, Clone, PartialEq)]
#[serde(crate = "near_sdk::serde")]
pub struct Family {
    pub id: FamilyId,
    pub name: String,
    members: Vec<Member>,
    pub created_at: u64,
}

// === Core Implementations ===
impl Family {
    pub fn new(
        id: FamilyId,
        name: String,
        display_name: String,
        ctx: &CallContext,
    ) -> Result<Self, FamilyError> {
        let name = validate_name(&name, MAX_NAME_LENGTH)
            .map_err(|(reason, current_length)| FamilyValidationError::Name { reason, current_length })?;
        let display_name = validate_name(&display_name, MAX_DISPLAY_NAME_LENGTH)
            .map_err(|(reason, current_length)| FamilyValidationError::DisplayName { reason, current_length })?;

        let family = Self {
            id,
            name,
            members: vec![Member {
                account_id: ctx.caller.clone(),
                display_name,
                role: Role::Parent,
                joined_at: ctx.now,
            }],
            created_at: ctx.now,
        };

        family.validate_storage()
            .map_err(FamilyError::Storage)?;
        Ok(family)
    }

    pub fn add_member(
        &mut self,
        account_id: AccountId,
        display_name: String,
        role: Role,
        ctx: &CallContext,
    ) -> Result<(), FamilyError> {
        self.require_parent(ctx)?;

        if self.member(&account_id).is_some() {
            return Err(FamilyValidationError::DuplicateMember(account_id.to_string()).into());
        }
        if self.members.len() >= MAX_MEMBERS {
            return Err(FamilyValidationError::TooManyMembers { max: MAX_MEMBERS }.into());
        }
        let display_name = validate_name(&display_name, MAX_DISPLAY_NAME_LENGTH)
            .map_err(|(reason, current_length)| FamilyValidationError::DisplayName { reason, current_length })?;

        self.members.push(Member {
            account_id,
            display_name,
            role,
            joined_at: ctx.now,
        });
        self.validate_storage()
            .map_err(FamilyError::Storage)
    }

    pub fn remove_member(&mut self, account_id: &AccountId, ctx: &CallContext) -> Result<Member, FamilyError> {
        self.require_parent(ctx)?;

        let position = self.members
            .iter()
            .position(|m| &m.account_id == account_id)
            .ok_or(FamilyValidationError::UnknownMember(account_id.to_string()))?;
        let parents = self.members.iter().filter(|m| m.role == Role::Parent).count();
        if self.members[position].role == Role::Parent && parents == 1 {
            return Err(FamilyValidationError::LastParent.into());
        }
        Ok(self.members.remove(position))
    }

    pub fn member(&self, account_id: &AccountId) -> Option<&Member> {
        self.members.iter().find(|m| &m.account_id == account_id)
    }

    pub fn is_parent(&self, account_id: &AccountId) -> bool {
        matches!(self.member(account_id), Some(Member { role: Role::Parent, .. }))
    }

    pub fn require_parent(&self, ctx: &CallContext) -> Result<(), AccessError> {
        match self.member(&ctx.caller) {
            Some(Member { role: Role::Parent, .. }) => Ok(()),
            Some(_) => Err(AccessError::NotParent),
            None => Err(AccessError::NotMember),
        }
    }

    pub fn require_child(&self, account_id: &AccountId) -> Result<(), AccessError> {
        match self.member(account_id) {
            Some(Member { role: Role::Child, .. }) => Ok(()),
            _ => Err(AccessError::AssigneeNotChild(account_id.to_string())),
        }
    }

    pub fn child_profiles(&self) -> Vec<Profile> {
        self.members
            .iter()
            .filter(|m| m.role == Role::Child)
            .map(|m| Profile {
                account_id: m.account_id.clone(),
                display_name: m.display_name.clone(),
                is_child: true,
            })
            .collect()
    }
}

fn validate_name(raw: &str, max_length: usize) -> Result<String, (NameError, usize)> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err((NameError::Empty, 0));
    }
    if trimmed.len() > max_length {
        return Err((NameError::TooLong, trimmed.len()));
    }
    if contains_control_characters(trimmed) {
        return Err((NameError::InvalidCharacters, trimmed.len()));
    }
    Ok(trimmed.to_string())
}

impl Storable for Family {
    const BASE_STORAGE: u64 = FAMILY_BASE_STORAGE;
    const MAX_STORAGE: u64 = FAMILY_MAX_STORAGE;

    fn calculate_storage_metrics(&self) -> StorageMetrics {
        let dynamic_size =
            self.id.len() as u64 +
            self.name.len() as u64 +
            self.members.iter()
                .map(|m| m.account_id.as_str().len() as u64 + m.display_name.len() as u64 + 16)
                .sum::<u64>();

        StorageMetrics::for_size(Self::BASE_STORAGE, dynamic_size)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use near_sdk::test_utils::{accounts, VMContextBuilder};
    use near_sdk::testing_env;

    fn family() -> Family {
        testing_env!(VMContextBuilder::new().build());
        Family::new(
            "family-0".to_string(),
            " The Pixels ".to_string(),
            "Mom".to_string(),
            &CallContext::new(accounts(0), 10),
        ).unwrap()
    }

    #[test]
    fn founder_is_parent() {
        let family = family();
        assert_eq!(family.name, "The Pixels");
        assert!(family.is_parent(&accounts(0)));
        assert_eq!(family.members.len(), 1);
        assert!(family.child_profiles().is_empty());
    }

    #[test]
    fn parent_adds_children() {
        let mut family = family();
        let parent = CallContext::new(accounts(0), 20);
        family.add_member(accounts(1), "Adventurer".to_string(), Role::Child, &parent).unwrap();
        family.add_member(accounts(2), "Dad".to_string(), Role::Parent, &parent).unwrap();

        assert_eq!(family.child_profiles(), vec![Profile {
            account_id: accounts(1),
            display_name: "Adventurer".to_string(),
            is_child: true,
        }]);
        assert!(family.require_child(&accounts(1)).is_ok());
        assert_eq!(
            family.require_child(&accounts(2)),
            Err(AccessError::AssigneeNotChild(accounts(2).to_string()))
        );
    }

    #[test]
    fn child_cannot_add_members() {
        let mut family = family();
        family.add_member(accounts(1), "Adventurer".to_string(), Role::Child, &CallContext::new(accounts(0), 0)).unwrap();

        let child = CallContext::new(accounts(1), 0);
        assert_eq!(
            family.add_member(accounts(3), "Friend".to_string(), Role::Child, &child),
            Err(FamilyError::Access(AccessError::NotParent))
        );
        let stranger = CallContext::new(accounts(4), 0);
        assert_eq!(family.require_parent(&stranger), Err(AccessError::NotMember));
    }

    #[test]
    fn duplicate_member_is_rejected() {
        let mut family = family();
        let parent = CallContext::new(accounts(0), 0);
        family.add_member(accounts(1), "Adventurer".to_string(), Role::Child, &parent).unwrap();
        assert_eq!(
            family.add_member(accounts(1), "Again".to_string(), Role::Child, &parent),
            Err(FamilyError::Validation(FamilyValidationError::DuplicateMember(accounts(1).to_string())))
        );
    }

    #[test]
    fn last_parent_cannot_leave() {
        let mut family = family();
        let parent = CallContext::new(accounts(0), 0);
        family.add_member(accounts(1), "Adventurer".to_string(), Role::Child, &parent).unwrap();

        assert_eq!(
            family.remove_member(&accounts(0), &parent),
            Err(FamilyError::Validation(FamilyValidationError::LastParent))
        );
        let removed = family.remove_member(&accounts(1), &parent).unwrap();
        assert_eq!(removed.role, Role::Child);
        assert_eq!(
            family.remove_member(&accounts(1), &parent),
            Err(FamilyError::Validation(FamilyValidationError::UnknownMember(accounts(1).to_string())))
        );
    }

    #[test]
    fn empty_family_name_is_rejected() {
        testing_env!(VMContextBuilder::new().build());
        let result = Family::new(
            "family-0".to_string(), "  ".to_string(), "Mom".to_string(),
            &CallContext::new(accounts(0), 0),
        );
        assert!(matches!(
            result,
            Err(FamilyError::Validation(FamilyValidationError::Name { reason: NameError::Empty, .. }))
        ));
    }
}
