use schemars::JsonSchema;
use near_sdk::{
    borsh::{self, BorshDeserialize, BorshSerialize},
    serde::{Deserialize, Serialize},
    AccountId};
use thiserror::Error;
use crate::models::traits::{
    contains_control_characters, AccessError, Assignable, CallContext, FamilyId,
    Storable, StorageError, StorageMetrics};
use crate::models::config::{store::*, storage::*};

pub type StoreItemId = String;

// === Error Hierarchy ===
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum StoreItemError {
    #[error("Validation error: {0}")]
    Validation(StoreItemValidationError),
    #[error("Storage error: {0}")]
    Storage(StorageError),
    #[error("Access error: {0}")]
    Access(AccessError),
    #[error("State error: {0}")]
    State(StoreItemStateError),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum StoreItemValidationError {
    #[error("Name error: {reason:?} (length: {current_length})")]
    Name { reason: TextError, current_length: usize },
    #[error("Description error: {reason:?} (length: {current_length})")]
    Description { reason: TextError, current_length: usize },
    #[error("Image error: {reason:?}")]
    Image { reason: ImageError },
    #[error("Stock must be at least 1 when limited")]
    ZeroStock,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub enum TextError {
    Empty,
    TooLong,
    InvalidCharacters,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "near_sdk::serde")]
pub enum ImageError {
    EmptyReference,
    ReferenceTooLong,
    UnsupportedScheme,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Error)]
#[serde(crate = "near_sdk::serde")]
pub enum StoreItemStateError {
    #[error("item is out of stock")]
    OutOfStock,
}

impl From<StoreItemValidationError> for StoreItemError {
    fn from(err: StoreItemValidationError) -> Self {
        StoreItemError::Validation(err)
    }
}

impl From<AccessError> for StoreItemError {
    fn from(err: AccessError) -> Self {
        StoreItemError::Access(err)
    }
}

// === Core Data Structures ===

#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema,
    Debug, Clone, PartialEq)]
#[serde(crate = "near_sdk::serde", tag = "kind", rename_all = "snake_case")]
pub enum ImageSource {
    Upload { reference: String },
    Camera { reference: String },
    Url { url: String },
}

#[derive(Serialize, Deserialize, JsonSchema, Debug, Clone, PartialEq)]
#[serde(crate = "near_sdk::serde")]
pub struct StoreItemInput {
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub cost: u32,
    #[serde(default)]
    pub stock: Option<u32>,
    pub image: ImageSource,
    #[schemars(with = "String")]
    pub assignee: AccountId,
}

#[derive(BorshDeserialize, BorshSerialize, Serialize, Deserialize, JsonSchema,
    Debug, Clone, PartialEq)]
#[serde(crate = "near_sdk::serde")]
pub struct StoreItem {
    pub id: StoreItemId,
    family_id: FamilyId,
    pub name: String,
    pub description: String,
    pub cost: u32,
    // None means unlimited
    pub stock: Option<u32>,
    pub image: ImageSource,
    #[schemars(with = "String")]
    assignee: AccountId,
    #[schemars(with = "String")]
    created_by: AccountId,
    pub created_at: u64,
}

// === Core Implementations ===
impl ImageSource {
    fn validate(&self) -> Result<(), StoreItemValidationError> {
        let reference = match self {
            ImageSource::Upload { reference } | ImageSource::Camera { reference } => reference,
            ImageSource::Url { url } => {
                if !(url.starts_with("https://") || url.starts_with("http://")) {
                    return Err(StoreItemValidationError::Image { reason: ImageError::UnsupportedScheme });
                }
                url
            },
        };
        if reference.trim().is_empty() {
            return Err(StoreItemValidationError::Image { reason: ImageError::EmptyReference });
        }
        if reference.len() > MAX_IMAGE_REFERENCE_LENGTH {
            return Err(StoreItemValidationError::Image { reason: ImageError::ReferenceTooLong });
        }
        Ok(())
    }

    fn len(&self) -> usize {
        match self {
            ImageSource::Upload { reference } | ImageSource::Camera { reference } => reference.len(),
            ImageSource::Url { url } => url.len(),
        }
    }
}

impl StoreItem {
    pub fn new(
        id: StoreItemId,
        family_id: FamilyId,
        input: StoreItemInput,
        ctx: &CallContext,
    ) -> Result<Self, StoreItemError> {
        let name = input.name.trim();
        if name.is_empty() {
            return Err(StoreItemValidationError::Name { reason: TextError::Empty, current_length: 0 }.into());
        }
        if name.len() > MAX_NAME_LENGTH {
            return Err(StoreItemValidationError::Name { reason: TextError::TooLong, current_length: name.len() }.into());
        }
        if contains_control_characters(name) {
            return Err(StoreItemValidationError::Name { reason: TextError::InvalidCharacters, current_length: name.len() }.into());
        }

        let description = input.description.trim();
        if description.len() > MAX_DESCRIPTION_LENGTH {
            return Err(StoreItemValidationError::Description {
                reason: TextError::TooLong,
                current_length: description.len(),
            }.into());
        }
        if contains_control_characters(description) {
            return Err(StoreItemValidationError::Description {
                reason: TextError::InvalidCharacters,
                current_length: description.len(),
            }.into());
        }

        if input.stock == Some(0) {
            return Err(StoreItemValidationError::ZeroStock.into());
        }
        input.image.validate()?;

        let item = Self {
            id,
            family_id,
            name: name.to_string(),
            description: description.to_string(),
            cost: input.cost,
            stock: input.stock,
            image: input.image,
            assignee: input.assignee,
            created_by: ctx.caller.clone(),
            created_at: ctx.now,
        };

        item.validate_storage()
            .map_err(StoreItemError::Storage)?;
        Ok(item)
    }

    pub fn is_available(&self) -> bool {
        self.stock.map_or(true, |left| left > 0)
    }

    pub fn take_one(&mut self) -> Result<(), StoreItemError> {
        match self.stock {
            None => Ok(()),
            Some(0) => Err(StoreItemError::State(StoreItemStateError::OutOfStock)),
            Some(left) => {
                self.stock = Some(left - 1);
                Ok(())
            },
        }
    }
}

impl Assignable for StoreItem {
    fn get_assignee_id(&self) -> &AccountId {
        &self.assignee
    }

    fn get_family_id(&self) -> &FamilyId {
        &self.family_id
    }
}

impl Storable for StoreItem {
    const BASE_STORAGE: u64 = STORE_ITEM_BASE_STORAGE;
    const MAX_STORAGE: u64 = STORE_ITEM_MAX_STORAGE;

    fn calculate_storage_metrics(&self) -> StorageMetrics {
        let dynamic_size =
            self.id.len() as u64 +
            self.family_id.len() as u64 +
            self.name.len() as u64 +
            self.description.len() as u64 +
            self.image.len() as u64 +
            self.assignee.as_str().len() as u64 +
            self.created_by.as_str().len() as u64;

        StorageMetrics::for_size(Self::BASE_STORAGE, dynamic_size)
    }
}
