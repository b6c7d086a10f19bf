pub mod traits;
pub mod schedule;
pub mod task;
pub mod ledger;
pub mod family;
pub mod store_item;
pub mod config;

pub use config::ContractConfig;

pub use schedule::{Schedule, ScheduleError, Weekday};

pub use task::{TaskTemplate, TaskOccurrence, TaskInstance, TaskId, TaskAction,
    TaskError, TaskValidationError, TaskStateError};

pub use ledger::{LedgerError, Toggled};

pub use family::{Family, Member, Profile, Role,
    FamilyError, FamilyValidationError};

pub use store_item::{StoreItem, StoreItemId, StoreItemInput, ImageSource,
    StoreItemError, StoreItemValidationError, StoreItemStateError};

pub use traits::{Assignable, Storable, StorageError, StorageMetrics,
    AccessError, CallContext, FamilyId, validate_total_storage};
