//! Per-(user, book) collection state and transition planning.
//!
//! The primary state is a tagged union: a book is unshelved, owned on a shelf,
//! or neither. Wanted is an orthogonal flag stored on its own row. The planners
//! here are pure; the repository loads a `CollectionState` inside a transaction,
//! asks for a plan and then applies it.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::DomainError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReadingStatus {
    #[default]
    NotRead,
    Reading,
    Completed,
}

impl ReadingStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReadingStatus::NotRead => "NOT_READ",
            ReadingStatus::Reading => "READING",
            ReadingStatus::Completed => "COMPLETED",
        }
    }
}

impl fmt::Display for ReadingStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ReadingStatus {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "NOT_READ" => Ok(ReadingStatus::NotRead),
            "READING" => Ok(ReadingStatus::Reading),
            "COMPLETED" => Ok(ReadingStatus::Completed),
            other => Err(DomainError::Validation(format!(
                "Unknown reading status: {}",
                other
            ))),
        }
    }
}

/// Primary membership of a book for one user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrimaryState {
    None,
    Unshelved {
        entry_id: String,
    },
    Owned {
        entry_id: String,
    },
}

/// Wanted row for one (user, book), if any.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WantedState {
    Absent,
    Active { wanted_id: String },
    Inactive { wanted_id: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CollectionState {
    pub primary: PrimaryState,
    pub wanted: WantedState,
}

/// How `addToWanted` is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WantedPlan {
    Insert,
    Reactivate { wanted_id: String },
}

/// How `purchaseWanted` is applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PurchasePlan {
    /// Book already has a primary state; only the wanted row is deactivated.
    AlreadyOwned,
    AlreadyUnshelved,
    CreateOwned,
    CreateUnshelved,
}

/// `removeFromOwned` modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OwnedRemoval {
    /// Delete only the owned row
    Detach,
    /// Delete the owned row and re-create it as unshelved
    ToUnshelved,
    /// Delete every owned/unshelved/wanted row for the book
    PurgeAll,
}

impl FromStr for OwnedRemoval {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "remove" => Ok(OwnedRemoval::Detach),
            "unshelve" => Ok(OwnedRemoval::ToUnshelved),
            "delete_all" => Ok(OwnedRemoval::PurgeAll),
            other => Err(DomainError::Validation(format!(
                "Unknown delete type: {}",
                other
            ))),
        }
    }
}

impl OwnedRemoval {
    /// Action label reported back to the caller.
    pub fn action(&self) -> &'static str {
        match self {
            OwnedRemoval::Detach => "removed",
            OwnedRemoval::ToUnshelved => "unshelved",
            OwnedRemoval::PurgeAll => "deleted_all",
        }
    }
}

fn already_present(primary: &PrimaryState) -> DomainError {
    match primary {
        PrimaryState::Owned { .. } => {
            DomainError::Conflict("This book is already in your bookshelf".to_string())
        }
        _ => DomainError::Conflict("This book is already in your unshelved list".to_string()),
    }
}

impl CollectionState {
    pub fn empty() -> Self {
        Self {
            primary: PrimaryState::None,
            wanted: WantedState::Absent,
        }
    }

    pub fn has_primary(&self) -> bool {
        !matches!(self.primary, PrimaryState::None)
    }

    /// Both `addToUnshelved` and `addToOwned` require no primary state.
    pub fn plan_add_primary(&self) -> Result<(), DomainError> {
        if self.has_primary() {
            return Err(already_present(&self.primary));
        }
        Ok(())
    }

    pub fn plan_add_to_wanted(&self) -> Result<WantedPlan, DomainError> {
        if self.has_primary() {
            return Err(already_present(&self.primary));
        }
        match &self.wanted {
            WantedState::Absent => Ok(WantedPlan::Insert),
            WantedState::Inactive { wanted_id } => Ok(WantedPlan::Reactivate {
                wanted_id: wanted_id.clone(),
            }),
            WantedState::Active { .. } => Err(DomainError::Conflict(
                "This book is already in your wanted list".to_string(),
            )),
        }
    }

    /// Shelving an unshelved entry. `entry_id` is the unshelved row the caller named.
    pub fn plan_shelve(&self, entry_id: &str) -> Result<(), DomainError> {
        match &self.primary {
            PrimaryState::Unshelved { entry_id: current } if current == entry_id => Ok(()),
            PrimaryState::Owned { .. } => Err(DomainError::Conflict(
                "This book is already in a bookshelf".to_string(),
            )),
            _ => Err(DomainError::not_found("Unshelved book")),
        }
    }

    /// Moving an owned entry back to unshelved. `entry_id` is the owned row.
    pub fn plan_unshelve(&self, entry_id: &str) -> Result<(), DomainError> {
        match &self.primary {
            PrimaryState::Owned { entry_id: current } if current == entry_id => Ok(()),
            _ => Err(DomainError::not_found("Owned book")),
        }
    }

    pub fn plan_purchase(
        &self,
        wanted_id: &str,
        with_shelf: bool,
    ) -> Result<PurchasePlan, DomainError> {
        match &self.wanted {
            WantedState::Active { wanted_id: current } if current == wanted_id => {}
            _ => return Err(DomainError::not_found("Wanted book")),
        }
        Ok(match (&self.primary, with_shelf) {
            (PrimaryState::Owned { .. }, _) => PurchasePlan::AlreadyOwned,
            (PrimaryState::Unshelved { .. }, _) => PurchasePlan::AlreadyUnshelved,
            (PrimaryState::None, true) => PurchasePlan::CreateOwned,
            (PrimaryState::None, false) => PurchasePlan::CreateUnshelved,
        })
    }
}
