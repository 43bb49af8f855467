//! Error types for every component of the desk.
//!
//! Validation outcomes (`SelectionError`, `DropRejection`) are handled next to
//! the gesture that produced them. Store failures propagate to the caller
//! that can show a message.

use thiserror::Error;

use crate::models::{EntityKinds, OrderId, ScheduleId, ScheduleType, StopId};
use crate::selection::EditState;
use crate::views::ViewId;

/// A selection request the target view cannot honour
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SelectionError {
    #[error("{kind:?} cannot be selected in the {view} view")]
    WrongKind { view: ViewId, kind: EntityKinds },

    #[error("selection is locked while {0} is in progress")]
    EditInProgress(EditState),

    #[error("unknown selection participant")]
    UnknownParticipant,
}

/// Why a drag payload may not be dropped on a target
///
/// A rejected drop has no effect; the reason only feeds cursor feedback and logs.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DropRejection {
    #[error("nothing to drop")]
    EmptyPayload,

    #[error("pointer is not over a drop target")]
    NoTarget,

    #[error("no drag in progress")]
    NoDrag,

    #[error("schedule {0} not found")]
    UnknownSchedule(ScheduleId),

    #[error("schedule \"{0}\" is a build routes snapshot")]
    ImmutableSchedule(String),

    #[error("drop target is not part of the schedule")]
    UnknownTarget,

    #[error("order {0} not found")]
    UnknownOrder(OrderId),

    #[error("stop {0} not found")]
    UnknownStop(StopId),

    #[error("route \"{0}\" is locked")]
    LockedRoute(String),

    #[error("order {order} lies outside the hard zones of route \"{route}\"")]
    ZoneViolation { order: OrderId, route: String },

    #[error("order {0} is already assigned")]
    OrderAssigned(OrderId),

    #[error("order {0} is planned for another day")]
    WrongDate(OrderId),

    #[error("stop {0} visits a location and cannot be moved")]
    LocationStop(StopId),

    #[error("orders are already unassigned")]
    AlreadyUnassigned,

    #[error("drop would not change the schedule")]
    NoOp,
}

/// Failure of the persisted-object store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("failed to serialize project: {0}")]
    Serialize(#[from] rmp_serde::encode::Error),

    #[error("failed to parse project: {0}")]
    Deserialize(#[from] rmp_serde::decode::Error),

    #[error("invalid project image: {0}")]
    InvalidImage(String),

    #[error("unsupported project version: {0}")]
    UnsupportedVersion(u32),

    #[error("store rejected the save: {0}")]
    Rejected(String),
}

/// Failure of a schedule version operation
#[derive(Error, Debug)]
pub enum VersionError {
    #[error("no schedule is shown")]
    NothingShown,

    #[error("schedule {0} not found")]
    NotFound(ScheduleId),

    #[error("{kind:?} schedule \"{name}\" cannot be modified")]
    Immutable { name: String, kind: ScheduleType },

    #[error("invalid schedule name: {0:?}")]
    InvalidName(String),

    #[error("saving the schedule failed: {0}")]
    SaveFailure(#[from] StoreError),
}

/// Failure loading or saving user settings
#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("settings file error: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse settings: {0}")]
    Parse(#[from] serde_json::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_selection_error_messages() {
        let err = SelectionError::WrongKind { view: ViewId::Orders, kind: EntityKinds::ROUTES };
        assert!(err.to_string().contains("Orders"));

        let err = SelectionError::EditInProgress(EditState::Geocoding);
        assert_eq!(err.to_string(), "selection is locked while geocoding is in progress");
    }

    #[test]
    fn test_store_error_converts_into_save_failure() {
        let err: VersionError = StoreError::Rejected("disk full".to_string()).into();
        assert!(matches!(err, VersionError::SaveFailure(_)));
        assert_eq!(err.to_string(), "saving the schedule failed: store rejected the save: disk full");
    }
}
