//! Waitlist application intake: field state, validation, and the single
//! write to the hosted record store.

pub mod controller;
pub mod domain;
pub mod store;
pub mod validation;

#[cfg(test)]
mod tests;

pub use controller::{ControllerError, ControllerSnapshot, SubmissionController, SubmitOutcome};
pub use domain::{
    ApplicationField, ApplicationFields, ApplicationRecord, SubmissionPhase, ValidationErrors,
};
pub use store::{InMemoryRecordStore, RecordStore, RestRecordStore, StoreWriteError};
pub use validation::{is_basic_email, validate};
