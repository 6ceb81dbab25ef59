use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use serde::Serialize;
use tokio::sync::watch;
use tracing::{debug, info, warn};

use super::domain::{
    ApplicationField, ApplicationFields, ApplicationRecord, SubmissionPhase, ValidationErrors,
};
use super::store::{RecordStore, StoreWriteError};
use super::validation::validate;

/// What the presentation layer can render at any moment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ControllerSnapshot {
    pub phase: SubmissionPhase,
    pub fields: ApplicationFields,
    pub errors: ValidationErrors,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<String>,
}

/// Result of a single `submit()` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SubmitOutcome {
    /// The store accepted the record; fields were cleared.
    Succeeded,
    /// The store write failed; fields were kept for a retry.
    Failed(StoreWriteError),
    /// Validation failed before anything was sent.
    Invalid(ValidationErrors),
    /// A submission was already in flight or already accepted.
    Ignored,
    /// `reset()` ran while the write was in flight; its result was dropped.
    Cancelled,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ControllerError {
    #[error("fields cannot be edited while the application is {phase}")]
    Locked { phase: SubmissionPhase },
    #[error("unknown application field '{0}'")]
    UnknownField(String),
}

#[derive(Debug)]
struct ControllerState {
    phase: SubmissionPhase,
    fields: ApplicationFields,
    errors: ValidationErrors,
    failure: Option<String>,
    /// Bumped on every submit and reset so late store results can be matched.
    generation: u64,
}

impl ControllerState {
    fn idle() -> Self {
        Self {
            phase: SubmissionPhase::Idle,
            fields: ApplicationFields::default(),
            errors: ValidationErrors::default(),
            failure: None,
            generation: 0,
        }
    }

    fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            phase: self.phase,
            fields: self.fields.clone(),
            errors: self.errors.clone(),
            failure: self.failure.clone(),
        }
    }
}

/// Drives one waitlist application from field entry to a terminal phase.
///
/// The phase doubles as the in-flight guard: the check and the move to
/// `Submitting` happen under one lock, so overlapping `submit()` calls issue a
/// single store write. The lock is never held across the write itself.
pub struct SubmissionController {
    store: Arc<dyn RecordStore>,
    collection: String,
    state: Mutex<ControllerState>,
    updates: watch::Sender<ControllerSnapshot>,
}

impl SubmissionController {
    pub fn new(store: Arc<dyn RecordStore>, collection: impl Into<String>) -> Self {
        let state = ControllerState::idle();
        let (updates, _) = watch::channel(state.snapshot());
        Self {
            store,
            collection: collection.into(),
            state: Mutex::new(state),
            updates,
        }
    }

    fn lock(&self) -> MutexGuard<'_, ControllerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn publish(&self, state: &ControllerState) {
        self.updates.send_replace(state.snapshot());
    }

    pub fn collection(&self) -> &str {
        &self.collection
    }

    pub fn phase(&self) -> SubmissionPhase {
        self.lock().phase
    }

    pub fn fields(&self) -> ApplicationFields {
        self.lock().fields.clone()
    }

    pub fn snapshot(&self) -> ControllerSnapshot {
        self.lock().snapshot()
    }

    /// Receiver that observes every phase or field change.
    pub fn subscribe(&self) -> watch::Receiver<ControllerSnapshot> {
        self.updates.subscribe()
    }

    pub fn set_field(
        &self,
        field: ApplicationField,
        value: impl Into<String>,
    ) -> Result<(), ControllerError> {
        let mut state = self.lock();
        if !state.phase.is_editable() {
            return Err(ControllerError::Locked { phase: state.phase });
        }

        state.fields.set(field, value);
        self.publish(&state);
        Ok(())
    }

    /// Same as [`set_field`](Self::set_field) but keyed by the form input name.
    pub fn set_field_named(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), ControllerError> {
        let field =
            ApplicationField::parse(name).ok_or_else(|| ControllerError::UnknownField(name.into()))?;
        self.set_field(field, value)
    }

    /// Replaces every field at once, e.g. from a posted form.
    pub fn fill(&self, fields: ApplicationFields) -> Result<(), ControllerError> {
        let mut state = self.lock();
        if !state.phase.is_editable() {
            return Err(ControllerError::Locked { phase: state.phase });
        }

        state.fields = fields;
        self.publish(&state);
        Ok(())
    }

    pub fn validate(&self) -> ValidationErrors {
        let mut state = self.lock();
        let errors = validate(&state.fields);
        state.errors = errors.clone();
        self.publish(&state);
        errors
    }

    pub async fn submit(&self) -> SubmitOutcome {
        let (record, generation) = {
            let mut state = self.lock();
            if !state.phase.is_editable() {
                debug!(phase = %state.phase, "ignoring submit outside an editable phase");
                return SubmitOutcome::Ignored;
            }

            let errors = validate(&state.fields);
            if !errors.is_empty() {
                debug!(%errors, "waitlist application failed validation");
                state.errors = errors.clone();
                self.publish(&state);
                return SubmitOutcome::Invalid(errors);
            }

            state.errors = ValidationErrors::default();
            state.failure = None;
            state.phase = SubmissionPhase::Submitting;
            state.generation += 1;
            self.publish(&state);

            (ApplicationRecord::from_fields(&state.fields), state.generation)
        };

        info!(collection = %self.collection, "submitting waitlist application");
        let mut in_flight = InFlight {
            controller: self,
            generation,
            armed: true,
        };
        let result = self.store.insert(&self.collection, &record).await;
        in_flight.armed = false;

        let mut state = self.lock();
        if state.generation != generation || state.phase != SubmissionPhase::Submitting {
            debug!("controller was reset while the write was in flight");
            return SubmitOutcome::Cancelled;
        }

        let outcome = match result {
            Ok(()) => {
                info!(collection = %self.collection, "joined the waitlist");
                state.phase = SubmissionPhase::Succeeded;
                state.fields = ApplicationFields::default();
                SubmitOutcome::Succeeded
            }
            Err(err) => {
                warn!(error = %err, "failed to join the waitlist");
                state.phase = SubmissionPhase::Failed;
                state.failure = Some(err.to_string());
                SubmitOutcome::Failed(err)
            }
        };
        self.publish(&state);
        outcome
    }

    /// `Failed -> Idle`, keeping what the user typed.
    pub fn retry(&self) -> bool {
        let mut state = self.lock();
        if state.phase != SubmissionPhase::Failed {
            return false;
        }

        state.phase = SubmissionPhase::Idle;
        state.failure = None;
        self.publish(&state);
        true
    }

    /// `Succeeded -> Idle`; the fields are already empty at this point.
    pub fn dismiss(&self) -> bool {
        let mut state = self.lock();
        if state.phase != SubmissionPhase::Succeeded {
            return false;
        }

        state.phase = SubmissionPhase::Idle;
        self.publish(&state);
        true
    }

    /// Waits `delay`, then dismisses the success screen if it still belongs
    /// to the submission that was showing when this was called.
    pub async fn dismiss_success_after(&self, delay: Duration) -> bool {
        let armed_for = {
            let state = self.lock();
            if state.phase != SubmissionPhase::Succeeded {
                return false;
            }
            state.generation
        };

        tokio::time::sleep(delay).await;

        let mut state = self.lock();
        if state.phase != SubmissionPhase::Succeeded || state.generation != armed_for {
            return false;
        }

        state.phase = SubmissionPhase::Idle;
        self.publish(&state);
        true
    }

    /// Back to an empty `Idle` form from any phase.
    pub fn reset(&self) {
        let mut state = self.lock();
        let generation = state.generation + 1;
        *state = ControllerState::idle();
        state.generation = generation;
        self.publish(&state);
    }
}

/// Moves an abandoned write to `Failed` when the `submit()` future is dropped
/// mid-write, so the form does not stay locked in `Submitting`.
struct InFlight<'a> {
    controller: &'a SubmissionController,
    generation: u64,
    armed: bool,
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }

        let mut state = self.controller.lock();
        if state.generation != self.generation || state.phase != SubmissionPhase::Submitting {
            return;
        }

        warn!("waitlist submission was abandoned before the store answered");
        state.phase = SubmissionPhase::Failed;
        state.failure = Some(INTERRUPTED.to_string());
        self.controller.publish(&state);
    }
}

const INTERRUPTED: &str = "submission interrupted before the waitlist store answered";

impl std::fmt::Debug for SubmissionController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SubmissionController")
            .field("collection", &self.collection)
            .field("state", &*self.lock())
            .finish()
    }
}
