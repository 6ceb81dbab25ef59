use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::Notify;

use crate::waitlist::domain::{ApplicationField, ApplicationRecord};
use crate::waitlist::store::{RecordStore, StoreWriteError};
use crate::waitlist::SubmissionController;

/// Store whose writes block until the test releases them.
pub(super) struct GatedStore {
    calls: AtomicUsize,
    entered: Notify,
    release: Notify,
    result: Mutex<Result<(), StoreWriteError>>,
    records: Mutex<Vec<ApplicationRecord>>,
}

impl GatedStore {
    pub(super) fn accepting() -> Arc<Self> {
        Arc::new(Self::with_result(Ok(())))
    }

    pub(super) fn failing(error: StoreWriteError) -> Arc<Self> {
        Arc::new(Self::with_result(Err(error)))
    }

    fn with_result(result: Result<(), StoreWriteError>) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            entered: Notify::new(),
            release: Notify::new(),
            result: Mutex::new(result),
            records: Mutex::new(Vec::new()),
        }
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub(super) fn records(&self) -> Vec<ApplicationRecord> {
        self.records.lock().expect("records mutex poisoned").clone()
    }

    /// Resolves once a write has reached the store.
    pub(super) async fn wait_for_write(&self) {
        self.entered.notified().await;
    }

    pub(super) fn release(&self) {
        self.release.notify_one();
    }
}

#[async_trait]
impl RecordStore for GatedStore {
    async fn insert(
        &self,
        _collection: &str,
        record: &ApplicationRecord,
    ) -> Result<(), StoreWriteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.records
            .lock()
            .expect("records mutex poisoned")
            .push(record.clone());
        self.entered.notify_one();
        self.release.notified().await;
        self.result.lock().expect("result mutex poisoned").clone()
    }
}

/// Store that answers immediately with a fixed result.
pub(super) struct ImmediateStore {
    calls: AtomicUsize,
    result: Result<(), StoreWriteError>,
}

impl ImmediateStore {
    pub(super) fn accepting() -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            result: Ok(()),
        })
    }

    pub(super) fn failing(error: StoreWriteError) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            result: Err(error),
        })
    }

    pub(super) fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordStore for ImmediateStore {
    async fn insert(
        &self,
        _collection: &str,
        _record: &ApplicationRecord,
    ) -> Result<(), StoreWriteError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.result.clone()
    }
}

pub(super) fn controller(store: Arc<dyn RecordStore>) -> SubmissionController {
    SubmissionController::new(store, "waitlist")
}

pub(super) fn fill_valid(controller: &SubmissionController) {
    let values = [
        (ApplicationField::FirstName, "David"),
        (ApplicationField::LastName, "Adeleke"),
        (ApplicationField::Email, "davidadeleke@example.com"),
        (ApplicationField::WhatsappNumber, "+2348012345678"),
        (ApplicationField::LinkedinUrl, "https://linkedin.com/in/davidadeleke"),
    ];
    for (field, value) in values {
        controller
            .set_field(field, value)
            .expect("fields editable while idle");
    }
}
