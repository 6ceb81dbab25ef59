use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{header, Client, StatusCode};
use tracing::debug;

use super::domain::ApplicationRecord;

/// Write-only view of the hosted database that keeps the waitlist.
#[async_trait]
pub trait RecordStore: Send + Sync {
    async fn insert(
        &self,
        collection: &str,
        record: &ApplicationRecord,
    ) -> Result<(), StoreWriteError>;
}

/// Failure writing a record; the message is shown to the applicant.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreWriteError {
    #[error("this email is already on the waitlist")]
    Duplicate,
    #[error("waitlist store rejected the application ({status}): {message}")]
    Rejected { status: u16, message: String },
    #[error("could not reach the waitlist store: {0}")]
    Transport(String),
    #[error("waitlist store unavailable: {0}")]
    Unavailable(String),
}

impl From<reqwest::Error> for StoreWriteError {
    fn from(value: reqwest::Error) -> Self {
        StoreWriteError::Transport(value.to_string())
    }
}

/// Process-local store used when no hosted database is configured.
#[derive(Debug, Default, Clone)]
pub struct InMemoryRecordStore {
    records: Arc<Mutex<Vec<(String, ApplicationRecord)>>>,
}

impl InMemoryRecordStore {
    pub fn records(&self, collection: &str) -> Vec<ApplicationRecord> {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .filter(|(name, _)| name == collection)
            .map(|(_, record)| record.clone())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.records
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl RecordStore for InMemoryRecordStore {
    async fn insert(
        &self,
        collection: &str,
        record: &ApplicationRecord,
    ) -> Result<(), StoreWriteError> {
        let mut guard = self
            .records
            .lock()
            .map_err(|_| StoreWriteError::Unavailable("record store lock poisoned".into()))?;

        let duplicate = guard.iter().any(|(name, existing)| {
            name == collection && existing.email.eq_ignore_ascii_case(&record.email)
        });
        if duplicate {
            return Err(StoreWriteError::Duplicate);
        }

        guard.push((collection.to_string(), record.clone()));
        Ok(())
    }
}

/// Hosted PostgREST-style table API (`POST /rest/v1/{collection}`).
#[derive(Debug, Clone)]
pub struct RestRecordStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestRecordStore {
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, StoreWriteError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        })
    }

    pub fn endpoint(&self, collection: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, collection)
    }
}

#[async_trait]
impl RecordStore for RestRecordStore {
    async fn insert(
        &self,
        collection: &str,
        record: &ApplicationRecord,
    ) -> Result<(), StoreWriteError> {
        let url = self.endpoint(collection);
        debug!(%url, "writing waitlist record");

        let response = self
            .client
            .post(&url)
            .header("apikey", &self.api_key)
            .header(header::AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let body = response.text().await.unwrap_or_default();
        Err(rejection(status, &body))
    }
}

fn rejection(status: StatusCode, body: &str) -> StoreWriteError {
    if status == StatusCode::CONFLICT {
        return StoreWriteError::Duplicate;
    }

    let message = serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|value| value.get("message").and_then(|m| m.as_str()).map(str::to_string))
        .unwrap_or_else(|| {
            status
                .canonical_reason()
                .unwrap_or("unexpected response")
                .to_string()
        });

    StoreWriteError::Rejected {
        status: status.as_u16(),
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(email: &str) -> ApplicationRecord {
        ApplicationRecord {
            first_name: "David".into(),
            last_name: "Adeleke".into(),
            email: email.into(),
            whatsapp_number: "+2348000000000".into(),
            linkedin_url: "https://linkedin.com/in/david".into(),
        }
    }

    #[tokio::test]
    async fn in_memory_store_rejects_duplicate_email_per_collection() {
        let store = InMemoryRecordStore::default();
        store
            .insert("waitlist", &record("david@example.com"))
            .await
            .expect("first insert");

        let err = store
            .insert("waitlist", &record("DAVID@example.com"))
            .await
            .expect_err("duplicate rejected");
        assert_eq!(err, StoreWriteError::Duplicate);

        store
            .insert("sponsors", &record("david@example.com"))
            .await
            .expect("other collection accepts");
        assert_eq!(store.records("waitlist").len(), 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn record_serializes_with_table_column_names() {
        let json = serde_json::to_value(record("david@example.com")).expect("serializes");
        assert_eq!(json["whatsapp"], "+2348000000000");
        assert_eq!(json["linkedin"], "https://linkedin.com/in/david");
        assert!(json.get("whatsapp_number").is_none());
    }

    #[test]
    fn rejection_prefers_server_message() {
        let err = rejection(
            StatusCode::BAD_REQUEST,
            r#"{"code":"23502","message":"null value in column \"email\""}"#,
        );
        assert_eq!(
            err,
            StoreWriteError::Rejected {
                status: 400,
                message: "null value in column \"email\"".into(),
            }
        );
        assert_eq!(rejection(StatusCode::CONFLICT, ""), StoreWriteError::Duplicate);
        assert_eq!(
            rejection(StatusCode::SERVICE_UNAVAILABLE, "<html>"),
            StoreWriteError::Rejected {
                status: 503,
                message: "Service Unavailable".into(),
            }
        );
    }

    #[test]
    fn endpoint_trims_trailing_slash() {
        let store = RestRecordStore::new(
            "https://example.supabase.co/",
            "anon-key",
            Duration::from_secs(5),
        )
        .expect("client builds");
        assert_eq!(
            store.endpoint("waitlist"),
            "https://example.supabase.co/rest/v1/waitlist"
        );
    }
}
