use std::time::Duration;

use async_trait::async_trait;
use axum::body::Bytes;
use backend::{
    mailer::{MailError, MailResult, MailTransport},
    media_storage::{BucketError, BucketResult, ObjectStorage},
};
use lettre::Message;
use tokio::sync::Mutex;

pub const TEST_BUCKET: &str = "digitlens-test-bucket";
pub const TEST_REGION: &str = "us-east-1";

/// Mail transport that records messages instead of sending them
#[derive(Default)]
pub struct RecordingMailTransport {
    pub sent: Mutex<Vec<Message>>,
    pub fail: bool,
    pub stall: Option<Duration>,
}

impl RecordingMailTransport {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub fn stalled(stall: Duration) -> Self {
        Self {
            stall: Some(stall),
            ..Default::default()
        }
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }
}

#[async_trait]
impl MailTransport for RecordingMailTransport {
    async fn deliver(&self, message: Message) -> MailResult<String> {
        if let Some(stall) = self.stall {
            tokio::time::sleep(stall).await;
        }
        self.sent.lock().await.push(message);
        if self.fail {
            return Err(MailError::DeliveryError(
                "535 5.7.8 Authentication failed".to_string(),
            ));
        }
        Ok("2.0.0 Ok: queued as 4Xk2".to_string())
    }

    async fn verify(&self) -> MailResult<()> {
        Ok(())
    }
}

/// An object captured by the fake storage
#[derive(Debug, Clone)]
pub struct StoredObject {
    pub key: String,
    pub body: Bytes,
    pub content_type: String,
}

/// Object storage that keeps uploads in memory and builds S3-style URLs
#[derive(Default)]
pub struct FakeObjectStorage {
    pub objects: Mutex<Vec<StoredObject>>,
    pub fail: bool,
}

impl FakeObjectStorage {
    pub fn failing() -> Self {
        Self {
            fail: true,
            ..Default::default()
        }
    }

    pub async fn put_count(&self) -> usize {
        self.objects.lock().await.len()
    }
}

#[async_trait]
impl ObjectStorage for FakeObjectStorage {
    async fn put_object(&self, key: &str, body: Bytes, content_type: &str) -> BucketResult<()> {
        if self.fail {
            return Err(BucketError::AwsError(
                "dispatch failure: connection refused".to_string(),
            ));
        }
        self.objects.lock().await.push(StoredObject {
            key: key.to_string(),
            body,
            content_type: content_type.to_string(),
        });
        Ok(())
    }

    fn object_url(&self, key: &str) -> String {
        format!("https://{TEST_BUCKET}.s3.{TEST_REGION}.amazonaws.com/{key}")
    }
}
