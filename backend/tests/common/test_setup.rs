use std::sync::Arc;

use axum::{body::Body, http::Request, response::Response, Router};
use backend::{
    mailer::MailNotifier, server, state::AppState, types::Environment,
    upload_recorder::UploadRecorder,
};
use history_storage::InMemoryHistoryStorage;
use tower::ServiceExt;

use super::fakes::{FakeObjectStorage, RecordingMailTransport};
use super::utils::MultipartForm;

pub const TEST_SENDER: &str = "DigitLens <no-reply@digitlens.test>";

/// Initialize tracing for tests
pub fn setup_test_env() {
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .try_init()
        .ok();
}

/// Router wired to in-memory fakes
pub struct TestContext {
    pub router: Router,
    pub mail_transport: Arc<RecordingMailTransport>,
    pub object_storage: Arc<FakeObjectStorage>,
    pub history_storage: Arc<InMemoryHistoryStorage>,
}

impl TestContext {
    pub fn new() -> Self {
        Self::with_fakes(
            RecordingMailTransport::default(),
            FakeObjectStorage::default(),
        )
    }

    pub fn with_fakes(
        mail_transport: RecordingMailTransport,
        object_storage: FakeObjectStorage,
    ) -> Self {
        setup_test_env();

        let mail_transport = Arc::new(mail_transport);
        let object_storage = Arc::new(object_storage);
        let history_storage = Arc::new(InMemoryHistoryStorage::new());

        let mail_notifier = Arc::new(
            MailNotifier::new(mail_transport.clone(), TEST_SENDER).expect("valid test sender"),
        );
        let upload_recorder = Arc::new(UploadRecorder::new(
            object_storage.clone(),
            history_storage.clone(),
        ));

        let environment = Environment::Development {
            aws_endpoint_override: None,
        };
        let router = server::router(
            environment,
            AppState {
                mail_notifier,
                upload_recorder,
                history_storage: history_storage.clone(),
            },
        );

        Self {
            router,
            mail_transport,
            object_storage,
            history_storage,
        }
    }

    pub async fn send_post_request(
        &self,
        route: &str,
        payload: serde_json::Value,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", "application/json")
            .body(Body::from(payload.to_string()))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_raw_post_request(
        &self,
        route: &str,
        content_type: &str,
        body: Vec<u8>,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("POST")
            .header("Content-Type", content_type)
            .body(Body::from(body))?;

        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }

    pub async fn send_multipart_request(
        &self,
        route: &str,
        form: &MultipartForm,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        self.send_raw_post_request(route, &form.content_type(), form.body())
            .await
    }

    pub async fn send_get_request(
        &self,
        route: &str,
    ) -> Result<Response, Box<dyn std::error::Error>> {
        let request = Request::builder()
            .uri(route)
            .method("GET")
            .body(Body::empty())?;
        let response = self.router.clone().oneshot(request).await?;
        Ok(response)
    }
}
