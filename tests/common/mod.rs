//! Shared test infrastructure: scripted mock adapters and submission
//! builders used by the orchestrator and scheduler integration tests.

#![allow(dead_code)] // Not every helper is used by every test binary.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use serde_json::{json, Value};
use tokio::sync::broadcast;
use tokio::sync::Semaphore;
use uuid::Uuid;

use syndicate_core::adapters::{
    AdapterCapabilities, DestinationAdapter, LoginStatus, PostData, PostResponse,
};
use syndicate_core::cancellation::CancellationToken;
use syndicate_core::events::PublishedEvent;
use syndicate_core::models::{Schedule, Submission, SubmissionFile, SubmissionPart};
use syndicate_core::orchestration::{PostError, PostResult};
use syndicate_core::state_machine::PostStatus;
use syndicate_core::store::SubmissionStore;
use syndicate_core::validation::ValidationResult;

/// Scripted destination adapter that records every call.
pub struct MockAdapter {
    destination_id: String,
    capabilities: AdapterCapabilities,
    login: LoginStatus,
    validation: Mutex<ValidationResult>,
    /// Per-call overrides consumed front to back; `Err` fails that call.
    scripted: Mutex<VecDeque<Result<(), String>>>,
    /// When set, every call fails with this message.
    fail_always: Mutex<Option<String>>,
    /// When set, `post()` waits for a permit before its first token check.
    entry_gate: Mutex<Option<Arc<Semaphore>>>,
    /// When set, `post()` waits for a permit after doing its work, before
    /// returning success. Lets tests cancel mid-round-trip.
    exit_gate: Mutex<Option<Arc<Semaphore>>>,
    post_delay: Mutex<Option<Duration>>,
    calls: Mutex<Vec<PostData>>,
    counter: AtomicUsize,
}

impl MockAdapter {
    pub fn new(destination_id: impl Into<String>) -> Self {
        Self {
            destination_id: destination_id.into(),
            capabilities: AdapterCapabilities::default(),
            login: LoginStatus {
                logged_in: true,
                username: Some("tester".into()),
            },
            validation: Mutex::new(ValidationResult::default()),
            scripted: Mutex::new(VecDeque::new()),
            fail_always: Mutex::new(None),
            entry_gate: Mutex::new(None),
            exit_gate: Mutex::new(None),
            post_delay: Mutex::new(None),
            calls: Mutex::new(Vec::new()),
            counter: AtomicUsize::new(0),
        }
    }

    pub fn with_capabilities(mut self, capabilities: AdapterCapabilities) -> Self {
        self.capabilities = capabilities;
        self
    }

    /// The next call fails with `message`; later calls succeed again.
    pub fn script_failure(&self, message: impl Into<String>) {
        self.scripted.lock().push_back(Err(message.into()));
    }

    pub fn fail_always(&self, message: impl Into<String>) {
        *self.fail_always.lock() = Some(message.into());
    }

    pub fn set_validation_problem(&self, message: impl Into<String>) {
        self.validation.lock().problems.push(message.into());
    }

    pub fn set_entry_gate(&self, gate: Arc<Semaphore>) {
        *self.entry_gate.lock() = Some(gate);
    }

    pub fn set_exit_gate(&self, gate: Arc<Semaphore>) {
        *self.exit_gate.lock() = Some(gate);
    }

    pub fn set_post_delay(&self, delay: Duration) {
        *self.post_delay.lock() = Some(delay);
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }

    /// Calls that made it past every token check (work done destination-side).
    pub fn completed_work_count(&self) -> usize {
        self.counter.load(Ordering::SeqCst)
    }

    pub fn calls(&self) -> Vec<PostData> {
        self.calls.lock().clone()
    }
}

#[async_trait]
impl DestinationAdapter for MockAdapter {
    fn destination_id(&self) -> &str {
        &self.destination_id
    }

    fn capabilities(&self) -> AdapterCapabilities {
        self.capabilities
    }

    async fn check_login_status(&self, _account: &str) -> PostResult<LoginStatus> {
        Ok(self.login.clone())
    }

    fn validate(
        &self,
        _submission: &Submission,
        _merged_part: &SubmissionPart,
        _default_part: &SubmissionPart,
    ) -> ValidationResult {
        self.validation.lock().clone()
    }

    async fn post(&self, token: &CancellationToken, data: &PostData) -> PostResult<PostResponse> {
        self.calls.lock().push(data.clone());

        let entry_gate = self.entry_gate.lock().clone();
        if let Some(gate) = entry_gate {
            gate.acquire().await.expect("entry gate closed").forget();
        }

        token.checkpoint()?;

        let delay = *self.post_delay.lock();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
            token.checkpoint()?;
        }

        if let Some(message) = self.fail_always.lock().clone() {
            return Err(PostError::PostFailed {
                destination: self.destination_id.clone(),
                message,
            });
        }

        if let Some(Err(message)) = self.scripted.lock().pop_front() {
            return Err(PostError::PostFailed {
                destination: self.destination_id.clone(),
                message,
            });
        }

        let n = self.counter.fetch_add(1, Ordering::SeqCst) + 1;

        let exit_gate = self.exit_gate.lock().clone();
        if let Some(gate) = exit_gate {
            gate.acquire().await.expect("exit gate closed").forget();
        }

        Ok(PostResponse {
            posted_to: format!("{}:{}", self.destination_id, n),
            destination_response: Some(json!({"ok": true})),
        })
    }
}

/// Builder for test submissions with real destination parts.
pub struct SubmissionBuilder {
    submission: Submission,
}

impl SubmissionBuilder {
    pub fn new(title: &str) -> Self {
        let mut submission = Submission::new(title);
        submission.files.push(SubmissionFile::primary("art.png"));
        Self { submission }
    }

    pub fn with_default_options(mut self, options: Value) -> Self {
        if let Some(default) = self.submission.parts.iter_mut().find(|p| p.is_default) {
            default.options = options;
        }
        self
    }

    pub fn with_part(mut self, destination_id: &str) -> Self {
        self.submission.parts.push(SubmissionPart::new(
            self.submission.submission_uuid,
            destination_id,
        ));
        self
    }

    pub fn with_part_options(mut self, destination_id: &str, options: Value) -> Self {
        self.submission.parts.push(
            SubmissionPart::new(self.submission.submission_uuid, destination_id)
                .with_options(options),
        );
        self
    }

    pub fn scheduled_at(mut self, post_at: chrono::DateTime<chrono::Utc>) -> Self {
        self.submission.schedule = Schedule::at(post_at);
        self
    }

    pub fn build(self) -> Submission {
        self.submission
    }
}

/// Fetch a part's stored status by destination id.
pub async fn stored_part_status(
    store: &dyn SubmissionStore,
    submission_uuid: Uuid,
    destination_id: &str,
) -> PostStatus {
    stored_part(store, submission_uuid, destination_id)
        .await
        .status
}

/// Fetch a part's stored state by destination id.
pub async fn stored_part(
    store: &dyn SubmissionStore,
    submission_uuid: Uuid,
    destination_id: &str,
) -> SubmissionPart {
    let submission = store
        .find(submission_uuid)
        .await
        .expect("store read failed")
        .expect("submission missing");
    submission
        .parts
        .iter()
        .find(|p| p.destination_id == destination_id)
        .expect("part missing")
        .clone()
}

/// Await a named event, skipping others, with a deadline.
pub async fn wait_for_event(
    rx: &mut broadcast::Receiver<PublishedEvent>,
    name: &str,
) -> PublishedEvent {
    tokio::time::timeout(Duration::from_secs(5), async {
        loop {
            match rx.recv().await {
                Ok(event) if event.name == name => return event,
                Ok(_) => {}
                Err(err) => panic!("event channel closed while waiting for '{name}': {err}"),
            }
        }
    })
    .await
    .unwrap_or_else(|_| panic!("timed out waiting for event '{name}'"))
}
