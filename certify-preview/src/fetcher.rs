//! Authenticated preview fetcher
//!
//! One fetcher backs one preview surface. It owns a single slot holding the
//! live [`PreviewResource`], the ref it belongs to and the attempt state.
//! Every `load` bumps a generation counter; results arriving for an older
//! generation are discarded without ever being registered.

use crate::attempt::AttemptState;
use crate::classification::ClassifierPolicy;
use crate::config::PreviewConfig;
use crate::error::{FailureKind, FetchError};
use crate::models::{CertificateRef, Role};
use crate::resource::{PreviewHandle, PreviewResource, ResourceRegistry};
use crate::scheduler::{Scheduler, TokioScheduler};
use crate::session::CredentialProvider;
use crate::transport::{BlobRequest, BlobResponse, BlobTransport, HttpTransport};
use bytes::Bytes;
use error_common::ErrorContext;
use logger_redacted::{redacted_error, redacted_warn};
use parking_lot::Mutex;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;

/// Invoked once per terminal failure
pub type ErrorCallback = Arc<dyn Fn(&PreviewFailure) + Send + Sync>;

/// Terminal failure of a `load`
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PreviewFailure {
    pub certificate_id: String,
    pub role: Role,
    pub attempts: u32,
    pub cause: FetchError,
}

impl PreviewFailure {
    pub fn kind(&self) -> FailureKind {
        self.cause.kind()
    }

    pub fn context(&self) -> ErrorContext {
        ErrorContext::new()
            .with_certificate_id(self.certificate_id.clone())
            .with_role(self.role.as_str())
            .with_attempts(self.attempts)
            .add_context("failure_kind", self.kind().to_string())
    }
}

impl fmt::Display for PreviewFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "certificate {} ({}) failed after {} attempt(s): {}",
            self.certificate_id, self.role, self.attempts, self.cause
        )
    }
}

#[derive(Debug)]
pub enum LoadOutcome {
    Ready(PreviewHandle),
    Failed(PreviewFailure),
    /// A newer `load` or a `teardown` took over; nothing was exposed
    Superseded,
}

impl LoadOutcome {
    pub fn is_ready(&self) -> bool {
        matches!(self, LoadOutcome::Ready(_))
    }

    pub fn handle(&self) -> Option<&PreviewHandle> {
        match self {
            LoadOutcome::Ready(handle) => Some(handle),
            _ => None,
        }
    }

    pub fn failure(&self) -> Option<&PreviewFailure> {
        match self {
            LoadOutcome::Failed(failure) => Some(failure),
            _ => None,
        }
    }
}

/// Result of a one-shot download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedFile {
    pub file_name: String,
    pub content_type: Option<String>,
    pub bytes: Bytes,
}

#[derive(Default)]
struct Slot {
    generation: u64,
    current: Option<CertificateRef>,
    state: AttemptState,
    resource: Option<PreviewResource>,
}

pub struct PreviewFetcher {
    transport: Arc<dyn BlobTransport>,
    credentials: Arc<dyn CredentialProvider>,
    scheduler: Arc<dyn Scheduler>,
    registry: ResourceRegistry,
    config: PreviewConfig,
    policy: ClassifierPolicy,
    slot: Mutex<Slot>,
    on_error: Option<ErrorCallback>,
}

impl PreviewFetcher {
    pub fn new(
        transport: Arc<dyn BlobTransport>,
        credentials: Arc<dyn CredentialProvider>,
        config: PreviewConfig,
    ) -> Self {
        Self {
            transport,
            credentials,
            scheduler: Arc::new(TokioScheduler),
            registry: ResourceRegistry::new(),
            policy: config.classifier_policy(),
            config,
            slot: Mutex::new(Slot::default()),
            on_error: None,
        }
    }

    /// Fetcher talking to `config.server_url` over HTTP
    pub fn http(config: PreviewConfig, credentials: Arc<dyn CredentialProvider>) -> Result<Self, FetchError> {
        let transport = HttpTransport::new(&config)?;
        Ok(Self::new(Arc::new(transport), credentials, config))
    }

    pub fn with_scheduler(mut self, scheduler: Arc<dyn Scheduler>) -> Self {
        self.scheduler = scheduler;
        self
    }

    pub fn with_registry(mut self, registry: ResourceRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_classifier_policy(mut self, policy: ClassifierPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn on_error<F>(mut self, callback: F) -> Self
    where
        F: Fn(&PreviewFailure) + Send + Sync + 'static,
    {
        self.on_error = Some(Arc::new(callback));
        self
    }

    pub fn registry(&self) -> &ResourceRegistry {
        &self.registry
    }

    pub fn config(&self) -> &PreviewConfig {
        &self.config
    }

    pub fn state(&self) -> AttemptState {
        self.slot.lock().state.clone()
    }

    /// Ref of the most recent `load`, until `teardown`
    pub fn current_ref(&self) -> Option<CertificateRef> {
        self.slot.lock().current.clone()
    }

    pub fn current(&self) -> Option<PreviewHandle> {
        self.slot.lock().resource.as_ref().map(PreviewResource::handle)
    }

    /// Move the live resource out of the slot; the caller now owns its release
    pub fn take_current(&self) -> Option<PreviewResource> {
        self.slot.lock().resource.take()
    }

    /// Supersede any in-flight load and release the live resource
    pub fn teardown(&self) {
        let released = {
            let mut slot = self.slot.lock();
            slot.generation += 1;
            slot.current = None;
            slot.state = AttemptState::Idle;
            slot.resource.take()
        };
        if let Some(resource) = released {
            resource.release();
        }
        tracing::debug!("Preview fetcher torn down");
    }

    /// Fetch, classify and install the preview for `certificate`
    pub async fn load(&self, certificate: CertificateRef) -> LoadOutcome {
        let generation = self.begin(&certificate);

        if certificate.id.trim().is_empty() {
            let state = AttemptState::Failed {
                attempts: 0,
                cause: FetchError::MissingId,
            };
            return self.settle_failure(generation, &certificate, state);
        }

        let mut state = AttemptState::start();
        loop {
            if !self.transition(generation, &state) {
                return LoadOutcome::Superseded;
            }

            let attempt = state.attempts();
            tracing::debug!(
                certificate_id = %certificate.id,
                role = %certificate.role,
                attempt,
                "Fetching certificate preview"
            );

            let result = self.attempt(&certificate).await;
            if !self.is_current(generation) {
                tracing::debug!(certificate_id = %certificate.id, "Discarding superseded preview response");
                return LoadOutcome::Superseded;
            }

            let error = match result {
                Ok(response) => return self.install(generation, &certificate, response, &state),
                Err(error) => error,
            };

            let next = state.on_failure(error.clone(), self.config.retry_cap);
            if next.is_terminal() {
                return self.settle_failure(generation, &certificate, next);
            }

            redacted_warn!(
                "Preview attempt {} for certificate {} failed, retrying in {:?}: {}",
                attempt,
                certificate.id,
                self.config.retry_delay(),
                error
            );
            if !self.transition(generation, &next) {
                return LoadOutcome::Superseded;
            }

            self.scheduler.sleep(self.config.retry_delay()).await;
            if !self.is_current(generation) {
                return LoadOutcome::Superseded;
            }
            state = next.on_retry_elapsed();
        }
    }

    /// Fetch the original file once; the slot is left untouched
    pub async fn download(&self, certificate: &CertificateRef) -> Result<DownloadedFile, FetchError> {
        if certificate.id.trim().is_empty() {
            return Err(FetchError::MissingId);
        }

        let token = self.credentials.bearer_token()?;
        let response = self.send(BlobRequest::download(certificate, token)).await?;

        let file_name = response
            .file_name
            .or_else(|| certificate.file_name.clone().filter(|n| !n.trim().is_empty()))
            .unwrap_or_else(|| format!("certificate-{}", certificate.id));

        tracing::info!(
            certificate_id = %certificate.id,
            file_name = %file_name,
            bytes = response.body.len(),
            "Certificate downloaded"
        );

        Ok(DownloadedFile {
            file_name,
            content_type: response.content_type.or_else(|| certificate.mime_type.clone()),
            bytes: response.body,
        })
    }

    fn begin(&self, certificate: &CertificateRef) -> u64 {
        let (generation, released) = {
            let mut slot = self.slot.lock();
            slot.generation += 1;
            let changed = slot
                .current
                .as_ref()
                .map_or(true, |current| !current.same_target(certificate));
            let released = if changed { slot.resource.take() } else { None };
            slot.current = Some(certificate.clone());
            slot.state = AttemptState::Idle;
            (slot.generation, released)
        };
        if let Some(resource) = released {
            resource.release();
        }
        generation
    }

    fn is_current(&self, generation: u64) -> bool {
        self.slot.lock().generation == generation
    }

    /// Record `state` if `generation` still owns the slot
    fn transition(&self, generation: u64, state: &AttemptState) -> bool {
        let mut slot = self.slot.lock();
        if slot.generation != generation {
            return false;
        }
        slot.state = state.clone();
        true
    }

    async fn attempt(&self, certificate: &CertificateRef) -> Result<BlobResponse, FetchError> {
        let token = self.credentials.bearer_token()?;
        self.send(BlobRequest::view(certificate, token)).await
    }

    async fn send(&self, request: BlobRequest) -> Result<BlobResponse, FetchError> {
        let timeout = self.config.request_timeout();
        let response = tokio::time::timeout(timeout, self.transport.fetch(request))
            .await
            .map_err(|_| FetchError::Timeout(timeout))??;

        if response.body.is_empty() {
            return Err(FetchError::EmptyBody);
        }
        Ok(response)
    }

    fn install(
        &self,
        generation: u64,
        certificate: &CertificateRef,
        response: BlobResponse,
        state: &AttemptState,
    ) -> LoadOutcome {
        let declared = certificate
            .mime_type
            .as_deref()
            .filter(|mime| !mime.trim().is_empty());
        let kind = self.policy.classify(
            declared.or(response.content_type.as_deref()),
            certificate.file_name.as_deref().or(response.file_name.as_deref()),
        );
        let content_type = response.content_type.or_else(|| declared.map(str::to_string));

        let mut slot = self.slot.lock();
        if slot.generation != generation {
            return LoadOutcome::Superseded;
        }
        if let Some(previous) = slot.resource.take() {
            previous.release();
        }

        let resource = self.registry.create(response.body, content_type, kind);
        let handle = resource.handle();
        slot.resource = Some(resource);
        slot.state = state.on_success();
        drop(slot);

        tracing::info!(
            certificate_id = %certificate.id,
            kind = ?kind,
            bytes = handle.size,
            attempts = state.attempts(),
            "Certificate preview ready"
        );
        LoadOutcome::Ready(handle)
    }

    fn settle_failure(&self, generation: u64, certificate: &CertificateRef, state: AttemptState) -> LoadOutcome {
        let AttemptState::Failed { attempts, cause } = state.clone() else {
            return LoadOutcome::Superseded;
        };

        let stale = {
            let mut slot = self.slot.lock();
            if slot.generation != generation {
                return LoadOutcome::Superseded;
            }
            slot.state = state;
            slot.resource.take()
        };
        if let Some(resource) = stale {
            resource.release();
        }

        let failure = PreviewFailure {
            certificate_id: certificate.id.clone(),
            role: certificate.role,
            attempts,
            cause,
        };

        redacted_error!(
            "Certificate preview failed [{}] {}",
            failure.cause.code(),
            failure
        );

        if let Some(callback) = &self.on_error {
            callback(&failure);
        }
        LoadOutcome::Failed(failure)
    }
}

impl fmt::Debug for PreviewFetcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot.lock();
        f.debug_struct("PreviewFetcher")
            .field("generation", &slot.generation)
            .field("current", &slot.current)
            .field("state", &slot.state)
            .field("config", &self.config)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classification::PreviewKind;
    use crate::scheduler::RecordingScheduler;
    use crate::session::StaticToken;
    use async_trait::async_trait;
    use std::collections::VecDeque;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;
    use tokio::sync::Notify;

    #[derive(Default)]
    struct FakeTransport {
        script: Mutex<VecDeque<Result<BlobResponse, FetchError>>>,
        paths: Mutex<Vec<String>>,
        gate_first: Option<(Arc<Notify>, Arc<Notify>)>,
    }

    impl FakeTransport {
        fn scripted(script: Vec<Result<BlobResponse, FetchError>>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                ..Default::default()
            }
        }

        /// First call signals `entered` and waits for `release`
        fn gated(script: Vec<Result<BlobResponse, FetchError>>, entered: Arc<Notify>, release: Arc<Notify>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                gate_first: Some((entered, release)),
                ..Default::default()
            }
        }

        fn calls(&self) -> usize {
            self.paths.lock().len()
        }
    }

    #[async_trait]
    impl BlobTransport for FakeTransport {
        async fn fetch(&self, request: BlobRequest) -> Result<BlobResponse, FetchError> {
            let first = {
                let mut paths = self.paths.lock();
                paths.push(request.path());
                paths.len() == 1
            };
            if first {
                if let Some((entered, release)) = &self.gate_first {
                    entered.notify_one();
                    release.notified().await;
                }
            }
            self.script
                .lock()
                .pop_front()
                .unwrap_or_else(|| Err(FetchError::Network("script exhausted".into())))
        }
    }

    fn png() -> Result<BlobResponse, FetchError> {
        Ok(BlobResponse::new(&b"\x89PNG\r\n"[..]).with_content_type("image/png"))
    }

    fn cert(id: &str) -> CertificateRef {
        CertificateRef::new(id, Role::Staff)
            .with_mime_type("image/png")
            .with_file_name("cert.png")
    }

    fn fetcher(transport: Arc<FakeTransport>, scheduler: Arc<RecordingScheduler>) -> PreviewFetcher {
        PreviewFetcher::new(transport, Arc::new(StaticToken::new("tok")), PreviewConfig::default())
            .with_scheduler(scheduler)
    }

    fn counting_fetcher(
        transport: Arc<FakeTransport>,
        scheduler: Arc<RecordingScheduler>,
    ) -> (PreviewFetcher, Arc<AtomicUsize>) {
        let count = Arc::new(AtomicUsize::new(0));
        let seen = count.clone();
        let fetcher = fetcher(transport, scheduler).on_error(move |_| {
            seen.fetch_add(1, Ordering::SeqCst);
        });
        (fetcher, count)
    }

    #[tokio::test]
    async fn test_success_creates_one_resource() {
        let transport = Arc::new(FakeTransport::scripted(vec![png()]));
        let scheduler = Arc::new(RecordingScheduler::new());
        let fetcher = fetcher(transport.clone(), scheduler.clone());

        let outcome = fetcher.load(cert("c1")).await;

        let handle = outcome.handle().cloned().unwrap();
        assert_eq!(handle.kind, PreviewKind::Image);
        assert_eq!(fetcher.current(), Some(handle.clone()));
        assert!(fetcher.registry().is_live(&handle.url));
        assert_eq!(fetcher.registry().live_count(), 1);
        assert_eq!(fetcher.state(), AttemptState::Success { attempts: 1 });
        assert_eq!(transport.paths.lock().clone(), vec!["/api/staff/certificates/c1/view"]);
        assert_eq!(scheduler.sleeps(), 0);
    }

    #[tokio::test]
    async fn test_empty_body_never_succeeds() {
        let transport = Arc::new(FakeTransport::scripted(vec![
            Ok(BlobResponse::new(Bytes::new())),
            Ok(BlobResponse::new(Bytes::new())),
            Ok(BlobResponse::new(Bytes::new())),
        ]));
        let scheduler = Arc::new(RecordingScheduler::new());
        let (fetcher, errors) = counting_fetcher(transport.clone(), scheduler);

        let outcome = fetcher.load(cert("c1")).await;

        let failure = outcome.failure().unwrap();
        assert_eq!(failure.cause, FetchError::EmptyBody);
        assert_eq!(failure.attempts, 3);
        assert!(fetcher.current().is_none());
        assert_eq!(fetcher.registry().live_count(), 0);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_network_failures_bounded_by_cap() {
        let transport = Arc::new(FakeTransport::scripted(vec![
            Err(FetchError::Network("reset".into())),
            Err(FetchError::Status(503)),
            Err(FetchError::Network("reset".into())),
            png(),
        ]));
        let scheduler = Arc::new(RecordingScheduler::new());
        let (fetcher, errors) = counting_fetcher(transport.clone(), scheduler.clone());

        let outcome = fetcher.load(cert("c1")).await;

        assert_eq!(transport.calls(), 3);
        assert_eq!(scheduler.delays(), vec![Duration::from_secs(1); 2]);
        assert_eq!(outcome.failure().unwrap().kind(), FailureKind::Network);
        assert_eq!(
            fetcher.state(),
            AttemptState::Failed {
                attempts: 3,
                cause: FetchError::Network("reset".into())
            }
        );
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_recovers_on_retry() {
        let transport = Arc::new(FakeTransport::scripted(vec![
            Err(FetchError::Network("reset".into())),
            png(),
        ]));
        let scheduler = Arc::new(RecordingScheduler::new());
        let (fetcher, errors) = counting_fetcher(transport.clone(), scheduler.clone());

        assert!(fetcher.load(cert("c1")).await.is_ready());
        assert_eq!(fetcher.state(), AttemptState::Success { attempts: 2 });
        assert_eq!(scheduler.sleeps(), 1);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_forbidden_and_not_found_are_terminal() {
        for cause in [FetchError::Forbidden, FetchError::NotFound(None)] {
            let transport = Arc::new(FakeTransport::scripted(vec![Err(cause.clone()), png()]));
            let scheduler = Arc::new(RecordingScheduler::new());
            let (fetcher, errors) = counting_fetcher(transport.clone(), scheduler.clone());

            let outcome = fetcher.load(cert("c1")).await;

            assert_eq!(transport.calls(), 1);
            assert_eq!(scheduler.sleeps(), 0);
            assert_eq!(outcome.failure().unwrap().cause, cause);
            assert_eq!(outcome.failure().unwrap().attempts, 1);
            assert_eq!(errors.load(Ordering::SeqCst), 1);
        }
    }

    #[tokio::test]
    async fn test_empty_id_fails_without_request() {
        let transport = Arc::new(FakeTransport::scripted(vec![png()]));
        let scheduler = Arc::new(RecordingScheduler::new());
        let (fetcher, errors) = counting_fetcher(transport.clone(), scheduler);

        let outcome = fetcher.load(CertificateRef::new("", Role::Student)).await;

        let failure = outcome.failure().unwrap();
        assert_eq!(failure.cause, FetchError::MissingId);
        assert_eq!(failure.kind(), FailureKind::NotFound);
        assert_eq!(failure.attempts, 0);
        assert_eq!(transport.calls(), 0);
        assert_eq!(errors.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_missing_credentials_are_unauthenticated() {
        let transport = Arc::new(FakeTransport::scripted(vec![png()]));
        let fetcher = PreviewFetcher::new(
            transport.clone(),
            Arc::new(crate::session::SessionStore::new()),
            PreviewConfig::default(),
        )
        .with_scheduler(Arc::new(RecordingScheduler::new()));

        let outcome = fetcher.load(cert("c1")).await;

        assert_eq!(outcome.failure().unwrap().kind(), FailureKind::Unauthenticated);
        assert_eq!(transport.calls(), 0);
    }

    #[tokio::test]
    async fn test_reload_same_ref_keeps_one_live_resource() {
        let transport = Arc::new(FakeTransport::scripted(vec![png(), png()]));
        let fetcher = fetcher(transport, Arc::new(RecordingScheduler::new()));

        let first = fetcher.load(cert("c1")).await.handle().cloned().unwrap();
        let second = fetcher.load(cert("c1")).await.handle().cloned().unwrap();

        assert_ne!(first.url, second.url);
        assert!(!fetcher.registry().is_live(&first.url));
        assert!(fetcher.registry().is_live(&second.url));
        assert_eq!(fetcher.registry().live_count(), 1);
    }

    #[tokio::test]
    async fn test_new_ref_releases_previous_resource_at_start() {
        let transport = Arc::new(FakeTransport::scripted(vec![png(), Err(FetchError::Forbidden)]));
        let fetcher = fetcher(transport, Arc::new(RecordingScheduler::new()));

        let first = fetcher.load(cert("c1")).await.handle().cloned().unwrap();
        let outcome = fetcher.load(cert("c2")).await;

        assert!(outcome.failure().is_some());
        assert!(!fetcher.registry().is_live(&first.url));
        assert!(fetcher.current().is_none());
    }

    #[tokio::test]
    async fn test_response_content_type_used_when_undeclared() {
        let transport = Arc::new(FakeTransport::scripted(vec![Ok(
            BlobResponse::new(&b"%PDF-1.7"[..]).with_content_type("application/pdf")
        )]));
        let fetcher = fetcher(transport, Arc::new(RecordingScheduler::new()));

        let handle = fetcher
            .load(CertificateRef::new("c9", Role::Student))
            .await
            .handle()
            .cloned()
            .unwrap();

        assert_eq!(handle.kind, PreviewKind::Document);
        assert_eq!(handle.content_type.as_deref(), Some("application/pdf"));
    }

    #[tokio::test]
    async fn test_teardown_during_fetch_exposes_nothing() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let transport = Arc::new(FakeTransport::gated(vec![png()], entered.clone(), release.clone()));
        let (fetcher, errors) = counting_fetcher(transport, Arc::new(RecordingScheduler::new()));
        let fetcher = Arc::new(fetcher);

        let task = {
            let fetcher = fetcher.clone();
            tokio::spawn(async move { fetcher.load(cert("c1")).await })
        };

        entered.notified().await;
        fetcher.teardown();
        release.notify_one();

        let outcome = task.await.unwrap();
        assert!(matches!(outcome, LoadOutcome::Superseded));
        assert!(fetcher.current().is_none());
        assert_eq!(fetcher.registry().live_count(), 0);
        assert_eq!(fetcher.state(), AttemptState::Idle);
        assert_eq!(errors.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_last_request_wins() {
        let entered = Arc::new(Notify::new());
        let release = Arc::new(Notify::new());
        let transport = Arc::new(FakeTransport::gated(vec![png(), png()], entered.clone(), release.clone()));
        let fetcher = Arc::new(fetcher(transport, Arc::new(RecordingScheduler::new())));

        let slow = {
            let fetcher = fetcher.clone();
            tokio::spawn(async move { fetcher.load(cert("old")).await })
        };
        entered.notified().await;

        let fresh = fetcher.load(cert("new")).await.handle().cloned().unwrap();
        release.notify_one();

        assert!(matches!(slow.await.unwrap(), LoadOutcome::Superseded));
        assert_eq!(fetcher.current(), Some(fresh));
        assert_eq!(fetcher.current_ref().map(|r| r.id), Some("new".to_string()));
        assert_eq!(fetcher.registry().live_count(), 1);
    }

    #[tokio::test]
    async fn test_take_current_transfers_ownership() {
        let transport = Arc::new(FakeTransport::scripted(vec![png()]));
        let fetcher = fetcher(transport, Arc::new(RecordingScheduler::new()));
        fetcher.load(cert("c1")).await;

        let resource = fetcher.take_current().unwrap();
        assert!(fetcher.current().is_none());
        assert!(fetcher.registry().is_live(resource.url()));

        fetcher.teardown();
        assert!(fetcher.registry().is_live(resource.url()));
        resource.release();
        assert_eq!(fetcher.registry().live_count(), 0);
    }

    #[tokio::test]
    async fn test_download_uses_download_endpoint() {
        let mut response = BlobResponse::new(&b"%PDF"[..]).with_content_type("application/pdf");
        response.file_name = Some("aws.pdf".into());
        let transport = Arc::new(FakeTransport::scripted(vec![Ok(response)]));
        let fetcher = fetcher(transport.clone(), Arc::new(RecordingScheduler::new()));

        let file = fetcher.download(&CertificateRef::new("c1", Role::Student)).await.unwrap();

        assert_eq!(file.file_name, "aws.pdf");
        assert_eq!(file.bytes, Bytes::from_static(b"%PDF"));
        assert_eq!(transport.paths.lock().clone(), vec!["/api/student/certificates/c1/download"]);
        assert!(fetcher.current().is_none());
    }

    #[tokio::test]
    async fn test_failure_context() {
        let failure = PreviewFailure {
            certificate_id: "c1".into(),
            role: Role::Student,
            attempts: 3,
            cause: FetchError::Status(502),
        };
        let context = failure.context();
        assert_eq!(context.certificate_id.as_deref(), Some("c1"));
        assert_eq!(context.attempts, Some(3));
        assert_eq!(
            context.additional.get("failure_kind").map(String::as_str),
            Some("NETWORK")
        );
    }
}
