//! Certify preview engine
//!
//! Client-side building blocks of the Certify portal for fetching and
//! displaying certificate files behind bearer-token authentication.
//!
//! # Features
//!
//! - **Classification**: decides image / document / unsupported from the
//!   declared MIME type and file name
//! - **Fetcher**: retrying, cancellable loads with a single live resource
//! - **Presenter**: Handlebars-rendered inline fragments, placeholders and
//!   standalone viewer documents
//! - **Client**: JSON endpoints for listing, uploading and reviewing
//!   certificates, plus the dashboard counters
//!
//! # Example
//!
//! ```rust,no_run
//! use certify_preview::{CertificateRef, PreviewConfig, PreviewFetcher, Role, SessionStore};
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let session = Arc::new(SessionStore::new());
//! session.sign_in("token", Role::Staff, None);
//!
//! let fetcher = PreviewFetcher::http(PreviewConfig::from_env(), session)?;
//! let outcome = fetcher
//!     .load(CertificateRef::new("65f1", Role::Staff).with_file_name("aws.pdf"))
//!     .await;
//! println!("ready: {}", outcome.is_ready());
//! # Ok(())
//! # }
//! ```

pub mod attempt;
pub mod classification;
pub mod client;
pub mod config;
pub mod error;
pub mod fetcher;
pub mod models;
pub mod presenter;
pub mod resource;
pub mod scheduler;
pub mod session;
pub mod transport;

pub use attempt::AttemptState;
pub use classification::{classify, ClassifierPolicy, PreviewKind};
pub use client::{CertificateClient, CertificateUpload};
pub use config::{ConfigLoadError, PreviewConfig};
pub use error::{FailureKind, FetchError, FetchResult};
pub use fetcher::{DownloadedFile, ErrorCallback, LoadOutcome, PreviewFailure, PreviewFetcher};
pub use models::{
    Certificate, CertificateMetadata, CertificateRef, CertificateStatus, DashboardStats, Role,
};
pub use presenter::{guidance, Embedding, PresenterError, ViewerPresenter, ViewerWindow};
pub use resource::{PreviewHandle, PreviewResource, ResourceRegistry};
pub use scheduler::{RecordingScheduler, Scheduler, TokioScheduler};
pub use session::{CredentialProvider, SessionStore, StaticToken};
pub use transport::{BlobRequest, BlobResponse, BlobTransport, HttpTransport};
