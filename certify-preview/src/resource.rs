//! Locally addressable preview resources
//!
//! A fetched payload is registered under a `blob:` URL for as long as its
//! [`PreviewResource`] is alive. Releasing the resource (explicitly or by
//! dropping it) revokes the URL.

use crate::classification::PreviewKind;
use bytes::Bytes;
use parking_lot::Mutex;
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use uuid::Uuid;

const URL_PREFIX: &str = "blob:certify/";

#[derive(Debug, Clone)]
struct Entry {
    bytes: Bytes,
    content_type: Option<String>,
}

/// URL table shared by every resource it created
#[derive(Clone, Default)]
pub struct ResourceRegistry {
    entries: Arc<Mutex<HashMap<String, Entry>>>,
}

impl ResourceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `bytes` under a fresh URL
    pub fn create(&self, bytes: Bytes, content_type: Option<String>, kind: PreviewKind) -> PreviewResource {
        let url = format!("{}{}", URL_PREFIX, Uuid::new_v4());
        self.entries.lock().insert(
            url.clone(),
            Entry {
                bytes: bytes.clone(),
                content_type: content_type.clone(),
            },
        );
        tracing::debug!(url = %url, bytes = bytes.len(), kind = ?kind, "Preview resource created");

        PreviewResource {
            url,
            kind,
            content_type,
            bytes,
            registry: self.clone(),
            released: false,
        }
    }

    /// Bytes and content type behind a live URL
    pub fn resolve(&self, url: &str) -> Option<(Bytes, Option<String>)> {
        self.entries
            .lock()
            .get(url)
            .map(|entry| (entry.bytes.clone(), entry.content_type.clone()))
    }

    pub fn is_live(&self, url: &str) -> bool {
        self.entries.lock().contains_key(url)
    }

    pub fn live_count(&self) -> usize {
        self.entries.lock().len()
    }

    fn revoke(&self, url: &str) {
        if self.entries.lock().remove(url).is_some() {
            tracing::debug!(url = %url, "Preview resource released");
        }
    }
}

impl fmt::Debug for ResourceRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResourceRegistry")
            .field("live", &self.live_count())
            .finish()
    }
}

/// Cheap, inert description of a resource; holding one keeps nothing alive
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PreviewHandle {
    pub url: String,
    pub kind: PreviewKind,
    pub content_type: Option<String>,
    pub size: usize,
}

/// Exclusively owned fetched payload
pub struct PreviewResource {
    url: String,
    kind: PreviewKind,
    content_type: Option<String>,
    bytes: Bytes,
    registry: ResourceRegistry,
    released: bool,
}

impl PreviewResource {
    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn kind(&self) -> PreviewKind {
        self.kind
    }

    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    pub fn size(&self) -> usize {
        self.bytes.len()
    }

    pub fn bytes(&self) -> &Bytes {
        &self.bytes
    }

    pub fn handle(&self) -> PreviewHandle {
        PreviewHandle {
            url: self.url.clone(),
            kind: self.kind,
            content_type: self.content_type.clone(),
            size: self.size(),
        }
    }

    /// Revoke the URL now
    pub fn release(mut self) {
        self.revoke();
    }

    fn revoke(&mut self) {
        if !self.released {
            self.released = true;
            self.registry.revoke(&self.url);
        }
    }
}

impl Drop for PreviewResource {
    fn drop(&mut self) {
        self.revoke();
    }
}

impl fmt::Debug for PreviewResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewResource")
            .field("url", &self.url)
            .field("kind", &self.kind)
            .field("content_type", &self.content_type)
            .field("size", &self.size())
            .finish()
    }
}
