//! Storage adapter contract for publishing opaque blobs under a
//! `(domain, path)` key, plus an in-memory implementation.
//!
//! Mirrors the teacher workspace's `Docstore` trait (`put`/`get` keyed by
//! owner/partition/key); here the partition key is a domain (web publication
//! target) rather than an application owner id, since the webvh layer
//! manager publishes DID documents and resources per-domain.

use std::future::Future;

use dashmap::DashMap;

/// Storage capability contract. Implementations may be in-memory (as
/// [`MemoryStorage`] is), an HTTPS-backed adapter, or any other blob store;
/// the webvh layer manager depends only on this trait.
pub trait Storage: Send + Sync {
    /// Write `bytes` under `domain`/`path`, returning an opaque URI.
    /// Leading slashes in `path` are stripped before storing. Writes to an
    /// existing `(domain, path)` overwrite it.
    fn put(
        &self, domain: &str, path: &str, bytes: Vec<u8>,
    ) -> impl Future<Output = anyhow::Result<String>> + Send;

    /// Read bytes previously written under `domain`/`path`, or `None` if
    /// absent.
    fn get(
        &self, domain: &str, path: &str,
    ) -> impl Future<Output = anyhow::Result<Option<Vec<u8>>>> + Send;

    /// Whether `domain`/`path` has been written.
    fn exists(&self, domain: &str, path: &str) -> impl Future<Output = anyhow::Result<bool>> + Send;
}

fn normalize(path: &str) -> &str {
    path.trim_start_matches('/')
}

fn key(domain: &str, path: &str) -> String {
    format!("{domain}/{}", normalize(path))
}

/// An in-memory [`Storage`] backed by a concurrent map. Different domains are
/// isolated by key prefix; concurrent writes to the same key are
/// last-writer-wins.
#[derive(Debug, Default, Clone)]
pub struct MemoryStorage {
    blobs: std::sync::Arc<DashMap<String, Vec<u8>>>,
}

impl MemoryStorage {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

impl Storage for MemoryStorage {
    async fn put(&self, domain: &str, path: &str, bytes: Vec<u8>) -> anyhow::Result<String> {
        let k = key(domain, path);
        self.blobs.insert(k.clone(), bytes);
        Ok(format!("mem://{k}"))
    }

    async fn get(&self, domain: &str, path: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Ok(self.blobs.get(&key(domain, path)).map(|v| v.clone()))
    }

    async fn exists(&self, domain: &str, path: &str) -> anyhow::Result<bool> {
        Ok(self.blobs.contains_key(&key(domain, path)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = MemoryStorage::new();
        let uri = store.put("example.com", "/assets/x", b"hi".to_vec()).await.unwrap();
        assert_eq!(uri, "mem://example.com/assets/x");
        let got = store.get("example.com", "assets/x").await.unwrap();
        assert_eq!(got, Some(b"hi".to_vec()));
    }

    #[tokio::test]
    async fn domains_are_isolated() {
        let store = MemoryStorage::new();
        store.put("a.com", "p", b"a".to_vec()).await.unwrap();
        let got = store.get("b.com", "p").await.unwrap();
        assert_eq!(got, None);
    }

    #[tokio::test]
    async fn leading_slash_is_normalized() {
        let store = MemoryStorage::new();
        store.put("a.com", "/p", b"1".to_vec()).await.unwrap();
        assert!(store.exists("a.com", "p").await.unwrap());
    }
}
