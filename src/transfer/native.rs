//! Object store transfer (S3, R2, GCS, Azure, local)

use super::RemoteLister;
use crate::config::IngestConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use bytes::Bytes;
use futures::TryStreamExt;
use object_store::aws::AmazonS3Builder;
use object_store::azure::MicrosoftAzureBuilder;
use object_store::gcp::GoogleCloudStorageBuilder;
use object_store::local::LocalFileSystem;
use object_store::path::Path as ObjectPath;
use object_store::{ObjectMeta, ObjectStore};
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Remote source parsed from a location URL
#[derive(Debug, Clone)]
pub struct RemoteSource {
    /// The object store implementation
    store: Arc<dyn ObjectStore>,
    /// Key prefix within the bucket/container
    prefix: String,
    /// URL scheme for logging
    scheme: String,
    /// Original location
    location: String,
}

impl RemoteSource {
    /// Parse a source location and create the matching object store
    ///
    /// Supported formats:
    /// - `s3://bucket/path/` - AWS S3
    /// - `r2://bucket/path/` - Cloudflare R2 (S3-compatible)
    /// - `gs://bucket/path/` - Google Cloud Storage
    /// - `az://container/path/` - Azure Blob Storage
    /// - `/local/path/` or `file:///path/` - Local filesystem
    pub fn parse(location: &str) -> Result<Self> {
        if location.starts_with("s3://") {
            Self::parse_s3(location, false)
        } else if location.starts_with("r2://") {
            Self::parse_s3(location, true)
        } else if location.starts_with("gs://") {
            Self::parse_gcs(location)
        } else if location.starts_with("az://") {
            Self::parse_azure(location)
        } else {
            Self::parse_local(location)
        }
    }

    fn parse_s3(location: &str, is_r2: bool) -> Result<Self> {
        let scheme = if is_r2 { "r2" } else { "s3" };
        let (bucket, prefix) = split_bucket(location, scheme)?;

        let mut builder = AmazonS3Builder::from_env().with_bucket_name(bucket);
        if is_r2 {
            if let Ok(endpoint) = std::env::var("R2_ENDPOINT_URL") {
                builder = builder.with_endpoint(endpoint);
            }
        }

        let store = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to create {scheme} client: {e}")))?;
        Ok(Self::new(Arc::new(store), prefix, scheme, location))
    }

    fn parse_gcs(location: &str) -> Result<Self> {
        let (bucket, prefix) = split_bucket(location, "gs")?;
        let store = GoogleCloudStorageBuilder::from_env()
            .with_bucket_name(bucket)
            .build()
            .map_err(|e| Error::config(format!("Failed to create GCS client: {e}")))?;
        Ok(Self::new(Arc::new(store), prefix, "gs", location))
    }

    fn parse_azure(location: &str) -> Result<Self> {
        let (container, prefix) = split_bucket(location, "az")?;
        let store = MicrosoftAzureBuilder::from_env()
            .with_container_name(container)
            .build()
            .map_err(|e| Error::config(format!("Failed to create Azure client: {e}")))?;
        Ok(Self::new(Arc::new(store), prefix, "az", location))
    }

    fn parse_local(location: &str) -> Result<Self> {
        let path = location.strip_prefix("file://").unwrap_or(location);
        let store = LocalFileSystem::new_with_prefix(path)
            .map_err(|e| Error::config(format!("Failed to open local source {path}: {e}")))?;
        Ok(Self::new(Arc::new(store), String::new(), "file", location))
    }

    fn new(store: Arc<dyn ObjectStore>, prefix: String, scheme: &str, location: &str) -> Self {
        Self {
            store,
            prefix: prefix.trim_matches('/').to_string(),
            scheme: scheme.to_string(),
            location: location.to_string(),
        }
    }

    /// Get the scheme (s3, r2, gs, az, file)
    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    /// Key prefix within the bucket
    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// List every object under the prefix
    pub async fn list(&self) -> Result<Vec<ObjectMeta>> {
        let prefix = (!self.prefix.is_empty()).then(|| ObjectPath::from(self.prefix.as_str()));
        let objects: Vec<ObjectMeta> = self.store.list(prefix.as_ref()).try_collect().await?;
        Ok(objects)
    }

    /// Key of an object relative to the prefix
    pub fn relative_key<'a>(&self, meta: &'a ObjectMeta) -> &'a str {
        let key = meta.location.as_ref();
        key.strip_prefix(self.prefix.as_str())
            .unwrap_or(key)
            .trim_start_matches('/')
    }

    /// Download an object into `local`, creating parent directories
    pub async fn fetch(&self, meta: &ObjectMeta, local: &Path) -> Result<()> {
        let data: Bytes = self.store.get(&meta.location).await?.bytes().await?;
        if let Some(parent) = local.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(local, &data).await?;
        Ok(())
    }
}

/// Split `scheme://bucket/prefix` into bucket and prefix
fn split_bucket<'a>(location: &'a str, scheme: &str) -> Result<(&'a str, String)> {
    let without_scheme = location
        .strip_prefix(&format!("{scheme}://"))
        .ok_or_else(|| Error::config(format!("Invalid {scheme} URL: {location}")))?;

    Ok(match without_scheme.find('/') {
        Some(idx) => (
            &without_scheme[..idx],
            without_scheme[idx + 1..].to_string(),
        ),
        None => (without_scheme, String::new()),
    })
}

/// Mirrors a remote prefix into the download directory through `object_store`
#[derive(Debug, Clone)]
pub struct ObjectStoreLister {
    source: RemoteSource,
    download_dir: PathBuf,
}

impl ObjectStoreLister {
    /// Create a lister over a parsed source
    pub fn new(source: RemoteSource, download_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            download_dir: download_dir.into(),
        }
    }

    /// Create a lister from the source configuration
    pub fn from_config(config: &IngestConfig) -> Result<Self> {
        let source = RemoteSource::parse(&config.source.location)?;
        Ok(Self::new(source, config.download_dir.clone()))
    }

    /// Whether `local` already holds a copy of the object
    async fn is_current(local: &Path, meta: &ObjectMeta) -> bool {
        match tokio::fs::metadata(local).await {
            Ok(existing) => existing.is_file() && existing.len() == meta.size as u64,
            Err(_) => false,
        }
    }
}

#[async_trait]
impl RemoteLister for ObjectStoreLister {
    async fn transfer(&self) -> Result<Vec<String>> {
        let objects = self
            .source
            .list()
            .await
            .map_err(|e| Error::transfer(format!("listing {} failed: {e}", self.describe())))?;

        let mut paths = Vec::with_capacity(objects.len());
        for meta in &objects {
            let key = self.source.relative_key(meta);
            if key.is_empty() {
                continue;
            }
            let local = self.download_dir.join(key);

            if Self::is_current(&local, meta).await {
                tracing::trace!(key, "Local copy is current");
            } else {
                self.source.fetch(meta, &local).await.map_err(|e| {
                    Error::transfer(format!("download of {} failed: {e}", meta.location))
                })?;
                tracing::debug!(key, bytes = meta.size, "Downloaded object");
            }
            paths.push(local.to_string_lossy().into_owned());
        }

        Ok(paths)
    }

    fn describe(&self) -> String {
        self.source.location.clone()
    }
}
