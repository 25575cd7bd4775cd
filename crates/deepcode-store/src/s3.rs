//! S3-backed Zarr storage
//!
//! `zarrs` reads synchronously while `object_store` is async; the adapter
//! bridges the two by blocking on a runtime handle owned by the caller.

use std::sync::Arc;

use object_store::aws::AmazonS3Builder;
use object_store::prefix::PrefixStore;
use zarrs_object_store::AsyncObjectStore;
use zarrs_storage::storage_adapter::async_to_sync::{
    AsyncToSyncBlockOn, AsyncToSyncStorageAdapter,
};
use zarrs_storage::ReadableStorage;

use deepcode_core::config::StorageCredentials;

use crate::error::{Result, StoreError};

/// Drives async storage requests on a runtime handle
///
/// The handle must belong to a runtime that is not driving the calling thread.
#[derive(Clone)]
pub struct TokioBlockOn(pub tokio::runtime::Handle);

impl AsyncToSyncBlockOn for TokioBlockOn {
    fn block_on<F: core::future::Future>(&self, future: F) -> F::Output {
        self.0.block_on(future)
    }
}

/// Connection settings for one S3 dataset store
#[derive(Debug, Clone)]
pub struct S3StoreConfig<'a> {
    pub bucket: &'a str,
    pub region: &'a str,
    pub endpoint: Option<&'a str>,
    pub anonymous: bool,
    pub credentials: Option<&'a StorageCredentials>,
}

/// Open `<bucket>/<dataset_id>` as readable Zarr storage
pub fn create_s3_storage(
    config: &S3StoreConfig<'_>,
    dataset_id: &str,
    handle: tokio::runtime::Handle,
) -> Result<ReadableStorage> {
    let mut builder = AmazonS3Builder::new()
        .with_bucket_name(config.bucket)
        .with_region(config.region);

    if let Some(endpoint) = config.endpoint {
        builder = builder
            .with_endpoint(endpoint)
            .with_allow_http(endpoint.starts_with("http://"));
    }

    if config.anonymous {
        builder = builder.with_skip_signature(true);
    } else {
        let credentials = config.credentials.ok_or_else(|| {
            StoreError::Backend("S3 credentials are required for authenticated access".to_string())
        })?;
        builder = builder
            .with_access_key_id(&credentials.access_key_id)
            .with_secret_access_key(&credentials.secret_access_key);
    }

    let s3 = builder
        .build()
        .map_err(|e| StoreError::Backend(format!("Failed to create S3 client: {}", e)))?;

    let prefixed = PrefixStore::new(s3, dataset_id.trim_matches('/'));
    let async_store = Arc::new(AsyncObjectStore::new(prefixed));

    Ok(Arc::new(AsyncToSyncStorageAdapter::new(
        async_store,
        TokioBlockOn(handle),
    )))
}
