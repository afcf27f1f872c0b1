//! S3-compatible object storage provider (requires the `s3` feature).

use async_trait::async_trait;
use aws_sdk_s3::Client;
use aws_sdk_s3::config::{BehaviorVersion, Credentials, Region};
use aws_sdk_s3::error::DisplayErrorContext;
use aws_sdk_s3::primitives::ByteStream;
use bytes::Bytes;
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use tracing::{debug, info};

use folio_core::config::storage::S3StorageConfig;
use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::traits::blob::BlobStore;
use folio_core::types::scan::ListPage;

/// Characters escaped in the `x-amz-copy-source` header. `/` stays literal.
const COPY_SOURCE: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'+')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'`')
    .add(b'{')
    .add(b'}');

/// S3-compatible blob store.
#[derive(Debug, Clone)]
pub struct S3BlobStore {
    client: Client,
    bucket: String,
    page_size: usize,
}

impl S3BlobStore {
    /// Create a new S3 blob store from configuration.
    pub async fn new(config: &S3StorageConfig, page_size: usize) -> AppResult<Self> {
        if config.bucket.is_empty() {
            return Err(AppError::configuration("S3 bucket name is required"));
        }
        info!(
            endpoint = %config.endpoint,
            region = %config.region,
            bucket = %config.bucket,
            "Initializing S3 blob store"
        );

        let mut loader = aws_config::defaults(BehaviorVersion::latest())
            .region(Region::new(config.region.clone()));
        if !config.access_key.is_empty() {
            loader = loader.credentials_provider(Credentials::new(
                config.access_key.clone(),
                config.secret_key.clone(),
                None,
                None,
                "folio-config",
            ));
        }
        if !config.endpoint.is_empty() {
            loader = loader.endpoint_url(config.endpoint.clone());
        }
        let shared = loader.load().await;

        let s3_config = aws_sdk_s3::config::Builder::from(&shared)
            .force_path_style(!config.endpoint.is_empty())
            .build();

        Ok(Self {
            client: Client::from_conf(s3_config),
            bucket: config.bucket.clone(),
            // ListObjectsV2 never returns more than 1000 keys per call
            page_size: page_size.clamp(1, 1000),
        })
    }
}

fn s3_error(action: &str, key: &str, err: impl std::error::Error) -> AppError {
    AppError::storage(format!(
        "S3 {action} failed for {key}: {}",
        DisplayErrorContext(err)
    ))
}

#[async_trait]
impl BlobStore for S3BlobStore {
    fn provider_type(&self) -> &str {
        "s3"
    }

    async fn health_check(&self) -> AppResult<bool> {
        Ok(self
            .client
            .head_bucket()
            .bucket(&self.bucket)
            .send()
            .await
            .is_ok())
    }

    async fn put(&self, key: &str, data: Bytes) -> AppResult<()> {
        let len = data.len();
        self.client
            .put_object()
            .bucket(&self.bucket)
            .key(key)
            .body(ByteStream::from(data))
            .send()
            .await
            .map_err(|e| s3_error("put", key, e))?;
        debug!(key, bytes = len, "Wrote S3 object");
        Ok(())
    }

    async fn get(&self, key: &str) -> AppResult<Bytes> {
        let output = match self
            .client
            .get_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(output) => output,
            Err(e) if e.as_service_error().is_some_and(|se| se.is_no_such_key()) => {
                return Err(AppError::not_found(format!("Blob not found: {key}")));
            }
            Err(e) => return Err(s3_error("get", key, e)),
        };

        let data = output
            .body
            .collect()
            .await
            .map_err(|e| s3_error("read body", key, e))?;
        Ok(data.into_bytes())
    }

    async fn exists(&self, key: &str) -> AppResult<bool> {
        match self
            .client
            .head_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
        {
            Ok(_) => Ok(true),
            Err(e) if e.as_service_error().is_some_and(|se| se.is_not_found()) => Ok(false),
            Err(e) => Err(s3_error("head", key, e)),
        }
    }

    async fn list_page(
        &self,
        prefix: &str,
        continuation_token: Option<&str>,
    ) -> AppResult<ListPage> {
        let output = self
            .client
            .list_objects_v2()
            .bucket(&self.bucket)
            .prefix(prefix)
            .max_keys(self.page_size as i32)
            .set_continuation_token(continuation_token.map(str::to_string))
            .send()
            .await
            .map_err(|e| s3_error("list", prefix, e))?;

        let keys = output
            .contents()
            .iter()
            .filter_map(|object| object.key().map(str::to_string))
            .collect();
        let next_token = if output.is_truncated().unwrap_or(false) {
            output.next_continuation_token().map(str::to_string)
        } else {
            None
        };

        Ok(ListPage { keys, next_token })
    }

    async fn copy(&self, from: &str, to: &str) -> AppResult<()> {
        let source = format!("{}/{}", self.bucket, utf8_percent_encode(from, COPY_SOURCE));
        self.client
            .copy_object()
            .bucket(&self.bucket)
            .copy_source(source)
            .key(to)
            .send()
            .await
            .map_err(|e| s3_error("copy", from, e))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> AppResult<()> {
        self.client
            .delete_object()
            .bucket(&self.bucket)
            .key(key)
            .send()
            .await
            .map_err(|e| s3_error("delete", key, e))?;
        Ok(())
    }
}
