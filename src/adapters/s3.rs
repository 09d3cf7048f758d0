use std::time::{Duration, SystemTime};

use aws_config::{BehaviorVersion, Region};
use aws_sdk_s3::{
    config::{http::HttpResponse, Credentials},
    error::{DisplayErrorContext, ProvideErrorMetadata, SdkError},
    primitives::{ByteStream, DateTime},
    types::{BucketLocationConstraint, CreateBucketConfiguration},
    Client,
};
use bytes::Bytes;

use crate::{
    adapters::{Storage, StorageFuture},
    config::Config,
    model::{
        error::{ErrorKind, StorageError},
        storage::{Bucket, ObjectEntry, ObjectLocation},
    },
    util,
};

/// Builds the S3 client from the process configuration. Static credentials
/// are used when configured, otherwise the SDK's default provider chain.
pub async fn connect(config: &Config) -> Client {
    let mut loader =
        aws_config::defaults(BehaviorVersion::latest()).region(Region::new(config.region.clone()));

    if let (Some(access_key_id), Some(secret_access_key)) =
        (&config.access_key_id, &config.secret_access_key)
    {
        loader = loader.credentials_provider(Credentials::new(
            access_key_id,
            secret_access_key,
            None,
            None,
            "objectdesk",
        ));
    }

    if let Some(endpoint) = &config.endpoint_url {
        loader = loader.endpoint_url(endpoint);
    }

    let sdk_config = loader.load().await;
    let s3_config = aws_sdk_s3::config::Builder::from(&sdk_config)
        .force_path_style(config.endpoint_url.is_some())
        .build();

    Client::from_conf(s3_config)
}

impl Storage for Client {
    fn list_buckets(&self) -> StorageFuture<'_, Vec<Bucket>> {
        Box::pin(async move {
            let lb = self
                .list_buckets()
                .send()
                .await
                .map_err(|err| storage_error("ListBuckets", err))?;

            Ok(lb
                .buckets()
                .iter()
                .map(|b| Bucket {
                    name: b.name().unwrap_or("").to_string(),
                    creation_date: to_system_time(b.creation_date()),
                })
                .collect())
        })
    }

    fn list_objects<'a>(&'a self, bucket: &'a str) -> StorageFuture<'a, Vec<ObjectEntry>> {
        Box::pin(async move {
            let lo = self
                .list_objects_v2()
                .bucket(bucket)
                .send()
                .await
                .map_err(|err| storage_error("ListObjectsV2", err))?;

            Ok(lo
                .contents()
                .iter()
                .map(|o| ObjectEntry {
                    key: o.key().unwrap_or("").to_string(),
                    size: o.size().unwrap_or(0),
                    modified_time: to_system_time(o.last_modified()),
                })
                .collect())
        })
    }

    fn create_bucket<'a>(&'a self, bucket: &'a str, region: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            let mut req = self.create_bucket().bucket(bucket);

            if let Some(configuration) = bucket_configuration(region) {
                req = req.create_bucket_configuration(configuration);
            }

            req.send()
                .await
                .map_err(|err| storage_error("CreateBucket", err))?;

            Ok(())
        })
    }

    fn delete_bucket<'a>(&'a self, bucket: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.delete_bucket()
                .bucket(bucket)
                .send()
                .await
                .map_err(|err| storage_error("DeleteBucket", err))?;

            Ok(())
        })
    }

    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Bytes,
    ) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.put_object()
                .bucket(bucket)
                .key(key)
                .body(ByteStream::from(body))
                .send()
                .await
                .map_err(|err| storage_error("PutObject", err))?;

            Ok(())
        })
    }

    fn delete_object<'a>(&'a self, bucket: &'a str, key: &'a str) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.delete_object()
                .bucket(bucket)
                .key(key)
                .send()
                .await
                .map_err(|err| storage_error("DeleteObject", err))?;

            Ok(())
        })
    }

    fn copy_object<'a>(
        &'a self,
        source: &'a ObjectLocation,
        dest: &'a ObjectLocation,
    ) -> StorageFuture<'a, ()> {
        Box::pin(async move {
            self.copy_object()
                .copy_source(copy_source(source))
                .bucket(&dest.bucket)
                .key(&dest.key)
                .send()
                .await
                .map_err(|err| storage_error("CopyObject", err))?;

            Ok(())
        })
    }
}

/// CreateBucket configuration for `region`; `None` in the default region.
pub fn bucket_configuration(region: &str) -> Option<CreateBucketConfiguration> {
    util::region::location_constraint(region).map(|constraint| {
        CreateBucketConfiguration::builder()
            .location_constraint(BucketLocationConstraint::from(constraint))
            .build()
    })
}

/// `x-amz-copy-source` value; the key must be URL-encoded.
fn copy_source(source: &ObjectLocation) -> String {
    format!("{}/{}", source.bucket, urlencoding::encode(&source.key))
}

fn storage_error<E>(operation: &str, err: SdkError<E, HttpResponse>) -> StorageError
where
    E: ProvideErrorMetadata + std::error::Error + Send + Sync + 'static,
{
    match &err {
        SdkError::ServiceError(ctx) => {
            let svc_err = ctx.err();
            let kind = match svc_err.code() {
                Some(code) => ErrorKind::from_code(code),
                None => ErrorKind::from_status(ctx.raw().status().as_u16()),
            };

            let message = match (svc_err.code(), svc_err.message()) {
                (Some(code), Some(message)) => format!(
                    "An error occurred ({}) when calling the {} operation: {}",
                    code, operation, message
                ),
                (Some(code), None) => format!(
                    "An error occurred ({}) when calling the {} operation",
                    code, operation
                ),
                _ => format!(
                    "failed to {}: {}",
                    operation,
                    DisplayErrorContext(&err)
                ),
            };

            StorageError::new(kind, message)
        }
        SdkError::TimeoutError(_) | SdkError::DispatchFailure(_) | SdkError::ResponseError(_) => {
            StorageError::new(
                ErrorKind::Transient,
                format!("failed to {}: {}", operation, DisplayErrorContext(&err)),
            )
        }
        SdkError::ConstructionFailure(_) => StorageError::new(
            ErrorKind::InvalidInput,
            format!("failed to {}: {}", operation, DisplayErrorContext(&err)),
        ),
        _ => StorageError::new(
            ErrorKind::Other,
            format!("failed to {}: {}", operation, DisplayErrorContext(&err)),
        ),
    }
}

fn to_system_time(dt: Option<&DateTime>) -> Option<SystemTime> {
    let dt = dt?;
    let secs = u64::try_from(dt.secs()).ok()?;

    Some(SystemTime::UNIX_EPOCH + Duration::new(secs, dt.subsec_nanos()))
}
