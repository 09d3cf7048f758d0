use std::{
    collections::BTreeMap,
    sync::{Mutex, MutexGuard},
    time::SystemTime,
};

use bytes::Bytes;
use futures::future;

use crate::{
    adapters::{Storage, StorageFuture},
    model::{
        error::{ErrorKind, StorageError},
        storage::{Bucket, ObjectEntry, ObjectLocation},
    },
    util,
};

struct MockBucket {
    creation_date: SystemTime,
    objects: BTreeMap<String, Bytes>,
}

#[derive(Default)]
struct MockState {
    buckets: BTreeMap<String, MockBucket>,
    location_constraints: Vec<(String, Option<String>)>,
    fail_delete_object: bool,
}

/// In-memory object store with S3's observable behavior for the calls the
/// front-end makes.
#[derive(Default)]
pub struct MockClient {
    state: Mutex<MockState>,
}

impl MockClient {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_bucket(self, bucket: &str) -> Self {
        self.lock().buckets.insert(
            bucket.to_string(),
            MockBucket {
                creation_date: SystemTime::now(),
                objects: BTreeMap::new(),
            },
        );
        self
    }

    pub fn with_object(self, bucket: &str, key: &str, body: &[u8]) -> Self {
        self.lock()
            .buckets
            .get_mut(bucket)
            .expect("bucket must exist before adding objects")
            .objects
            .insert(key.to_string(), Bytes::copy_from_slice(body));
        self
    }

    /// Makes every DeleteObject call fail with AccessDenied.
    pub fn fail_delete_object(&self) {
        self.lock().fail_delete_object = true;
    }

    /// Location constraint sent with each CreateBucket call, in call order.
    pub fn location_constraints(&self) -> Vec<(String, Option<String>)> {
        self.lock().location_constraints.clone()
    }

    pub fn object(&self, bucket: &str, key: &str) -> Option<Bytes> {
        self.lock()
            .buckets
            .get(bucket)
            .and_then(|b| b.objects.get(key).cloned())
    }

    pub fn keys(&self, bucket: &str) -> Vec<String> {
        self.lock()
            .buckets
            .get(bucket)
            .map(|b| b.objects.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn lock(&self) -> MutexGuard<'_, MockState> {
        self.state
            .lock()
            .expect("failed to acquire `state` guard")
    }
}

fn no_such_bucket(bucket: &str) -> StorageError {
    StorageError::new(
        ErrorKind::NotFound,
        format!("NoSuchBucket: The specified bucket does not exist: {}", bucket),
    )
}

impl Storage for MockClient {
    fn list_buckets(&self) -> StorageFuture<'_, Vec<Bucket>> {
        let buckets = self
            .lock()
            .buckets
            .iter()
            .map(|(name, b)| Bucket {
                name: name.clone(),
                creation_date: Some(b.creation_date),
            })
            .collect();

        Box::pin(future::ready(Ok(buckets)))
    }

    fn list_objects<'a>(&'a self, bucket: &'a str) -> StorageFuture<'a, Vec<ObjectEntry>> {
        let res = match self.lock().buckets.get(bucket) {
            None => Err(no_such_bucket(bucket)),
            Some(b) => Ok(b
                .objects
                .iter()
                .map(|(key, body)| ObjectEntry {
                    key: key.clone(),
                    size: body.len() as i64,
                    modified_time: Some(b.creation_date),
                })
                .collect()),
        };

        Box::pin(future::ready(res))
    }

    fn create_bucket<'a>(&'a self, bucket: &'a str, region: &'a str) -> StorageFuture<'a, ()> {
        let mut state = self.lock();
        state.location_constraints.push((
            bucket.to_string(),
            util::region::location_constraint(region).map(str::to_string),
        ));

        let res = if state.buckets.contains_key(bucket) {
            Err(StorageError::new(
                ErrorKind::Conflict,
                format!("BucketAlreadyOwnedByYou: {}", bucket),
            ))
        } else if bucket.len() < 3 || bucket.chars().any(|c| c.is_ascii_uppercase()) {
            Err(StorageError::new(
                ErrorKind::InvalidInput,
                format!("InvalidBucketName: The specified bucket is not valid: {}", bucket),
            ))
        } else {
            state.buckets.insert(
                bucket.to_string(),
                MockBucket {
                    creation_date: SystemTime::now(),
                    objects: BTreeMap::new(),
                },
            );
            Ok(())
        };

        Box::pin(future::ready(res))
    }

    fn delete_bucket<'a>(&'a self, bucket: &'a str) -> StorageFuture<'a, ()> {
        let mut state = self.lock();
        let res = match state.buckets.get(bucket).map(|b| b.objects.is_empty()) {
            None => Err(no_such_bucket(bucket)),
            Some(false) => Err(StorageError::new(
                ErrorKind::Conflict,
                "BucketNotEmpty: The bucket you tried to delete is not empty",
            )),
            Some(true) => {
                state.buckets.remove(bucket);
                Ok(())
            }
        };

        Box::pin(future::ready(res))
    }

    fn put_object<'a>(
        &'a self,
        bucket: &'a str,
        key: &'a str,
        body: Bytes,
    ) -> StorageFuture<'a, ()> {
        let res = match self.lock().buckets.get_mut(bucket) {
            None => Err(no_such_bucket(bucket)),
            Some(b) => {
                b.objects.insert(key.to_string(), body);
                Ok(())
            }
        };

        Box::pin(future::ready(res))
    }

    fn delete_object<'a>(&'a self, bucket: &'a str, key: &'a str) -> StorageFuture<'a, ()> {
        let mut state = self.lock();
        let res = if state.fail_delete_object {
            Err(StorageError::new(ErrorKind::AccessDenied, "AccessDenied: Access Denied"))
        } else {
            match state.buckets.get_mut(bucket) {
                None => Err(no_such_bucket(bucket)),
                // S3 reports success for keys that do not exist.
                Some(b) => {
                    b.objects.remove(key);
                    Ok(())
                }
            }
        };

        Box::pin(future::ready(res))
    }

    fn copy_object<'a>(
        &'a self,
        source: &'a ObjectLocation,
        dest: &'a ObjectLocation,
    ) -> StorageFuture<'a, ()> {
        let mut state = self.lock();
        let body = match state.buckets.get(&source.bucket) {
            None => Err(no_such_bucket(&source.bucket)),
            Some(b) => b.objects.get(&source.key).cloned().ok_or_else(|| {
                StorageError::new(
                    ErrorKind::NotFound,
                    "NoSuchKey: The specified key does not exist.",
                )
            }),
        };

        let res = body.and_then(|body| match state.buckets.get_mut(&dest.bucket) {
            None => Err(no_such_bucket(&dest.bucket)),
            Some(b) => {
                b.objects.insert(dest.key.clone(), body);
                Ok(())
            }
        });

        Box::pin(future::ready(res))
    }
}
