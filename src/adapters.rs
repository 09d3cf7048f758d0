use bytes::Bytes;
use futures::future::BoxFuture;

use crate::model::{
    error::StorageError,
    storage::{Bucket, ObjectEntry, ObjectLocation},
};

#[cfg(test)]
pub mod mock;
pub mod s3;

pub type StorageFuture<'a, T> = BoxFuture<'a, Result<T, StorageError>>;

/// Operations the web front-end performs against the object store.
///
/// Every call maps onto exactly one remote request; nothing is cached or
/// retried, and failures are reported as they come back.
pub trait Storage: Send + Sync {
    fn list_buckets(&self) -> StorageFuture<'_, Vec<Bucket>>;

    /// First page of the bucket's objects.
    fn list_objects<'a>(&'a self, bucket: &'a str) -> StorageFuture<'a, Vec<ObjectEntry>>;

    fn create_bucket<'a>(&'a self, bucket: &'a str, region: &'a str) -> StorageFuture<'a, ()>;

    fn delete_bucket<'a>(&'a self, bucket: &'a str) -> StorageFuture<'a, ()>;

    fn put_object<'a>(&'a self, bucket: &'a str, key: &'a str, body: Bytes)
        -> StorageFuture<'a, ()>;

    fn delete_object<'a>(&'a self, bucket: &'a str, key: &'a str) -> StorageFuture<'a, ()>;

    fn copy_object<'a>(
        &'a self,
        source: &'a ObjectLocation,
        dest: &'a ObjectLocation,
    ) -> StorageFuture<'a, ()>;
}
