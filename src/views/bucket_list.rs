use askama::Template;

use crate::{flash::Flash, model::storage::Bucket, views};

#[derive(Clone, Debug)]
pub struct BucketRow {
    pub name: String,
    pub created: String,
    pub open_url: String,
    pub delete_url: String,
}

impl From<Bucket> for BucketRow {
    fn from(bucket: Bucket) -> Self {
        Self {
            open_url: views::bucket_path(&bucket.name),
            delete_url: format!("/delete_bucket/{}", urlencoding::encode(&bucket.name)),
            created: views::format_time(bucket.creation_date),
            name: bucket.name,
        }
    }
}

/// The bucket index page.
#[derive(Template)]
#[template(path = "index.html")]
pub struct BucketListView {
    pub buckets: Vec<BucketRow>,
    pub flashes: Vec<views::FlashRow>,
}

impl BucketListView {
    pub fn new(buckets: Vec<Bucket>, flashes: Vec<Flash>) -> Self {
        Self {
            buckets: buckets.into_iter().map(BucketRow::from).collect(),
            flashes: flashes.into_iter().map(views::FlashRow::from).collect(),
        }
    }
}
