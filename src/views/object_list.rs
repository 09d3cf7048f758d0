use askama::Template;

use crate::{flash::Flash, model::storage::ObjectEntry, views};

#[derive(Clone, Debug)]
pub struct ObjectRow {
    pub key: String,
    pub size: i64,
    pub size_text: String,
    pub modified: String,
    pub delete_url: String,
}

impl ObjectRow {
    fn new(bucket: &str, entry: ObjectEntry) -> Self {
        Self {
            delete_url: format!(
                "/delete/{}/{}",
                urlencoding::encode(bucket),
                views::encode_key(&entry.key)
            ),
            size_text: views::format_size(entry.size),
            modified: views::format_time(entry.modified_time),
            size: entry.size,
            key: entry.key,
        }
    }
}

/// The object listing of one bucket.
#[derive(Template)]
#[template(path = "bucket.html")]
pub struct ObjectListView {
    pub bucket: String,
    pub upload_url: String,
    pub objects: Vec<ObjectRow>,
    pub flashes: Vec<views::FlashRow>,
}

impl ObjectListView {
    pub fn new(bucket: &str, objects: Vec<ObjectEntry>, flashes: Vec<Flash>) -> Self {
        Self {
            bucket: bucket.to_string(),
            upload_url: format!("/upload/{}", urlencoding::encode(bucket)),
            objects: objects
                .into_iter()
                .map(|entry| ObjectRow::new(bucket, entry))
                .collect(),
            flashes: flashes.into_iter().map(views::FlashRow::from).collect(),
        }
    }
}
