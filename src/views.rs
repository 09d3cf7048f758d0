//! View models for the two HTML pages.
//!
//! Handlers hand storage data to a view, the view turns it into display
//! rows (formatted dates, sizes, escaped URLs) and askama renders it.

use std::time::SystemTime;

use askama::Template;
use axum::{
    http::StatusCode,
    response::{Html, IntoResponse, Response},
};
use time::{macros::format_description, OffsetDateTime};
use tracing::error;

use crate::flash::{Flash, Level};

pub mod bucket_list;
pub mod object_list;

pub use bucket_list::BucketListView;
pub use object_list::ObjectListView;

/// A queued status message as shown on the page.
#[derive(Clone, Debug)]
pub struct FlashRow {
    pub css_class: &'static str,
    pub icon: &'static str,
    pub message: String,
    pub kind: String,
}

impl From<Flash> for FlashRow {
    fn from(flash: Flash) -> Self {
        let (css_class, icon) = match flash.level {
            Level::Success => ("flash-success", "\u{2705}"),
            Level::Error => ("flash-error", "\u{274c}"),
        };

        Self {
            css_class,
            icon,
            message: flash.message,
            kind: flash.kind.map(|k| k.to_string()).unwrap_or_default(),
        }
    }
}

/// Renders `template` into an HTML response; a render failure becomes a 500.
pub fn render_template<T: Template>(template: &T) -> Response {
    match template.render() {
        Ok(html) => Html(html).into_response(),
        Err(err) => {
            error!(error_message=%err, error_group="render_template");
            (StatusCode::INTERNAL_SERVER_ERROR, "template rendering error").into_response()
        }
    }
}

pub fn format_time(time: Option<SystemTime>) -> String {
    let format = format_description!("[year]-[month]-[day] [hour]:[minute]:[second]");

    time.and_then(|t| OffsetDateTime::from(t).format(format).ok())
        .map(|s| format!("{} UTC", s))
        .unwrap_or_else(|| "-".to_string())
}

pub fn format_size(size: i64) -> String {
    const UNITS: [&str; 5] = ["KiB", "MiB", "GiB", "TiB", "PiB"];

    if size < 1024 {
        return format!("{} B", size);
    }

    let mut value = size as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    format!("{:.1} {}", value, UNITS[unit])
}

/// Path for a bucket's object listing.
pub fn bucket_path(bucket: &str) -> String {
    format!("/bucket/{}", urlencoding::encode(bucket))
}

/// Percent-encodes each `/`-separated segment of an object key.
pub fn encode_key(key: &str) -> String {
    key.split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/")
}
