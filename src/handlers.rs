//! HTTP routes. Each handler makes one storage call (two for move), queues a
//! flash message with the outcome and redirects to the relevant listing.
//! Storage failures never change the HTTP status.

use std::sync::Arc;

use axum::{
    extract::{multipart::MultipartError, DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use tower_http::trace::TraceLayer;
use tracing::{error, info, instrument, warn};

use crate::{
    adapters::Storage,
    config::Config,
    flash::{Flash, FlashSigner},
    model::{
        error::{ErrorKind, StorageError},
        storage::ObjectLocation,
    },
    util,
    views::{self, BucketListView, ObjectListView},
};

#[derive(Clone)]
pub struct AppState {
    pub storage: Arc<dyn Storage>,
    pub config: Arc<Config>,
    pub flash: FlashSigner,
}

impl AppState {
    pub fn new(storage: Arc<dyn Storage>, config: Arc<Config>) -> anyhow::Result<Self> {
        let flash = FlashSigner::new(config.secret_key.as_bytes())
            .map_err(|err| anyhow::anyhow!("invalid secret key: {}", err))?;

        Ok(Self {
            storage,
            config,
            flash,
        })
    }
}

pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(index))
        .route("/bucket/{bucket}", get(bucket_view))
        .route("/create_bucket", post(create_bucket))
        .route("/delete_bucket/{bucket}", get(delete_bucket))
        .route(
            "/upload/{bucket}",
            post(upload).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/delete/{bucket}/{*key}", get(delete_object))
        .route("/copy", post(copy_object))
        .route("/move", post(move_object))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Rejections for requests that are malformed before any storage call.
#[derive(Debug, thiserror::Error)]
pub enum RequestError {
    #[error("missing form field: {0}")]
    MissingField(&'static str),
    #[error(transparent)]
    Multipart(#[from] MultipartError),
}

impl IntoResponse for RequestError {
    fn into_response(self) -> Response {
        match self {
            RequestError::MissingField(_) => {
                (StatusCode::BAD_REQUEST, self.to_string()).into_response()
            }
            RequestError::Multipart(err) => err.into_response(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CreateBucketForm {
    pub bucket_name: String,
}

#[derive(Debug, Deserialize)]
pub struct TransferForm {
    pub source_bucket: String,
    pub source_key: String,
    pub dest_bucket: String,
    pub dest_key: String,
}

impl TransferForm {
    fn source(&self) -> ObjectLocation {
        ObjectLocation::new(&self.source_bucket, &self.source_key)
    }

    fn dest(&self) -> ObjectLocation {
        ObjectLocation::new(&self.dest_bucket, &self.dest_key)
    }
}

#[instrument(skip_all)]
async fn index(State(state): State<AppState>, headers: HeaderMap) -> Response {
    info!("called");

    let mut flashes = state.flash.read(&headers);
    let buckets = match state.storage.list_buckets().await {
        Err(err) => {
            error!(error_message=%err, error_kind=%err.kind, error_group="list_buckets");
            flashes.push(Flash::error(&err));
            Vec::new()
        }
        Ok(buckets) => buckets,
    };

    let view = BucketListView::new(buckets, flashes);
    ([(header::SET_COOKIE, state.flash.clear())], views::render_template(&view)).into_response()
}

#[instrument(skip_all, fields(bucket = %bucket))]
async fn bucket_view(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    headers: HeaderMap,
) -> Response {
    info!("called");

    let mut flashes = state.flash.read(&headers);
    let objects = match state.storage.list_objects(&bucket).await {
        Err(err) => {
            error!(error_message=%err, error_kind=%err.kind, error_group="list_objects");
            flashes.push(Flash::error(&err));
            Vec::new()
        }
        Ok(objects) => objects,
    };

    let view = ObjectListView::new(&bucket, objects, flashes);
    ([(header::SET_COOKIE, state.flash.clear())], views::render_template(&view)).into_response()
}

#[instrument(skip_all, fields(bucket = %form.bucket_name))]
async fn create_bucket(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<CreateBucketForm>,
) -> Response {
    info!(region = %state.config.region, "called");

    let res = state
        .storage
        .create_bucket(&form.bucket_name, &state.config.region)
        .await;

    let flash = outcome(res, "create_bucket", || {
        format!("Bucket {} created!", form.bucket_name)
    });
    redirect_with_flash(&state, &headers, flash, "/")
}

#[instrument(skip_all, fields(bucket = %bucket))]
async fn delete_bucket(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    headers: HeaderMap,
) -> Response {
    info!("called");

    let res = state.storage.delete_bucket(&bucket).await;

    let flash = outcome(res, "delete_bucket", || format!("Bucket {} deleted!", bucket));
    redirect_with_flash(&state, &headers, flash, "/")
}

#[instrument(skip_all, fields(bucket = %bucket))]
async fn upload(
    State(state): State<AppState>,
    Path(bucket): Path<String>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<Response, RequestError> {
    info!("called");

    let mut upload = None;
    while let Some(field) = multipart.next_field().await? {
        if field.name() == Some("file") {
            let filename = field.file_name().unwrap_or("").to_string();
            let body = field.bytes().await?;
            upload = Some((filename, body));
            break;
        }
    }

    let (filename, body) = upload.ok_or(RequestError::MissingField("file"))?;
    let target = views::bucket_path(&bucket);

    // A file input submitted without a selection carries an empty filename.
    if filename.is_empty() {
        warn!("no file selected");
        return Ok(Redirect::to(&target).into_response());
    }

    let key = util::object::secure_filename(&filename);
    info!(filename = %filename, key = %key, size = body.len(), "sanitized");

    let res = if key.is_empty() {
        Err(StorageError::new(
            ErrorKind::InvalidInput,
            format!("filename {:?} has no usable characters", filename),
        ))
    } else {
        state.storage.put_object(&bucket, &key, body).await
    };

    let flash = outcome(res, "put_object", || format!("File {} uploaded!", key));
    Ok(redirect_with_flash(&state, &headers, flash, &target))
}

#[instrument(skip_all, fields(bucket = %bucket, key = %key))]
async fn delete_object(
    State(state): State<AppState>,
    Path((bucket, key)): Path<(String, String)>,
    headers: HeaderMap,
) -> Response {
    info!("called");

    let res = state.storage.delete_object(&bucket, &key).await;

    let flash = outcome(res, "delete_object", || format!("File {} deleted!", key));
    redirect_with_flash(&state, &headers, flash, &views::bucket_path(&bucket))
}

#[instrument(skip_all, fields(source = %form.source(), dest = %form.dest()))]
async fn copy_object(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<TransferForm>,
) -> Response {
    info!("called");

    let res = state
        .storage
        .copy_object(&form.source(), &form.dest())
        .await;

    let flash = outcome(res, "copy_object", || {
        format!("Copied {} \u{2192} {}", form.source_key, form.dest())
    });
    redirect_with_flash(&state, &headers, flash, &views::bucket_path(&form.source_bucket))
}

/// Copy followed by delete of the source. The delete only runs after a
/// successful copy; if it fails the object is left in both places.
#[instrument(skip_all, fields(source = %form.source(), dest = %form.dest()))]
async fn move_object(
    State(state): State<AppState>,
    headers: HeaderMap,
    Form(form): Form<TransferForm>,
) -> Response {
    info!("called");

    let source = form.source();
    let res = match state.storage.copy_object(&source, &form.dest()).await {
        Err(err) => Err(err),
        Ok(()) => {
            let res = state
                .storage
                .delete_object(&source.bucket, &source.key)
                .await;
            if res.is_err() {
                warn!("source left in place after copy");
            }
            res
        }
    };

    let flash = outcome(res, "move_object", || {
        format!("Moved {} \u{2192} {}", form.source_key, form.dest())
    });
    redirect_with_flash(&state, &headers, flash, &views::bucket_path(&form.source_bucket))
}

fn outcome(
    res: Result<(), StorageError>,
    error_group: &str,
    success: impl FnOnce() -> String,
) -> Flash {
    match res {
        Err(err) => {
            error!(error_message=%err, error_kind=%err.kind, error_group=error_group);
            Flash::error(&err)
        }
        Ok(()) => Flash::success(success()),
    }
}

fn redirect_with_flash(
    state: &AppState,
    headers: &HeaderMap,
    flash: Flash,
    target: &str,
) -> Response {
    let mut flashes = state.flash.read(headers);
    flashes.push(flash);

    (
        [(header::SET_COOKIE, state.flash.store(&flashes))],
        Redirect::to(target),
    )
        .into_response()
}
