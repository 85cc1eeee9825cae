// handlers/bootcamps/photo.rs - PUT /api/v1/bootcamps/:id/photo

use axum::extract::{Extension, Multipart, Path, State};
use serde_json::{Map, Value};

use crate::error::ApiError;
use crate::handlers::load_bootcamp;
use crate::middleware::{ApiResponse, ApiResult, CurrentUser};
use crate::policy::ensure_can_mutate;
use crate::services::uploads::{save_photo, UploadError, UploadedFile};
use crate::state::AppState;

const FILE_FIELD: &str = "file";

/// Stores the multipart `file` part as the bootcamp photo and returns the
/// stored file name.
pub async fn upload_photo(
    State(state): State<AppState>,
    Extension(current): Extension<CurrentUser>,
    Path(id): Path<String>,
    multipart: Multipart,
) -> ApiResult<String> {
    let bootcamp = load_bootcamp(&state, &id).await?;
    ensure_can_mutate(&current, &bootcamp, "update")?;

    let file = read_file_field(multipart).await?.ok_or(UploadError::MissingFile)?;
    let name = save_photo(&state.config.upload, bootcamp.id, &file).await?;

    let fields = Map::from_iter([("photo".to_string(), Value::String(name.clone()))]);
    state.bootcamps().update_fields(bootcamp.id, fields).await?;
    Ok(ApiResponse::success(name))
}

async fn read_file_field(mut multipart: Multipart) -> Result<Option<UploadedFile>, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::bad_request(e.body_text()))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field.bytes().await.map_err(|e| ApiError::bad_request(e.body_text()))?;
        return Ok(Some(UploadedFile { file_name, content_type, bytes: bytes.to_vec() }));
    }
    Ok(None)
}
