use std::sync::Arc;

use axum::{
    Json, Router,
    body::Bytes,
    extract::{DefaultBodyLimit, FromRequest, Multipart, Path, Request, State, multipart::MultipartError},
    routing::{delete, post},
};
use http::StatusCode;

use crate::{attachment::Attachment, error::FileError, service::FileService};

/// Room left in the request body limit for multipart boundaries and the other form fields
const FORM_OVERHEAD_BYTES: usize = 64 << 10;

/// Name used when the `file` field carries no file name
const DEFAULT_FILE_NAME: &str = "upload";

/// Create the endpoint router for file uploads and deletion
pub fn endpoint_router(max_upload_bytes: usize) -> Router<Arc<FileService>> {
    Router::new()
        .route(
            "/v1/files",
            post(upload).layer(DefaultBodyLimit::max(max_upload_bytes.saturating_add(FORM_OVERHEAD_BYTES))),
        )
        .route("/v1/files/{conversation_id}/{file_id}", delete(delete_file))
        .route("/v1/conversations/{conversation_id}/files", delete(delete_conversation_files))
}

/// Multipart upload form: a `file` part and a `conversation_id` field
struct UploadForm {
    conversation_id: String,
    file_name: String,
    bytes: Bytes,
}

impl FromRequest<Arc<FileService>> for UploadForm {
    type Rejection = FileError;

    async fn from_request(request: Request, files: &Arc<FileService>) -> Result<Self, Self::Rejection> {
        let limit = files.max_upload_bytes();
        let to_error = |e: MultipartError| {
            if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
                FileError::PayloadTooLarge { limit }
            } else {
                FileError::Validation(format!("invalid multipart form: {}", e.body_text()))
            }
        };

        let mut multipart = Multipart::from_request(request, files)
            .await
            .map_err(|e| FileError::Validation(e.body_text()))?;

        let mut conversation_id = None;
        let mut file = None;

        while let Some(field) = multipart.next_field().await.map_err(to_error)? {
            let field_name = field.name().unwrap_or_default().to_owned();

            match field_name.as_str() {
                "file" => {
                    let file_name = field
                        .file_name()
                        .filter(|name| !name.is_empty())
                        .unwrap_or(DEFAULT_FILE_NAME)
                        .to_owned();
                    let bytes = field.bytes().await.map_err(to_error)?;
                    file = Some((file_name, bytes));
                }
                "conversation_id" | "conversationId" => {
                    conversation_id = Some(field.text().await.map_err(to_error)?);
                }
                _ => {
                    // Skip unknown fields
                }
            }
        }

        let (file_name, bytes) =
            file.ok_or_else(|| FileError::Validation("missing required 'file' field in multipart form".to_owned()))?;
        let conversation_id = conversation_id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| FileError::Validation("missing required 'conversation_id' field".to_owned()))?;

        Ok(Self {
            conversation_id,
            file_name,
            bytes,
        })
    }
}

async fn upload(State(files): State<Arc<FileService>>, form: UploadForm) -> Result<Json<Attachment>, FileError> {
    tracing::debug!(
        conversation = %form.conversation_id,
        name = %form.file_name,
        size = form.bytes.len(),
        "file upload received"
    );

    let attachment = files.upload(&form.conversation_id, &form.file_name, &form.bytes).await?;

    Ok(Json(attachment))
}

async fn delete_file(
    State(files): State<Arc<FileService>>,
    Path((conversation_id, file_id)): Path<(String, String)>,
) -> Result<StatusCode, FileError> {
    files.delete(&conversation_id, &file_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_conversation_files(
    State(files): State<Arc<FileService>>,
    Path(conversation_id): Path<String>,
) -> Result<StatusCode, FileError> {
    files.delete_conversation(&conversation_id).await?;
    Ok(StatusCode::NO_CONTENT)
}
