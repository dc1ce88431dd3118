//! Upload, private redemption and customer views.

use axum::extract::multipart::MultipartRejection;
use axum::extract::{Multipart, Path, State};
use axum::http::header::{CONTENT_DISPOSITION, CONTENT_TYPE};
use axum::http::{HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;
use qprint_core::application::UploadRequest;
use qprint_core::domain::PrintJob;
use qprint_core::error::AppError;
use tracing::debug;

use crate::error::ApiError;
use crate::extract::AuthUser;
use crate::state::AppState;
use crate::types::{ConfirmResponse, MyFileItem, StatusResponse, UploadResponse};

fn multipart_error(err: axum::extract::multipart::MultipartError) -> ApiError {
    AppError::Validation(format!("malformed multipart body: {}", err.body_text())).into()
}

/// Collect the upload form into an `UploadRequest`. Unknown fields are ignored.
async fn read_upload_form(mut multipart: Multipart) -> Result<UploadRequest, ApiError> {
    let mut req = UploadRequest::default();
    let mut saw_file = false;

    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        let name = field.name().unwrap_or_default().to_string();
        match name.as_str() {
            "file" => {
                req.file_name = field.file_name().unwrap_or_default().to_string();
                req.data = field.bytes().await.map_err(multipart_error)?.to_vec();
                saw_file = true;
            }
            "print_type" | "copies" | "print_mode" | "color_mode" | "paper_size" | "shop_id" => {
                let value = Some(field.text().await.map_err(multipart_error)?);
                match name.as_str() {
                    "print_type" => req.print_type = value,
                    "copies" => req.copies = value,
                    "print_mode" => req.print_mode = value,
                    "color_mode" => req.color_mode = value,
                    "paper_size" => req.paper_size = value,
                    _ => req.shop_id = value,
                }
            }
            other => debug!(field = other, "Ignoring unknown upload field"),
        }
    }

    if !saw_file {
        return Err(AppError::Validation("file is required".to_string()).into());
    }
    Ok(req)
}

/// Raw document bytes as an attachment named after the original upload
pub(crate) fn attachment(job: &PrintJob, data: Vec<u8>) -> Response {
    let file_name = job.original_name.replace(['"', '\\'], "_");
    let disposition = HeaderValue::from_str(&format!("attachment; filename=\"{}\"", file_name))
        .unwrap_or_else(|_| HeaderValue::from_static("attachment"));
    let content_type = if file_name.to_ascii_lowercase().ends_with(".pdf") {
        "application/pdf"
    } else {
        "application/octet-stream"
    };

    (
        StatusCode::OK,
        [
            (CONTENT_TYPE, HeaderValue::from_static(content_type)),
            (CONTENT_DISPOSITION, disposition),
        ],
        data,
    )
        .into_response()
}

/// POST /upload
pub async fn upload(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<(StatusCode, Json<UploadResponse>), ApiError> {
    let req = read_upload_form(multipart?).await?;
    let job = state.uploads().upload(&identity, req).await?;
    Ok((StatusCode::CREATED, Json(UploadResponse::from(&job))))
}

/// GET /file/{code}
pub async fn redeem(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(code): Path<String>,
) -> Result<Response, ApiError> {
    let (job, data) = state.lifecycle().redeem_private(&identity, &code).await?;
    Ok(attachment(&job, data))
}

/// GET /file/{code}/status
pub async fn status(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> Result<Json<StatusResponse>, ApiError> {
    let job = state.lifecycle().status(&code).await?;
    Ok(Json(StatusResponse::from(&job)))
}

/// POST /file/{code}/confirm
pub async fn confirm(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
    Path(code): Path<String>,
) -> Result<Json<ConfirmResponse>, ApiError> {
    let job = state.lifecycle().confirm_private(&identity, &code).await?;
    Ok(Json(ConfirmResponse::from(&job)))
}

/// GET /my-files
pub async fn my_files(
    State(state): State<AppState>,
    AuthUser(identity): AuthUser,
) -> Result<Json<Vec<MyFileItem>>, ApiError> {
    let files = state.reports().my_files(&identity).await?;
    Ok(Json(files.into_iter().map(MyFileItem::from).collect()))
}
