use axum::{
    extract::{multipart::MultipartError, Multipart, Path, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use uuid::Uuid;

use crate::error::AssistantError;
use crate::extract::FileKind;
use crate::models::*;
use crate::service::DocumentService;

type ApiResult<T> = Result<T, (StatusCode, String)>;

// ============================================================
// Error Handling
// ============================================================

/// Map a service error to a status and a client-safe message.
///
/// Rejections of the caller's own input are returned as-is. Anything else is
/// logged in full and reported generically.
fn error_response(e: AssistantError) -> (StatusCode, String) {
    match e {
        AssistantError::SessionNotFound(_) => {
            (StatusCode::NOT_FOUND, "Session not found".to_string())
        }
        AssistantError::UnsupportedFileType(_)
        | AssistantError::InvalidEncoding
        | AssistantError::PdfExtraction(_) => {
            tracing::warn!("Rejected upload: {}", e);
            (StatusCode::BAD_REQUEST, e.to_string())
        }
        AssistantError::Io(_) => {
            tracing::error!("Internal error: {}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal server error".to_string(),
            )
        }
    }
}

fn multipart_error(e: MultipartError) -> (StatusCode, String) {
    tracing::warn!("Malformed upload: {}", e);
    (e.status(), e.body_text())
}

// ============================================================
// Health
// ============================================================

pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ============================================================
// Documents
// ============================================================

/// Accept a `.pdf` or `.txt` file in the multipart field `file`.
pub async fn upload_document(
    State(service): State<DocumentService>,
    mut multipart: Multipart,
) -> ApiResult<(StatusCode, Json<UploadResponse>)> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some("file") {
            continue;
        }

        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or((StatusCode::BAD_REQUEST, "Uploaded file has no filename".to_string()))?;
        // Reject before buffering the body.
        FileKind::from_filename(&filename).map_err(error_response)?;

        let bytes = field.bytes().await.map_err(multipart_error)?;
        return service
            .upload(&filename, bytes.to_vec())
            .await
            .map(|upload| (StatusCode::CREATED, Json(upload)))
            .map_err(error_response);
    }

    Err((
        StatusCode::BAD_REQUEST,
        "Missing multipart field 'file'".to_string(),
    ))
}

pub async fn get_summary(
    State(service): State<DocumentService>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<SummaryResponse>> {
    service.summary(id).map(Json).map_err(error_response)
}

pub async fn get_document(
    State(service): State<DocumentService>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<DocumentResponse>> {
    service.document(id).map(Json).map_err(error_response)
}

// ============================================================
// Questions
// ============================================================

pub async fn ask_question(
    State(service): State<DocumentService>,
    Json(request): Json<AskRequest>,
) -> ApiResult<Json<Answer>> {
    service
        .ask(request.session_id, &request.question)
        .await
        .map(Json)
        .map_err(error_response)
}

pub async fn grade_answer(
    State(service): State<DocumentService>,
    Json(request): Json<GradeRequest>,
) -> ApiResult<Json<AnswerGrade>> {
    service
        .grade_answer(request.session_id, &request.question, &request.user_answer)
        .await
        .map(Json)
        .map_err(error_response)
}

// ============================================================
// Challenge
// ============================================================

/// Generate a fresh question set for the session.
pub async fn get_challenge(
    State(service): State<DocumentService>,
    Path(id): Path<Uuid>,
) -> ApiResult<Json<ChallengeResponse>> {
    service.challenge(id).await.map(Json).map_err(error_response)
}

pub async fn submit_challenge_answers(
    State(service): State<DocumentService>,
    Json(request): Json<ChallengeAnswersRequest>,
) -> ApiResult<Json<ChallengeAnswersRequest>> {
    service
        .submit_answers(request.session_id, request.answers.clone())
        .map_err(error_response)?;
    Ok(Json(request))
}

/// Evaluate supplied answers, or the submitted ones if none are supplied.
pub async fn evaluate_challenge(
    State(service): State<DocumentService>,
    Json(request): Json<ChallengeAnswersRequest>,
) -> ApiResult<Json<ChallengeFeedbackResponse>> {
    service
        .evaluate_challenge(request.session_id, request.answers)
        .await
        .map(Json)
        .map_err(error_response)
}
