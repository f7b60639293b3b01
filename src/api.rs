//! HTTP API endpoints.
//!
//! Participants upload, vote and look at results without logging in. Host
//! endpoints need the session cookie handed out by `POST /admin`.

use axum::{
    extract::{
        multipart::MultipartRejection,
        rejection::JsonRejection,
        DefaultBodyLimit, Multipart, State,
    },
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde_json::json;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, services::ServeDir, trace::TraceLayer};

use crate::auth::{clear_session_cookie, session_cookie, session_from_headers};
use crate::config::ServerConfig;
use crate::error::GameError;
use crate::protocol::*;
use crate::state::AppState;
use crate::types::PhotoUpload;

/// A `GameError` on its way out as a JSON response
#[derive(Debug)]
pub struct ApiError(pub GameError);

impl From<GameError> for ApiError {
    fn from(err: GameError) -> Self {
        Self(err)
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self.0 {
            GameError::Authorization => StatusCode::FORBIDDEN,
            GameError::NotFound(_) => StatusCode::NOT_FOUND,
            GameError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            _ => StatusCode::BAD_REQUEST,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }
        let body = json!({
            "success": false,
            "code": self.0.code(),
            "error": self.0.to_string(),
        });
        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<Json<T>, ApiError>;

/// Unwrap a JSON body, turning extractor rejections into validation errors
fn json_body<T>(payload: Result<Json<T>, JsonRejection>) -> Result<T, ApiError> {
    match payload {
        Ok(Json(body)) => Ok(body),
        Err(rejection) => Err(GameError::Validation(rejection.body_text()).into()),
    }
}

/// All routes, plus the uploaded photos under `/uploads`
pub fn router(state: Arc<AppState>, config: &ServerConfig) -> Router {
    Router::new()
        .route("/api/status", get(status))
        .route("/upload", post(upload_photo))
        .route("/voting", get(voting_sheet))
        .route("/submit_vote", post(submit_vote))
        .route("/results", get(results))
        .route("/user/results", get(user_results))
        .route("/admin", get(admin_dashboard).post(admin_login))
        .route("/admin/logout", post(admin_logout))
        .route("/admin/results", get(admin_results))
        .route("/start_voting", post(start_voting))
        .route("/enable_voting", post(enable_voting))
        .route("/disable_voting", post(disable_voting))
        .route("/restart_game", post(restart_game))
        .route("/reveal_photo", post(reveal_photo))
        .route("/unreveal_photo", post(unreveal_photo))
        .nest_service("/uploads", ServeDir::new(&config.upload_dir))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ========== Participant endpoints ==========

/// GET /api/status
pub async fn status(State(state): State<Arc<AppState>>) -> Json<GameStatus> {
    Json(state.status().await)
}

/// POST /upload
///
/// Multipart form with a `photo` file and the submitter's `name`.
pub async fn upload_photo(
    State(state): State<Arc<AppState>>,
    multipart: Result<Multipart, MultipartRejection>,
) -> ApiResult<UploadResponse> {
    let mut multipart = multipart.map_err(|e| GameError::Validation(e.body_text()))?;
    let mut name = String::new();
    let mut photo: Option<PhotoUpload> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| GameError::Validation(e.body_text()))?
    {
        let field_name = field.name().map(str::to_string);
        match field_name.as_deref() {
            Some("photo") => {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| GameError::Validation(e.body_text()))?;
                photo = Some(PhotoUpload {
                    file_name,
                    bytes: bytes.to_vec(),
                });
            }
            Some("name") => {
                name = field
                    .text()
                    .await
                    .map_err(|e| GameError::Validation(e.body_text()))?;
            }
            _ => {}
        }
    }

    let submitted = state.submit_photo(&name, photo).await?;

    Ok(Json(UploadResponse {
        success: true,
        message: "Picture uploaded successfully!".to_string(),
        photo_count: submitted.photo_count,
    }))
}

/// GET /voting
pub async fn voting_sheet(State(state): State<Arc<AppState>>) -> Json<VotingSheet> {
    Json(state.voting_sheet().await)
}

/// POST /submit_vote
pub async fn submit_vote(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<SubmitVoteRequest>, JsonRejection>,
) -> ApiResult<VoteResponse> {
    let req = json_body(payload)?;
    let accepted = state.submit_ballot(&req.voter_name, req.votes).await?;
    Ok(Json(VoteResponse {
        success: true,
        message: "Votes submitted successfully!".to_string(),
        voters_count: accepted.voters_count,
        redirect: "/user/results".to_string(),
    }))
}

/// GET /results
///
/// Full results. The first call during voting ends the voting phase.
pub async fn results(State(state): State<Arc<AppState>>) -> ApiResult<ResultsView> {
    Ok(Json(state.view_results().await?))
}

/// GET /user/results
pub async fn user_results(State(state): State<Arc<AppState>>) -> Json<ParticipantResults> {
    Json(state.participant_results().await)
}

// ========== Host endpoints ==========

/// POST /admin
pub async fn admin_login(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<LoginRequest>, JsonRejection>,
) -> Response {
    let req = match json_body(payload) {
        Ok(req) => req,
        Err(err) => return err.into_response(),
    };
    match state.login(&req.password).await {
        Ok(token) => (
            [(header::SET_COOKIE, session_cookie(&token))],
            Json(LoginResponse {
                success: true,
                redirect: "/admin".to_string(),
            }),
        )
            .into_response(),
        Err(err) => {
            let body = json!({
                "success": false,
                "code": err.code(),
                "error": "Incorrect password",
            });
            (StatusCode::UNAUTHORIZED, Json(body)).into_response()
        }
    }
}

/// POST /admin/logout
pub async fn admin_logout(State(state): State<Arc<AppState>>, headers: HeaderMap) -> Response {
    let session = session_from_headers(&headers);
    state.logout(session.as_deref()).await;
    (
        [(header::SET_COOKIE, clear_session_cookie())],
        Json(ActionResponse::ok("Logged out")),
    )
        .into_response()
}

/// GET /admin
pub async fn admin_dashboard(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<HostDashboard> {
    let session = session_from_headers(&headers);
    Ok(Json(state.host_dashboard(session.as_deref()).await?))
}

/// GET /admin/results
///
/// Same data as `/results` but never changes the phase.
pub async fn admin_results(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<ResultsView> {
    let session = session_from_headers(&headers);
    Ok(Json(state.host_results(session.as_deref()).await?))
}

pub async fn start_voting(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<ActionResponse> {
    let session = session_from_headers(&headers);
    state.start_voting(session.as_deref()).await?;
    Ok(Json(ActionResponse::ok("Voting phase started")))
}

pub async fn enable_voting(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<ActionResponse> {
    let session = session_from_headers(&headers);
    state.enable_voting(session.as_deref()).await?;
    Ok(Json(ActionResponse::ok("Voting enabled")))
}

pub async fn disable_voting(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<ActionResponse> {
    let session = session_from_headers(&headers);
    state.disable_voting(session.as_deref()).await?;
    Ok(Json(ActionResponse::ok("Voting disabled")))
}

pub async fn restart_game(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> ApiResult<ActionResponse> {
    let session = session_from_headers(&headers);
    let removed = state.restart(session.as_deref()).await?;
    Ok(Json(ActionResponse::ok(format!(
        "Game restarted, {} pictures removed",
        removed
    ))))
}

pub async fn reveal_photo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<PhotoRequest>, JsonRejection>,
) -> ApiResult<ActionResponse> {
    let req = json_body(payload)?;
    let session = session_from_headers(&headers);
    let photo_id = req.photo_id.unwrap_or_default();
    state.reveal(session.as_deref(), &photo_id).await?;
    Ok(Json(ActionResponse::ok("Picture revealed")))
}

pub async fn unreveal_photo(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    payload: Result<Json<PhotoRequest>, JsonRejection>,
) -> ApiResult<ActionResponse> {
    let req = json_body(payload)?;
    let session = session_from_headers(&headers);
    let photo_id = req.photo_id.unwrap_or_default();
    state.unreveal(session.as_deref(), &photo_id).await?;
    Ok(Json(ActionResponse::ok("Picture un-revealed")))
}
