use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use photoguess::api;
use photoguess::auth::{AuthConfig, Credential};
use photoguess::config::ServerConfig;
use photoguess::content::{ContentStore, FsContentStore, MemoryContentStore};
use photoguess::error::GameError;
use photoguess::state::store::StateStore;
use photoguess::state::AppState;
use photoguess::types::{Ballot, GamePhase, GameState, PhotoUpload};
use serde_json::{json, Value};
use std::sync::Arc;
use tower::ServiceExt;

const PASSWORD: &str = "party-time";

fn auth() -> AuthConfig {
    AuthConfig::new(vec![Credential::Rotating(PASSWORD.to_string())])
}

fn jpeg(name: &str) -> PhotoUpload {
    PhotoUpload {
        file_name: name.to_string(),
        bytes: vec![0xFF, 0xD8, 0xFF, 0xE0],
    }
}

/// End-to-end integration test for a complete game flow
#[tokio::test]
async fn test_full_game_flow() {
    let content = Arc::new(MemoryContentStore::new());
    let state = AppState::new(
        StateStore::in_memory(),
        GameState::new(),
        content.clone(),
        auth(),
    );

    // 1. Collection: three players upload
    for name in ["Alice", "Bob", "Dave"] {
        state
            .submit_photo(name, Some(jpeg(&format!("{}.jpg", name))))
            .await
            .expect("upload should succeed");
    }
    assert_eq!(content.len().await, 3);
    assert_eq!(state.status().await.photo_count, 3);

    // 2. Host opens voting
    assert!(matches!(
        state.start_voting(None).await,
        Err(GameError::Authorization)
    ));
    let token = state.login(PASSWORD).await.expect("login should succeed");
    state.start_voting(Some(&token)).await.unwrap();
    assert_eq!(state.status().await.phase, GamePhase::Voting);

    // 3. Voting sheet hides submitters, ballots come in
    let sheet = state.voting_sheet().await;
    assert!(sheet.voting_enabled);
    assert_eq!(sheet.candidates, vec!["Alice", "Bob", "Dave"]);

    let photos = state.snapshot().await.photos;
    let perfect: Ballot = photos
        .iter()
        .map(|p| (p.id.clone(), p.submitter.clone()))
        .collect();
    let half: Ballot = photos
        .iter()
        .map(|p| (p.id.clone(), "Alice".to_string()))
        .collect();

    state.submit_ballot("Carol", half).await.unwrap();
    let accepted = state.submit_ballot("Erin", perfect).await.unwrap();
    assert_eq!(accepted.voters_count, 2);

    // 4. Nothing revealed yet: participants see photos but no guesses
    let view = state.participant_results().await;
    assert!(!view.waiting_for_voting);
    assert_eq!(view.revealed_count, 0);
    assert!(view.photos.iter().all(|p| p.correct_guessers.is_empty()));

    // 5. Host reveals one photo
    state.reveal(Some(&token), &photos[0].id).await.unwrap();
    let view = state.participant_results().await;
    assert_eq!(view.revealed_count, 1);
    assert_eq!(view.photos[0].correct_guessers, vec!["Carol", "Erin"]);

    // 6. Results: Erin wins with all three, Carol got one
    let results = state.view_results().await.unwrap();
    assert_eq!(state.status().await.phase, GamePhase::Results);
    assert_eq!(results.winner.as_deref(), Some("Erin"));
    assert_eq!(results.scores[0].percentage, 100.0);
    assert_eq!(results.scores[1].voter, "Carol");
    assert_eq!(results.scores[1].correct, 1);
    assert_eq!(results.scores[1].percentage, 33.3);

    // Late ballots bounce once voting is paused
    state.disable_voting(Some(&token)).await.unwrap();
    assert!(matches!(
        state.submit_ballot("Frank", Ballot::new()).await,
        Err(GameError::VotingClosed)
    ));

    // 7. Restart wipes the document and the stored photos
    let removed = state.restart(Some(&token)).await.unwrap();
    assert_eq!(removed, 3);
    assert!(content.is_empty().await);

    let game = state.snapshot().await;
    assert_eq!(game.phase, GamePhase::Collection);
    assert!(game.photos.is_empty());
    assert!(game.votes.is_empty());

    // Host session survives a restart
    assert!(state.is_authorized(Some(&token)).await);
}

#[tokio::test]
async fn test_game_survives_server_restart() {
    let dir = tempfile::tempdir().unwrap();
    let data_file = dir.path().join("data").join("game_data.json");
    let content = Arc::new(FsContentStore::new(dir.path().join("uploads")));

    let state = AppState::open(StateStore::file(&data_file), content.clone(), auth())
        .await
        .unwrap();
    state.submit_photo("Alice", Some(jpeg("a.jpg"))).await.unwrap();
    state.submit_photo("Bob", Some(jpeg("b.jpg"))).await.unwrap();
    let token = state.login(PASSWORD).await.unwrap();
    state.start_voting(Some(&token)).await.unwrap();
    drop(state);

    let state = AppState::open(StateStore::file(&data_file), content.clone(), auth())
        .await
        .unwrap();
    let game = state.snapshot().await;
    assert_eq!(game.phase, GamePhase::Voting);
    assert!(game.voting_enabled);
    assert_eq!(game.photos.len(), 2);
    assert!(content.path(&game.photos[0].filename).exists());

    // Sessions are not persisted
    assert!(!state.is_authorized(Some(&token)).await);
}

// ========== HTTP ==========

struct TestServer {
    app: Router,
    state: Arc<AppState>,
    _dir: tempfile::TempDir,
}

fn server() -> TestServer {
    let dir = tempfile::tempdir().unwrap();
    let config = ServerConfig {
        upload_dir: dir.path().to_path_buf(),
        ..ServerConfig::default()
    };
    let state = Arc::new(AppState::new(
        StateStore::in_memory(),
        GameState::new(),
        Arc::new(FsContentStore::new(dir.path())),
        auth(),
    ));
    TestServer {
        app: api::router(state.clone(), &config),
        state,
        _dir: dir,
    }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, axum::http::HeaderMap, Vec<u8>) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let headers = response.headers().clone();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, headers, body.to_vec())
}

fn json_request(method: &str, uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method("GET").uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn multipart_upload(name: &str, file_name: &str, bytes: &[u8]) -> Request<Body> {
    let boundary = "XPHOTOBOUNDARYX";
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{b}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n\
             --{b}\r\nContent-Disposition: form-data; name=\"photo\"; filename=\"{file_name}\"\r\n\
             Content-Type: image/jpeg\r\n\r\n",
            b = boundary,
            name = name,
            file_name = file_name,
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{}--\r\n", boundary).as_bytes());

    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

fn parse(body: &[u8]) -> Value {
    serde_json::from_slice(body).unwrap()
}

async fn login(app: &Router) -> String {
    let (status, headers, _) = send(
        app,
        json_request("POST", "/admin", None, json!({ "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    let set_cookie = headers[header::SET_COOKIE].to_str().unwrap();
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn test_http_status() {
    let server = server();
    let (status, _, body) = send(&server.app, get("/api/status", None)).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        parse(&body),
        json!({
            "voting_enabled": false,
            "phase": "collection",
            "photo_count": 0,
            "voters_count": 0,
        })
    );
}

#[tokio::test]
async fn test_http_upload_and_serve_photo() {
    let server = server();
    let bytes = [0xFF, 0xD8, 0xFF, 0xE0, 0x01, 0x02];

    let (status, _, body) = send(&server.app, multipart_upload("Alice", "beach.jpg", &bytes)).await;
    assert_eq!(status, StatusCode::OK);
    let body = parse(&body);
    assert_eq!(body["success"], true);
    assert_eq!(body["photo_count"], 1);

    let filename = server.state.snapshot().await.photos[0].filename.clone();
    let (status, _, served) = send(&server.app, get(&format!("/uploads/{}", filename), None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(served, bytes);

    // Same name again
    let (status, _, body) = send(&server.app, multipart_upload("Alice", "again.jpg", &bytes)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body)["code"], "DUPLICATE_SUBMITTER");
}

#[tokio::test]
async fn test_http_host_routes_need_session() {
    let server = server();

    let (status, _, body) = send(
        &server.app,
        json_request("POST", "/start_voting", None, json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let body = parse(&body);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "UNAUTHORIZED");

    let (status, _, _) = send(&server.app, get("/admin", Some("host_session=forged"))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, _, body) = send(
        &server.app,
        json_request("POST", "/admin", None, json!({ "password": "nope" })),
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(parse(&body)["error"], "Incorrect password");
}

#[tokio::test]
async fn test_http_voting_round() {
    let server = server();
    for name in ["Alice", "Bob"] {
        server
            .state
            .submit_photo(name, Some(jpeg("p.jpg")))
            .await
            .unwrap();
    }
    let cookie = login(&server.app).await;

    let (status, _, _) = send(
        &server.app,
        json_request("POST", "/start_voting", Some(&cookie), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    // Ballot built from the voting sheet
    let (_, _, body) = send(&server.app, get("/voting", None)).await;
    let sheet = parse(&body);
    assert_eq!(sheet["candidates"], json!(["Alice", "Bob"]));
    assert!(sheet["photos"][0].get("submitter").is_none());

    let photos = server.state.snapshot().await.photos;
    let votes: serde_json::Map<String, Value> = photos
        .iter()
        .map(|p| (p.id.clone(), json!("Alice")))
        .collect();
    let ballot = json!({ "voter_name": "Carol", "votes": votes });

    let (status, _, body) = send(
        &server.app,
        json_request("POST", "/submit_vote", None, ballot.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["voters_count"], 1);

    let (status, _, body) = send(
        &server.app,
        json_request("POST", "/submit_vote", None, ballot),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body)["code"], "DUPLICATE_VOTER");

    // Reveal an unknown photo
    let (status, _, body) = send(
        &server.app,
        json_request(
            "POST",
            "/reveal_photo",
            Some(&cookie),
            json!({ "photo_id": "missing" }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(parse(&body)["code"], "NOT_FOUND");

    // Host results leave the phase alone, public results end voting
    let (status, _, body) = send(&server.app, get("/admin/results", Some(&cookie))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["scores"][0]["percentage"], 50.0);
    assert_eq!(server.state.status().await.phase, GamePhase::Voting);

    let (status, _, body) = send(&server.app, get("/results", None)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(parse(&body)["winner"], "Carol");
    assert_eq!(server.state.status().await.phase, GamePhase::Results);

    // Logging out ends the session
    let (status, headers, _) = send(
        &server.app,
        json_request("POST", "/admin/logout", Some(&cookie), json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert!(headers[header::SET_COOKIE]
        .to_str()
        .unwrap()
        .contains("Max-Age=0"));

    let (status, _, _) = send(&server.app, get("/admin", Some(&cookie))).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
}

fn multipart_name_only(name: &str) -> Request<Body> {
    let boundary = "XPHOTOBOUNDARYX";
    let body = format!(
        "--{b}\r\nContent-Disposition: form-data; name=\"name\"\r\n\r\n{name}\r\n--{b}--\r\n",
        b = boundary,
        name = name,
    );
    Request::builder()
        .method("POST")
        .uri("/upload")
        .header(
            header::CONTENT_TYPE,
            format!("multipart/form-data; boundary={}", boundary),
        )
        .body(Body::from(body))
        .unwrap()
}

#[tokio::test]
async fn test_http_upload_without_file() {
    let server = server();

    let (status, _, body) = send(&server.app, multipart_name_only("Alice")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    let body = parse(&body);
    assert_eq!(body["code"], "VALIDATION");
    assert_eq!(body["error"], "No picture file provided");

    // Once collection is over the phase is reported first
    for name in ["Alice", "Bob"] {
        server
            .state
            .submit_photo(name, Some(jpeg("p.jpg")))
            .await
            .unwrap();
    }
    let cookie = login(&server.app).await;
    send(
        &server.app,
        json_request("POST", "/start_voting", Some(&cookie), json!({})),
    )
    .await;

    let (status, _, body) = send(&server.app, multipart_name_only("Carol")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(parse(&body)["code"], "PHASE_CLOSED");
}

#[tokio::test]
async fn test_http_malformed_bodies_use_error_shape() {
    let server = server();

    // Wrong type for `votes`
    let (status, _, body) = send(
        &server.app,
        json_request(
            "POST",
            "/submit_vote",
            None,
            json!({ "voter_name": "Carol", "votes": 42 }),
        ),
    )
    .await;
    assert!(status.is_client_error());
    let body = parse(&body);
    assert_eq!(body["success"], false);
    assert_eq!(body["code"], "VALIDATION");

    // Missing content type
    let request = Request::builder()
        .method("POST")
        .uri("/reveal_photo")
        .body(Body::from("{}"))
        .unwrap();
    let (status, _, body) = send(&server.app, request).await;
    assert!(status.is_client_error());
    assert_eq!(parse(&body)["code"], "VALIDATION");

    // Upload that is not multipart at all
    let (status, _, body) = send(
        &server.app,
        json_request("POST", "/upload", None, json!({ "name": "Alice" })),
    )
    .await;
    assert!(status.is_client_error());
    assert_eq!(parse(&body)["code"], "VALIDATION");
}
