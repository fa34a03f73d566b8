use std::{net::SocketAddr, sync::Arc};

use anyhow::Result;
use axum::{
    extract::{Multipart, Path, State},
    http::{header::AUTHORIZATION, HeaderMap, StatusCode},
    routing::{delete, get, post},
    Json, Router,
};
use parking_lot::Mutex;
use serde_json::{json, Value};
use sgadmin_core::{
    auth::{self, AuthError},
    models::{Game, Genre, User},
    resource::{
        forms::GameForm, EntityForm, Lookup, ResourceKind, ResourceScreen, Submit,
    },
    ApiClient, ApiError, AppConfig, FormPayload, SessionStore,
};
use tempfile::{tempdir, TempDir};

const TOKEN: &str = "secret-token";

#[derive(Default)]
struct Recorded {
    parts: Vec<(String, String)>,
    files: Vec<(String, String)>,
    authorization: Vec<String>,
}

type Shared = Arc<Mutex<Recorded>>;

fn authorized(headers: &HeaderMap, recorded: &Shared) -> bool {
    let value = headers
        .get(AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .unwrap_or_default()
        .to_string();
    let ok = value == format!("Bearer {TOKEN}");
    recorded.lock().authorization.push(value);
    ok
}

fn unauthenticated() -> (StatusCode, Json<Value>) {
    (
        StatusCode::UNAUTHORIZED,
        Json(json!({"message": "Unauthenticated."})),
    )
}

async fn login(Json(body): Json<Value>) -> (StatusCode, Json<Value>) {
    let email = body["email"].as_str().unwrap_or_default();
    let password = body["password"].as_str().unwrap_or_default();
    match (email, password) {
        ("admin@example.com", "pw") => (
            StatusCode::OK,
            Json(json!({
                "user": {"id": 1, "username": "admin", "email": email, "is_admin": 1},
                "token": TOKEN,
            })),
        ),
        ("player@example.com", "pw") => (
            StatusCode::OK,
            Json(json!({
                "user": {"id": 2, "username": "player", "email": email, "is_admin": 0},
                "token": "player-token",
            })),
        ),
        _ => (
            StatusCode::UNAUTHORIZED,
            Json(json!({"message": "Invalid credentials"})),
        ),
    }
}

async fn list_genres(
    State(recorded): State<Shared>,
    headers: HeaderMap,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers, &recorded) {
        return unauthenticated();
    }
    (
        StatusCode::OK,
        Json(json!([{"id": 1, "name": "Action"}, {"id": 2, "name": "Puzzle"}])),
    )
}

async fn create_genre(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers, &recorded) {
        return unauthenticated();
    }
    (
        StatusCode::CREATED,
        Json(json!({"id": 3, "name": body["name"]})),
    )
}

async fn delete_genre(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<u64>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers, &recorded) {
        return unauthenticated();
    }
    if id == 99 {
        return (
            StatusCode::NOT_FOUND,
            Json(json!({"message": "Genre not found"})),
        );
    }
    (StatusCode::OK, Json(json!({"message": "deleted"})))
}

async fn create_game(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers, &recorded) {
        return unauthenticated();
    }
    let mut name = String::new();
    let mut genres = Vec::new();
    while let Ok(Some(field)) = multipart.next_field().await {
        let key = field.name().unwrap_or_default().to_string();
        let file_name = field.file_name().map(str::to_string);
        let Ok(bytes) = field.bytes().await else {
            break;
        };
        let mut recorded = recorded.lock();
        match file_name {
            Some(file_name) => recorded.files.push((key, file_name)),
            None => {
                let value = String::from_utf8_lossy(&bytes).into_owned();
                if key == "name" {
                    name = value.clone();
                }
                if key == "genres[]" {
                    let id = value.parse::<u64>().unwrap_or_default();
                    genres.push(json!({"id": id, "name": format!("genre {value}")}));
                }
                recorded.parts.push((key, value));
            }
        }
    }
    (
        StatusCode::OK,
        Json(json!({"message": "created", "game": {"id": 10, "name": name, "genres": genres}})),
    )
}

async fn toggle_admin(
    State(recorded): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    if !authorized(&headers, &recorded) {
        return unauthenticated();
    }
    recorded
        .lock()
        .parts
        .push(("is_admin".to_string(), body["is_admin"].to_string()));
    // Promotion is refused server side; the unchanged record comes back.
    (
        StatusCode::OK,
        Json(json!({"user": {
            "id": body["user_id"],
            "username": "player",
            "is_admin": false,
        }})),
    )
}

async fn spawn_server() -> Result<(SocketAddr, Shared)> {
    let recorded: Shared = Arc::default();
    let app = Router::new()
        .route("/api/dashboard/login", post(login))
        .route("/api/dashboard/genres", get(list_genres))
        .route("/api/genres", get(list_genres))
        .route("/api/dashboard/genres/create", post(create_genre))
        .route("/api/dashboard/genres/{id}/delete", delete(delete_genre))
        .route("/api/dashboard/games/create", post(create_game))
        .route("/api/dashboard/user/is_admin", post(toggle_admin))
        .with_state(recorded.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Ok((addr, recorded))
}

fn client(addr: SocketAddr) -> Result<(ApiClient, SessionStore, TempDir)> {
    let dir = tempdir()?;
    let config = AppConfig {
        api_base_url: format!("http://{addr}"),
        media_base_url: None,
        request_timeout_secs: Some(5),
        session_dir: dir.path().join("session"),
        log_dir: dir.path().join("logs"),
    };
    let session = SessionStore::new(&config.session_dir);
    session.restore();
    let api = ApiClient::new(&config, session.clone())?;
    Ok((api, session, dir))
}

#[tokio::test]
async fn bearer_credential_follows_the_session() -> Result<()> {
    let (addr, recorded) = spawn_server().await?;
    let (api, session, _dir) = client(addr)?;

    let err = api.list::<Genre>().await.expect_err("anonymous");
    assert!(matches!(err, ApiError::MissingCredential));
    assert!(recorded.lock().authorization.is_empty());

    auth::authenticate(&api, &session, "admin@example.com", "pw").await?;
    let genres = api.list::<Genre>().await?;
    assert_eq!(genres.len(), 2);
    assert_eq!(
        recorded.lock().authorization,
        vec![format!("Bearer {TOKEN}")]
    );

    session.logout()?;
    assert!(matches!(
        api.list::<Genre>().await,
        Err(ApiError::MissingCredential)
    ));
    Ok(())
}

#[tokio::test]
async fn non_admin_and_bad_credentials_are_rejected() -> Result<()> {
    let (addr, _recorded) = spawn_server().await?;
    let (api, session, _dir) = client(addr)?;

    let err = auth::authenticate(&api, &session, "player@example.com", "pw")
        .await
        .expect_err("not admin");
    assert!(matches!(err, AuthError::NotAdmin));
    assert!(!session.is_authenticated());

    let err = auth::authenticate(&api, &session, "admin@example.com", "wrong")
        .await
        .expect_err("bad password");
    assert_eq!(err.user_message(), "Invalid credentials");
    assert!(!session.is_authenticated());
    Ok(())
}

#[tokio::test]
async fn multipart_lists_use_repeated_keys() -> Result<()> {
    let (addr, recorded) = spawn_server().await?;
    let (api, session, dir) = client(addr)?;
    auth::authenticate(&api, &session, "admin@example.com", "pw").await?;

    let cover = dir.path().join("cover.png");
    std::fs::write(&cover, b"\x89PNG")?;
    let form = GameForm {
        name: "Hades".into(),
        genres: vec![1, 2],
        cover_image: cover.display().to_string(),
        ..GameForm::default()
    };
    let game: Game = api.create(form.to_payload()).await?;
    assert_eq!(game.id, 10);
    assert_eq!(game.genres.len(), 2);

    let recorded = recorded.lock();
    let genres: Vec<&str> = recorded
        .parts
        .iter()
        .filter(|(key, _)| key == "genres[]")
        .map(|(_, value)| value.as_str())
        .collect();
    assert_eq!(genres, ["1", "2"]);
    assert!(recorded.parts.iter().all(|(key, _)| key != "genres"));
    assert_eq!(
        recorded.files,
        vec![("cover_image".to_string(), "cover.png".to_string())]
    );
    Ok(())
}

#[tokio::test]
async fn screen_round_trip_against_server() -> Result<()> {
    let (addr, _recorded) = spawn_server().await?;
    let (api, session, _dir) = client(addr)?;
    auth::authenticate(&api, &session, "admin@example.com", "pw").await?;

    let mut screen: ResourceScreen<Genre> = ResourceScreen::new();
    screen.apply_loaded(api.list().await);
    screen.open_create();
    if let Some((form, _)) = screen.form_mut() {
        for ch in "Roguelike".chars() {
            form.insert(ch);
        }
    }
    let Ok(Some(Submit::Create(payload))) = screen.begin_submit() else {
        panic!("expected a create request");
    };
    screen.apply_created(api.create(payload).await);
    let names: Vec<_> = screen.items().iter().map(|g| g.name.as_str()).collect();
    assert_eq!(names, ["Action", "Puzzle", "Roguelike"]);

    let notice = screen.apply_deleted(99, api.delete(ResourceKind::Genres, 99).await);
    assert!(notice.message.contains("Genre not found"));
    assert_eq!(screen.items().len(), 3);

    screen.apply_deleted(1, api.delete(ResourceKind::Genres, 1).await);
    assert_eq!(screen.items().len(), 2);

    let options = api.lookup(Lookup::Genres).await?;
    assert_eq!(options[1].label, "Puzzle");
    Ok(())
}

#[tokio::test]
async fn admin_toggle_returns_server_record() -> Result<()> {
    let (addr, recorded) = spawn_server().await?;
    let (api, session, _dir) = client(addr)?;
    auth::authenticate(&api, &session, "admin@example.com", "pw").await?;

    let user: User = api.set_admin(2, true).await?;
    assert_eq!(user.id, 2);
    assert!(!user.is_admin);
    assert!(recorded
        .lock()
        .parts
        .contains(&("is_admin".to_string(), "true".to_string())));
    Ok(())
}

#[tokio::test]
async fn status_errors_carry_the_server_message() -> Result<()> {
    let (addr, _recorded) = spawn_server().await?;
    let (api, session, _dir) = client(addr)?;
    auth::authenticate(&api, &session, "admin@example.com", "pw").await?;

    let err = api
        .delete(ResourceKind::Genres, 99)
        .await
        .expect_err("missing");
    match err {
        ApiError::Status { status, message } => {
            assert_eq!(status.as_u16(), 404);
            assert_eq!(message, "Genre not found");
        }
        other => panic!("unexpected error {other:?}"),
    }

    let payload = FormPayload::json().text("name", "Indie");
    let genre: Genre = api.create(payload).await?;
    assert_eq!(genre.name, "Indie");
    Ok(())
}
