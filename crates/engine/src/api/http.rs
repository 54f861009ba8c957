//! HTTP routes.
//!
//! Two groups share one router:
//! - `/api/v1/games`, `/api/v1/game/{name}/...` - the persistence surface,
//!   served straight from the configured game store
//! - `/api/v1/editor/...` - the editing session held by the orchestrator

use std::sync::Arc;

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post, put},
    Json, Router,
};
use serde_json::Value;

use questforge_domain::{
    Connection, ConnectionId, DomainError, GameName, Model, State as GameState, StateId, Trigger,
    TriggerId, View, ViewId,
};
use questforge_shared::FlatDiagram;

use crate::app::App;
use crate::infrastructure::ports::{ImportCandidate, RepoError};
use crate::use_cases::game::{
    ConnectionDeletion, EditorStatus, EncounterSummary, GcReport, LoadReport, SaveReport,
    StateDeletion,
};
use crate::use_cases::{BridgeError, GameError};

/// Create all HTTP routes.
pub fn routes() -> Router<Arc<App>> {
    Router::new()
        .route("/", get(health))
        .route("/api/health", get(health))
        // Persistence surface
        .route("/api/v1/games", get(list_games))
        .route(
            "/api/v1/game/{name}/model",
            get(get_model).put(put_model),
        )
        .route(
            "/api/v1/game/{name}/config",
            get(get_config).put(put_config),
        )
        .route("/api/v1/game/{name}/views", get(list_views))
        .route(
            "/api/v1/game/{name}/views/{view_id}",
            get(get_view).put(put_view).delete(delete_stored_view),
        )
        .route("/api/v1/game/{name}/encounters", get(list_encounters))
        .route(
            "/api/v1/game/{name}/encounters/{encounter}",
            get(get_encounter),
        )
        .route("/api/v1/game/{name}/sounds", get(list_sounds))
        // Editing session
        .route("/api/v1/editor/load/{name}", post(load_game))
        .route("/api/v1/editor/save", post(save_game))
        .route("/api/v1/editor/status", get(status))
        .route("/api/v1/editor/diagram", get(diagram))
        .route("/api/v1/editor/gc", post(garbage_collect))
        .route(
            "/api/v1/editor/states/{id}",
            put(update_state).delete(delete_state),
        )
        .route(
            "/api/v1/editor/connections/{id}",
            put(update_connection).delete(delete_connection),
        )
        .route("/api/v1/editor/triggers/{id}", put(update_trigger))
        .route("/api/v1/editor/views/{view_id}", delete(delete_view))
        .route("/api/v1/editor/encounters", get(encounters))
        .route("/api/v1/editor/encounters/close", post(close_encounter))
        .route(
            "/api/v1/editor/encounters/{name}/open",
            post(open_encounter),
        )
        .route(
            "/api/v1/editor/encounters/{name}/importable",
            get(importable_states),
        )
        .route(
            "/api/v1/editor/encounters/{name}/import/{state_id}",
            post(import_state),
        )
}

async fn health() -> &'static str {
    "OK"
}

fn game_name(name: String) -> Result<GameName, ApiError> {
    GameName::new(name).map_err(|e| ApiError::BadRequest(e.to_string()))
}

// =============================================================================
// Persistence surface
// =============================================================================

async fn list_games(State(app): State<Arc<App>>) -> Result<Json<Vec<GameName>>, ApiError> {
    Ok(Json(app.store.list_games().await?))
}

async fn get_model(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<Model>, ApiError> {
    let game = game_name(name)?;
    let model = app
        .store
        .load_model(&game)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No model for {game}")))?;
    Ok(Json(model))
}

async fn put_model(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
    Json(model): Json<Model>,
) -> Result<StatusCode, ApiError> {
    let game = game_name(name)?;
    app.store.save_model(&game, &model.normalized()).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn get_config(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<Value>, ApiError> {
    let game = game_name(name)?;
    let config = app
        .store
        .load_config(&game)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No config for {game}")))?;
    Ok(Json(config))
}

async fn put_config(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
    Json(config): Json<Value>,
) -> Result<StatusCode, ApiError> {
    let game = game_name(name)?;
    app.store.save_config(&game, &config).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_views(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ViewId>>, ApiError> {
    let game = game_name(name)?;
    Ok(Json(app.store.list_views(&game).await?))
}

async fn get_view(
    State(app): State<Arc<App>>,
    Path((name, view_id)): Path<(String, String)>,
) -> Result<Json<View>, ApiError> {
    let game = game_name(name)?;
    let view_id = ViewId::from(view_id);
    let view = app
        .store
        .load_view(&game, &view_id)
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("No view {view_id} in {game}")))?;
    Ok(Json(view))
}

async fn put_view(
    State(app): State<Arc<App>>,
    Path((name, view_id)): Path<(String, String)>,
    Json(view): Json<View>,
) -> Result<StatusCode, ApiError> {
    let game = game_name(name)?;
    let view = view.normalized(&ViewId::from(view_id));
    app.store.save_view(&game, &view).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_stored_view(
    State(app): State<Arc<App>>,
    Path((name, view_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    let game = game_name(name)?;
    app.store.delete_view(&game, &ViewId::from(view_id)).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn list_encounters(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<EncounterSummary>>, ApiError> {
    let game = game_name(name)?;
    let mut encounters = Vec::new();
    for view_id in app.store.list_views(&game).await? {
        if !view_id.is_encounter() {
            continue;
        }
        if let Some(view) = app.store.load_view(&game, &view_id).await? {
            encounters.extend(EncounterSummary::from_view(&view));
        }
    }
    Ok(Json(encounters))
}

async fn get_encounter(
    State(app): State<Arc<App>>,
    Path((name, encounter)): Path<(String, String)>,
) -> Result<Json<EncounterSummary>, ApiError> {
    let game = game_name(name)?;
    let view_id = ViewId::encounter(&encounter);
    let summary = app
        .store
        .load_view(&game, &view_id)
        .await?
        .as_ref()
        .and_then(EncounterSummary::from_view)
        .ok_or_else(|| ApiError::NotFound(format!("No encounter {encounter} in {game}")))?;
    Ok(Json(summary))
}

async fn list_sounds(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<String>>, ApiError> {
    let game = game_name(name)?;
    Ok(Json(app.store.list_sounds(&game).await?))
}

// =============================================================================
// Editing session
// =============================================================================

async fn load_game(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<LoadReport>, ApiError> {
    let report = app.game.load_game(&name).await?;
    app.bridge.refresh().await?;
    Ok(Json(report))
}

async fn save_game(State(app): State<Arc<App>>) -> Result<Json<SaveReport>, ApiError> {
    Ok(Json(app.game.save_game().await?))
}

async fn status(State(app): State<Arc<App>>) -> Json<EditorStatus> {
    Json(app.game.status().await)
}

async fn diagram(State(app): State<Arc<App>>) -> Result<Json<FlatDiagram>, ApiError> {
    Ok(Json(app.bridge.current_diagram().await?))
}

async fn garbage_collect(State(app): State<Arc<App>>) -> Result<Json<GcReport>, ApiError> {
    let report = app.game.garbage_collect_orphaned_layouts().await;
    if !report.is_empty() {
        app.bridge.refresh().await?;
    }
    Ok(Json(report))
}

async fn update_state(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    Json(mut state): Json<GameState>,
) -> Result<Json<Vec<StateId>>, ApiError> {
    state.id = StateId::from(id);
    Ok(Json(app.bridge.update_state(state).await?))
}

async fn delete_state(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<StateDeletion>, ApiError> {
    let deletion = app.game.remove_state(&StateId::from(id)).await;
    app.bridge.refresh().await?;
    Ok(Json(deletion))
}

async fn update_connection(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    Json(mut connection): Json<Connection>,
) -> Result<StatusCode, ApiError> {
    connection.id = ConnectionId::from(id);
    app.bridge.update_connection(connection).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn delete_connection(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
) -> Result<Json<ConnectionDeletion>, ApiError> {
    let deletion = app.game.remove_connection(&ConnectionId::from(id)).await;
    app.bridge.refresh().await?;
    Ok(Json(deletion))
}

async fn update_trigger(
    State(app): State<Arc<App>>,
    Path(id): Path<String>,
    Json(mut trigger): Json<Trigger>,
) -> Result<Json<StateId>, ApiError> {
    trigger.id = TriggerId::from(id);
    Ok(Json(app.bridge.update_trigger(trigger).await?))
}

async fn delete_view(
    State(app): State<Arc<App>>,
    Path(view_id): Path<String>,
) -> Result<StatusCode, ApiError> {
    app.game.delete_view(&ViewId::from(view_id)).await?;
    app.bridge.refresh().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn encounters(State(app): State<Arc<App>>) -> Json<Vec<EncounterSummary>> {
    Json(app.game.encounters().await)
}

async fn open_encounter(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<ViewId>, ApiError> {
    let view_id = app.game.open_encounter(&name).await?;
    app.bridge.refresh().await?;
    Ok(Json(view_id))
}

async fn close_encounter(State(app): State<Arc<App>>) -> Result<StatusCode, ApiError> {
    app.game.close_encounter().await?;
    app.bridge.refresh().await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn importable_states(
    State(app): State<Arc<App>>,
    Path(name): Path<String>,
) -> Result<Json<Vec<ImportCandidate>>, ApiError> {
    Ok(Json(app.game.importable_states(&name).await?))
}

async fn import_state(
    State(app): State<Arc<App>>,
    Path((name, state_id)): Path<(String, String)>,
) -> Result<StatusCode, ApiError> {
    app.game
        .import_state(&name, &StateId::from(state_id))
        .await?;
    app.bridge.refresh().await?;
    Ok(StatusCode::NO_CONTENT)
}

// =============================================================================
// Errors
// =============================================================================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Conflict(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg).into_response(),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg).into_response(),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, msg).into_response(),
            ApiError::Internal(msg) => {
                tracing::error!(error = %msg, "Request failed");
                (StatusCode::INTERNAL_SERVER_ERROR, "Internal error").into_response()
            }
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(e: DomainError) -> Self {
        match e {
            DomainError::NotFound { .. } => ApiError::NotFound(e.to_string()),
            DomainError::Validation(_) => ApiError::BadRequest(e.to_string()),
            DomainError::Constraint(_) | DomainError::InvalidStateTransition(_) => {
                ApiError::Conflict(e.to_string())
            }
        }
    }
}

impl From<RepoError> for ApiError {
    fn from(e: RepoError) -> Self {
        match e {
            RepoError::InvalidName(_) => ApiError::BadRequest(e.to_string()),
            _ => ApiError::Internal(e.to_string()),
        }
    }
}

impl From<GameError> for ApiError {
    fn from(e: GameError) -> Self {
        match e {
            GameError::Domain(e) => e.into(),
            GameError::InvalidGameName(_) => ApiError::BadRequest(e.to_string()),
            GameError::NoGameLoaded | GameError::Superseded { .. } => {
                ApiError::Conflict(e.to_string())
            }
            GameError::Load { .. } | GameError::Save { .. } | GameError::ViewsNotSaved { .. } => {
                ApiError::Internal(e.to_string())
            }
        }
    }
}

impl From<BridgeError> for ApiError {
    fn from(e: BridgeError) -> Self {
        match e {
            BridgeError::Domain(e) => e.into(),
            BridgeError::UnknownEntity { .. } => ApiError::NotFound(e.to_string()),
            BridgeError::NoCurrentView => ApiError::Conflict(e.to_string()),
            BridgeError::Encode(_) => ApiError::Internal(e.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use tower::ServiceExt;

    use crate::infrastructure::fs_store::FsGameStore;
    use crate::infrastructure::ports::MockGameStore;

    fn router(store: impl crate::infrastructure::ports::GameStore + 'static) -> Router {
        routes().with_state(Arc::new(App::new(Arc::new(store))))
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    fn request(method: &str, uri: &str, body: Option<Value>) -> Request<Body> {
        let builder = Request::builder().method(method).uri(uri);
        match body {
            Some(json) => builder
                .header("content-type", "application/json")
                .body(Body::from(json.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        }
    }

    /// A maps directory holding game `castle` with states A, B, C1 and a world view.
    fn castle_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let game = dir.path().join("castle");
        std::fs::create_dir_all(game.join("views")).unwrap();
        std::fs::write(
            game.join("model.json"),
            serde_json::json!({
                "states": {
                    "A": { "id": "A", "name": "Start", "stateType": "START" },
                    "B": { "id": "B", "name": "Room" }
                },
                "connections": {
                    "C1": {
                        "id": "C1", "name": "go",
                        "source": { "node": "A" }, "target": { "node": "B" }
                    }
                }
            })
            .to_string(),
        )
        .unwrap();
        std::fs::write(
            game.join("views").join("world.json"),
            serde_json::json!({
                "viewId": "world",
                "viewType": "world",
                "stateLayouts": { "A": { "x": 0, "y": 0 }, "B": { "x": 100, "y": 0 } },
                "connectionRoutes": {}
            })
            .to_string(),
        )
        .unwrap();
        dir
    }

    #[tokio::test]
    async fn health_is_ok() {
        let response = router(MockGameStore::new())
            .oneshot(request("GET", "/api/health", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn when_no_model_is_stored_then_get_model_is_not_found() {
        let mut store = MockGameStore::new();
        store.expect_load_model().returning(|_| Ok(None));

        let response = router(store)
            .oneshot(request("GET", "/api/v1/game/castle/model", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn when_a_view_is_put_then_it_is_stored_under_the_path_id() {
        let mut store = MockGameStore::new();
        store
            .expect_save_view()
            .withf(|_, view| view.view_id == ViewId::encounter("cave"))
            .times(1)
            .returning(|_, _| Ok(()));

        let response = router(store)
            .oneshot(request(
                "PUT",
                "/api/v1/game/castle/views/encounter_cave",
                Some(serde_json::json!({ "id": "stale", "stateLayouts": {} })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NO_CONTENT);
    }

    #[tokio::test]
    async fn when_the_store_fails_then_the_response_hides_the_cause() {
        let mut store = MockGameStore::new();
        store
            .expect_list_games()
            .returning(|| Err(RepoError::io("list_games", "/srv/maps: permission denied")));

        let response = router(store)
            .oneshot(request("GET", "/api/v1/games", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        assert_eq!(&bytes[..], b"Internal error");
    }

    #[tokio::test]
    async fn when_the_game_name_has_a_separator_then_load_is_a_bad_request() {
        let response = router(MockGameStore::new())
            .oneshot(request("POST", "/api/v1/editor/load/a%5Cb", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn when_nothing_is_loaded_then_save_conflicts() {
        let response = router(MockGameStore::new())
            .oneshot(request("POST", "/api/v1/editor/save", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn when_a_game_is_loaded_then_the_world_diagram_is_served() {
        let dir = castle_dir();
        let app = Arc::new(App::new(Arc::new(FsGameStore::new(
            dir.path(),
            dir.path().join("soundfx"),
        ))));
        let router = routes().with_state(app.clone());

        let response = router
            .clone()
            .oneshot(request("POST", "/api/v1/editor/load/castle", None))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let report = body_json(response).await;
        assert_eq!(report["states"], 2);
        assert_eq!(report["gc"]["cleaned"], 0);

        let response = router
            .oneshot(request("GET", "/api/v1/editor/diagram", None))
            .await
            .unwrap();
        let diagram = body_json(response).await;
        assert_eq!(diagram.as_array().map(Vec::len), Some(3));
        assert_eq!(diagram[2]["type"], "TriggerConnection");
        assert_eq!(diagram[2]["vertex"], serde_json::json!([]));
    }

    #[tokio::test]
    async fn when_a_state_is_deleted_then_its_connections_go_too() {
        let dir = castle_dir();
        let app = Arc::new(App::new(Arc::new(FsGameStore::new(
            dir.path(),
            dir.path().join("soundfx"),
        ))));
        let router = routes().with_state(app.clone());
        router
            .clone()
            .oneshot(request("POST", "/api/v1/editor/load/castle", None))
            .await
            .unwrap();

        let response = router
            .clone()
            .oneshot(request("DELETE", "/api/v1/editor/states/B", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["connections"], serde_json::json!(["C1"]));
        let status = body_json(
            router
                .oneshot(request("GET", "/api/v1/editor/status", None))
                .await
                .unwrap(),
        )
        .await;
        assert_eq!(status["states"], 1);
        assert_eq!(status["connections"], 0);
        assert_eq!(status["unsavedChanges"], true);
    }

    #[tokio::test]
    async fn when_encounters_are_switched_directly_then_conflict() {
        let dir = castle_dir();
        let router = routes().with_state(Arc::new(App::new(Arc::new(FsGameStore::new(
            dir.path(),
            dir.path().join("soundfx"),
        )))));
        router
            .clone()
            .oneshot(request("POST", "/api/v1/editor/load/castle", None))
            .await
            .unwrap();
        let opened = router
            .clone()
            .oneshot(request("POST", "/api/v1/editor/encounters/cave/open", None))
            .await
            .unwrap();
        assert_eq!(opened.status(), StatusCode::OK);

        let response = router
            .oneshot(request("POST", "/api/v1/editor/encounters/crypt/open", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
    }

    #[tokio::test]
    async fn when_the_world_view_is_deleted_then_conflict() {
        let dir = castle_dir();
        let router = routes().with_state(Arc::new(App::new(Arc::new(FsGameStore::new(
            dir.path(),
            dir.path().join("soundfx"),
        )))));
        router
            .clone()
            .oneshot(request("POST", "/api/v1/editor/load/castle", None))
            .await
            .unwrap();

        let response = router
            .oneshot(request("DELETE", "/api/v1/editor/views/world", None))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::CONFLICT);
        assert!(dir.path().join("castle/views/world.json").exists());
    }

    #[tokio::test]
    async fn when_an_unknown_trigger_is_edited_then_not_found() {
        let response = router(MockGameStore::new())
            .oneshot(request(
                "PUT",
                "/api/v1/editor/triggers/T9",
                Some(serde_json::json!({ "id": "T9", "name": "pull lever" })),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
