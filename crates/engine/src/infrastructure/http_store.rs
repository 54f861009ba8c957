//! Remote game store speaking the persistence REST surface.
//!
//! ```text
//! GET        /api/v1/games
//! GET|PUT    /api/v1/game/{name}/config
//! GET|PUT    /api/v1/game/{name}/model
//! GET        /api/v1/game/{name}/views
//! GET|PUT|DELETE /api/v1/game/{name}/views/{viewId}
//! GET        /api/v1/game/{name}/sounds
//! ```
//!
//! 404 on a load means "not stored yet" and maps to `Ok(None)`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use questforge_domain::{GameName, Model, View, ViewId};

use super::ports::{GameStore, RepoError};

/// Default request timeout for the remote store.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Clone)]
pub struct HttpGameStore {
    client: Client,
    base_url: String,
}

impl HttpGameStore {
    pub fn new(base_url: &str) -> Self {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT_SECS)
    }

    pub fn with_timeout(base_url: &str, timeout_secs: u64) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .unwrap_or_else(|_| Client::new());

        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    /// Build `<base>/api/v1/<segments...>` with each segment percent-encoded.
    fn url(&self, segments: &[&str], operation: &'static str) -> Result<Url, RepoError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| RepoError::transport(operation, e))?;
        url.path_segments_mut()
            .map_err(|_| RepoError::transport(operation, "base URL cannot carry a path"))?
            .pop_if_empty()
            .extend(["api", "v1"])
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: DeserializeOwned>(
        &self,
        url: Url,
        operation: &'static str,
    ) -> Result<Option<T>, RepoError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| RepoError::transport(operation, e))?;

        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let response = ensure_success(response, operation).await?;
        response
            .json()
            .await
            .map(Some)
            .map_err(RepoError::serialization)
    }

    async fn put_json<T: Serialize + ?Sized + Sync>(
        &self,
        url: Url,
        body: &T,
        operation: &'static str,
    ) -> Result<(), RepoError> {
        let response = self
            .client
            .put(url)
            .json(body)
            .send()
            .await
            .map_err(|e| RepoError::transport(operation, e))?;
        ensure_success(response, operation).await?;
        Ok(())
    }
}

async fn ensure_success(response: Response, operation: &'static str) -> Result<Response, RepoError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(RepoError::transport(
        operation,
        format!("HTTP {}: {}", status, body),
    ))
}

#[async_trait]
impl GameStore for HttpGameStore {
    async fn list_games(&self) -> Result<Vec<GameName>, RepoError> {
        let url = self.url(&["games"], "list_games")?;
        let names: Option<Vec<String>> = self.get_json(url, "list_games").await?;
        Ok(names
            .unwrap_or_default()
            .into_iter()
            .filter_map(|n| GameName::new(n).ok())
            .collect())
    }

    async fn load_config(&self, game: &GameName) -> Result<Option<Value>, RepoError> {
        let url = self.url(&["game", game.as_str(), "config"], "load_config")?;
        self.get_json(url, "load_config").await
    }

    async fn save_config(&self, game: &GameName, config: &Value) -> Result<(), RepoError> {
        let url = self.url(&["game", game.as_str(), "config"], "save_config")?;
        self.put_json(url, config, "save_config").await
    }

    async fn load_model(&self, game: &GameName) -> Result<Option<Model>, RepoError> {
        let url = self.url(&["game", game.as_str(), "model"], "load_model")?;
        let model: Option<Model> = self.get_json(url, "load_model").await?;
        Ok(model.map(Model::normalized))
    }

    async fn save_model(&self, game: &GameName, model: &Model) -> Result<(), RepoError> {
        let url = self.url(&["game", game.as_str(), "model"], "save_model")?;
        self.put_json(url, model, "save_model").await
    }

    async fn list_views(&self, game: &GameName) -> Result<Vec<ViewId>, RepoError> {
        let url = self.url(&["game", game.as_str(), "views"], "list_views")?;
        let views: Option<Vec<ViewId>> = self.get_json(url, "list_views").await?;
        Ok(views.unwrap_or_default())
    }

    async fn load_view(
        &self,
        game: &GameName,
        view_id: &ViewId,
    ) -> Result<Option<View>, RepoError> {
        let url = self.url(&["game", game.as_str(), "views", view_id.as_str()], "load_view")?;
        let view: Option<View> = self.get_json(url, "load_view").await?;
        Ok(view.map(|v| v.normalized(view_id)))
    }

    async fn save_view(&self, game: &GameName, view: &View) -> Result<(), RepoError> {
        let url = self.url(
            &["game", game.as_str(), "views", view.view_id.as_str()],
            "save_view",
        )?;
        self.put_json(url, view, "save_view").await
    }

    async fn delete_view(&self, game: &GameName, view_id: &ViewId) -> Result<(), RepoError> {
        let url = self.url(&["game", game.as_str(), "views", view_id.as_str()], "delete_view")?;
        let response = self
            .client
            .delete(url)
            .send()
            .await
            .map_err(|e| RepoError::transport("delete_view", e))?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(());
        }
        ensure_success(response, "delete_view").await?;
        Ok(())
    }

    async fn list_sounds(&self, game: &GameName) -> Result<Vec<String>, RepoError> {
        let url = self.url(&["game", game.as_str(), "sounds"], "list_sounds")?;
        let sounds: Option<Vec<String>> = self.get_json(url, "list_sounds").await?;
        Ok(sounds.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode as AxumStatus;
    use axum::routing::get;
    use axum::{Json, Router};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.ok();
        });
        format!("http://{}", addr)
    }

    fn game() -> GameName {
        GameName::new("castle").unwrap()
    }

    #[test]
    fn url_encodes_path_segments() {
        let store = HttpGameStore::new("http://localhost:8000/");
        let url = store
            .url(&["game", "dark castle", "views", "world"], "test")
            .unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/game/dark%20castle/views/world"
        );
    }

    #[tokio::test]
    async fn not_found_loads_as_none() {
        let router = Router::new().route(
            "/api/v1/game/{name}/model",
            get(|| async { AxumStatus::NOT_FOUND }),
        );
        let store = HttpGameStore::new(&serve(router).await);

        assert!(store.load_model(&game()).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn server_error_is_a_transport_error() {
        let router = Router::new().route(
            "/api/v1/game/{name}/views",
            get(|| async { (AxumStatus::INTERNAL_SERVER_ERROR, "disk full") }),
        );
        let store = HttpGameStore::new(&serve(router).await);

        let err = store.list_views(&game()).await.unwrap_err();

        assert!(matches!(err, RepoError::Transport { operation: "list_views", .. }));
    }

    #[tokio::test]
    async fn view_is_normalized_to_requested_id() {
        let router = Router::new().route(
            "/api/v1/game/{name}/views/{view}",
            get(|| async {
                Json(serde_json::json!({ "id": "old-name", "stateLayouts": {} }))
            }),
        );
        let store = HttpGameStore::new(&serve(router).await);

        let view = store
            .load_view(&game(), &ViewId::world())
            .await
            .unwrap()
            .unwrap();

        assert_eq!(view.view_id, ViewId::world());
        assert!(view.is_world());
    }
}
