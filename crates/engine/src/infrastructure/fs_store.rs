//! Filesystem game store.
//!
//! Layout under the maps directory:
//!
//! ```text
//! <maps>/<game>/config.json
//! <maps>/<game>/model.json
//! <maps>/<game>/views/<viewId>.json
//! <maps>/<game>/soundfx/**.{mp3,wav,ogg}
//! ```
//!
//! Central sounds live in a separate directory and are listed as `global/...`.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tokio::fs;

use questforge_domain::{GameName, Model, View, ViewId};

use super::ports::{GameStore, RepoError};

const CONFIG_FILE: &str = "config.json";
const MODEL_FILE: &str = "model.json";
const VIEWS_DIR: &str = "views";
const SOUNDFX_DIR: &str = "soundfx";
const SOUND_EXTENSIONS: [&str; 3] = ["mp3", "wav", "ogg"];

pub struct FsGameStore {
    maps_dir: PathBuf,
    soundfx_dir: PathBuf,
}

impl FsGameStore {
    pub fn new(maps_dir: impl Into<PathBuf>, soundfx_dir: impl Into<PathBuf>) -> Self {
        Self {
            maps_dir: maps_dir.into(),
            soundfx_dir: soundfx_dir.into(),
        }
    }

    fn game_dir(&self, game: &GameName) -> PathBuf {
        self.maps_dir.join(game.as_str())
    }

    fn view_path(&self, game: &GameName, view_id: &ViewId) -> Result<PathBuf, RepoError> {
        let id = view_id.as_str();
        if id.is_empty() || id == "." || id == ".." || id.contains(['/', '\\', '\0']) {
            return Err(RepoError::invalid_name(format!("view id '{}'", id)));
        }
        Ok(self
            .game_dir(game)
            .join(VIEWS_DIR)
            .join(format!("{}.json", id)))
    }
}

async fn read_json<T: DeserializeOwned>(
    path: &Path,
    operation: &'static str,
) -> Result<Option<T>, RepoError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(RepoError::io(operation, format!("{}: {}", path.display(), e))),
    };
    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|e| RepoError::serialization(format!("{}: {}", path.display(), e)))
}

/// Write through a sibling temp file and rename, so a crash never leaves a
/// half-written document behind.
async fn write_json<T: Serialize + ?Sized>(
    path: &Path,
    value: &T,
    operation: &'static str,
) -> Result<(), RepoError> {
    let json = serde_json::to_vec_pretty(value).map_err(RepoError::serialization)?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .await
            .map_err(|e| RepoError::io(operation, e))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, json)
        .await
        .map_err(|e| RepoError::io(operation, e))?;
    fs::rename(&tmp, path)
        .await
        .map_err(|e| RepoError::io(operation, e))
}

/// Every sound file below `root`, as `<prefix>/<relative path>` with `/`
/// separators. A missing root yields nothing.
async fn collect_sounds(root: &Path, prefix: &str) -> Result<Vec<String>, RepoError> {
    let mut sounds = Vec::new();
    let mut pending = vec![root.to_path_buf()];

    while let Some(dir) = pending.pop() {
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => continue,
            Err(e) => return Err(RepoError::io("list_sounds", e)),
        };
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::io("list_sounds", e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| RepoError::io("list_sounds", e))?;
            if file_type.is_dir() {
                pending.push(path);
                continue;
            }
            let is_sound = path
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| SOUND_EXTENSIONS.contains(&ext));
            if !is_sound {
                continue;
            }
            if let Ok(rel) = path.strip_prefix(root) {
                let rel: Vec<String> = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect();
                sounds.push(format!("{}/{}", prefix, rel.join("/")));
            }
        }
    }

    Ok(sounds)
}

#[async_trait]
impl GameStore for FsGameStore {
    async fn list_games(&self) -> Result<Vec<GameName>, RepoError> {
        let mut entries = match fs::read_dir(&self.maps_dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RepoError::io("list_games", e)),
        };

        let mut games = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::io("list_games", e))?
        {
            let is_dir = entry
                .file_type()
                .await
                .map_err(|e| RepoError::io("list_games", e))?
                .is_dir();
            if !is_dir {
                continue;
            }
            match GameName::new(entry.file_name().to_string_lossy()) {
                Ok(name) => games.push(name),
                Err(e) => tracing::debug!(error = %e, "Skipping directory that is not a game"),
            }
        }
        games.sort_by(|a, b| a.as_str().cmp(b.as_str()));
        Ok(games)
    }

    async fn load_config(&self, game: &GameName) -> Result<Option<Value>, RepoError> {
        read_json(&self.game_dir(game).join(CONFIG_FILE), "load_config").await
    }

    async fn save_config(&self, game: &GameName, config: &Value) -> Result<(), RepoError> {
        write_json(&self.game_dir(game).join(CONFIG_FILE), config, "save_config").await
    }

    async fn load_model(&self, game: &GameName) -> Result<Option<Model>, RepoError> {
        let model: Option<Model> =
            read_json(&self.game_dir(game).join(MODEL_FILE), "load_model").await?;
        Ok(model.map(Model::normalized))
    }

    async fn save_model(&self, game: &GameName, model: &Model) -> Result<(), RepoError> {
        write_json(&self.game_dir(game).join(MODEL_FILE), model, "save_model").await
    }

    async fn list_views(&self, game: &GameName) -> Result<Vec<ViewId>, RepoError> {
        let dir = self.game_dir(game).join(VIEWS_DIR);
        let mut entries = match fs::read_dir(&dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(RepoError::io("list_views", e)),
        };

        let mut views = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| RepoError::io("list_views", e))?
        {
            let file_name = entry.file_name().to_string_lossy().into_owned();
            if let Some(stem) = file_name.strip_suffix(".json") {
                if !stem.is_empty() {
                    views.push(ViewId::from(stem));
                }
            }
        }
        views.sort();
        Ok(views)
    }

    async fn load_view(
        &self,
        game: &GameName,
        view_id: &ViewId,
    ) -> Result<Option<View>, RepoError> {
        let path = self.view_path(game, view_id)?;
        let view: Option<View> = read_json(&path, "load_view").await?;
        Ok(view.map(|v| v.normalized(view_id)))
    }

    async fn save_view(&self, game: &GameName, view: &View) -> Result<(), RepoError> {
        let path = self.view_path(game, &view.view_id)?;
        write_json(&path, view, "save_view").await
    }

    async fn delete_view(&self, game: &GameName, view_id: &ViewId) -> Result<(), RepoError> {
        let path = self.view_path(game, view_id)?;
        match fs::remove_file(&path).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(RepoError::io("delete_view", e)),
        }
    }

    async fn list_sounds(&self, game: &GameName) -> Result<Vec<String>, RepoError> {
        let mut sounds = collect_sounds(&self.soundfx_dir, "global").await?;
        sounds.extend(collect_sounds(&self.game_dir(game).join(SOUNDFX_DIR), "map").await?);
        sounds.sort();
        Ok(sounds)
    }
}
