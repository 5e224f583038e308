use std::env;
use std::path::PathBuf;

use engine::{
    resolve_app_paths, AppPaths, AudioBackend, LoggingAudio, LoopConfig, Scene, StartupError,
    TextureError, TextureRegistry,
};
use thiserror::Error;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::gameplay::{self, Cue, GameConfig, GameTextures, RoomTable, RoomTableError};

const ROOMS_ENV_VAR: &str = "PUBIE_ROOMS";
const DEFAULT_ROOMS_FILE: &str = "rooms.json";

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) scene: Box<dyn Scene>,
}

#[derive(Debug, Error)]
pub(crate) enum BootstrapError {
    #[error(transparent)]
    Startup(#[from] StartupError),
    #[error(transparent)]
    Texture(#[from] TextureError),
    #[error(transparent)]
    Rooms(#[from] RoomTableError),
}

pub(crate) fn build_app() -> Result<AppWiring, BootstrapError> {
    init_tracing();
    info!("=== pubie startup ===");

    let paths = resolve_app_paths()?;
    info!(root = %paths.root.display(), "paths_resolved");

    let mut registry = TextureRegistry::new(paths.sprites_dir.clone());
    let textures = GameTextures::load(&mut registry)?;

    let rooms_path = rooms_path(&paths);
    let rooms = RoomTable::load(&rooms_path)?;
    info!(path = %rooms_path.display(), room_count = rooms.len(), "rooms_loaded");

    let audio = open_audio(&paths);
    let scene = gameplay::build_scene(GameConfig::default(), textures, rooms, audio);

    Ok(AppWiring {
        config: LoopConfig::default(),
        scene,
    })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

/// `PUBIE_ROOMS` overrides the room table shipped under `assets/`.
fn rooms_path(paths: &AppPaths) -> PathBuf {
    match env::var_os(ROOMS_ENV_VAR) {
        Some(value) if !value.is_empty() => PathBuf::from(value),
        _ => paths.assets_dir.join(DEFAULT_ROOMS_FILE),
    }
}

fn cue_keys() -> Vec<&'static str> {
    Cue::ALL.iter().map(|cue| cue.key()).collect()
}

#[cfg(feature = "audio")]
fn open_audio(paths: &AppPaths) -> Box<dyn AudioBackend> {
    match engine::RodioAudio::open(&paths.audio_dir, &cue_keys()) {
        Ok(audio) => Box::new(audio),
        Err(err) => {
            warn!(error = %err, "audio_unavailable_falling_back_to_log");
            Box::new(LoggingAudio)
        }
    }
}

#[cfg(not(feature = "audio"))]
fn open_audio(paths: &AppPaths) -> Box<dyn AudioBackend> {
    warn!(
        audio_dir = %paths.audio_dir.display(),
        cues = ?cue_keys(),
        "audio_feature_disabled"
    );
    Box::new(LoggingAudio)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rooms_default_to_assets_dir() {
        let paths = AppPaths::from_root(PathBuf::from("/game"));
        if env::var_os(ROOMS_ENV_VAR).is_none() {
            assert_eq!(rooms_path(&paths), PathBuf::from("/game/assets/rooms.json"));
        }
    }

    #[test]
    fn every_cue_has_a_distinct_clip_name() {
        let keys = cue_keys();
        assert_eq!(keys, vec!["yay", "weoo", "gameover"]);
    }
}
