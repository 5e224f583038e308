mod controls;
mod entity;
mod machine;
mod room_controller;
mod rooms;
mod screens;
mod session;
mod textures;

use engine::{AudioBackend, Scene};

use controls::ControlScheme;
use entity::VelocityMode;
use machine::GameScene;

pub(crate) use machine::Cue;
pub(crate) use rooms::{RoomTable, RoomTableError};
pub(crate) use textures::GameTextures;

/// Frame numbers driving the intro logo fade.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct IntroTiming {
    pub(crate) fade_in_start: u32,
    pub(crate) fade_out_start: u32,
    pub(crate) fade_frames: u32,
    /// The intro ends once its frame counter passes this value.
    pub(crate) exit_after: u32,
}

impl Default for IntroTiming {
    fn default() -> Self {
        Self {
            fade_in_start: 1,
            fade_out_start: 46,
            fade_frames: 15,
            exit_after: 75,
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GameConfig {
    /// Pixels per room grid cell.
    pub(crate) cell_size: u32,
    pub(crate) entity_speed: f32,
    pub(crate) entity_friction: f32,
    pub(crate) velocity_mode: VelocityMode,
    pub(crate) intro: IntroTiming,
    pub(crate) player_controls: ControlScheme,
    pub(crate) rival_controls: ControlScheme,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            cell_size: 16,
            entity_speed: 4.0,
            entity_friction: 1.0,
            velocity_mode: VelocityMode::default(),
            intro: IntroTiming::default(),
            player_controls: ControlScheme::player(),
            rival_controls: ControlScheme::mirrored_rival(),
        }
    }
}

pub(crate) fn build_scene(
    config: GameConfig,
    textures: GameTextures,
    rooms: RoomTable,
    audio: Box<dyn AudioBackend>,
) -> Box<dyn Scene> {
    Box::new(GameScene::new(config, textures, rooms, audio))
}
