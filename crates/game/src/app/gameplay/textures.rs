use std::sync::Arc;

use engine::{Texture, TextureError, TextureRegistry};

use super::rooms::GoalKind;

pub(crate) const LOGO_KEY: &str = "logo";
pub(crate) const PLAYER_KEY: &str = "pubie";
pub(crate) const RIVAL_KEY: &str = "lugie";
pub(crate) const ADVANCE_GOAL_KEY: &str = "atome";
pub(crate) const ESCAPE_GOAL_KEY: &str = "escape";
pub(crate) const HAZARD_KEY: &str = "dynomete";
pub(crate) const BACKDROP_KEY: &str = "back";

/// Every sprite the game draws, loaded up front so no tick ever waits on disk.
#[derive(Debug, Clone)]
pub(crate) struct GameTextures {
    pub(crate) logo: Arc<Texture>,
    pub(crate) player: Arc<Texture>,
    pub(crate) rival: Arc<Texture>,
    pub(crate) advance_goal: Arc<Texture>,
    pub(crate) escape_goal: Arc<Texture>,
    pub(crate) hazard: Arc<Texture>,
    pub(crate) backdrop: Arc<Texture>,
}

impl GameTextures {
    pub(crate) fn load(registry: &mut TextureRegistry) -> Result<Self, TextureError> {
        Ok(Self {
            logo: registry.load(LOGO_KEY)?,
            player: registry.load(PLAYER_KEY)?,
            rival: registry.load(RIVAL_KEY)?,
            advance_goal: registry.load(ADVANCE_GOAL_KEY)?,
            escape_goal: registry.load(ESCAPE_GOAL_KEY)?,
            hazard: registry.load(HAZARD_KEY)?,
            backdrop: registry.load(BACKDROP_KEY)?,
        })
    }

    pub(crate) fn goal(&self, kind: GoalKind) -> &Arc<Texture> {
        match kind {
            GoalKind::Advance => &self.advance_goal,
            GoalKind::Escape => &self.escape_goal,
        }
    }
}

#[cfg(test)]
mod tests {
    use image::{Rgba, RgbaImage};

    use super::*;

    const ALL_KEYS: [&str; 7] = [
        LOGO_KEY,
        PLAYER_KEY,
        RIVAL_KEY,
        ADVANCE_GOAL_KEY,
        ESCAPE_GOAL_KEY,
        HAZARD_KEY,
        BACKDROP_KEY,
    ];

    #[test]
    fn loads_every_sprite_and_maps_goal_kinds() {
        let dir = tempfile::tempdir().expect("tempdir");
        for (index, key) in ALL_KEYS.iter().enumerate() {
            let size = index as u32 + 1;
            RgbaImage::from_pixel(size, size, Rgba([255, 0, 0, 255]))
                .save(dir.path().join(format!("{key}.png")))
                .expect("write png");
        }

        let mut registry = TextureRegistry::new(dir.path());
        let textures = GameTextures::load(&mut registry).expect("textures");
        assert_eq!(registry.len(), ALL_KEYS.len());
        assert_eq!(textures.goal(GoalKind::Advance).key(), ADVANCE_GOAL_KEY);
        assert_eq!(textures.goal(GoalKind::Escape).key(), ESCAPE_GOAL_KEY);
        assert_eq!(textures.hazard.width(), 6);
    }

    #[test]
    fn missing_sprite_fails_startup() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut registry = TextureRegistry::new(dir.path());
        assert!(matches!(
            GameTextures::load(&mut registry),
            Err(TextureError::Open { .. })
        ));
    }
}
