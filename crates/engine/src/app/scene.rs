use super::{InputSnapshot, RenderSurface};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SceneCommand {
    None,
    Quit,
}

/// A scene owns all game state and runs one logical tick per call to
/// `update`. The surface has already been cleared to the background colour;
/// the scene draws the whole frame itself.
pub trait Scene {
    fn update(&mut self, input: &InputSnapshot, surface: &mut dyn RenderSurface)
        -> SceneCommand;

    /// Called on focus loss (`true`) and focus gain (`false`).
    fn pause_changed(&mut self, _paused: bool) {}

    fn unload(&mut self) {}

    fn debug_title(&self) -> Option<String> {
        None
    }
}
