use std::time::Duration;

use engine::{
    AudioBackend, Canvas, InputAction, InputSnapshot, RenderSurface, Scene, SceneCommand,
};
use tracing::{debug, info};

use super::controls::apply_controls;
use super::entity::Entity;
use super::room_controller::{RoomController, RoomEntities};
use super::rooms::{GoalKind, RoomTable, FIRST_ROOM};
use super::screens;
use super::session::{GameSession, GameState};
use super::textures::GameTextures;
use super::GameConfig;

/// Sound cues, addressed by clip name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Cue {
    Yay,
    Weoo,
    GameOver,
}

impl Cue {
    pub(crate) const ALL: [Cue; 3] = [Cue::Yay, Cue::Weoo, Cue::GameOver];

    pub(crate) fn key(self) -> &'static str {
        match self {
            Cue::Yay => "yay",
            Cue::Weoo => "weoo",
            Cue::GameOver => "gameover",
        }
    }
}

/// Owns the whole game: session state, the current room and its entities,
/// and the cached layers drawn behind them.
pub(crate) struct GameScene {
    config: GameConfig,
    textures: GameTextures,
    rooms: RoomTable,
    audio: Box<dyn AudioBackend>,
    session: GameSession,
    controller: RoomController,
    entities: RoomEntities,
    hazard_layer: Option<Canvas>,
    outcome_snapshot: Option<Canvas>,
}

impl GameScene {
    pub(crate) fn new(
        config: GameConfig,
        textures: GameTextures,
        rooms: RoomTable,
        audio: Box<dyn AudioBackend>,
    ) -> Self {
        let entities = RoomEntities::new(&textures, &config);
        let controller = RoomController::new(config.cell_size);
        Self {
            config,
            textures,
            rooms,
            audio,
            session: GameSession::default(),
            controller,
            entities,
            hazard_layer: None,
            outcome_snapshot: None,
        }
    }

    #[cfg(test)]
    pub(crate) fn session(&self) -> &GameSession {
        &self.session
    }

    #[cfg(test)]
    pub(crate) fn session_mut(&mut self) -> &mut GameSession {
        &mut self.session
    }

    #[cfg(test)]
    pub(crate) fn entities(&self) -> &RoomEntities {
        &self.entities
    }

    #[cfg(test)]
    pub(crate) fn entities_mut(&mut self) -> &mut RoomEntities {
        &mut self.entities
    }

    fn play_cue(&mut self, cue: Cue) {
        self.audio.play(cue.key(), Some(Duration::ZERO));
    }

    fn enter(&mut self, next: GameState) {
        if self.session.transition_to(next) {
            self.controller.invalidate();
        }
    }

    fn run_intro(&mut self, input: &InputSnapshot, surface: &mut dyn RenderSurface) {
        let skip = input.is_down(InputAction::Confirm);
        let opacity = screens::intro_opacity(self.session.intro_frame, &self.config.intro);
        screens::draw_intro(surface, &self.textures.logo, opacity);

        self.session.intro_frame = self.session.intro_frame.saturating_add(1);
        if skip || self.session.intro_frame > self.config.intro.exit_after {
            debug!(intro_frame = self.session.intro_frame, skipped = skip, "intro_finished");
            self.session.intro_frame = 0;
            self.enter(GameState::Play);
        }
    }

    fn run_play(&mut self, input: &InputSnapshot, surface: &mut dyn RenderSurface) {
        let loaded = self.controller.ensure_loaded(
            &mut self.session.room_index,
            &self.rooms,
            &mut self.entities,
            &self.textures,
        );
        if loaded || self.hazard_layer.is_none() {
            self.hazard_layer = Some(build_hazard_layer(surface.size(), &self.entities.hazards));
        }

        // Drawn before anything moves so the frame that resolves a collision
        // shows the sprites where they were, not overlapping.
        self.render_room(surface);
        self.run_controls(input);
        self.run_physics();

        if let Some(outcome) = self.resolve_collisions() {
            self.outcome_snapshot = Some(surface.capture());
            self.enter(outcome);
        }
    }

    fn render_room(&self, surface: &mut dyn RenderSurface) {
        if let Some(layer) = &self.hazard_layer {
            surface.draw_canvas(layer);
        }
        let entities = &self.entities;
        if entities.rival.exists {
            entities.rival.render(surface);
        }
        if entities.backdrop.exists {
            entities.backdrop.render(surface);
        }
        entities.player.render(surface);
        entities.goal.render(surface);
    }

    fn run_controls(&mut self, input: &InputSnapshot) {
        let mode = self.config.velocity_mode;
        apply_controls(
            &mut self.entities.player,
            &self.config.player_controls,
            input,
            mode,
        );
        if self.entities.rival.exists {
            apply_controls(
                &mut self.entities.rival,
                &self.config.rival_controls,
                input,
                mode,
            );
        }
    }

    fn run_physics(&mut self) {
        self.entities.player.physics_step();
        if self.entities.rival.exists {
            self.entities.rival.physics_step();
        }
    }

    /// Applies this tick's collisions in priority order and returns the
    /// outcome state to enter, if any.
    fn resolve_collisions(&mut self) -> Option<GameState> {
        let fell_in_pit = self.entities.backdrop.exists
            && self
                .entities
                .player
                .pixel_collision(&self.entities.backdrop);
        if fell_in_pit {
            info!(room = self.session.room_index, "pit_reset");
            self.controller.invalidate();
        }
        // A pit drops the run back to before the first room, so reaching the
        // goal on the same tick lands on room 1 again.
        let base_room = if fell_in_pit {
            0
        } else {
            self.session.room_index
        };

        if self.entities.player.pixel_collision(&self.entities.goal) {
            self.play_cue(Cue::Yay);
            self.session.room_index = base_room.saturating_add(1).max(FIRST_ROOM);
            return Some(match self.entities.goal_kind {
                GoalKind::Advance => GameState::RoomCleared,
                GoalKind::Escape => GameState::Escaped,
            });
        }
        if fell_in_pit {
            self.session.room_index = FIRST_ROOM;
        }

        if self.entities.rival.exists && self.entities.rival.pixel_collision(&self.entities.goal) {
            self.play_cue(Cue::Weoo);
            return Some(GameState::RivalStole);
        }

        let mut outcome = None;
        for index in 0..self.entities.hazards.len() {
            let (player_hit, rival_hit) = {
                let hazard = &self.entities.hazards[index];
                let rival = &self.entities.rival;
                (
                    self.entities.player.pixel_collision(hazard),
                    rival.exists && rival.pixel_collision(hazard),
                )
            };
            if player_hit {
                self.play_cue(Cue::GameOver);
                outcome = Some(GameState::PlayerLost);
            }
            if rival_hit {
                self.play_cue(Cue::Yay);
                self.entities.rival.exists = false;
                info!(room = self.session.room_index, hazard = index, "rival_caught");
            }
        }
        outcome
    }

    fn run_outcome(
        &mut self,
        state: GameState,
        input: &InputSnapshot,
        surface: &mut dyn RenderSurface,
    ) {
        debug_assert!(state.is_outcome());
        if let Some(snapshot) = &self.outcome_snapshot {
            surface.draw_canvas(snapshot);
        }
        if let Some(message) = screens::outcome_message(state) {
            screens::draw_textbox(surface, message);
        }
        if input.is_down(InputAction::Confirm) {
            self.outcome_snapshot = None;
            self.enter(GameState::Play);
        }
    }
}

fn build_hazard_layer((width, height): (u32, u32), hazards: &[Entity]) -> Canvas {
    let mut layer = Canvas::transparent(width, height);
    for hazard in hazards {
        hazard.render(&mut layer);
    }
    debug!(hazard_count = hazards.len(), "hazard_layer_built");
    layer
}

impl Scene for GameScene {
    fn update(
        &mut self,
        input: &InputSnapshot,
        surface: &mut dyn RenderSurface,
    ) -> SceneCommand {
        self.session.frame_counter = self.session.frame_counter.saturating_add(1);
        match self.session.state {
            GameState::Intro => self.run_intro(input, surface),
            GameState::Play => self.run_play(input, surface),
            outcome => self.run_outcome(outcome, input, surface),
        }
        SceneCommand::None
    }

    fn pause_changed(&mut self, paused: bool) {
        self.session.paused = paused;
        if paused {
            self.audio.pause_all();
        } else {
            self.audio.resume_all();
        }
    }

    fn unload(&mut self) {
        for cue in Cue::ALL {
            self.audio.stop(cue.key());
        }
        info!(
            frames = self.session.frame_counter,
            room = self.session.room_index,
            "scene_unloaded"
        );
    }

    fn debug_title(&self) -> Option<String> {
        let mut title = format!(
            "pubie | {} | room {}",
            self.session.state.name(),
            self.session.room_index
        );
        if self.session.paused {
            title.push_str(" | paused");
        }
        Some(title)
    }
}
