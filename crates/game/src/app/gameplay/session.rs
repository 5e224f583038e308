use tracing::info;

use super::rooms::FIRST_ROOM;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum GameState {
    Intro,
    Play,
    RoomCleared,
    RivalStole,
    Escaped,
    PlayerLost,
}

impl GameState {
    pub(crate) fn is_outcome(self) -> bool {
        matches!(
            self,
            GameState::RoomCleared
                | GameState::RivalStole
                | GameState::Escaped
                | GameState::PlayerLost
        )
    }

    /// Outcomes that end the run and send the player back to the first room.
    pub(crate) fn resets_room(self) -> bool {
        matches!(
            self,
            GameState::RivalStole | GameState::Escaped | GameState::PlayerLost
        )
    }

    pub(crate) fn name(self) -> &'static str {
        match self {
            GameState::Intro => "intro",
            GameState::Play => "play",
            GameState::RoomCleared => "room_cleared",
            GameState::RivalStole => "rival_stole",
            GameState::Escaped => "escaped",
            GameState::PlayerLost => "player_lost",
        }
    }
}

#[derive(Debug, Clone)]
pub(crate) struct GameSession {
    pub(crate) state: GameState,
    pub(crate) room_index: u32,
    /// Logical ticks run since startup.
    pub(crate) frame_counter: u64,
    pub(crate) intro_frame: u32,
    pub(crate) paused: bool,
}

impl Default for GameSession {
    fn default() -> Self {
        Self {
            state: GameState::Intro,
            room_index: FIRST_ROOM,
            frame_counter: 0,
            intro_frame: 0,
            paused: false,
        }
    }
}

impl GameSession {
    /// Switches state, resetting the room index when `next` ends the run.
    /// Returns `true` when the room index was reset.
    pub(crate) fn transition_to(&mut self, next: GameState) -> bool {
        let previous = self.state;
        self.state = next;
        let reset = next.resets_room();
        if reset {
            self.room_index = FIRST_ROOM;
        }
        info!(
            from = previous.name(),
            to = next.name(),
            room = self.room_index,
            frame = self.frame_counter,
            "state_changed"
        );
        reset
    }
}
