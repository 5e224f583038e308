#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    Confirm,
    MoveUp,
    MoveDown,
    MoveLeft,
    MoveRight,
    Quit,
}

const ACTION_COUNT: usize = 6;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub(crate) struct ActionStates {
    down: [bool; ACTION_COUNT],
}

impl ActionStates {
    pub(crate) fn set(&mut self, action: InputAction, is_down: bool) {
        self.down[action.index()] = is_down;
    }

    pub(crate) fn is_down(&self, action: InputAction) -> bool {
        self.down[action.index()]
    }

    pub(crate) fn clear(&mut self) {
        self.down = [false; ACTION_COUNT];
    }
}

impl InputAction {
    pub const ALL: [InputAction; ACTION_COUNT] = [
        InputAction::Confirm,
        InputAction::MoveUp,
        InputAction::MoveDown,
        InputAction::MoveLeft,
        InputAction::MoveRight,
        InputAction::Quit,
    ];

    const fn index(self) -> usize {
        match self {
            InputAction::Confirm => 0,
            InputAction::MoveUp => 1,
            InputAction::MoveDown => 2,
            InputAction::MoveLeft => 3,
            InputAction::MoveRight => 4,
            InputAction::Quit => 5,
        }
    }
}

/// Held-action state frozen at the start of a tick. Scenes only ever see a
/// snapshot, so key events arriving mid-tick cannot change what they read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct InputSnapshot {
    actions: ActionStates,
}

impl InputSnapshot {
    pub fn empty() -> Self {
        Self::default()
    }

    pub(crate) fn from_states(actions: ActionStates) -> Self {
        Self { actions }
    }

    pub fn is_down(&self, action: InputAction) -> bool {
        self.actions.is_down(action)
    }

    pub fn with_action_down(mut self, action: InputAction, is_down: bool) -> Self {
        self.actions.set(action, is_down);
        self
    }

    pub fn any_down(&self) -> bool {
        InputAction::ALL
            .iter()
            .any(|action| self.actions.is_down(*action))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn action_indices_are_unique() {
        let mut seen = [false; ACTION_COUNT];
        for action in InputAction::ALL {
            assert!(!seen[action.index()], "{action:?}");
            seen[action.index()] = true;
        }
    }

    #[test]
    fn clear_releases_every_action() {
        let mut states = ActionStates::default();
        states.set(InputAction::MoveUp, true);
        states.set(InputAction::Confirm, true);
        states.clear();

        assert!(!InputSnapshot::from_states(states).any_down());
    }

    #[test]
    fn snapshot_builder_sets_and_releases() {
        let snapshot = InputSnapshot::empty()
            .with_action_down(InputAction::MoveLeft, true)
            .with_action_down(InputAction::MoveRight, true)
            .with_action_down(InputAction::MoveRight, false);

        assert!(snapshot.is_down(InputAction::MoveLeft));
        assert!(!snapshot.is_down(InputAction::MoveRight));
        assert!(snapshot.any_down());
    }
}
