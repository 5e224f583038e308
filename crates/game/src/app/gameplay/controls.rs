use engine::{InputAction, InputSnapshot};

use super::entity::{Entity, VelocityMode};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Direction {
    Up,
    Down,
    Left,
    Right,
}

impl Direction {
    fn unit(self) -> (f32, f32) {
        match self {
            Direction::Up => (0.0, -1.0),
            Direction::Down => (0.0, 1.0),
            Direction::Left => (-1.0, 0.0),
            Direction::Right => (1.0, 0.0),
        }
    }
}

/// Which held action drives each direction, and which direction wins when
/// several are held at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct ControlScheme {
    pub(crate) up: InputAction,
    pub(crate) down: InputAction,
    pub(crate) left: InputAction,
    pub(crate) right: InputAction,
    pub(crate) precedence: [Direction; 4],
}

impl ControlScheme {
    pub(crate) fn player() -> Self {
        Self {
            up: InputAction::MoveUp,
            down: InputAction::MoveDown,
            left: InputAction::MoveLeft,
            right: InputAction::MoveRight,
            precedence: [
                Direction::Up,
                Direction::Down,
                Direction::Right,
                Direction::Left,
            ],
        }
    }

    /// Every direction wired to the opposite key, with the precedence order
    /// mirrored so ties break the same way they do for the player.
    pub(crate) fn mirrored_rival() -> Self {
        Self {
            up: InputAction::MoveDown,
            down: InputAction::MoveUp,
            left: InputAction::MoveRight,
            right: InputAction::MoveLeft,
            precedence: [
                Direction::Down,
                Direction::Up,
                Direction::Left,
                Direction::Right,
            ],
        }
    }

    fn action_for(&self, direction: Direction) -> InputAction {
        match direction {
            Direction::Up => self.up,
            Direction::Down => self.down,
            Direction::Left => self.left,
            Direction::Right => self.right,
        }
    }

    /// The first direction in precedence order whose action is held.
    pub(crate) fn resolve(&self, input: &InputSnapshot) -> Option<Direction> {
        self.precedence
            .iter()
            .copied()
            .find(|direction| input.is_down(self.action_for(*direction)))
    }
}

/// Issues at most one velocity command to `entity`. With nothing held the
/// entity keeps coasting under friction.
pub(crate) fn apply_controls(
    entity: &mut Entity,
    scheme: &ControlScheme,
    input: &InputSnapshot,
    mode: VelocityMode,
) -> Option<Direction> {
    let direction = scheme.resolve(input)?;
    let (dx, dy) = direction.unit();
    let speed = entity.speed;
    entity.apply_command(dx * speed, dy * speed, mode);
    Some(direction)
}
