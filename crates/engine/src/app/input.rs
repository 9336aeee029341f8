/// Held-state actions sampled every tick. Discrete presses (jump, menu) travel
/// as edges on [`InputSnapshot`](super::InputSnapshot) instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum InputAction {
    MoveLeft,
    MoveRight,
    MoveDown,
}

const ACTION_COUNT: usize = 3;

#[derive(Debug, Clone, Copy, Default)]
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
}

impl InputAction {
    const fn index(self) -> usize {
        match self {
            InputAction::MoveLeft => 0,
            InputAction::MoveRight => 1,
            InputAction::MoveDown => 2,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn actions_are_tracked_independently() {
        let mut states = ActionStates::default();
        states.set(InputAction::MoveLeft, true);
        states.set(InputAction::MoveDown, true);
        states.set(InputAction::MoveDown, false);

        assert!(states.is_down(InputAction::MoveLeft));
        assert!(!states.is_down(InputAction::MoveRight));
        assert!(!states.is_down(InputAction::MoveDown));
    }
}
