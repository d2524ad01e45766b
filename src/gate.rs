use std::collections::HashSet;
use tracing::debug;

/// User actions that must not overlap with themselves.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq)]
pub enum Action {
    Armory,
    SignIn,
    TenDraw,
    Redeem,
}

#[derive(Debug, Default)]
pub struct ActionGate {
    busy: HashSet<Action>,
}

impl ActionGate {
    /// Marks `action` in flight. Returns `false` if it already was.
    pub fn try_begin(&mut self, action: Action) -> bool {
        let started = self.busy.insert(action);
        if !started {
            debug!(?action, "action already in flight");
        }
        started
    }

    pub fn finish(&mut self, action: Action) {
        self.busy.remove(&action);
    }

    pub fn is_busy(&self, action: Action) -> bool {
        self.busy.contains(&action)
    }
}

#[allow(non_snake_case)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn try_begin__refuses_second_start_until_finished() {
        // given
        let mut gate = ActionGate::default();

        // when
        let first = gate.try_begin(Action::SignIn);
        let second = gate.try_begin(Action::SignIn);
        gate.finish(Action::SignIn);
        let third = gate.try_begin(Action::SignIn);

        // then
        assert!(first);
        assert!(!second);
        assert!(third);
    }

    #[test]
    fn try_begin__tracks_actions_independently() {
        let mut gate = ActionGate::default();

        assert!(gate.try_begin(Action::Redeem));
        assert!(gate.try_begin(Action::TenDraw));
        assert!(gate.is_busy(Action::Redeem));
        assert!(!gate.is_busy(Action::Armory));
    }
}
