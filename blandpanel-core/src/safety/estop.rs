//! Emergency stop latch
//!
//! Two states, `Armed` and `Estopped`. Only an explicit all-clear leaves
//! `Estopped`; repeated stops are absorbed.

/// Latch states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EstopState {
    /// Actuator rail may be energized; motion is physically effective
    #[default]
    Armed,
    /// Actuator rail is cut until all-clear
    Estopped,
}

/// Latch events
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum EstopEvent {
    /// Emergency stop requested
    Estop,
    /// Operator confirmed it is safe to resume
    AllClear,
}

impl EstopState {
    /// Check if the latch is set
    pub fn is_estopped(&self) -> bool {
        matches!(self, EstopState::Estopped)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: EstopEvent) -> Self {
        use EstopEvent::*;
        use EstopState::*;

        match (self, event) {
            (Armed, Estop) => Estopped,
            (Estopped, Estop) => Estopped,
            (Estopped, AllClear) => Armed,
            (Armed, AllClear) => Armed,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_state() {
        let state = EstopState::default();
        assert_eq!(state, EstopState::Armed);
        assert!(!state.is_estopped());
    }

    #[test]
    fn test_estop_latches() {
        let state = EstopState::Armed.transition(EstopEvent::Estop);
        assert_eq!(state, EstopState::Estopped);
        assert!(state.is_estopped());
    }

    #[test]
    fn test_repeated_estop_is_idempotent() {
        let state = EstopState::Armed
            .transition(EstopEvent::Estop)
            .transition(EstopEvent::Estop);
        assert_eq!(state, EstopState::Estopped);
    }

    #[test]
    fn test_allclear_releases() {
        let state = EstopState::Estopped.transition(EstopEvent::AllClear);
        assert_eq!(state, EstopState::Armed);
    }

    #[test]
    fn test_allclear_when_armed_is_noop() {
        assert_eq!(
            EstopState::Armed.transition(EstopEvent::AllClear),
            EstopState::Armed
        );
    }
}
