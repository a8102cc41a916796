//! Two-state alert trigger with edge-triggered notifications.

use crate::params::TriggerParams;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
pub enum TriggerState {
    #[default]
    Normal,
    Alert,
}

/// Emitted only when the state actually changes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerEvent {
    Entered(TriggerState),
}

impl TriggerEvent {
    /// Whether this event switches alert styling on
    pub fn alert_active(&self) -> bool {
        matches!(self, TriggerEvent::Entered(TriggerState::Alert))
    }
}

/// Level test on one feature, evaluated fresh every tick
///
/// No hysteresis band and no dwell time: a feature hovering around the
/// threshold flips the state on every crossing.
#[derive(Debug, Clone)]
pub struct TriggerMachine {
    threshold: f32,
    state: TriggerState,
}

impl TriggerMachine {
    pub fn new(params: &TriggerParams) -> Self {
        Self {
            threshold: params.threshold,
            state: TriggerState::Normal,
        }
    }

    pub fn state(&self) -> TriggerState {
        self.state
    }

    /// Feed this tick's driving feature
    pub fn update(&mut self, feature: f32) -> Option<TriggerEvent> {
        let next = if feature > self.threshold {
            TriggerState::Alert
        } else {
            TriggerState::Normal
        };

        if next == self.state {
            return None;
        }

        tracing::debug!(
            "Trigger {:?} -> {:?} (feature {:.1}, threshold {:.1})",
            self.state,
            next,
            feature,
            self.threshold
        );
        self.state = next;
        Some(TriggerEvent::Entered(next))
    }
}
