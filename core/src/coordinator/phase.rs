//! Coordinator phases and transition rules

use crate::error::FatalFault;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Created,
    LoggingUp,
    Running,
    LoggingDown,
    Terminated,
}

impl Phase {
    /// The only phase reachable from `self`.
    pub fn next(self) -> Option<Phase> {
        match self {
            Phase::Created => Some(Phase::LoggingUp),
            Phase::LoggingUp => Some(Phase::Running),
            Phase::Running => Some(Phase::LoggingDown),
            Phase::LoggingDown => Some(Phase::Terminated),
            Phase::Terminated => None,
        }
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Terminated)
    }

    pub fn description(self) -> &'static str {
        match self {
            Phase::Created => "created",
            Phase::LoggingUp => "starting logging",
            Phase::Running => "running",
            Phase::LoggingDown => "stopping logging",
            Phase::Terminated => "terminated",
        }
    }
}

pub fn validate(from: Phase, to: Phase) -> Result<(), FatalFault> {
    if from.next() == Some(to) {
        Ok(())
    } else {
        Err(FatalFault::InvalidTransition { from, to })
    }
}
