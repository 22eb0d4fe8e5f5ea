use std::cell::RefCell;

use futures::channel::oneshot;

use crate::error::{ExtractError, FatalFault, LogError};

use super::CallbackRole;

type Outcome = Result<(), LogError>;

/// Handed to the log subsystem; fires at most once.
#[derive(Debug)]
pub struct Callback {
    role: CallbackRole,
    slot: RefCell<Option<oneshot::Sender<Outcome>>>,
}

/// The coordinator's side of a [`Callback`].
#[derive(Debug)]
pub struct Completion {
    role: CallbackRole,
    rx: oneshot::Receiver<Outcome>,
}

pub fn pair(role: CallbackRole) -> (Callback, Completion) {
    let (tx, rx) = oneshot::channel();
    let callback = Callback {
        role,
        slot: RefCell::new(Some(tx)),
    };
    (callback, Completion { role, rx })
}

impl Callback {
    pub fn role(&self) -> CallbackRole {
        self.role
    }

    pub fn complete(&self) -> Result<(), FatalFault> {
        self.resolve(Ok(()))
    }

    pub fn fail(&self, err: LogError) -> Result<(), FatalFault> {
        self.resolve(Err(err))
    }

    fn resolve(&self, outcome: Outcome) -> Result<(), FatalFault> {
        let tx = self
            .slot
            .borrow_mut()
            .take()
            .ok_or(FatalFault::RepeatedCallback(self.role))?;
        tx.send(outcome)
            .map_err(|_| FatalFault::UnexpectedCallback(self.role))
    }
}

impl Completion {
    pub fn role(&self) -> CallbackRole {
        self.role
    }

    /// Wait for the transition to finish. `inline` is the subsystem's return value;
    /// when set this resolves without suspending.
    pub async fn settle(mut self, inline: bool) -> Result<(), ExtractError> {
        if inline {
            return match self.rx.try_recv() {
                Ok(Some(_)) => Err(FatalFault::DoubleCompletion(self.role).into()),
                _ => Ok(()),
            };
        }

        match self.rx.await {
            Ok(outcome) => outcome.map_err(ExtractError::from),
            Err(oneshot::Canceled) => Err(FatalFault::CallbackDropped(self.role).into()),
        }
    }
}
