// src/exec/state.rs

//! Lifecycle of a generation session.

use crate::errors::{PowhegError, Result};

/// `Idle -> Launching -> Running -> Finalizing -> Done`, strictly linear.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Nothing started yet.
    Idle,
    /// Stale output is being cleared and the child spawned.
    Launching,
    /// Child running; its output is being streamed.
    Running,
    /// Child output exhausted; heartbeat stopped, output being moved.
    Finalizing,
    Done,
}

impl SessionState {
    pub fn successor(self) -> Option<SessionState> {
        match self {
            SessionState::Idle => Some(SessionState::Launching),
            SessionState::Launching => Some(SessionState::Running),
            SessionState::Running => Some(SessionState::Finalizing),
            SessionState::Finalizing => Some(SessionState::Done),
            SessionState::Done => None,
        }
    }

    /// Move to `next` if it is the direct successor.
    pub fn advance(&mut self, next: SessionState) -> Result<()> {
        if self.successor() != Some(next) {
            return Err(PowhegError::InvalidTransition {
                from: *self,
                to: next,
            });
        }
        *self = next;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn walks_the_linear_path() {
        let mut s = SessionState::Idle;
        for next in [
            SessionState::Launching,
            SessionState::Running,
            SessionState::Finalizing,
            SessionState::Done,
        ] {
            s.advance(next).unwrap();
        }
        assert_eq!(s, SessionState::Done);
        assert_eq!(s.successor(), None);
    }

    #[test]
    fn rejects_skips_and_backtracking() {
        let mut s = SessionState::Idle;
        let err = s.advance(SessionState::Running).unwrap_err();
        assert!(matches!(
            err,
            PowhegError::InvalidTransition {
                from: SessionState::Idle,
                to: SessionState::Running
            }
        ));
        assert_eq!(s, SessionState::Idle);

        s.advance(SessionState::Launching).unwrap();
        assert!(s.advance(SessionState::Idle).is_err());
    }
}
