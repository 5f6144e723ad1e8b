use thiserror::Error;

use crate::dao::models::GameEntity;

/// Lifecycle phases of a game lobby.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Created and accepting players; no board yet.
    Open,
    /// Started; a generated board is attached.
    Started,
    /// Removed from storage. Terminal.
    Deleted,
}

/// Events that can be applied to a game's lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    /// A player joins the lobby.
    Join,
    /// The game is started and its board generated.
    Start,
    /// The game is deleted.
    Delete,
}

/// Error returned when attempting to apply an invalid transition.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid transition: {event:?} cannot be applied while in {from:?}")]
pub struct InvalidTransition {
    /// The phase the game was in when the invalid event was received.
    pub from: GamePhase,
    /// The event that cannot be applied from this phase.
    pub event: GameEvent,
}

impl GamePhase {
    /// Phase of a persisted game row.
    pub fn of(game: &GameEntity) -> Self {
        if game.started {
            GamePhase::Started
        } else {
            GamePhase::Open
        }
    }

    /// Compute the phase reached by applying `event`, if the transition is valid.
    ///
    /// Joining is allowed in both live phases; starting only from [`GamePhase::Open`].
    pub fn next(self, event: GameEvent) -> Result<GamePhase, InvalidTransition> {
        let next = match (self, event) {
            (GamePhase::Open, GameEvent::Join) => GamePhase::Open,
            (GamePhase::Started, GameEvent::Join) => GamePhase::Started,
            (GamePhase::Open, GameEvent::Start) => GamePhase::Started,
            (GamePhase::Open | GamePhase::Started, GameEvent::Delete) => GamePhase::Deleted,
            (from, event) => return Err(InvalidTransition { from, event }),
        };

        Ok(next)
    }
}
