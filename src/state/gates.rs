use std::sync::Arc;

use dashmap::DashMap;
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

/// Per-game async locks. Operations on one game run one at a time while
/// different games proceed independently.
///
/// A gate only lives in the registry while someone holds or waits for it.
#[derive(Debug, Default)]
pub struct GameGates {
    gates: DashMap<Uuid, Arc<Mutex<()>>>,
}

/// Exclusive access to one game. Dropping it unlocks the game and forgets the
/// gate when nobody else is waiting.
pub struct GameGate<'a> {
    gates: &'a GameGates,
    game_id: Uuid,
    guard: Option<OwnedMutexGuard<()>>,
}

impl GameGates {
    /// Create an empty gate registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for exclusive access to `game_id`.
    pub async fn acquire(&self, game_id: Uuid) -> GameGate<'_> {
        let gate = self.gates.entry(game_id).or_default().clone();
        let guard = gate.lock_owned().await;
        GameGate {
            gates: self,
            game_id,
            guard: Some(guard),
        }
    }

    /// Number of games with a held or awaited gate.
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    /// Whether no gate is held or awaited.
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    fn release(&self, game_id: Uuid) {
        self.gates
            .remove_if(&game_id, |_, gate| Arc::strong_count(gate) == 1);
    }
}

impl Drop for GameGate<'_> {
    fn drop(&mut self) {
        self.guard.take();
        self.gates.release(self.game_id);
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[tokio::test]
    async fn same_game_is_serialized() {
        let gates = GameGates::new();
        let id = Uuid::new_v4();

        let guard = gates.acquire(id).await;
        let blocked = tokio::time::timeout(Duration::from_millis(20), gates.acquire(id)).await;
        assert!(blocked.is_err());

        drop(guard);
        let reacquired = tokio::time::timeout(Duration::from_millis(20), gates.acquire(id)).await;
        assert!(reacquired.is_ok());
    }

    #[tokio::test]
    async fn different_games_do_not_block_each_other() {
        let gates = GameGates::new();
        let _first = gates.acquire(Uuid::new_v4()).await;
        let second =
            tokio::time::timeout(Duration::from_millis(20), gates.acquire(Uuid::new_v4())).await;
        assert!(second.is_ok());
    }

    #[tokio::test]
    async fn dropped_gate_is_forgotten() {
        let gates = GameGates::new();
        let guard = gates.acquire(Uuid::new_v4()).await;
        assert_eq!(gates.len(), 1);

        drop(guard);
        assert!(gates.is_empty());
    }

    #[tokio::test]
    async fn gate_with_a_waiter_is_kept() {
        let gates = GameGates::new();
        let id = Uuid::new_v4();

        let guard = gates.acquire(id).await;
        let waiter = gates.gates.get(&id).map(|gate| gate.value().clone());
        drop(guard);
        assert_eq!(gates.len(), 1);

        drop(waiter);
        drop(gates.acquire(id).await);
        assert!(gates.is_empty());
    }
}
