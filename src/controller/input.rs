use std::collections::HashMap;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, RwLock};

use crate::types::{Direction, Disposition};

use super::{ControlContext, Controller, Steer};

/// A human input slot. The key map and the last pressed direction are shared
/// between whatever captures keys and the [`InputController`] polled by the
/// tick loop, so bindings survive across rounds.
#[derive(Debug)]
pub struct InputBinding {
    name: String,
    keys: RwLock<HashMap<String, Direction>>,
    current: AtomicU8,
}

impl InputBinding {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            keys: RwLock::new(HashMap::new()),
            current: AtomicU8::new(Direction::Stopped.to_u8()),
        }
    }

    pub fn with_keys<'a>(
        name: impl Into<String>,
        keys: impl IntoIterator<Item = (Direction, &'a str)>,
    ) -> Self {
        let binding = Self::new(name);
        for (direction, key) in keys {
            binding.set_key(direction, key);
        }
        binding
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Binds `key` to `direction`, replacing the key previously bound to it.
    pub fn set_key(&self, direction: Direction, key: impl Into<String>) {
        let mut keys = self.keys.write().unwrap_or_else(|poisoned| poisoned.into_inner());
        keys.retain(|_, bound| *bound != direction);
        keys.insert(key.into(), direction);
    }

    pub fn key_for(&self, direction: Direction) -> Option<String> {
        let keys = self.keys.read().unwrap_or_else(|poisoned| poisoned.into_inner());
        keys.iter()
            .find(|(_, bound)| **bound == direction)
            .map(|(key, _)| key.clone())
    }

    /// Records a key press. Unbound keys are ignored and reported as `false`.
    pub fn press(&self, key: &str) -> bool {
        let direction = {
            let keys = self.keys.read().unwrap_or_else(|poisoned| poisoned.into_inner());
            keys.get(key).copied()
        };
        match direction {
            Some(direction) => {
                self.set_direction(direction);
                true
            }
            None => false,
        }
    }

    pub fn set_direction(&self, direction: Direction) {
        self.current.store(direction.to_u8(), Ordering::Relaxed);
    }

    pub fn direction(&self) -> Direction {
        Direction::from_u8(self.current.load(Ordering::Relaxed))
    }

    pub fn release(&self) {
        self.set_direction(Direction::Stopped);
    }
}

/// Polls an [`InputBinding`] once per tick.
#[derive(Debug, Clone)]
pub struct InputController {
    binding: Arc<InputBinding>,
}

impl InputController {
    pub fn new(binding: Arc<InputBinding>) -> Self {
        Self { binding }
    }

    pub fn binding(&self) -> &Arc<InputBinding> {
        &self.binding
    }
}

impl Controller for InputController {
    fn next_direction(&mut self, ctx: &ControlContext<'_>) -> Steer {
        Steer {
            direction: self.binding.direction(),
            disposition: ctx
                .nearest_target()
                .map(|target| Disposition::facing(target.mode())),
        }
    }

    fn name(&self) -> &str {
        self.binding.name()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::actor::{ActorKind, Motion};
    use crate::map::Map;
    use crate::types::{Cell, Speed};

    fn arrows() -> InputBinding {
        InputBinding::with_keys(
            "Player 1",
            [
                (Direction::Up, "ArrowUp"),
                (Direction::Down, "ArrowDown"),
                (Direction::Left, "ArrowLeft"),
                (Direction::Right, "ArrowRight"),
            ],
        )
    }

    #[test]
    fn press_maps_keys_to_directions() {
        let binding = arrows();
        assert_eq!(binding.direction(), Direction::Stopped);
        assert!(binding.press("ArrowLeft"));
        assert_eq!(binding.direction(), Direction::Left);
        assert!(!binding.press("q"));
        assert_eq!(binding.direction(), Direction::Left);
    }

    #[test]
    fn rebinding_replaces_the_old_key() {
        let binding = arrows();
        binding.set_key(Direction::Up, "w");
        assert_eq!(binding.key_for(Direction::Up).as_deref(), Some("w"));
        assert!(!binding.press("ArrowUp"));
        assert!(binding.press("w"));
        assert_eq!(binding.direction(), Direction::Up);
    }

    #[test]
    fn controller_reads_the_shared_binding() {
        let binding = Arc::new(arrows());
        let mut controller = InputController::new(Arc::clone(&binding));
        let map = Map::parse("open", "3 3\n   \n   \n   \n").expect("open parses");
        let actor = Motion::new(ActorKind::Pursued, Cell::new(1, 1), Speed::VeryFast);
        let ctx = ControlContext {
            actor: &actor,
            map: &map,
            pursued: &[],
        };

        binding.press("ArrowDown");
        assert_eq!(controller.next_direction(&ctx), Steer::go(Direction::Down));
        binding.release();
        assert_eq!(controller.next_direction(&ctx), Steer::stop());
        assert_eq!(controller.name(), "Player 1");
    }
}
