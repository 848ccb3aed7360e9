use std::collections::HashMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::SetupError;
use crate::rng::Rng;
use crate::types::Direction;

use super::{
    Controller, GreedyController, InputBinding, InputController, PathfindingController,
    RandomController,
};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StrategyKind {
    Random,
    Greedy,
    Pathfinding,
}

impl StrategyKind {
    pub fn label(self) -> &'static str {
        match self {
            Self::Random => "Random",
            Self::Greedy => "Greedy",
            Self::Pathfinding => "Pathfinding",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "random" => Some(Self::Random),
            "greedy" => Some(Self::Greedy),
            "pathfinding" | "dijkstra" => Some(Self::Pathfinding),
            _ => None,
        }
    }
}

/// Owns the controllers a round can hand out: persistent input bindings and
/// the AI roster. Built by the caller and passed to [`Game::new`](crate::engine::Game::new).
#[derive(Debug)]
pub struct ControllerRegistry {
    inputs: Vec<Arc<InputBinding>>,
    roster: Vec<StrategyKind>,
    rng: Rng,
}

impl ControllerRegistry {
    /// Four input slots (arrows, WASD, two unbound) and the classic roster.
    pub fn new(seed: u32) -> Self {
        let inputs = vec![
            InputBinding::with_keys(
                "Player 1",
                [
                    (Direction::Up, "ArrowUp"),
                    (Direction::Down, "ArrowDown"),
                    (Direction::Left, "ArrowLeft"),
                    (Direction::Right, "ArrowRight"),
                ],
            ),
            InputBinding::with_keys(
                "Player 2",
                [
                    (Direction::Up, "w"),
                    (Direction::Down, "s"),
                    (Direction::Left, "a"),
                    (Direction::Right, "d"),
                ],
            ),
            InputBinding::new("Player 3"),
            InputBinding::new("Player 4"),
        ];
        Self {
            inputs: inputs.into_iter().map(Arc::new).collect(),
            roster: vec![
                StrategyKind::Pathfinding,
                StrategyKind::Greedy,
                StrategyKind::Pathfinding,
                StrategyKind::Random,
            ],
            rng: Rng::new(seed),
        }
    }

    pub fn empty(seed: u32) -> Self {
        Self {
            inputs: Vec::new(),
            roster: Vec::new(),
            rng: Rng::new(seed),
        }
    }

    pub fn inputs(&self) -> &[Arc<InputBinding>] {
        &self.inputs
    }

    pub fn input(&self, index: usize) -> Option<Arc<InputBinding>> {
        self.inputs.get(index).cloned()
    }

    pub fn add_input(&mut self, binding: Arc<InputBinding>) {
        self.inputs.push(binding);
    }

    pub fn roster(&self) -> &[StrategyKind] {
        &self.roster
    }

    pub fn set_roster(&mut self, roster: Vec<StrategyKind>) {
        self.roster = roster;
    }

    pub fn reseed(&mut self, seed: u32) {
        self.rng = Rng::new(seed);
    }

    pub(crate) fn rng_mut(&mut self) -> &mut Rng {
        &mut self.rng
    }

    /// Controllers for input slots `first..first + count`.
    pub fn input_controllers(
        &self,
        first: usize,
        count: usize,
    ) -> Result<Vec<Box<dyn Controller>>, SetupError> {
        let end = first + count;
        if end > self.inputs.len() {
            return Err(SetupError::NotEnoughInputs {
                requested: end,
                available: self.inputs.len(),
            });
        }
        Ok(self.inputs[first..end]
            .iter()
            .map(|binding| Box::new(InputController::new(Arc::clone(binding))) as Box<dyn Controller>)
            .collect())
    }

    /// Fresh AI controllers cycling through the roster, named `"<Strategy> #<n>"`
    /// with `n` counted per strategy.
    pub fn ai_controllers(&mut self, count: usize) -> Result<Vec<Box<dyn Controller>>, SetupError> {
        if count == 0 {
            return Ok(Vec::new());
        }
        if self.roster.is_empty() {
            return Err(SetupError::EmptyRoster { count });
        }
        let mut numbers: HashMap<StrategyKind, usize> = HashMap::new();
        let mut out = Vec::with_capacity(count);
        for i in 0..count {
            let kind = self.roster[i % self.roster.len()];
            let n = numbers.entry(kind).or_insert(0);
            *n += 1;
            let name = format!("{} #{}", kind.label(), n);
            out.push(self.build(kind, name));
        }
        Ok(out)
    }

    /// Random wanderers standing in for human players in headless runs.
    pub fn autopilot_controllers(&mut self, count: usize) -> Vec<Box<dyn Controller>> {
        (0..count)
            .map(|i| self.build(StrategyKind::Random, format!("Autopilot #{}", i + 1)))
            .collect()
    }

    fn build(&mut self, kind: StrategyKind, name: String) -> Box<dyn Controller> {
        match kind {
            StrategyKind::Random => Box::new(RandomController::new(name, self.rng.fork())),
            StrategyKind::Greedy => Box::new(GreedyController::new(name)),
            StrategyKind::Pathfinding => Box::new(PathfindingController::new(name)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ai_controllers_number_each_strategy_separately() {
        let mut registry = ControllerRegistry::new(1);
        let controllers = registry.ai_controllers(6).expect("roster is not empty");
        let names: Vec<&str> = controllers.iter().map(|c| c.name()).collect();
        assert_eq!(
            names,
            vec![
                "Pathfinding #1",
                "Greedy #1",
                "Pathfinding #2",
                "Random #1",
                "Pathfinding #3",
                "Greedy #2"
            ]
        );

        let again = registry.ai_controllers(1).expect("roster is not empty");
        assert_eq!(again[0].name(), "Pathfinding #1");
    }

    #[test]
    fn empty_roster_is_a_setup_error() {
        let mut registry = ControllerRegistry::empty(1);
        assert!(registry.ai_controllers(0).expect("nothing requested").is_empty());
        assert!(matches!(
            registry.ai_controllers(2),
            Err(SetupError::EmptyRoster { count: 2 })
        ));
    }

    #[test]
    fn input_controllers_share_the_registry_bindings() {
        let registry = ControllerRegistry::new(1);
        let controllers = registry.input_controllers(1, 2).expect("slots exist");
        assert_eq!(controllers[0].name(), "Player 2");
        assert_eq!(controllers[1].name(), "Player 3");

        assert!(matches!(
            registry.input_controllers(3, 2),
            Err(SetupError::NotEnoughInputs {
                requested: 5,
                available: 4
            })
        ));
    }

    #[test]
    fn parses_strategy_names() {
        assert_eq!(StrategyKind::parse("Greedy"), Some(StrategyKind::Greedy));
        assert_eq!(StrategyKind::parse(" dijkstra "), Some(StrategyKind::Pathfinding));
        assert_eq!(StrategyKind::parse("chaser"), None);
    }
}
