use crate::actor::{ActorKind, Pursued, Pursuer};
use crate::config::GameConfig;
use crate::controller::{ControlContext, Controller, ControllerRegistry, Steer};
use crate::error::SetupError;
use crate::listener::{PursuedListener, PursuerListener, RoundListener};
use crate::map::Map;
use crate::rng::Rng;
use crate::types::{Cell, MapView, PursuedMode, RoundOutcome, RoundState, Snapshot};

mod runtime;
mod spawn_system;
mod utils;

pub use self::runtime::GameRuntime;

use self::spawn_system::{allocate_pursued_spawns, allocate_pursuer_spawns};
use self::utils::whole_seconds_between;

/// One round on one map: the sole owner and mutator of map and actor state.
pub struct Game {
    config: GameConfig,
    map: Map,
    pristine: Map,
    pursued: Vec<Pursued>,
    pursuers: Vec<Pursuer>,
    round_listener: Option<Box<dyn RoundListener>>,

    state: RoundState,
    tick_counter: u64,
    started_at_ms: u64,
    paused_at_ms: u64,
    elapsed_seconds: i64,
    reported_seconds: Option<i64>,
}

impl std::fmt::Debug for Game {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Game")
            .field("map", &self.map.name())
            .field("state", &self.state)
            .field("tick", &self.tick_counter)
            .field("pursued", &self.pursued)
            .field("pursuers", &self.pursuers)
            .finish()
    }
}

impl Game {
    /// Wires actors and controllers for a round. Input-bound pursued actors
    /// take the first input slots, input-bound pursuers the ones after them.
    pub fn new(
        config: GameConfig,
        map: Map,
        registry: &mut ControllerRegistry,
    ) -> Result<Self, SetupError> {
        config.validate()?;
        if !config.roster.is_empty() {
            registry.set_roster(config.roster.clone());
        }

        let pursued_spawns = allocate_pursued_spawns(&map, config.pursued_count)?;
        let pursuer_spawns =
            allocate_pursuer_spawns(&map, config.pursuer_count, registry.rng_mut())?;

        let pursued_controllers = if config.autopilot {
            registry.autopilot_controllers(config.pursued_count)
        } else {
            registry.input_controllers(0, config.pursued_count)?
        };
        let first_input_pursuer = if config.autopilot { 0 } else { config.pursued_count };
        let mut pursuer_controllers =
            registry.input_controllers(first_input_pursuer, config.input_pursuers)?;
        pursuer_controllers
            .extend(registry.ai_controllers(config.pursuer_count - config.input_pursuers)?);

        let pursued = pursued_spawns
            .into_iter()
            .zip(pursued_controllers)
            .map(|(spawn, controller)| {
                let name = controller.name().to_string();
                Pursued::new(
                    name,
                    spawn,
                    config.pursued_speed,
                    config.lives,
                    Some(controller),
                )
            })
            .collect();
        let pursuer_speed = config.pursuer_speed();
        let pursuers = pursuer_spawns
            .into_iter()
            .zip(pursuer_controllers)
            .map(|(spawn, controller)| Pursuer::new(spawn, pursuer_speed, Some(controller)))
            .collect();

        Ok(Self {
            config,
            pristine: map.clone(),
            map,
            pursued,
            pursuers,
            round_listener: None,
            state: RoundState::Ready,
            tick_counter: 0,
            started_at_ms: 0,
            paused_at_ms: 0,
            elapsed_seconds: 0,
            reported_seconds: None,
        })
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn map(&self) -> &Map {
        &self.map
    }

    pub fn pursued(&self) -> &[Pursued] {
        &self.pursued
    }

    pub fn pursuers(&self) -> &[Pursuer] {
        &self.pursuers
    }

    pub fn state(&self) -> RoundState {
        self.state
    }

    pub fn tick_count(&self) -> u64 {
        self.tick_counter
    }

    pub fn outcome(&self) -> Option<RoundOutcome> {
        match self.state {
            RoundState::Won => Some(RoundOutcome::Won),
            RoundState::Lost => Some(RoundOutcome::Lost),
            RoundState::Terminated => Some(RoundOutcome::Terminated),
            RoundState::Ready | RoundState::Running | RoundState::Paused => None,
        }
    }

    pub fn elapsed_seconds(&self) -> i64 {
        self.elapsed_seconds
    }

    pub fn remaining_seconds(&self) -> i64 {
        self.config.round_seconds - self.elapsed_seconds
    }

    /// Round time at `now_ms`, excluding time spent paused.
    pub fn elapsed_ms(&self, now_ms: u64) -> u64 {
        match self.state {
            RoundState::Ready => 0,
            RoundState::Paused => self.paused_at_ms.saturating_sub(self.started_at_ms),
            _ => now_ms.saturating_sub(self.started_at_ms),
        }
    }

    pub fn set_round_listener(&mut self, mut listener: Box<dyn RoundListener>) {
        listener.map_name_set(self.map.name());
        self.round_listener = Some(listener);
    }

    pub fn clear_round_listener(&mut self) {
        self.round_listener = None;
    }

    /// Returns `false` when no pursued actor has that index.
    pub fn set_pursued_listener(&mut self, index: usize, listener: Box<dyn PursuedListener>) -> bool {
        match self.pursued.get_mut(index) {
            Some(pursued) => {
                pursued.set_listener(listener);
                true
            }
            None => false,
        }
    }

    pub fn set_pursuer_listener(&mut self, index: usize, listener: Box<dyn PursuerListener>) -> bool {
        match self.pursuers.get_mut(index) {
            Some(pursuer) => {
                pursuer.set_listener(listener);
                true
            }
            None => false,
        }
    }

    /// Swaps in a controller and hands back the previous one.
    pub fn attach_pursued_controller(
        &mut self,
        index: usize,
        controller: Box<dyn Controller>,
    ) -> Option<Box<dyn Controller>> {
        self.pursued
            .get_mut(index)
            .and_then(|pursued| pursued.controller.replace(controller))
    }

    /// A detached actor keeps coasting in its committed direction until blocked.
    pub fn detach_pursued_controller(&mut self, index: usize) -> Option<Box<dyn Controller>> {
        self.pursued
            .get_mut(index)
            .and_then(|pursued| pursued.controller.take())
    }

    pub fn attach_pursuer_controller(
        &mut self,
        index: usize,
        controller: Box<dyn Controller>,
    ) -> Option<Box<dyn Controller>> {
        self.pursuers
            .get_mut(index)
            .and_then(|pursuer| pursuer.controller.replace(controller))
    }

    pub fn detach_pursuer_controller(&mut self, index: usize) -> Option<Box<dyn Controller>> {
        self.pursuers
            .get_mut(index)
            .and_then(|pursuer| pursuer.controller.take())
    }

    pub fn start(&mut self, now_ms: u64) {
        if self.state != RoundState::Ready {
            return;
        }
        self.started_at_ms = now_ms;
        self.state = RoundState::Running;
        tracing::info!(
            map = %self.map.name(),
            pursued = self.pursued.len(),
            pursuers = self.pursuers.len(),
            "round started"
        );
        if let Some(listener) = self.round_listener.as_mut() {
            listener.map_name_set(self.map.name());
            listener.round_started();
        }
    }

    pub fn pause(&mut self, now_ms: u64) {
        if self.state == RoundState::Running {
            self.paused_at_ms = now_ms;
            self.state = RoundState::Paused;
            tracing::debug!(at_ms = now_ms, "round paused");
        }
    }

    /// Shifts the round start and every empowerment window by the paused span.
    pub fn resume(&mut self, now_ms: u64) {
        if self.state != RoundState::Paused {
            return;
        }
        let paused_for = now_ms.saturating_sub(self.paused_at_ms);
        self.started_at_ms += paused_for;
        for pursued in &mut self.pursued {
            pursued.shift_empowerment(paused_for);
        }
        self.state = RoundState::Running;
        tracing::debug!(paused_for_ms = paused_for, "round resumed");
    }

    pub fn toggle_pause(&mut self, now_ms: u64) {
        match self.state {
            RoundState::Running => self.pause(now_ms),
            RoundState::Paused => self.resume(now_ms),
            _ => {}
        }
    }

    /// Fresh round on the pristine map: lives, scores, counters and the timer
    /// reset; controllers stay attached.
    pub fn restart(&mut self, now_ms: u64) {
        self.map = self.pristine.clone();
        for pursued in &mut self.pursued {
            pursued.restart();
        }
        for pursuer in &mut self.pursuers {
            pursuer.restart();
        }
        self.tick_counter = 0;
        self.elapsed_seconds = 0;
        self.reported_seconds = None;
        self.state = RoundState::Ready;
        tracing::info!(map = %self.map.name(), "round restarted");
        self.start(now_ms);
    }

    /// Stops the round for good; observed by drivers at the next tick boundary.
    pub fn destroy(&mut self) {
        if !self.state.is_finished() {
            tracing::info!(tick = self.tick_counter, "round terminated");
        }
        self.state = RoundState::Terminated;
    }

    /// Advances the round by one tick at `now_ms` and returns the new state.
    /// Does nothing unless the round is running.
    pub fn tick(&mut self, now_ms: u64) -> RoundState {
        if self.state != RoundState::Running {
            return self.state;
        }
        self.tick_counter += 1;

        if self.map.all_collectibles_consumed() {
            self.finish(RoundState::Won);
            return self.state;
        }

        self.move_pursued(now_ms);
        self.move_pursuers();
        self.resolve_collisions();
        self.update_timer(now_ms);

        if self.map.all_collectibles_consumed() {
            self.finish(RoundState::Won);
        } else if !self.pursued.iter().any(Pursued::is_alive) {
            self.finish(RoundState::Lost);
        } else if self
            .pursued
            .iter()
            .filter(|p| p.is_alive())
            .all(Pursued::is_dead)
        {
            self.start_sub_round(now_ms);
        }
        self.state
    }

    fn move_pursued(&mut self, now_ms: u64) {
        for idx in 0..self.pursued.len() {
            if !self.pursued[idx].is_active() {
                continue;
            }
            let mut controller = self.pursued[idx].controller.take();
            let steer = match controller.as_mut() {
                Some(controller) => controller.next_direction(&ControlContext {
                    actor: &self.pursued[idx].motion,
                    map: &self.map,
                    pursued: &self.pursued,
                }),
                None => Steer::stop(),
            };
            let pursued = &mut self.pursued[idx];
            pursued.controller = controller;
            pursued.step(&mut self.map, steer.direction, now_ms);
        }
    }

    fn move_pursuers(&mut self) {
        for idx in 0..self.pursuers.len() {
            let mut controller = self.pursuers[idx].controller.take();
            let steer = match controller.as_mut() {
                Some(controller) => controller.next_direction(&ControlContext {
                    actor: &self.pursuers[idx].motion,
                    map: &self.map,
                    pursued: &self.pursued,
                }),
                None => Steer::stop(),
            };
            let pursuer = &mut self.pursuers[idx];
            pursuer.controller = controller;
            if let Some(disposition) = steer.disposition {
                pursuer.set_disposition(disposition);
            }
            pursuer.step(&self.map, steer.direction);
        }
    }

    fn resolve_collisions(&mut self) {
        let map = &self.map;
        for pursued in self.pursued.iter_mut() {
            for pursuer in self.pursuers.iter_mut() {
                if !pursued.is_active() {
                    break;
                }
                if !pursued.motion.collides(&pursuer.motion, map) {
                    continue;
                }
                match pursued.mode() {
                    PursuedMode::Normal => {
                        pursuer.capture();
                        pursued.capture();
                    }
                    PursuedMode::Empowered => {
                        pursued.eat();
                        pursuer.die();
                    }
                }
            }
        }
    }

    fn update_timer(&mut self, now_ms: u64) {
        self.elapsed_seconds = whole_seconds_between(self.started_at_ms, now_ms);
        let remaining = self.remaining_seconds();
        if self.reported_seconds != Some(self.elapsed_seconds) {
            self.reported_seconds = Some(self.elapsed_seconds);
            if let Some(listener) = self.round_listener.as_mut() {
                listener.time_tick(self.elapsed_seconds, remaining);
            }
        }
        if remaining < 0 {
            tracing::debug!(elapsed = self.elapsed_seconds, "round timer ran out");
            for pursued in self.pursued.iter_mut().filter(|p| p.is_active()) {
                pursued.capture();
            }
        }
    }

    fn start_sub_round(&mut self, now_ms: u64) {
        self.reset_positions();
        self.started_at_ms = now_ms;
        self.elapsed_seconds = 0;
        self.reported_seconds = None;
        tracing::debug!(tick = self.tick_counter, "sub-round started");
        if let Some(listener) = self.round_listener.as_mut() {
            listener.sub_round_started();
        }
    }

    fn finish(&mut self, state: RoundState) {
        self.state = state;
        let scores: Vec<u32> = self.pursued.iter().map(Pursued::score).collect();
        match state {
            RoundState::Won => {
                tracing::info!(tick = self.tick_counter, ?scores, "round won");
                if let Some(listener) = self.round_listener.as_mut() {
                    listener.round_won();
                }
            }
            RoundState::Lost => {
                tracing::info!(tick = self.tick_counter, ?scores, "round lost");
                if let Some(listener) = self.round_listener.as_mut() {
                    listener.round_lost();
                }
            }
            _ => {}
        }
    }

    pub fn map_view(&self) -> MapView {
        self.map.to_view()
    }

    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            tick: self.tick_counter,
            state: self.state,
            elapsed_seconds: self.elapsed_seconds,
            remaining_seconds: self.remaining_seconds(),
            remaining_collectibles: self.map.remaining_collectibles(),
            pursued: self.pursued.iter().map(Pursued::to_view).collect(),
            pursuers: self.pursuers.iter().map(Pursuer::to_view).collect(),
        }
    }
}
