use std::cmp::Reverse;
use std::collections::BinaryHeap;

use crate::actor::ActorKind;
use crate::constants::MAX_COST;
use crate::map::Map;
use crate::types::{Cell, Direction, Disposition, PursuedMode};

use super::{ControlContext, Controller, Steer};

const NEIGHBOURS: [(i32, i32); 4] = [(0, -1), (0, 1), (-1, 0), (1, 0)];

#[derive(Clone, Debug)]
struct PlannedPath {
    target: Cell,
    mode: PursuedMode,
    cells: Vec<Cell>,
}

/// Weighted shortest-path search over a terrain field centred on the nearest
/// target: attracted to it while it is normal, repelled while it is empowered.
#[derive(Debug)]
pub struct PathfindingController {
    name: String,
    planned: Option<PlannedPath>,
}

impl PathfindingController {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            planned: None,
        }
    }

    fn is_stale(&self, target: Cell, mode: PursuedMode, from: Cell) -> bool {
        match &self.planned {
            Some(path) => path.target != target || path.mode != mode || !path.cells.contains(&from),
            None => true,
        }
    }
}

impl Controller for PathfindingController {
    fn next_direction(&mut self, ctx: &ControlContext<'_>) -> Steer {
        let Some(target) = ctx.nearest_target() else {
            self.planned = None;
            return Steer::stop();
        };
        let mode = target.mode();
        let goal = target.cell();
        let from = ctx.actor.cell();

        if self.is_stale(goal, mode, from) {
            self.planned = find_path(ctx.map, from, goal, mode).map(|cells| PlannedPath {
                target: goal,
                mode,
                cells,
            });
            tracing::debug!(
                controller = %self.name,
                ?goal,
                ?mode,
                found = self.planned.is_some(),
                "path recomputed"
            );
        }

        let direction = self
            .planned
            .as_ref()
            .and_then(|path| {
                let at = path.cells.iter().position(|&cell| cell == from)?;
                path.cells.get(at + 1).copied()
            })
            .map(|next| step_direction(ctx.map, from, next))
            .unwrap_or(Direction::Stopped);

        Steer::chasing(direction, Disposition::facing(mode))
    }

    fn name(&self) -> &str {
        &self.name
    }
}

fn terrain_cost(cell: Cell, target: Cell, mode: PursuedMode) -> u32 {
    let distance = (cell.manhattan(target).max(0) as u32).min(MAX_COST);
    match mode {
        PursuedMode::Normal => distance,
        PursuedMode::Empowered => MAX_COST - distance,
    }
}

/// Dijkstra from `source`, edge weight `1 + terrain(next)`, walls excluded.
///
/// Against a normal target the search stops once the target is settled and
/// the path ends on it. Against an empowered target its cell is treated as
/// blocked, the whole component is settled and the path ends on the cell
/// farthest from the target, ties going to the cheaper one. Returns the cells
/// from `source` to the destination inclusive.
pub(crate) fn find_path(map: &Map, source: Cell, target: Cell, mode: PursuedMode) -> Option<Vec<Cell>> {
    let passable = |cell: Cell| ActorKind::Pursuer.passable(map.kind(cell));
    if !passable(source) {
        return None;
    }

    let count = map.cell_count();
    let src = map.index_of(source);
    let dst = map.index_of(target);
    let fleeing = mode == PursuedMode::Empowered;

    let mut cost = vec![u32::MAX; count];
    let mut parent: Vec<Option<usize>> = vec![None; count];
    let mut settled = vec![false; count];
    let mut frontier = BinaryHeap::new();

    cost[src] = 0;
    frontier.push(Reverse((0u32, src)));

    while let Some(Reverse((so_far, idx))) = frontier.pop() {
        if settled[idx] {
            continue;
        }
        settled[idx] = true;
        if !fleeing && idx == dst {
            break;
        }

        let cell = map.cell_at_index(idx);
        for (dx, dy) in NEIGHBOURS {
            let next = map.neighbour(cell, dx, dy);
            let next_idx = map.index_of(next);
            if settled[next_idx] || !passable(next) || (fleeing && next_idx == dst) {
                continue;
            }
            let next_cost = so_far + 1 + terrain_cost(next, target, mode);
            if next_cost < cost[next_idx] {
                cost[next_idx] = next_cost;
                parent[next_idx] = Some(idx);
                frontier.push(Reverse((next_cost, next_idx)));
            }
        }
    }

    let destination = if fleeing {
        (0..count).filter(|&idx| settled[idx]).max_by(|&a, &b| {
            let far_a = map.cell_at_index(a).manhattan(target);
            let far_b = map.cell_at_index(b).manhattan(target);
            far_a
                .cmp(&far_b)
                .then(cost[b].cmp(&cost[a]))
                .then(b.cmp(&a))
        })?
    } else if settled[dst] {
        dst
    } else {
        return None;
    };

    let mut cells = vec![map.cell_at_index(destination)];
    let mut cursor = destination;
    while let Some(prev) = parent[cursor] {
        cells.push(map.cell_at_index(prev));
        cursor = prev;
    }
    cells.reverse();
    Some(cells)
}

/// Direction of the single step between two adjacent cells, tunnels included.
fn step_direction(map: &Map, from: Cell, to: Cell) -> Direction {
    Direction::MOVING
        .into_iter()
        .find(|dir| {
            let (dx, dy) = dir.delta();
            map.neighbour(from, dx, dy) == to
        })
        .unwrap_or(Direction::Stopped)
}
