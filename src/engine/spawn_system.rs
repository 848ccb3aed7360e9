use super::*;

/// Pursued actor `i` takes the `i`-th pursued spawn cell, in map order.
pub(super) fn allocate_pursued_spawns(map: &Map, count: usize) -> Result<Vec<Cell>, SetupError> {
    let spawns = map.pursued_spawns();
    if count > spawns.len() {
        return Err(SetupError::NotEnoughSpawns {
            kind: ActorKind::Pursued,
            requested: count,
            available: spawns.len(),
        });
    }
    Ok(spawns[..count].to_vec())
}

/// Each pursuer starts on a randomly chosen pursuer spawn cell; cells may be shared.
pub(super) fn allocate_pursuer_spawns(
    map: &Map,
    count: usize,
    rng: &mut Rng,
) -> Result<Vec<Cell>, SetupError> {
    let spawns = map.pursuer_spawns();
    if count > 0 && spawns.is_empty() {
        return Err(SetupError::NotEnoughSpawns {
            kind: ActorKind::Pursuer,
            requested: count,
            available: 0,
        });
    }
    Ok((0..count)
        .map(|_| spawns[rng.pick_index(spawns.len())])
        .collect())
}

impl Game {
    /// Everyone back to their spawn cell for a new life.
    pub(super) fn reset_positions(&mut self) {
        for pursued in self.pursued.iter_mut().filter(|p| p.is_alive()) {
            pursued.revive();
        }
        for pursuer in &mut self.pursuers {
            pursuer.reset_position();
        }
    }
}
