use crate::types::Direction;

/// Seeded generator so AI wandering and spawn choice replay under a fixed seed.
#[derive(Clone, Debug)]
pub struct Rng {
    seed: u32,
}

impl Rng {
    pub fn new(seed: u32) -> Self {
        Self { seed }
    }

    pub fn next_f32(&mut self) -> f32 {
        self.seed = self.seed.wrapping_add(0x6d2b79f5);
        let mut t = self.seed;
        t = (t ^ (t >> 15)).wrapping_mul(t | 1);
        t ^= t.wrapping_add((t ^ (t >> 7)).wrapping_mul(t | 61));
        let out = t ^ (t >> 14);
        (out as f64 / 4_294_967_296.0) as f32
    }

    pub fn chance(&mut self, probability: f32) -> bool {
        self.next_f32() < probability
    }

    pub fn pick_index(&mut self, len: usize) -> usize {
        if len <= 1 {
            return 0;
        }
        (self.next_f32() * len as f32).floor().min((len - 1) as f32) as usize
    }

    pub fn direction(&mut self) -> Direction {
        Direction::MOVING[self.pick_index(Direction::MOVING.len())]
    }

    /// Uniform pick among the moving directions other than `current`.
    pub fn direction_other_than(&mut self, current: Direction) -> Direction {
        let choices: Vec<Direction> = Direction::MOVING
            .iter()
            .copied()
            .filter(|dir| *dir != current)
            .collect();
        choices[self.pick_index(choices.len())]
    }

    /// Derives an independent generator, used to seed per-controller streams.
    pub fn fork(&mut self) -> Rng {
        let next = (self.next_f32() as f64 * 4_294_967_296.0) as u32;
        Rng::new(next ^ 0x9e37_79b9)
    }
}
