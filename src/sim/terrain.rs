//! Layered destructible terrain
//!
//! Every column holds two stacks of material layers: a ceiling hanging from
//! the top of the world and a floor resting on the bottom. The open gap
//! between them is the corridor the player flies through. Columns live in a
//! fixed-length deque that is shifted one cell at a time as the world
//! scrolls, so the cave never ends.

use std::collections::VecDeque;

use rand::Rng;
use serde::{Deserialize, Serialize};

use super::random::RngExt;
use crate::consts::*;
use crate::{clamp, clamp_i32};

/// Hardness tiers run 0 (soft dirt) to 3 (reinforced)
pub const MAX_HARDNESS: u8 = 3;

/// Smallest/largest randomly chosen layer thickness
const LAYER_MIN_THICKNESS: i32 = 10;
const LAYER_MAX_THICKNESS: i32 = 24;

/// A slab of terrain material
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Layer {
    /// Nominal thickness at creation
    pub thickness: f32,
    pub hp: f32,
    pub max_hp: f32,
    /// Damage resistance tier (0-3)
    pub hardness: u8,
}

impl Layer {
    pub fn new(thickness: f32, hardness: u8) -> Self {
        let hardness = hardness.min(MAX_HARDNESS);
        let max_hp = thickness * (1.0 + hardness as f32 * 0.85);
        Self {
            thickness,
            hp: max_hp,
            max_hp,
            hardness,
        }
    }

    /// Power spent per hp removed
    #[inline]
    pub fn erosion_factor(&self) -> f32 {
        0.85 + self.hardness as f32 * 0.5
    }

    #[inline]
    pub fn is_depleted(&self) -> bool {
        self.hp <= 0.0
    }

    /// Remaining occupied height
    pub fn height(&self) -> f32 {
        if self.is_depleted() || self.max_hp <= 0.0 {
            0.0
        } else {
            self.thickness * (self.hp / self.max_hp)
        }
    }
}

/// Total remaining height of a stack, floored
pub fn stack_height(layers: &[Layer]) -> f32 {
    let h: f32 = layers.iter().map(Layer::height).sum();
    h.floor().max(0.0)
}

/// Spend `power` on layers in the given order, nearest-to-corridor first.
///
/// Returns the height removed. Depleted layers are skipped without taking
/// any of the budget.
fn erode<'a>(layers: impl Iterator<Item = &'a mut Layer>, power: f32) -> f32 {
    let mut remaining = power;
    let mut removed = 0.0;

    for layer in layers {
        if remaining <= 0.0 {
            break;
        }
        if layer.is_depleted() {
            continue;
        }
        let factor = layer.erosion_factor();
        let dmg = layer.hp.min(remaining / factor);
        layer.hp = (layer.hp - dmg).max(0.0);
        remaining -= dmg * factor;
        removed += layer.thickness * (dmg / layer.max_hp);
    }

    removed
}

/// Decompose `depth` into randomized layers
///
/// The hardness baseline has a 30% chance to climb after each layer, so
/// columns get tougher the deeper you dig.
pub fn make_layers<R: Rng + ?Sized>(depth: i32, hard_base: u8, rng: &mut R) -> Vec<Layer> {
    let mut layers = Vec::new();
    let mut remaining = depth;
    let mut base = hard_base.min(MAX_HARDNESS) as i32;

    while remaining > 0 {
        let thickness = remaining.min(rng.irange(LAYER_MIN_THICKNESS, LAYER_MAX_THICKNESS));
        let hardness = clamp_i32(rng.irange(0, 2) + base, 0, MAX_HARDNESS as i32) as u8;
        layers.push(Layer::new(thickness as f32, hardness));
        remaining -= thickness;
        if rng.unit() > 0.7 {
            base = clamp_i32(base + 1, 0, MAX_HARDNESS as i32);
        }
    }

    layers
}

/// Total corridor occlusion and ceiling share for a column
///
/// Deterministic in `(index, stage)`; only the layer decomposition is random.
pub fn column_profile(index: u64, stage: u32) -> (i32, i32) {
    let phase = index as f64 + stage as f64 * 24.0;
    let h = WORLD_HEIGHT as f64;
    let max_total = (h * 0.4).floor() as i32;
    let min_total = (h * 0.22).floor() as i32;
    let raw = (h * 0.3 + (phase * 0.058).sin() * 34.0 + (phase * 0.145).sin() * 22.0
        - stage as f64 * 0.35)
        .floor() as i32;
    let total = clamp_i32(raw, min_total, max_total);

    let split_bias = 0.5 + (phase * 0.09).sin() * 0.22;
    let ceiling = clamp_i32((total as f64 * split_bias).floor() as i32, 10, total - 10);
    (total, ceiling)
}

/// One vertical slice of the cave
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Column {
    /// Ordered from the world top down; the last layer borders the corridor
    pub ceiling: Vec<Layer>,
    /// Ordered from the corridor surface down to the world bottom
    pub floor: Vec<Layer>,
}

impl Column {
    /// Generate the column at global `index` for `stage`
    pub fn generate<R: Rng + ?Sized>(index: u64, stage: u32, rng: &mut R) -> Self {
        let (total, ceiling_depth) = column_profile(index, stage);
        let floor_depth = total - ceiling_depth;
        let base_hard = clamp_i32((stage / 3) as i32, 0, MAX_HARDNESS as i32) as u8;

        Self {
            ceiling: make_layers(ceiling_depth, (base_hard + 1).min(MAX_HARDNESS), rng),
            floor: make_layers(floor_depth, base_hard, rng),
        }
    }

    pub fn floor_height(&self) -> f32 {
        stack_height(&self.floor)
    }

    pub fn ceiling_height(&self) -> f32 {
        stack_height(&self.ceiling)
    }

    /// Erode the floor from the corridor surface downward
    pub fn dig_floor(&mut self, power: f32) -> f32 {
        if power <= 0.0 {
            return 0.0;
        }
        erode(self.floor.iter_mut(), power)
    }

    /// Erode the ceiling from the corridor surface upward
    pub fn dig_ceiling(&mut self, power: f32) -> f32 {
        if power <= 0.0 {
            return 0.0;
        }
        erode(self.ceiling.iter_mut().rev(), power)
    }
}

/// Open vertical span at a horizontal position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Corridor {
    /// Bottom edge of the ceiling stack
    pub ceiling: f32,
    /// Top edge of the floor stack
    pub floor: f32,
}

impl Corridor {
    pub fn clearance(&self) -> f32 {
        self.floor - self.ceiling
    }
}

/// The live window of columns
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Terrain {
    columns: VecDeque<Column>,
    /// Sub-cell scroll offset in `[0, CELL_W)`
    pub scroll_offset: f32,
    /// Global index the next appended column will get
    pub next_index: u64,
}

impl Terrain {
    /// Fresh window of `COLS` columns starting at global index 0
    pub fn generate<R: Rng + ?Sized>(stage: u32, rng: &mut R) -> Self {
        let columns = (0..COLS as u64)
            .map(|i| Column::generate(i, stage, &mut *rng))
            .collect();
        Self {
            columns,
            scroll_offset: 0.0,
            next_index: COLS as u64,
        }
    }

    /// Build a window from explicit columns (tests, replays)
    pub fn from_columns(columns: Vec<Column>) -> Self {
        let next_index = columns.len() as u64;
        Self {
            columns: columns.into(),
            scroll_offset: 0.0,
            next_index,
        }
    }

    pub fn len(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }

    /// Clamp a column index into the live window
    #[inline]
    fn clamp_index(&self, i: i64) -> usize {
        i.clamp(0, self.columns.len().saturating_sub(1) as i64) as usize
    }

    pub fn column(&self, i: usize) -> Option<&Column> {
        self.columns.get(i)
    }

    pub fn columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter()
    }

    /// Column under a screen x; out-of-range positions map to the edge column
    pub fn column_at_screen_x(&self, screen_x: f32) -> usize {
        let i = ((screen_x + self.scroll_offset) / CELL_W).floor() as i64;
        self.clamp_index(i)
    }

    /// Screen x of a column's centre
    pub fn column_center_x(&self, i: usize) -> f32 {
        i as f32 * CELL_W - self.scroll_offset + CELL_W / 2.0
    }

    /// World y of the floor surface
    pub fn floor_top(&self, i: usize) -> f32 {
        match self.columns.get(self.clamp_index(i as i64)) {
            Some(col) => WORLD_HEIGHT - col.floor_height(),
            None => WORLD_HEIGHT,
        }
    }

    /// World y of the ceiling's lower edge
    pub fn ceiling_bottom(&self, i: usize) -> f32 {
        match self.columns.get(self.clamp_index(i as i64)) {
            Some(col) => col.ceiling_height(),
            None => 0.0,
        }
    }

    pub fn corridor_at(&self, screen_x: f32) -> Corridor {
        let i = self.column_at_screen_x(screen_x);
        Corridor {
            ceiling: self.ceiling_bottom(i),
            floor: self.floor_top(i),
        }
    }

    /// Dig the floor of column `i`; out-of-window columns absorb nothing
    pub fn dig(&mut self, i: i64, power: f32) -> f32 {
        if i < 0 {
            return 0.0;
        }
        self.columns
            .get_mut(i as usize)
            .map_or(0.0, |col| col.dig_floor(power))
    }

    /// Dig the ceiling of column `i`
    pub fn dig_ceiling(&mut self, i: i64, power: f32) -> f32 {
        if i < 0 {
            return 0.0;
        }
        self.columns
            .get_mut(i as usize)
            .map_or(0.0, |col| col.dig_ceiling(power))
    }

    /// Scroll by `speed` pixels, recycling whole cells
    ///
    /// Returns how many columns were recycled.
    pub fn advance<R: Rng + ?Sized>(&mut self, speed: f32, stage: u32, rng: &mut R) -> usize {
        self.scroll_offset += speed;
        let mut recycled = 0;
        while self.scroll_offset >= CELL_W {
            self.scroll_offset -= CELL_W;
            self.columns.pop_front();
            self.columns
                .push_back(Column::generate(self.next_index, stage, &mut *rng));
            self.next_index += 1;
            recycled += 1;
        }
        recycled
    }

    /// Depth of solid floor under column `i`
    pub fn floor_depth(&self, i: usize) -> f32 {
        clamp(WORLD_HEIGHT - self.floor_top(i), 0.0, WORLD_HEIGHT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::random::seeded;
    use proptest::prelude::*;

    fn uniform_column(layers: usize, thickness: f32, hardness: u8) -> Column {
        Column {
            ceiling: vec![Layer::new(thickness, hardness); layers],
            floor: vec![Layer::new(thickness, hardness); layers],
        }
    }

    #[test]
    fn test_full_stack_height_is_sum_of_thickness() {
        let layers = vec![
            Layer::new(12.0, 0),
            Layer::new(17.0, 2),
            Layer::new(10.0, 3),
        ];
        assert_eq!(stack_height(&layers), 39.0);
    }

    #[test]
    fn test_zero_power_dig_is_noop() {
        let mut col = uniform_column(3, 20.0, 1);
        let before = col.clone();
        assert_eq!(col.dig_floor(0.0), 0.0);
        assert_eq!(col.dig_ceiling(0.0), 0.0);
        assert_eq!(col, before);
    }

    #[test]
    fn test_depth_100_soft_column_erodes_after_85_power() {
        let mut col = uniform_column(5, 20.0, 0);
        assert_eq!(col.floor_height(), 100.0);

        // 80 power removes 80 / 0.85 = 94.1 hp, not quite everything
        for _ in 0..4 {
            col.dig_floor(20.0);
        }
        assert!(col.floor.iter().any(|l| l.hp > 0.0));

        col.dig_floor(20.0);
        assert!(col.floor.iter().all(|l| l.hp <= 0.0));
        assert_eq!(col.floor_height(), 0.0);
    }

    #[test]
    fn test_floor_digs_surface_layer_first() {
        let mut col = uniform_column(3, 20.0, 0);
        col.dig_floor(5.0);
        assert!(col.floor[0].hp < col.floor[0].max_hp - 1.0);
        assert!(col.floor[1].hp > col.floor[1].max_hp - 1e-3);
    }

    #[test]
    fn test_ceiling_digs_corridor_edge_first() {
        let mut col = uniform_column(3, 20.0, 0);
        col.dig_ceiling(5.0);
        assert!(col.ceiling[2].hp < col.ceiling[2].max_hp - 1.0);
        assert!(col.ceiling[1].hp > col.ceiling[1].max_hp - 1e-3);
        assert_eq!(col.ceiling[0].hp, col.ceiling[0].max_hp);
    }

    #[test]
    fn test_depleted_layer_does_not_absorb_power() {
        let mut col = uniform_column(2, 20.0, 0);
        col.floor[0].hp = 0.0;
        let removed = col.dig_floor(8.5);
        assert!((removed - 10.0).abs() < 1e-4);
        assert!((col.floor[1].hp - 10.0).abs() < 1e-4);
    }

    #[test]
    fn test_harder_layers_resist_more() {
        let mut soft = uniform_column(1, 20.0, 0);
        let mut hard = uniform_column(1, 20.0, 3);
        assert!(soft.dig_floor(10.0) > hard.dig_floor(10.0));
    }

    #[test]
    fn test_generated_column_depths_respect_bounds() {
        let mut rng = seeded(3);
        for index in 0..400u64 {
            for stage in [1, 5, 30] {
                let (total, ceiling) = column_profile(index, stage);
                assert!(total >= (WORLD_HEIGHT * 0.22).floor() as i32);
                assert!(total <= (WORLD_HEIGHT * 0.4).floor() as i32);
                assert!(ceiling >= 10 && total - ceiling >= 10);
            }
            let col = Column::generate(index, 1, &mut rng);
            let (total, _) = column_profile(index, 1);
            assert_eq!(col.floor_height() + col.ceiling_height(), total as f32);
            assert!(col.floor.iter().chain(&col.ceiling).all(|l| l.hardness <= 3));
        }
    }

    #[test]
    fn test_ceiling_starts_harder_than_floor() {
        let mut rng = seeded(9);
        let col = Column::generate(0, 1, &mut rng);
        assert!(col.ceiling[0].hardness >= 1);
    }

    #[test]
    fn test_advance_recycles_columns_and_keeps_length() {
        let mut rng = seeded(1);
        let mut terrain = Terrain::generate(1, &mut rng);
        let len = terrain.len();
        assert_eq!(terrain.advance(CELL_W * 2.5, 1, &mut rng), 2);
        assert_eq!(terrain.len(), len);
        assert_eq!(terrain.next_index, COLS as u64 + 2);
        assert!((terrain.scroll_offset - CELL_W * 0.5).abs() < 1e-4);
    }

    #[test]
    fn test_out_of_range_queries_clamp_to_edges() {
        let mut rng = seeded(1);
        let terrain = Terrain::generate(1, &mut rng);
        assert_eq!(terrain.column_at_screen_x(-500.0), 0);
        assert_eq!(terrain.column_at_screen_x(1e6), terrain.len() - 1);
        assert_eq!(terrain.floor_top(10_000), terrain.floor_top(terrain.len() - 1));
        let corridor = terrain.corridor_at(-40.0);
        assert!(corridor.clearance() > 0.0);
    }

    proptest! {
        #[test]
        fn prop_layer_hp_stays_in_bounds(
            seed in any::<u64>(),
            digs in prop::collection::vec(0.0f32..400.0, 1..20),
        ) {
            let mut rng = seeded(seed);
            let mut col = Column::generate(seed % 1000, 1 + (seed % 30) as u32, &mut rng);
            for power in digs {
                col.dig_floor(power);
                col.dig_ceiling(power * 0.5);
                for layer in col.floor.iter().chain(&col.ceiling) {
                    prop_assert!(layer.hp >= 0.0 && layer.hp <= layer.max_hp);
                }
            }
        }

        #[test]
        fn prop_removed_height_never_exceeds_stack(seed in any::<u64>(), power in 0.0f32..2000.0) {
            let mut rng = seeded(seed);
            let mut col = Column::generate(seed % 500, 3, &mut rng);
            let before: f32 = col.floor.iter().map(Layer::height).sum();
            let removed = col.dig_floor(power);
            prop_assert!(removed <= before + 1e-3);
        }
    }
}
