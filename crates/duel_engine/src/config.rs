//! Tunable rules tables.
//!
//! Every numeric knob the engine consults lives in [`RulesConfig`], built
//! once per battle session and passed in explicitly. The stage→multiplier
//! mappings are data tables, not arithmetic: swapping a table retunes the
//! whole stat system without touching the combat code.

/// Number of entries in a stage table (-6 ..= +6).
pub const STAGE_TABLE_LEN: usize = 13;

/// Stat stage multiplier table.
///
/// Index 0 = -6, index 6 = 0, index 12 = +6.
/// Each entry is (numerator, denominator).
const STAT_STAGE_TABLE: [(u16, u16); STAGE_TABLE_LEN] = [
    (2, 8), // -6: 0.25x
    (2, 7), // -5
    (2, 6), // -4
    (2, 5), // -3
    (2, 4), // -2: 0.5x
    (2, 3), // -1
    (2, 2), //  0: 1.0x
    (3, 2), // +1: 1.5x
    (4, 2), // +2: 2.0x
    (5, 2), // +3
    (6, 2), // +4
    (7, 2), // +5
    (8, 2), // +6: 4.0x
];

/// Accuracy stage multiplier table (shallower curve than stats).
const ACCURACY_STAGE_TABLE: [(u16, u16); STAGE_TABLE_LEN] = [
    (3, 9), // -6: 33%
    (3, 8), // -5
    (3, 7), // -4
    (3, 6), // -3: 50%
    (3, 5), // -2
    (3, 4), // -1: 75%
    (3, 3), //  0: 100%
    (4, 3), // +1: 133%
    (5, 3), // +2
    (6, 3), // +3: 200%
    (7, 3), // +4
    (8, 3), // +5
    (9, 3), // +6: 300%
];

/// Per-level stat growth applied when the player levels up.
#[derive(Debug, Clone, Copy)]
pub struct StatGrowth {
    pub max_health: i32,
    pub max_energy: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
}

/// All tunable rules constants, gathered in one value.
#[derive(Debug, Clone)]
pub struct RulesConfig {
    /// Stage → multiplier for attack, defense and speed.
    pub stat_stage_table: [(u16, u16); STAGE_TABLE_LEN],
    /// Stage → multiplier for accuracy.
    pub accuracy_stage_table: [(u16, u16); STAGE_TABLE_LEN],
    /// Stage modifiers are clamped to ±this bound.
    pub max_stage: i8,
    /// Multiplier on effective speed while paralyzed, for turn ordering.
    pub paralysis_speed_penalty: f64,
    /// Chance a paralyzed actor loses its turn outright.
    pub paralysis_skip_chance: f64,
    /// Damage multiplier on a critical hit.
    pub critical_boost: f64,
    /// End-of-round burn damage as a fraction of max health (minimum 1).
    pub burn_fraction: f64,
    /// Floor on recoil damage once a move's recoil applies.
    pub recoil_min: i32,
    /// Shield-family moves always act at least at this priority.
    pub shield_priority: i8,
    /// Experience awarded per opponent level on victory.
    pub exp_per_opponent_level: u32,
    /// Base experience cost of a level; the cost of level N is N times this.
    pub exp_to_level: u32,
    /// Stat increments applied on each level gained.
    pub growth: StatGrowth,
    /// Minimum level at which each move rank (1-indexed) unlocks.
    pub rank_unlock_levels: [u8; 3],
}

impl Default for RulesConfig {
    fn default() -> Self {
        Self {
            stat_stage_table: STAT_STAGE_TABLE,
            accuracy_stage_table: ACCURACY_STAGE_TABLE,
            max_stage: 6,
            paralysis_speed_penalty: 0.5,
            paralysis_skip_chance: 0.25,
            critical_boost: 2.0,
            burn_fraction: 1.0 / 16.0,
            recoil_min: 1,
            shield_priority: 3,
            exp_per_opponent_level: 12,
            exp_to_level: 50,
            growth: StatGrowth {
                max_health: 4,
                max_energy: 2,
                attack: 2,
                defense: 2,
                speed: 1,
            },
            rank_unlock_levels: [1, 5, 10],
        }
    }
}

impl RulesConfig {
    /// Apply a stat stage to a base stat through the table.
    pub fn apply_stat_stage(&self, base: i32, stage: i8) -> i32 {
        let (num, den) = self.stat_stage_table[Self::table_index(stage)];
        base * num as i32 / den as i32
    }

    /// Apply an accuracy stage to a base accuracy in [0, 1].
    pub fn apply_accuracy_stage(&self, base: f64, stage: i8) -> f64 {
        let (num, den) = self.accuracy_stage_table[Self::table_index(stage)];
        base * num as f64 / den as f64
    }

    /// Experience needed to go from `level` to `level + 1`.
    pub fn exp_to_next(&self, level: u8) -> u32 {
        self.exp_to_level * level.max(1) as u32
    }

    /// Highest move rank unlocked at `level`.
    pub fn rank_for_level(&self, level: u8) -> u8 {
        let mut rank = 1;
        for (i, min) in self.rank_unlock_levels.iter().enumerate() {
            if level >= *min {
                rank = i as u8 + 1;
            }
        }
        rank
    }

    #[inline]
    fn table_index(stage: i8) -> usize {
        // Tables always span -6..=+6; a tighter max_stage is enforced at
        // the point deltas are applied.
        (stage.clamp(-6, 6) + 6) as usize
    }
}
