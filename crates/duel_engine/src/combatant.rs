//! Per-combatant resource and stat state.
//!
//! A [`Combatant`] owns everything one side of the duel can mutate: current
//! health and energy (always clamped to their maxima), the four stage
//! modifiers, status flags, the shield vulnerability flag, and the equipped
//! move slots. Stage arithmetic goes through the tables in
//! [`RulesConfig`](crate::config::RulesConfig).

use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;

use crate::config::RulesConfig;
use crate::core_data::{Stat, StatusFlags};
use crate::moves::{Move, MoveId};

/// Number of move slots per combatant.
pub const MOVE_SLOTS: usize = 4;

/// Stable identity of a combatant across battle entry and exit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CombatantId(pub u16);

/// Stage modifiers for the four boostable stats.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Stages([i8; 4]);

impl Stages {
    #[inline]
    pub fn get(&self, stat: Stat) -> i8 {
        self.0[stat.index()]
    }

    #[inline]
    pub fn set(&mut self, stat: Stat, value: i8) {
        self.0[stat.index()] = value;
    }

    /// True if any stage differs from neutral.
    pub fn any(&self) -> bool {
        Stat::iter().any(|stat| self.get(stat) != 0)
    }

    /// Reset every stage to neutral.
    pub fn reset(&mut self) {
        self.0 = [0; 4];
    }
}

/// One side of the duel.
#[derive(Debug, Clone)]
pub struct Combatant {
    pub id: CombatantId,
    pub level: u8,

    // Base stats, fixed for the duration of a battle except by level-up.
    pub max_health: i32,
    pub max_energy: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,

    // Current resources, clamped to [0, max].
    pub health: i32,
    pub energy: i32,

    /// Equipped move slots. Empty slots are None.
    pub equipped: [Option<MoveId>; MOVE_SLOTS],
    /// The move chosen for the current round, if any.
    pub selected: Option<Move>,

    /// False while a successful shield is active this round.
    pub vulnerable: bool,
    pub statuses: StatusFlags,
    pub stages: Stages,

    /// Experience accumulated toward the next level. Granted by the
    /// victory branch; persisted by the shell, not the snapshot.
    pub experience: u32,
}

impl Combatant {
    // ========================================================================
    // Stage-modified stats
    // ========================================================================

    pub fn modified_attack(&self, cfg: &RulesConfig) -> i32 {
        cfg.apply_stat_stage(self.attack, self.stages.get(Stat::Attack))
    }

    pub fn modified_defense(&self, cfg: &RulesConfig) -> i32 {
        cfg.apply_stat_stage(self.defense, self.stages.get(Stat::Defense))
    }

    pub fn modified_speed(&self, cfg: &RulesConfig) -> i32 {
        cfg.apply_stat_stage(self.speed, self.stages.get(Stat::Speed))
    }

    /// Stage-modified accuracy for a move's base accuracy in [0, 1].
    pub fn modified_accuracy(&self, base: f64, cfg: &RulesConfig) -> f64 {
        cfg.apply_accuracy_stage(base, self.stages.get(Stat::Accuracy))
    }

    /// Apply a stage delta, clamped to the configured bound.
    ///
    /// Returns the delta actually applied: 0 when the stage was already at
    /// its cap, which callers use to decide whether a change entry is worth
    /// presenting.
    pub fn apply_stage_delta(&mut self, stat: Stat, delta: i8, cfg: &RulesConfig) -> i8 {
        let current = self.stages.get(stat);
        let next = (current + delta).clamp(-cfg.max_stage, cfg.max_stage);
        self.stages.set(stat, next);
        next - current
    }

    // ========================================================================
    // Queries
    // ========================================================================

    #[inline]
    pub fn is_dead(&self) -> bool {
        self.health == 0
    }

    #[inline]
    pub fn has_full_health(&self) -> bool {
        self.health == self.max_health
    }

    #[inline]
    pub fn has_full_energy(&self) -> bool {
        self.energy == self.max_energy
    }

    pub fn has_any_stat_modifier(&self) -> bool {
        self.stages.any()
    }

    // ========================================================================
    // Clamped mutators
    // ========================================================================

    /// Deal damage, clamped at zero health. Returns the amount dealt.
    pub fn take_damage(&mut self, amount: i32) -> i32 {
        let dealt = amount.max(0).min(self.health);
        self.health -= dealt;
        dealt
    }

    /// Restore health, clamped at max. Returns the amount restored.
    pub fn restore_health(&mut self, amount: i32) -> i32 {
        let restored = amount.max(0).min(self.max_health - self.health);
        self.health += restored;
        restored
    }

    /// Spend energy, clamped at zero.
    pub fn spend_energy(&mut self, amount: i32) {
        self.energy = (self.energy - amount.max(0)).max(0);
    }

    /// Restore energy, clamped at max. Returns the amount restored.
    pub fn restore_energy(&mut self, amount: i32) -> i32 {
        let restored = amount.max(0).min(self.max_energy - self.energy);
        self.energy += restored;
        restored
    }

    pub fn reset_stat_modifiers(&mut self) {
        self.stages.reset();
    }

    pub fn reset_statuses(&mut self) {
        self.statuses = StatusFlags::empty();
    }

    /// Transient reset applied on battle entry and exit: shield down,
    /// stages neutral, statuses cleared, selection dropped.
    pub fn reset_transient(&mut self) {
        self.vulnerable = true;
        self.reset_stat_modifiers();
        self.reset_statuses();
        self.selected = None;
    }
}

// ============================================================================
// Persisted snapshot
// ============================================================================

/// Errors rejecting a malformed snapshot at battle entry.
#[derive(Debug, thiserror::Error)]
pub enum SnapshotError {
    #[error("max health must be positive (got {0})")]
    InvalidMaxHealth(i32),
    #[error("max energy must be positive (got {0})")]
    InvalidMaxEnergy(i32),
}

/// The persisted form of a combatant, read at battle entry and written at
/// battle exit. The shell owns where it lives; the engine only validates it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatantSnapshot {
    pub id: CombatantId,
    pub level: u8,
    pub max_health: i32,
    pub health: i32,
    pub attack: i32,
    pub defense: i32,
    pub speed: i32,
    pub max_energy: i32,
    pub energy: i32,
    pub moves: [Option<MoveId>; MOVE_SLOTS],
}

impl Combatant {
    /// Build a battle-ready combatant from its persisted snapshot.
    ///
    /// Current health and energy are clamped into range; non-positive
    /// maxima are rejected.
    pub fn from_snapshot(snap: &CombatantSnapshot) -> Result<Self, SnapshotError> {
        if snap.max_health <= 0 {
            return Err(SnapshotError::InvalidMaxHealth(snap.max_health));
        }
        if snap.max_energy <= 0 {
            return Err(SnapshotError::InvalidMaxEnergy(snap.max_energy));
        }
        Ok(Self {
            id: snap.id,
            level: snap.level.max(1),
            max_health: snap.max_health,
            max_energy: snap.max_energy,
            attack: snap.attack,
            defense: snap.defense,
            speed: snap.speed,
            health: snap.health.clamp(0, snap.max_health),
            energy: snap.energy.clamp(0, snap.max_energy),
            equipped: snap.moves,
            selected: None,
            vulnerable: true,
            statuses: StatusFlags::empty(),
            stages: Stages::default(),
            experience: 0,
        })
    }

    /// Serialize back to the persisted form, dropping transient state.
    pub fn to_snapshot(&self) -> CombatantSnapshot {
        CombatantSnapshot {
            id: self.id,
            level: self.level,
            max_health: self.max_health,
            health: self.health,
            attack: self.attack,
            defense: self.defense,
            speed: self.speed,
            max_energy: self.max_energy,
            energy: self.energy,
            moves: self.equipped,
        }
    }
}
