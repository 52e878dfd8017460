//! Move identifiers, configuration and the behavior hierarchy.
//!
//! A [`Move`] is immutable configuration plus a [`Behavior`] tag. The tag
//! selects how the move overrides the two shared operations (damage
//! calculation and the perform sequence) without open-ended subclassing:
//! the variant set is closed and dispatched by match.

pub mod catalog;
pub mod perform;

use serde::{Deserialize, Serialize};

use crate::combatant::Combatant;
use crate::core_data::{Stat, StatusFlags};

pub use catalog::MoveCatalog;

// ============================================================================
// Identifiers
// ============================================================================

/// Every move the catalog can generate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum MoveId {
    Slash,
    Jab,
    Bash,
    Scorch,
    Jolt,
    Menace,
    Warcry,
    Purge,
    Cleanse,
    Mend,
    Siphon,
    Guard,
    Shatter,
    Overcharge,
    Ambush,
    Riposte,
    Punish,
    Onslaught,
    Retreat,
    Recharge,
}

/// Lookup from the lowercase key used in data files.
static MOVE_IDS: phf::Map<&'static str, MoveId> = phf::phf_map! {
    "slash" => MoveId::Slash,
    "jab" => MoveId::Jab,
    "bash" => MoveId::Bash,
    "scorch" => MoveId::Scorch,
    "jolt" => MoveId::Jolt,
    "menace" => MoveId::Menace,
    "warcry" => MoveId::Warcry,
    "purge" => MoveId::Purge,
    "cleanse" => MoveId::Cleanse,
    "mend" => MoveId::Mend,
    "siphon" => MoveId::Siphon,
    "guard" => MoveId::Guard,
    "shatter" => MoveId::Shatter,
    "overcharge" => MoveId::Overcharge,
    "ambush" => MoveId::Ambush,
    "riposte" => MoveId::Riposte,
    "punish" => MoveId::Punish,
    "onslaught" => MoveId::Onslaught,
    "retreat" => MoveId::Retreat,
    "recharge" => MoveId::Recharge,
};

impl MoveId {
    /// All catalog entries, in declaration order.
    pub const ALL: [MoveId; 20] = [
        MoveId::Slash,
        MoveId::Jab,
        MoveId::Bash,
        MoveId::Scorch,
        MoveId::Jolt,
        MoveId::Menace,
        MoveId::Warcry,
        MoveId::Purge,
        MoveId::Cleanse,
        MoveId::Mend,
        MoveId::Siphon,
        MoveId::Guard,
        MoveId::Shatter,
        MoveId::Overcharge,
        MoveId::Ambush,
        MoveId::Riposte,
        MoveId::Punish,
        MoveId::Onslaught,
        MoveId::Retreat,
        MoveId::Recharge,
    ];

    pub fn from_str(key: &str) -> Option<MoveId> {
        MOVE_IDS.get(key).copied()
    }

    /// English display name; localized names come from the message provider.
    pub fn display_name(self) -> &'static str {
        match self {
            MoveId::Slash => "Slash",
            MoveId::Jab => "Jab",
            MoveId::Bash => "Bash",
            MoveId::Scorch => "Scorch",
            MoveId::Jolt => "Jolt",
            MoveId::Menace => "Menace",
            MoveId::Warcry => "Warcry",
            MoveId::Purge => "Purge",
            MoveId::Cleanse => "Cleanse",
            MoveId::Mend => "Mend",
            MoveId::Siphon => "Siphon",
            MoveId::Guard => "Guard",
            MoveId::Shatter => "Shatter",
            MoveId::Overcharge => "Overcharge",
            MoveId::Ambush => "Ambush",
            MoveId::Riposte => "Riposte",
            MoveId::Punish => "Punish",
            MoveId::Onslaught => "Onslaught",
            MoveId::Retreat => "Retreat",
            MoveId::Recharge => "Recharge",
        }
    }
}

// ============================================================================
// Behavior tags
// ============================================================================

/// Which side a stat effect lands on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EffectTarget {
    User,
    Target,
}

/// A chance-gated stage delta carried by a move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StatEffect {
    pub target: EffectTarget,
    pub stat: Stat,
    pub delta: i8,
    pub chance: f64,
}

/// The closed set of move behaviors.
///
/// Damage-dealing variants override how `power` is scaled before the
/// shared formula runs; the others replace the perform sequence after the
/// energy and accuracy gates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Behavior {
    /// Default attack sequence.
    Attack,
    /// Restore a fraction of max health; fails at full health.
    Heal { fraction: f64 },
    /// Attack that returns a fraction of dealt damage as health.
    Drain { fraction: f64 },
    /// Apply the move's stage deltas instead of dealing damage.
    StatChange,
    /// Reset both sides' stage modifiers.
    StatClear,
    /// Clear the user's status conditions; fails if none were present.
    Cure,
    /// Own-accuracy draw; on success the user is invulnerable this round.
    Shield,
    /// Bonus power and forced accuracy against a raised shield.
    ShieldBreak { multiplier: f64 },
    /// Power scales with the user's energy before this move's cost.
    EnergyScaled { floor_power: i32 },
    /// Bonus power depending on who moves first this round.
    OrderScaled { multiplier: f64, when_first: bool },
    /// Bonus power while a status afflicts the configured side(s).
    StatusConditional {
        status: StatusFlags,
        check_user: bool,
        check_target: bool,
        multiplier: f64,
    },
    /// Power decays linearly with elapsed rounds down to a floor.
    DecayScaled { floor_scale: f64, max_rounds: u32 },
    /// Attempt to flee; only meaningful for the controlled side.
    Run,
    /// Restore a fraction of max energy; fails at full energy.
    Charge { fraction: f64 },
}

impl Behavior {
    /// Variants that run the default attack sequence and compute damage.
    pub fn deals_damage(&self) -> bool {
        matches!(
            self,
            Behavior::Attack
                | Behavior::Drain { .. }
                | Behavior::ShieldBreak { .. }
                | Behavior::EnergyScaled { .. }
                | Behavior::OrderScaled { .. }
                | Behavior::StatusConditional { .. }
                | Behavior::DecayScaled { .. }
        )
    }

    /// Variants exempt from the paralysis skip check.
    pub fn paralysis_exempt(&self) -> bool {
        matches!(self, Behavior::Run | Behavior::Charge { .. })
    }
}

// ============================================================================
// Move configuration
// ============================================================================

/// Immutable configuration for one move.
#[derive(Debug, Clone, PartialEq)]
pub struct Move {
    pub id: MoveId,
    /// Tier the move is drawn from for random offers.
    pub rank: u8,
    pub power: i32,
    /// Base accuracy in [0, 1].
    pub accuracy: f64,
    /// Fraction of max energy consumed per use.
    pub energy_cost: f64,
    /// Higher priority acts first; ties fall back to speed.
    pub priority: i8,
    /// When false the accuracy check is skipped entirely.
    pub use_accuracy: bool,
    pub crit_chance: f64,
    pub burn_chance: f64,
    pub paralysis_chance: f64,
    /// Fraction of dealt damage returned to the user as self-damage.
    pub recoil_fraction: f64,
    pub stat_effects: Vec<StatEffect>,
    pub behavior: Behavior,
}

impl Move {
    /// Whether `user` has the energy to pay for this move.
    pub fn usable(&self, user: &Combatant) -> bool {
        user.energy as f64 >= user.max_energy as f64 * self.energy_cost
    }

    /// The rounded energy cost for `user`.
    pub fn energy_cost_for(&self, user: &Combatant) -> i32 {
        (user.max_energy as f64 * self.energy_cost).round() as i32
    }
}
