//! Damage calculation.
//!
//! One shared formula; behavior variants only rescale `power` before it
//! runs:
//!
//! `round(modified_attack * power * 0.15 * crit_boost
//!        - modified_defense * power * 0.20)`
//!
//! floored to 1 whenever damage is computed at all.

use crate::combatant::Combatant;
use crate::config::RulesConfig;
use crate::core_data::{RoundContext, Side};
use crate::moves::{Behavior, Move};

/// Attack-side power scale.
const POWER_ATTACK_SCALE: f64 = 0.15;
/// Defense-side power scale.
const POWER_DEFENSE_SCALE: f64 = 0.20;

/// Everything a single damage computation reads.
pub struct DamageContext<'a> {
    pub user: &'a Combatant,
    pub target: &'a Combatant,
    pub user_side: Side,
    pub round: &'a RoundContext,
    pub config: &'a RulesConfig,
    /// Energy already deducted during this Perform call; energy-scaled
    /// moves add it back to recover the pre-deduction fraction.
    pub energy_spent: i32,
    /// Whether the target's successful shield is being broken this call.
    pub shield_broken: bool,
}

/// Compute damage for a move. Always at least 1.
pub fn calculate_damage(mv: &Move, ctx: &DamageContext<'_>, crit_boost: f64) -> i32 {
    let power = scaled_power(mv, ctx);
    let attack = ctx.user.modified_attack(ctx.config) as f64;
    let defense = ctx.target.modified_defense(ctx.config) as f64;
    let raw = attack * power * POWER_ATTACK_SCALE * crit_boost
        - defense * power * POWER_DEFENSE_SCALE;
    (raw.round() as i32).max(1)
}

/// Apply the behavior variant's power rescaling.
fn scaled_power(mv: &Move, ctx: &DamageContext<'_>) -> f64 {
    let base = mv.power as f64;
    match mv.behavior {
        Behavior::EnergyScaled { floor_power } => {
            let before = (ctx.user.energy + ctx.energy_spent).min(ctx.user.max_energy);
            let fraction = before as f64 / ctx.user.max_energy as f64;
            let floor = floor_power as f64;
            floor + (base - floor) * fraction
        }
        Behavior::OrderScaled {
            multiplier,
            when_first,
        } => {
            let is_first = ctx.round.first_mover == ctx.user_side;
            if is_first == when_first {
                base * multiplier
            } else {
                base
            }
        }
        Behavior::DecayScaled {
            floor_scale,
            max_rounds,
        } => {
            // Linear decay, frozen at the floor once max_rounds elapse.
            let elapsed = ctx.round.round.min(max_rounds) as f64;
            let scale = 1.0 - (1.0 - floor_scale) * elapsed / max_rounds as f64;
            base * scale
        }
        Behavior::StatusConditional {
            status,
            check_user,
            check_target,
            multiplier,
        } => {
            let afflicted = (check_user && ctx.user.statuses.contains(status))
                || (check_target && ctx.target.statuses.contains(status));
            if afflicted {
                base * multiplier
            } else {
                base
            }
        }
        Behavior::ShieldBreak { multiplier } if ctx.shield_broken => base * multiplier,
        _ => base,
    }
}
