//! The move catalog.
//!
//! `generate` is the single deterministic factory mapping a [`MoveId`] to
//! its fully configured [`Move`]. One catalog is built per battle session
//! and passed into the sequencer; there is no global move list.

use crate::core_data::{Stat, StatusFlags};
use crate::moves::{Behavior, EffectTarget, Move, MoveId, StatEffect};
use crate::rng::RandomSource;

/// Deterministic factory for move configuration.
#[derive(Debug, Default)]
pub struct MoveCatalog;

impl MoveCatalog {
    pub fn new() -> Self {
        Self
    }

    /// Build the configuration for `id`. Pure and deterministic.
    pub fn generate(&self, id: MoveId) -> Move {
        match id {
            // =================================================================
            // Plain attacks
            // =================================================================

            // Reliable starter attack.
            MoveId::Slash => Move {
                power: 30,
                accuracy: 0.95,
                energy_cost: 0.15,
                ..base(id, 1)
            },

            // Weak but acts first.
            MoveId::Jab => Move {
                power: 20,
                accuracy: 0.95,
                energy_cost: 0.1,
                priority: 1,
                ..base(id, 1)
            },

            // Heavy hit with recoil.
            MoveId::Bash => Move {
                power: 45,
                accuracy: 0.8,
                energy_cost: 0.25,
                recoil_fraction: 0.25,
                ..base(id, 2)
            },

            // Chance to burn.
            MoveId::Scorch => Move {
                power: 25,
                accuracy: 0.9,
                energy_cost: 0.2,
                burn_chance: 0.3,
                ..base(id, 2)
            },

            // Chance to paralyze.
            MoveId::Jolt => Move {
                power: 25,
                accuracy: 0.9,
                energy_cost: 0.2,
                paralysis_chance: 0.3,
                ..base(id, 2)
            },

            // =================================================================
            // Stat changes
            // =================================================================

            // Lowers the target's attack.
            MoveId::Menace => Move {
                accuracy: 1.0,
                energy_cost: 0.1,
                stat_effects: vec![StatEffect {
                    target: EffectTarget::Target,
                    stat: Stat::Attack,
                    delta: -1,
                    chance: 1.0,
                }],
                behavior: Behavior::StatChange,
                ..base(id, 1)
            },

            // Raises own attack, sometimes speed too.
            MoveId::Warcry => Move {
                energy_cost: 0.1,
                use_accuracy: false,
                stat_effects: vec![
                    StatEffect {
                        target: EffectTarget::User,
                        stat: Stat::Attack,
                        delta: 1,
                        chance: 1.0,
                    },
                    StatEffect {
                        target: EffectTarget::User,
                        stat: Stat::Speed,
                        delta: 1,
                        chance: 0.5,
                    },
                ],
                behavior: Behavior::StatChange,
                ..base(id, 1)
            },

            // Wipes every stage modifier on both sides.
            MoveId::Purge => Move {
                energy_cost: 0.15,
                use_accuracy: false,
                behavior: Behavior::StatClear,
                ..base(id, 2)
            },

            // =================================================================
            // Recovery
            // =================================================================
            MoveId::Cleanse => Move {
                energy_cost: 0.1,
                use_accuracy: false,
                behavior: Behavior::Cure,
                ..base(id, 1)
            },

            MoveId::Mend => Move {
                energy_cost: 0.3,
                use_accuracy: false,
                behavior: Behavior::Heal { fraction: 0.5 },
                ..base(id, 2)
            },

            MoveId::Siphon => Move {
                power: 25,
                accuracy: 0.9,
                energy_cost: 0.25,
                behavior: Behavior::Drain { fraction: 0.5 },
                ..base(id, 2)
            },

            // =================================================================
            // Shields
            // =================================================================

            // The accuracy field is the shield's own success chance; the
            // sequencer elevates priority for this family.
            MoveId::Guard => Move {
                accuracy: 0.75,
                energy_cost: 0.1,
                use_accuracy: false,
                behavior: Behavior::Shield,
                ..base(id, 1)
            },

            MoveId::Shatter => Move {
                power: 30,
                accuracy: 0.85,
                energy_cost: 0.25,
                behavior: Behavior::ShieldBreak { multiplier: 1.5 },
                ..base(id, 3)
            },

            // =================================================================
            // Scaled attacks
            // =================================================================

            // Full power only at full energy.
            MoveId::Overcharge => Move {
                power: 50,
                accuracy: 0.9,
                energy_cost: 0.3,
                behavior: Behavior::EnergyScaled { floor_power: 15 },
                ..base(id, 3)
            },

            // Stronger when striking first.
            MoveId::Ambush => Move {
                power: 25,
                accuracy: 0.9,
                energy_cost: 0.2,
                behavior: Behavior::OrderScaled {
                    multiplier: 1.5,
                    when_first: true,
                },
                ..base(id, 2)
            },

            // Stronger when striking second.
            MoveId::Riposte => Move {
                power: 25,
                accuracy: 0.9,
                energy_cost: 0.2,
                behavior: Behavior::OrderScaled {
                    multiplier: 1.5,
                    when_first: false,
                },
                ..base(id, 2)
            },

            // Doubled against a paralyzed target.
            MoveId::Punish => Move {
                power: 25,
                accuracy: 0.9,
                energy_cost: 0.25,
                behavior: Behavior::StatusConditional {
                    status: StatusFlags::PARALYZED,
                    check_user: false,
                    check_target: true,
                    multiplier: 2.0,
                },
                ..base(id, 3)
            },

            // Opens huge, fades as the battle drags on.
            MoveId::Onslaught => Move {
                power: 50,
                accuracy: 0.85,
                energy_cost: 0.3,
                behavior: Behavior::DecayScaled {
                    floor_scale: 0.5,
                    max_rounds: 5,
                },
                ..base(id, 3)
            },

            // =================================================================
            // Free actions
            // =================================================================
            MoveId::Retreat => Move {
                accuracy: 0.5,
                use_accuracy: false,
                behavior: Behavior::Run,
                ..base(id, 1)
            },

            MoveId::Recharge => Move {
                use_accuracy: false,
                behavior: Behavior::Charge { fraction: 0.5 },
                ..base(id, 1)
            },
        }
    }

    /// Uniform draw from the rank pool, excluding already-equipped moves.
    /// Used by the level-up move-learning offer.
    pub fn random_offer(
        &self,
        rank: u8,
        exclude: &[MoveId],
        rng: &mut dyn RandomSource,
    ) -> Option<MoveId> {
        let pool: Vec<MoveId> = MoveId::ALL
            .iter()
            .copied()
            .filter(|id| self.generate(*id).rank == rank && !exclude.contains(id))
            .collect();
        if pool.is_empty() {
            None
        } else {
            Some(pool[rng.pick(pool.len())])
        }
    }
}

/// Shared defaults; each entry overrides what it cares about.
fn base(id: MoveId, rank: u8) -> Move {
    Move {
        id,
        rank,
        power: 0,
        accuracy: 1.0,
        energy_cost: 0.0,
        priority: 0,
        use_accuracy: true,
        crit_chance: 0.05,
        burn_chance: 0.0,
        paralysis_chance: 0.0,
        recoil_fraction: 0.0,
        stat_effects: Vec::new(),
        behavior: Behavior::Attack,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rng::SequenceSource;

    #[test]
    fn test_generate_is_deterministic() {
        let catalog = MoveCatalog::new();
        for id in MoveId::ALL {
            assert_eq!(catalog.generate(id), catalog.generate(id));
            assert_eq!(catalog.generate(id).id, id);
        }
    }

    #[test]
    fn test_every_behavior_variant_is_exercised() {
        let catalog = MoveCatalog::new();
        let mut seen = [false; 14];
        for id in MoveId::ALL {
            let slot = match catalog.generate(id).behavior {
                Behavior::Attack => 0,
                Behavior::Heal { .. } => 1,
                Behavior::Drain { .. } => 2,
                Behavior::StatChange => 3,
                Behavior::StatClear => 4,
                Behavior::Cure => 5,
                Behavior::Shield => 6,
                Behavior::ShieldBreak { .. } => 7,
                Behavior::EnergyScaled { .. } => 8,
                Behavior::OrderScaled { .. } => 9,
                Behavior::StatusConditional { .. } => 10,
                Behavior::DecayScaled { .. } => 11,
                Behavior::Run => 12,
                Behavior::Charge { .. } => 13,
            };
            seen[slot] = true;
        }
        assert!(seen.iter().all(|s| *s), "unexercised behavior variant");
    }

    #[test]
    fn test_free_actions_cost_nothing() {
        let catalog = MoveCatalog::new();
        assert_eq!(catalog.generate(MoveId::Retreat).energy_cost, 0.0);
        assert_eq!(catalog.generate(MoveId::Recharge).energy_cost, 0.0);
    }

    #[test]
    fn test_random_offer_respects_rank_and_exclusion() {
        let catalog = MoveCatalog::new();
        let mut rng = SequenceSource::new([], 0.0);

        let offer = catalog.random_offer(3, &[], &mut rng).unwrap();
        assert_eq!(catalog.generate(offer).rank, 3);

        // Excluding the whole rank-3 pool yields no offer.
        let rank3: Vec<MoveId> = MoveId::ALL
            .iter()
            .copied()
            .filter(|id| catalog.generate(*id).rank == 3)
            .collect();
        assert_eq!(catalog.random_offer(3, &rank3, &mut rng), None);
    }
}
