//! Localized-text lookup collaborator.
//!
//! The engine never hardcodes narration: every page text comes from a
//! [`MessageProvider`] built once per session. A missing entry renders a
//! fallback string; text lookup failures are never errors (the engine has
//! no business recovering from them).

use std::collections::HashMap;

use crate::combatant::CombatantId;
use crate::core_data::Stat;
use crate::moves::MoveId;

/// A narration request, carrying the arguments its template needs.
#[derive(Debug, Clone, PartialEq)]
pub enum MessageKey {
    MoveUsed { user: String, mv: String },
    NoEnergy { user: String },
    Missed { user: String },
    Hit { target: String, damage: i32 },
    CriticalHit { target: String, damage: i32 },
    Blocked { target: String },
    Drained { user: String, target: String },
    Recoil { user: String },
    Inflicted { target: String, status: String },
    ParalyzedSkip { user: String },
    StatRose { target: String, stat: Stat, sharply: bool },
    StatFell { target: String, stat: Stat, sharply: bool },
    StatsCleared,
    Healed { user: String },
    FullHealth { user: String },
    Cured { user: String },
    NothingToCure { user: String },
    ShieldRaised { user: String },
    EnergyRestored { user: String },
    FullEnergy { user: String },
    FledSuccess,
    FledFailure { user: String },
    Failed,
    HurtByBurn { target: String },
    Defeated { target: String },
    GainedExp { user: String, amount: u32 },
    GrewToLevel { user: String, level: u8 },
    WantsToLearn { user: String, mv: String },
    GameOver,
}

impl MessageKey {
    /// Stable identifier for the speech-lookup collaborator.
    pub fn speech_id(&self) -> &'static str {
        match self {
            MessageKey::MoveUsed { .. } => "battle.move_used",
            MessageKey::NoEnergy { .. } => "battle.no_energy",
            MessageKey::Missed { .. } => "battle.missed",
            MessageKey::Hit { .. } => "battle.hit",
            MessageKey::CriticalHit { .. } => "battle.critical_hit",
            MessageKey::Blocked { .. } => "battle.blocked",
            MessageKey::Drained { .. } => "battle.drained",
            MessageKey::Recoil { .. } => "battle.recoil",
            MessageKey::Inflicted { .. } => "battle.inflicted",
            MessageKey::ParalyzedSkip { .. } => "battle.paralyzed_skip",
            MessageKey::StatRose { .. } => "battle.stat_rose",
            MessageKey::StatFell { .. } => "battle.stat_fell",
            MessageKey::StatsCleared => "battle.stats_cleared",
            MessageKey::Healed { .. } => "battle.healed",
            MessageKey::FullHealth { .. } => "battle.full_health",
            MessageKey::Cured { .. } => "battle.cured",
            MessageKey::NothingToCure { .. } => "battle.nothing_to_cure",
            MessageKey::ShieldRaised { .. } => "battle.shield_raised",
            MessageKey::EnergyRestored { .. } => "battle.energy_restored",
            MessageKey::FullEnergy { .. } => "battle.full_energy",
            MessageKey::FledSuccess => "battle.fled",
            MessageKey::FledFailure { .. } => "battle.flee_failed",
            MessageKey::Failed => "battle.failed",
            MessageKey::HurtByBurn { .. } => "battle.hurt_by_burn",
            MessageKey::Defeated { .. } => "battle.defeated",
            MessageKey::GainedExp { .. } => "battle.gained_exp",
            MessageKey::GrewToLevel { .. } => "battle.grew_to_level",
            MessageKey::WantsToLearn { .. } => "battle.wants_to_learn",
            MessageKey::GameOver => "battle.game_over",
        }
    }
}

/// Text lookup for narration, move names and combatant names.
pub trait MessageProvider {
    fn text(&self, key: &MessageKey) -> String;
    fn move_name(&self, id: MoveId) -> String;
    fn combatant_name(&self, id: CombatantId) -> String;
}

/// Bundled English text.
#[derive(Default)]
pub struct DefaultMessages {
    names: HashMap<CombatantId, String>,
}

impl DefaultMessages {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a display name for a combatant id.
    pub fn set_name(&mut self, id: CombatantId, name: impl Into<String>) {
        self.names.insert(id, name.into());
    }
}

impl MessageProvider for DefaultMessages {
    fn text(&self, key: &MessageKey) -> String {
        use MessageKey::*;
        match key {
            MoveUsed { user, mv } => format!("{user} used {mv}!"),
            NoEnergy { user } => format!("{user} doesn't have the energy!"),
            Missed { user } => format!("{user}'s attack missed!"),
            Hit { target, damage } => format!("{target} took {damage} damage!"),
            CriticalHit { target, damage } => {
                format!("A critical strike! {target} took {damage} damage!")
            }
            Blocked { target } => format!("{target}'s shield absorbed the blow!"),
            Drained { user, target } => format!("{user} drained strength from {target}!"),
            Recoil { user } => format!("{user} was hurt by the recoil!"),
            Inflicted { target, status } => format!("{target} was {status}!"),
            ParalyzedSkip { user } => format!("{user} is paralyzed and can't move!"),
            StatRose { target, stat, sharply } => {
                if *sharply {
                    format!("{target}'s {stat} rose sharply!")
                } else {
                    format!("{target}'s {stat} rose!")
                }
            }
            StatFell { target, stat, sharply } => {
                if *sharply {
                    format!("{target}'s {stat} fell sharply!")
                } else {
                    format!("{target}'s {stat} fell!")
                }
            }
            StatsCleared => "All stat changes were wiped away!".to_string(),
            Healed { user } => format!("{user} recovered health!"),
            FullHealth { user } => format!("{user} is already at full health!"),
            Cured { user } => format!("{user} shook off its ailments!"),
            NothingToCure { user } => format!("{user} has nothing to shake off!"),
            ShieldRaised { user } => format!("{user} braced behind a shield!"),
            EnergyRestored { user } => format!("{user} recharged its energy!"),
            FullEnergy { user } => format!("{user}'s energy is already full!"),
            FledSuccess => "Got away safely!".to_string(),
            FledFailure { user } => format!("{user} couldn't get away!"),
            Failed => "But it failed!".to_string(),
            HurtByBurn { target } => format!("{target} is hurt by its burn!"),
            Defeated { target } => format!("{target} was defeated!"),
            GainedExp { user, amount } => format!("{user} gained {amount} experience!"),
            GrewToLevel { user, level } => format!("{user} grew to level {level}!"),
            WantsToLearn { user, mv } => format!("{user} wants to learn {mv}!"),
            GameOver => "The world went dark...".to_string(),
        }
    }

    fn move_name(&self, id: MoveId) -> String {
        id.display_name().to_string()
    }

    fn combatant_name(&self, id: CombatantId) -> String {
        match self.names.get(&id) {
            Some(name) => name.clone(),
            // Fallback rather than an error: a missing entry is a content
            // bug, not a rules bug.
            None => format!("Unit {}", id.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_name_lookup_and_fallback() {
        let mut m = DefaultMessages::new();
        m.set_name(CombatantId(1), "Cinder");
        assert_eq!(m.combatant_name(CombatantId(1)), "Cinder");
        assert_eq!(m.combatant_name(CombatantId(9)), "Unit 9");
    }

    #[test]
    fn test_templates_render_arguments() {
        let m = DefaultMessages::new();
        let text = m.text(&MessageKey::MoveUsed {
            user: "Cinder".into(),
            mv: "Slash".into(),
        });
        assert_eq!(text, "Cinder used Slash!");

        let text = m.text(&MessageKey::StatFell {
            target: "Gnarl".into(),
            stat: Stat::Defense,
            sharply: true,
        });
        assert_eq!(text, "Gnarl's defense fell sharply!");
    }

    #[test]
    fn test_speech_ids_are_stable() {
        assert_eq!(MessageKey::FledSuccess.speech_id(), "battle.fled");
        assert_eq!(MessageKey::GameOver.speech_id(), "battle.game_over");
    }
}
