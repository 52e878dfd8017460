//! Win/lose branch scripts.
//!
//! When a round resolves with a dead combatant the sequencer swaps the
//! timeline for one of these scripts. Experience and level growth are
//! applied through hooks as their pages open, so the shell sees them in
//! presentation order and each mutation fires exactly once.

use tracing::debug;

use crate::battle::{Battle, RoundPhase};
use crate::core_data::{BattleOutcome, Side, SoundKey};
use crate::messages::MessageKey;
use crate::moves::MoveId;
use crate::timeline::{Page, PageHook};

impl Battle {
    /// Script shown when the opponent falls: reward, level-ups, and the
    /// exit page that hands control back.
    pub(super) fn victory_pages(&self) -> Vec<Page> {
        let opponent = self.combatant(Side::Opponent);
        let player = self.combatant(Side::Player);
        let exp = self.config().exp_per_opponent_level * opponent.level as u32;

        let defeated = MessageKey::Defeated {
            target: self.messages.combatant_name(opponent.id),
        };
        let gained = MessageKey::GainedExp {
            user: self.messages.combatant_name(player.id),
            amount: exp,
        };
        vec![
            Page::new(self.messages.text(&defeated))
                .with_speech(defeated.speech_id())
                .with_open(PageHook::Sound(SoundKey::Faint))
                .with_open(PageHook::RefreshDisplays),
            Page::new(self.messages.text(&gained))
                .with_open(PageHook::GrantExperience(exp)),
            Page::blank()
                .with_open(PageHook::RefreshDisplays)
                .with_close(PageHook::ExitBattle(BattleOutcome::Victory)),
        ]
    }

    /// Script shown when the player falls.
    pub(super) fn defeat_pages(&self) -> Vec<Page> {
        let player = self.combatant(Side::Player);
        let defeated = MessageKey::Defeated {
            target: self.messages.combatant_name(player.id),
        };
        let game_over = MessageKey::GameOver;
        vec![
            Page::new(self.messages.text(&defeated))
                .with_open(PageHook::Sound(SoundKey::Faint))
                .with_open(PageHook::RefreshDisplays),
            Page::new(self.messages.text(&game_over))
                .with_speech(game_over.speech_id())
                .with_close(PageHook::ExitBattle(BattleOutcome::Defeat)),
        ]
    }

    /// Bank the award, then splice one page per level gained. The level
    /// itself only changes when a level page opens.
    pub(super) fn grant_experience(&mut self, amount: u32) {
        debug_assert_eq!(self.phase(), RoundPhase::RoundResolved);
        let player = &mut self.combatants[Side::Player.index()];
        player.experience += amount;

        let mut level = player.level;
        let mut exp = player.experience;
        let mut gained = Vec::new();
        loop {
            let needed = self.config.exp_to_next(level);
            if exp < needed {
                break;
            }
            exp -= needed;
            level += 1;
            gained.push(level);
        }
        self.combatants[Side::Player.index()].experience = exp;
        debug!(amount, levels = gained.len(), "experience granted");

        let user = self
            .messages
            .combatant_name(self.combatants[Side::Player.index()].id);
        let pages: Vec<Page> = gained
            .into_iter()
            .map(|level| {
                let key = MessageKey::GrewToLevel {
                    user: user.clone(),
                    level,
                };
                Page::new(self.messages.text(&key))
                    .with_open(PageHook::LevelUp(Side::Player))
                    .with_open(PageHook::Sound(SoundKey::LevelUp))
                    .with_open(PageHook::RefreshDisplays)
            })
            .collect();
        self.timeline.insert_after_current(pages);
    }

    /// Apply one level of stat growth. When the new level unlocks a move
    /// rank, splice a move-learning offer for the shell to act on.
    pub(super) fn level_up(&mut self, side: Side) {
        let growth = self.config.growth;
        let c = &mut self.combatants[side.index()];
        c.level += 1;
        c.max_health += growth.max_health;
        c.health = (c.health + growth.max_health).min(c.max_health);
        c.max_energy += growth.max_energy;
        c.energy = (c.energy + growth.max_energy).min(c.max_energy);
        c.attack += growth.attack;
        c.defense += growth.defense;
        c.speed += growth.speed;
        let level = c.level;
        let equipped: Vec<MoveId> = c.equipped.iter().flatten().copied().collect();
        debug!(side = ?side, level, "level gained");

        if self.config.rank_for_level(level) <= self.config.rank_for_level(level - 1) {
            return;
        }
        let rank = self.config.rank_for_level(level);
        if let Some(offer) = self
            .catalog
            .random_offer(rank, &equipped, self.rng.as_mut())
        {
            let key = MessageKey::WantsToLearn {
                user: self
                    .messages
                    .combatant_name(self.combatants[side.index()].id),
                mv: self.messages.move_name(offer),
            };
            let page =
                Page::new(self.messages.text(&key)).with_open(PageHook::OfferMoveLearn(offer));
            self.timeline.insert_after_current(vec![page]);
        }
    }
}
