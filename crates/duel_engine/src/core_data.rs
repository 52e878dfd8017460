//! Shared plain data types used across the engine.

use bitflags::bitflags;
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter};

/// The two sides of a duel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Side {
    /// The controlled combatant.
    Player,
    /// The opposing combatant.
    Opponent,
}

impl Side {
    /// The opposite side.
    #[inline]
    pub const fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    /// Index into a `[Combatant; 2]` pair.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Side::Player => 0,
            Side::Opponent => 1,
        }
    }
}

/// The four stats affected by stage modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, EnumIter, Display)]
#[strum(serialize_all = "lowercase")]
pub enum Stat {
    Attack,
    Defense,
    Speed,
    Accuracy,
}

impl Stat {
    /// Index into a per-stat array.
    #[inline]
    pub const fn index(self) -> usize {
        match self {
            Stat::Attack => 0,
            Stat::Defense => 1,
            Stat::Speed => 2,
            Stat::Accuracy => 3,
        }
    }
}

bitflags! {
    /// Status conditions. Both can be active at once.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
    pub struct StatusFlags: u8 {
        const BURNED    = 1 << 0;
        const PARALYZED = 1 << 1;
    }
}

/// How a battle ended, as reported by the outcome branch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BattleOutcome {
    Victory,
    Defeat,
    Fled,
    Aborted,
}

/// Sound cues forwarded to the presentation layer. Fire-and-forget.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SoundKey {
    Hit,
    CriticalHit,
    Shield,
    Heal,
    Burn,
    Paralysis,
    Faint,
    Flee,
    LevelUp,
}

/// Transient per-round bookkeeping.
///
/// `order` counts resolved actions: 0 at round start, 1 after the first
/// actor, 2 after the second. The crit/recoil flags are consumed by
/// external tutorial logic and reset when a new round begins.
#[derive(Debug, Clone, Copy)]
pub struct RoundContext {
    /// Elapsed battle-round count, 0-based.
    pub round: u32,
    /// How many of the two actions have resolved.
    pub order: u8,
    /// Which side acts first this round.
    pub first_mover: Side,
    /// A critical hit landed this round.
    pub crit_occurred: bool,
    /// Recoil damage was taken this round.
    pub recoil_occurred: bool,
    /// A Run move succeeded this round.
    pub fled: bool,
}

impl RoundContext {
    /// Fresh context for round `round`.
    pub fn new(round: u32) -> Self {
        Self {
            round,
            order: 0,
            first_mover: Side::Player,
            crit_occurred: false,
            recoil_occurred: false,
            fled: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_side_other() {
        assert_eq!(Side::Player.other(), Side::Opponent);
        assert_eq!(Side::Opponent.other(), Side::Player);
        assert_eq!(Side::Player.index(), 0);
        assert_eq!(Side::Opponent.index(), 1);
    }

    #[test]
    fn test_status_flags_independent() {
        let mut s = StatusFlags::default();
        s.insert(StatusFlags::BURNED);
        assert!(s.contains(StatusFlags::BURNED));
        assert!(!s.contains(StatusFlags::PARALYZED));
        s.insert(StatusFlags::PARALYZED);
        assert!(s.contains(StatusFlags::BURNED | StatusFlags::PARALYZED));
    }
}
