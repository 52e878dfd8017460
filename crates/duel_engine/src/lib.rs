//! duel_engine - turn-based battle rules engine
//!
//! The rules core of a two-combatant battle: move resolution, damage,
//! resource costs, chance effects, stage modifiers, status conditions and
//! turn ordering, all surfaced through an ordered timeline of presentation
//! pages. The crate is a library with no I/O of its own; an application
//! shell owns rendering, input and persistence, and drives the timeline
//! one page at a time.
//!
//! # Driving a battle
//!
//! ```ignore
//! use duel_engine::{Battle, DefaultMessages, MoveCatalog, NullObserver,
//!                   RulesConfig, Side, SmallRngSource};
//!
//! let mut battle = Battle::from_snapshots(
//!     &player_snapshot,
//!     &opponent_snapshot,
//!     MoveCatalog::new(),
//!     RulesConfig::default(),
//!     Box::new(DefaultMessages::new()),
//!     Box::new(SmallRngSource::from_entropy()),
//! )?;
//!
//! battle.select_move(Side::Player, 0);
//! battle.select_move(Side::Opponent, 2);
//! battle.begin_round();
//!
//! let mut obs = NullObserver;
//! while let Some(page) = battle.advance(&mut obs) {
//!     // present page.text, wait for input, repeat
//! }
//! // phase() is now Selecting again, or BattleEnded with an outcome()
//! ```

/// Shared plain data types
pub mod core_data;

/// Tunable rules tables
pub mod config;

/// Injectable random source
pub mod rng;

/// Per-combatant resource/stat state and persisted snapshots
pub mod combatant;

/// Localized-text lookup collaborator
pub mod messages;

/// Presentation page queue
pub mod timeline;

/// Move identifiers, catalog and behavior hierarchy
pub mod moves;

/// Damage formula and its per-behavior rescalers
pub mod damage;

/// The turn sequencer
pub mod battle;

// Re-export the surface a shell needs.
pub use battle::{Battle, BattleObserver, NullObserver, RoundPhase};
pub use combatant::{Combatant, CombatantId, CombatantSnapshot, SnapshotError};
pub use config::RulesConfig;
pub use core_data::{BattleOutcome, Side, SoundKey, Stat, StatusFlags};
pub use messages::{DefaultMessages, MessageKey, MessageProvider};
pub use moves::{Behavior, Move, MoveCatalog, MoveId};
pub use rng::{RandomSource, SequenceSource, SmallRngSource};
pub use timeline::{Page, PageHook, Timeline};
