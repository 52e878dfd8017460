//! The turn sequencer.
//!
//! [`Battle`] owns both combatants, the timeline and the per-round state
//! machine. An external presentation driver advances the timeline one page
//! at a time; each advance runs the closing page's hooks and then the
//! opening page's hooks, which is where every rules mutation happens.
//!
//! Round state machine:
//! `Selecting → OrderDecided → FirstResolving → SecondResolving →
//! StatusEffects → RoundResolved → {Selecting | BattleEnded}`

mod outcome;

use tracing::debug;

use crate::combatant::{Combatant, CombatantSnapshot, SnapshotError};
use crate::config::RulesConfig;
use crate::core_data::{BattleOutcome, RoundContext, Side, SoundKey, StatusFlags};
use crate::messages::{MessageKey, MessageProvider};
use crate::moves::perform::{perform, PerformCtx};
use crate::moves::{Behavior, Move, MoveCatalog, MoveId};
use crate::rng::RandomSource;
use crate::timeline::{Page, PageHook, Timeline};

/// Fire-and-forget presentation collaborators. The engine never consults a
/// return value; every method defaults to a no-op.
pub trait BattleObserver {
    fn refresh_displays(&mut self, _player: &Combatant, _opponent: &Combatant) {}
    fn play_animation(&mut self, _side: Side, _move_id: MoveId) {}
    fn play_sound(&mut self, _sound: SoundKey) {}
    fn speak(&mut self, _speech_key: &str) {}
    fn exit_to_overworld(&mut self) {}
    fn offer_move_learn(&mut self, _move_id: MoveId) {}
}

/// Observer that ignores everything.
pub struct NullObserver;

impl BattleObserver for NullObserver {}

/// Phases of one battle round.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundPhase {
    Selecting,
    OrderDecided,
    FirstResolving,
    SecondResolving,
    StatusEffects,
    RoundResolved,
    BattleEnded,
}

/// One battle session between the controlled combatant and an opponent.
pub struct Battle {
    combatants: [Combatant; 2],
    timeline: Timeline,
    catalog: MoveCatalog,
    config: RulesConfig,
    messages: Box<dyn MessageProvider>,
    rng: Box<dyn RandomSource>,
    phase: RoundPhase,
    round: u32,
    round_ctx: RoundContext,
    outcome: Option<BattleOutcome>,
}

impl Battle {
    /// Start a battle from live combatants. Transient state (shield,
    /// stages, statuses) is reset on entry.
    pub fn new(
        player: Combatant,
        opponent: Combatant,
        catalog: MoveCatalog,
        config: RulesConfig,
        messages: Box<dyn MessageProvider>,
        rng: Box<dyn RandomSource>,
    ) -> Self {
        let mut combatants = [player, opponent];
        for c in &mut combatants {
            c.reset_transient();
        }
        Self {
            combatants,
            timeline: Timeline::new(),
            catalog,
            config,
            messages,
            rng,
            phase: RoundPhase::Selecting,
            round: 0,
            round_ctx: RoundContext::new(0),
            outcome: None,
        }
    }

    /// Start a battle from persisted snapshots.
    pub fn from_snapshots(
        player: &CombatantSnapshot,
        opponent: &CombatantSnapshot,
        catalog: MoveCatalog,
        config: RulesConfig,
        messages: Box<dyn MessageProvider>,
        rng: Box<dyn RandomSource>,
    ) -> Result<Self, SnapshotError> {
        Ok(Self::new(
            Combatant::from_snapshot(player)?,
            Combatant::from_snapshot(opponent)?,
            catalog,
            config,
            messages,
            rng,
        ))
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn combatant(&self, side: Side) -> &Combatant {
        &self.combatants[side.index()]
    }

    pub fn phase(&self) -> RoundPhase {
        self.phase
    }

    /// Elapsed round count, 0-based.
    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn round_context(&self) -> &RoundContext {
        &self.round_ctx
    }

    pub fn outcome(&self) -> Option<BattleOutcome> {
        self.outcome
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn config(&self) -> &RulesConfig {
        &self.config
    }

    /// Whether the move in `slot` can pay its energy cost right now.
    /// Selection UIs gate on this; selecting an unusable move anyway just
    /// wastes the turn on a "no energy" page.
    pub fn move_usable(&self, side: Side, slot: usize) -> bool {
        let c = &self.combatants[side.index()];
        match c.equipped[slot] {
            Some(id) => self.catalog.generate(id).usable(c),
            None => false,
        }
    }

    // ========================================================================
    // Selection and round start
    // ========================================================================

    /// Select the move in `slot` for `side`. Returns false on an empty slot.
    pub fn select_move(&mut self, side: Side, slot: usize) -> bool {
        let id = match self.combatants[side.index()].equipped[slot] {
            Some(id) => id,
            None => return false,
        };
        let mv = self.catalog.generate(id);
        self.combatants[side.index()].selected = Some(mv);
        true
    }

    /// Decide order and build the round's action script.
    ///
    /// Both sides must have a selection; calling without one is a
    /// sequencing bug.
    pub fn begin_round(&mut self) {
        assert_eq!(
            self.phase,
            RoundPhase::Selecting,
            "begin_round outside the selection phase"
        );
        let player_mv = self.combatants[Side::Player.index()]
            .selected
            .clone()
            .expect("player has no selected move");
        let opponent_mv = self.combatants[Side::Opponent.index()]
            .selected
            .clone()
            .expect("opponent has no selected move");

        // Shields from the previous round expire here.
        for c in &mut self.combatants {
            c.vulnerable = true;
        }
        self.round_ctx = RoundContext::new(self.round);

        let first = self.decide_order(&player_mv, &opponent_mv);
        self.round_ctx.first_mover = first;
        debug!(round = self.round, first = ?first, "turn order decided");

        let mut pages = vec![self.action_page(first), self.action_page(first.other())];
        // A skipped second action produces no pages of its own, so the
        // action phase ends when its page closes. A performed second action
        // attaches EndRound to the last page it splices instead.
        let second = pages.last_mut().expect("round script has two pages");
        if second
            .open_hooks()
            .iter()
            .any(|h| matches!(h, PageHook::SkipTurn(_)))
        {
            second.add_close_hook(PageHook::EndRound);
        }
        self.timeline.replace_all(pages);
        self.phase = RoundPhase::OrderDecided;
    }

    /// Priority first, then paralysis-scaled speed, then a coin flip.
    fn decide_order(&mut self, player_mv: &Move, opponent_mv: &Move) -> Side {
        let pp = self.effective_priority(player_mv);
        let op = self.effective_priority(opponent_mv);
        if pp != op {
            return if pp > op { Side::Player } else { Side::Opponent };
        }
        let ps = self.effective_speed(Side::Player);
        let os = self.effective_speed(Side::Opponent);
        if ps > os {
            Side::Player
        } else if os > ps {
            Side::Opponent
        } else if self.rng.chance(0.5) {
            Side::Player
        } else {
            Side::Opponent
        }
    }

    fn effective_priority(&self, mv: &Move) -> i8 {
        // Shields always act elevated regardless of catalog numbers.
        match mv.behavior {
            Behavior::Shield => mv.priority.max(self.config.shield_priority),
            _ => mv.priority,
        }
    }

    fn effective_speed(&self, side: Side) -> f64 {
        let c = &self.combatants[side.index()];
        let mut speed = c.modified_speed(&self.config) as f64;
        if c.statuses.contains(StatusFlags::PARALYZED) {
            speed *= self.config.paralysis_speed_penalty;
        }
        speed
    }

    /// Build one actor's action page. A paralyzed actor may lose the turn
    /// here, in which case the move is never invoked at all.
    fn action_page(&mut self, side: Side) -> Page {
        let c = &self.combatants[side.index()];
        let mv = c.selected.as_ref().expect("building a page with no selected move");
        let paralyzed = c.statuses.contains(StatusFlags::PARALYZED);
        let exempt = mv.behavior.paralysis_exempt();
        let move_id = mv.id;
        let user = self.messages.combatant_name(c.id);

        if paralyzed && !exempt && self.rng.chance(self.config.paralysis_skip_chance) {
            let key = MessageKey::ParalyzedSkip { user };
            Page::new(self.messages.text(&key))
                .with_open(PageHook::Sound(SoundKey::Paralysis))
                .with_open(PageHook::SkipTurn(side))
        } else {
            let key = MessageKey::MoveUsed {
                user,
                mv: self.messages.move_name(move_id),
            };
            let text = self.messages.text(&key);
            Page::new(text)
                .with_speech(key.speech_id())
                .with_open(PageHook::Animation { side, move_id })
                .with_open(PageHook::PerformMove(side))
        }
    }

    // ========================================================================
    // Advancement
    // ========================================================================

    /// Consume the current page's close hooks, open the next page and run
    /// its hooks, then return it for presentation. Returns None when the
    /// script is drained (round over or battle over).
    ///
    /// Advancing an empty timeline is a sequencing bug and panics.
    pub fn advance(&mut self, obs: &mut dyn BattleObserver) -> Option<&Page> {
        assert!(!self.timeline.is_empty(), "advancing an empty timeline");

        if let Some(current) = self.timeline.cursor() {
            for hook in self.timeline.close_hooks(current) {
                self.run_hook(hook, obs);
            }
        }
        if self.timeline.is_empty() {
            // An exit hook flushed the script while closing the last page.
            return None;
        }
        let opened = self.timeline.step_forward()?;
        for hook in self.timeline.open_hooks(opened) {
            self.run_hook(hook, obs);
        }
        if let Some(page) = self.timeline.current() {
            if let Some(key) = &page.speech_key {
                obs.speak(key);
            }
        }
        self.timeline.current()
    }

    /// Cancel the battle: flush the timeline and reset both combatants'
    /// transient state in one step, so no partial reset is observable.
    pub fn abort(&mut self) {
        debug!("battle aborted");
        self.timeline.clear();
        for c in &mut self.combatants {
            c.reset_transient();
        }
        self.phase = RoundPhase::BattleEnded;
        self.outcome = Some(BattleOutcome::Aborted);
    }

    /// Finish the session, writing both combatants back to persisted form.
    pub fn into_snapshots(mut self) -> (CombatantSnapshot, CombatantSnapshot) {
        for c in &mut self.combatants {
            c.reset_transient();
        }
        (
            self.combatants[0].to_snapshot(),
            self.combatants[1].to_snapshot(),
        )
    }

    // ========================================================================
    // Hook interpretation
    // ========================================================================

    fn run_hook(&mut self, hook: PageHook, obs: &mut dyn BattleObserver) {
        match hook {
            PageHook::PerformMove(side) => self.run_perform(side),
            PageHook::SkipTurn(side) => {
                debug!(side = ?side, "turn skipped by paralysis");
                self.note_action_start();
                self.round_ctx.order += 1;
            }
            PageHook::ApplyBurn(side) => {
                let fraction = self.config.burn_fraction;
                let c = &mut self.combatants[side.index()];
                let damage = ((c.max_health as f64 * fraction).round() as i32).max(1);
                c.take_damage(damage);
            }
            PageHook::Animation { side, move_id } => obs.play_animation(side, move_id),
            PageHook::Sound(sound) => obs.play_sound(sound),
            PageHook::RefreshDisplays => {
                obs.refresh_displays(&self.combatants[0], &self.combatants[1]);
            }
            PageHook::EndRound => self.end_action_phase(),
            PageHook::ResolveRound => self.resolve_round(),
            PageHook::GrantExperience(amount) => self.grant_experience(amount),
            PageHook::LevelUp(side) => self.level_up(side),
            PageHook::OfferMoveLearn(id) => obs.offer_move_learn(id),
            PageHook::ExitBattle(outcome) => {
                debug!(outcome = ?outcome, "battle ended");
                self.outcome = Some(outcome);
                self.phase = RoundPhase::BattleEnded;
                for c in &mut self.combatants {
                    c.reset_transient();
                }
                self.timeline.clear();
            }
            PageHook::ExitToOverworld => obs.exit_to_overworld(),
        }
    }

    fn note_action_start(&mut self) {
        self.phase = if self.round_ctx.order == 0 {
            RoundPhase::FirstResolving
        } else {
            RoundPhase::SecondResolving
        };
    }

    /// Resolve one actor's selected move and splice its pages in.
    fn run_perform(&mut self, side: Side) {
        self.note_action_start();
        let mv = self.combatants[side.index()]
            .selected
            .clone()
            .expect("resolving an action with no selected move");

        // A dead actor's stale selection becomes a no-op close: the move
        // is never invoked and no state is touched.
        if self.combatants[side.index()].is_dead() {
            self.round_ctx.order += 1;
            if self.round_ctx.order == 2 {
                if let Some(current) = self.timeline.cursor() {
                    self.timeline.page_mut(current).add_close_hook(PageHook::EndRound);
                }
            }
            return;
        }

        let mut out = Vec::new();
        let (left, right) = self.combatants.split_at_mut(1);
        let (user, target) = match side {
            Side::Player => (&mut left[0], &mut right[0]),
            Side::Opponent => (&mut right[0], &mut left[0]),
        };
        let success = perform(
            &mv,
            &mut PerformCtx {
                user,
                target,
                user_side: side,
                round: &mut self.round_ctx,
                config: &self.config,
                rng: self.rng.as_mut(),
                messages: self.messages.as_ref(),
                out: &mut out,
            },
        );
        debug!(side = ?side, move_id = ?mv.id, success, "move resolved");
        self.round_ctx.order += 1;

        let last = self.timeline.insert_after_current(out);

        if self.round_ctx.fled {
            // Running away truncates the round; the flee page hands
            // control back to the overworld when it closes.
            self.timeline.truncate_after(last);
            let page = self.timeline.page_mut(last);
            page.add_close_hook(PageHook::ExitBattle(BattleOutcome::Fled));
            page.add_close_hook(PageHook::ExitToOverworld);
            return;
        }

        if self.round_ctx.order == 2 {
            // Second action resolved: the phase ends after its last page.
            self.timeline.page_mut(last).add_close_hook(PageHook::EndRound);
            return;
        }

        // Early termination: someone died while the second action is
        // still pending. A terminal blank page goes in immediately before
        // the last remaining page; EndRound truncates when it opens, so
        // that action never opens.
        let any_dead = self.combatants.iter().any(|c| c.is_dead());
        if any_dead && self.round_ctx.order == 1 {
            let blank = Page::blank().with_open(PageHook::EndRound);
            let last_remaining = self.timeline.len() - 1;
            self.timeline.insert(last_remaining, blank);
        }
    }

    /// Action phase is over (normally or truncated): build the burn pages
    /// and the round-resolution page.
    fn end_action_phase(&mut self) {
        self.phase = RoundPhase::StatusEffects;
        self.timeline.truncate_after_current();

        let first = self.round_ctx.first_mover;
        for side in [first, first.other()] {
            let c = &self.combatants[side.index()];
            if c.statuses.contains(StatusFlags::BURNED) && !c.is_dead() {
                let key = MessageKey::HurtByBurn {
                    target: self.messages.combatant_name(c.id),
                };
                let page = Page::new(self.messages.text(&key))
                    .with_open(PageHook::ApplyBurn(side))
                    .with_open(PageHook::Sound(SoundKey::Burn))
                    .with_open(PageHook::RefreshDisplays);
                self.timeline.push(page);
            }
        }
        self.timeline
            .push(Page::blank().with_close(PageHook::ResolveRound));
    }

    /// Pick the next round or an outcome branch once the script drains.
    fn resolve_round(&mut self) {
        self.phase = RoundPhase::RoundResolved;
        // Shields last "the remainder of the round"; this is where that
        // remainder ends.
        for c in &mut self.combatants {
            c.vulnerable = true;
        }
        let player_dead = self.combatants[Side::Player.index()].is_dead();
        let opponent_dead = self.combatants[Side::Opponent.index()].is_dead();

        if player_dead && opponent_dead {
            // Simultaneous death resolves in the controlled side's favor.
            self.combatants[Side::Player.index()].health = 1;
        }

        if opponent_dead {
            let pages = self.victory_pages();
            self.timeline.replace_all(pages);
        } else if player_dead {
            let pages = self.defeat_pages();
            self.timeline.replace_all(pages);
        } else {
            self.round += 1;
            for c in &mut self.combatants {
                c.selected = None;
            }
            self.phase = RoundPhase::Selecting;
            debug!(round = self.round, "round resolved");
        }
    }
}
