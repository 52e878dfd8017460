//! Perform sequences for every behavior variant.
//!
//! The default attack sequence is: energy gate → deduct → accuracy check →
//! shield check → crit draw → damage → drain/recoil → status infliction →
//! stat effects, with the generated pages pushed in that fixed order.
//! Non-damaging variants keep the gates and replace everything after them.
//!
//! Expected failures (miss, no energy, nothing to cure) are `false`
//! returns plus a page, never errors.

use crate::combatant::Combatant;
use crate::config::RulesConfig;
use crate::core_data::{RoundContext, Side, SoundKey, StatusFlags};
use crate::damage::{calculate_damage, DamageContext};
use crate::messages::{MessageKey, MessageProvider};
use crate::moves::{Behavior, EffectTarget, Move};
use crate::rng::RandomSource;
use crate::timeline::{Page, PageHook};

/// Mutable view of everything one Perform call may touch.
pub struct PerformCtx<'a> {
    pub user: &'a mut Combatant,
    pub target: &'a mut Combatant,
    pub user_side: Side,
    pub round: &'a mut RoundContext,
    pub config: &'a RulesConfig,
    pub rng: &'a mut dyn RandomSource,
    pub messages: &'a dyn MessageProvider,
    /// Pages generated by this call, spliced into the timeline by the
    /// sequencer immediately after the page that invoked it.
    pub out: &'a mut Vec<Page>,
}

impl<'a> PerformCtx<'a> {
    fn user_name(&self) -> String {
        self.messages.combatant_name(self.user.id)
    }

    fn target_name(&self) -> String {
        self.messages.combatant_name(self.target.id)
    }

    fn push_text(&mut self, key: MessageKey) {
        self.out.push(Page::new(self.messages.text(&key)));
    }

    fn push_page(&mut self, key: MessageKey, page: fn(Page) -> Page) {
        self.out.push(page(Page::new(self.messages.text(&key))));
    }
}

/// Execute a move. Returns whether it took effect.
pub fn perform(mv: &Move, ctx: &mut PerformCtx<'_>) -> bool {
    match mv.behavior {
        Behavior::Heal { fraction } => perform_heal(mv, ctx, fraction),
        Behavior::Cure => perform_cure(mv, ctx),
        Behavior::StatChange => perform_stat_change(mv, ctx),
        Behavior::StatClear => perform_stat_clear(mv, ctx),
        Behavior::Shield => perform_shield(mv, ctx),
        Behavior::Run => perform_run(mv, ctx),
        Behavior::Charge { fraction } => perform_charge(mv, ctx, fraction),
        _ => perform_attack(mv, ctx),
    }
}

/// Steps 1–2 of every sequence: the energy gate, then unconditional
/// deduction. Returns the amount deducted, or None with a "no energy"
/// page already pushed.
fn pay_energy(mv: &Move, ctx: &mut PerformCtx<'_>) -> Option<i32> {
    if !mv.usable(ctx.user) {
        let user = ctx.user_name();
        ctx.push_text(MessageKey::NoEnergy { user });
        return None;
    }
    let cost = mv.energy_cost_for(ctx.user);
    ctx.user.spend_energy(cost);
    Some(cost)
}

/// Step 3: the accuracy check, unless the move never misses.
fn accuracy_check(mv: &Move, ctx: &mut PerformCtx<'_>, forced: bool) -> bool {
    if !mv.use_accuracy || forced {
        return true;
    }
    let acc = ctx.user.modified_accuracy(mv.accuracy, ctx.config);
    if ctx.rng.chance(acc) {
        true
    } else {
        let user = ctx.user_name();
        ctx.push_text(MessageKey::Missed { user });
        false
    }
}

// ============================================================================
// Default attack sequence (also Drain, ShieldBreak and the scaled variants)
// ============================================================================

fn perform_attack(mv: &Move, ctx: &mut PerformCtx<'_>) -> bool {
    let Some(cost) = pay_energy(mv, ctx) else {
        return false;
    };

    // A shield that succeeded this round leaves the target invulnerable;
    // a shield-breaker both ignores it and cannot miss it. The latch is
    // recomputed per call, so it resets after every Perform.
    let target_shielded = !ctx.target.vulnerable;
    let shield_up = target_shielded
        && matches!(
            ctx.target.selected.as_ref().map(|m| &m.behavior),
            Some(Behavior::Shield)
        );
    let breaks_shield = shield_up && matches!(mv.behavior, Behavior::ShieldBreak { .. });

    if !accuracy_check(mv, ctx, breaks_shield) {
        return false;
    }

    if target_shielded && !breaks_shield {
        let target = ctx.target_name();
        ctx.push_page(
            MessageKey::Blocked { target },
            |p| p.with_open(PageHook::Sound(SoundKey::Shield)),
        );
        return false;
    }

    // Step 4: independent crit draw, damage, drain, recoil.
    let crit = ctx.rng.chance(mv.crit_chance);
    if crit {
        ctx.round.crit_occurred = true;
    }
    let crit_boost = if crit { ctx.config.critical_boost } else { 1.0 };

    let damage = {
        let dctx = DamageContext {
            user: ctx.user,
            target: ctx.target,
            user_side: ctx.user_side,
            round: ctx.round,
            config: ctx.config,
            energy_spent: cost,
            shield_broken: breaks_shield,
        };
        calculate_damage(mv, &dctx, crit_boost)
    };
    let dealt = ctx.target.take_damage(damage);

    let target = ctx.target_name();
    let hit_key = if crit {
        MessageKey::CriticalHit {
            target,
            damage: dealt,
        }
    } else {
        MessageKey::Hit {
            target,
            damage: dealt,
        }
    };
    let sound = if crit {
        SoundKey::CriticalHit
    } else {
        SoundKey::Hit
    };
    let text = ctx.messages.text(&hit_key);
    ctx.out.push(
        Page::new(text)
            .with_open(PageHook::Sound(sound))
            .with_open(PageHook::RefreshDisplays),
    );

    if let Behavior::Drain { fraction } = mv.behavior {
        let heal = (dealt as f64 * fraction).round() as i32;
        if ctx.user.restore_health(heal) > 0 {
            let user = ctx.user_name();
            let target = ctx.target_name();
            ctx.push_page(
                MessageKey::Drained { user, target },
                |p| p.with_open(PageHook::Sound(SoundKey::Heal))
                    .with_open(PageHook::RefreshDisplays),
            );
        }
    }

    if mv.recoil_fraction > 0.0 {
        let recoil =
            ((dealt as f64 * mv.recoil_fraction).round() as i32).max(ctx.config.recoil_min);
        // Recoil never finishes off its own user.
        ctx.user.health = (ctx.user.health - recoil).max(1);
        ctx.round.recoil_occurred = true;
        let user = ctx.user_name();
        ctx.push_page(
            MessageKey::Recoil { user },
            |p| p.with_open(PageHook::RefreshDisplays),
        );
    }

    // Step 5: independent infliction draws, only onto a clean target.
    inflict(mv.burn_chance, StatusFlags::BURNED, "burned", SoundKey::Burn, ctx);
    inflict(
        mv.paralysis_chance,
        StatusFlags::PARALYZED,
        "paralyzed",
        SoundKey::Paralysis,
        ctx,
    );

    // Step 6: chance-gated stage deltas.
    apply_stat_effects(mv, ctx);

    true
}

fn inflict(
    chance: f64,
    status: StatusFlags,
    status_word: &str,
    sound: SoundKey,
    ctx: &mut PerformCtx<'_>,
) {
    if chance <= 0.0 || ctx.target.statuses.contains(status) {
        return;
    }
    if ctx.rng.chance(chance) {
        ctx.target.statuses.insert(status);
        let target = ctx.target_name();
        let key = MessageKey::Inflicted {
            target,
            status: status_word.to_string(),
        };
        let text = ctx.messages.text(&key);
        ctx.out.push(Page::new(text).with_open(PageHook::Sound(sound)));
    }
}

/// Roll each configured stat effect; describe only the changes that stuck.
/// Returns whether any stage actually moved.
fn apply_stat_effects(mv: &Move, ctx: &mut PerformCtx<'_>) -> bool {
    let mut any = false;
    for effect in &mv.stat_effects {
        if effect.chance < 1.0 && !ctx.rng.chance(effect.chance) {
            continue;
        }
        let name = match effect.target {
            EffectTarget::User => ctx.user_name(),
            EffectTarget::Target => ctx.target_name(),
        };
        let who = match effect.target {
            EffectTarget::User => &mut *ctx.user,
            EffectTarget::Target => &mut *ctx.target,
        };
        let actual = who.apply_stage_delta(effect.stat, effect.delta, ctx.config);
        if actual == 0 {
            continue;
        }
        any = true;
        let key = if actual > 0 {
            MessageKey::StatRose {
                target: name,
                stat: effect.stat,
                sharply: actual >= 2,
            }
        } else {
            MessageKey::StatFell {
                target: name,
                stat: effect.stat,
                sharply: actual <= -2,
            }
        };
        ctx.push_text(key);
    }
    any
}

// ============================================================================
// Non-damaging variants
// ============================================================================

fn perform_heal(mv: &Move, ctx: &mut PerformCtx<'_>, fraction: f64) -> bool {
    if pay_energy(mv, ctx).is_none() {
        return false;
    }
    if ctx.user.has_full_health() {
        let user = ctx.user_name();
        ctx.push_text(MessageKey::FullHealth { user });
        return false;
    }
    let amount = (ctx.user.max_health as f64 * fraction).round() as i32;
    ctx.user.restore_health(amount);
    let user = ctx.user_name();
    ctx.push_page(
        MessageKey::Healed { user },
        |p| p.with_open(PageHook::Sound(SoundKey::Heal))
            .with_open(PageHook::RefreshDisplays),
    );
    true
}

fn perform_cure(mv: &Move, ctx: &mut PerformCtx<'_>) -> bool {
    if pay_energy(mv, ctx).is_none() {
        return false;
    }
    // Energy is spent either way; only the outcome differs.
    let had_status = !ctx.user.statuses.is_empty();
    ctx.user.reset_statuses();
    let user = ctx.user_name();
    if had_status {
        ctx.push_page(
            MessageKey::Cured { user },
            |p| p.with_open(PageHook::Sound(SoundKey::Heal)),
        );
    } else {
        ctx.push_text(MessageKey::NothingToCure { user });
    }
    had_status
}

fn perform_stat_change(mv: &Move, ctx: &mut PerformCtx<'_>) -> bool {
    if pay_energy(mv, ctx).is_none() {
        return false;
    }
    if !accuracy_check(mv, ctx, false) {
        return false;
    }
    let targets_opponent = mv
        .stat_effects
        .iter()
        .any(|e| e.target == EffectTarget::Target);
    if targets_opponent && !ctx.target.vulnerable {
        let target = ctx.target_name();
        ctx.push_page(
            MessageKey::Blocked { target },
            |p| p.with_open(PageHook::Sound(SoundKey::Shield)),
        );
        return false;
    }
    let any = apply_stat_effects(mv, ctx);
    if !any {
        ctx.push_text(MessageKey::Failed);
    }
    any
}

fn perform_stat_clear(mv: &Move, ctx: &mut PerformCtx<'_>) -> bool {
    if pay_energy(mv, ctx).is_none() {
        return false;
    }
    if !accuracy_check(mv, ctx, false) {
        return false;
    }
    let had_any = ctx.user.has_any_stat_modifier() || ctx.target.has_any_stat_modifier();
    ctx.user.reset_stat_modifiers();
    ctx.target.reset_stat_modifiers();
    if had_any {
        ctx.push_text(MessageKey::StatsCleared);
    } else {
        ctx.push_text(MessageKey::Failed);
    }
    had_any
}

fn perform_shield(mv: &Move, ctx: &mut PerformCtx<'_>) -> bool {
    if pay_energy(mv, ctx).is_none() {
        return false;
    }
    // The shield's own success draw uses the raw accuracy field and
    // ignores accuracy stage modifiers.
    if ctx.rng.chance(mv.accuracy) {
        ctx.user.vulnerable = false;
        let user = ctx.user_name();
        ctx.push_page(
            MessageKey::ShieldRaised { user },
            |p| p.with_open(PageHook::Sound(SoundKey::Shield)),
        );
        true
    } else {
        ctx.push_text(MessageKey::Failed);
        false
    }
}

fn perform_run(mv: &Move, ctx: &mut PerformCtx<'_>) -> bool {
    if pay_energy(mv, ctx).is_none() {
        return false;
    }
    // Running is only meaningful for the controlled side; an opponent's
    // catalog should not carry it, but guard anyway.
    let escaped = ctx.user_side == Side::Player && ctx.rng.chance(mv.accuracy);
    if escaped {
        ctx.round.fled = true;
        ctx.push_page(MessageKey::FledSuccess, |p| {
            p.with_open(PageHook::Sound(SoundKey::Flee))
        });
        true
    } else {
        let user = ctx.user_name();
        ctx.push_text(MessageKey::FledFailure { user });
        false
    }
}

fn perform_charge(mv: &Move, ctx: &mut PerformCtx<'_>, fraction: f64) -> bool {
    // This move's own cost is zero, so the usual gate never bites; the
    // failure mode is a bar that is already full.
    debug_assert_eq!(mv.energy_cost, 0.0);
    if ctx.user.has_full_energy() {
        let user = ctx.user_name();
        ctx.push_text(MessageKey::FullEnergy { user });
        return false;
    }
    let amount = (ctx.user.max_energy as f64 * fraction).round() as i32;
    ctx.user.restore_energy(amount);
    let user = ctx.user_name();
    ctx.push_page(
        MessageKey::EnergyRestored { user },
        |p| p.with_open(PageHook::RefreshDisplays),
    );
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combatant::{CombatantId, CombatantSnapshot};
    use crate::core_data::Stat;
    use crate::messages::DefaultMessages;
    use crate::moves::{MoveCatalog, MoveId};
    use crate::rng::SequenceSource;

    fn combatant(id: u16) -> Combatant {
        Combatant::from_snapshot(&CombatantSnapshot {
            id: CombatantId(id),
            level: 5,
            max_health: 50,
            health: 50,
            attack: 10,
            defense: 5,
            speed: 10,
            max_energy: 20,
            energy: 20,
            moves: [None; 4],
        })
        .unwrap()
    }

    struct Fixture {
        user: Combatant,
        target: Combatant,
        round: RoundContext,
        config: RulesConfig,
        messages: DefaultMessages,
        catalog: MoveCatalog,
    }

    impl Fixture {
        fn new() -> Self {
            Self {
                user: combatant(1),
                target: combatant(2),
                round: RoundContext::new(0),
                config: RulesConfig::default(),
                messages: DefaultMessages::new(),
                catalog: MoveCatalog::new(),
            }
        }

        fn perform(&mut self, id: MoveId, rng: &mut dyn RandomSource) -> (bool, Vec<Page>) {
            let mv = self.catalog.generate(id);
            let mut out = Vec::new();
            let success = perform(
                &mv,
                &mut PerformCtx {
                    user: &mut self.user,
                    target: &mut self.target,
                    user_side: Side::Player,
                    round: &mut self.round,
                    config: &self.config,
                    rng,
                    messages: &self.messages,
                    out: &mut out,
                },
            );
            (success, out)
        }
    }

    #[test]
    fn test_attack_hits_and_spends_energy() {
        let mut f = Fixture::new();
        // accuracy pass, crit fail
        let mut rng = SequenceSource::new([0.0, 0.99], 0.99);
        let (success, out) = f.perform(MoveId::Slash, &mut rng);

        assert!(success);
        assert_eq!(f.user.energy, 17); // cost 0.15 of 20, rounded
        assert_eq!(f.target.health, 35); // 15 damage
        assert_eq!(out.len(), 1);
        assert!(out[0].text.contains("15 damage"));
    }

    #[test]
    fn test_miss_spends_energy_but_nothing_else() {
        let mut f = Fixture::new();
        // accuracy draw 0.96 >= 0.95 fails
        let mut rng = SequenceSource::new([0.96], 0.99);
        let (success, out) = f.perform(MoveId::Slash, &mut rng);

        assert!(!success);
        assert_eq!(f.user.energy, 17); // deducted before the check
        assert_eq!(f.target.health, 50);
        assert_eq!(out.len(), 1);
        assert!(out[0].text.contains("missed"));
    }

    #[test]
    fn test_no_energy_stops_before_deduction_side_effects() {
        let mut f = Fixture::new();
        f.user.energy = 1; // below 0.15 * 20 = 3
        let mut rng = SequenceSource::always_pass();
        let (success, out) = f.perform(MoveId::Slash, &mut rng);

        assert!(!success);
        assert_eq!(f.user.energy, 1);
        assert_eq!(f.target.health, 50);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_always_hits_ignores_random_source() {
        let mut f = Fixture::new();
        // Every draw fails any chance check; Warcry must still apply.
        let mut rng = SequenceSource::always_fail();
        let (success, out) = f.perform(MoveId::Warcry, &mut rng);

        assert!(success);
        // The guaranteed attack raise lands; the 50% speed raise fails.
        assert_eq!(f.user.stages.get(Stat::Attack), 1);
        assert_eq!(f.user.stages.get(Stat::Speed), 0);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_crit_applies_boost_and_flags_round() {
        let mut f = Fixture::new();
        // accuracy pass, crit pass
        let mut rng = SequenceSource::new([0.0, 0.0], 0.99);
        let (success, out) = f.perform(MoveId::Slash, &mut rng);

        assert!(success);
        assert!(f.round.crit_occurred);
        // 60 raw damage, clamped at zero health.
        assert_eq!(f.target.health, 0);
        assert!(out[0].text.contains("critical"));
    }

    #[test]
    fn test_recoil_floors_user_at_one_health() {
        let mut f = Fixture::new();
        f.user.health = 1;
        // accuracy pass, crit fail
        let mut rng = SequenceSource::new([0.0, 0.99], 0.99);
        let (success, out) = f.perform(MoveId::Bash, &mut rng);

        assert!(success);
        assert!(f.round.recoil_occurred);
        assert_eq!(f.user.health, 1);
        assert!(out.iter().any(|p| p.text.contains("recoil")));
    }

    #[test]
    fn test_burn_infliction_only_on_clean_target() {
        let mut f = Fixture::new();
        f.target.statuses.insert(StatusFlags::BURNED);
        let mut rng = SequenceSource::always_pass();
        let (_, out) = f.perform(MoveId::Scorch, &mut rng);

        // Already burned: no second infliction page.
        assert!(!out.iter().any(|p| p.text.contains("was burned")));
    }

    #[test]
    fn test_shield_blocks_attack() {
        let mut f = Fixture::new();
        f.target.vulnerable = false;
        f.target.selected = Some(f.catalog.generate(MoveId::Guard));
        let mut rng = SequenceSource::always_pass();
        let (success, out) = f.perform(MoveId::Slash, &mut rng);

        assert!(!success);
        assert_eq!(f.target.health, 50);
        assert!(out[0].text.contains("shield"));
    }

    #[test]
    fn test_shield_breaker_forces_through() {
        let mut f = Fixture::new();
        f.target.vulnerable = false;
        f.target.selected = Some(f.catalog.generate(MoveId::Guard));
        // No accuracy draw is consumed (forced); crit draw fails.
        let mut rng = SequenceSource::new([0.99], 0.99);
        let (success, _) = f.perform(MoveId::Shatter, &mut rng);

        assert!(success);
        assert!(f.target.health < 50);
    }

    #[test]
    fn test_drain_restores_fraction_of_dealt() {
        let mut f = Fixture::new();
        f.user.health = 20;
        // accuracy pass, crit fail
        let mut rng = SequenceSource::new([0.0, 0.99], 0.99);
        let (success, out) = f.perform(MoveId::Siphon, &mut rng);

        assert!(success);
        // power 25: round(10*3.75 - 5*5.0) = 13 dealt, 7 drained back
        assert_eq!(f.target.health, 37);
        assert_eq!(f.user.health, 27);
        assert!(out.iter().any(|p| p.text.contains("drained")));
    }

    #[test]
    fn test_heal_fails_at_full_health() {
        let mut f = Fixture::new();
        let mut rng = SequenceSource::always_pass();
        let (success, out) = f.perform(MoveId::Mend, &mut rng);

        assert!(!success);
        assert_eq!(out.len(), 1);
        // Energy was still spent.
        assert_eq!(f.user.energy, 14);
    }

    #[test]
    fn test_heal_restores_half_max() {
        let mut f = Fixture::new();
        f.user.health = 10;
        let mut rng = SequenceSource::always_pass();
        let (success, _) = f.perform(MoveId::Mend, &mut rng);

        assert!(success);
        assert_eq!(f.user.health, 35);
    }

    #[test]
    fn test_cure_reports_failure_with_nothing_to_clear() {
        let mut f = Fixture::new();
        let mut rng = SequenceSource::always_pass();
        let (success, _) = f.perform(MoveId::Cleanse, &mut rng);
        assert!(!success);
        assert_eq!(f.user.energy, 18); // cost paid regardless

        f.user.statuses.insert(StatusFlags::BURNED | StatusFlags::PARALYZED);
        let (success, _) = f.perform(MoveId::Cleanse, &mut rng);
        assert!(success);
        assert!(f.user.statuses.is_empty());
    }

    #[test]
    fn test_stat_change_fails_against_shielded_opponent() {
        let mut f = Fixture::new();
        f.target.vulnerable = false;
        let mut rng = SequenceSource::always_pass();
        let (success, _) = f.perform(MoveId::Menace, &mut rng);

        assert!(!success);
        assert_eq!(f.target.stages.get(Stat::Attack), 0);
    }

    #[test]
    fn test_stat_change_fails_when_capped() {
        let mut f = Fixture::new();
        f.target.stages.set(Stat::Attack, -6);
        let mut rng = SequenceSource::always_pass();
        let (success, out) = f.perform(MoveId::Menace, &mut rng);

        assert!(!success);
        assert!(out.iter().any(|p| p.text.contains("failed")));
    }

    #[test]
    fn test_stat_clear_wipes_both_sides() {
        let mut f = Fixture::new();
        f.user.stages.set(Stat::Attack, 2);
        f.target.stages.set(Stat::Defense, -1);
        let mut rng = SequenceSource::always_pass();
        let (success, _) = f.perform(MoveId::Purge, &mut rng);

        assert!(success);
        assert!(!f.user.has_any_stat_modifier());
        assert!(!f.target.has_any_stat_modifier());

        // Nothing left to clear: reported as failure.
        let (success, _) = f.perform(MoveId::Purge, &mut rng);
        assert!(!success);
    }

    #[test]
    fn test_shield_success_draw_ignores_accuracy_stages() {
        let mut f = Fixture::new();
        f.user.stages.set(Stat::Accuracy, -6);
        // Draw 0.7 < 0.75 raw: succeeds despite the accuracy stage.
        let mut rng = SequenceSource::new([0.7], 0.99);
        let (success, _) = f.perform(MoveId::Guard, &mut rng);

        assert!(success);
        assert!(!f.user.vulnerable);
    }

    #[test]
    fn test_run_success_sets_fled() {
        let mut f = Fixture::new();
        let mut rng = SequenceSource::new([0.2], 0.99);
        let (success, _) = f.perform(MoveId::Retreat, &mut rng);
        assert!(success);
        assert!(f.round.fled);
    }

    #[test]
    fn test_run_failure_is_just_a_page() {
        let mut f = Fixture::new();
        let mut rng = SequenceSource::new([0.9], 0.99);
        let (success, out) = f.perform(MoveId::Retreat, &mut rng);
        assert!(!success);
        assert!(!f.round.fled);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn test_charge_at_full_energy_fails_cleanly() {
        let mut f = Fixture::new();
        let mut rng = SequenceSource::always_pass();
        let (success, out) = f.perform(MoveId::Recharge, &mut rng);

        assert!(!success);
        assert_eq!(out.len(), 1);
        assert_eq!(f.user.energy, 20);
    }

    #[test]
    fn test_charge_restores_half_max() {
        let mut f = Fixture::new();
        f.user.energy = 2;
        let mut rng = SequenceSource::always_pass();
        let (success, _) = f.perform(MoveId::Recharge, &mut rng);

        assert!(success);
        assert_eq!(f.user.energy, 12);
    }
}
