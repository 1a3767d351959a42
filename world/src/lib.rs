#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative duel state management for Spell Duel.
//!
//! The [`World`] owns both duelists, their cooldowns, every airborne
//! projectile and the collision memo. It is mutated exclusively through
//! [`apply`], which validates each [`Command`] against the current state and
//! reports the resulting transitions as [`Event`] values. Read access goes
//! through the [`query`] module.

mod collisions;
mod cooldowns;
mod players;
mod projectiles;

use std::time::Duration;

use log::{debug, info, trace};
use spell_duel_core::{
    positions_touch, CastError, Command, DuelConfig, DuelStatus, Event, PlayerId, ProjectileId,
    Spell, SpellAction, WELCOME_BANNER,
};

use self::{
    collisions::{CollisionMemo, CollisionOutcome},
    cooldowns::CooldownTracker,
    players::Players,
    projectiles::ProjectileRegistry,
};

/// Represents the authoritative Spell Duel world state.
#[derive(Debug)]
pub struct World {
    banner: &'static str,
    config: DuelConfig,
    clock: Duration,
    tick_index: u64,
    players: Players,
    cooldowns: CooldownTracker,
    projectiles: ProjectileRegistry,
    collisions: CollisionMemo,
    status: DuelStatus,
}

impl World {
    /// Creates a new duel using the default rules.
    #[must_use]
    pub fn new() -> Self {
        Self::with_config(DuelConfig::default())
    }

    /// Creates a new duel using the provided rules.
    #[must_use]
    pub fn with_config(config: DuelConfig) -> Self {
        Self {
            banner: WELCOME_BANNER,
            players: Players::new(config.starting_hp, config.starting_mana),
            cooldowns: CooldownTracker::new(),
            projectiles: ProjectileRegistry::new(),
            collisions: CollisionMemo::new(),
            status: DuelStatus::InProgress,
            clock: Duration::ZERO,
            tick_index: 0,
            config,
        }
    }

    fn advance_clock(&mut self, now: Duration, out_events: &mut Vec<Event>) {
        let now = now.max(self.clock);
        let dt = now - self.clock;
        self.clock = now;
        self.tick_index = self.tick_index.saturating_add(1);
        trace!("tick {} reached {:?}", self.tick_index, now);
        out_events.push(Event::TimeAdvanced { dt, now });
        self.cooldowns.expire(now, out_events);
    }

    fn cast(&mut self, player: PlayerId, spell: Spell, at: Duration, out_events: &mut Vec<Event>) {
        let at = at.max(self.clock);
        if let Err(reason) = self.check_castable(player, spell, at) {
            debug!("{player} failed to cast {spell}: {reason}");
            out_events.push(Event::CastRejected {
                player,
                spell,
                reason,
            });
            return;
        }

        let _ = self
            .players
            .apply_mana_delta(player, -i64::from(spell.mana_cost()));
        out_events.push(Event::SpellCast { player, spell });
        debug!("{player} cast {spell} at {at:?}");

        match spell.action() {
            SpellAction::RestoreHp(amount) => {
                let delta = i32::try_from(amount).unwrap_or(i32::MAX);
                let _ = self.players.apply_hp_delta(player, delta);
            }
            SpellAction::RestoreMana(amount) => {
                let _ = self.players.apply_mana_delta(player, i64::from(amount));
            }
            SpellAction::LaunchProjectile => {
                let projectile = self.projectiles.launch(spell, player, at);
                out_events.push(Event::ProjectileLaunched {
                    projectile,
                    owner: player,
                    spell,
                    damage: spell.damage(),
                });
            }
            SpellAction::ActivateShield(duration) => {
                let expires_at = self.players.activate_shield(player, at, duration);
                out_events.push(Event::ShieldActivated { player, expires_at });
            }
        }

        self.cooldowns.start(player, spell, at);
    }

    fn check_castable(&self, player: PlayerId, spell: Spell, now: Duration) -> Result<(), CastError> {
        if self.status.is_over() {
            return Err(CastError::DuelOver);
        }
        if self.cooldowns.is_active(player, spell, now) {
            return Err(CastError::OnCooldown);
        }
        if spell.is_disabled(&self.players.snapshot(player)) {
            return Err(CastError::InsufficientResources);
        }
        Ok(())
    }

    fn regenerate_mana(&mut self, amount: u32, out_events: &mut Vec<Event>) {
        if amount == 0 {
            return;
        }
        for player in PlayerId::BOTH {
            let mana = self.players.apply_mana_delta(player, i64::from(amount));
            out_events.push(Event::ManaRegenerated { player, mana });
        }
    }

    fn resolve_collision(
        &mut self,
        first: ProjectileId,
        second: ProjectileId,
        out_events: &mut Vec<Event>,
    ) {
        if self.collisions.contains(first, second) {
            return;
        }

        let (Some(a), Some(b)) = (self.projectiles.get(first), self.projectiles.get(second)) else {
            return;
        };
        if a.owner == b.owner || a.is_inert() || b.is_inert() {
            return;
        }
        if !positions_touch(
            a.position(self.clock),
            b.position(self.clock),
            self.config.collision_tolerance,
        ) {
            return;
        }

        let outcome = collisions::resolve(a, b);
        let _ = self.collisions.record(first, second);

        match outcome {
            CollisionOutcome::MutualCancel {
                first_damage,
                second_damage,
            } => {
                self.set_damage(first, first_damage);
                self.set_damage(second, second_damage);
                debug!(
                    "projectiles {} and {} collided, damage now {first_damage}/{second_damage}",
                    first.get(),
                    second.get()
                );
                out_events.push(Event::ProjectilesCollided {
                    first,
                    second,
                    first_damage,
                    second_damage,
                });
            }
            CollisionOutcome::Amplified {
                amplifier,
                target,
                damage,
            } => {
                self.set_damage(target, damage);
                let _ = self.retire(amplifier);
                debug!(
                    "projectile {} amplified projectile {} to {damage}",
                    amplifier.get(),
                    target.get()
                );
                out_events.push(Event::ProjectileAmplified {
                    amplifier,
                    target,
                    damage,
                });
            }
        }
    }

    fn land(&mut self, id: ProjectileId, out_events: &mut Vec<Event>) {
        let Some(projectile) = self.projectiles.get(id) else {
            return;
        };
        if projectile.progress(self.clock) < 1.0 {
            return;
        }
        let Some(projectile) = self.retire(id) else {
            return;
        };

        let target = projectile.owner.opponent();
        if projectile.is_inert() {
            debug!("projectile {} fizzled", id.get());
            out_events.push(Event::ProjectileFizzled { projectile: id });
            return;
        }

        if self.players.is_shield_active(target, self.clock) {
            let reflected = self.projectiles.spawn(
                projectile.spell,
                target,
                projectile.damage,
                self.clock,
                projectile.travel_time,
            );
            debug!(
                "{target} reflected projectile {} as {}",
                id.get(),
                reflected.get()
            );
            out_events.push(Event::ProjectileReflected {
                original: id,
                reflected,
                owner: target,
                damage: projectile.damage,
            });
            return;
        }

        let delta = i32::try_from(projectile.damage).unwrap_or(i32::MAX);
        let hp = self.players.apply_hp_delta(target, -delta);
        debug!(
            "projectile {} hit {target} for {}, hp now {hp}",
            id.get(),
            projectile.damage
        );
        out_events.push(Event::ProjectileLanded {
            projectile: id,
            target,
            damage: projectile.damage,
            hp,
        });
    }

    fn evaluate_outcome(&mut self, out_events: &mut Vec<Event>) {
        let one_down = self.players.is_defeated(PlayerId::One);
        let two_down = self.players.is_defeated(PlayerId::Two);
        let status = match (one_down, two_down) {
            (false, false) => return,
            (true, true) => DuelStatus::Drawn,
            (true, false) => DuelStatus::Ended {
                winner: PlayerId::Two,
            },
            (false, true) => DuelStatus::Ended {
                winner: PlayerId::One,
            },
        };

        self.status = status;
        info!("duel finished at {:?}: {status:?}", self.clock);
        out_events.push(Event::DuelEnded { status });
    }

    fn set_damage(&mut self, id: ProjectileId, damage: u32) {
        if let Some(projectile) = self.projectiles.get_mut(id) {
            projectile.damage = damage;
        }
    }

    fn retire(&mut self, id: ProjectileId) -> Option<projectiles::Projectile> {
        let retired = self.projectiles.retire(id);
        if retired.is_some() {
            self.collisions.forget(id);
        }
        retired
    }
}

impl Default for World {
    fn default() -> Self {
        Self::new()
    }
}

/// Applies the provided command to the world, mutating state deterministically.
///
/// Once the duel has ended every command except casts is ignored; casts are
/// answered with [`CastError::DuelOver`].
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    if world.status.is_over() {
        if let Command::CastSpell { player, spell, .. } = command {
            out_events.push(Event::CastRejected {
                player,
                spell,
                reason: CastError::DuelOver,
            });
        }
        return;
    }

    match command {
        Command::Tick { now } => world.advance_clock(now, out_events),
        Command::CastSpell { player, spell, at } => world.cast(player, spell, at, out_events),
        Command::RegenerateMana { amount } => world.regenerate_mana(amount, out_events),
        Command::ResolveCollision { first, second } => {
            world.resolve_collision(first, second, out_events);
        }
        Command::LandProjectile { projectile } => world.land(projectile, out_events),
        Command::EvaluateOutcome => world.evaluate_outcome(out_events),
    }
}

/// Query functions that provide read-only access to the world state.
pub mod query {
    use std::time::Duration;

    use super::World;
    use spell_duel_core::{
        CooldownSnapshot, DuelConfig, DuelStatus, PlayerId, PlayerSnapshot, ProjectileId,
        ProjectileView, Spell,
    };

    /// Retrieves the welcome banner that adapters may display to players.
    #[must_use]
    pub fn welcome_banner(world: &World) -> &'static str {
        world.banner
    }

    /// Rules the duel was created with.
    #[must_use]
    pub fn config(world: &World) -> &DuelConfig {
        &world.config
    }

    /// Timestamp reached by the most recent tick.
    #[must_use]
    pub fn clock(world: &World) -> Duration {
        world.clock
    }

    /// Current lifecycle state of the duel.
    #[must_use]
    pub fn status(world: &World) -> DuelStatus {
        world.status
    }

    /// Captures the state of a single duelist.
    #[must_use]
    pub fn player(world: &World, player: PlayerId) -> PlayerSnapshot {
        world.players.snapshot(player)
    }

    /// Reports whether the duelist's shield reflects projectiles at `now`.
    #[must_use]
    pub fn shield_active(world: &World, player: PlayerId, now: Duration) -> bool {
        world.players.is_shield_active(player, now)
    }

    /// Reports whether the duelist could cast the spell at `now`.
    #[must_use]
    pub fn is_usable(world: &World, player: PlayerId, spell: Spell, now: Duration) -> bool {
        world.check_castable(player, spell, now).is_ok()
    }

    /// Captures the recharge state of a single spell.
    #[must_use]
    pub fn cooldown(world: &World, player: PlayerId, spell: Spell, now: Duration) -> CooldownSnapshot {
        world.cooldowns.snapshot(player, spell, now)
    }

    /// Recharge fraction in `[0, 1]` of a single spell.
    #[must_use]
    pub fn cooldown_fraction(world: &World, player: PlayerId, spell: Spell, now: Duration) -> f32 {
        cooldown(world, player, spell, now).recharge
    }

    /// Captures the recharge state of every spell in catalog order.
    #[must_use]
    pub fn recharge_fractions(world: &World, player: PlayerId, now: Duration) -> Vec<CooldownSnapshot> {
        Spell::ALL
            .into_iter()
            .map(|spell| cooldown(world, player, spell, now))
            .collect()
    }

    /// Captures a read-only view of the airborne projectiles, with progress at `now`.
    #[must_use]
    pub fn projectile_view(world: &World, now: Duration) -> ProjectileView {
        ProjectileView::from_snapshots(world.projectiles.snapshots(now))
    }

    /// Reports whether the pair of projectiles already collided.
    #[must_use]
    pub fn collision_resolved(world: &World, first: ProjectileId, second: ProjectileId) -> bool {
        world.collisions.contains(first, second)
    }
}
