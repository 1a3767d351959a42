#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Tick scheduler that drives a single Spell Duel.
//!
//! [`DuelSession`] owns the authoritative world and the pure systems. Casts
//! submitted between ticks are buffered and applied at the start of the next
//! [`DuelSession::tick`], player one's before player two's. Each tick then
//! advances the clock, regenerates mana, resolves collisions, lands arrived
//! projectiles and finally evaluates the win condition. Readers observe the
//! world only between ticks through the query methods.

use std::time::Duration;

use log::{debug, trace};
use spell_duel_core::{
    Command, CooldownSnapshot, DuelConfig, DuelStatus, Event, PlayerId, PlayerSnapshot,
    ProjectileView, Spell,
};
use spell_duel_system_collision::CollisionDetection;
use spell_duel_system_flight::Landing;
use spell_duel_system_mana_regen::{self as mana_regen, ManaRegeneration};
use spell_duel_world::{self as world, query, World};

#[derive(Clone, Copy, Debug)]
struct PendingCast {
    player: PlayerId,
    spell: Spell,
    at: Duration,
}

/// A running duel between two players.
#[derive(Debug)]
pub struct DuelSession {
    world: World,
    mana_regen: ManaRegeneration,
    collisions: CollisionDetection,
    landing: Landing,
    pending: Vec<PendingCast>,
    events: Vec<Event>,
}

impl DuelSession {
    /// Creates a new duel using the provided rules.
    #[must_use]
    pub fn new(config: DuelConfig) -> Self {
        Self {
            world: World::with_config(config),
            mana_regen: ManaRegeneration::new(mana_regen::Config::new(
                config.mana_regen_interval,
                config.mana_regen_amount,
            )),
            collisions: CollisionDetection::new(config.collision_tolerance),
            landing: Landing::new(),
            pending: Vec::new(),
            events: Vec::new(),
        }
    }

    /// Requests that `player` casts `spell` at `now`.
    ///
    /// The request is applied at the start of the next tick. Unusable spells and
    /// casts after the duel ended have no effect beyond a rejection event.
    pub fn cast(&mut self, player: PlayerId, spell: Spell, now: Duration) {
        self.pending.push(PendingCast {
            player,
            spell,
            at: now,
        });
    }

    /// Same as [`DuelSession::cast`], looking the spell up by name.
    ///
    /// Unknown names are ignored.
    pub fn cast_named(&mut self, player: PlayerId, spell: &str, now: Duration) {
        match Spell::from_name(spell) {
            Some(spell) => self.cast(player, spell, now),
            None => debug!("{player} requested unknown spell '{spell}'"),
        }
    }

    /// Advances the duel to `now`, returning the events produced by the tick.
    pub fn tick(&mut self, now: Duration) -> &[Event] {
        self.events.clear();
        self.apply_pending_casts();

        if query::status(&self.world).is_over() {
            return &self.events;
        }

        let mut tick_events = Vec::new();
        world::apply(&mut self.world, Command::Tick { now }, &mut tick_events);
        let now = query::clock(&self.world);

        let mut commands = Vec::new();
        self.mana_regen
            .handle(&tick_events, query::status(&self.world), &mut commands);
        self.events.append(&mut tick_events);
        self.apply_commands(commands);

        let mut commands = Vec::new();
        let view = query::projectile_view(&self.world, now);
        let world = &self.world;
        self.collisions.handle(
            query::status(world),
            &view,
            |first, second| query::collision_resolved(world, first, second),
            &mut commands,
        );
        self.apply_commands(commands);

        let mut commands = Vec::new();
        let view = query::projectile_view(&self.world, now);
        self.landing
            .handle(query::status(&self.world), &view, &mut commands);
        self.apply_commands(commands);

        self.apply_commands(vec![Command::EvaluateOutcome]);
        trace!("tick at {now:?} produced {} events", self.events.len());
        &self.events
    }

    /// Read-only access to the underlying world.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Timestamp reached by the most recent tick.
    #[must_use]
    pub fn now(&self) -> Duration {
        query::clock(&self.world)
    }

    /// Current state of a duelist.
    #[must_use]
    pub fn player_state(&self, player: PlayerId) -> PlayerSnapshot {
        query::player(&self.world, player)
    }

    /// Recharge fraction in `[0, 1]` of a duelist's spell.
    #[must_use]
    pub fn cooldown_fraction(&self, player: PlayerId, spell: Spell, now: Duration) -> f32 {
        query::cooldown_fraction(&self.world, player, spell, now)
    }

    /// Recharge state of every spell of a duelist.
    #[must_use]
    pub fn cooldowns(&self, player: PlayerId, now: Duration) -> Vec<CooldownSnapshot> {
        query::recharge_fractions(&self.world, player, now)
    }

    /// Reports whether a duelist could cast the spell at `now`.
    #[must_use]
    pub fn is_usable(&self, player: PlayerId, spell: Spell, now: Duration) -> bool {
        query::is_usable(&self.world, player, spell, now)
    }

    /// Same as [`DuelSession::is_usable`], looking the spell up by name.
    ///
    /// Unknown names are never usable.
    #[must_use]
    pub fn is_usable_named(&self, player: PlayerId, spell: &str, now: Duration) -> bool {
        Spell::from_name(spell).map_or(false, |spell| self.is_usable(player, spell, now))
    }

    /// Airborne projectiles with flight progress evaluated at `now`.
    #[must_use]
    pub fn projectiles(&self, now: Duration) -> ProjectileView {
        query::projectile_view(&self.world, now)
    }

    /// Reports whether the duelist's shield is up at `now`.
    #[must_use]
    pub fn shield_active(&self, player: PlayerId, now: Duration) -> bool {
        query::shield_active(&self.world, player, now)
    }

    /// Current lifecycle state of the duel.
    #[must_use]
    pub fn status(&self) -> DuelStatus {
        query::status(&self.world)
    }

    fn apply_pending_casts(&mut self) {
        if self.pending.is_empty() {
            return;
        }

        let mut pending = std::mem::take(&mut self.pending);
        pending.sort_by_key(|cast| cast.player);
        let commands = pending
            .into_iter()
            .map(|cast| Command::CastSpell {
                player: cast.player,
                spell: cast.spell,
                at: cast.at,
            })
            .collect();
        self.apply_commands(commands);
    }

    fn apply_commands(&mut self, commands: Vec<Command>) {
        for command in commands {
            world::apply(&mut self.world, command, &mut self.events);
        }
    }
}

impl Default for DuelSession {
    fn default() -> Self {
        Self::new(DuelConfig::default())
    }
}
