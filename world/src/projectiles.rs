//! Registry of airborne projectiles and identifier allocation.

use std::{collections::BTreeMap, time::Duration};

use spell_duel_core::{flight_progress, PlayerId, ProjectileId, ProjectileSnapshot, Spell};

/// Projectile stored inside the world while it is in flight.
#[derive(Clone, Debug)]
pub(crate) struct Projectile {
    /// Identifier allocated by the registry.
    pub(crate) id: ProjectileId,
    /// Spell the projectile originates from.
    pub(crate) spell: Spell,
    /// Duelist owning the projectile.
    pub(crate) owner: PlayerId,
    /// Damage currently carried.
    pub(crate) damage: u32,
    /// Timestamp the projectile entered the board.
    pub(crate) cast_at: Duration,
    /// Time needed to cross the board.
    pub(crate) travel_time: Duration,
}

impl Projectile {
    pub(crate) fn progress(&self, now: Duration) -> f32 {
        flight_progress(self.cast_at, self.travel_time, now)
    }

    /// Position measured from player one's edge of the board.
    pub(crate) fn position(&self, now: Duration) -> f32 {
        let progress = self.progress(now);
        match self.owner {
            PlayerId::One => progress,
            PlayerId::Two => 1.0 - progress,
        }
    }

    pub(crate) fn is_inert(&self) -> bool {
        self.damage == 0
    }

    fn snapshot(&self, now: Duration) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: self.id,
            spell: self.spell,
            owner: self.owner,
            damage: self.damage,
            cast_at: self.cast_at,
            travel_time: self.travel_time,
            progress: self.progress(now),
        }
    }
}

/// Registry that stores airborne projectiles and manages identifier allocation.
///
/// Only flying projectiles are stored; a projectile leaves the registry in the
/// same step that resolves it.
#[derive(Debug)]
pub(crate) struct ProjectileRegistry {
    entries: BTreeMap<ProjectileId, Projectile>,
    next_projectile_id: ProjectileId,
}

impl ProjectileRegistry {
    /// Creates an empty registry with a reset identifier counter.
    pub(crate) fn new() -> Self {
        Self {
            entries: BTreeMap::new(),
            next_projectile_id: ProjectileId::new(0),
        }
    }

    /// Registers a projectile launched by `owner` casting `spell` at `cast_at`.
    pub(crate) fn launch(&mut self, spell: Spell, owner: PlayerId, cast_at: Duration) -> ProjectileId {
        self.spawn(spell, owner, spell.damage(), cast_at, spell.travel_time())
    }

    /// Registers a projectile with explicit damage and travel time.
    pub(crate) fn spawn(
        &mut self,
        spell: Spell,
        owner: PlayerId,
        damage: u32,
        cast_at: Duration,
        travel_time: Duration,
    ) -> ProjectileId {
        let id = self.allocate_id();
        let _ = self.entries.insert(
            id,
            Projectile {
                id,
                spell,
                owner,
                damage,
                cast_at,
                travel_time,
            },
        );
        id
    }

    pub(crate) fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.entries.get(&id)
    }

    pub(crate) fn get_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.entries.get_mut(&id)
    }

    /// Removes the projectile from the board, returning its final state.
    pub(crate) fn retire(&mut self, id: ProjectileId) -> Option<Projectile> {
        self.entries.remove(&id)
    }

    pub(crate) fn snapshots(&self, now: Duration) -> Vec<ProjectileSnapshot> {
        self.entries
            .values()
            .map(|projectile| projectile.snapshot(now))
            .collect()
    }

    fn allocate_id(&mut self) -> ProjectileId {
        let id = self.next_projectile_id;
        self.next_projectile_id = ProjectileId::new(id.get().saturating_add(1));
        id
    }
}
