//! Collision memo and resolution rules for opposing projectiles.

use std::collections::BTreeSet;

use spell_duel_core::{ProjectileId, Special};

use crate::projectiles::Projectile;

/// Records which unordered projectile pairs already collided.
#[derive(Debug, Default)]
pub(crate) struct CollisionMemo {
    resolved: BTreeSet<(ProjectileId, ProjectileId)>,
}

impl CollisionMemo {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn contains(&self, a: ProjectileId, b: ProjectileId) -> bool {
        self.resolved.contains(&pair_key(a, b))
    }

    /// Marks the pair as resolved. Returns `false` if it already was.
    pub(crate) fn record(&mut self, a: ProjectileId, b: ProjectileId) -> bool {
        self.resolved.insert(pair_key(a, b))
    }

    /// Drops every pair involving a retired projectile.
    ///
    /// Identifiers are never reused, so a forgotten pair can never match again.
    pub(crate) fn forget(&mut self, id: ProjectileId) {
        self.resolved.retain(|&(a, b)| a != id && b != id);
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.resolved.len()
    }
}

fn pair_key(a: ProjectileId, b: ProjectileId) -> (ProjectileId, ProjectileId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Result of two projectiles meeting mid-flight.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum CollisionOutcome {
    /// Both projectiles lost a point of damage.
    MutualCancel {
        first_damage: u32,
        second_damage: u32,
    },
    /// One side was an amplify projectile and buffed the other.
    Amplified {
        amplifier: ProjectileId,
        target: ProjectileId,
        damage: u32,
    },
}

/// Determines how two colliding projectiles affect each other.
///
/// Amplify behaviour applies only when exactly one side is an amplify
/// projectile; otherwise both sides lose one point of damage, floored at zero.
pub(crate) fn resolve(first: &Projectile, second: &Projectile) -> CollisionOutcome {
    let first_amplifies = first.spell.special() == Special::Amplify;
    let second_amplifies = second.spell.special() == Special::Amplify;

    match (first_amplifies, second_amplifies) {
        (true, false) => CollisionOutcome::Amplified {
            amplifier: first.id,
            target: second.id,
            damage: second.damage.saturating_add(first.damage),
        },
        (false, true) => CollisionOutcome::Amplified {
            amplifier: second.id,
            target: first.id,
            damage: first.damage.saturating_add(second.damage),
        },
        _ => CollisionOutcome::MutualCancel {
            first_damage: first.damage.saturating_sub(1),
            second_damage: second.damage.saturating_sub(1),
        },
    }
}
