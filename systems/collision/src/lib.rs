#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that detects opposing projectiles meeting mid-flight.
//!
//! Projectiles travel toward each other from opposite edges of the board, so a
//! player one projectile at progress `p` sits where a player two projectile at
//! progress `1 - p` sits. Every unresolved opposing pair whose positions
//! coincide within the configured tolerance yields a
//! [`Command::ResolveCollision`]. The world applies the collision rules and
//! keeps the memo that guarantees each pair resolves at most once.

use spell_duel_core::{
    positions_touch, Command, DuelStatus, PlayerId, ProjectileId, ProjectileSnapshot, ProjectileView,
    DEFAULT_COLLISION_TOLERANCE,
};

/// Collision detection system that queues resolution commands.
#[derive(Debug)]
pub struct CollisionDetection {
    tolerance: f32,
    scratch: Vec<Command>,
}

impl Default for CollisionDetection {
    fn default() -> Self {
        Self::new(DEFAULT_COLLISION_TOLERANCE)
    }
}

impl CollisionDetection {
    /// Creates a detector that treats positions within `tolerance` as touching.
    #[must_use]
    pub fn new(tolerance: f32) -> Self {
        Self {
            tolerance: tolerance.max(0.0),
            scratch: Vec::new(),
        }
    }

    /// Tolerance applied when comparing positions.
    #[must_use]
    pub fn tolerance(&self) -> f32 {
        self.tolerance
    }

    /// Emits `Command::ResolveCollision` entries for touching opposing pairs.
    ///
    /// `is_resolved` is consulted before any other check so that pairs that
    /// already collided are skipped. Pairs are visited in ascending identifier
    /// order, player one's projectile first.
    pub fn handle<F>(
        &mut self,
        status: DuelStatus,
        projectiles: &ProjectileView,
        is_resolved: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(ProjectileId, ProjectileId) -> bool,
    {
        if status.is_over() || projectiles.len() < 2 {
            return;
        }

        self.scratch.clear();

        for first in projectiles.owned_by(PlayerId::One) {
            for second in projectiles.owned_by(PlayerId::Two) {
                if is_resolved(first.id, second.id) {
                    continue;
                }
                if self.touching(first, second) {
                    self.scratch.push(Command::ResolveCollision {
                        first: first.id,
                        second: second.id,
                    });
                }
            }
        }

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }

    fn touching(&self, first: &ProjectileSnapshot, second: &ProjectileSnapshot) -> bool {
        if first.is_inert() || second.is_inert() {
            return false;
        }
        let forward = first.progress;
        let mirrored = 1.0 - second.progress;
        positions_touch(forward, mirrored, self.tolerance)
    }
}
