#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system that emits landing commands for projectiles that finished their flight.

use spell_duel_core::{Command, DuelStatus, ProjectileView};

/// Landing system that queues commands for arrived projectiles.
#[derive(Debug, Default)]
pub struct Landing {
    scratch: Vec<Command>,
}

impl Landing {
    /// Creates a new landing system with empty scratch buffers.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Emits `Command::LandProjectile` entries in ascending identifier order.
    pub fn handle(&mut self, status: DuelStatus, projectiles: &ProjectileView, out: &mut Vec<Command>) {
        if status.is_over() || projectiles.is_empty() {
            return;
        }

        self.scratch.clear();
        self.scratch.extend(
            projectiles
                .iter()
                .filter(|snapshot| snapshot.has_arrived())
                .map(|snapshot| Command::LandProjectile {
                    projectile: snapshot.id,
                }),
        );

        if self.scratch.is_empty() {
            return;
        }

        out.reserve(self.scratch.len());
        out.append(&mut self.scratch);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use spell_duel_core::{PlayerId, ProjectileId, ProjectileSnapshot, Spell};
    use std::time::Duration;

    #[test]
    fn only_arrived_projectiles_land() {
        let mut system = Landing::new();
        let view = ProjectileView::from_snapshots(vec![
            snapshot(7, 1.2),
            snapshot(3, 0.99),
            snapshot(1, 1.0),
        ]);
        let mut out = Vec::new();

        system.handle(DuelStatus::InProgress, &view, &mut out);

        assert_eq!(
            out,
            vec![
                Command::LandProjectile {
                    projectile: ProjectileId::new(1),
                },
                Command::LandProjectile {
                    projectile: ProjectileId::new(7),
                },
            ]
        );
    }

    #[test]
    fn ended_duel_is_silent() {
        let mut system = Landing::new();
        let view = ProjectileView::from_snapshots(vec![snapshot(0, 1.5)]);
        let mut out = Vec::new();

        system.handle(DuelStatus::Drawn, &view, &mut out);

        assert!(out.is_empty());
    }

    fn snapshot(id: u64, progress: f32) -> ProjectileSnapshot {
        ProjectileSnapshot {
            id: ProjectileId::new(id),
            spell: Spell::BigFireBall,
            owner: PlayerId::Two,
            damage: 2,
            cast_at: Duration::ZERO,
            travel_time: Duration::from_secs(3),
            progress,
        }
    }
}
