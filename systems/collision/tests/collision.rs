use std::time::Duration;

use spell_duel_core::{Command, DuelConfig, Event, PlayerId, Spell};
use spell_duel_system_collision::CollisionDetection;
use spell_duel_world::{self as world, query, World};

fn world_with_fireballs() -> World {
    world_with_opposing(Spell::Fireball)
}

fn world_with_opposing(spell: Spell) -> World {
    let mut world = World::with_config(DuelConfig {
        starting_mana: spell.mana_cost(),
        ..DuelConfig::default()
    });
    let mut events = Vec::new();
    for player in PlayerId::BOTH {
        world::apply(
            &mut world,
            Command::CastSpell {
                player,
                spell,
                at: Duration::ZERO,
            },
            &mut events,
        );
    }
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::ProjectileLaunched { .. }))
            .count(),
        2
    );
    world
}

fn detect(world: &World, detection: &mut CollisionDetection, now: Duration) -> Vec<Command> {
    let view = query::projectile_view(world, now);
    let mut commands = Vec::new();
    detection.handle(
        query::status(world),
        &view,
        |first, second| query::collision_resolved(world, first, second),
        &mut commands,
    );
    commands
}

#[test]
fn opposing_fireballs_meet_at_midpoint() {
    let mut world = world_with_fireballs();
    let mut detection = CollisionDetection::default();

    assert!(detect(&world, &mut detection, Duration::from_millis(500)).is_empty());

    let now = Duration::from_secs(1);
    let mut events = Vec::new();
    world::apply(&mut world, Command::Tick { now }, &mut events);

    let view = query::projectile_view(&world, now);
    let ours = view
        .owned_by(PlayerId::One)
        .next()
        .expect("player one projectile")
        .id;
    let theirs = view
        .owned_by(PlayerId::Two)
        .next()
        .expect("player two projectile")
        .id;

    let commands = detect(&world, &mut detection, now);
    assert_eq!(
        commands,
        vec![Command::ResolveCollision {
            first: ours,
            second: theirs,
        }]
    );

    events.clear();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert_eq!(
        events,
        vec![Event::ProjectilesCollided {
            first: ours,
            second: theirs,
            first_damage: 0,
            second_damage: 0,
        }]
    );
    assert!(query::collision_resolved(&world, ours, theirs));
}

#[test]
fn resolved_pairs_are_not_reported_again() {
    let mut world = world_with_opposing(Spell::BigFireBall);
    let mut detection = CollisionDetection::default();
    let mut events = Vec::new();

    let now = Duration::from_millis(1_450);
    world::apply(&mut world, Command::Tick { now }, &mut events);
    let first_pass = detect(&world, &mut detection, now);
    assert_eq!(first_pass.len(), 1);
    events.clear();
    for command in first_pass {
        world::apply(&mut world, command, &mut events);
    }
    assert!(matches!(
        events.as_slice(),
        [Event::ProjectilesCollided {
            first_damage: 1,
            second_damage: 1,
            ..
        }]
    ));

    let later = Duration::from_millis(1_550);
    world::apply(&mut world, Command::Tick { now: later }, &mut events);
    let view = query::projectile_view(&world, later);
    assert!(view.iter().all(|projectile| !projectile.is_inert()));
    assert!(detect(&world, &mut detection, later).is_empty());

    let (ours, theirs) = (
        view.owned_by(PlayerId::One).next().expect("player one projectile").id,
        view.owned_by(PlayerId::Two).next().expect("player two projectile").id,
    );
    events.clear();
    world::apply(
        &mut world,
        Command::ResolveCollision {
            first: ours,
            second: theirs,
        },
        &mut events,
    );
    assert!(events.is_empty());
}

#[test]
fn gap_equal_to_default_tolerance_collides() {
    let mut world = world_with_fireballs();
    let mut detection = CollisionDetection::default();
    let mut events = Vec::new();

    let now = Duration::from_millis(900);
    world::apply(&mut world, Command::Tick { now }, &mut events);
    let commands = detect(&world, &mut detection, now);
    assert_eq!(commands.len(), 1);

    events.clear();
    for command in commands {
        world::apply(&mut world, command, &mut events);
    }
    assert_eq!(
        events
            .iter()
            .filter(|event| matches!(event, Event::ProjectilesCollided { .. }))
            .count(),
        1
    );
}

#[test]
fn zero_tolerance_requires_exact_overlap() {
    let world = world_with_fireballs();
    let mut detection = CollisionDetection::new(0.0);

    assert!(detect(&world, &mut detection, Duration::from_millis(900)).is_empty());
    assert_eq!(detect(&world, &mut detection, Duration::from_secs(1)).len(), 1);
}
