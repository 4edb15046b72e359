//! Integration tests for stair placement and travel between depths.

use delve::{
    Command, DelveResult, GeneratedLevel, GenerationConfig, Level, LevelRequest, LevelSource,
    Position, RoomCorridorGenerator, StairDirection, World, WorldConfig,
};
use rand::{rngs::StdRng, SeedableRng};
use std::collections::{BTreeSet, VecDeque};

/// Every walkable tile reachable from `start` with 8-way steps.
fn reachable_from(level: &Level, start: Position) -> BTreeSet<Position> {
    let mut seen = BTreeSet::new();
    let mut queue = VecDeque::new();
    if level.is_walkable(start) {
        seen.insert(start);
        queue.push_back(start);
    }
    while let Some(pos) = queue.pop_front() {
        for next in pos.adjacent_positions() {
            if level.is_walkable(next) && seen.insert(next) {
                queue.push_back(next);
            }
        }
    }
    seen
}

/// Builds `count` stacked levels the way the world does when descending.
fn build_stack(seed: u64, count: u32) -> DelveResult<Vec<GeneratedLevel>> {
    let generator = RoomCorridorGenerator::new(GenerationConfig::default());
    let mut rng = StdRng::seed_from_u64(seed);
    let mut stack: Vec<GeneratedLevel> = Vec::new();
    for depth in 0..count {
        let entry = match stack.last() {
            Some(previous) => previous.stairs(StairDirection::Down)[0],
            None => Position::new(1, 1),
        };
        let mut request = LevelRequest::new(depth, 80, 40, entry);
        if let Some(previous) = stack.last() {
            request.prev_stairs_down = previous.stairs(StairDirection::Down);
        }
        stack.push(generator.build(&request, &mut rng)?);
    }
    Ok(stack)
}

#[test]
fn test_stairs_align_between_depths() -> DelveResult<()> {
    for seed in [3, 54321, 98765] {
        let stack = build_stack(seed, 6)?;
        for pair in stack.windows(2) {
            let down: BTreeSet<Position> =
                pair[0].stairs(StairDirection::Down).into_iter().collect();
            let up: BTreeSet<Position> = pair[1].stairs(StairDirection::Up).into_iter().collect();
            assert_eq!(down, up, "seed {} depth {}", seed, pair[1].level.depth);
            for pos in &up {
                assert!(pair[1].level.is_walkable(*pos));
            }
        }
    }
    Ok(())
}

#[test]
fn test_everything_is_reachable() -> DelveResult<()> {
    let stack = build_stack(777, 5)?;
    for generated in &stack {
        let start = generated
            .stairs(StairDirection::Up)
            .first()
            .copied()
            .unwrap_or(Position::new(1, 1));
        let reachable = reachable_from(&generated.level, start);
        for spawn in &generated.spawns {
            assert!(
                reachable.contains(&spawn.position),
                "depth {}: {:?} at {} is cut off",
                generated.level.depth,
                spawn.kind,
                spawn.position
            );
        }
    }
    Ok(())
}

#[test]
fn test_rooms_never_overlap() -> DelveResult<()> {
    let stack = build_stack(4242, 8)?;
    for generated in &stack {
        assert!(!generated.rooms.is_empty());
        for (i, a) in generated.rooms.iter().enumerate() {
            for b in &generated.rooms[i + 1..] {
                assert!(!a.intersects(b), "{:?} overlaps {:?}", a, b);
            }
        }
    }
    Ok(())
}

#[test]
fn test_descend_and_return() -> DelveResult<()> {
    let mut config = WorldConfig::new(98765);
    config.generation.monster_chance = 0.0;
    let mut world = World::new(config)?;

    let down = world
        .entities()
        .on_depth(0)
        .find(|e| e.stair_direction() == Some(StairDirection::Down))
        .map(|e| e.position)
        .expect("level 0 should have a stair down");
    let player_id = world.player_id();
    world
        .entities_mut()
        .get_mut(player_id)
        .expect("player exists")
        .position = down;

    let outcome = world.execute(Command::UseStairs)?;
    assert!(outcome.accepted);
    assert_eq!(world.current_depth()?, 1);
    assert_eq!(world.level_count(), 2);
    assert_eq!(world.player()?.position, down, "stairs should be aligned");
    assert!(world
        .entities()
        .at(down, 1)
        .any(|e| e.stair_direction() == Some(StairDirection::Up)));

    let outcome = world.execute(Command::UseStairs)?;
    assert!(outcome.accepted);
    assert_eq!(world.current_depth()?, 0);
    assert_eq!(world.player()?.position, down);
    assert_eq!(world.level_count(), 2, "levels are kept, not rebuilt");
    assert_eq!(world.statistics().max_depth_reached, 1);
    Ok(())
}

#[test]
fn test_leaving_through_the_top() -> DelveResult<()> {
    let mut world = World::new(WorldConfig::new(11))?;
    let up = world
        .entities()
        .on_depth(0)
        .find(|e| e.stair_direction() == Some(StairDirection::Up))
        .map(|e| e.position)
        .expect("level 0 should have a stair up");
    let player_id = world.player_id();
    world
        .entities_mut()
        .get_mut(player_id)
        .expect("player exists")
        .position = up;

    let outcome = world.execute(Command::UseStairs)?;
    assert!(outcome.accepted);
    assert!(world.is_game_over());
    assert!(outcome.messages.iter().any(|m| m.contains("Good Bye")));
    Ok(())
}
