//! Integration test to ensure a world can start up without errors.

use delve::{
    Command, DelveResult, EntityKind, GameCompletionState, InputHandler, Position,
    StairDirection, World, WorldConfig,
};

fn stairs_on(world: &World, depth: u32, direction: StairDirection) -> Vec<Position> {
    world
        .entities()
        .on_depth(depth)
        .filter(|e| e.stair_direction() == Some(direction))
        .map(|e| e.position)
        .collect()
}

#[test]
fn test_basic_startup() -> DelveResult<()> {
    for seed in [1, 42, 12345, 98765] {
        let world = World::new(WorldConfig::new(seed))?;
        let snapshot = world.snapshot()?;

        assert_eq!(snapshot.depth, 0);
        assert_eq!(snapshot.turn, 0);
        assert!(!snapshot.game_over);
        assert_eq!(snapshot.player.position, Position::new(1, 1));
        assert!(snapshot.level.is_walkable(snapshot.player.position));
        assert_eq!((snapshot.level.width, snapshot.level.height), (80, 40));

        assert_eq!(stairs_on(&world, 0, StairDirection::Up).len(), 1);
        let down = stairs_on(&world, 0, StairDirection::Down).len();
        assert!((1..=3).contains(&down), "seed {} placed {} stairs down", seed, down);
    }
    Ok(())
}

#[test]
fn test_spawns_sit_on_floor() -> DelveResult<()> {
    let world = World::new(WorldConfig::new(777))?;
    let level = world.current_level()?;
    for entity in world.entities().on_depth(0) {
        assert!(
            level.is_walkable(entity.position),
            "{} at {} is inside a wall",
            entity.name(),
            entity.position
        );
    }
    Ok(())
}

#[test]
fn test_same_seed_same_game() -> DelveResult<()> {
    let script = "llljjj.+..nnbb5-hhhkk";
    let commands = InputHandler::new().parse_script(script);

    let mut dumps = Vec::new();
    for _ in 0..2 {
        let mut world = World::new(WorldConfig::new(2024))?;
        for command in &commands {
            world.execute(*command)?;
        }
        dumps.push(serde_json::to_string(&world.snapshot()?)?);
    }
    assert_eq!(dumps[0], dumps[1]);
    Ok(())
}

#[test]
fn test_config_file_round_trip() -> DelveResult<()> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("world.json");
    let mut config = WorldConfig::new(31);
    config.width = 50;
    config.height = 30;
    config.generation.monster_chance = 0.0;
    std::fs::write(&path, serde_json::to_string(&config)?)?;

    let loaded = WorldConfig::from_json_file(&path)?;
    assert_eq!(loaded, config);

    let world = World::new(loaded)?;
    assert_eq!(world.current_level()?.width, 50);
    assert!(world.entities().iter().all(|e| !e.is_monster()));
    Ok(())
}

#[test]
fn test_hand_authored_top_level() -> DelveResult<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(
        dir.path().join("level001.txt"),
        "\
##########
#........#
#..<..$..#
#.......>#
##########
",
    )?;
    let mut config = WorldConfig::new(8);
    config.level_dir = Some(dir.path().to_path_buf());
    let mut world = World::new(config)?;

    assert_eq!(world.current_level()?.width, 10);
    assert_eq!(world.player()?.position, Position::new(3, 2));
    assert!(world
        .entities()
        .on_depth(0)
        .any(|e| e.kind == EntityKind::Shop));

    // Walk to the stair down and take it; level002.txt is missing so it is generated.
    for _ in 0..5 {
        world.execute(Command::Move { dx: 1, dy: 0 })?;
    }
    world.execute(Command::Move { dx: 0, dy: 1 })?;
    assert_eq!(world.player()?.position, Position::new(8, 3));
    let outcome = world.execute(Command::UseStairs)?;
    assert!(outcome.accepted);
    assert_eq!(world.current_depth()?, 1);
    assert_eq!(world.current_level()?.width, 80);
    assert_eq!(stairs_on(&world, 1, StairDirection::Up), vec![Position::new(8, 3)]);
    Ok(())
}

#[test]
fn test_broken_level_file_falls_back_to_generation() -> DelveResult<()> {
    let dir = tempfile::tempdir()?;
    std::fs::write(dir.path().join("level001.txt"), "\n\n")?;
    let mut config = WorldConfig::new(8);
    config.level_dir = Some(dir.path().to_path_buf());
    let world = World::new(config)?;

    assert_eq!(world.current_level()?.width, 80);
    assert_eq!(world.completion_state(), GameCompletionState::Playing);
    Ok(())
}
