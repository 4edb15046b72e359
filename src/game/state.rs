//! # Game State Module
//!
//! The [`World`]: single owner of every level, every entity, the message log
//! and the random number stream.
//!
//! A front end drives the World exclusively through [`World::execute`] and
//! reads it through [`World::snapshot`]. Each accepted command runs to
//! completion, including the monsters' reply, before the next one is taken.

use crate::{
    clamp_between, config, fight, monster_step, recompute, settle_death, trace_arrow,
    ArrowFlight, Command, CommandOutcome, DelveError, DelveResult, Entity, EntityId, EntityKind,
    EntityRegistry, FightReport, GeneratedLevel, GenerationConfig, ItemKind, Level,
    LevelFileLoader, LevelRequest, LevelSource, MessageLog, PlayerData, Position,
    RoomCorridorGenerator, Spell, StairDirection, VisibilityMap,
};
use log::{debug, info, warn};
use rand::rngs::StdRng;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Settings a World is built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Seed of the World's random number stream
    pub seed: u64,
    /// Width of generated levels in tiles
    pub width: i32,
    /// Height of generated levels in tiles
    pub height: i32,
    /// Starting torch radius
    pub torch_radius: i32,
    /// Where the player starts on a generated top level
    pub player_start: Position,
    /// Directory holding hand-authored `levelNNN.txt` files
    pub level_dir: Option<PathBuf>,
    pub generation: GenerationConfig,
}

impl WorldConfig {
    /// Default settings with the given seed.
    pub fn new(seed: u64) -> Self {
        Self {
            seed,
            ..Self::default()
        }
    }

    /// Reads settings from a JSON file. Missing fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> DelveResult<Self> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            width: config::DEFAULT_DUNGEON_WIDTH,
            height: config::DEFAULT_DUNGEON_HEIGHT,
            torch_radius: config::DEFAULT_TORCH_RADIUS,
            player_start: Position::new(1, 1),
            level_dir: None,
            generation: GenerationConfig::default(),
        }
    }
}

/// Game completion state for handling endings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameCompletionState {
    /// Game is still in progress
    Playing,
    /// Player climbed out of the top level
    Escaped,
    /// Player died
    PlayerDied,
}

/// Game statistics tracking player progress.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStatistics {
    /// Number of monsters killed by the player
    pub enemies_defeated: u32,
    /// Number of items picked up
    pub items_collected: u32,
    /// Total damage dealt by the player
    pub damage_dealt: u64,
    /// Total damage taken by the player
    pub damage_taken: u64,
    /// Deepest level reached
    pub max_depth_reached: u32,
    /// Total steps taken
    pub steps_taken: u64,
}

/// Player figures a front end shows in its status bar.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlayerStats {
    pub id: EntityId,
    pub position: Position,
    pub depth: u32,
    pub hitpoints: i32,
    pub hitpoints_max: i32,
    pub gold: i32,
    pub scrolls: BTreeMap<Spell, u32>,
    pub kills: BTreeMap<String, u32>,
}

/// Read-only view of everything a renderer needs for one frame.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot<'a> {
    pub depth: u32,
    pub level: &'a Level,
    pub visibility: &'a VisibilityMap,
    /// Entities on the current depth, in id order
    pub entities: Vec<&'a Entity>,
    pub log: &'a [String],
    pub player: PlayerStats,
    pub turn: u64,
    pub torch_radius: i32,
    pub game_over: bool,
    pub completion_state: GameCompletionState,
    pub statistics: &'a GameStatistics,
}

/// The whole simulation.
#[derive(Debug, Clone)]
pub struct World {
    config: WorldConfig,
    levels: Vec<Level>,
    entities: EntityRegistry,
    player_id: EntityId,
    rng: StdRng,
    log: MessageLog,
    turn: u64,
    completion_state: GameCompletionState,
    torch_radius: i32,
    visibility: VisibilityMap,
    statistics: GameStatistics,
    generator: RoomCorridorGenerator,
    loader: Option<LevelFileLoader>,
}

impl World {
    /// Creates a World and its top level.
    ///
    /// The top level is read from `level001.txt` in the configured level
    /// directory when that file exists, and generated otherwise.
    ///
    /// # Examples
    ///
    /// ```
    /// use delve::{World, WorldConfig};
    ///
    /// let world = World::new(WorldConfig::new(7)).unwrap();
    /// let snapshot = world.snapshot().unwrap();
    /// assert_eq!(snapshot.depth, 0);
    /// assert!(snapshot.level.is_walkable(snapshot.player.position));
    /// ```
    pub fn new(config: WorldConfig) -> DelveResult<Self> {
        let mut world = Self::empty(config);
        let start = world.config.player_start;
        world.player_id = world
            .entities
            .spawn(EntityKind::new_player(), start, 0, &mut world.rng);

        let generated = world.build_level(LevelRequest::new(
            0,
            world.config.width,
            world.config.height,
            start,
        ))?;
        let hand_authored = generated.rooms.is_empty() && world.loader_has(0);
        world.install_level(generated)?;
        if hand_authored {
            world.place_player_at_entrance()?;
        }
        world.start()?;
        Ok(world)
    }

    /// Creates a World whose top level is given rather than built.
    ///
    /// Spawns of the level are added to the registry and the player starts at
    /// `player_start`. Deeper levels are still generated on demand.
    pub fn with_level(
        config: WorldConfig,
        generated: GeneratedLevel,
        player_start: Position,
    ) -> DelveResult<Self> {
        let mut world = Self::empty(config);
        world.player_id =
            world
                .entities
                .spawn(EntityKind::new_player(), player_start, 0, &mut world.rng);
        world.install_level(generated)?;
        world.start()?;
        Ok(world)
    }

    fn empty(config: WorldConfig) -> Self {
        let loader = config.level_dir.as_ref().map(LevelFileLoader::new);
        let torch_radius = clamp_between(
            config.torch_radius,
            config::MIN_TORCH_RADIUS,
            config::MAX_TORCH_RADIUS,
        );
        Self {
            rng: StdRng::seed_from_u64(config.seed),
            generator: RoomCorridorGenerator::new(config.generation.clone()),
            loader,
            levels: Vec::new(),
            entities: EntityRegistry::new(),
            player_id: 0,
            log: MessageLog::new(),
            turn: 0,
            completion_state: GameCompletionState::Playing,
            torch_radius,
            visibility: VisibilityMap::default(),
            statistics: GameStatistics::default(),
            config,
        }
    }

    fn start(&mut self) -> DelveResult<()> {
        self.log.push("Welcome to the first dungeon level (level 0)!");
        self.relocate_player_if_stranded()?;
        self.recompute_visibility()?;
        self.pickup_items()?;
        info!("world ready, seed {}", self.config.seed);
        Ok(())
    }

    // ------------------------------------------------------------------
    // Read access

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn player_id(&self) -> EntityId {
        self.player_id
    }

    pub fn player(&self) -> DelveResult<&Entity> {
        self.entities
            .get(self.player_id)
            .ok_or_else(|| DelveError::InvalidState("No player found".to_string()))
    }

    fn player_mut(&mut self) -> DelveResult<&mut Entity> {
        self.entities
            .get_mut(self.player_id)
            .ok_or_else(|| DelveError::InvalidState("No player found".to_string()))
    }

    fn player_data_mut(&mut self) -> DelveResult<&mut PlayerData> {
        self.player_mut()?
            .player_data_mut()
            .ok_or_else(|| DelveError::InvalidState("player entity has no player data".to_string()))
    }

    /// Depth the player is on.
    pub fn current_depth(&self) -> DelveResult<u32> {
        Ok(self.player()?.depth)
    }

    pub fn level(&self, depth: u32) -> Option<&Level> {
        self.levels.get(depth as usize)
    }

    /// Mutable access to a level, for scripted setups and tests.
    pub fn level_mut(&mut self, depth: u32) -> Option<&mut Level> {
        self.levels.get_mut(depth as usize)
    }

    pub fn current_level(&self) -> DelveResult<&Level> {
        let depth = self.current_depth()?;
        self.level(depth)
            .ok_or_else(|| DelveError::InvalidState(format!("No level at depth {}", depth)))
    }

    /// Number of levels built so far.
    pub fn level_count(&self) -> usize {
        self.levels.len()
    }

    pub fn entities(&self) -> &EntityRegistry {
        &self.entities
    }

    /// Mutable access to the registry, for scripted setups and tests.
    pub fn entities_mut(&mut self) -> &mut EntityRegistry {
        &mut self.entities
    }

    pub fn visibility(&self) -> &VisibilityMap {
        &self.visibility
    }

    pub fn log(&self) -> &MessageLog {
        &self.log
    }

    pub fn turn(&self) -> u64 {
        self.turn
    }

    pub fn torch_radius(&self) -> i32 {
        self.torch_radius
    }

    pub fn statistics(&self) -> &GameStatistics {
        &self.statistics
    }

    pub fn completion_state(&self) -> GameCompletionState {
        self.completion_state
    }

    pub fn is_game_over(&self) -> bool {
        self.completion_state != GameCompletionState::Playing
    }

    /// Builds the per-frame view of the current depth.
    pub fn snapshot(&self) -> DelveResult<Snapshot<'_>> {
        let player = self.player()?;
        let data = player
            .player_data()
            .ok_or_else(|| DelveError::InvalidState("player entity has no player data".to_string()))?;
        let level = self.current_level()?;

        Ok(Snapshot {
            depth: player.depth,
            level,
            visibility: &self.visibility,
            entities: self.entities.on_depth(player.depth).collect(),
            log: self.log.lines(),
            player: PlayerStats {
                id: player.id,
                position: player.position,
                depth: player.depth,
                hitpoints: player.hitpoints,
                hitpoints_max: data.hitpoints_max,
                gold: data.gold,
                scrolls: data.scrolls.clone(),
                kills: player
                    .combat
                    .as_ref()
                    .map(|c| c.kills.clone())
                    .unwrap_or_default(),
            },
            turn: self.turn,
            torch_radius: self.torch_radius,
            game_over: self.is_game_over(),
            completion_state: self.completion_state,
            statistics: &self.statistics,
        })
    }

    // ------------------------------------------------------------------
    // Commands

    /// Runs one player command and everything it sets off.
    ///
    /// Illegal commands are rejected with a log message and consume no turn.
    /// `Err` only signals a broken World, never a bad command.
    pub fn execute(&mut self, command: Command) -> DelveResult<CommandOutcome> {
        let mark = self.log.len();
        debug!("turn {}: {}", self.turn, command);

        if self.is_game_over() {
            self.log.push("The game is over");
            return Ok(CommandOutcome::rejected(self.log.since(mark).to_vec()));
        }

        let mut arrow = None;
        let accepted = match command {
            Command::Move { dx, dy } => self.move_player(dx, dy)?,
            Command::Wait => self.wait()?,
            Command::UseStairs => self.use_stairs()?,
            Command::Cast { spell, target } => self.cast(spell, target)?,
            Command::FireAt { target } => {
                arrow = self.fire_at(target)?;
                arrow.is_some()
            }
            Command::ChangeTorchRadius { delta } => self.change_torch_radius(delta)?,
        };

        Ok(CommandOutcome {
            accepted,
            messages: self.log.since(mark).to_vec(),
            arrow,
        })
    }

    fn move_player(&mut self, dx: i32, dy: i32) -> DelveResult<bool> {
        if !(-1..=1).contains(&dx) || !(-1..=1).contains(&dy) {
            warn!("move ({}, {}) is longer than one step, rejected", dx, dy);
            self.log.push("You can only move one tile at a time");
            return Ok(false);
        }
        if dx == 0 && dy == 0 {
            return self.wait();
        }
        let (from, depth) = {
            let player = self.player()?;
            (player.position, player.depth)
        };
        let to = from.offset(dx, dy);
        let blocked = match self.level(depth).and_then(|level| level.blocks_movement(to)) {
            Some(blocked) => blocked,
            None => {
                self.log.push("You can not leave the dungeon this way");
                return Ok(false);
            }
        };

        if let Some(monster) = self.entities.living_monster_at(to, depth).map(|m| m.id) {
            self.melee(self.player_id, monster)?;
        } else if blocked {
            self.player_mut()?.hitpoints -= 1;
            self.statistics.damage_taken += 1;
            self.log.push("Ouch! You bump into a wall (-1 hp)");
        } else {
            self.player_mut()?.position = to;
            self.statistics.steps_taken += 1;
        }

        self.recompute_visibility()?;
        self.pickup_items()?;
        self.check_player()?;
        self.new_turn()?;
        Ok(true)
    }

    fn wait(&mut self) -> DelveResult<bool> {
        let (position, depth) = {
            let player = self.player()?;
            (player.position, player.depth)
        };
        let at_shop = self
            .entities
            .at(position, depth)
            .any(|e| e.kind == EntityKind::Shop);

        let data = self.player_data_mut()?;
        if at_shop && data.gold > 0 {
            data.gold -= 1;
            self.player_mut()?.hitpoints += config::SHOP_HEAL_PER_GOLD;
            self.log.push(format!(
                "You pay 1 gold and feel refreshed (+{} hp)",
                config::SHOP_HEAL_PER_GOLD
            ));
        } else {
            self.log.push("You wait");
        }

        self.new_turn()?;
        Ok(true)
    }

    fn use_stairs(&mut self) -> DelveResult<bool> {
        let (position, depth) = {
            let player = self.player()?;
            (player.position, player.depth)
        };
        let stair = self
            .entities
            .at(position, depth)
            .find_map(Entity::stair_direction);

        let target_depth = match stair {
            None => {
                self.log.push("You must find a stair up to ascend or descend");
                return Ok(false);
            }
            Some(StairDirection::Up) if depth == 0 => {
                self.log
                    .push("You climb back to the surface and leave the dungeon. Good Bye!");
                self.completion_state = GameCompletionState::Escaped;
                info!("player escaped after {} turns", self.turn);
                return Ok(true);
            }
            Some(StairDirection::Up) => {
                self.log.push("climbing up one level....");
                depth - 1
            }
            Some(StairDirection::Down) => {
                self.log
                    .push("climbing down one level, deeper into the dungeon...");
                depth + 1
            }
        };

        if target_depth as usize >= self.levels.len() {
            self.log.push("please wait a bit, i must create this level...");
            self.descend_into_new_level(target_depth, position)?;
        }

        self.player_mut()?.depth = target_depth;
        self.statistics.max_depth_reached = self.statistics.max_depth_reached.max(target_depth);
        info!("player moved to depth {}", target_depth);

        self.relocate_player_if_stranded()?;
        self.recompute_visibility()?;
        self.pickup_items()?;
        self.new_turn()?;
        Ok(true)
    }

    fn cast(&mut self, spell: Spell, target: Option<Position>) -> DelveResult<bool> {
        let scrolls = self
            .player()?
            .player_data()
            .map(|data| data.scroll_count(spell))
            .unwrap_or(0);
        if scrolls == 0 {
            self.log
                .push(format!("You have currently no scroll of {}", spell));
            return Ok(false);
        }

        match spell {
            Spell::MagicMap => {
                let depth = self.current_depth()?;
                if let Some(level) = self.levels.get_mut(depth as usize) {
                    level.reveal_all();
                }
                self.log.push("The whole level reveals itself to you");
            }
            Spell::Blink => {
                let Some(target) = target else {
                    self.log
                        .push("You must select a target tile before casting blink");
                    return Ok(false);
                };
                if let Some(reason) = self.blink_obstacle(target)? {
                    self.log.push(reason);
                    return Ok(false);
                }
                self.player_mut()?.position = target;
                self.log.push(format!("You blink to {}", target));
                self.recompute_visibility()?;
                self.pickup_items()?;
            }
            other => {
                self.log
                    .push(format!("You do not know how to cast {} yet", other));
                return Ok(false);
            }
        }

        self.player_data_mut()?.use_scroll(spell);
        self.new_turn()?;
        Ok(true)
    }

    /// Why the player can not blink to `target`, if anything stands in the way.
    fn blink_obstacle(&self, target: Position) -> DelveResult<Option<&'static str>> {
        let depth = self.current_depth()?;
        let level = self.current_level()?;
        let Some(tile) = level.get_tile(target) else {
            return Ok(Some("You can not blink outside the dungeon"));
        };
        let reason = if !tile.explored {
            Some("You can not blink on a unexplored tile.")
        } else if tile.blocks_movement() {
            Some("You can not blink to this tile.")
        } else if !self.visibility.is_visible(target) {
            Some("You can not blink on a tile outside your field of view")
        } else if self.entities.living_monster_at(target, depth).is_some() {
            Some("You can not blink on top of a monster")
        } else {
            None
        };
        Ok(reason)
    }

    fn fire_at(&mut self, target: Position) -> DelveResult<Option<ArrowFlight>> {
        let (start, depth) = {
            let player = self.player()?;
            (player.position, player.depth)
        };
        if target == start {
            self.log
                .push("You must select a target tile other than your own before shooting");
            return Ok(None);
        }
        let on_level = self
            .level(depth)
            .map(|level| level.is_valid_position(target))
            .unwrap_or(false);
        if !on_level {
            warn!("arrow target {} lies outside depth {}", target, depth);
            self.log.push("You can not shoot outside the dungeon");
            return Ok(None);
        }

        let flight = {
            let level = self
                .level(depth)
                .ok_or_else(|| DelveError::InvalidState(format!("No level at depth {}", depth)))?;
            trace_arrow(level, &self.entities, start, target)
        };
        self.resolve_arrow(self.player_id, flight)?;
        self.check_player()?;
        self.new_turn()?;
        Ok(Some(flight))
    }

    fn change_torch_radius(&mut self, delta: i32) -> DelveResult<bool> {
        let wanted = self.torch_radius.saturating_add(delta);
        self.torch_radius =
            clamp_between(wanted, config::MIN_TORCH_RADIUS, config::MAX_TORCH_RADIUS);
        if self.torch_radius != wanted {
            self.log.push(format!(
                "Your torch can not burn any {}",
                if delta > 0 { "brighter" } else { "dimmer" }
            ));
        }
        self.log
            .push(format!("Torch radius is now {}", self.torch_radius));
        self.recompute_visibility()?;
        Ok(true)
    }

    // ------------------------------------------------------------------
    // Turn machinery

    /// Lets every monster on the player's depth act once.
    ///
    /// Shooters fire first, then each living monster moves or attacks. The
    /// list of monsters is taken before anyone acts, and every destination is
    /// checked against the occupancy at the moment of the move.
    pub fn new_turn(&mut self) -> DelveResult<()> {
        self.turn += 1;
        let (player_pos, depth) = {
            let player = self.player()?;
            (player.position, player.depth)
        };

        let shooters: Vec<(EntityId, Position)> = self
            .entities
            .on_depth(depth)
            .filter(|e| e.is_monster() && e.is_alive())
            .filter_map(|e| e.ai.map(|ai| (e, ai)))
            .filter(|(e, ai)| {
                ai.can_shoot
                    && self.visibility.is_visible(e.position)
                    && e.position.euclidean_distance(player_pos) < ai.shoot_range as f64
            })
            .map(|(e, _)| (e.id, e.position))
            .collect();
        for (shooter, origin) in shooters {
            if self.is_game_over() {
                break;
            }
            if !self.entities.contains(shooter) {
                continue;
            }
            let flight = {
                let level = self.level(depth).ok_or_else(|| {
                    DelveError::InvalidState(format!("No level at depth {}", depth))
                })?;
                trace_arrow(level, &self.entities, origin, player_pos)
            };
            self.resolve_arrow(shooter, flight)?;
            self.check_player()?;
        }

        for id in self.entities.living_monster_ids(depth) {
            if self.is_game_over() {
                break;
            }
            let step = {
                let Some(monster) = self.entities.get(id).filter(|m| m.is_alive()) else {
                    continue;
                };
                let Some(level) = self.levels.get(depth as usize) else {
                    continue;
                };
                let (dx, dy) = monster_step(monster, player_pos, level, &mut self.rng);
                (monster.position, monster.position.offset(dx, dy))
            };
            let (from, to) = step;
            if from == to {
                continue;
            }

            match self.entities.creature_at(to, depth).map(|c| (c.id, c.is_player())) {
                Some((_, true)) => self.melee(id, self.player_id)?,
                Some((other, false)) => {
                    debug!("monster {} blocked by {} at {}", id, other, to);
                }
                None => {
                    if let Some(monster) = self.entities.get_mut(id) {
                        monster.position = to;
                    }
                }
            }
        }

        self.recompute_visibility()
    }

    /// Resolves a melee fight and records its outcome.
    fn melee(&mut self, attacker: EntityId, defender: EntityId) -> DelveResult<()> {
        let report = fight(&mut self.entities, attacker, defender, &mut self.rng)?;
        self.record_fight(&report);
        self.check_player()
    }

    fn record_fight(&mut self, report: &FightReport) {
        for exchange in &report.exchanges {
            if exchange.attacker == self.player_id {
                self.statistics.damage_dealt += exchange.damage.max(0) as u64;
            } else if exchange.defender == self.player_id {
                self.statistics.damage_taken += exchange.damage.max(0) as u64;
            }
        }
        if report
            .exchanges
            .iter()
            .any(|e| e.attacker == self.player_id || e.defender == self.player_id)
        {
            self.statistics.enemies_defeated += report.slain.len() as u32;
        }
        for line in report.messages() {
            self.log.push(line);
        }
    }

    /// Applies an arrow hit and removes the victim if it died.
    fn resolve_arrow(&mut self, shooter: EntityId, flight: ArrowFlight) -> DelveResult<()> {
        let Some(victim) = flight.victim else {
            self.log.push("The arrow hits nothing");
            return Ok(());
        };
        let name = match self.entities.get_mut(victim) {
            Some(entity) => {
                entity.hitpoints -= config::ARROW_DAMAGE;
                entity.name()
            }
            None => return Ok(()),
        };
        self.log.push(format!(
            "an arrow hit the {} and makes {} damage!",
            name,
            config::ARROW_DAMAGE
        ));
        if shooter == self.player_id {
            self.statistics.damage_dealt += config::ARROW_DAMAGE as u64;
        } else if victim == self.player_id {
            self.statistics.damage_taken += config::ARROW_DAMAGE as u64;
        }

        let mut report = FightReport::default();
        settle_death(&mut self.entities, victim, shooter, &mut report);
        if shooter == self.player_id {
            self.statistics.enemies_defeated += report.slain.len() as u32;
        }
        for line in report.messages() {
            self.log.push(line);
        }
        Ok(())
    }

    /// Ends the game when the player has no hitpoints left.
    pub fn check_player(&mut self) -> DelveResult<()> {
        if self.player()?.hitpoints <= 0 && !self.is_game_over() {
            self.completion_state = GameCompletionState::PlayerDied;
            self.log.push("You die...");
            info!("player died on turn {}", self.turn);
        }
        Ok(())
    }

    /// Rebuilds the field of view and marks entities in sight explored.
    fn recompute_visibility(&mut self) -> DelveResult<()> {
        let (position, depth) = {
            let player = self.player()?;
            (player.position, player.depth)
        };
        let level = self
            .levels
            .get_mut(depth as usize)
            .ok_or_else(|| DelveError::InvalidState(format!("No level at depth {}", depth)))?;
        self.visibility = recompute(level, position, self.torch_radius);

        let visibility = &self.visibility;
        for entity in self.entities.iter_mut() {
            if entity.depth == depth && visibility.is_visible(entity.position) {
                entity.explored = true;
            }
        }
        Ok(())
    }

    /// Picks up gold and scrolls lying on the player's tile.
    fn pickup_items(&mut self) -> DelveResult<()> {
        let (position, depth) = {
            let player = self.player()?;
            (player.position, player.depth)
        };
        let items: Vec<(EntityId, ItemKind)> = self
            .entities
            .at(position, depth)
            .filter_map(|e| match e.kind {
                EntityKind::Item(item) => Some((e.id, item)),
                _ => None,
            })
            .collect();

        for (id, item) in items {
            self.entities.remove(id);
            self.statistics.items_collected += 1;
            let data = self.player_data_mut()?;
            let message = match item {
                ItemKind::Gold { value } => {
                    data.gold += value;
                    format!("You found {} gold!", value)
                }
                ItemKind::Scroll { spell } => {
                    *data.scrolls.entry(spell).or_insert(0) += 1;
                    format!("you found a scroll of {}", spell)
                }
            };
            self.log.push(message);
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Level management

    fn loader_has(&self, depth: u32) -> bool {
        self.loader
            .as_ref()
            .map(|loader| loader.has_level(depth))
            .unwrap_or(false)
    }

    /// Builds a level from its file if there is one, falling back to generation.
    fn build_level(&mut self, request: LevelRequest) -> DelveResult<GeneratedLevel> {
        if let Some(loader) = self.loader.as_ref().filter(|l| l.has_level(request.depth)) {
            match loader.build(&request, &mut self.rng) {
                Ok(generated) => return Ok(generated),
                Err(err) => warn!(
                    "{} failed for depth {} ({}), generating instead",
                    loader.source_type(),
                    request.depth,
                    err
                ),
            }
        }
        self.generator.build(&request, &mut self.rng)
    }

    fn descend_into_new_level(&mut self, depth: u32, entry: Position) -> DelveResult<()> {
        let prev_stairs_down: Vec<Position> = self
            .entities
            .on_depth(depth.saturating_sub(1))
            .filter(|e| e.stair_direction() == Some(StairDirection::Down))
            .map(|e| e.position)
            .collect();
        let mut request = LevelRequest::new(depth, self.config.width, self.config.height, entry);
        request.prev_stairs_down = prev_stairs_down;
        request.occupied = self.entities.on_depth(depth).map(|e| e.position).collect();

        let generated = self.build_level(request)?;
        self.install_level(generated)
    }

    /// Stores a built level and spawns its entities.
    fn install_level(&mut self, generated: GeneratedLevel) -> DelveResult<()> {
        let depth = generated.level.depth;
        if depth as usize != self.levels.len() {
            return Err(DelveError::InvalidState(format!(
                "level for depth {} installed out of order",
                depth
            )));
        }
        for spawn in generated.spawns {
            self.entities
                .spawn(spawn.kind, spawn.position, depth, &mut self.rng);
        }
        self.levels.push(generated.level);
        Ok(())
    }

    fn first_stair_up(&self, depth: u32) -> Option<Position> {
        self.entities
            .on_depth(depth)
            .find(|e| e.stair_direction() == Some(StairDirection::Up))
            .map(|e| e.position)
    }

    /// Puts the player on the top level's stair up, or its first floor tile.
    fn place_player_at_entrance(&mut self) -> DelveResult<()> {
        let entrance = self
            .first_stair_up(0)
            .or_else(|| self.level(0).and_then(Level::first_floor));
        if let Some(pos) = entrance {
            self.player_mut()?.position = pos;
        }
        Ok(())
    }

    /// Moves the player off a tile they can not stand on.
    fn relocate_player_if_stranded(&mut self) -> DelveResult<()> {
        let (position, depth) = {
            let player = self.player()?;
            (player.position, player.depth)
        };
        let Some(level) = self.level(depth) else {
            return Ok(());
        };
        if level.is_walkable(position) {
            return Ok(());
        }
        let fallback = self
            .first_stair_up(depth)
            .or_else(|| level.first_floor());
        if let Some(pos) = fallback {
            debug!("player moved from {} to {} on arrival", position, pos);
            self.player_mut()?.position = pos;
        } else {
            warn!("depth {} has no floor for the player", depth);
        }
        Ok(())
    }
}
