//! # Entities
//!
//! Every simulated object is an [`Entity`] tagged with an [`EntityKind`].
//! Species statistics and natural weapons are plain data tables; building an
//! entity copies the relevant row into the entity's own stats.

use crate::{DelveError, DelveResult, Dice, EntityId, Position};
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// RGB color hint for renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Color {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Color {
    pub const fn rgb(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// The fixed catalogue of natural weapons.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WeaponKind {
    Fist,
    Kick,
    YetiSnowBall,
    YetiSlap,
    SnakeBite,
    WolfBite,
    GolemArm,
    DragonBite,
    DragonClaw,
    DragonTail,
    FireBreath,
}

impl fmt::Display for WeaponKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Attack, defense and damage modifiers intrinsic to a species.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NaturalWeapon {
    pub kind: WeaponKind,
    pub damage_bonus: i32,
    pub attack_bonus: i32,
    pub defense_bonus: i32,
}

impl NaturalWeapon {
    /// Looks up a weapon in the catalogue.
    pub const fn of(kind: WeaponKind) -> Self {
        let (damage_bonus, attack_bonus, defense_bonus) = match kind {
            WeaponKind::Fist => (0, 0, 0),
            WeaponKind::Kick => (3, -2, 2),
            WeaponKind::YetiSnowBall => (1, 4, 1),
            WeaponKind::YetiSlap => (4, -1, 0),
            WeaponKind::SnakeBite => (1, 2, 2),
            WeaponKind::WolfBite => (1, 2, 2),
            WeaponKind::GolemArm => (2, 0, 0),
            WeaponKind::DragonBite => (9, -3, -3),
            WeaponKind::DragonClaw => (2, -1, -1),
            WeaponKind::DragonTail => (3, 0, 0),
            WeaponKind::FireBreath => (4, 3, -4),
        };
        Self {
            kind,
            damage_bonus,
            attack_bonus,
            defense_bonus,
        }
    }
}

/// Monster species known to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Species {
    Wolf,
    Snake,
    Yeti,
    Dragon,
}

/// One row of the species table.
#[derive(Debug, Clone, Copy)]
pub struct SpeciesStats {
    pub name: &'static str,
    pub glyph: char,
    pub color: Color,
    pub hitpoints: i32,
    pub attack: Dice,
    pub defense: Dice,
    pub damage: Dice,
    pub weapons: &'static [WeaponKind],
    pub aggro_radius: f64,
    pub stationary: bool,
    /// Inclusive range the shooting distance is drawn from, if the species shoots
    pub shoot_range: Option<(i32, i32)>,
}

const MONSTER_YELLOW: Color = Color::rgb(255, 255, 0);

const WOLF: SpeciesStats = SpeciesStats {
    name: "Wolf",
    glyph: 'W',
    color: MONSTER_YELLOW,
    hitpoints: 30,
    attack: Dice::new(2, 6),
    defense: Dice::new(2, 5),
    damage: Dice::new(2, 4),
    weapons: &[WeaponKind::WolfBite],
    aggro_radius: 5.0,
    stationary: false,
    shoot_range: None,
};

const SNAKE: SpeciesStats = SpeciesStats {
    name: "Snake",
    glyph: 'S',
    color: MONSTER_YELLOW,
    hitpoints: 20,
    attack: Dice::new(2, 4),
    defense: Dice::new(3, 3),
    damage: Dice::new(3, 4),
    weapons: &[WeaponKind::SnakeBite],
    aggro_radius: 2.0,
    stationary: false,
    shoot_range: None,
};

const YETI: SpeciesStats = SpeciesStats {
    name: "Yeti",
    glyph: 'Y',
    color: MONSTER_YELLOW,
    hitpoints: 20,
    attack: Dice::new(8, 2),
    defense: Dice::new(4, 3),
    damage: Dice::new(4, 5),
    weapons: &[WeaponKind::YetiSnowBall, WeaponKind::YetiSlap],
    aggro_radius: 4.0,
    stationary: false,
    shoot_range: None,
};

const DRAGON: SpeciesStats = SpeciesStats {
    name: "Dragon",
    glyph: 'D',
    color: MONSTER_YELLOW,
    hitpoints: 50,
    attack: Dice::new(6, 3),
    defense: Dice::new(6, 3),
    damage: Dice::new(5, 3),
    weapons: &[
        WeaponKind::DragonBite,
        WeaponKind::DragonClaw,
        WeaponKind::DragonTail,
        WeaponKind::FireBreath,
    ],
    aggro_radius: 6.0,
    stationary: true,
    shoot_range: Some((10, 15)),
};

impl Species {
    pub fn stats(self) -> &'static SpeciesStats {
        match self {
            Species::Wolf => &WOLF,
            Species::Snake => &SNAKE,
            Species::Yeti => &YETI,
            Species::Dragon => &DRAGON,
        }
    }

    pub fn name(self) -> &'static str {
        self.stats().name
    }
}

/// Base statistics of the player character.
pub mod player_template {
    use super::*;

    pub const HITPOINTS: i32 = 100;
    pub const GOLD: i32 = 100;
    pub const ATTACK: Dice = Dice::new(3, 6);
    pub const DEFENSE: Dice = Dice::new(3, 5);
    pub const DAMAGE: Dice = Dice::new(4, 5);
    pub const WEAPONS: &[WeaponKind] = &[WeaponKind::Fist, WeaponKind::Kick];
    pub const COLOR: Color = Color::rgb(0, 0, 255);
}

/// Spells that can be written on scrolls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Spell {
    Blink,
    Fear,
    Bleed,
    MagicMap,
    MagicMissile,
    Fireball,
}

impl Spell {
    pub const ALL: [Spell; 6] = [
        Spell::Blink,
        Spell::Fear,
        Spell::Bleed,
        Spell::MagicMap,
        Spell::MagicMissile,
        Spell::Fireball,
    ];

    /// How often each spell shows up on a freshly generated scroll.
    const WEIGHTS: [u32; 6] = [2, 2, 3, 6, 3, 3];

    pub fn name(self) -> &'static str {
        match self {
            Spell::Blink => "blink",
            Spell::Fear => "fear",
            Spell::Bleed => "bleed",
            Spell::MagicMap => "magic map",
            Spell::MagicMissile => "magic missile",
            Spell::Fireball => "fireball",
        }
    }

    /// Looks a spell up by its display name. Underscores count as spaces.
    pub fn from_name(name: &str) -> Option<Spell> {
        let wanted = name.trim().to_lowercase().replace('_', " ");
        Spell::ALL.into_iter().find(|spell| spell.name() == wanted)
    }

    /// Draws a spell from the scroll distribution.
    pub fn random<R: Rng + ?Sized>(rng: &mut R) -> Spell {
        match WeightedIndex::new(Self::WEIGHTS) {
            Ok(distribution) => Spell::ALL[distribution.sample(rng)],
            Err(_) => Spell::MagicMap,
        }
    }
}

impl fmt::Display for Spell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Things that can be picked up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ItemKind {
    Gold { value: i32 },
    Scroll { spell: Spell },
}

impl ItemKind {
    /// A gold pile worth 1 to 100.
    pub fn random_gold<R: Rng + ?Sized>(rng: &mut R) -> Self {
        ItemKind::Gold {
            value: rng.gen_range(1..=100),
        }
    }

    pub fn random_scroll<R: Rng + ?Sized>(rng: &mut R) -> Self {
        ItemKind::Scroll {
            spell: Spell::random(rng),
        }
    }
}

/// Which way a stair leads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StairDirection {
    Up,
    Down,
}

/// Player-only state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerData {
    pub hitpoints_max: i32,
    pub gold: i32,
    /// Scroll count per spell
    pub scrolls: BTreeMap<Spell, u32>,
}

impl PlayerData {
    pub fn scroll_count(&self, spell: Spell) -> u32 {
        self.scrolls.get(&spell).copied().unwrap_or(0)
    }

    /// Removes one scroll of `spell`. Returns false if none was left.
    pub fn use_scroll(&mut self, spell: Spell) -> bool {
        match self.scrolls.get_mut(&spell) {
            Some(count) if *count > 0 => {
                *count -= 1;
                true
            }
            _ => false,
        }
    }
}

/// The tag that decides what an entity is.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum EntityKind {
    Player(PlayerData),
    Monster(Species),
    Item(ItemKind),
    Stair(StairDirection),
    Shop,
}

impl EntityKind {
    /// A fresh player with the template's gold and no scrolls.
    pub fn new_player() -> Self {
        EntityKind::Player(PlayerData {
            hitpoints_max: player_template::HITPOINTS,
            gold: player_template::GOLD,
            scrolls: BTreeMap::new(),
        })
    }
}

/// Dice and weapons of anything that can fight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombatStats {
    pub attack: Dice,
    pub defense: Dice,
    pub damage: Dice,
    weapons: Vec<NaturalWeapon>,
    /// Kills credited to this combatant, by victim name
    pub kills: BTreeMap<String, u32>,
}

impl CombatStats {
    /// Creates combat stats. The weapon list must not be empty.
    pub fn new(
        attack: Dice,
        defense: Dice,
        damage: Dice,
        weapons: Vec<NaturalWeapon>,
    ) -> DelveResult<Self> {
        if weapons.is_empty() {
            return Err(DelveError::InvalidState(
                "a combatant needs at least one natural weapon".to_string(),
            ));
        }
        Ok(Self {
            attack,
            defense,
            damage,
            weapons,
            kills: BTreeMap::new(),
        })
    }

    fn from_table(attack: Dice, defense: Dice, damage: Dice, weapons: &[WeaponKind]) -> Self {
        Self {
            attack,
            defense,
            damage,
            weapons: weapons.iter().copied().map(NaturalWeapon::of).collect(),
            kills: BTreeMap::new(),
        }
    }

    pub fn weapons(&self) -> &[NaturalWeapon] {
        &self.weapons
    }

    pub fn record_kill(&mut self, victim: &str) {
        *self.kills.entry(victim.to_string()).or_insert(0) += 1;
    }
}

/// Movement and targeting parameters for monsters.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AiStats {
    pub aggro_radius: f64,
    pub stationary: bool,
    pub can_shoot: bool,
    pub shoot_range: i32,
}

/// A simulated object: the player, a monster, an item, a stair or a shop.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entity {
    pub id: EntityId,
    pub position: Position,
    pub depth: u32,
    pub kind: EntityKind,
    pub hitpoints: i32,
    pub color: Color,
    pub combat: Option<CombatStats>,
    pub ai: Option<AiStats>,
    pub explored: bool,
    pub stays_visible_once_explored: bool,
}

impl Entity {
    /// Builds an entity of the given kind with its table defaults.
    ///
    /// The random generator is only consulted for per-individual values such
    /// as a dragon's shooting range.
    pub fn build<R: Rng + ?Sized>(
        id: EntityId,
        kind: EntityKind,
        position: Position,
        depth: u32,
        rng: &mut R,
    ) -> Self {
        let mut hitpoints = 1;
        let mut color = Color::rgb(255, 165, 0);
        let mut combat = None;
        let mut ai = None;
        let mut stays_visible_once_explored = false;

        match &kind {
            EntityKind::Player(data) => {
                hitpoints = data.hitpoints_max;
                color = player_template::COLOR;
                combat = Some(CombatStats::from_table(
                    player_template::ATTACK,
                    player_template::DEFENSE,
                    player_template::DAMAGE,
                    player_template::WEAPONS,
                ));
            }
            EntityKind::Monster(species) => {
                let stats = species.stats();
                hitpoints = stats.hitpoints;
                color = stats.color;
                combat = Some(CombatStats::from_table(
                    stats.attack,
                    stats.defense,
                    stats.damage,
                    stats.weapons,
                ));
                ai = Some(AiStats {
                    aggro_radius: stats.aggro_radius,
                    stationary: stats.stationary,
                    can_shoot: stats.shoot_range.is_some(),
                    shoot_range: stats
                        .shoot_range
                        .map(|(low, high)| rng.gen_range(low..=high))
                        .unwrap_or(0),
                });
            }
            EntityKind::Item(_) => {
                color = Color::rgb(200, 200, 0);
            }
            EntityKind::Stair(_) => {
                color = Color::rgb(128, 0, 128);
                stays_visible_once_explored = true;
            }
            EntityKind::Shop => {
                color = Color::rgb(200, 200, 0);
                stays_visible_once_explored = true;
            }
        }

        Self {
            id,
            position,
            depth,
            kind,
            hitpoints,
            color,
            combat,
            ai,
            explored: false,
            stays_visible_once_explored,
        }
    }

    /// Human-readable name used in log messages and kill tallies.
    pub fn name(&self) -> String {
        match &self.kind {
            EntityKind::Player(_) => "Player".to_string(),
            EntityKind::Monster(species) => species.name().to_string(),
            EntityKind::Item(ItemKind::Gold { .. }) => "Gold".to_string(),
            EntityKind::Item(ItemKind::Scroll { spell }) => format!("Scroll of {}", spell),
            EntityKind::Stair(StairDirection::Up) => "Stair up".to_string(),
            EntityKind::Stair(StairDirection::Down) => "Stair down".to_string(),
            EntityKind::Shop => "Shop".to_string(),
        }
    }

    /// Character used in level text and debug dumps.
    pub fn glyph(&self) -> char {
        match &self.kind {
            EntityKind::Player(_) => '@',
            EntityKind::Monster(species) => species.stats().glyph,
            EntityKind::Item(ItemKind::Gold { .. }) => '*',
            EntityKind::Item(ItemKind::Scroll { .. }) => 'i',
            EntityKind::Stair(StairDirection::Up) => '<',
            EntityKind::Stair(StairDirection::Down) => '>',
            EntityKind::Shop => '$',
        }
    }

    pub fn is_alive(&self) -> bool {
        self.hitpoints > 0
    }

    pub fn is_player(&self) -> bool {
        matches!(self.kind, EntityKind::Player(_))
    }

    pub fn is_monster(&self) -> bool {
        matches!(self.kind, EntityKind::Monster(_))
    }

    /// Player or monster: anything that occupies a tile and can be fought.
    pub fn is_creature(&self) -> bool {
        self.is_player() || self.is_monster()
    }

    pub fn species(&self) -> Option<Species> {
        match self.kind {
            EntityKind::Monster(species) => Some(species),
            _ => None,
        }
    }

    pub fn stair_direction(&self) -> Option<StairDirection> {
        match self.kind {
            EntityKind::Stair(direction) => Some(direction),
            _ => None,
        }
    }

    pub fn player_data(&self) -> Option<&PlayerData> {
        match &self.kind {
            EntityKind::Player(data) => Some(data),
            _ => None,
        }
    }

    pub fn player_data_mut(&mut self) -> Option<&mut PlayerData> {
        match &mut self.kind {
            EntityKind::Player(data) => Some(data),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_every_species_has_weapons() {
        for species in [Species::Wolf, Species::Snake, Species::Yeti, Species::Dragon] {
            assert!(!species.stats().weapons.is_empty(), "{:?}", species);
        }
        assert!(!player_template::WEAPONS.is_empty());
    }

    #[test]
    fn test_weapon_catalogue() {
        let kick = NaturalWeapon::of(WeaponKind::Kick);
        assert_eq!((kick.damage_bonus, kick.attack_bonus, kick.defense_bonus), (3, -2, 2));
        let breath = NaturalWeapon::of(WeaponKind::FireBreath);
        assert_eq!((breath.damage_bonus, breath.attack_bonus, breath.defense_bonus), (4, 3, -4));
    }

    #[test]
    fn test_build_dragon() {
        let mut rng = StdRng::seed_from_u64(4);
        let dragon = Entity::build(3, EntityKind::Monster(Species::Dragon), Position::new(1, 2), 0, &mut rng);
        assert_eq!(dragon.hitpoints, 50);
        assert_eq!(dragon.combat.as_ref().map(|c| c.weapons().len()), Some(4));
        let ai = dragon.ai.unwrap();
        assert!(ai.stationary && ai.can_shoot);
        assert!((10..=15).contains(&ai.shoot_range));
        assert_eq!(dragon.glyph(), 'D');
    }

    #[test]
    fn test_build_player_and_stair() {
        let mut rng = StdRng::seed_from_u64(4);
        let player = Entity::build(0, EntityKind::new_player(), Position::new(1, 1), 0, &mut rng);
        assert!(player.is_player() && player.is_creature());
        assert_eq!(player.hitpoints, 100);
        assert_eq!(player.player_data().map(|p| p.gold), Some(100));
        assert!(player.ai.is_none());

        let stair = Entity::build(1, EntityKind::Stair(StairDirection::Down), Position::new(1, 1), 0, &mut rng);
        assert!(stair.stays_visible_once_explored);
        assert!(stair.combat.is_none());
        assert_eq!(stair.stair_direction(), Some(StairDirection::Down));
    }

    #[test]
    fn test_empty_weapon_list_rejected() {
        let d = Dice::new(1, 6);
        assert!(CombatStats::new(d, d, d, Vec::new()).is_err());
        assert!(CombatStats::new(d, d, d, vec![NaturalWeapon::of(WeaponKind::GolemArm)]).is_ok());
    }

    #[test]
    fn test_spell_names() {
        assert_eq!(Spell::from_name("magic_map"), Some(Spell::MagicMap));
        assert_eq!(Spell::from_name(" Blink "), Some(Spell::Blink));
        assert_eq!(Spell::from_name("teleport"), None);
    }

    #[test]
    fn test_scroll_bookkeeping() {
        let mut data = PlayerData {
            hitpoints_max: 10,
            gold: 0,
            scrolls: BTreeMap::new(),
        };
        assert!(!data.use_scroll(Spell::Blink));
        data.scrolls.insert(Spell::Blink, 1);
        assert!(data.use_scroll(Spell::Blink));
        assert_eq!(data.scroll_count(Spell::Blink), 0);
    }
}
