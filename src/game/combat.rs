//! # Combat Resolver
//!
//! Melee is a pair of opposed exploding-dice rolls. Each side picks one of its
//! natural weapons at random; the weapon's bonuses are added to the attack,
//! defense and damage rolls. Only a strictly higher attack roll hits.

use crate::{DelveError, DelveResult, Entity, EntityId, EntityRegistry, NaturalWeapon};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};

/// Everything that happened in one strike.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeLog {
    pub attacker: EntityId,
    pub defender: EntityId,
    pub attacker_name: String,
    pub defender_name: String,
    pub attacker_weapon: NaturalWeapon,
    pub defender_weapon: NaturalWeapon,
    pub attack_roll: i32,
    pub defense_roll: i32,
    /// Damage dealt, zero on a miss
    pub damage: i32,
}

impl ExchangeLog {
    pub fn is_hit(&self) -> bool {
        self.attack_roll > self.defense_roll
    }

    /// The player-facing description of this strike.
    pub fn message(&self) -> String {
        if self.is_hit() {
            format!(
                "{} strikes {} with {} ({} vs {}) for {} damage",
                self.attacker_name,
                self.defender_name,
                self.attacker_weapon.kind,
                self.attack_roll,
                self.defense_roll,
                self.damage
            )
        } else {
            format!(
                "{} strikes at {} with {} but {} parries with {} ({} vs {})",
                self.attacker_name,
                self.defender_name,
                self.attacker_weapon.kind,
                self.defender_name,
                self.defender_weapon.kind,
                self.attack_roll,
                self.defense_roll
            )
        }
    }
}

fn pick_weapon<R: Rng + ?Sized>(entity: &Entity, rng: &mut R) -> DelveResult<NaturalWeapon> {
    entity
        .combat
        .as_ref()
        .and_then(|combat| combat.weapons().choose(rng).copied())
        .ok_or_else(|| DelveError::InvalidState(format!("{} cannot fight", entity.name())))
}

/// Rolls one strike of `attacker` against `defender` without touching either.
///
/// Both entities need combat stats; asking anything else to fight is a
/// content error.
pub fn resolve_exchange<R: Rng + ?Sized>(
    attacker: &Entity,
    defender: &Entity,
    rng: &mut R,
) -> DelveResult<ExchangeLog> {
    let attacker_weapon = pick_weapon(attacker, rng)?;
    let defender_weapon = pick_weapon(defender, rng)?;
    let (Some(offense), Some(defense)) = (attacker.combat.as_ref(), defender.combat.as_ref()) else {
        return Err(DelveError::InvalidState("combatant without combat stats".to_string()));
    };

    let attack_roll = offense.attack.roll(rng, attacker_weapon.attack_bonus, true);
    let defense_roll = defense.defense.roll(rng, defender_weapon.defense_bonus, true);
    let damage = if attack_roll > defense_roll {
        offense.damage.roll(rng, attacker_weapon.damage_bonus, true)
    } else {
        0
    };

    debug!(
        "{} ({}) vs {} ({}): {} against {}, damage {}",
        attacker.name(),
        attacker_weapon.kind,
        defender.name(),
        defender_weapon.kind,
        attack_roll,
        defense_roll,
        damage
    );

    Ok(ExchangeLog {
        attacker: attacker.id,
        defender: defender.id,
        attacker_name: attacker.name(),
        defender_name: defender.name(),
        attacker_weapon,
        defender_weapon,
        attack_roll,
        defense_roll,
        damage,
    })
}

/// Outcome of a full fight: the opening strike, the counter-strike if the
/// defender survived, and whoever died.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FightReport {
    pub exchanges: Vec<ExchangeLog>,
    /// Names of the entities removed from the registry
    pub slain: Vec<String>,
    /// Set when the player's hitpoints dropped to zero or below
    pub player_died: bool,
}

impl FightReport {
    /// Log lines describing the fight, in order.
    pub fn messages(&self) -> Vec<String> {
        let mut lines: Vec<String> = self.exchanges.iter().map(ExchangeLog::message).collect();
        lines.extend(self.slain.iter().map(|name| format!("{} dies", name)));
        lines
    }
}

/// Applies a strike's damage to the defender in the registry.
fn apply_exchange<R: Rng + ?Sized>(
    registry: &mut EntityRegistry,
    attacker: EntityId,
    defender: EntityId,
    rng: &mut R,
) -> DelveResult<ExchangeLog> {
    let exchange = {
        let a = registry
            .get(attacker)
            .ok_or_else(|| DelveError::InvalidState(format!("no entity {}", attacker)))?;
        let b = registry
            .get(defender)
            .ok_or_else(|| DelveError::InvalidState(format!("no entity {}", defender)))?;
        resolve_exchange(a, b, rng)?
    };
    if let Some(b) = registry.get_mut(defender) {
        b.hitpoints -= exchange.damage;
    }
    Ok(exchange)
}

/// Resolves `a` attacking `b`, then `b` striking back if it still stands.
///
/// Every participant left at zero hitpoints or below is removed from the
/// registry before returning and credited to the other side's kill tally. The
/// player is never removed; its death is reported instead.
pub fn fight<R: Rng + ?Sized>(
    registry: &mut EntityRegistry,
    a: EntityId,
    b: EntityId,
    rng: &mut R,
) -> DelveResult<FightReport> {
    let mut report = FightReport::default();

    report.exchanges.push(apply_exchange(registry, a, b, rng)?);
    let b_alive = registry.get(b).map(Entity::is_alive).unwrap_or(false);
    if b_alive {
        report.exchanges.push(apply_exchange(registry, b, a, rng)?);
    }

    for (victim, killer) in [(b, a), (a, b)] {
        settle_death(registry, victim, killer, &mut report);
    }
    Ok(report)
}

/// Removes a dead entity and credits the kill. Does nothing to the living.
pub fn settle_death(
    registry: &mut EntityRegistry,
    victim: EntityId,
    killer: EntityId,
    report: &mut FightReport,
) {
    let Some(entity) = registry.get(victim) else {
        return;
    };
    if entity.is_alive() {
        return;
    }
    let name = entity.name();
    if let Some(combat) = registry.get_mut(killer).and_then(|k| k.combat.as_mut()) {
        combat.record_kill(&name);
    }
    if entity_is_player(registry, victim) {
        report.player_died = true;
        return;
    }
    debug!("{} (#{}) removed", name, victim);
    registry.remove(victim);
    report.slain.push(name);
}

fn entity_is_player(registry: &EntityRegistry, id: EntityId) -> bool {
    registry.get(id).map(Entity::is_player).unwrap_or(false)
}
