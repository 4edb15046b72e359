//! # Input Module
//!
//! Input handling and command parsing for player interactions.
//!
//! Physical keys are the front end's business. This module only knows the
//! single characters a key script is made of and the [`Command`]s they stand
//! for, so a headless driver can replay a game from a string.

pub mod commands;

pub use commands::*;

use crate::{Direction, Spell};
use log::debug;

/// Input handler for turning key characters into commands.
///
/// # Examples
///
/// ```
/// use delve::{Command, InputHandler};
///
/// let input_handler = InputHandler::new();
/// let commands = input_handler.parse_script("l.>");
/// assert_eq!(commands[0], Command::Move { dx: 1, dy: 0 });
/// assert_eq!(commands[1], Command::Wait);
/// assert_eq!(commands[2], Command::UseStairs);
/// ```
#[derive(Debug, Clone)]
pub struct InputHandler {
    /// Whether to enable Vi-style movement keys (hjklyubn)
    pub vi_keys_enabled: bool,
    /// Whether to enable numpad movement keys (1-9)
    pub numpad_enabled: bool,
}

impl Default for InputHandler {
    fn default() -> Self {
        Self::new()
    }
}

impl InputHandler {
    /// Creates a new input handler with every key layout enabled.
    pub fn new() -> Self {
        Self {
            vi_keys_enabled: true,
            numpad_enabled: true,
        }
    }

    /// Maps one key character to a player input.
    pub fn key_to_input(&self, key: char) -> Option<PlayerInput> {
        if self.vi_keys_enabled {
            let direction = match key {
                'h' => Some(Direction::West),
                'j' => Some(Direction::South),
                'k' => Some(Direction::North),
                'l' => Some(Direction::East),
                'y' => Some(Direction::Northwest),
                'u' => Some(Direction::Northeast),
                'b' => Some(Direction::Southwest),
                'n' => Some(Direction::Southeast),
                _ => None,
            };
            if let Some(direction) = direction {
                return Some(PlayerInput::Move(direction));
            }
        }

        if self.numpad_enabled {
            let direction = match key {
                '4' => Some(Direction::West),
                '2' => Some(Direction::South),
                '8' => Some(Direction::North),
                '6' => Some(Direction::East),
                '7' => Some(Direction::Northwest),
                '9' => Some(Direction::Northeast),
                '1' => Some(Direction::Southwest),
                '3' => Some(Direction::Southeast),
                _ => None,
            };
            if let Some(direction) = direction {
                return Some(PlayerInput::Move(direction));
            }
            if key == '5' {
                return Some(PlayerInput::Wait);
            }
        }

        match key {
            '.' => Some(PlayerInput::Wait),
            '<' | '>' => Some(PlayerInput::UseStairs),
            '+' => Some(PlayerInput::ChangeTorchRadius(1)),
            '-' => Some(PlayerInput::ChangeTorchRadius(-1)),
            'm' => Some(PlayerInput::Cast(Spell::MagicMap)),
            'q' => Some(PlayerInput::Quit),
            _ => None,
        }
    }

    /// Converts player input to a command for the world.
    ///
    /// Inputs that only concern the front end yield `None`.
    pub fn input_to_command(&self, input: PlayerInput) -> Option<Command> {
        match input {
            PlayerInput::Move(direction) => Some(Command::step(direction)),
            PlayerInput::Wait => Some(Command::Wait),
            PlayerInput::UseStairs => Some(Command::UseStairs),
            PlayerInput::ChangeTorchRadius(delta) => Some(Command::ChangeTorchRadius { delta }),
            PlayerInput::Cast(spell) => Some(Command::Cast {
                spell,
                target: None,
            }),
            PlayerInput::Quit => None,
        }
    }

    /// Translates a key script into commands.
    ///
    /// Whitespace and unknown keys are skipped. A `q` ends the script.
    pub fn parse_script(&self, script: &str) -> Vec<Command> {
        let mut commands = Vec::new();
        for key in script.chars().filter(|c| !c.is_whitespace()) {
            match self.key_to_input(key) {
                Some(PlayerInput::Quit) => break,
                Some(input) => commands.extend(self.input_to_command(input)),
                None => debug!("ignoring unmapped key {:?}", key),
            }
        }
        commands
    }
}

/// Player input types that can be processed by the input handler.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerInput {
    /// Move in a given direction
    Move(Direction),
    /// Wait/rest for one turn
    Wait,
    /// Take the stair underfoot
    UseStairs,
    /// Grow or shrink the torch
    ChangeTorchRadius(i32),
    /// Read a scroll that needs no target
    Cast(Spell),
    /// Stop playing
    Quit,
}
