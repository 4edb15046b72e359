//! # Delve
//!
//! A turn-based dungeon simulation engine.
//!
//! ## Architecture Overview
//!
//! Delve owns the simulation core of a classic roguelike and nothing else:
//!
//! - **Game**: the [`World`] holds every level, the entity registry, the message log
//!   and the random number stream. All mutation happens inside [`World::execute`].
//! - **Generation**: procedural room-and-tunnel levels plus hand-authored text levels.
//! - **Input**: the abstract command surface ([`Command`]) and a key-script mapper.
//! - **Rendering**: a read-only ASCII dump of a [`Snapshot`] for debugging.
//!
//! Pixel rendering, audio and input devices live outside this crate. They read a
//! [`Snapshot`] each frame and write back only [`Command`]s.

pub mod game;
pub mod generation;
pub mod input;
pub mod rendering;
pub mod utils;

// Core module re-exports
pub use game::*;
pub use generation::*;
pub use input::*;
pub use rendering::*;
pub use utils::*;

/// Core error type for the Delve engine.
#[derive(thiserror::Error, Debug)]
pub enum DelveError {
    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    /// Game state is invalid
    #[error("Invalid game state: {0}")]
    InvalidState(String),

    /// Hand-authored level text could not be used
    #[error("Malformed level: {0}")]
    MalformedLevel(String),

    /// Dice expression could not be parsed
    #[error("Invalid dice expression: {0}")]
    InvalidDice(String),
}

/// Result type used throughout the Delve codebase.
pub type DelveResult<T> = Result<T, DelveError>;

/// Version information for the engine.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Engine configuration constants.
pub mod config {
    /// Default dungeon width in tiles
    pub const DEFAULT_DUNGEON_WIDTH: i32 = 80;

    /// Default dungeon height in tiles
    pub const DEFAULT_DUNGEON_HEIGHT: i32 = 40;

    /// Default torch radius in tiles
    pub const DEFAULT_TORCH_RADIUS: i32 = 10;

    /// Smallest torch radius the player can turn down to
    pub const MIN_TORCH_RADIUS: i32 = 1;

    /// Largest torch radius the player can turn up to
    pub const MAX_TORCH_RADIUS: i32 = 30;

    /// Damage dealt by a single arrow
    pub const ARROW_DAMAGE: i32 = 10;

    /// Hitpoints bought for one gold at a shop
    pub const SHOP_HEAL_PER_GOLD: i32 = 10;
}
