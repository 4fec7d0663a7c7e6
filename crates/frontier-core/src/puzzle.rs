use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::game::Game;

/// Stable identity of a puzzle within a game.
///
/// `group` and `name` become directory names in the store, so both must be
/// path-safe identifiers.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Puzzle {
    game: Game,
    group: String,
    name: String,
    display_name: String,
    deterministic: bool,
}

fn check_identifier(field: &'static str, value: &str) -> Result<(), ValidationError> {
    let mut chars = value.chars();
    let valid = chars.next().is_some_and(|c| c.is_ascii_alphanumeric())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '_' | '-' | '.'));
    if valid {
        Ok(())
    } else {
        Err(ValidationError::InvalidIdentifier {
            field,
            value: value.to_string(),
        })
    }
}

impl Puzzle {
    /// A deterministic puzzle whose display name is its `name`.
    pub fn new(
        game: Game,
        group: impl Into<String>,
        name: impl Into<String>,
    ) -> Result<Self, ValidationError> {
        let group = group.into();
        let name = name.into();
        check_identifier("group", &group)?;
        check_identifier("puzzle", &name)?;
        Ok(Self {
            game,
            group,
            display_name: name.clone(),
            name,
            deterministic: true,
        })
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    /// Mark the puzzle's outcomes as random; its scores are forced precognitive.
    pub fn nondeterministic(mut self) -> Self {
        self.deterministic = false;
        self
    }

    pub fn game(&self) -> Game {
        self.game
    }

    pub fn group(&self) -> &str {
        &self.group
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn is_deterministic(&self) -> bool {
        self.deterministic
    }
}

impl fmt::Display for Puzzle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display_name)
    }
}
