//! Supported games and their scoring rules.

use std::cmp::Ordering;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::frontier::FrontierPolicy;
use crate::puzzle::Puzzle;
use crate::score::{Qualifier, ScoreVector};

/// The closed set of games the archive knows how to score.
///
/// Every dimension is lower-is-better. Every qualifier a game declares takes
/// part in dominance: an unflagged score beats the same numbers flagged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Game {
    SpaceChem,
    ShenzhenIo,
    Infinifactory,
}

impl Game {
    pub const ALL: [Game; 3] = [Game::SpaceChem, Game::ShenzhenIo, Game::Infinifactory];

    /// Stable identifier used in configuration and CLI flags.
    pub fn id(self) -> &'static str {
        match self {
            Game::SpaceChem => "space_chem",
            Game::ShenzhenIo => "shenzhen_io",
            Game::Infinifactory => "infinifactory",
        }
    }

    pub fn display_name(self) -> &'static str {
        match self {
            Game::SpaceChem => "SpaceChem",
            Game::ShenzhenIo => "Shenzhen I/O",
            Game::Infinifactory => "Infinifactory",
        }
    }

    pub fn dimension_names(self) -> &'static [&'static str] {
        match self {
            Game::SpaceChem => &["cycles", "reactors", "symbols"],
            Game::ShenzhenIo => &["cost", "power", "lines"],
            Game::Infinifactory => &["cycles", "footprint", "blocks"],
        }
    }

    pub fn arity(self) -> usize {
        self.dimension_names().len()
    }

    /// Qualifiers a score of this game may carry.
    pub fn qualifiers(self) -> &'static [Qualifier] {
        match self {
            Game::SpaceChem => &[Qualifier::Bugged, Qualifier::Precognitive],
            Game::ShenzhenIo => &[],
            Game::Infinifactory => &[Qualifier::OutOfBounds],
        }
    }

    /// Check that `score` has this game's shape.
    pub fn check_score(self, score: &ScoreVector) -> Result<(), ValidationError> {
        if score.arity() != self.arity() {
            return Err(ValidationError::ArityMismatch {
                game: self,
                expected: self.arity(),
                actual: score.arity(),
            });
        }
        if let Some(unknown) = score
            .qualifiers()
            .iter()
            .find(|q| !self.qualifiers().contains(*q))
        {
            return Err(ValidationError::UnknownQualifier {
                game: self,
                qualifier: unknown.to_string(),
            });
        }
        Ok(())
    }
}

impl fmt::Display for Game {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

impl FromStr for Game {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "space_chem" | "spacechem" | "sc" => Ok(Game::SpaceChem),
            "shenzhen_io" | "shenzhenio" | "sz" => Ok(Game::ShenzhenIo),
            "infinifactory" | "if" => Ok(Game::Infinifactory),
            other => Err(ValidationError::UnknownGame(other.to_string())),
        }
    }
}

impl FrontierPolicy for Game {
    fn dominates(&self, a: &ScoreVector, b: &ScoreVector) -> bool {
        if a.arity() != b.arity() {
            return false;
        }

        let mut strictly_better = false;
        for (x, y) in a.dimensions().iter().zip(b.dimensions()) {
            match x.cmp(y) {
                Ordering::Greater => return false,
                Ordering::Less => strictly_better = true,
                Ordering::Equal => {}
            }
        }

        for &qualifier in self.qualifiers() {
            match (a.has(qualifier), b.has(qualifier)) {
                (true, false) => return false,
                (false, true) => strictly_better = true,
                _ => {}
            }
        }

        strictly_better
    }

    fn equivalent(&self, a: &ScoreVector, b: &ScoreVector) -> bool {
        a.dimensions() == b.dimensions()
            && self
                .qualifiers()
                .iter()
                .all(|&q| a.has(q) == b.has(q))
    }

    fn file_name(&self, score: &ScoreVector) -> String {
        let mut stem = score
            .dimensions()
            .iter()
            .map(u64::to_string)
            .collect::<Vec<_>>()
            .join("-");
        let markers: String = self
            .qualifiers()
            .iter()
            .filter(|&&q| score.has(q))
            .map(|q| q.marker())
            .collect();
        if !markers.is_empty() {
            stem.push('-');
            stem.push_str(&markers);
        }
        format!("{stem}.json")
    }

    fn puzzle_dir(&self, puzzle: &Puzzle) -> PathBuf {
        PathBuf::from(puzzle.group()).join(puzzle.name())
    }
}
