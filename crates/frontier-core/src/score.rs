//! Score vectors: numeric dimensions plus boolean qualifiers.

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Boolean flag attached to a score. A flagged score is worse than the same
/// numbers unflagged wherever the game orders by that qualifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Qualifier {
    /// Relies on behaviour that only works because of a game bug
    Bugged,
    /// Relies on foreknowledge of random inputs
    Precognitive,
    /// Uses space outside the intended build area
    OutOfBounds,
}

impl Qualifier {
    /// Single-letter marker used in score displays (`100/1/10/P`).
    pub fn marker(self) -> char {
        match self {
            Qualifier::Bugged => 'B',
            Qualifier::Precognitive => 'P',
            Qualifier::OutOfBounds => 'O',
        }
    }

    pub fn from_marker(marker: char) -> Option<Self> {
        match marker.to_ascii_uppercase() {
            'B' => Some(Qualifier::Bugged),
            'P' => Some(Qualifier::Precognitive),
            'O' => Some(Qualifier::OutOfBounds),
            _ => None,
        }
    }
}

impl fmt::Display for Qualifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Qualifier::Bugged => "bugged",
            Qualifier::Precognitive => "precognitive",
            Qualifier::OutOfBounds => "out_of_bounds",
        };
        f.write_str(name)
    }
}

/// Ordered tuple of dimensions (lower is better) plus qualifier flags.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ScoreVector {
    dimensions: Vec<u64>,
    #[serde(default)]
    qualifiers: BTreeSet<Qualifier>,
}

impl ScoreVector {
    pub fn new(dimensions: impl Into<Vec<u64>>) -> Self {
        Self {
            dimensions: dimensions.into(),
            qualifiers: BTreeSet::new(),
        }
    }

    pub fn with_qualifier(mut self, qualifier: Qualifier) -> Self {
        self.qualifiers.insert(qualifier);
        self
    }

    pub fn dimensions(&self) -> &[u64] {
        &self.dimensions
    }

    pub fn arity(&self) -> usize {
        self.dimensions.len()
    }

    pub fn qualifiers(&self) -> &BTreeSet<Qualifier> {
        &self.qualifiers
    }

    pub fn has(&self, qualifier: Qualifier) -> bool {
        self.qualifiers.contains(&qualifier)
    }

    pub(crate) fn insert_qualifier(&mut self, qualifier: Qualifier) {
        self.qualifiers.insert(qualifier);
    }
}

impl fmt::Display for ScoreVector {
    /// `100/1/10`, with qualifier markers appended as a last segment
    /// (`100/1/10/BP`).
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let dims: Vec<String> = self.dimensions.iter().map(u64::to_string).collect();
        f.write_str(&dims.join("/"))?;
        if !self.qualifiers.is_empty() {
            let markers: String = self.qualifiers.iter().map(|q| q.marker()).collect();
            write!(f, "/{markers}")?;
        }
        Ok(())
    }
}

impl FromStr for ScoreVector {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let malformed = || ValidationError::MalformedScore(s.to_string());
        let mut parts: Vec<&str> = s.trim().split('/').collect();

        let mut qualifiers = BTreeSet::new();
        if let Some(last) = parts.last() {
            if !last.is_empty() && last.chars().all(|c| c.is_ascii_alphabetic()) {
                for marker in last.chars() {
                    qualifiers.insert(Qualifier::from_marker(marker).ok_or_else(malformed)?);
                }
                parts.pop();
            }
        }

        if parts.is_empty() {
            return Err(malformed());
        }
        let dimensions = parts
            .iter()
            .map(|p| p.trim().parse::<u64>().map_err(|_| malformed()))
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(Self {
            dimensions,
            qualifiers,
        })
    }
}
