use sha2::{Digest, Sha256};

use crate::error::ValidationError;
use crate::puzzle::Puzzle;
use crate::score::{Qualifier, ScoreVector};

/// A scored submission for one puzzle.
///
/// `content == None` is a score-only solution: a known achievable score
/// without a stored artifact.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Solution {
    puzzle: Puzzle,
    score: ScoreVector,
    content: Option<String>,
}

impl Solution {
    /// Build a solution. Scores for non-deterministic puzzles are forced
    /// precognitive when the game tracks that qualifier.
    pub fn new(puzzle: Puzzle, mut score: ScoreVector, content: Option<String>) -> Self {
        if !puzzle.is_deterministic() && puzzle.game().qualifiers().contains(&Qualifier::Precognitive)
        {
            score.insert_qualifier(Qualifier::Precognitive);
        }
        Self {
            puzzle,
            score,
            content,
        }
    }

    pub fn score_only(puzzle: Puzzle, score: ScoreVector) -> Self {
        Self::new(puzzle, score, None)
    }

    pub fn with_content(puzzle: Puzzle, score: ScoreVector, content: impl Into<String>) -> Self {
        Self::new(puzzle, score, Some(content.into()))
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn score(&self) -> &ScoreVector {
        &self.score
    }

    pub fn content(&self) -> Option<&str> {
        self.content.as_deref()
    }

    pub fn is_score_only(&self) -> bool {
        self.content.is_none()
    }

    /// SHA-256 of the content, hex encoded.
    pub fn content_digest(&self) -> Option<String> {
        self.content
            .as_ref()
            .map(|c| hex::encode(Sha256::digest(c.as_bytes())))
    }

    /// Check the score's shape against the puzzle's game and reject blank content.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.puzzle.game().check_score(&self.score)?;
        if self.content.as_deref().is_some_and(|c| c.trim().is_empty()) {
            return Err(ValidationError::EmptyContent);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;

    fn puzzle(game: Game) -> Puzzle {
        Puzzle::new(game, "g", "p").unwrap()
    }

    #[test]
    fn nondeterministic_puzzle_forces_precognitive() {
        let solution = Solution::score_only(
            puzzle(Game::SpaceChem).nondeterministic(),
            ScoreVector::new([100, 1, 10]),
        );
        assert!(solution.score().has(Qualifier::Precognitive));
        assert!(solution.validate().is_ok());
    }

    #[test]
    fn games_without_precognition_are_left_alone() {
        let solution = Solution::score_only(
            puzzle(Game::ShenzhenIo).nondeterministic(),
            ScoreVector::new([6, 200, 10]),
        );
        assert!(solution.score().qualifiers().is_empty());
        assert!(solution.validate().is_ok());
    }

    #[test]
    fn blank_content_is_rejected() {
        let solution = Solution::with_content(
            puzzle(Game::SpaceChem),
            ScoreVector::new([100, 1, 10]),
            "  \n",
        );
        assert!(matches!(solution.validate(), Err(ValidationError::EmptyContent)));
    }

    #[test]
    fn wrong_arity_is_rejected() {
        let solution = Solution::score_only(puzzle(Game::SpaceChem), ScoreVector::new([1, 2, 3, 4]));
        assert!(matches!(
            solution.validate(),
            Err(ValidationError::ArityMismatch { expected: 3, actual: 4, .. })
        ));
    }

    #[test]
    fn content_digest_is_sha256_hex() {
        let solution =
            Solution::with_content(puzzle(Game::SpaceChem), ScoreVector::new([1, 1, 1]), "abc");
        assert_eq!(
            solution.content_digest().unwrap(),
            "ba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
        );
        assert!(Solution::score_only(puzzle(Game::SpaceChem), ScoreVector::new([1, 1, 1]))
            .content_digest()
            .is_none());
    }
}
