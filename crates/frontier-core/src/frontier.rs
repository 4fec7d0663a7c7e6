//! Per-puzzle Pareto frontier (the solutions index).
//!
//! A [`Frontier`] is rebuilt from the puzzle directory on every archive
//! attempt and thrown away afterwards, so it always mirrors the files on
//! disk. Scoring rules come from an injected [`FrontierPolicy`]; the frontier
//! itself knows nothing about any particular game.
//!
//! On-disk layout: one pretty-printed JSON file per member, named by
//! [`FrontierPolicy::file_name`]:
//!
//! ```text
//! <group>/<puzzle>/100-1-10.json
//! {
//!   "puzzle": "<puzzle>",
//!   "score": { "dimensions": [100, 1, 10], "qualifiers": [] },
//!   "content": null
//! }
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tokio::fs;
use tracing::debug;

use crate::error::{FrontierError, FrontierResult};
use crate::puzzle::Puzzle;
use crate::score::ScoreVector;
use crate::solution::Solution;

const MEMBER_EXTENSION: &str = "json";

/// Scoring capability injected into a [`Frontier`].
pub trait FrontierPolicy: Send + Sync {
    /// `a` is no worse than `b` everywhere and strictly better somewhere.
    fn dominates(&self, a: &ScoreVector, b: &ScoreVector) -> bool;

    /// `a` and `b` tie on everything the ordering looks at.
    fn equivalent(&self, a: &ScoreVector, b: &ScoreVector) -> bool {
        a == b
    }

    /// Whether `candidate` replaces an `existing` member it ties with.
    ///
    /// The default lets any candidate that carries content win the tie, so a
    /// real artifact replaces a score-only placeholder (or an older artifact)
    /// and a score-only resubmission never displaces anything.
    fn supersedes_on_tie(&self, candidate: &Solution, existing: &Solution) -> bool {
        let _ = existing;
        !candidate.is_score_only()
    }

    /// File name of a member. Two members never share a file: scores that
    /// map to the same name are settled as a tie.
    fn file_name(&self, score: &ScoreVector) -> String;

    /// Directory of a puzzle relative to the store root.
    fn puzzle_dir(&self, puzzle: &Puzzle) -> PathBuf;
}

/// Outcome of evaluating a candidate against the current members.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    /// The candidate belongs in the frontier; `displaced` members leave it.
    Accepted { displaced: Vec<ScoreVector> },
    /// An existing member dominates or ties the candidate.
    Rejected { by: ScoreVector },
}

/// What [`Frontier::insert`] did on disk.
#[derive(Debug, Clone)]
pub struct FrontierChange {
    pub verdict: Verdict,
    /// File written for the candidate, if accepted
    pub written: Option<PathBuf>,
    /// Files of displaced members that were deleted
    pub deleted: Vec<PathBuf>,
}

impl FrontierChange {
    pub fn inserted(&self) -> bool {
        matches!(self.verdict, Verdict::Accepted { .. })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct MemberRecord {
    puzzle: String,
    score: ScoreVector,
    content: Option<String>,
}

/// The current non-dominated solutions of one puzzle.
pub struct Frontier<'p, P: FrontierPolicy + ?Sized> {
    policy: &'p P,
    puzzle: Puzzle,
    dir: PathBuf,
    members: Vec<Solution>,
}

impl<'p, P: FrontierPolicy + ?Sized> Frontier<'p, P> {
    /// A frontier with no members rooted at `dir`.
    pub fn empty(policy: &'p P, puzzle: Puzzle, dir: impl Into<PathBuf>) -> Self {
        Self {
            policy,
            puzzle,
            dir: dir.into(),
            members: Vec::new(),
        }
    }

    /// Read every member file under `dir`.
    ///
    /// A missing directory is an empty frontier. Directories and files with
    /// other extensions are ignored. A member file that does not parse, names
    /// another puzzle, has the wrong shape, or whose name does not match its
    /// score is a [`FrontierError::Inconsistent`]; so is a set of members
    /// where one dominates another.
    pub async fn load(policy: &'p P, puzzle: Puzzle, dir: impl Into<PathBuf>) -> FrontierResult<Self> {
        let mut frontier = Self::empty(policy, puzzle, dir);

        let mut entries = match fs::read_dir(&frontier.dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(frontier),
            Err(e) => return Err(FrontierError::io(&frontier.dir, e)),
        };

        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| FrontierError::io(&frontier.dir, e))?
        {
            let path = entry.path();
            let file_type = entry
                .file_type()
                .await
                .map_err(|e| FrontierError::io(&path, e))?;
            if !file_type.is_file()
                || path.extension().and_then(|e| e.to_str()) != Some(MEMBER_EXTENSION)
            {
                continue;
            }

            let member = frontier.read_member(&path).await?;
            frontier.members.push(member);
        }

        frontier.sort();
        if !frontier.is_antichain() {
            return Err(FrontierError::inconsistent(
                &frontier.dir,
                "a stored member dominates another",
            ));
        }

        debug!(
            puzzle = %frontier.puzzle.name(),
            members = frontier.members.len(),
            "frontier loaded"
        );
        Ok(frontier)
    }

    async fn read_member(&self, path: &Path) -> FrontierResult<Solution> {
        let bytes = fs::read(path).await.map_err(|e| FrontierError::io(path, e))?;
        let record: MemberRecord = serde_json::from_slice(&bytes)
            .map_err(|e| FrontierError::inconsistent(path, e.to_string()))?;

        if record.puzzle != self.puzzle.name() {
            return Err(FrontierError::inconsistent(
                path,
                format!("belongs to puzzle `{}`", record.puzzle),
            ));
        }

        let solution = Solution::new(self.puzzle.clone(), record.score, record.content);
        solution
            .validate()
            .map_err(|e| FrontierError::inconsistent(path, e.to_string()))?;

        let expected = self.policy.file_name(solution.score());
        if path.file_name().and_then(|n| n.to_str()) != Some(expected.as_str()) {
            return Err(FrontierError::inconsistent(
                path,
                format!("score {} should be stored as {expected}", solution.score()),
            ));
        }

        Ok(solution)
    }

    pub fn puzzle(&self) -> &Puzzle {
        &self.puzzle
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn members(&self) -> &[Solution] {
        &self.members
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Exhaustive pairwise check that no member dominates another.
    pub fn is_antichain(&self) -> bool {
        self.members.iter().enumerate().all(|(i, a)| {
            self.members
                .iter()
                .enumerate()
                .all(|(j, b)| i == j || !self.policy.dominates(a.score(), b.score()))
        })
    }

    /// Decide what inserting `candidate` would do, without touching disk.
    pub fn evaluate(&self, candidate: &Solution) -> Verdict {
        match self.decide(candidate) {
            Ok(displaced) => Verdict::Accepted {
                displaced: displaced
                    .into_iter()
                    .map(|i| self.members[i].score().clone())
                    .collect(),
            },
            Err(by) => Verdict::Rejected { by },
        }
    }

    /// Indices of displaced members, or the score of the member that beats
    /// or ties the candidate.
    fn decide(&self, candidate: &Solution) -> Result<Vec<usize>, ScoreVector> {
        let candidate_name = self.policy.file_name(candidate.score());
        let mut displaced = Vec::new();
        for (i, member) in self.members.iter().enumerate() {
            let tied = self.policy.equivalent(member.score(), candidate.score());
            if !tied && self.policy.dominates(member.score(), candidate.score()) {
                return Err(member.score().clone());
            } else if !tied && self.policy.dominates(candidate.score(), member.score()) {
                displaced.push(i);
            } else if tied || self.policy.file_name(member.score()) == candidate_name {
                if self.policy.supersedes_on_tie(candidate, member) {
                    displaced.push(i);
                } else {
                    return Err(member.score().clone());
                }
            }
        }
        Ok(displaced)
    }

    /// Apply `candidate` and persist the result.
    ///
    /// Displaced members' files are deleted first, then the candidate's file
    /// is written (through a temporary file and a rename). A rejected
    /// candidate touches nothing. An accepted candidate whose file already
    /// holds identical bytes is still reported as inserted.
    pub async fn insert(&mut self, candidate: Solution) -> FrontierResult<FrontierChange> {
        let displaced = match self.decide(&candidate) {
            Ok(displaced) => displaced,
            Err(by) => {
                return Ok(FrontierChange {
                    verdict: Verdict::Rejected { by },
                    written: None,
                    deleted: Vec::new(),
                })
            }
        };

        let candidate_name = self.policy.file_name(candidate.score());
        let mut deleted = Vec::new();
        for &i in &displaced {
            let name = self.policy.file_name(self.members[i].score());
            if name == candidate_name {
                continue;
            }
            let path = self.dir.join(name);
            fs::remove_file(&path)
                .await
                .map_err(|e| FrontierError::io(&path, e))?;
            deleted.push(path);
        }

        let written = self.write_member(&candidate_name, &candidate).await?;

        let mut displaced_scores = Vec::with_capacity(displaced.len());
        for &i in displaced.iter().rev() {
            displaced_scores.push(self.members.remove(i).score().clone());
        }
        displaced_scores.reverse();
        self.members.push(candidate);
        self.sort();

        Ok(FrontierChange {
            verdict: Verdict::Accepted {
                displaced: displaced_scores,
            },
            written: Some(written),
            deleted,
        })
    }

    /// [`insert`](Self::insert), reporting only whether the candidate got in.
    pub async fn add(&mut self, candidate: Solution) -> FrontierResult<bool> {
        Ok(self.insert(candidate).await?.inserted())
    }

    async fn write_member(&self, name: &str, solution: &Solution) -> FrontierResult<PathBuf> {
        let target = self.dir.join(name);
        let record = MemberRecord {
            puzzle: self.puzzle.name().to_string(),
            score: solution.score().clone(),
            content: solution.content().map(str::to_string),
        };
        let mut bytes = serde_json::to_vec_pretty(&record)
            .map_err(|e| FrontierError::io(&target, e.into()))?;
        bytes.push(b'\n');

        fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| FrontierError::io(&self.dir, e))?;
        let tmp = self.dir.join(format!(".{name}.tmp"));
        fs::write(&tmp, &bytes)
            .await
            .map_err(|e| FrontierError::io(&tmp, e))?;
        fs::rename(&tmp, &target)
            .await
            .map_err(|e| FrontierError::io(&target, e))?;

        Ok(target)
    }

    fn sort(&mut self) {
        self.members.sort_by(|a, b| {
            a.score()
                .dimensions()
                .cmp(b.score().dimensions())
                .then_with(|| a.score().qualifiers().cmp(b.score().qualifiers()))
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::Game;
    use crate::score::Qualifier;

    fn puzzle() -> Puzzle {
        Puzzle::new(Game::SpaceChem, "g", "p").unwrap()
    }

    fn score_only(dims: [u64; 3]) -> Solution {
        Solution::score_only(puzzle(), ScoreVector::new(dims))
    }

    fn with_content(dims: [u64; 3], content: &str) -> Solution {
        Solution::with_content(puzzle(), ScoreVector::new(dims), content)
    }

    async fn seeded(dir: &Path, seed: Vec<Solution>) -> Frontier<'static, Game> {
        let mut frontier = Frontier::empty(&Game::SpaceChem, puzzle(), dir);
        for solution in seed {
            assert!(frontier.add(solution).await.unwrap());
        }
        Frontier::load(&Game::SpaceChem, puzzle(), dir).await.unwrap()
    }

    fn files(dir: &Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|e| e.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }

    #[tokio::test]
    async fn missing_directory_is_empty_frontier() {
        let dir = tempfile::tempdir().unwrap();
        let frontier = Frontier::load(&Game::SpaceChem, puzzle(), dir.path().join("nope"))
            .await
            .unwrap();
        assert!(frontier.is_empty());
    }

    #[tokio::test]
    async fn better_on_two_dims_replaces_member() {
        let dir = tempfile::tempdir().unwrap();
        let mut frontier = seeded(dir.path(), vec![score_only([100, 1, 10])]).await;

        let change = frontier.insert(score_only([90, 1, 9])).await.unwrap();
        assert_eq!(
            change.verdict,
            Verdict::Accepted {
                displaced: vec![ScoreVector::new([100, 1, 10])]
            }
        );
        assert_eq!(change.deleted, vec![dir.path().join("100-1-10.json")]);
        assert_eq!(files(dir.path()), vec!["90-1-9.json"]);
    }

    #[tokio::test]
    async fn worse_on_one_dim_is_rejected_without_writes() {
        let dir = tempfile::tempdir().unwrap();
        let mut frontier = seeded(dir.path(), vec![score_only([100, 1, 10])]).await;
        let before = std::fs::read(dir.path().join("100-1-10.json")).unwrap();

        let change = frontier.insert(score_only([100, 2, 10])).await.unwrap();
        assert_eq!(
            change.verdict,
            Verdict::Rejected {
                by: ScoreVector::new([100, 1, 10])
            }
        );
        assert!(change.written.is_none());
        assert_eq!(files(dir.path()), vec!["100-1-10.json"]);
        assert_eq!(std::fs::read(dir.path().join("100-1-10.json")).unwrap(), before);
    }

    #[tokio::test]
    async fn richer_content_at_equal_score_replaces_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let mut frontier = seeded(dir.path(), vec![score_only([100, 1, 10])]).await;

        assert!(frontier.add(with_content([100, 1, 10], "SOLUTION:p")).await.unwrap());
        assert_eq!(frontier.len(), 1);
        assert_eq!(frontier.members()[0].content(), Some("SOLUTION:p"));

        let reloaded = Frontier::load(&Game::SpaceChem, puzzle(), dir.path()).await.unwrap();
        assert_eq!(reloaded.members()[0].content(), Some("SOLUTION:p"));
    }

    #[tokio::test]
    async fn score_only_never_displaces_at_equal_score() {
        let dir = tempfile::tempdir().unwrap();
        let mut frontier = seeded(dir.path(), vec![with_content([100, 1, 10], "x")]).await;

        assert!(!frontier.add(score_only([100, 1, 10])).await.unwrap());
        assert_eq!(frontier.members()[0].content(), Some("x"));

        let mut reloaded = seeded(dir.path(), vec![]).await;
        assert!(!reloaded.add(score_only([100, 1, 10])).await.unwrap());
    }

    #[tokio::test]
    async fn identical_resubmission_counts_as_insert_with_same_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let mut frontier = seeded(dir.path(), vec![with_content([100, 1, 10], "x")]).await;
        let before = std::fs::read(dir.path().join("100-1-10.json")).unwrap();

        assert!(frontier.add(with_content([100, 1, 10], "x")).await.unwrap());
        assert_eq!(std::fs::read(dir.path().join("100-1-10.json")).unwrap(), before);
    }

    #[tokio::test]
    async fn incomparable_candidate_joins() {
        let dir = tempfile::tempdir().unwrap();
        let mut frontier = seeded(dir.path(), vec![score_only([100, 1, 10])]).await;

        let change = frontier.insert(score_only([50, 3, 40])).await.unwrap();
        assert_eq!(change.verdict, Verdict::Accepted { displaced: vec![] });
        assert_eq!(frontier.len(), 2);
        assert_eq!(files(dir.path()), vec!["100-1-10.json", "50-3-40.json"]);
    }

    #[tokio::test]
    async fn unflagged_replaces_flagged_variant() {
        let dir = tempfile::tempdir().unwrap();
        let flagged = Solution::score_only(
            puzzle(),
            ScoreVector::new([100, 1, 10]).with_qualifier(Qualifier::Bugged),
        );
        let mut frontier = seeded(dir.path(), vec![flagged]).await;
        assert_eq!(files(dir.path()), vec!["100-1-10-B.json"]);

        let change = frontier.insert(score_only([100, 1, 10])).await.unwrap();
        assert!(change.inserted());
        assert_eq!(change.deleted, vec![dir.path().join("100-1-10-B.json")]);
        assert_eq!(files(dir.path()), vec!["100-1-10.json"]);
        assert!(!frontier.members()[0].score().has(Qualifier::Bugged));
    }

    #[tokio::test]
    async fn bugged_and_precognitive_variants_both_survive() {
        let dir = tempfile::tempdir().unwrap();
        let bugged = Solution::with_content(
            puzzle(),
            ScoreVector::new([100, 1, 10]).with_qualifier(Qualifier::Bugged),
            "BUGGED_ARTIFACT",
        );
        let mut frontier = seeded(dir.path(), vec![bugged]).await;

        let precog = Solution::score_only(
            puzzle(),
            ScoreVector::new([100, 1, 10]).with_qualifier(Qualifier::Precognitive),
        );
        let change = frontier.insert(precog).await.unwrap();
        assert_eq!(change.verdict, Verdict::Accepted { displaced: vec![] });
        assert!(change.deleted.is_empty());
        assert_eq!(files(dir.path()), vec!["100-1-10-B.json", "100-1-10-P.json"]);

        let reloaded = Frontier::load(&Game::SpaceChem, puzzle(), dir.path()).await.unwrap();
        assert_eq!(reloaded.len(), 2);
        assert!(reloaded.members()[0].score().has(Qualifier::Bugged));
        assert_eq!(reloaded.members()[0].content(), Some("BUGGED_ARTIFACT"));
        assert!(reloaded.members()[1].score().has(Qualifier::Precognitive));
    }

    #[tokio::test]
    async fn members_sort_by_dimensions_then_qualifiers() {
        let dir = tempfile::tempdir().unwrap();
        let flagged = |q| {
            Solution::score_only(puzzle(), ScoreVector::new([100, 1, 10]).with_qualifier(q))
        };
        let frontier = seeded(
            dir.path(),
            vec![
                flagged(Qualifier::Precognitive),
                score_only([50, 3, 40]),
                flagged(Qualifier::Bugged),
            ],
        )
        .await;

        let order: Vec<String> = frontier.members().iter().map(|m| m.score().to_string()).collect();
        assert_eq!(order, vec!["50/3/40", "100/1/10/B", "100/1/10/P"]);
    }

    /// Two scores the policy cannot order but files under one name.
    struct CoarseNames;

    impl FrontierPolicy for CoarseNames {
        fn dominates(&self, a: &ScoreVector, b: &ScoreVector) -> bool {
            Game::SpaceChem.dominates(a, b)
        }

        fn equivalent(&self, a: &ScoreVector, b: &ScoreVector) -> bool {
            Game::SpaceChem.equivalent(a, b)
        }

        fn file_name(&self, score: &ScoreVector) -> String {
            let dims: Vec<String> = score.dimensions().iter().map(u64::to_string).collect();
            format!("{}.json", dims.join("-"))
        }

        fn puzzle_dir(&self, puzzle: &Puzzle) -> PathBuf {
            Game::SpaceChem.puzzle_dir(puzzle)
        }
    }

    #[tokio::test]
    async fn shared_file_name_is_settled_as_a_tie() {
        let dir = tempfile::tempdir().unwrap();
        let bugged = Solution::with_content(
            puzzle(),
            ScoreVector::new([100, 1, 10]).with_qualifier(Qualifier::Bugged),
            "BUGGED_ARTIFACT",
        );
        let mut frontier = Frontier::empty(&CoarseNames, puzzle(), dir.path());
        assert!(frontier.add(bugged).await.unwrap());

        let precog = ScoreVector::new([100, 1, 10]).with_qualifier(Qualifier::Precognitive);
        let change = frontier
            .insert(Solution::score_only(puzzle(), precog.clone()))
            .await
            .unwrap();
        assert!(!change.inserted());
        assert!(std::fs::read_to_string(dir.path().join("100-1-10.json"))
            .unwrap()
            .contains("BUGGED_ARTIFACT"));

        let change = frontier
            .insert(Solution::with_content(puzzle(), precog, "PRECOG_ARTIFACT"))
            .await
            .unwrap();
        assert!(matches!(change.verdict, Verdict::Accepted { ref displaced } if displaced.len() == 1));
        assert!(change.deleted.is_empty());
        assert_eq!(frontier.len(), 1);
        assert!(frontier.members()[0].score().has(Qualifier::Precognitive));
    }

    #[tokio::test]
    async fn evaluate_does_not_touch_disk() {
        let dir = tempfile::tempdir().unwrap();
        let frontier = seeded(dir.path(), vec![score_only([100, 1, 10])]).await;

        let verdict = frontier.evaluate(&score_only([90, 1, 9]));
        assert!(matches!(verdict, Verdict::Accepted { ref displaced } if displaced.len() == 1));
        assert_eq!(files(dir.path()), vec!["100-1-10.json"]);
    }

    #[tokio::test]
    async fn malformed_member_is_inconsistent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("100-1-10.json"), "not json").unwrap();

        let result = Frontier::load(&Game::SpaceChem, puzzle(), dir.path()).await;
        assert!(matches!(result, Err(FrontierError::Inconsistent { .. })));
    }

    #[tokio::test]
    async fn misnamed_member_is_inconsistent() {
        let dir = tempfile::tempdir().unwrap();
        seeded(dir.path(), vec![score_only([100, 1, 10])]).await;
        std::fs::rename(dir.path().join("100-1-10.json"), dir.path().join("1-1-1.json")).unwrap();

        let result = Frontier::load(&Game::SpaceChem, puzzle(), dir.path()).await;
        assert!(matches!(result, Err(FrontierError::Inconsistent { .. })));
    }

    #[tokio::test]
    async fn member_of_another_puzzle_is_inconsistent() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("1-1-1.json"),
            r#"{"puzzle":"other","score":{"dimensions":[1,1,1]},"content":null}"#,
        )
        .unwrap();

        let result = Frontier::load(&Game::SpaceChem, puzzle(), dir.path()).await;
        assert!(matches!(result, Err(FrontierError::Inconsistent { .. })));
    }

    #[tokio::test]
    async fn stored_dominance_is_inconsistent() {
        let dir = tempfile::tempdir().unwrap();
        for dims in ["1,1,1", "2,2,2"] {
            let name = format!("{}.json", dims.replace(',', "-"));
            std::fs::write(
                dir.path().join(name),
                format!(r#"{{"puzzle":"p","score":{{"dimensions":[{dims}]}},"content":null}}"#),
            )
            .unwrap();
        }

        let result = Frontier::load(&Game::SpaceChem, puzzle(), dir.path()).await;
        assert!(matches!(result, Err(FrontierError::Inconsistent { .. })));
    }

    #[tokio::test]
    async fn non_member_entries_are_ignored() {
        let dir = tempfile::tempdir().unwrap();
        seeded(dir.path(), vec![score_only([100, 1, 10])]).await;
        std::fs::create_dir(dir.path().join("5-5-5.json")).unwrap();
        std::fs::write(dir.path().join("README.md"), "notes").unwrap();

        let frontier = Frontier::load(&Game::SpaceChem, puzzle(), dir.path()).await.unwrap();
        assert_eq!(frontier.len(), 1);
    }

    #[tokio::test]
    async fn write_failure_is_recoverable_io() {
        let dir = tempfile::tempdir().unwrap();
        let mut frontier = seeded(dir.path(), vec![score_only([100, 1, 10])]).await;
        std::fs::create_dir(dir.path().join("95-1-10.json")).unwrap();
        std::fs::write(dir.path().join("95-1-10.json").join("keep"), "").unwrap();

        let err = frontier.insert(score_only([95, 1, 10])).await.unwrap_err();
        assert!(err.is_recoverable());
    }

    #[tokio::test]
    async fn random_sequences_keep_an_antichain() {
        let dir = tempfile::tempdir().unwrap();
        // Deterministic pseudo-random scores via an LCG.
        let mut state: u64 = 0x5EED_F00D;
        let mut next = |bound: u64| {
            state = state.wrapping_mul(6364136223846793005).wrapping_add(1);
            (state >> 33) % bound + 1
        };

        for step in 0..120 {
            let mut frontier = Frontier::load(&Game::SpaceChem, puzzle(), dir.path())
                .await
                .unwrap();
            let dims = [next(30), next(4), next(30)];
            let candidate = if step % 3 == 0 {
                with_content(dims, &format!("step {step}"))
            } else {
                score_only(dims)
            };
            frontier.add(candidate).await.unwrap();

            let reloaded = Frontier::load(&Game::SpaceChem, puzzle(), dir.path())
                .await
                .unwrap();
            assert!(reloaded.is_antichain(), "antichain broken at step {step}");
            assert_eq!(reloaded.len(), files(dir.path()).len());
        }
    }
}
