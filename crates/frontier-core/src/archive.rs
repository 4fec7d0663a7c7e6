//! The archive pipeline: lock → load frontier → insert → commit or roll back.

use std::path::{Path, PathBuf};

use frontier_store::{AccessScope, RepositoryAccessManager};
use tracing::Instrument;

use crate::error::{ArchiveError, ArchiveResult, FrontierError};
use crate::frontier::{Frontier, FrontierChange, FrontierPolicy, Verdict};
use crate::game::Game;
use crate::metrics::METRICS;
use crate::obs;
use crate::puzzle::Puzzle;
use crate::score::ScoreVector;
use crate::solution::Solution;

/// Archives solutions of one game into one versioned store.
#[derive(Debug, Clone)]
pub struct ArchiveService {
    game: Game,
    access: RepositoryAccessManager,
}

/// One element of [`ArchiveService::archive_all`].
#[derive(Debug)]
pub struct ArchiveOutcome {
    pub solution: Solution,
    pub result: ArchiveResult<Vec<String>>,
}

impl ArchiveOutcome {
    /// `true` when the solution changed the archive.
    pub fn is_archived(&self) -> bool {
        matches!(&self.result, Ok(links) if !links.is_empty())
    }

    /// Human-readable result line.
    pub fn summary(&self) -> String {
        let puzzle = self.solution.puzzle().display_name();
        let score = self.solution.score();
        match &self.result {
            Ok(links) if !links.is_empty() => format!(
                "Success: *{puzzle}* {}\n`{score}` has been archived.",
                links.join(", ")
            ),
            Ok(_) => format!("Failure: *{puzzle}*\n`{score}` did not qualify for archiving."),
            Err(err) => format!("Failure: *{puzzle}*\n`{score}` could not be archived: {err}"),
        }
    }
}

fn file_link(origin: &str, relative: &str) -> String {
    let name = relative.rsplit('/').next().unwrap_or(relative);
    format!("[{name}]({origin}/{relative})")
}

impl ArchiveService {
    pub fn new(game: Game, access: RepositoryAccessManager) -> Self {
        Self { game, access }
    }

    pub fn game(&self) -> Game {
        self.game
    }

    pub fn access(&self) -> &RepositoryAccessManager {
        &self.access
    }

    /// Archive `solution`, returning links to what changed.
    ///
    /// The first link points at the new revision, the rest at each added or
    /// changed file. An empty list means the solution did not change the
    /// frontier (dominated, tied, or byte-identical), or that a recoverable
    /// I/O failure was rolled back.
    ///
    /// Once the lock is taken the work runs on its own task and keeps the
    /// scope until it commits or rolls back, even if this future is dropped.
    pub async fn archive(&self, solution: &Solution) -> ArchiveResult<Vec<String>> {
        self.check(solution)?;

        let span = self.span(solution);
        async {
            let scope = self.access.access().await?;
            self.run_locked(scope, solution).await
        }
        .instrument(span)
        .await
    }

    /// [`archive`](Self::archive) without waiting: `None` when another
    /// writer holds the store.
    pub async fn try_archive(&self, solution: &Solution) -> ArchiveResult<Option<Vec<String>>> {
        self.check(solution)?;

        let span = self.span(solution);
        async {
            match self.access.try_access()? {
                Some(scope) => self.run_locked(scope, solution).await.map(Some),
                None => {
                    obs::emit_store_busy(self.access.name());
                    Ok(None)
                }
            }
        }
        .instrument(span)
        .await
    }

    fn span(&self, solution: &Solution) -> tracing::Span {
        obs::archive_span(
            self.game.id(),
            solution.puzzle().name(),
            &solution.score().to_string(),
        )
    }

    async fn run_locked(&self, scope: AccessScope, solution: &Solution) -> ArchiveResult<Vec<String>> {
        let service = self.clone();
        let solution = solution.clone();
        let task = tokio::spawn(
            async move {
                obs::emit_archive_started(scope.store_name(), solution.content_digest().as_deref());
                service.perform_archive(&scope, &solution).await
            }
            .in_current_span(),
        );

        match task.await {
            Ok(result) => result,
            Err(err) if err.is_panic() => std::panic::resume_unwind(err.into_panic()),
            Err(err) => Err(ArchiveError::Aborted(err.to_string())),
        }
    }

    /// Archive each solution in order. A failing element does not stop the batch.
    pub async fn archive_all(&self, solutions: &[Solution]) -> Vec<ArchiveOutcome> {
        let mut outcomes = Vec::with_capacity(solutions.len());
        for solution in solutions {
            let result = self.archive(solution).await;
            outcomes.push(ArchiveOutcome {
                solution: solution.clone(),
                result,
            });
        }
        outcomes
    }

    /// Current frontier of `puzzle`, read under the store lock.
    pub async fn frontier(&self, puzzle: &Puzzle) -> ArchiveResult<Vec<Solution>> {
        self.check_puzzle(puzzle)?;
        let scope = self.access.access().await?;
        let dir = self.puzzle_dir(&scope, puzzle);
        let frontier = Frontier::load(&self.game, puzzle.clone(), dir).await?;
        Ok(frontier.members().to_vec())
    }

    /// Public raw-file link where `score`'s file for `puzzle` lives once archived.
    pub async fn archive_link(&self, puzzle: &Puzzle, score: &ScoreVector) -> ArchiveResult<String> {
        self.check_puzzle(puzzle)?;
        let base = self.access.store().raw_file_base_url().await?;
        Ok(format!(
            "{base}/{}/{}/{}",
            puzzle.group(),
            puzzle.name(),
            self.game.file_name(score)
        ))
    }

    /// Absolute working-tree path of `score`'s file for `puzzle`.
    pub async fn archive_path(&self, puzzle: &Puzzle, score: &ScoreVector) -> ArchiveResult<PathBuf> {
        let relative = self.game.puzzle_dir(puzzle).join(self.game.file_name(score));
        let path = self
            .access
            .access_with(|scope| async move { scope.working_dir().join(relative) })
            .await?;
        Ok(path)
    }

    fn check(&self, solution: &Solution) -> ArchiveResult<()> {
        self.check_puzzle(solution.puzzle())?;
        solution.validate()?;
        Ok(())
    }

    fn check_puzzle(&self, puzzle: &Puzzle) -> ArchiveResult<()> {
        if puzzle.game() != self.game {
            return Err(ArchiveError::UnknownGame(puzzle.game()));
        }
        Ok(())
    }

    fn puzzle_dir(&self, scope: &AccessScope, puzzle: &Puzzle) -> PathBuf {
        scope.working_dir().join(self.game.puzzle_dir(puzzle))
    }

    async fn apply(&self, puzzle_dir: &Path, solution: &Solution) -> Result<FrontierChange, FrontierError> {
        let mut frontier = Frontier::load(&self.game, solution.puzzle().clone(), puzzle_dir).await?;
        frontier.insert(solution.clone()).await
    }

    async fn perform_archive(&self, scope: &AccessScope, solution: &Solution) -> ArchiveResult<Vec<String>> {
        let puzzle_dir = self.puzzle_dir(scope, solution.puzzle());

        let change = match self.apply(&puzzle_dir, solution).await {
            Ok(change) => change,
            Err(err) => {
                // The failure may have come after files were touched.
                scope.reset_and_clean(&puzzle_dir).await?;
                obs::emit_archive_rolled_back(&err);
                METRICS.inc_rolled_back();
                if err.is_recoverable() {
                    return Ok(Vec::new());
                }
                return Err(err.into());
            }
        };

        let displaced = match &change.verdict {
            Verdict::Rejected { by } => {
                obs::emit_archive_rejected(&by.to_string());
                METRICS.inc_rejected();
                return Ok(Vec::new());
            }
            Verdict::Accepted { displaced } => displaced.len(),
        };

        if scope.status(&puzzle_dir).await?.is_clean() {
            obs::emit_archive_unchanged();
            METRICS.inc_unchanged();
            return Ok(Vec::new());
        }

        match self.commit(scope, &puzzle_dir, solution).await {
            Ok((revision, links)) => {
                obs::emit_archive_committed(&revision, displaced, links.len() - 1);
                METRICS.inc_archived();
                Ok(links)
            }
            Err(err) => {
                if let Err(reset_err) = scope.reset_and_clean(&puzzle_dir).await {
                    obs::emit_rollback_failed(&reset_err);
                }
                obs::emit_archive_rolled_back(&err);
                METRICS.inc_rolled_back();
                Err(err)
            }
        }
    }

    async fn commit(
        &self,
        scope: &AccessScope,
        puzzle_dir: &Path,
        solution: &Solution,
    ) -> ArchiveResult<(String, Vec<String>)> {
        scope.stage_all(puzzle_dir).await?;
        let status = scope.status(puzzle_dir).await?;
        let origin = scope.origin_url().await?;

        let mut links: Vec<String> = status
            .changed
            .iter()
            .chain(status.added.iter())
            .map(|f| file_link(&origin, f))
            .collect();

        let message = format!(
            "Added {} for {}",
            solution.score(),
            solution.puzzle().display_name()
        );
        let revision = scope.commit_and_push(&message).await?;
        links.insert(0, format!("[commit]({origin}/{revision})"));

        Ok((revision.to_string(), links))
    }
}
