//! Frontier Archive CLI
//!
//! The `frontier-archive` command records puzzle solutions into per-game git
//! stores, keeping only the non-dominated ones.
//!
//! ## Commands
//!
//! - `archive`: Submit a solution
//! - `show`: List a puzzle's frontier
//! - `link`: Print the public link of a score's file
//! - `drain`: Take every store lock and hold it until Ctrl-C

use anyhow::{anyhow, Context, Result};
use clap::{Parser, Subcommand};
use std::future::Future;
use std::path::{Path, PathBuf};
use tracing::{info, Level};

use frontier_core::{
    ArchiveConfig, ArchiveOutcome, ArchiveRegistry, ArchiveService, Game, Puzzle, ScoreVector, ShutdownMode,
    Solution, METRICS,
};

#[derive(Parser)]
#[command(name = "frontier-archive")]
#[command(author = "Frontier Archive Maintainers")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Pareto-frontier solution archive", long_about = None)]
struct Cli {
    /// Configuration file listing one store per game
    #[arg(short, long, global = true, env = "FRONTIER_CONFIG", default_value = "frontier.toml")]
    config: PathBuf,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit JSON-formatted log lines
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Identifies one puzzle.
#[derive(clap::Args, Debug)]
struct PuzzleArgs {
    /// Game the puzzle belongs to (space_chem, shenzhen_io, infinifactory)
    #[arg(short, long)]
    game: Game,

    /// Puzzle group (directory under the store root)
    #[arg(long)]
    group: String,

    /// Puzzle identifier
    #[arg(short, long)]
    puzzle: String,

    /// Human-readable puzzle name used in commit messages
    #[arg(long)]
    display: Option<String>,

    /// The puzzle has random inputs
    #[arg(long)]
    nondeterministic: bool,
}

impl PuzzleArgs {
    fn to_puzzle(&self) -> Result<Puzzle> {
        let mut puzzle = Puzzle::new(self.game, &self.group, &self.puzzle)?;
        if let Some(display) = &self.display {
            puzzle = puzzle.with_display_name(display);
        }
        if self.nondeterministic {
            puzzle = puzzle.nondeterministic();
        }
        Ok(puzzle)
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Submit a solution to its puzzle's frontier
    Archive {
        #[command(flatten)]
        puzzle: PuzzleArgs,

        /// Score, e.g. `100/1/10` or `100/1/10/B`
        #[arg(short, long)]
        score: ScoreVector,

        /// Solution file; omit for a score-only entry
        #[arg(long)]
        content: Option<PathBuf>,

        /// Fail instead of waiting when the store is busy
        #[arg(long)]
        no_wait: bool,
    },

    /// List the current frontier of a puzzle
    Show {
        #[command(flatten)]
        puzzle: PuzzleArgs,

        /// Print members as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the raw-file link a score is archived under
    Link {
        #[command(flatten)]
        puzzle: PuzzleArgs,

        #[arg(short, long)]
        score: ScoreVector,
    },

    /// Lock every configured store until interrupted
    Drain {
        /// Return without waiting for in-flight archives
        #[arg(long)]
        immediate: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    frontier_core::init_tracing(cli.json_logs, level);

    let config = ArchiveConfig::load(&cli.config)
        .with_context(|| format!("Failed to load config {}", cli.config.display()))?;
    let registry =
        ArchiveRegistry::from_config(&config).context("Failed to open archive stores")?;

    let result = match cli.command {
        Commands::Archive {
            puzzle,
            score,
            content,
            no_wait,
        } => cmd_archive(&registry, &puzzle, score, content.as_deref(), no_wait).await,
        Commands::Show { puzzle, json } => cmd_show(&registry, &puzzle, json).await,
        Commands::Link { puzzle, score } => cmd_link(&registry, &puzzle, &score).await,
        Commands::Drain { immediate } => {
            cmd_drain(&registry, immediate, tokio::signal::ctrl_c()).await
        }
    };

    METRICS.flush();
    result
}

fn service(registry: &ArchiveRegistry, game: Game) -> Result<&ArchiveService> {
    registry
        .service(game)
        .ok_or_else(|| anyhow!("no store configured for {game}"))
}

/// Submit one solution and print the links or the failure summary
async fn cmd_archive(
    registry: &ArchiveRegistry,
    args: &PuzzleArgs,
    score: ScoreVector,
    content_path: Option<&Path>,
    no_wait: bool,
) -> Result<()> {
    let puzzle = args.to_puzzle()?;
    let content = content_path
        .map(|path| {
            std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read solution file {}", path.display()))
        })
        .transpose()?;
    let solution = Solution::new(puzzle, score, content);

    let service = service(registry, solution.puzzle().game())?;
    let result = if no_wait {
        match service.try_archive(&solution).await {
            Ok(None) => return Err(anyhow!("store {} is busy", service.access().name())),
            other => other.map(Option::unwrap_or_default),
        }
    } else {
        service.archive(&solution).await
    };

    let outcome = ArchiveOutcome { solution, result };
    println!("{}", outcome.summary());
    outcome.result?;
    Ok(())
}

/// Print every member of a puzzle's frontier
async fn cmd_show(registry: &ArchiveRegistry, args: &PuzzleArgs, json: bool) -> Result<()> {
    let puzzle = args.to_puzzle()?;
    let members = service(registry, puzzle.game())?
        .frontier(&puzzle)
        .await
        .with_context(|| format!("Failed to load frontier of {puzzle}"))?;

    if json {
        let rows: Vec<serde_json::Value> = members
            .iter()
            .map(|m| {
                serde_json::json!({
                    "score": m.score(),
                    "content_digest": m.content_digest(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rows)?);
        return Ok(());
    }

    if members.is_empty() {
        println!("No solutions archived for {puzzle}");
        return Ok(());
    }
    println!("{} ({} members)", puzzle, members.len());
    for member in &members {
        let kind = if member.is_score_only() {
            "score only"
        } else {
            "with solution"
        };
        println!("  {:<16} {}", member.score().to_string(), kind);
    }
    Ok(())
}

async fn cmd_link(registry: &ArchiveRegistry, args: &PuzzleArgs, score: &ScoreVector) -> Result<()> {
    let puzzle = args.to_puzzle()?;
    let link = service(registry, puzzle.game())?
        .archive_link(&puzzle, score)
        .await?;
    println!("{link}");
    Ok(())
}

/// Take every store lock, report which stores are drained, and keep them
/// locked until `release` completes
async fn cmd_drain<F>(registry: &ArchiveRegistry, immediate: bool, release: F) -> Result<()>
where
    F: Future<Output = std::io::Result<()>>,
{
    let mode = if immediate {
        ShutdownMode::Immediate
    } else {
        ShutdownMode::Graceful
    };
    let guards = registry.drain(mode).await.context("Failed to drain stores")?;
    info!(stores = guards.len(), ?mode, "drain complete");

    if guards.is_empty() {
        println!("No stores drained");
        return Ok(());
    }
    for guard in &guards {
        println!("Drained {}", guard.store());
    }

    println!("Holding store locks, press Ctrl-C to release");
    release.await.context("Failed to wait for release signal")?;
    drop(guards);
    info!("store locks released");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;
    use frontier_store::fixture::ScratchRepo;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_archive_arguments() {
        let cli = Cli::try_parse_from([
            "frontier-archive",
            "--config",
            "/etc/frontier.toml",
            "archive",
            "--game",
            "sc",
            "--group",
            "main",
            "--puzzle",
            "p",
            "--score",
            "100/1/10/B",
        ])
        .unwrap();

        assert_eq!(cli.config, PathBuf::from("/etc/frontier.toml"));
        match cli.command {
            Commands::Archive {
                puzzle,
                score,
                content,
                no_wait,
            } => {
                assert_eq!(puzzle.game, Game::SpaceChem);
                assert_eq!(score.to_string(), "100/1/10/B");
                assert!(content.is_none());
                assert!(!no_wait);
            }
            _ => panic!("expected archive"),
        }
    }

    #[test]
    fn rejects_malformed_score() {
        let result = Cli::try_parse_from([
            "frontier-archive",
            "link",
            "--game",
            "space_chem",
            "--group",
            "main",
            "--puzzle",
            "p",
            "--score",
            "fast",
        ]);
        assert!(result.is_err());
    }

    fn registry(repo: &ScratchRepo) -> ArchiveRegistry {
        let text = format!(
            "[[store]]\ngame = \"space_chem\"\npath = {:?}\n",
            repo.work_dir().display().to_string()
        );
        ArchiveRegistry::from_config(&ArchiveConfig::from_toml_str(&text).unwrap()).unwrap()
    }

    fn puzzle_args(game: Game) -> PuzzleArgs {
        PuzzleArgs {
            game,
            group: "main".to_string(),
            puzzle: "p".to_string(),
            display: Some("Pancakes".to_string()),
            nondeterministic: false,
        }
    }

    #[tokio::test]
    async fn archive_then_show() {
        let repo = ScratchRepo::new().unwrap();
        let registry = registry(&repo);
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("solution.txt");
        std::fs::write(&file, "SOLUTION:Pancakes\n").unwrap();

        let args = puzzle_args(Game::SpaceChem);
        cmd_archive(&registry, &args, "100/1/10".parse().unwrap(), Some(file.as_path()), false)
            .await
            .unwrap();
        assert!(repo.read("main/p/100-1-10.json").contains("SOLUTION:Pancakes"));

        cmd_show(&registry, &args, false).await.unwrap();
        cmd_show(&registry, &args, true).await.unwrap();
    }

    #[tokio::test]
    async fn no_wait_fails_while_drained() {
        let repo = ScratchRepo::new().unwrap();
        let registry = registry(&repo);
        let guards = registry.drain(ShutdownMode::Graceful).await.unwrap();

        let args = puzzle_args(Game::SpaceChem);
        let err = cmd_archive(&registry, &args, "1/1/1".parse().unwrap(), None, true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("busy"));
        drop(guards);
    }

    #[tokio::test]
    async fn no_wait_archives_when_free() {
        let repo = ScratchRepo::new().unwrap();
        let registry = registry(&repo);

        let args = puzzle_args(Game::SpaceChem);
        cmd_archive(&registry, &args, "100/1/10".parse().unwrap(), None, true)
            .await
            .unwrap();
        assert!(repo.work_dir().join("main/p/100-1-10.json").exists());
        assert!(registry
            .service(Game::SpaceChem)
            .unwrap()
            .access()
            .try_access()
            .unwrap()
            .is_some());
    }

    #[tokio::test]
    async fn drain_locks_out_other_registries_until_released() {
        let repo = ScratchRepo::new().unwrap();
        let drainer = registry(&repo);
        let other = registry(&repo);
        let (release_tx, release_rx) = tokio::sync::oneshot::channel::<()>();

        let drain = tokio::spawn(async move {
            let release = async move {
                let _ = release_rx.await;
                Ok::<(), std::io::Error>(())
            };
            cmd_drain(&drainer, false, release).await
        });

        let manager = other.service(Game::SpaceChem).unwrap().access().clone();
        let mut locked = false;
        for _ in 0..200 {
            if manager.try_access().unwrap().is_none() {
                locked = true;
                break;
            }
            tokio::time::sleep(std::time::Duration::from_millis(10)).await;
        }
        assert!(locked, "drain never took the store lock");

        let args = puzzle_args(Game::SpaceChem);
        let err = cmd_archive(&other, &args, "1/1/1".parse().unwrap(), None, true)
            .await
            .unwrap_err();
        assert!(err.to_string().contains("busy"));

        release_tx.send(()).unwrap();
        drain.await.unwrap().unwrap();

        cmd_archive(&other, &args, "1/1/1".parse().unwrap(), None, true)
            .await
            .unwrap();
        assert!(repo.work_dir().join("main/p/1-1-1.json").exists());
    }

    #[tokio::test]
    async fn immediate_drain_returns_at_once() {
        let repo = ScratchRepo::new().unwrap();
        let registry = registry(&repo);
        cmd_drain(&registry, true, std::future::pending()).await.unwrap();
    }

    #[tokio::test]
    async fn unconfigured_game_is_an_error() {
        let repo = ScratchRepo::new().unwrap();
        let registry = registry(&repo);
        let args = puzzle_args(Game::Infinifactory);
        let err = cmd_link(&registry, &args, &"1/1/1".parse().unwrap())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("Infinifactory"));
    }
}
