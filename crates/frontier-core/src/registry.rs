//! One [`ArchiveService`] per configured game.

use std::collections::BTreeMap;
use std::sync::Arc;

use frontier_store::{drain_all, DrainGuard, GitStore, RepositoryAccessManager, ShutdownMode};
use tracing::info;

use crate::archive::ArchiveService;
use crate::config::ArchiveConfig;
use crate::error::{ArchiveError, ArchiveResult};
use crate::game::Game;
use crate::solution::Solution;

#[derive(Debug, Clone, Default)]
pub struct ArchiveRegistry {
    services: BTreeMap<Game, ArchiveService>,
}

impl ArchiveRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Open every configured git store.
    pub fn from_config(config: &ArchiveConfig) -> ArchiveResult<Self> {
        let mut registry = Self::new();
        for store in &config.stores {
            let git = GitStore::open(store.git_config())?;
            let access = RepositoryAccessManager::new(store.game.id(), Arc::new(git));
            registry.insert(ArchiveService::new(store.game, access));
            info!(game = %store.game, path = %store.path.display(), "store opened");
        }
        Ok(registry)
    }

    /// Register `service`, replacing any previous service for its game.
    pub fn insert(&mut self, service: ArchiveService) -> Option<ArchiveService> {
        self.services.insert(service.game(), service)
    }

    pub fn service(&self, game: Game) -> Option<&ArchiveService> {
        self.services.get(&game)
    }

    pub fn games(&self) -> impl Iterator<Item = Game> + '_ {
        self.services.keys().copied()
    }

    /// Archive `solution` into the store of its puzzle's game.
    pub async fn archive(&self, solution: &Solution) -> ArchiveResult<Vec<String>> {
        let game = solution.puzzle().game();
        let service = self.service(game).ok_or(ArchiveError::UnknownGame(game))?;
        service.archive(solution).await
    }

    pub fn managers(&self) -> Vec<RepositoryAccessManager> {
        self.services.values().map(|s| s.access().clone()).collect()
    }

    /// Drain every store. The guards keep all writers out, in this process
    /// and others, until dropped.
    pub async fn drain(&self, mode: ShutdownMode) -> ArchiveResult<Vec<DrainGuard>> {
        Ok(drain_all(&self.managers(), mode).await?)
    }
}
