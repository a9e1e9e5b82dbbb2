//! High-level runtime orchestrator.
//!
//! The runtime owns one worker per live game, wires up command and event
//! channels, and exposes a builder-based API for creating and opening games.

use std::collections::HashMap;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

use tokio::sync::{Mutex, broadcast, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use polity_core::{EngineConfig, GameEngine, GameState, UpdatedAtPolicy};

use crate::api::{GameHandle, Result, RuntimeError};
use crate::events::{Event, EventBus, Topic};
use crate::repository::{
    AuditLog, FileAuditLog, FileGameRepository, GameRepository, InMemoryAuditLog,
    InMemoryGameRepo, RepositoryError, StoredGame,
};
use crate::workers::GameWorker;

/// Runtime configuration shared across the orchestrator and workers.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    pub engine: EngineConfig,
    /// Root for file-backed storage. `None` keeps everything in memory.
    pub data_dir: Option<PathBuf>,
    pub event_buffer_size: usize,
    pub command_buffer_size: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            engine: EngineConfig::default(),
            data_dir: None,
            event_buffer_size: 100,
            command_buffer_size: 32,
        }
    }
}

impl RuntimeConfig {
    pub const DATA_DIR_ENV: &'static str = "POLITY_DATA_DIR";
    pub const COMMAND_BUFFER_ENV: &'static str = "POLITY_COMMAND_BUFFER";
    pub const EVENT_BUFFER_ENV: &'static str = "POLITY_EVENT_BUFFER";
    pub const UPDATED_AT_ENV: &'static str = "POLITY_UPDATED_AT";
    pub const BASE_EPOCH_ENV: &'static str = "POLITY_BASE_EPOCH_MS";

    /// Defaults overridden by any `POLITY_*` environment variables that are set.
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(dir) = env::var_os(Self::DATA_DIR_ENV).filter(|dir| !dir.is_empty()) {
            config.data_dir = Some(PathBuf::from(dir));
        }
        if let Some(size) = read_env(Self::COMMAND_BUFFER_ENV)? {
            config.command_buffer_size = size;
        }
        if let Some(size) = read_env(Self::EVENT_BUFFER_ENV)? {
            config.event_buffer_size = size;
        }
        if let Some(policy) = read_env::<UpdatedAtPolicy>(Self::UPDATED_AT_ENV)? {
            config.engine.updated_at = policy;
        }
        if let Some(base) = read_env(Self::BASE_EPOCH_ENV)? {
            config.engine.base_epoch_ms = base;
        }

        Ok(config)
    }

    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = Some(dir.into());
        self
    }

    pub fn with_engine(mut self, engine: EngineConfig) -> Self {
        self.engine = engine;
        self
    }
}

fn read_env<T: FromStr>(key: &'static str) -> Result<Option<T>> {
    match env::var(key) {
        Ok(value) if value.trim().is_empty() => Ok(None),
        Ok(value) => value
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| RuntimeError::InvalidConfig { key, value }),
        Err(env::VarError::NotPresent) => Ok(None),
        Err(env::VarError::NotUnicode(raw)) => Err(RuntimeError::InvalidConfig {
            key,
            value: raw.to_string_lossy().into_owned(),
        }),
    }
}

struct WorkerSlot {
    handle: GameHandle,
    join: JoinHandle<()>,
}

/// Main runtime that hosts game workers
///
/// Design: Runtime owns workers and the registry keyed by game id.
/// [`GameHandle`] provides a cloneable façade per game.
pub struct Runtime {
    config: RuntimeConfig,
    engine: Arc<GameEngine>,
    repository: Arc<dyn GameRepository>,
    audit_log: Arc<dyn AuditLog>,
    event_bus: EventBus,
    workers: Mutex<HashMap<String, WorkerSlot>>,
}

impl Runtime {
    /// Create a new runtime builder
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    pub fn engine(&self) -> &GameEngine {
        &self.engine
    }

    pub fn repository(&self) -> &Arc<dyn GameRepository> {
        &self.repository
    }

    pub fn audit_log(&self) -> &Arc<dyn AuditLog> {
        &self.audit_log
    }

    /// Store `state` as a new game at step `0` and start its worker.
    pub async fn create_game(&self, state: GameState) -> Result<GameHandle> {
        let stored = StoredGame::initial(state).map_err(RuntimeError::Digest)?;

        let mut workers = self.workers.lock().await;
        self.repository.create(&stored)?;
        info!(target: "runtime", game_id = stored.game_id(), digest = %stored.digest, "game created");

        Ok(self.spawn_worker(&mut workers, stored))
    }

    /// Handle to an existing game, starting its worker from the repository if
    /// it is not already running.
    pub async fn game(&self, game_id: &str) -> Result<GameHandle> {
        let mut workers = self.workers.lock().await;

        if let Some(slot) = workers.get(game_id)
            && !slot.join.is_finished()
        {
            return Ok(slot.handle.clone());
        }

        let stored = self
            .repository
            .load(game_id)?
            .ok_or_else(|| RuntimeError::GameNotFound {
                game_id: game_id.to_string(),
            })?;
        debug!(target: "runtime", game_id, step = stored.step, "resuming game");

        Ok(self.spawn_worker(&mut workers, stored))
    }

    /// Ids of every stored game, running or not.
    pub fn list_games(&self) -> Result<Vec<String>> {
        Ok(self.repository.list_ids()?)
    }

    /// Subscribe to events from every game on `topic`.
    pub fn subscribe(&self, topic: Topic) -> broadcast::Receiver<Event> {
        self.event_bus.subscribe(topic)
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.event_bus
    }

    /// Stop every worker and wait for it to finish its current command.
    pub async fn shutdown(self) -> Result<()> {
        let workers = self.workers.into_inner();

        for slot in workers.values() {
            slot.handle.shutdown().await;
        }
        for (game_id, slot) in workers {
            slot.join.await.map_err(RuntimeError::WorkerJoin)?;
            debug!(target: "runtime", %game_id, "worker joined");
        }

        Ok(())
    }

    fn spawn_worker(
        &self,
        workers: &mut HashMap<String, WorkerSlot>,
        stored: StoredGame,
    ) -> GameHandle {
        let game_id = stored.game_id().to_string();
        let (command_tx, command_rx) = mpsc::channel(self.config.command_buffer_size.max(1));

        let worker = GameWorker::new(
            stored,
            Arc::clone(&self.engine),
            Arc::clone(&self.repository),
            Arc::clone(&self.audit_log),
            self.event_bus.clone(),
            command_rx,
        );
        let join = tokio::spawn(worker.run());

        let handle = GameHandle::new(&game_id, command_tx, self.event_bus.clone());
        workers.insert(
            game_id,
            WorkerSlot {
                handle: handle.clone(),
                join,
            },
        );
        handle
    }
}

/// Builder for [`Runtime`] with flexible configuration.
pub struct RuntimeBuilder {
    config: RuntimeConfig,
    repository: Option<Arc<dyn GameRepository>>,
    audit_log: Option<Arc<dyn AuditLog>>,
}

impl RuntimeBuilder {
    fn new() -> Self {
        Self {
            config: RuntimeConfig::default(),
            repository: None,
            audit_log: None,
        }
    }

    /// Override runtime configuration
    pub fn config(mut self, config: RuntimeConfig) -> Self {
        self.config = config;
        self
    }

    /// Use a specific game repository instead of the one implied by `data_dir`.
    pub fn repository(mut self, repository: impl GameRepository + 'static) -> Self {
        self.repository = Some(Arc::new(repository));
        self
    }

    /// Use a specific audit log instead of the one implied by `data_dir`.
    pub fn audit_log(mut self, audit_log: impl AuditLog + 'static) -> Self {
        self.audit_log = Some(Arc::new(audit_log));
        self
    }

    /// Build the runtime.
    ///
    /// Storage not supplied explicitly is file-backed under
    /// `data_dir/games` and `data_dir/audit` when a data directory is
    /// configured, and in-memory otherwise.
    pub fn build(self) -> Result<Runtime> {
        let RuntimeBuilder {
            config,
            repository,
            audit_log,
        } = self;

        let repository = match repository {
            Some(repository) => repository,
            None => default_repository(&config)?,
        };
        let audit_log = match audit_log {
            Some(audit_log) => audit_log,
            None => default_audit_log(&config)?,
        };

        info!(
            target: "runtime",
            data_dir = ?config.data_dir,
            updated_at = %config.engine.updated_at,
            "runtime built"
        );

        Ok(Runtime {
            engine: Arc::new(GameEngine::new(config.engine.clone())),
            event_bus: EventBus::with_capacity(config.event_buffer_size),
            workers: Mutex::new(HashMap::new()),
            repository,
            audit_log,
            config,
        })
    }
}

fn default_repository(config: &RuntimeConfig) -> std::result::Result<Arc<dyn GameRepository>, RepositoryError> {
    Ok(match &config.data_dir {
        Some(dir) => Arc::new(FileGameRepository::new(dir.join("games"))?),
        None => Arc::new(InMemoryGameRepo::new()),
    })
}

fn default_audit_log(config: &RuntimeConfig) -> std::result::Result<Arc<dyn AuditLog>, RepositoryError> {
    Ok(match &config.data_dir {
        Some(dir) => Arc::new(FileAuditLog::new(dir.join("audit"))?),
        None => Arc::new(InMemoryAuditLog::new()),
    })
}
