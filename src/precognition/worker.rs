//! Background worker that keeps the path cache warm
//!
//! The worker owns the cache and its battlefield snapshot outright. The
//! foreground only talks to it through [`Command`]s. Between commands it
//! refreshes one dirty unit at a time. Enumeration runs on the blocking
//! pool so the worker never stalls the runtime it shares.

use std::sync::Arc;

use serde::Serialize;
use tokio::sync::mpsc::error::TryRecvError;
use tokio::sync::{mpsc, oneshot};

use crate::board::{Facing, HexCoord};
use crate::core::error::{Result, TacticsError};
use crate::core::types::{PlayerId, Round, UnitId};
use crate::movement::{MovePath, PathEnumerator};
use crate::precognition::cache::{CachedPaths, PathCache};
use crate::precognition::handle::PrecognitionHandle;
use crate::units::Battlefield;

/// Commands buffered before senders wait
const COMMAND_BUFFER: usize = 64;

pub enum Command {
    /// Replace the snapshot; every unit of the owner is refreshed
    SyncBattlefield { battlefield: Arc<Battlefield> },
    UnitMoved {
        unit: UnitId,
        to: HexCoord,
        facing: Facing,
        hexes_moved: u32,
    },
    UnitRemoved { unit: UnitId },
    /// Up-to-date candidates for one unit, enumerating now if needed
    EnsureFresh {
        unit: UnitId,
        reply: oneshot::Sender<Result<Arc<Vec<MovePath>>>>,
    },
    /// Current candidates if cached and clean; never enumerates
    Peek {
        unit: UnitId,
        reply: oneshot::Sender<Option<Arc<Vec<MovePath>>>>,
    },
    /// Stop background work; the reply confirms no refresh is running
    Pause { reply: oneshot::Sender<()> },
    Resume,
    Status { reply: oneshot::Sender<PrecognitionStatus> },
    Shutdown { reply: oneshot::Sender<()> },
}

/// Snapshot of what the worker is doing
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PrecognitionStatus {
    pub cached_units: usize,
    pub dirty_units: usize,
    pub paused: bool,
    pub refreshes: u64,
    pub round: Round,
}

pub struct Precognition {
    owner: PlayerId,
    battlefield: Arc<Battlefield>,
    enumerator: Arc<PathEnumerator>,
    cache: PathCache,
    paused: bool,
    refreshes: u64,
    command_rx: mpsc::Receiver<Command>,
}

impl Precognition {
    /// Start the worker on the current tokio runtime
    ///
    /// Every selectable unit of `owner` starts dirty, so the cache fills in
    /// the background right away.
    pub fn spawn(
        battlefield: Arc<Battlefield>,
        enumerator: Arc<PathEnumerator>,
        owner: PlayerId,
    ) -> PrecognitionHandle {
        let (command_tx, command_rx) = mpsc::channel(COMMAND_BUFFER);
        let mut worker = Self {
            owner,
            battlefield,
            enumerator,
            cache: PathCache::new(),
            paused: false,
            refreshes: 0,
            command_rx,
        };
        worker.dirty_owned_units();
        tokio::spawn(worker.run());
        PrecognitionHandle::new(command_tx)
    }

    /// Main worker loop
    async fn run(mut self) {
        tracing::debug!(owner = %self.owner, "precognition started");
        loop {
            // commands first
            loop {
                match self.command_rx.try_recv() {
                    Ok(cmd) => {
                        if !self.handle_command(cmd).await {
                            return;
                        }
                    }
                    Err(TryRecvError::Empty) => break,
                    Err(TryRecvError::Disconnected) => return,
                }
            }

            if !self.paused {
                if let Some(unit) = self.cache.next_dirty() {
                    self.refresh(unit).await;
                    continue;
                }
            }

            match self.command_rx.recv().await {
                Some(cmd) => {
                    if !self.handle_command(cmd).await {
                        return;
                    }
                }
                None => return,
            }
        }
    }

    /// Returns false once the worker should stop
    async fn handle_command(&mut self, cmd: Command) -> bool {
        match cmd {
            Command::SyncBattlefield { battlefield } => {
                self.battlefield = battlefield;
                self.cache.retain_present(&self.battlefield);
                self.dirty_owned_units();
            }
            Command::UnitMoved {
                unit,
                to,
                facing,
                hexes_moved,
            } => {
                let field = Arc::make_mut(&mut self.battlefield);
                match field.move_unit(unit, to, facing, hexes_moved) {
                    Some(from) => self.cache.unit_moved(&self.battlefield, unit, from, to),
                    None => tracing::debug!(unit = %unit, "moved unit not on battlefield"),
                }
            }
            Command::UnitRemoved { unit } => {
                Arc::make_mut(&mut self.battlefield).remove_unit(unit);
                self.cache.remove(unit);
            }
            Command::EnsureFresh { unit, reply } => {
                let _ = reply.send(self.ensure_fresh(unit).await);
            }
            Command::Peek { unit, reply } => {
                let _ = reply.send(self.cache.fresh(unit));
            }
            Command::Pause { reply } => {
                self.paused = true;
                let _ = reply.send(());
            }
            Command::Resume => {
                self.paused = false;
            }
            Command::Status { reply } => {
                let _ = reply.send(self.status());
            }
            Command::Shutdown { reply } => {
                tracing::debug!(owner = %self.owner, refreshes = self.refreshes, "precognition stopped");
                let _ = reply.send(());
                return false;
            }
        }
        true
    }

    fn dirty_owned_units(&mut self) {
        for unit in self.battlefield.units() {
            if unit.owner == self.owner && unit.selectable && unit.is_active() {
                self.cache.mark_dirty(unit.id);
            }
        }
    }

    async fn ensure_fresh(&mut self, unit: UnitId) -> Result<Arc<Vec<MovePath>>> {
        if let Some(paths) = self.cache.fresh(unit) {
            return Ok(paths);
        }
        self.refresh(unit)
            .await
            .ok_or(TacticsError::UnitNotFound(unit))
    }

    /// Enumerate one unit into the cache
    async fn refresh(&mut self, id: UnitId) -> Option<Arc<Vec<MovePath>>> {
        if self.battlefield.unit(id).is_none() {
            self.cache.remove(id);
            return None;
        }
        let battlefield = Arc::clone(&self.battlefield);
        let enumerator = Arc::clone(&self.enumerator);
        let enumerated = tokio::task::spawn_blocking(move || {
            battlefield
                .unit(id)
                .map(|unit| enumerator.enumerate(unit, &battlefield))
        })
        .await;
        let result = match enumerated {
            Ok(Some(result)) => result,
            Ok(None) => return None,
            Err(e) => {
                tracing::warn!(unit = %id, error = %e, "precognition enumeration task failed");
                return None;
            }
        };
        tracing::debug!(
            unit = %id,
            paths = result.paths.len(),
            truncated = result.truncated,
            "precognition refreshed unit"
        );
        let cached = CachedPaths::new(result, self.battlefield.round);
        let paths = Arc::clone(&cached.paths);
        self.cache.insert(id, cached);
        self.refreshes += 1;
        Some(paths)
    }

    fn status(&self) -> PrecognitionStatus {
        PrecognitionStatus {
            cached_units: self.cache.len(),
            dirty_units: self.cache.dirty_count(),
            paused: self.paused,
            refreshes: self.refreshes,
            round: self.battlefield.round,
        }
    }
}
