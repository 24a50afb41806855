//! Cloneable façade over the precognition worker's command channel

use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};

use crate::board::{Facing, HexCoord};
use crate::core::error::{Result, TacticsError};
use crate::core::types::UnitId;
use crate::movement::MovePath;
use crate::precognition::worker::{Command, PrecognitionStatus};
use crate::units::Battlefield;

#[derive(Clone)]
pub struct PrecognitionHandle {
    command_tx: mpsc::Sender<Command>,
}

impl PrecognitionHandle {
    pub(crate) fn new(command_tx: mpsc::Sender<Command>) -> Self {
        Self { command_tx }
    }

    async fn send(&self, cmd: Command) -> Result<()> {
        self.command_tx
            .send(cmd)
            .await
            .map_err(|_| TacticsError::PrecognitionClosed)
    }

    /// Hand the worker a new battlefield snapshot
    pub async fn sync_battlefield(&self, battlefield: Arc<Battlefield>) -> Result<()> {
        self.send(Command::SyncBattlefield { battlefield }).await
    }

    /// Report a completed move so affected caches get invalidated
    pub async fn unit_moved(
        &self,
        unit: UnitId,
        to: HexCoord,
        facing: Facing,
        hexes_moved: u32,
    ) -> Result<()> {
        self.send(Command::UnitMoved {
            unit,
            to,
            facing,
            hexes_moved,
        })
        .await
    }

    pub async fn unit_removed(&self, unit: UnitId) -> Result<()> {
        self.send(Command::UnitRemoved { unit }).await
    }

    /// Wait until the unit's candidates are current and return them
    pub async fn ensure_fresh(&self, unit: UnitId) -> Result<Arc<Vec<MovePath>>> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::EnsureFresh {
            unit,
            reply: reply_tx,
        })
        .await?;
        reply_rx.await?
    }

    /// Are `held` still the worker's clean candidates for the unit?
    ///
    /// False once the unit was dirtied, even if the worker has since
    /// refreshed it.
    pub async fn is_current(&self, unit: UnitId, held: &Arc<Vec<MovePath>>) -> Result<bool> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Peek {
            unit,
            reply: reply_tx,
        })
        .await?;
        Ok(reply_rx.await?.is_some_and(|cached| Arc::ptr_eq(&cached, held)))
    }

    /// Stop background refreshes; returns once the worker is idle
    pub async fn pause(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Pause { reply: reply_tx }).await?;
        reply_rx.await?;
        Ok(())
    }

    pub async fn resume(&self) -> Result<()> {
        self.send(Command::Resume).await
    }

    pub async fn status(&self) -> Result<PrecognitionStatus> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Status { reply: reply_tx }).await?;
        Ok(reply_rx.await?)
    }

    /// Stop the worker; later calls on any clone fail with `PrecognitionClosed`
    pub async fn shutdown(&self) -> Result<()> {
        let (reply_tx, reply_rx) = oneshot::channel();
        self.send(Command::Shutdown { reply: reply_tx }).await?;
        reply_rx.await?;
        Ok(())
    }
}
