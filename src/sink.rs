// src/sink.rs

//! The output sink: the display-facing endpoint of the adapter.
//!
//! This sink models a fixed, always-connected display. It advertises the
//! single catalog timing, validates candidates against the active region
//! only, and reports a connected status unconditionally. There is no
//! hardware behind it to probe, so detection never blocks and never
//! changes its answer.

use crate::mode::{self, DisplayMode};
use crate::pipeline::{CompositionContext, ContextError, SinkHandle, SinkOps, StageHandle};
use crate::stage::SignalStage;
use bitflags::bitflags;
use log::{debug, error, trace};
use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};

/// Physical connector family a sink advertises to the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConnectorKind {
    #[default]
    HdmiA,
    DisplayPort,
    Vga,
    Lvds,
    Virtual,
}

bitflags! {
    /// Connection polling the host should perform for a sink.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct PollFlags: u32 {
        /// Poll for the sink becoming connected.
        const CONNECT = 1 << 0;
        /// Poll for the sink becoming disconnected.
        const DISCONNECT = 1 << 1;
        /// Hot-plug interrupts deliver status changes instead.
        const HPD = 1 << 2;
    }
}

/// Connection state of a sink. Binary: there is no "unknown".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

/// Verdict on a candidate display mode.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ModeStatus {
    Ok,
    Rejected,
}

/// The display-facing endpoint of a binding.
///
/// A sink is created against a host context, routed into a signal stage
/// exactly once, queried through [`SinkOps`] for the bound lifetime, and
/// finally released into the same context. Release consumes the sink, so
/// a released sink cannot be touched again.
pub struct OutputSink {
    handle: SinkHandle,
    kind: ConnectorKind,
    poll: PollFlags,
    /// Stage this sink is routed into. Set once, at bind.
    stage: OnceCell<StageHandle>,
}

impl OutputSink {
    /// Registers a new sink with the host context.
    ///
    /// The sink requests no connection polling: its status never
    /// changes, so there is nothing to poll for.
    pub fn create(
        host: &mut dyn CompositionContext,
        kind: ConnectorKind,
    ) -> Result<OutputSink, ContextError> {
        let poll = PollFlags::empty();
        let handle = host.register_sink(kind, poll)?;
        debug!("output sink {:?} registered as {:?}", handle, kind);
        Ok(OutputSink {
            handle,
            kind,
            poll,
            stage: OnceCell::new(),
        })
    }

    /// Host-assigned handle for this sink.
    pub fn handle(&self) -> SinkHandle {
        self.handle
    }

    pub fn kind(&self) -> ConnectorKind {
        self.kind
    }

    pub fn poll(&self) -> PollFlags {
        self.poll
    }

    /// Handle of the stage this sink is routed into, once attached.
    pub fn stage(&self) -> Option<StageHandle> {
        self.stage.get().copied()
    }

    /// Routes the sink into `stage`. Called exactly once per sink, after
    /// the host has received the sink's query surface.
    pub fn attach_to(
        &self,
        host: &mut dyn CompositionContext,
        stage: &SignalStage,
    ) -> Result<(), ContextError> {
        host.link(self.handle, stage.handle())?;
        let first_route = self.stage.set(stage.handle()).is_ok();
        debug_assert!(first_route, "output sink routed twice");
        debug!("output sink {:?} routed into {:?}", self.handle, stage.handle());
        Ok(())
    }

    /// Lazily yields the sink's supported modes.
    ///
    /// Each pass duplicates fresh descriptors from the catalog, so two
    /// enumerations never share storage. A timing whose duplication
    /// fails is skipped rather than reported.
    pub fn enumerate_modes(&self) -> Modes {
        Modes { remaining: 1 }
    }

    /// Releases the sink: the host forgets it and its resources die here.
    pub fn release(self, host: &mut dyn CompositionContext) {
        debug!("output sink {:?} released", self.handle);
        host.unregister_sink(self.handle);
    }
}

impl SinkOps for OutputSink {
    fn fill_modes(&self, modes: &mut Vec<DisplayMode>) -> usize {
        let offered = match mode::duplicate_preferred() {
            Ok(offered) => offered,
            Err(e) => {
                error!("output sink {:?}: {}", self.handle, e);
                return 0;
            }
        };
        if modes.try_reserve(1).is_err() {
            error!("output sink {:?}: mode list allocation failed", self.handle);
            return 0;
        }
        trace!("output sink {:?} offering {}", self.handle, offered);
        modes.push(offered);
        1
    }

    fn validate_mode(&self, candidate: &DisplayMode) -> ModeStatus {
        // Accept 720p only. Clock and sync timing are not checked.
        let native = mode::preferred();
        if candidate.hdisplay == native.hdisplay && candidate.vdisplay == native.vdisplay {
            ModeStatus::Ok
        } else {
            ModeStatus::Rejected
        }
    }

    fn detect(&self, _force: bool) -> ConnectionStatus {
        // No cable to probe behind this sink.
        ConnectionStatus::Connected
    }
}

/// Iterator over a sink's advertised modes.
pub struct Modes {
    remaining: usize,
}

impl Iterator for Modes {
    type Item = DisplayMode;

    fn next(&mut self) -> Option<DisplayMode> {
        while self.remaining > 0 {
            self.remaining -= 1;
            if let Ok(mode) = mode::duplicate_preferred() {
                return Some(mode);
            }
        }
        None
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, Some(self.remaining))
    }
}
