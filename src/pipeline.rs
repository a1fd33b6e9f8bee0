// src/pipeline.rs

//! Host composition pipeline contract.
//!
//! The adapter never owns a display pipeline of its own. It participates
//! in one managed by the embedding host, which implements
//! [`CompositionContext`] and passes it to the binding controller during
//! attach and detach. The contract is deliberately narrow: the host
//! hands out opaque handles for registered objects, accepts a query
//! surface for each sink, and forgets everything again on request.
//!
//! Handles are plain identifiers. They carry no liveness of their own;
//! using a handle after its object was unregistered is a host-side
//! error the context may report as [`ContextError::Rejected`].

use crate::mode::DisplayMode;
use crate::sink::{ConnectionStatus, ConnectorKind, ModeStatus, PollFlags};
use crate::stage::StageKind;
use bitflags::bitflags;
use std::fmt;
use std::sync::Weak;
use thiserror::Error;

/// Identifies a registered output sink within a composition context.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SinkHandle(pub u32);

/// Identifies a registered signal stage within a composition context.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StageHandle(pub u32);

impl fmt::Debug for SinkHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "sink#{}", self.0)
    }
}

impl fmt::Debug for StageHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stage#{}", self.0)
    }
}

bitflags! {
    /// Scan-out engines a signal stage may be driven by.
    ///
    /// Bit N grants the Nth engine in the host's pipeline. This adapter
    /// only ever requests [`TargetMask::FIRST`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct TargetMask: u32 {
        const FIRST = 1 << 0;
    }
}

/// Why the host declined a registration or link request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContextError {
    /// The context has no room for another object of this kind.
    #[error("composition context exhausted")]
    Exhausted,
    /// The context refused the request for a host-specific reason.
    #[error("rejected by composition context: {0}")]
    Rejected(String),
}

/// Query surface a bound sink exposes to its host.
///
/// The host holds this as a [`Weak`] reference, so the surface dies with
/// the binding and a detached sink can never be probed. All methods are
/// read-only over state frozen at bind time; hosts may call them from
/// any thread. None of them fail: enumeration degrades to zero modes
/// and validation degrades to a rejection.
pub trait SinkOps: Send + Sync {
    /// Appends the sink's supported modes to `modes`, returning the
    /// number of entries added.
    fn fill_modes(&self, modes: &mut Vec<DisplayMode>) -> usize;

    /// Judges whether `candidate` can be driven on this sink.
    fn validate_mode(&self, candidate: &DisplayMode) -> ModeStatus;

    /// Reports the sink's connection status. `force` asks for a fresh
    /// probe where detection involves real hardware work.
    fn detect(&self, force: bool) -> ConnectionStatus;
}

/// The host side of the adapter's world.
///
/// Implementations own the actual pipeline objects; the adapter only
/// ever sees the handles returned here. Registration order during
/// attach is stage, then sink, then ops, then link; teardown runs in
/// reverse. A context must tolerate `unregister_*` for objects that
/// still have links recorded and drop those links along with the
/// object.
pub trait CompositionContext {
    /// Registers a signal stage of the given kind, restricted to the
    /// scan-out engines in `targets`.
    fn register_stage(
        &mut self,
        kind: StageKind,
        targets: TargetMask,
    ) -> Result<StageHandle, ContextError>;

    /// Registers an output sink advertising the given connector kind,
    /// polled according to `poll`.
    fn register_sink(
        &mut self,
        kind: ConnectorKind,
        poll: PollFlags,
    ) -> Result<SinkHandle, ContextError>;

    /// Installs the query surface for `sink`. Infallible: the host
    /// merely records the reference and must tolerate it going dead at
    /// any later point.
    fn bind_sink_ops(&mut self, sink: SinkHandle, ops: Weak<dyn SinkOps>);

    /// Routes `sink` into `stage`.
    fn link(&mut self, sink: SinkHandle, stage: StageHandle) -> Result<(), ContextError>;

    /// Drops every reference the context holds to `sink`, including any
    /// recorded link and query surface.
    fn unregister_sink(&mut self, sink: SinkHandle);

    /// Drops every reference the context holds to `stage`.
    fn unregister_stage(&mut self, stage: StageHandle);
}

#[cfg(test)]
pub mod mock;
