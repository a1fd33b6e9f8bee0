// src/lib.rs

//! A fixed-function display-output adapter.
//!
//! This crate drives a single, always-connected display sink with one
//! hardcoded 720p timing. It owns no pipeline of its own; an embedding
//! host implements [`CompositionContext`] and the adapter binds a
//! sink/stage pair into it, answers mode and connection queries while
//! bound, and tears the pair down again on detach.
//!
//! The usual flow:
//!
//! 1. The host matches a device against [`registry::COMPATIBLE`].
//! 2. An attach event reaches [`AdapterRegistry::attach`], which binds a
//!    fresh [`BindingController`] into the host context.
//! 3. While bound, the host probes the sink through the [`SinkOps`]
//!    surface it received at bind time.
//! 4. A detach event reaches [`AdapterRegistry::detach`]; teardown runs
//!    in reverse order and the host is left clean.

pub mod binding;
pub mod config;
pub mod mode;
pub mod pipeline;
pub mod registry;
pub mod sink;
pub mod stage;

pub use binding::{BindError, BindState, BindingController};
pub use config::AdapterConfig;
pub use mode::{DisplayMode, ModeFlags, ModeKind, ModeUnavailable, MODE_NAME};
pub use pipeline::{
    CompositionContext, ContextError, SinkHandle, SinkOps, StageHandle, TargetMask,
};
pub use registry::{AdapterRegistry, COMPATIBLE};
pub use sink::{ConnectionStatus, ConnectorKind, ModeStatus, OutputSink, PollFlags};
pub use stage::{SignalStage, StageKind};
