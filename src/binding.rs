// src/binding.rs

//! Binding controller: the lifecycle owner of one sink/stage pair.
//!
//! Attach acquires resources in a fixed order (stage, sink, query
//! surface, route) and unwinds every acquired resource on the first
//! failure, so a failed attach leaves the host exactly as it found it.
//! Detach tears everything down unconditionally in reverse order.
//! Each controller walks UNBOUND to BOUND to RETIRED once; a new cycle
//! takes a new controller.

use crate::config::AdapterConfig;
use crate::pipeline::{CompositionContext, ContextError, TargetMask};
use crate::sink::OutputSink;
use crate::stage::SignalStage;
use log::{error, info, warn};
use std::sync::{Arc, Weak};
use thiserror::Error;

/// Errors surfaced by the bind path.
#[derive(Debug, Error)]
pub enum BindError {
    #[error("signal stage registration failed: {0}")]
    StageRegistration(ContextError),
    #[error("output sink registration failed: {0}")]
    SinkRegistration(ContextError),
    #[error("sink-to-stage attachment failed: {0}")]
    Attachment(ContextError),
    #[error("device {device:?} is already bound")]
    AlreadyBound { device: String },
    #[error("device {device:?} is not bound")]
    NotBound { device: String },
    #[error("controller for device {device:?} is retired")]
    Retired { device: String },
}

/// Observable lifecycle state of a controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindState {
    Unbound,
    Bound,
    Retired,
}

/// Resources held while bound. The sink sits behind an [`Arc`] because
/// the host's query surface is a [`Weak`] view of it.
struct Binding {
    sink: Arc<OutputSink>,
    stage: SignalStage,
}

enum State {
    Unbound,
    Bound(Binding),
    Retired,
}

/// Drives one attach/detach cycle for one device.
pub struct BindingController {
    device: String,
    state: State,
}

impl BindingController {
    /// A fresh, unbound controller for `device`.
    pub fn new(device: impl Into<String>) -> Self {
        BindingController {
            device: device.into(),
            state: State::Unbound,
        }
    }

    pub fn device(&self) -> &str {
        &self.device
    }

    pub fn state(&self) -> BindState {
        match self.state {
            State::Unbound => BindState::Unbound,
            State::Bound(_) => BindState::Bound,
            State::Retired => BindState::Retired,
        }
    }

    /// Handle of the bound sink, while bound.
    pub fn sink(&self) -> Option<&Arc<OutputSink>> {
        match &self.state {
            State::Bound(binding) => Some(&binding.sink),
            _ => None,
        }
    }

    /// Binds the adapter into `host`.
    ///
    /// Steps: register the signal stage, register the output sink, hand
    /// the host the sink's query surface, route the sink into the stage.
    /// On any failure the already-acquired resources are released in
    /// reverse order and the controller stays unbound.
    pub fn attach(
        &mut self,
        host: &mut dyn CompositionContext,
        config: &AdapterConfig,
    ) -> Result<(), BindError> {
        match self.state {
            State::Unbound => {}
            State::Bound(_) => {
                return Err(BindError::AlreadyBound {
                    device: self.device.clone(),
                })
            }
            State::Retired => {
                return Err(BindError::Retired {
                    device: self.device.clone(),
                })
            }
        }

        let stage = match SignalStage::create(host, TargetMask::FIRST) {
            Ok(stage) => stage,
            Err(e) => {
                error!("{}: failed to register signal stage: {}", self.device, e);
                return Err(BindError::StageRegistration(e));
            }
        };

        let sink = match OutputSink::create(host, config.connector) {
            Ok(sink) => sink,
            Err(e) => {
                error!("{}: failed to register output sink: {}", self.device, e);
                stage.release(host);
                return Err(BindError::SinkRegistration(e));
            }
        };
        let sink = Arc::new(sink);

        let ops: Weak<OutputSink> = Arc::downgrade(&sink);
        host.bind_sink_ops(sink.handle(), ops);

        if let Err(e) = sink.attach_to(host, &stage) {
            error!("{}: failed to route sink into stage: {}", self.device, e);
            release_sink(sink, host);
            stage.release(host);
            return Err(BindError::Attachment(e));
        }

        self.state = State::Bound(Binding { sink, stage });
        info!("{}: display output bound", self.device);
        Ok(())
    }

    /// Unbinds the adapter from `host`.
    ///
    /// Teardown is unconditional and runs in reverse of attach: the sink
    /// goes first, taking the host's query surface with it, then the
    /// stage. Afterwards the controller is retired for good.
    pub fn detach(&mut self, host: &mut dyn CompositionContext) -> Result<(), BindError> {
        match std::mem::replace(&mut self.state, State::Retired) {
            State::Bound(binding) => {
                release_sink(binding.sink, host);
                binding.stage.release(host);
                info!("{}: display output unbound", self.device);
                Ok(())
            }
            State::Unbound => {
                self.state = State::Unbound;
                Err(BindError::NotBound {
                    device: self.device.clone(),
                })
            }
            State::Retired => Err(BindError::Retired {
                device: self.device.clone(),
            }),
        }
    }
}

impl Drop for BindingController {
    fn drop(&mut self) {
        if matches!(self.state, State::Bound(_)) {
            warn!(
                "{}: controller dropped while bound; host-side registrations leak",
                self.device
            );
        }
    }
}

/// Releases a sink that may still be referenced through the host's query
/// surface. A live host-side probe at this point violates the exclusion
/// between queries and teardown; the registration is dropped regardless.
fn release_sink(sink: Arc<OutputSink>, host: &mut dyn CompositionContext) {
    match Arc::try_unwrap(sink) {
        Ok(sink) => sink.release(host),
        Err(sink) => {
            warn!("output sink {:?} still referenced at release", sink.handle());
            host.unregister_sink(sink.handle());
        }
    }
}
