// src/stage.rs

//! The signal stage: a pass-through placeholder between the output sink
//! and the host's scan-out engines. It carries no dedicated signal type
//! and applies no transformation; it exists so the host graph has a
//! complete sink-to-engine route.

use crate::pipeline::{CompositionContext, ContextError, StageHandle, TargetMask};
use log::debug;

/// What a stage does to the signal passing through it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StageKind {
    /// Routing only, no dedicated signal type.
    #[default]
    None,
    Tmds,
    Dac,
    Virtual,
}

/// The routing stage the output sink drives.
///
/// Lives strictly inside one binding: created before the sink, released
/// after it.
pub struct SignalStage {
    handle: StageHandle,
    kind: StageKind,
    targets: TargetMask,
}

impl SignalStage {
    /// Registers a pass-through stage restricted to `targets`.
    pub fn create(
        host: &mut dyn CompositionContext,
        targets: TargetMask,
    ) -> Result<SignalStage, ContextError> {
        let handle = host.register_stage(StageKind::None, targets)?;
        debug!("signal stage {:?} registered for targets {:?}", handle, targets);
        Ok(SignalStage {
            handle,
            kind: StageKind::None,
            targets,
        })
    }

    pub fn handle(&self) -> StageHandle {
        self.handle
    }

    pub fn kind(&self) -> StageKind {
        self.kind
    }

    pub fn targets(&self) -> TargetMask {
        self.targets
    }

    /// Releases the stage. Callers release the sink routed into it first.
    pub fn release(self, host: &mut dyn CompositionContext) {
        debug!("signal stage {:?} released", self.handle);
        host.unregister_stage(self.handle);
    }
}
