// src/pipeline/mock.rs

use crate::mode::DisplayMode;
use crate::pipeline::{
    CompositionContext, ContextError, SinkHandle, SinkOps, StageHandle, TargetMask,
};
use crate::sink::{ConnectionStatus, ConnectorKind, ModeStatus, PollFlags};
use crate::stage::StageKind;
use std::collections::HashMap;
use std::sync::Weak;

/// One primitive call on the context, in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContextEvent {
    RegisterStage(StageHandle),
    RegisterSink(SinkHandle),
    BindSinkOps(SinkHandle),
    Link(SinkHandle, StageHandle),
    UnregisterSink(SinkHandle),
    UnregisterStage(StageHandle),
}

pub struct MockPipeline {
    next_id: u32,
    sinks: Vec<(SinkHandle, ConnectorKind, PollFlags)>,
    stages: Vec<(StageHandle, StageKind, TargetMask)>,
    links: Vec<(SinkHandle, StageHandle)>,
    ops: HashMap<SinkHandle, Weak<dyn SinkOps>>,
    events: Vec<ContextEvent>,
    stage_error: Option<ContextError>,
    sink_error: Option<ContextError>,
    link_error: Option<ContextError>,
}

impl MockPipeline {
    pub fn new() -> Self {
        Self {
            next_id: 1,
            sinks: Vec::new(),
            stages: Vec::new(),
            links: Vec::new(),
            ops: HashMap::new(),
            events: Vec::new(),
            stage_error: None,
            sink_error: None,
            link_error: None,
        }
    }

    pub fn fail_next_stage(&mut self, error: ContextError) {
        self.stage_error = Some(error);
    }

    pub fn fail_next_sink(&mut self, error: ContextError) {
        self.sink_error = Some(error);
    }

    pub fn fail_next_link(&mut self, error: ContextError) {
        self.link_error = Some(error);
    }

    pub fn sinks(&self) -> &[(SinkHandle, ConnectorKind, PollFlags)] {
        &self.sinks
    }

    pub fn stages(&self) -> &[(StageHandle, StageKind, TargetMask)] {
        &self.stages
    }

    pub fn links(&self) -> &[(SinkHandle, StageHandle)] {
        &self.links
    }

    pub fn events(&self) -> &[ContextEvent] {
        &self.events
    }

    pub fn sink_ops(&self, sink: SinkHandle) -> Option<&Weak<dyn SinkOps>> {
        self.ops.get(&sink)
    }

    /// True when no sink, stage, link, or query surface remains recorded.
    pub fn is_clean(&self) -> bool {
        self.sinks.is_empty() && self.stages.is_empty() && self.links.is_empty() && self.ops.is_empty()
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Probes `sink` the way a host would: enumerate, then validate the
    /// first result, then detect. Returns `None` once the sink's query
    /// surface is dead.
    pub fn probe(
        &self,
        sink: SinkHandle,
    ) -> Option<(Vec<DisplayMode>, Option<ModeStatus>, ConnectionStatus)> {
        let ops = self.ops.get(&sink)?.upgrade()?;
        let mut modes = Vec::new();
        ops.fill_modes(&mut modes);
        let verdict = modes.first().map(|m| ops.validate_mode(m));
        let status = ops.detect(false);
        Some((modes, verdict, status))
    }
}

impl Default for MockPipeline {
    fn default() -> Self {
        Self::new()
    }
}

impl CompositionContext for MockPipeline {
    fn register_stage(
        &mut self,
        kind: StageKind,
        targets: TargetMask,
    ) -> Result<StageHandle, ContextError> {
        if let Some(error) = self.stage_error.take() {
            return Err(error);
        }
        let handle = StageHandle(self.allocate_id());
        self.stages.push((handle, kind, targets));
        self.events.push(ContextEvent::RegisterStage(handle));
        Ok(handle)
    }

    fn register_sink(
        &mut self,
        kind: ConnectorKind,
        poll: PollFlags,
    ) -> Result<SinkHandle, ContextError> {
        if let Some(error) = self.sink_error.take() {
            return Err(error);
        }
        let handle = SinkHandle(self.allocate_id());
        self.sinks.push((handle, kind, poll));
        self.events.push(ContextEvent::RegisterSink(handle));
        Ok(handle)
    }

    fn bind_sink_ops(&mut self, sink: SinkHandle, ops: Weak<dyn SinkOps>) {
        self.ops.insert(sink, ops);
        self.events.push(ContextEvent::BindSinkOps(sink));
    }

    fn link(&mut self, sink: SinkHandle, stage: StageHandle) -> Result<(), ContextError> {
        if let Some(error) = self.link_error.take() {
            return Err(error);
        }
        self.links.push((sink, stage));
        self.events.push(ContextEvent::Link(sink, stage));
        Ok(())
    }

    fn unregister_sink(&mut self, sink: SinkHandle) {
        self.sinks.retain(|(handle, _, _)| *handle != sink);
        self.links.retain(|(handle, _)| *handle != sink);
        self.ops.remove(&sink);
        self.events.push(ContextEvent::UnregisterSink(sink));
    }

    fn unregister_stage(&mut self, stage: StageHandle) {
        self.stages.retain(|(handle, _, _)| *handle != stage);
        self.links.retain(|(_, handle)| *handle != stage);
        self.events.push(ContextEvent::UnregisterStage(stage));
    }
}
