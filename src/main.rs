// In src/main.rs

// Demo harness: hosts the adapter inside a small in-memory composition
// pipeline and walks two full attach/probe/detach cycles.

use fixed_output::{
    AdapterConfig, AdapterRegistry, CompositionContext, ConnectorKind, ContextError, DisplayMode,
    PollFlags, SinkHandle, SinkOps, StageHandle, StageKind, TargetMask, COMPATIBLE,
};

use anyhow::Context;
use log::{info, warn};
use std::collections::HashMap;
use std::sync::Weak;

// --- Demo Host Pipeline ---

/// Minimal composition context: hands out sequential handles and
/// remembers what the adapter registered.
struct DemoPipeline {
    next_id: u32,
    sinks: HashMap<SinkHandle, (ConnectorKind, PollFlags)>,
    stages: HashMap<StageHandle, (StageKind, TargetMask)>,
    links: Vec<(SinkHandle, StageHandle)>,
    ops: HashMap<SinkHandle, Weak<dyn SinkOps>>,
}

impl DemoPipeline {
    fn new() -> Self {
        DemoPipeline {
            next_id: 1,
            sinks: HashMap::new(),
            stages: HashMap::new(),
            links: Vec::new(),
            ops: HashMap::new(),
        }
    }

    fn first_sink(&self) -> Option<SinkHandle> {
        self.sinks.keys().min().copied()
    }

    fn is_clean(&self) -> bool {
        self.sinks.is_empty() && self.stages.is_empty() && self.links.is_empty() && self.ops.is_empty()
    }
}

impl CompositionContext for DemoPipeline {
    fn register_stage(
        &mut self,
        kind: StageKind,
        targets: TargetMask,
    ) -> Result<StageHandle, ContextError> {
        let handle = StageHandle(self.next_id);
        self.next_id += 1;
        self.stages.insert(handle, (kind, targets));
        Ok(handle)
    }

    fn register_sink(
        &mut self,
        kind: ConnectorKind,
        poll: PollFlags,
    ) -> Result<SinkHandle, ContextError> {
        let handle = SinkHandle(self.next_id);
        self.next_id += 1;
        self.sinks.insert(handle, (kind, poll));
        Ok(handle)
    }

    fn bind_sink_ops(&mut self, sink: SinkHandle, ops: Weak<dyn SinkOps>) {
        self.ops.insert(sink, ops);
    }

    fn link(&mut self, sink: SinkHandle, stage: StageHandle) -> Result<(), ContextError> {
        if !self.sinks.contains_key(&sink) || !self.stages.contains_key(&stage) {
            return Err(ContextError::Rejected("unknown handle in link".to_string()));
        }
        self.links.push((sink, stage));
        Ok(())
    }

    fn unregister_sink(&mut self, sink: SinkHandle) {
        self.sinks.remove(&sink);
        self.links.retain(|(s, _)| *s != sink);
        self.ops.remove(&sink);
    }

    fn unregister_stage(&mut self, stage: StageHandle) {
        self.stages.remove(&stage);
        self.links.retain(|(_, s)| *s != stage);
    }
}

// --- Probe Pass ---

/// Queries the bound sink the way a real host would between attach and
/// detach: enumerate modes, validate a few candidates, detect status.
fn probe_sink(pipeline: &DemoPipeline) -> anyhow::Result<()> {
    let handle = pipeline
        .first_sink()
        .context("no output sink registered in the pipeline")?;
    let ops = pipeline
        .ops
        .get(&handle)
        .and_then(Weak::upgrade)
        .context("output sink query surface is gone")?;

    let mut modes = Vec::new();
    let count = ops.fill_modes(&mut modes);
    info!(
        "sink {:?} offers {} mode(s): {}",
        handle,
        count,
        serde_json::to_string(&modes).context("Failed to encode mode list")?
    );

    let candidates = [
        DisplayMode::new(1280, 720, 60),
        DisplayMode::new(1280, 720, 30),
        DisplayMode::new(1920, 1080, 60),
        DisplayMode::new(640, 480, 75),
    ];
    for candidate in &candidates {
        info!(
            "validate {}: {:?}",
            candidate,
            ops.validate_mode(candidate)
        );
    }

    info!("detect (unforced): {:?}", ops.detect(false));
    info!("detect (forced): {:?}", ops.detect(true));
    Ok(())
}

/// Main entry point for the `fixed-output` demo.
fn main() -> anyhow::Result<()> {
    // Initialize the logger. Default filter is "info" if RUST_LOG is not set.
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_micros()
        .init();

    info!("Starting fixed-output demo...");

    // --- Configuration ---
    let config = AdapterConfig::load_or_default("fixed-output.json");
    info!("Configuration: {:?}", config);

    let mut pipeline = DemoPipeline::new();
    let mut registry = AdapterRegistry::new();

    // --- Device Matching ---
    // A discovery collaborator would hand us candidate devices; only the
    // one carrying our compatible string gets bound.
    let discovered = [("vout0", COMPATIBLE), ("cam0", "acme,image-sensor")];
    let mut device = None;
    for (name, compatible) in discovered {
        if fixed_output::registry::matches(compatible) {
            info!("device {} matched ({})", name, compatible);
            device = Some(name);
        } else {
            info!("ignoring device {} ({})", name, compatible);
        }
    }
    let device = device.context("no compatible device discovered")?;

    // --- First Cycle ---
    registry
        .attach(device, &mut pipeline, &config)
        .context("Failed to bind display output")?;
    probe_sink(&pipeline)?;
    registry
        .detach(device, &mut pipeline)
        .context("Failed to unbind display output")?;

    if pipeline.is_clean() {
        info!("host pipeline clean after detach");
    } else {
        warn!("host pipeline still holds adapter objects after detach");
    }

    // --- Second Cycle ---
    // Rebinding the same device must work; every cycle gets a fresh
    // controller.
    registry
        .attach(device, &mut pipeline, &config)
        .context("Failed to rebind display output")?;
    probe_sink(&pipeline)?;
    registry
        .detach(device, &mut pipeline)
        .context("Failed to unbind display output")?;

    info!("fixed-output demo exited successfully.");
    Ok(())
}
