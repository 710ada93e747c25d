//! Fluent builder for constructing a [`Railway`].

use std::sync::Arc;

use loco_control::{AgentController, StopSignal};
use loco_core::{EventSink, NoopSink, RunConfig};
use loco_layout::{Layout, Preset};
use loco_sync::SectionRegistry;
use loco_track::{JunctionActuator, LayoutControl, Locomotive, TrackSim};
use tracing::info;

use crate::{Railway, SimResult};

/// Fluent builder for [`Railway`].
///
/// # Optional inputs
///
/// | Method       | Default      |
/// |--------------|--------------|
/// | `.sink(s)`   | `NoopSink`   |
///
/// # Example
///
/// ```rust,ignore
/// let railway = RailwayBuilder::new(Preset::StationThenBlock.layout()?, RunConfig::default())
///     .sink(Arc::new(RecordingSink::new()))
///     .build()?;
/// let report = railway.run()?;
/// ```
pub struct RailwayBuilder {
    layout: Layout,
    config: RunConfig,
    sink:   Option<Arc<dyn EventSink>>,
}

impl RailwayBuilder {
    pub fn new(layout: Layout, config: RunConfig) -> Self {
        Self { layout, config, sink: None }
    }

    /// Start from one of the built-in layouts.
    pub fn preset(preset: Preset, config: RunConfig) -> SimResult<Self> {
        Ok(Self::new(preset.layout()?, config))
    }

    /// Receive every protocol event of the run.
    pub fn sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = Some(sink);
        self
    }

    /// Prepare the track and the controllers.  Nothing moves until
    /// [`Railway::run`].
    ///
    /// In order: select the layout, throw the initial junctions, set each
    /// locomotive's speed and place it at its station, create one
    /// coordinator per physical block, bind both routes.
    pub fn build(self) -> SimResult<Railway> {
        let sink = self.sink.unwrap_or_else(|| Arc::new(NoopSink));
        let track = TrackSim::new(&self.config);

        track.select_layout(self.layout.id());
        for &setting in self.layout.junctions() {
            track.set_junction(setting);
        }

        let registry = Arc::new(SectionRegistry::new(
            self.layout.block_ids(),
            &self.config.protocol,
            Arc::clone(&sink),
        ));
        let stop = StopSignal::new();

        let mut locos = Vec::with_capacity(self.layout.trains().len());
        let mut controllers = Vec::with_capacity(self.layout.trains().len());
        for train in self.layout.trains() {
            let route = &train.route;
            let loco = track.add_loco(train.loco, route.contact_circuit());
            loco.set_speed(train.speed);
            loco.set_position(route.station.front, route.station.back);

            let controller =
                AgentController::new(route, &registry, loco.clone(), loco.clone(), track.clone())?
                    .with_sink(Arc::clone(&sink))
                    .with_stop_signal(stop.clone());
            locos.push(loco);
            controllers.push(controller);
        }

        info!(
            layout = self.layout.id(),
            blocks = registry.len(),
            trains = controllers.len(),
            "railway ready"
        );

        Ok(Railway::new(self.layout, self.config, track, registry, stop, locos, controllers))
    }
}
