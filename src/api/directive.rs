use std::collections::VecDeque;
use std::rc::Rc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::{debug, trace, warn};

use crate::core::{Container, Dataset, OptionMap, Viewport};
use crate::error::ChartResult;
use crate::render::Renderer;

use super::{ChartObject, DirectiveBindings, Materializer, pipeline};

/// Observation delivered to the render controller.
#[derive(Debug, Clone)]
pub enum Trigger {
    /// The directive was attached; behaves like the host's initial watch call.
    Mounted,
    ViewportResized(Viewport),
    DataChanged(Option<Rc<Dataset>>),
}

/// Result of draining the trigger queue.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RenderOutcome {
    /// No queued trigger asked for a render.
    Idle,
    /// Rendered without data: the surface was reset and left empty.
    Cleared,
    Drawn { node_count: usize },
}

/// Reactive controller owning one mounted chart.
///
/// Triggers are queued in arrival order and handled on `flush`, which runs at
/// most one render cycle no matter how many triggers qualified.
pub struct ChartDirective<R: Renderer> {
    chart: ChartObject,
    renderer: R,
    data: Option<Rc<Dataset>>,
    viewport: Option<Viewport>,
    pending: VecDeque<Trigger>,
}

impl<R: Renderer> std::fmt::Debug for ChartDirective<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChartDirective")
            .field("chart", &self.chart)
            .field("has_data", &self.data.is_some())
            .field("viewport", &self.viewport)
            .field("pending", &self.pending.len())
            .finish_non_exhaustive()
    }
}

impl<R: Renderer> ChartDirective<R> {
    /// Materializes the chart, runs the configuration pipeline and queues the
    /// mount trigger.
    pub fn attach(
        materializer: &Materializer,
        container: Rc<dyn Container>,
        identifier: &str,
        bindings: DirectiveBindings,
        renderer: R,
    ) -> ChartResult<Self> {
        let mut chart = materializer.materialize(container, identifier)?;
        pipeline::configure(&mut chart, &bindings.attributes, bindings.options.as_ref());
        let mut pending = VecDeque::new();
        pending.push_back(Trigger::Mounted);
        debug!(type_name = chart.type_name(), "directive attached");
        Ok(Self {
            chart,
            renderer,
            data: bindings.data,
            viewport: None,
            pending,
        })
    }

    #[must_use]
    pub fn chart(&self) -> &ChartObject {
        &self.chart
    }

    pub fn chart_mut(&mut self) -> &mut ChartObject {
        &mut self.chart
    }

    #[must_use]
    pub fn renderer(&self) -> &R {
        &self.renderer
    }

    #[must_use]
    pub fn data(&self) -> Option<&Rc<Dataset>> {
        self.data.as_ref()
    }

    #[must_use]
    pub fn pending_triggers(&self) -> usize {
        self.pending.len()
    }

    pub fn viewport_changed(&mut self, viewport: Viewport) {
        self.pending.push_back(Trigger::ViewportResized(viewport));
    }

    pub fn data_changed(&mut self, data: Option<Rc<Dataset>>) {
        self.pending.push_back(Trigger::DataChanged(data));
    }

    /// Re-merges bound options into the configuration without rendering.
    pub fn update_options(&mut self, options: &OptionMap) {
        self.chart.state_mut().load_options(options);
        trace!(keys = options.len(), "bound options re-merged");
    }

    /// Drains queued triggers and renders once with the latest data if any
    /// of them qualified.
    pub fn flush(&mut self) -> ChartResult<RenderOutcome> {
        let mut scheduled = false;
        let mut drained = 0_usize;
        while let Some(trigger) = self.pending.pop_front() {
            drained += 1;
            scheduled |= self.observe(trigger);
        }
        if !scheduled {
            trace!(drained, "no render scheduled");
            return Ok(RenderOutcome::Idle);
        }
        trace!(drained, "coalesced triggers into one render");
        let data = self.data.clone();
        self.render(data)
    }

    fn observe(&mut self, trigger: Trigger) -> bool {
        match trigger {
            Trigger::Mounted => true,
            Trigger::ViewportResized(viewport) => {
                let previous = self.viewport.replace(viewport);
                previous.map(|previous| previous.width) != Some(viewport.width)
            }
            Trigger::DataChanged(data) => {
                let changed = !same_reference(self.data.as_ref(), data.as_ref());
                self.data = data;
                changed
            }
        }
    }

    /// One reset, load, draw cycle; the surface is handed to the renderer
    /// even when loading fails, so the host shows the emptied container.
    /// A render-cycle error takes precedence over a renderer error.
    pub fn render(&mut self, data: Option<Rc<Dataset>>) -> ChartResult<RenderOutcome> {
        let result = self.chart.render(data.as_deref());
        let presented = self.renderer.render(self.chart.state().svg());
        let drawn = match result {
            Ok(drawn) => drawn,
            Err(err) => {
                warn!(type_name = self.chart.type_name(), error = %err, "render cycle aborted");
                if let Err(present_err) = presented {
                    warn!(error = %present_err, "renderer also failed");
                }
                return Err(err);
            }
        };
        presented?;
        Ok(if drawn {
            RenderOutcome::Drawn {
                node_count: self.chart.state().svg().node_count(),
            }
        } else {
            RenderOutcome::Cleared
        })
    }

    /// Steps running transitions and re-presents the surface. Returns how
    /// many are still running.
    pub fn advance_transitions(&mut self, elapsed: Duration) -> ChartResult<usize> {
        let running = self.chart.state_mut().svg_mut().advance(elapsed);
        self.renderer.render(self.chart.state().svg())?;
        Ok(running)
    }

    /// Tears the chart down and hands the renderer back to the host.
    pub fn unmount(mut self) -> R {
        self.chart.state_mut().svg_reset();
        debug!(type_name = self.chart.type_name(), "directive unmounted");
        self.renderer
    }
}

fn same_reference(previous: Option<&Rc<Dataset>>, next: Option<&Rc<Dataset>>) -> bool {
    match (previous, next) {
        (Some(previous), Some(next)) => Rc::ptr_eq(previous, next),
        (None, None) => true,
        _ => false,
    }
}
