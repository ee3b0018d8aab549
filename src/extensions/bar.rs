use std::time::Duration;

use tracing::debug;

use crate::api::{ChartState, ChartTypeRegistry};
use crate::core::props::format_number;
use crate::core::{Attr, AttrValue, Config, Props, Scale, category20};
use crate::error::{ChartError, ChartResult};
use crate::render::Selection;

use super::ChartType;

/// Identifier the bar chart registers under.
pub const BAR_TYPE: &str = "bar";

pub const DEFAULT_MARGIN: f64 = 20.0;
pub const DEFAULT_BAR_HEIGHT: f64 = 20.0;
pub const DEFAULT_BAR_PADDING: f64 = 5.0;

/// Width every bar starts its grow-in transition from.
const INITIAL_BAR_WIDTH: f64 = 140.0;
const LABEL_INSET: f64 = 15.0;
const LABEL_FILL: &str = "#fff";

pub fn register(registry: &ChartTypeRegistry) -> ChartResult<()> {
    registry.register(BAR_TYPE, create)
}

fn create() -> Box<dyn ChartType> {
    Box::new(BarChart)
}

/// Horizontal bar chart: one labeled bar per datum.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarChart;

/// Geometry derived from the loaded data before drawing.
#[derive(Debug, Clone)]
pub struct HorizontalLayout {
    pub width: f64,
    pub x_scale: Scale,
    pub combined_bar: f64,
    pub height: f64,
    pub color_scale: Scale,
}

impl BarChart {
    /// Appends one `rect` to each node of `parents`.
    ///
    /// `height`, `x` and `y` are required; `width` and `fill` are optional
    /// and skipped when unset.
    pub fn add_rectangle(
        chart: &mut ChartState,
        parents: &Selection,
        props: &Props,
    ) -> ChartResult<Selection> {
        let props = chart
            .validate_and_filter_props(Some(props), ["height", "x", "y"], ["width", "fill"])?
            .ok_or_else(|| {
                ChartError::IncompleteProperties("rectangle needs height, x and y".to_owned())
            })?;
        let rects = chart.svg_mut().append_each(parents, "rect")?;
        apply_present(chart, &rects, &props, &["height", "width", "fill"])?;
        apply_all(chart, &rects, &props, &["x", "y"])?;
        Ok(rects)
    }

    /// Appends one `text` to each node of `parents`.
    pub fn add_text(
        chart: &mut ChartState,
        parents: &Selection,
        props: &Props,
    ) -> ChartResult<Selection> {
        let props = chart
            .validate_and_filter_props(
                Some(props),
                ["x", "y", "text"],
                ["height", "width", "fill"],
            )?
            .ok_or_else(|| {
                ChartError::IncompleteProperties("text needs x, y and text".to_owned())
            })?;
        let texts = chart.svg_mut().append_each(parents, "text")?;
        apply_present(chart, &texts, &props, &["height", "width", "fill"])?;
        apply_all(chart, &texts, &props, &["x", "y"])?;
        if let Some(text) = props.get("text") {
            chart.svg_mut().set_text(&texts, text)?;
        }
        Ok(texts)
    }

    /// Positional form of the rectangle properties.
    #[must_use]
    pub fn rectangle_props(
        height: impl Into<Attr>,
        width: Option<Attr>,
        x: impl Into<Attr>,
        y: impl Into<Attr>,
        fill: Option<Attr>,
    ) -> Props {
        let mut props = Props::new().with("height", height);
        if let Some(width) = width {
            props.insert("width", width);
        }
        props.insert("x", x);
        props.insert("y", y);
        if let Some(fill) = fill {
            props.insert("fill", fill);
        }
        props
    }

    /// Positional form of the text properties.
    #[must_use]
    pub fn text_props(
        height: Option<Attr>,
        width: Option<Attr>,
        x: impl Into<Attr>,
        y: impl Into<Attr>,
        fill: Option<Attr>,
        text: impl Into<Attr>,
    ) -> Props {
        let mut props = Props::new();
        for (key, attr) in [("height", height), ("width", width)] {
            if let Some(attr) = attr {
                props.insert(key, attr);
            }
        }
        props.insert("x", x);
        props.insert("y", y);
        if let Some(fill) = fill {
            props.insert("fill", fill);
        }
        props.insert("text", text);
        props
    }

    pub fn prep_horizontal(chart: &ChartState) -> ChartResult<HorizontalLayout> {
        let config = chart.config();
        let margin = config_number(config, "margin", DEFAULT_MARGIN);
        let combined_bar = config_number(config, "barHeight", DEFAULT_BAR_HEIGHT)
            + config_number(config, "barPadding", DEFAULT_BAR_PADDING);
        let width = chart.core_width() - margin;
        let x_scale = chart.set_scale([0.0, chart.data_max()], [0.0, width], ())?;
        let values: Vec<f64> = chart.data().iter().map(|datum| datum.value).collect();
        let color_scale = chart.set_scale("ordinal", values, category20())?;
        Ok(HorizontalLayout {
            width,
            x_scale,
            combined_bar,
            height: chart.data_count() as f64 * combined_bar,
            color_scale,
        })
    }

    pub fn horizontal_bar_chart(chart: &mut ChartState, layout: HorizontalLayout) -> ChartResult<()> {
        let margin = config_number(chart.config(), "margin", DEFAULT_MARGIN);
        let bar_height = config_number(chart.config(), "barHeight", DEFAULT_BAR_HEIGHT);
        let transition = transition_duration(chart.config());
        let show_details = chart.config().flag("showDetails");

        let root = chart.svg().root();
        let data = chart.data().to_vec();
        let bars = chart.svg_mut().enter_append(root, "g", &data)?;
        chart.svg_mut().set_root_attr("height", layout.height);

        let combined = layout.combined_bar;
        let color_scale = layout.color_scale;
        let bar_props = Props::new()
            .with("height", bar_height)
            .with("x", (margin / 2.0).round())
            .with_bound("y", move |_, index| AttrValue::Number(index as f64 * combined))
            .with_bound("fill", move |datum, _| {
                color_scale
                    .map(&AttrValue::Number(datum.value))
                    .unwrap_or_else(|| AttrValue::from(""))
            });
        Self::add_rectangle(chart, &bars, &bar_props)?;

        let x_scale = layout.x_scale;
        let start = Props::new().with("width", INITIAL_BAR_WIDTH);
        let end = Props::new().with_bound("width", move |datum, _| {
            AttrValue::Number(x_scale.apply(datum.value).unwrap_or_default())
        });
        let animated = chart.add_transition("rect", transition, &start, &end)?;

        if show_details {
            let label_props = Props::new()
                .with("fill", LABEL_FILL)
                .with_bound("y", move |_, index| {
                    AttrValue::Number(index as f64 * combined + LABEL_INSET)
                })
                .with("x", LABEL_INSET)
                .with_bound("text", |datum, _| AttrValue::Text(format_number(datum.value)));
            Self::add_text(chart, &bars, &label_props)?;
        }

        debug!(
            bars = bars.len(),
            animated,
            width = layout.width,
            height = layout.height,
            show_details,
            "bar chart drawn"
        );
        Ok(())
    }
}

impl ChartType for BarChart {
    fn defaults(&self) -> Config {
        Config::new()
            .with("margin", DEFAULT_MARGIN)
            .with("barHeight", DEFAULT_BAR_HEIGHT)
            .with("barPadding", DEFAULT_BAR_PADDING)
    }

    fn draw(&mut self, chart: &mut ChartState) -> ChartResult<()> {
        let layout = Self::prep_horizontal(chart)?;
        Self::horizontal_bar_chart(chart, layout)
    }
}

fn config_number(config: &Config, key: &str, fallback: f64) -> f64 {
    config.number(key).unwrap_or(fallback)
}

/// `transition` is read in milliseconds; anything unset or non-positive is instant.
fn transition_duration(config: &Config) -> Duration {
    config
        .number("transition")
        .filter(|millis| millis.is_finite() && *millis > 0.0)
        .map_or(Duration::ZERO, |millis| Duration::from_secs_f64(millis / 1000.0))
}

fn is_set(attr: &Attr) -> bool {
    match attr {
        Attr::Const(AttrValue::Number(value)) => *value != 0.0 && !value.is_nan(),
        Attr::Const(AttrValue::Text(text)) => !text.is_empty(),
        Attr::Bound(_) => true,
    }
}

fn apply_present(
    chart: &mut ChartState,
    selection: &Selection,
    props: &Props,
    keys: &[&str],
) -> ChartResult<()> {
    for key in keys {
        if let Some(attr) = props.get(key).filter(|attr| is_set(attr)) {
            chart.svg_mut().set_attr(selection, key, attr)?;
        }
    }
    Ok(())
}

fn apply_all(
    chart: &mut ChartState,
    selection: &Selection,
    props: &Props,
    keys: &[&str],
) -> ChartResult<()> {
    for key in keys {
        if let Some(attr) = props.get(key) {
            chart.svg_mut().set_attr(selection, key, attr)?;
        }
    }
    Ok(())
}
