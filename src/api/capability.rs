use std::fmt;
use std::rc::Rc;
use std::time::Duration;

use tracing::{trace, warn};

use crate::core::props::{has_all_keys, pick_keys};
use crate::core::{
    BoundArg, Container, Dataset, Keys, OptionMap, Props, Scale, ScaleArg, ScaleAxis,
    apply_bounds, build_scale, coerce_option, is_reserved_key, validate_dataset,
};
use crate::error::{ChartError, ChartResult};

use super::ChartState;

/// Overridable operations of the capability core.
///
/// `init` is not listed: it runs once inside materialization and
/// cannot be redecorated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    LoadOptions,
    SvgReset,
    LoadData,
    ValidateProps,
    FilterProps,
    ValidateAndFilterProps,
    GetWidth,
    GetHeight,
    CoreWidth,
    CoreHeight,
    SetScale,
    SetDomain,
    SetRange,
    AddTransition,
}

impl Capability {
    pub const ALL: [Self; 14] = [
        Self::LoadOptions,
        Self::SvgReset,
        Self::LoadData,
        Self::ValidateProps,
        Self::FilterProps,
        Self::ValidateAndFilterProps,
        Self::GetWidth,
        Self::GetHeight,
        Self::CoreWidth,
        Self::CoreHeight,
        Self::SetScale,
        Self::SetDomain,
        Self::SetRange,
        Self::AddTransition,
    ];

    /// Canonical operation name as exposed to chart-type authors.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LoadOptions => "loadOptions",
            Self::SvgReset => "svgReset",
            Self::LoadData => "loadData",
            Self::ValidateProps => "validateProps",
            Self::FilterProps => "filterProps",
            Self::ValidateAndFilterProps => "validateAndFilterProps",
            Self::GetWidth => "getWidth",
            Self::GetHeight => "getHeight",
            Self::CoreWidth => "coreWidth",
            Self::CoreHeight => "coreHeight",
            Self::SetScale => "setScale",
            Self::SetDomain => "setDomain",
            Self::SetRange => "setRange",
            Self::AddTransition => "addTransition",
        }
    }

    const fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

pub type LoadOptionsOp = Rc<dyn Fn(&mut ChartState, &OptionMap)>;
pub type SvgResetOp = Rc<dyn Fn(&mut ChartState, &str)>;
pub type LoadDataOp = Rc<dyn Fn(&mut ChartState, &Dataset) -> ChartResult<()>>;
pub type ValidatePropsOp = Rc<dyn Fn(&ChartState, Option<&Props>, &Keys) -> ChartResult<bool>>;
pub type FilterPropsOp =
    Rc<dyn Fn(&ChartState, Option<&Props>, &Keys, &Keys) -> ChartResult<Props>>;
pub type ValidateAndFilterPropsOp =
    Rc<dyn Fn(&ChartState, Option<&Props>, &Keys, &Keys) -> ChartResult<Option<Props>>>;
pub type MeasureOp = Rc<dyn Fn(&ChartState, &dyn Container) -> f64>;
pub type CoreMeasureOp = Rc<dyn Fn(&ChartState) -> f64>;
pub type SetScaleOp = Rc<dyn Fn(&ChartState, ScaleArg, ScaleArg, ScaleArg) -> ChartResult<Scale>>;
pub type SetBoundsOp =
    Rc<dyn Fn(&ChartState, BoundArg<'_>, BoundArg<'_>, BoundArg<'_>) -> ChartResult<()>>;
pub type AddTransitionOp =
    Rc<dyn Fn(&mut ChartState, &str, Duration, &Props, &Props) -> ChartResult<usize>>;

/// Operation table copied onto every chart object at materialization.
///
/// Chart types may replace entries from `ChartType::redecorate`; afterwards
/// the table is owned by the chart state and no longer reachable mutably.
#[derive(Clone)]
pub struct CapabilitySet {
    pub(crate) load_options: LoadOptionsOp,
    pub(crate) svg_reset: SvgResetOp,
    pub(crate) load_data: LoadDataOp,
    pub(crate) validate_props: ValidatePropsOp,
    pub(crate) filter_props: FilterPropsOp,
    pub(crate) validate_and_filter_props: ValidateAndFilterPropsOp,
    pub(crate) get_width: MeasureOp,
    pub(crate) get_height: MeasureOp,
    pub(crate) core_width: CoreMeasureOp,
    pub(crate) core_height: CoreMeasureOp,
    pub(crate) set_scale: SetScaleOp,
    pub(crate) set_domain: SetBoundsOp,
    pub(crate) set_range: SetBoundsOp,
    pub(crate) add_transition: AddTransitionOp,
    overridden: u16,
}

impl Default for CapabilitySet {
    fn default() -> Self {
        Self::standard()
    }
}

impl fmt::Debug for CapabilitySet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let overridden: Vec<&str> = Capability::ALL
            .into_iter()
            .filter(|cap| self.is_overridden(*cap))
            .map(Capability::name)
            .collect();
        f.debug_struct("CapabilitySet")
            .field("overridden", &overridden)
            .finish_non_exhaustive()
    }
}

impl CapabilitySet {
    /// The shared implementations every chart type starts from.
    #[must_use]
    pub fn standard() -> Self {
        Self {
            load_options: Rc::new(standard_load_options),
            svg_reset: Rc::new(standard_svg_reset),
            load_data: Rc::new(standard_load_data),
            validate_props: Rc::new(standard_validate_props),
            filter_props: Rc::new(standard_filter_props),
            validate_and_filter_props: Rc::new(standard_validate_and_filter_props),
            get_width: Rc::new(standard_get_width),
            get_height: Rc::new(standard_get_height),
            core_width: Rc::new(standard_core_width),
            core_height: Rc::new(standard_core_height),
            set_scale: Rc::new(standard_set_scale),
            set_domain: Rc::new(standard_set_domain),
            set_range: Rc::new(standard_set_range),
            add_transition: Rc::new(standard_add_transition),
            overridden: 0,
        }
    }

    #[must_use]
    pub fn is_overridden(&self, capability: Capability) -> bool {
        self.overridden & capability.bit() != 0
    }

    fn mark(&mut self, capability: Capability) {
        self.overridden |= capability.bit();
    }

    pub fn override_load_options(&mut self, op: impl Fn(&mut ChartState, &OptionMap) + 'static) {
        self.load_options = Rc::new(op);
        self.mark(Capability::LoadOptions);
    }

    pub fn override_svg_reset(&mut self, op: impl Fn(&mut ChartState, &str) + 'static) {
        self.svg_reset = Rc::new(op);
        self.mark(Capability::SvgReset);
    }

    pub fn override_load_data(
        &mut self,
        op: impl Fn(&mut ChartState, &Dataset) -> ChartResult<()> + 'static,
    ) {
        self.load_data = Rc::new(op);
        self.mark(Capability::LoadData);
    }

    pub fn override_validate_props(
        &mut self,
        op: impl Fn(&ChartState, Option<&Props>, &Keys) -> ChartResult<bool> + 'static,
    ) {
        self.validate_props = Rc::new(op);
        self.mark(Capability::ValidateProps);
    }

    pub fn override_filter_props(
        &mut self,
        op: impl Fn(&ChartState, Option<&Props>, &Keys, &Keys) -> ChartResult<Props> + 'static,
    ) {
        self.filter_props = Rc::new(op);
        self.mark(Capability::FilterProps);
    }

    pub fn override_validate_and_filter_props(
        &mut self,
        op: impl Fn(&ChartState, Option<&Props>, &Keys, &Keys) -> ChartResult<Option<Props>>
        + 'static,
    ) {
        self.validate_and_filter_props = Rc::new(op);
        self.mark(Capability::ValidateAndFilterProps);
    }

    pub fn override_get_width(&mut self, op: impl Fn(&ChartState, &dyn Container) -> f64 + 'static) {
        self.get_width = Rc::new(op);
        self.mark(Capability::GetWidth);
    }

    pub fn override_get_height(
        &mut self,
        op: impl Fn(&ChartState, &dyn Container) -> f64 + 'static,
    ) {
        self.get_height = Rc::new(op);
        self.mark(Capability::GetHeight);
    }

    pub fn override_core_width(&mut self, op: impl Fn(&ChartState) -> f64 + 'static) {
        self.core_width = Rc::new(op);
        self.mark(Capability::CoreWidth);
    }

    pub fn override_core_height(&mut self, op: impl Fn(&ChartState) -> f64 + 'static) {
        self.core_height = Rc::new(op);
        self.mark(Capability::CoreHeight);
    }

    pub fn override_set_scale(
        &mut self,
        op: impl Fn(&ChartState, ScaleArg, ScaleArg, ScaleArg) -> ChartResult<Scale> + 'static,
    ) {
        self.set_scale = Rc::new(op);
        self.mark(Capability::SetScale);
    }

    pub fn override_set_domain(
        &mut self,
        op: impl Fn(&ChartState, BoundArg<'_>, BoundArg<'_>, BoundArg<'_>) -> ChartResult<()>
        + 'static,
    ) {
        self.set_domain = Rc::new(op);
        self.mark(Capability::SetDomain);
    }

    pub fn override_set_range(
        &mut self,
        op: impl Fn(&ChartState, BoundArg<'_>, BoundArg<'_>, BoundArg<'_>) -> ChartResult<()>
        + 'static,
    ) {
        self.set_range = Rc::new(op);
        self.mark(Capability::SetRange);
    }

    pub fn override_add_transition(
        &mut self,
        op: impl Fn(&mut ChartState, &str, Duration, &Props, &Props) -> ChartResult<usize> + 'static,
    ) {
        self.add_transition = Rc::new(op);
        self.mark(Capability::AddTransition);
    }
}

fn standard_load_options(chart: &mut ChartState, source: &OptionMap) {
    for (key, raw) in source {
        if is_reserved_key(key) {
            trace!(key = key.as_str(), "skipping reserved binding key");
            continue;
        }
        match coerce_option(raw) {
            Some(value) => chart.config_mut().insert(key.as_str(), value),
            None => warn!(key = key.as_str(), "skipping non-scalar option value"),
        }
    }
}

fn standard_svg_reset(chart: &mut ChartState, selector: &str) {
    let removed = chart.svg_mut().remove_matching(selector);
    trace!(selector, removed, "svg reset");
}

fn standard_load_data(chart: &mut ChartState, dataset: &Dataset) -> ChartResult<()> {
    let loaded = validate_dataset(dataset)?;
    chart.assign_data(loaded);
    Ok(())
}

fn standard_validate_props(
    _chart: &ChartState,
    props: Option<&Props>,
    required: &Keys,
) -> ChartResult<bool> {
    let props = props.ok_or_else(|| {
        ChartError::InvalidArgument("a property mapping is required for validation".to_owned())
    })?;
    Ok(has_all_keys(props, required))
}

fn standard_filter_props(
    chart: &ChartState,
    props: Option<&Props>,
    required: &Keys,
    optional: &Keys,
) -> ChartResult<Props> {
    let Some(props) = props else {
        return Err(ChartError::InvalidArgument(
            "a property mapping is required for filtering".to_owned(),
        ));
    };
    if !chart.dispatch_validate_props(Some(props), required)? {
        return Ok(Props::new());
    }
    Ok(pick_keys(props, required, optional))
}

fn standard_validate_and_filter_props(
    chart: &ChartState,
    props: Option<&Props>,
    required: &Keys,
    optional: &Keys,
) -> ChartResult<Option<Props>> {
    if !chart.dispatch_validate_props(props, required)? {
        return Ok(None);
    }
    chart.dispatch_filter_props(props, required, optional).map(Some)
}

fn standard_get_width(_chart: &ChartState, element: &dyn Container) -> f64 {
    element.offset_width()
}

fn standard_get_height(_chart: &ChartState, element: &dyn Container) -> f64 {
    element.offset_height()
}

fn standard_core_width(chart: &ChartState) -> f64 {
    chart.get_width(chart.core())
}

fn standard_core_height(chart: &ChartState) -> f64 {
    chart.get_height(chart.core())
}

fn standard_set_scale(
    _chart: &ChartState,
    first: ScaleArg,
    second: ScaleArg,
    third: ScaleArg,
) -> ChartResult<Scale> {
    build_scale(first, second, third)
}

fn standard_set_domain(
    _chart: &ChartState,
    min: BoundArg<'_>,
    max: BoundArg<'_>,
    scale: BoundArg<'_>,
) -> ChartResult<()> {
    apply_bounds(ScaleAxis::Domain, min, max, scale)
}

fn standard_set_range(
    _chart: &ChartState,
    min: BoundArg<'_>,
    max: BoundArg<'_>,
    scale: BoundArg<'_>,
) -> ChartResult<()> {
    apply_bounds(ScaleAxis::Range, min, max, scale)
}

fn standard_add_transition(
    chart: &mut ChartState,
    selector: &str,
    duration: Duration,
    start: &Props,
    end: &Props,
) -> ChartResult<usize> {
    let selection = chart.svg().select_all(selector);
    chart.svg_mut().set_attrs(&selection, start)?;
    chart.svg_mut().start_transition(&selection, duration, end)
}
