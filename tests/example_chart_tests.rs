use std::rc::Rc;
use std::sync::Arc;

use graphular::api::{
    Attributes, Capability, CapabilitySet, ChartHost, ChartState, ChartTypeRegistry,
    DirectiveBindings, RenderOutcome,
};
use graphular::core::{AttrValue, Dataset, ElementBox};
use graphular::extensions::example::DRAWN_MESSAGE;
use graphular::extensions::{ChartType, ExampleChart};
use graphular::render::SceneGraphics;

fn host(registry: ChartTypeRegistry) -> ChartHost {
    ChartHost::builder()
        .with_registry(Arc::new(registry))
        .with_graphics(Rc::new(SceneGraphics))
        .build()
        .expect("host")
}

#[test]
fn example_chart_draws_one_caption_at_half_width() {
    let host = host(ChartTypeRegistry::with_builtin_types());
    let bindings = DirectiveBindings::new(Attributes::new())
        .with_data(Rc::new(Dataset::from_values(&[1.0])));
    let mut directive = host
        .attach(Rc::new(ElementBox::new(300.0, 120.0)), "example", bindings)
        .expect("attach");

    assert_eq!(
        directive.flush().expect("mount"),
        RenderOutcome::Drawn { node_count: 1 }
    );
    let svg = directive.chart().state().svg();
    let captions = svg.select_all("text");
    assert_eq!(captions.len(), 1);
    let caption = svg.node(captions.ids()[0]).expect("caption");
    assert_eq!(caption.text(), Some(DRAWN_MESSAGE));
    assert_eq!(caption.attr("width"), Some(&AttrValue::Number(150.0)));
}

#[test]
fn example_chart_starts_with_its_initial_message() {
    let chart = ExampleChart::new();
    assert_eq!(chart.message(), "I am initialized.");
    assert!(chart.defaults().is_empty());
}

struct ShiftedLoader;

impl ChartType for ShiftedLoader {
    fn redecorate(&mut self, capabilities: &mut CapabilitySet) {
        capabilities.override_core_height(|chart| chart.get_height(chart.core()) - 10.0);
        capabilities.override_load_data(|chart, dataset| {
            let doubled: Vec<f64> = dataset
                .items()
                .iter()
                .filter_map(serde_json::Value::as_f64)
                .map(|value| value * 2.0)
                .collect();
            let loaded = graphular::core::validate_dataset(&Dataset::from_values(&doubled))?;
            chart.assign_data(loaded);
            Ok(())
        });
    }

    fn draw(&mut self, chart: &mut ChartState) -> graphular::ChartResult<()> {
        let height = chart.core_height();
        chart.svg_mut().set_root_attr("height", height);
        Ok(())
    }
}

fn shifted_loader() -> Box<dyn ChartType> {
    Box::new(ShiftedLoader)
}

#[test]
fn redecorated_operations_are_used_by_the_render_cycle() {
    let registry = ChartTypeRegistry::new();
    registry.register("shifted", shifted_loader).expect("register");
    let host = host(registry);
    let mut chart = host
        .materialize(Rc::new(ElementBox::new(200.0, 100.0)), "shifted")
        .expect("materialize");

    let capabilities = chart.state().capabilities();
    assert!(capabilities.is_overridden(Capability::LoadData));
    assert!(capabilities.is_overridden(Capability::CoreHeight));
    assert!(!capabilities.is_overridden(Capability::CoreWidth));

    chart
        .render(Some(&Dataset::from_values(&[1.0, 4.0])))
        .expect("render");
    assert_eq!(chart.state().data_max(), 8.0);
    assert_eq!(
        chart.state().svg().root_attr("height"),
        Some(&AttrValue::Number(90.0))
    );
}

struct GroupsOnlyReset;

impl ChartType for GroupsOnlyReset {
    fn redecorate(&mut self, capabilities: &mut CapabilitySet) {
        capabilities.override_svg_reset(|chart, _| {
            chart.svg_mut().remove_matching("g");
        });
    }

    fn draw(&mut self, chart: &mut ChartState) -> graphular::ChartResult<()> {
        let root = chart.svg().root();
        if chart.svg().select_all("defs").is_empty() {
            chart.svg_mut().append(root, "defs")?;
        }
        let data = chart.data().to_vec();
        let groups = chart.svg_mut().enter_append(root, "g", &data)?;
        chart.svg_mut().append_each(&groups, "rect")?;
        Ok(())
    }
}

fn groups_only_reset() -> Box<dyn ChartType> {
    Box::new(GroupsOnlyReset)
}

#[test]
fn selective_reset_keeps_the_surface_bounded_across_renders() {
    let registry = ChartTypeRegistry::new();
    registry.register("groups-only", groups_only_reset).expect("register");
    let host = host(registry);
    let mut chart = host
        .materialize(Rc::new(ElementBox::new(200.0, 100.0)), "groups-only")
        .expect("materialize");
    let data = Dataset::from_values(&[1.0, 2.0, 3.0]);

    for _ in 0..1000 {
        chart.render(Some(&data)).expect("render");
    }

    let svg = chart.state().svg();
    assert_eq!(svg.select_all("defs").len(), 1);
    assert_eq!(svg.select_all("g").len(), 3);
    assert_eq!(svg.node_count(), 7);
    assert_eq!(svg.arena_len(), svg.node_count() + 1);
}
