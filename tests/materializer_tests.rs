use std::rc::Rc;
use std::sync::Arc;

use graphular::ChartError;
use graphular::api::{
    Capability, ChartHost, ChartObject, ChartState, ChartTypeRegistry, Materializer,
    registered_name,
};
use graphular::core::{Config, ElementBox};
use graphular::extensions::ChartType;
use graphular::render::SceneGraphics;

fn isolated_host() -> ChartHost {
    ChartHost::builder()
        .with_registry(Arc::new(ChartTypeRegistry::with_builtin_types()))
        .with_graphics(Rc::new(SceneGraphics))
        .build()
        .expect("host")
}

struct FixedChart;

impl ChartType for FixedChart {
    fn defaults(&self) -> Config {
        Config::new().with("radius", 4.0).with("label", "fixed")
    }

    fn draw(&mut self, _chart: &mut ChartState) -> graphular::ChartResult<()> {
        Ok(())
    }
}

fn fixed_chart() -> Box<dyn ChartType> {
    Box::new(FixedChart)
}

#[test]
fn host_without_graphics_library_fails_to_build() {
    let err = ChartHost::builder()
        .with_registry(Arc::new(ChartTypeRegistry::new()))
        .build()
        .expect_err("graphics library is mandatory");
    assert!(matches!(err, ChartError::MissingLibrary(_)));
}

#[test]
fn unregistered_identifier_is_rejected() {
    let host = isolated_host();
    let err = host
        .materialize(Rc::new(ElementBox::new(300.0, 200.0)), "unicorn")
        .expect_err("unicorn is not registered");
    match err {
        ChartError::UnknownChartType {
            identifier,
            registered_name,
        } => {
            assert_eq!(identifier, "unicorn");
            assert_eq!(registered_name, "graphularUnicorn");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn identifiers_resolve_case_insensitively_on_first_letter() {
    let host = isolated_host();
    let lower = host
        .materialize(Rc::new(ElementBox::new(300.0, 200.0)), "bar")
        .expect("bar");
    let upper = host
        .materialize(Rc::new(ElementBox::new(300.0, 200.0)), "Bar")
        .expect("Bar");
    assert_eq!(lower.type_name(), "graphularBar");
    assert_eq!(upper.type_name(), lower.type_name());
}

#[test]
fn every_chart_object_exposes_the_full_operation_set() {
    let names = ChartObject::operation_names();
    assert_eq!(names.first(), Some(&"init"));
    assert_eq!(names.len(), 15);
    for expected in [
        "loadOptions",
        "svgReset",
        "loadData",
        "validateProps",
        "filterProps",
        "validateAndFilterProps",
        "getWidth",
        "getHeight",
        "coreWidth",
        "coreHeight",
        "setScale",
        "setDomain",
        "setRange",
        "addTransition",
    ] {
        assert!(names.contains(&expected), "missing `{expected}`");
    }
}

#[test]
fn core_dimensions_follow_the_container_unless_redecorated() {
    let host = isolated_host();
    let element = Rc::new(ElementBox::new(640.0, 480.0));

    let bar = host.materialize(element.clone(), "bar").expect("bar");
    assert_eq!(bar.state().core_width(), 640.0);
    assert_eq!(bar.state().core_height(), 480.0);
    assert!(!bar.state().capabilities().is_overridden(Capability::CoreWidth));

    let example = host.materialize(element.clone(), "example").expect("example");
    assert_eq!(example.state().core_width(), 320.0);
    assert_eq!(example.state().core_height(), 480.0);
    assert!(example.state().capabilities().is_overridden(Capability::CoreWidth));
    assert!(!example.state().capabilities().is_overridden(Capability::CoreHeight));

    element.resize(800.0, 100.0);
    assert_eq!(bar.state().core_width(), 800.0);
    assert_eq!(example.state().core_width(), 400.0);
    assert_eq!(example.state().get_width(example.state().core()), 800.0);
}

#[test]
fn init_copies_defaults_and_sizes_the_surface_once() {
    let host = isolated_host();
    let chart = host
        .materialize(Rc::new(ElementBox::new(500.0, 300.0)), "bar")
        .expect("bar");
    let state = chart.state();
    assert_eq!(state.config().number("margin"), Some(20.0));
    assert_eq!(state.config().number("barHeight"), Some(20.0));
    assert_eq!(state.config().number("barPadding"), Some(5.0));
    assert_eq!(state.svg().root_style("width"), Some("100%"));
    assert_eq!(state.svg().node_count(), 0);
    assert_eq!(state.data_count(), 0);
    assert!(state.data_format().is_none());
}

#[test]
fn custom_chart_types_register_and_materialize() {
    let registry = Arc::new(ChartTypeRegistry::new());
    registry.register("fixed-chart", fixed_chart).expect("register");
    assert!(registry.contains("fixed_chart"));
    assert_eq!(registry.registered_names(), ["graphularFixedChart"]);

    let materializer = Materializer::new(Arc::clone(&registry), Rc::new(SceneGraphics));
    let chart = materializer
        .materialize(Rc::new(ElementBox::new(100.0, 100.0)), "fixed chart")
        .expect("materialize");
    assert_eq!(chart.type_name(), "graphularFixedChart");
    assert_eq!(chart.state().config().number("radius"), Some(4.0));
    assert_eq!(chart.state().config().text("label"), Some("fixed"));
}

#[test]
fn duplicate_and_empty_registrations_are_rejected() {
    let registry = ChartTypeRegistry::new();
    registry.register("fixed", fixed_chart).expect("first registration");
    let err = registry
        .register("Fixed", fixed_chart)
        .expect_err("same normalized name");
    assert!(matches!(err, ChartError::DuplicateChartType(name) if name == "graphularFixed"));

    let err = registry.register("  ", fixed_chart).expect_err("empty id");
    assert!(matches!(err, ChartError::InvalidArgument(_)));
}

#[test]
fn unregister_removes_the_constructor() {
    let registry = ChartTypeRegistry::with_builtin_types();
    assert!(registry.unregister("example"));
    assert!(!registry.unregister("example"));
    assert!(!registry.contains("example"));
    assert!(registry.contains("bar"));
    let err = registry.resolve("example").expect_err("unregistered");
    assert!(matches!(err, ChartError::UnknownChartType { .. }));
}

#[test]
fn global_registry_ships_builtin_types() {
    let registry = ChartTypeRegistry::global();
    assert!(registry.contains("bar"));
    assert!(registry.contains("example"));
    assert!(Arc::ptr_eq(&registry, &ChartTypeRegistry::global()));
    assert_eq!(registered_name("example"), "graphularExample");
}
