use std::rc::Rc;
use std::sync::Arc;

use graphular::api::{
    Attributes, ChartHost, ChartObject, ChartTypeRegistry, DirectiveBindings, RenderOutcome,
    pipeline,
};
use graphular::core::{Dataset, ElementBox, OptionMap, OptionValue};
use graphular::render::SceneGraphics;
use serde_json::json;

fn host() -> ChartHost {
    ChartHost::builder()
        .with_registry(Arc::new(ChartTypeRegistry::with_builtin_types()))
        .with_graphics(Rc::new(SceneGraphics))
        .build()
        .expect("host")
}

fn bar_chart() -> ChartObject {
    host()
        .materialize(Rc::new(ElementBox::new(400.0, 300.0)), "bar")
        .expect("materialize")
}

fn options(value: serde_json::Value) -> OptionMap {
    match value {
        serde_json::Value::Object(map) => map,
        other => panic!("expected an object, got {other}"),
    }
}

#[test]
fn load_options_coerces_numeric_strings() {
    let mut chart = bar_chart();
    chart.state_mut().load_options(&options(json!({
        "margin": "30",
        "ratio": " 0.25 ",
        "title": "Sales",
        "showDetails": true,
        "limit": 12,
        "weird": "inf",
    })));
    let config = chart.state().config();
    assert_eq!(config.get("margin"), Some(&OptionValue::Number(30.0)));
    assert_eq!(config.number("ratio"), Some(0.25));
    assert_eq!(config.text("title"), Some("Sales"));
    assert_eq!(config.get("showDetails"), Some(&OptionValue::Flag(true)));
    assert_eq!(config.number("limit"), Some(12.0));
    assert_eq!(config.text("weird"), Some("inf"));
}

#[test]
fn load_options_keeps_the_number_in_front_of_a_unit() {
    let mut chart = bar_chart();
    chart.state_mut().load_options(&options(json!({
        "margin": "30px",
        "barHeight": "12.5",
        "label": "px30",
    })));
    let config = chart.state().config();
    assert_eq!(config.number("margin"), Some(30.0));
    assert_eq!(config.number("barHeight"), Some(12.5));
    assert_eq!(config.text("label"), Some("px30"));

    chart
        .render(Some(&Dataset::from_values(&[1.0, 2.0])))
        .expect("render");
    let svg = chart.state().svg();
    let rect = svg.node(svg.select_all("rect").ids()[0]).expect("first bar");
    assert_eq!(rect.attr("x").and_then(|x| x.as_number()), Some(15.0));
    assert_eq!(rect.attr("height").and_then(|h| h.as_number()), Some(12.5));
}

#[test]
fn load_options_skips_reserved_and_structured_values() {
    let mut chart = bar_chart();
    let before = chart.state().config().len();
    chart.state_mut().load_options(&options(json!({
        "$id": "001",
        "$$hashKey": "object:3",
        "nested": {"a": 1},
        "list": [1, 2],
        "missing": null,
        "padding": "8",
    })));
    let config = chart.state().config();
    assert!(!config.contains_key("$id"));
    assert!(!config.contains_key("$$hashKey"));
    assert!(!config.contains_key("nested"));
    assert!(!config.contains_key("list"));
    assert!(!config.contains_key("missing"));
    assert_eq!(config.len(), before + 1);
    assert_eq!(config.number("padding"), Some(8.0));
}

#[test]
fn load_options_is_idempotent() {
    let mut chart = bar_chart();
    let source = options(json!({"barHeight": "12", "title": "x", "$scope": 1}));
    chart.state_mut().load_options(&source);
    let once = chart.state().config().clone();
    chart.state_mut().load_options(&source);
    assert_eq!(chart.state().config(), &once);
}

#[test]
fn bound_options_override_attributes_which_override_defaults() {
    let mut chart = bar_chart();
    let attributes = Attributes::from_markup([
        ("data-bar-height", "30"),
        ("bar-padding", "10"),
        ("title", "from attributes"),
    ]);
    let bound = options(json!({"barPadding": 2, "title": "from options"}));
    pipeline::configure(&mut chart, &attributes, Some(&bound));

    let config = chart.state().config();
    assert_eq!(config.number("margin"), Some(20.0));
    assert_eq!(config.number("barHeight"), Some(30.0));
    assert_eq!(config.number("barPadding"), Some(2.0));
    assert_eq!(config.text("title"), Some("from options"));
}

#[test]
fn flag_truthiness_follows_host_conventions() {
    let mut chart = bar_chart();
    chart.state_mut().load_options(&options(json!({
        "on": true,
        "off": false,
        "one": "1",
        "zero": 0,
        "yes": "yes",
        "no": "false",
        "blank": "",
    })));
    let config = chart.state().config();
    assert!(config.flag("on"));
    assert!(!config.flag("off"));
    assert!(config.flag("one"));
    assert!(!config.flag("zero"));
    assert!(config.flag("yes"));
    assert!(!config.flag("no"));
    assert!(!config.flag("blank"));
    assert!(!config.flag("absent"));
}

#[test]
fn updating_bound_options_does_not_schedule_a_render() {
    let host = host();
    let bindings = DirectiveBindings::new(Attributes::new())
        .with_data(Rc::new(Dataset::from_values(&[1.0, 2.0])));
    let mut directive = host
        .attach(Rc::new(ElementBox::new(300.0, 200.0)), "bar", bindings)
        .expect("attach");
    assert!(matches!(
        directive.flush().expect("mount render"),
        RenderOutcome::Drawn { .. }
    ));

    directive.update_options(&options(json!({"barHeight": 8, "$parent": {}})));
    assert_eq!(directive.pending_triggers(), 0);
    assert_eq!(directive.flush().expect("flush"), RenderOutcome::Idle);
    assert_eq!(directive.renderer().render_count, 1);
    assert_eq!(directive.chart().state().config().number("barHeight"), Some(8.0));
    assert!(!directive.chart().state().config().contains_key("$parent"));
}
