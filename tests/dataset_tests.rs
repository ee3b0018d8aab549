use std::rc::Rc;
use std::sync::Arc;

use graphular::ChartError;
use graphular::api::{ChartHost, ChartObject, ChartTypeRegistry};
use graphular::core::{DataFormat, Dataset, Datum, ElementBox};
use graphular::render::SceneGraphics;
use serde_json::json;

fn bar_chart() -> ChartObject {
    ChartHost::builder()
        .with_registry(Arc::new(ChartTypeRegistry::with_builtin_types()))
        .with_graphics(Rc::new(SceneGraphics))
        .build()
        .expect("host")
        .materialize(Rc::new(ElementBox::new(400.0, 300.0)), "bar")
        .expect("materialize")
}

#[test]
fn flat_values_load_with_count_and_max() {
    let mut chart = bar_chart();
    chart
        .state_mut()
        .load_data(&Dataset::from_values(&[3.0, 11.0, -2.0, 7.5]))
        .expect("load");
    let state = chart.state();
    assert_eq!(state.data_format(), Some(DataFormat::Values));
    assert_eq!(state.data_count(), 4);
    assert_eq!(state.data_max(), 11.0);
    assert_eq!(state.data()[2], Datum::new(-2.0));
}

#[test]
fn records_load_labels_and_use_value_field_for_max() {
    let mut chart = bar_chart();
    chart
        .state_mut()
        .load_data(&Dataset::from_records([("A", 40.0), ("B", 90.0), ("C", 12.0)]))
        .expect("load");
    let state = chart.state();
    assert_eq!(state.data_format(), Some(DataFormat::Records));
    assert_eq!(state.data_count(), 3);
    assert_eq!(state.data_max(), 90.0);
    assert_eq!(state.data()[1], Datum::labeled("B", 90.0));
}

#[test]
fn numeric_strings_count_as_numbers() {
    let mut chart = bar_chart();
    let dataset = Dataset::new(vec![json!({"label": "A", "value": "12"}), json!({"value": 4})]);
    chart.state_mut().load_data(&dataset).expect("load");
    assert_eq!(chart.state().data_max(), 12.0);
    assert_eq!(chart.state().data()[1].label, None);
}

#[test]
fn empty_dataset_is_rejected() {
    let mut chart = bar_chart();
    let dataset = Dataset::from_json_str("[]").expect("parse");
    let err = chart.state_mut().load_data(&dataset).expect_err("empty");
    assert!(matches!(err, ChartError::InvalidDataFormat(_)));
}

#[test]
fn non_numeric_first_element_is_rejected() {
    let mut chart = bar_chart();
    for items in [
        vec![json!("abc"), json!(1)],
        vec![json!({"label": "A", "value": "n/a"})],
        vec![json!({"label": "A"})],
        vec![json!(null)],
        vec![json!([1, 2])],
    ] {
        let err = chart
            .state_mut()
            .load_data(&Dataset::new(items))
            .expect_err("invalid first element");
        assert!(matches!(err, ChartError::InvalidDataFormat(_)));
    }
}

#[test]
fn format_is_locked_by_the_first_element() {
    let mut chart = bar_chart();
    let mixed = Dataset::new(vec![json!(1), json!({"label": "B", "value": 2})]);
    let err = chart.state_mut().load_data(&mixed).expect_err("mixed");
    assert!(matches!(err, ChartError::InvalidDataFormat(_)));

    let mixed = Dataset::new(vec![json!({"label": "A", "value": 2}), json!(3)]);
    let err = chart.state_mut().load_data(&mixed).expect_err("mixed");
    assert!(matches!(err, ChartError::InvalidDataFormat(_)));
}

#[test]
fn failed_load_leaves_previous_data_untouched() {
    let mut chart = bar_chart();
    chart
        .state_mut()
        .load_data(&Dataset::from_values(&[1.0, 2.0, 3.0]))
        .expect("load");

    let bad = Dataset::new(vec![json!(5), json!(6), json!("seven")]);
    chart.state_mut().load_data(&bad).expect_err("third element invalid");

    let state = chart.state();
    assert_eq!(state.data_count(), 3);
    assert_eq!(state.data_max(), 3.0);
    assert_eq!(state.data_format(), Some(DataFormat::Values));
}

#[test]
fn each_load_replaces_the_dataset_wholesale() {
    let mut chart = bar_chart();
    chart
        .state_mut()
        .load_data(&Dataset::from_values(&[100.0, 200.0]))
        .expect("first");
    chart
        .state_mut()
        .load_data(&Dataset::from_records([("only", 5.0)]))
        .expect("second");
    let state = chart.state();
    assert_eq!(state.data_count(), 1);
    assert_eq!(state.data_max(), 5.0);
    assert_eq!(state.data_format(), Some(DataFormat::Records));
}

#[test]
fn json_parse_failures_surface_as_invalid_data_format() {
    let err = Dataset::from_json_str("[1, 2").expect_err("truncated");
    assert!(matches!(err, ChartError::InvalidDataFormat(_)));
}
