use std::rc::Rc;
use std::sync::Arc;

use graphular::api::{ChartHost, ChartObject, ChartTypeRegistry};
use graphular::core::{Dataset, ElementBox, Keys, Props, is_reserved_key};
use graphular::render::SceneGraphics;
use proptest::prelude::*;
use serde_json::Value;

const KEY_POOL: [&str; 6] = ["height", "width", "x", "y", "fill", "text"];

fn bar_chart() -> ChartObject {
    ChartHost::builder()
        .with_registry(Arc::new(ChartTypeRegistry::with_builtin_types()))
        .with_graphics(Rc::new(SceneGraphics))
        .build()
        .expect("host")
        .materialize(Rc::new(ElementBox::new(500.0, 300.0)), "bar")
        .expect("materialize")
}

fn subset(mask: u8) -> Vec<String> {
    KEY_POOL
        .iter()
        .enumerate()
        .filter(|(bit, _)| mask & (1 << bit) != 0)
        .map(|(_, key)| (*key).to_owned())
        .collect()
}

proptest! {
    #[test]
    fn flat_values_report_count_and_max(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..64)) {
        let mut chart = bar_chart();
        chart.state_mut().load_data(&Dataset::from_values(&values)).expect("load");
        let expected = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(chart.state().data_count(), values.len());
        prop_assert_eq!(chart.state().data_max(), expected);
    }

    #[test]
    fn records_report_max_value(values in prop::collection::vec(-1.0e6f64..1.0e6, 1..64)) {
        let mut chart = bar_chart();
        let records = values.iter().enumerate().map(|(i, value)| (format!("r{i}"), *value));
        chart.state_mut().load_data(&Dataset::from_records(records)).expect("load");
        let expected = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(chart.state().data_count(), values.len());
        prop_assert_eq!(chart.state().data_max(), expected);
    }

    #[test]
    fn invalid_first_element_never_mutates(
        prior in prop::collection::vec(0.0f64..100.0, 1..8),
        junk in "[a-z]{1,8}",
        tail in prop::collection::vec(0.0f64..100.0, 0..8),
    ) {
        let mut chart = bar_chart();
        chart.state_mut().load_data(&Dataset::from_values(&prior)).expect("prior");
        let max_before = chart.state().data_max();

        let mut items = vec![Value::String(junk)];
        items.extend(tail.iter().map(|value| Value::from(*value)));
        prop_assert!(chart.state_mut().load_data(&Dataset::new(items)).is_err());
        prop_assert_eq!(chart.state().data_count(), prior.len());
        prop_assert_eq!(chart.state().data_max(), max_before);
    }

    #[test]
    fn reserved_keys_never_reach_the_config(
        plain in prop::collection::btree_map("[a-z][a-zA-Z]{0,6}", "[0-9a-z]{0,5}", 0..6),
        reserved in prop::collection::btree_map("\\${1,2}[a-z]{1,6}", "[0-9a-z]{0,5}", 1..6),
    ) {
        let mut source = serde_json::Map::new();
        for (key, value) in plain.iter().chain(reserved.iter()) {
            source.insert(key.clone(), Value::String(value.clone()));
        }
        let mut chart = bar_chart();
        chart.state_mut().load_options(&source);
        let config = chart.state().config();
        prop_assert!(config.keys().all(|key| !is_reserved_key(key)));
        for key in plain.keys() {
            prop_assert!(config.contains_key(key));
        }
    }

    #[test]
    fn filter_props_is_the_key_intersection(present in 0u8..64, required in 0u8..64, optional in 0u8..64) {
        let chart = bar_chart();
        let mut props = Props::new();
        for key in subset(present) {
            props.insert(key, 1.0);
        }
        let required_keys = subset(required);
        let optional_keys = subset(optional);
        let filtered = chart
            .state()
            .filter_props(Some(&props), Keys::from(required_keys.clone()), Keys::from(optional_keys.clone()))
            .expect("mapping supplied");

        let complete = required & !present == 0;
        if complete {
            let wanted = (required | optional) & present;
            let mut expected = subset(wanted);
            let mut actual: Vec<String> = filtered.keys().map(str::to_owned).collect();
            expected.sort();
            actual.sort();
            prop_assert_eq!(actual, expected);
        } else {
            prop_assert!(filtered.is_empty());
        }
    }
}
