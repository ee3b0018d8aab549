use crate::core::props::AttrValue;

/// The twenty-color categorical palette (d3 `category20`).
pub const CATEGORY20: [&str; 20] = [
    "#1f77b4", "#aec7e8", "#ff7f0e", "#ffbb78", "#2ca02c", "#98df8a", "#d62728", "#ff9896",
    "#9467bd", "#c5b0d5", "#8c564b", "#c49c94", "#e377c2", "#f7b6d2", "#7f7f7f", "#c7c7c7",
    "#bcbd22", "#dbdb8d", "#17becf", "#9edae5",
];

/// Palette as scale range values, for an ordinal `setScale`.
#[must_use]
pub fn category20() -> Vec<AttrValue> {
    CATEGORY20.iter().copied().map(AttrValue::from).collect()
}

#[cfg(test)]
mod tests {
    use super::category20;
    use crate::core::{AttrValue, Scale, ScaleKind};

    #[test]
    fn ordinal_palette_reuses_colors_for_repeated_keys() {
        let scale = Scale::new(ScaleKind::Ordinal)
            .with_domain([40.0, 90.0, 40.0])
            .with_range(category20());
        assert_eq!(scale.domain().len(), 2);
        assert_eq!(scale.map(&AttrValue::Number(40.0)), Some(AttrValue::from("#1f77b4")));
        assert_eq!(scale.map(&AttrValue::Number(90.0)), Some(AttrValue::from("#aec7e8")));
    }

    #[test]
    fn ordinal_palette_cycles_after_twenty_keys() {
        let scale = Scale::new(ScaleKind::Ordinal)
            .with_domain((0..21).map(f64::from))
            .with_range(category20());
        assert_eq!(scale.map(&AttrValue::Number(20.0)), Some(AttrValue::from("#1f77b4")));
    }
}
