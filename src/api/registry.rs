use std::sync::{Arc, OnceLock, PoisonError, RwLock};

use indexmap::IndexMap;
use tracing::debug;

use crate::error::{ChartError, ChartResult};
use crate::extensions::{self, ChartType};

/// Namespace marker every registered chart-type name starts with.
pub const NAMESPACE_PREFIX: &str = "graphular";

/// Constructor a chart-type module registers under its normalized name.
pub type ChartTypeFactory = fn() -> Box<dyn ChartType>;

/// Maps a user-facing identifier to its registered name.
///
/// Words are split on `-`, `_` and whitespace and each one gets an upper-case
/// first letter: `bar` → `graphularBar`, `stacked-bar` → `graphularStackedBar`.
#[must_use]
pub fn registered_name(identifier: &str) -> String {
    let mut name = String::from(NAMESPACE_PREFIX);
    for word in identifier
        .split(|c: char| c == '-' || c == '_' || c.is_whitespace())
        .filter(|word| !word.is_empty())
    {
        let mut chars = word.chars();
        if let Some(first) = chars.next() {
            name.extend(first.to_uppercase());
            name.push_str(chars.as_str());
        }
    }
    name
}

/// Process-wide table of chart-type constructors keyed by registered name.
#[derive(Debug, Default)]
pub struct ChartTypeRegistry {
    factories: RwLock<IndexMap<String, ChartTypeFactory>>,
}

impl ChartTypeRegistry {
    /// Empty registry, useful for isolated hosts and tests.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registry pre-populated with the bundled chart types.
    #[must_use]
    pub fn with_builtin_types() -> Self {
        let registry = Self::new();
        for register in [extensions::bar::register, extensions::example::register] {
            if let Err(err) = register(&registry) {
                debug!(error = %err, "builtin chart type already present");
            }
        }
        registry
    }

    /// Shared registry seeded with the bundled chart types on first use.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<ChartTypeRegistry>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::with_builtin_types())))
    }

    /// Registers `factory` under the normalized form of `identifier`.
    pub fn register(&self, identifier: &str, factory: ChartTypeFactory) -> ChartResult<()> {
        if identifier.trim().is_empty() {
            return Err(ChartError::InvalidArgument(
                "chart type identifier must not be empty".to_owned(),
            ));
        }
        let name = registered_name(identifier);
        let mut factories = self.factories.write().unwrap_or_else(PoisonError::into_inner);
        if factories.contains_key(&name) {
            return Err(ChartError::DuplicateChartType(name));
        }
        debug!(identifier, registered_name = name.as_str(), "chart type registered");
        factories.insert(name, factory);
        Ok(())
    }

    /// Removes a chart type. Returns `true` when it was registered.
    pub fn unregister(&self, identifier: &str) -> bool {
        let name = registered_name(identifier);
        let removed = self
            .factories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .shift_remove(&name)
            .is_some();
        if removed {
            debug!(identifier, registered_name = name.as_str(), "chart type unregistered");
        }
        removed
    }

    #[must_use]
    pub fn contains(&self, identifier: &str) -> bool {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&registered_name(identifier))
    }

    /// Registered names in registration order.
    #[must_use]
    pub fn registered_names(&self) -> Vec<String> {
        self.factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    /// Looks up the constructor for `identifier`, returning it with its registered name.
    pub fn resolve(&self, identifier: &str) -> ChartResult<(String, ChartTypeFactory)> {
        let name = registered_name(identifier);
        let factory = self
            .factories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&name)
            .copied();
        match factory {
            Some(factory) => Ok((name, factory)),
            None => Err(ChartError::UnknownChartType {
                identifier: identifier.to_owned(),
                registered_name: name,
            }),
        }
    }
}
