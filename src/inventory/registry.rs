//! Explicit collector registry.
//!
//! Built by the caller and passed by reference into the scheduler; there is
//! no ambient global state and no registration-order dependence.

use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::warn;

use super::collector::Collector;

#[derive(Default, Clone)]
pub struct CollectorRegistry {
    collectors: BTreeMap<&'static str, Arc<dyn Collector>>,
}

impl CollectorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, collector: Arc<dyn Collector>) {
        let name = collector.name();
        if self.collectors.insert(name, collector).is_some() {
            warn!("collector {} registered twice, keeping the later one", name);
        }
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Collector>> {
        self.collectors.get(name)
    }

    /// Registry restricted to the named categories. Unknown names are
    /// dropped with a warning, not an error.
    pub fn filter(&self, categories: &[String]) -> Self {
        let mut filtered = Self::new();
        for name in categories {
            match self.collectors.get(name.as_str()) {
                Some(collector) => filtered.register(collector.clone()),
                None => warn!("unknown category {} ignored", name),
            }
        }
        filtered
    }

    /// Collectors in lexicographic category order.
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Collector>> {
        self.collectors.values()
    }

    pub fn category_names(&self) -> Vec<&'static str> {
        self.collectors.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.collectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.collectors.is_empty()
    }
}
