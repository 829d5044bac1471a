use log::debug;
use std::sync::Arc;

use crate::analyzer::{Analyzer, HttpCustomAnalyzer, additional_analyzers, core_analyzers};
use crate::config::types::Config;

/// Which filter source decided the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionTier {
    Explicit,
    Active,
    Core,
}

/// Built-in and custom analyzers known to a run.
#[derive(Clone)]
pub struct AnalyzerRegistry {
    core: Vec<Arc<dyn Analyzer>>,
    additional: Vec<Arc<dyn Analyzer>>,
    custom: Vec<Arc<dyn Analyzer>>,
}

/// Analyzer identifiers grouped the way `filters list` prints them.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AvailableAnalyzers {
    pub core: Vec<String>,
    pub additional: Vec<String>,
    pub custom: Vec<String>,
}

impl Default for AnalyzerRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl AnalyzerRegistry {
    pub fn new() -> Self {
        Self {
            core: core_analyzers(),
            additional: additional_analyzers(),
            custom: Vec::new(),
        }
    }

    /// Built-ins plus the custom analyzers listed in the configuration.
    pub fn from_config(config: &Config) -> Self {
        let mut registry = Self::new();
        for custom in &config.custom_analyzers {
            registry.register_custom(Arc::new(HttpCustomAnalyzer::from(custom)));
        }
        registry
    }

    pub fn register_custom(&mut self, analyzer: Arc<dyn Analyzer>) {
        self.custom.push(analyzer);
    }

    pub fn core(&self) -> &[Arc<dyn Analyzer>] {
        &self.core
    }

    pub fn custom(&self) -> &[Arc<dyn Analyzer>] {
        &self.custom
    }

    fn builtin(&self) -> impl Iterator<Item = &Arc<dyn Analyzer>> {
        self.core.iter().chain(self.additional.iter())
    }

    fn find_builtin(&self, id: &str) -> Option<Arc<dyn Analyzer>> {
        self.builtin().find(|a| a.name() == id).cloned()
    }

    /// Whether `id` names a built-in analyzer.
    pub fn is_known(&self, id: &str) -> bool {
        self.builtin().any(|a| a.name() == id)
    }

    pub fn available(&self) -> AvailableAnalyzers {
        let names = |list: &[Arc<dyn Analyzer>]| -> Vec<String> {
            list.iter().map(|a| a.name().to_string()).collect()
        };
        AvailableAnalyzers {
            core: names(&self.core),
            additional: names(&self.additional),
            custom: names(&self.custom),
        }
    }

    /// Resolve ids against the built-in tables, keeping caller order.
    /// Duplicates collapse and unknown ids are dropped.
    fn resolve(&self, ids: &[String]) -> Vec<Arc<dyn Analyzer>> {
        let mut selected: Vec<Arc<dyn Analyzer>> = Vec::new();
        for id in ids {
            if selected.iter().any(|a| a.name() == id) {
                continue;
            }
            if let Some(analyzer) = self.find_builtin(id) {
                selected.push(analyzer);
            }
        }
        selected
    }
}

/// The analyzers chosen for one run.
#[derive(Clone)]
pub struct Selection {
    pub tier: SelectionTier,
    pub builtin: Vec<Arc<dyn Analyzer>>,
    pub custom: Vec<Arc<dyn Analyzer>>,
}

impl Selection {
    /// Identifiers in execution order.
    pub fn ids(&self) -> Vec<String> {
        self.builtin
            .iter()
            .chain(self.custom.iter())
            .map(|a| a.name().to_string())
            .collect()
    }
}

/// Explicit filters win over active filters, which win over the core set.
pub fn select_analyzers(
    registry: &AnalyzerRegistry,
    explicit: &[String],
    active: &[String],
) -> Selection {
    let (tier, builtin) = if !explicit.is_empty() {
        debug!(
            "Debug: Filter flags [{}] specified, run selected core analyzers.",
            explicit.join(" ")
        );
        (SelectionTier::Explicit, registry.resolve(explicit))
    } else if !active.is_empty() {
        debug!(
            "Debug: Found active filters [{}], run selected core analyzers.",
            active.join(" ")
        );
        (SelectionTier::Active, registry.resolve(active))
    } else {
        debug!("Debug: No filters selected and no active filters found, run all core analyzers.");
        (SelectionTier::Core, registry.core.clone())
    };

    Selection {
        tier,
        builtin,
        custom: registry.custom.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::log_capture;
    use crate::config::types::CustomAnalyzerConfig;

    fn ids(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_selection_traces() {
        log_capture::start();
        let registry = AnalyzerRegistry::new();

        select_analyzers(&registry, &ids(&["Pod"]), &[]);
        assert!(log_capture::contains(
            "Debug: Filter flags [Pod] specified, run selected core analyzers."
        ));

        select_analyzers(&registry, &[], &ids(&["Ingress", "Pod"]));
        assert!(log_capture::contains(
            "Debug: Found active filters [Ingress Pod], run selected core analyzers."
        ));

        select_analyzers(&registry, &[], &[]);
        assert!(log_capture::contains(
            "Debug: No filters selected and no active filters found, run all core analyzers."
        ));
    }

    #[test]
    fn test_no_filters_selects_core() {
        let registry = AnalyzerRegistry::new();
        let selection = select_analyzers(&registry, &[], &[]);
        assert_eq!(selection.tier, SelectionTier::Core);
        assert_eq!(selection.ids(), registry.available().core);
    }

    #[test]
    fn test_explicit_wins_over_active() {
        let registry = AnalyzerRegistry::new();
        let selection = select_analyzers(&registry, &ids(&["Ingress", "Pod"]), &ids(&["Service"]));
        assert_eq!(selection.tier, SelectionTier::Explicit);
        assert_eq!(selection.ids(), ids(&["Ingress", "Pod"]));
    }

    #[test]
    fn test_active_filters_reach_additional_analyzers() {
        let registry = AnalyzerRegistry::new();
        let selection = select_analyzers(
            &registry,
            &[],
            &ids(&["NetworkPolicy", "Pod", "NetworkPolicy"]),
        );
        assert_eq!(selection.tier, SelectionTier::Active);
        assert_eq!(selection.ids(), ids(&["NetworkPolicy", "Pod"]));
    }

    #[test]
    fn test_unknown_filter_selects_nothing() {
        let registry = AnalyzerRegistry::new();
        let selection = select_analyzers(&registry, &ids(&["Bogus"]), &[]);
        assert!(selection.builtin.is_empty());
        assert!(!registry.is_known("Bogus"));
        assert!(registry.is_known("HorizontalPodAutoScaler"));
    }

    #[test]
    fn test_custom_analyzers_follow_builtins() {
        let config = Config {
            custom_analyzers: vec![CustomAnalyzerConfig {
                name: "trivy".into(),
                url: "localhost".into(),
                port: 8085,
            }],
            ..Default::default()
        };
        let registry = AnalyzerRegistry::from_config(&config);
        let selection = select_analyzers(&registry, &ids(&["Pod"]), &[]);
        assert_eq!(selection.ids(), ids(&["Pod", "trivy"]));
        assert_eq!(registry.available().custom, ids(&["trivy"]));
    }
}
