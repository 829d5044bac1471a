use colored::Colorize;
use std::fmt::Write as _;
use std::path::Path;

use crate::{
    analysis::AnalyzerRegistry,
    cli::FiltersCommand,
    config::{Config, load_config, save_config},
    error::ConfigError,
};

/// List, add or remove active filters in the configuration file.
pub fn handle_filters(command: FiltersCommand, config_path: Option<&Path>) -> crate::Result<String> {
    let mut config = load_config(config_path)?;
    let registry = AnalyzerRegistry::from_config(&config);

    match command {
        FiltersCommand::List => Ok(list_filters(&config, &registry)),
        FiltersCommand::Add { filters } => {
            for filter in &filters {
                if !registry.is_known(filter) {
                    return Err(ConfigError::UnknownFilter(filter.clone()).into());
                }
            }
            let mut added = Vec::new();
            for filter in filters {
                if !config.active_filters.contains(&filter) {
                    config.active_filters.push(filter.clone());
                    added.push(filter);
                }
            }
            if added.is_empty() {
                return Ok("Filters already active, nothing to add\n".to_string());
            }
            save_config(config_path, &config)?;
            Ok(format!("Filter(s) {} added\n", added.join(", ")))
        }
        FiltersCommand::Remove { filters } => {
            if config.active_filters.is_empty() {
                config.active_filters = registry.available().core;
            }
            for filter in &filters {
                if !config.active_filters.contains(filter) {
                    return Err(ConfigError::UnknownFilter(filter.clone()).into());
                }
            }
            config.active_filters.retain(|f| !filters.contains(f));
            save_config(config_path, &config)?;
            Ok(format!("Filter(s) {} removed\n", filters.join(", ")))
        }
    }
}

fn list_filters(config: &Config, registry: &AnalyzerRegistry) -> String {
    let available = registry.available();
    let active: Vec<String> = if config.active_filters.is_empty() {
        available.core.clone()
    } else {
        config.active_filters.clone()
    };

    let mut out = String::new();
    let _ = writeln!(out, "{}", "Active:".bold());
    for filter in &active {
        let _ = writeln!(out, "> {}", filter.green());
    }

    let unused: Vec<&String> = available
        .core
        .iter()
        .chain(available.additional.iter())
        .filter(|f| !active.contains(f))
        .collect();
    if !unused.is_empty() {
        let _ = writeln!(out, "{}", "Unused:".bold());
        for filter in unused {
            let _ = writeln!(out, "> {}", filter.red());
        }
    }

    if !available.custom.is_empty() {
        let _ = writeln!(out, "{}", "Custom analyzers:".bold());
        for name in &available.custom {
            let _ = writeln!(out, "> {}", name.cyan());
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_add_then_remove() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kubesage.toml");

        let message = handle_filters(
            FiltersCommand::Add {
                filters: vec!["Ingress".into(), "NetworkPolicy".into()],
            },
            Some(&path),
        )
        .unwrap();
        assert_eq!(message, "Filter(s) Ingress, NetworkPolicy added\n");
        assert_eq!(
            load_config(Some(&path)).unwrap().active_filters,
            vec!["Ingress", "NetworkPolicy"]
        );

        handle_filters(
            FiltersCommand::Remove {
                filters: vec!["Ingress".into()],
            },
            Some(&path),
        )
        .unwrap();
        assert_eq!(
            load_config(Some(&path)).unwrap().active_filters,
            vec!["NetworkPolicy"]
        );
    }

    #[test]
    fn test_unknown_filter_is_rejected() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kubesage.toml");
        let err = handle_filters(
            FiltersCommand::Add {
                filters: vec!["Bogus".into()],
            },
            Some(&path),
        )
        .unwrap_err();
        assert!(err.to_string().contains("Unknown filter: Bogus"));
        assert!(!path.exists());
    }

    #[test]
    fn test_list_defaults_to_core() {
        colored::control::set_override(false);
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("kubesage.toml");
        let listing = handle_filters(FiltersCommand::List, Some(&path)).unwrap();
        assert!(listing.contains("Active:\n> Pod\n"));
        assert!(listing.contains("Unused:\n> HorizontalPodAutoScaler\n"));
    }
}
