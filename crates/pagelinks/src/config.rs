use crate::prelude::*;
use log::info;
use pagelinks_core::routes::{load_routes_config, RouteTable, RoutesConfig};

/// Route table and namespace, merged from the config file and CLI flags
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub routes: RouteTable,
    pub namespace: Option<String>,
}

impl Settings {
    /// Load the config file named by `--config`, if any
    ///
    /// `--namespace` wins over the file's `namespace` key.
    pub fn load(global: &crate::Global) -> Result<Self> {
        let config = match &global.config {
            Some(path) => {
                info!("Loading routes from {}", path.display());
                load_routes_config(path)
                    .with_context(|| f!("Failed to load config from {}", path.display()))?
            }
            None => RoutesConfig::default(),
        };

        Self::from_config(config, global.namespace.clone())
    }

    pub fn from_config(config: RoutesConfig, namespace: Option<String>) -> Result<Self> {
        let routes = config
            .route_table()
            .context("Invalid route table")?;

        Ok(Self {
            routes,
            namespace: namespace.or(config.namespace),
        })
    }
}
