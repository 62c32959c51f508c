pub mod bootstrap;
pub mod core;
pub mod graph;
pub mod normalizer;
pub mod providers;
pub mod security;
pub mod typepaths;

use tracing_subscriber::EnvFilter;

pub use crate::bootstrap::PreviewBootstrap;
pub use crate::core::{
    config::PreviewConfig,
    errors::{PreviewError, PreviewResult},
    types::{BootstrapState, BootstrapStatus, Document, NormalizedNode},
};
pub use crate::graph::{
    merge::merge_preview_data,
    proxy::NodeProxy,
    store::{NodeGraphState, NodeLookup, PreviewRegistry},
};
pub use crate::normalizer::{normalize, normalize_documents, FieldResolvers};

fn log_filter_from_env() -> EnvFilter {
    let level = std::env::var("PRISMIC_PREVIEW_LOG")
        .unwrap_or_else(|_| "info".to_string())
        .to_ascii_lowercase();
    match level.as_str() {
        "trace" | "debug" | "info" | "warn" | "error" => EnvFilter::new(format!("prismic_preview={level}")),
        directives => EnvFilter::try_new(directives).unwrap_or_else(|_| EnvFilter::new("prismic_preview=info")),
    }
}

/// Installs a fmt subscriber filtered by `PRISMIC_PREVIEW_LOG`. Does nothing
/// if a global subscriber is already set.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(log_filter_from_env())
        .try_init();
}
