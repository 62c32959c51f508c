use std::{
    collections::HashMap,
    sync::{Arc, PoisonError, RwLock},
};

use crate::core::types::NormalizedNode;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct NodeGraphState {
    pub repository_name: String,
    pub nodes: HashMap<String, Arc<NormalizedNode>>,
    pub is_bootstrapped: bool,
}

impl NodeGraphState {
    fn new(repository_name: &str) -> Self {
        Self {
            repository_name: repository_name.to_string(),
            nodes: HashMap::new(),
            is_bootstrapped: false,
        }
    }

    pub fn node(&self, id: &str) -> Option<&Arc<NormalizedNode>> {
        self.nodes.get(id)
    }
}

/// Id lookup into the current node graph, evaluated when a link is read.
pub trait NodeLookup: Send + Sync {
    fn node(&self, repository_name: &str, id: &str) -> Option<Arc<NormalizedNode>>;
}

/// Session-scoped store of preview node graphs, one per repository. Share it
/// behind an `Arc` between the bootstrap handles and the readers.
#[derive(Debug, Default)]
pub struct PreviewRegistry {
    repositories: RwLock<HashMap<String, NodeGraphState>>,
}

impl PreviewRegistry {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    /// Snapshot of a repository's graph. Creates the empty state on first access.
    pub fn context(&self, repository_name: &str) -> NodeGraphState {
        if let Some(state) = self
            .repositories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(repository_name)
        {
            return state.clone();
        }
        self.repositories
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .entry(repository_name.to_string())
            .or_insert_with(|| NodeGraphState::new(repository_name))
            .clone()
    }

    pub fn is_bootstrapped(&self, repository_name: &str) -> bool {
        self.repositories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(repository_name)
            .map(|state| state.is_bootstrapped)
            .unwrap_or(false)
    }

    /// Adds or overwrites nodes by id and marks the repository bootstrapped.
    /// Existing nodes missing from `nodes` are kept. Returns the node count.
    pub fn merge<I>(&self, repository_name: &str, nodes: I) -> usize
    where
        I: IntoIterator<Item = NormalizedNode>,
    {
        let mut repositories = self
            .repositories
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let state = repositories
            .entry(repository_name.to_string())
            .or_insert_with(|| NodeGraphState::new(repository_name));
        let mut merged = 0usize;
        for node in nodes {
            state.nodes.insert(node.id.clone(), Arc::new(node));
            merged += 1;
        }
        state.is_bootstrapped = true;
        tracing::info!(
            repository = repository_name,
            merged,
            total = state.nodes.len(),
            "merged preview nodes"
        );
        state.nodes.len()
    }
}

impl NodeLookup for PreviewRegistry {
    fn node(&self, repository_name: &str, id: &str) -> Option<Arc<NormalizedNode>> {
        self.repositories
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(repository_name)
            .and_then(|state| state.nodes.get(id))
            .cloned()
    }
}
