use std::sync::Arc;

use serde_json::Value;

use crate::{core::types::NormalizedNode, graph::store::NodeLookup};

/// Read access to a normalized node whose document links are resolved on
/// demand through a [`NodeLookup`]. Nothing is denormalized up front, so
/// cyclic link graphs are walked one hop at a time.
#[derive(Clone)]
pub struct NodeProxy<'a> {
    node: Arc<NormalizedNode>,
    repository_name: &'a str,
    lookup: &'a dyn NodeLookup,
}

impl<'a> NodeProxy<'a> {
    pub fn new(node: Arc<NormalizedNode>, repository_name: &'a str, lookup: &'a dyn NodeLookup) -> Self {
        Self {
            node,
            repository_name,
            lookup,
        }
    }

    pub fn get(repository_name: &'a str, id: &str, lookup: &'a dyn NodeLookup) -> Option<Self> {
        lookup
            .node(repository_name, id)
            .map(|node| Self::new(node, repository_name, lookup))
    }

    pub fn node(&self) -> &Arc<NormalizedNode> {
        &self.node
    }

    pub fn id(&self) -> &str {
        &self.node.id
    }

    /// Dotted path into `data`, e.g. `body.0.primary.title`. Numeric segments
    /// index arrays.
    pub fn field(&self, path: &str) -> Option<&Value> {
        field_at(&self.node.data, path)
    }

    pub fn link_id(&self, path: &str) -> Option<&str> {
        self.field(path).and_then(link_target)
    }

    /// Looks the link's target up in the store at call time.
    pub fn resolve_link(&self, path: &str) -> Option<NodeProxy<'a>> {
        let id = self.link_id(path)?;
        Self::get(self.repository_name, id, self.lookup)
    }

    /// Resolves `link_field` on every element of the group at `group_path`.
    /// Elements whose target is absent are skipped.
    pub fn resolve_links(&self, group_path: &str, link_field: &str) -> Vec<NodeProxy<'a>> {
        self.field(group_path)
            .and_then(Value::as_array)
            .map(|elements| {
                elements
                    .iter()
                    .filter_map(|element| field_at(element, link_field))
                    .filter_map(link_target)
                    .filter_map(|id| Self::get(self.repository_name, id, self.lookup))
                    .collect()
            })
            .unwrap_or_default()
    }
}

impl std::fmt::Debug for NodeProxy<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("NodeProxy")
            .field("repository_name", &self.repository_name)
            .field("id", &self.node.id)
            .finish()
    }
}

pub fn resolve_link(
    lookup: &dyn NodeLookup,
    repository_name: &str,
    node: &NormalizedNode,
    path: &str,
) -> Option<Arc<NormalizedNode>> {
    let id = field_at(&node.data, path).and_then(link_target)?;
    lookup.node(repository_name, id)
}

fn field_at<'v>(root: &'v Value, path: &str) -> Option<&'v Value> {
    if path.is_empty() {
        return Some(root);
    }
    path.split('.').try_fold(root, |current, segment| match current {
        Value::Object(fields) => fields.get(segment),
        Value::Array(items) => segment.parse::<usize>().ok().and_then(|idx| items.get(idx)),
        _ => None,
    })
}

fn link_target(link: &Value) -> Option<&str> {
    link.get("document").and_then(Value::as_str)
}
