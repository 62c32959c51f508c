mod support;

use prismic_preview::{
    graph::proxy::resolve_link,
    merge_preview_data, normalize, normalize_documents,
    typepaths::{TypePathKind, TypePathMap},
    NodeLookup, NodeProxy, PreviewRegistry,
};
use serde_json::json;
use support::{document, resolvers, REPOSITORY};

fn link_paths() -> TypePathMap {
    TypePathMap::new()
        .with("page.data.next", TypePathKind::Link)
        .with("page.data.title", TypePathKind::StructuredText)
        .with("page.data.related", TypePathKind::Group)
        .with("page.data.related.item", TypePathKind::Link)
}

fn doc_link(id: &str) -> serde_json::Value {
    json!({"link_type": "Document", "id": id, "type": "page"})
}

#[test]
fn links_resolve_at_access_time() {
    let registry = PreviewRegistry::new();
    let a = normalize(
        &document("a", "page", json!({"next": doc_link("b")})),
        &link_paths(),
        &resolvers(),
    )
    .expect("normalize");
    registry.merge(REPOSITORY, vec![a]);

    let proxy = NodeProxy::get(REPOSITORY, "a", registry.as_ref()).expect("a is stored");
    assert_eq!(proxy.link_id("next"), Some("b"));
    assert!(proxy.resolve_link("next").is_none(), "b has not been merged yet");

    let b = normalize(&document("b", "page", json!({})), &link_paths(), &resolvers()).expect("normalize");
    registry.merge(REPOSITORY, vec![b]);

    let target = proxy.resolve_link("next").expect("b resolves once merged");
    assert_eq!(target.id(), "b");
}

#[test]
fn cyclic_links_are_walked_hop_by_hop() {
    let registry = PreviewRegistry::new();
    let docs = vec![
        document("a", "page", json!({"next": doc_link("b")})),
        document("b", "page", json!({"next": doc_link("a")})),
    ];
    registry.merge(
        REPOSITORY,
        normalize_documents(&docs, &link_paths(), &resolvers()).expect("normalize"),
    );

    let mut current = NodeProxy::get(REPOSITORY, "a", registry.as_ref()).expect("a is stored");
    let mut visited = vec![];
    for _ in 0..5 {
        visited.push(current.id().to_string());
        current = current.resolve_link("next").expect("cycle continues");
    }
    assert_eq!(visited, vec!["a", "b", "a", "b", "a"]);
}

#[test]
fn group_links_resolve_and_missing_targets_are_skipped() {
    let registry = PreviewRegistry::new();
    let docs = vec![
        document(
            "a",
            "page",
            json!({"related": [{"item": doc_link("b")}, {"item": doc_link("missing")}, {"item": doc_link("c")}]}),
        ),
        document("b", "page", json!({})),
        document("c", "page", json!({})),
    ];
    registry.merge(
        REPOSITORY,
        normalize_documents(&docs, &link_paths(), &resolvers()).expect("normalize"),
    );

    let proxy = NodeProxy::get(REPOSITORY, "a", registry.as_ref()).expect("a is stored");
    let ids: Vec<String> = proxy
        .resolve_links("related", "item")
        .iter()
        .map(|target| target.id().to_string())
        .collect();
    assert_eq!(ids, vec!["b", "c"]);
    assert_eq!(proxy.field("related.1.item.document"), Some(&json!("missing")));
    assert!(proxy.resolve_link("related.1.item").is_none());

    let node = registry.node(REPOSITORY, "a").expect("a is stored");
    let b = resolve_link(registry.as_ref(), REPOSITORY, &node, "related.0.item").expect("b");
    assert_eq!(b.id, "b");
    assert!(resolve_link(registry.as_ref(), "other-repo", &node, "related.0.item").is_none());
}

#[test]
fn context_creates_empty_state_and_merges_never_remove() {
    let registry = PreviewRegistry::new();
    let empty = registry.context("fresh");
    assert_eq!(empty.repository_name, "fresh");
    assert!(empty.nodes.is_empty());
    assert!(!empty.is_bootstrapped);

    let first = normalize_documents(
        &[document("a", "page", json!({})), document("b", "page", json!({}))],
        &link_paths(),
        &resolvers(),
    )
    .expect("normalize");
    assert_eq!(registry.merge("fresh", first), 2);
    let second = normalize_documents(&[document("c", "page", json!({}))], &link_paths(), &resolvers())
        .expect("normalize");
    assert_eq!(registry.merge("fresh", second), 3);

    assert!(registry.is_bootstrapped("fresh"));
    assert!(!registry.is_bootstrapped(REPOSITORY));
}

#[test]
fn preview_nodes_overlay_static_page_data() {
    let registry = PreviewRegistry::new();
    let docs = vec![
        document(
            "a",
            "page",
            json!({
                "title": [{"type": "paragraph", "text": "Draft title", "spans": []}],
                "next": doc_link("b")
            }),
        ),
        document("b", "page", json!({"title": [{"type": "paragraph", "text": "Draft B", "spans": []}]})),
    ];
    registry.merge(
        REPOSITORY,
        normalize_documents(&docs, &link_paths(), &resolvers()).expect("normalize"),
    );

    let static_data = json!({
        "site": {"title": "Acme"},
        "prismicPage": {
            "prismicId": "a",
            "uid": "a",
            "data": {
                "title": {"text": "Published title"},
                "next": {
                    "document": {"prismicId": "b", "data": {"title": {"text": "Published B"}}}
                }
            }
        },
        "others": [{"prismicId": "unknown", "data": {"title": {"text": "Untouched"}}}]
    });

    let merged = merge_preview_data(&static_data, &registry.context(REPOSITORY));

    assert_eq!(merged["site"], json!({"title": "Acme"}));
    assert_eq!(merged["prismicPage"]["data"]["title"], json!({"text": "Draft title"}));
    assert_eq!(
        merged["prismicPage"]["data"]["next"]["document"]["data"]["title"]["text"],
        json!("Draft B")
    );
    assert_eq!(merged["others"], static_data["others"]);
}
