use serde::Serialize;

/// Topics offered during onboarding, in display order. Id 16 is retired.
pub const PREFERENCE_CATALOG: &[(usize, &str)] = &[
    (1, "javascript"),
    (2, "python"),
    (3, "java"),
    (4, "react"),
    (5, "html"),
    (6, "css"),
    (7, "nodejs"),
    (8, "typescript"),
    (9, "csharp"),
    (10, "vue"),
    (11, "docker"),
    (12, "kubernetes"),
    (13, "machine-learning"),
    (14, "deep-learning"),
    (15, "data-science"),
    (17, "graphql"),
    (18, "android"),
    (19, "ios"),
    (20, "flutter"),
];

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CatalogTopic {
    pub id: usize,
    pub name: &'static str,
}

/// Catalog entries whose name contains `query`, case-insensitively.
pub fn search_catalog(query: Option<&str>) -> Vec<CatalogTopic> {
    let needle = query.map(|q| q.trim().to_lowercase()).unwrap_or_default();
    PREFERENCE_CATALOG
        .iter()
        .filter(|(_, name)| name.contains(needle.as_str()))
        .map(|&(id, name)| CatalogTopic { id, name })
        .collect()
}
