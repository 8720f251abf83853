use std::collections::HashMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

/// Opaque reference to an entity owned by some other system.
///
/// The registry never looks inside the entity; it stores the reference and
/// compares it by equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::FromRow)]
pub struct TargetRef {
    #[sqlx(rename = "target_kind")]
    pub kind: String,
    #[sqlx(rename = "target_id")]
    pub id: String,
}

impl TargetRef {
    pub fn new(kind: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            id: id.into(),
        }
    }
}

impl std::fmt::Display for TargetRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}", self.kind, self.id)
    }
}

/// Resolves target references against the system that owns the entities.
///
/// Consulted when a slug is created, to reject references that point nowhere.
pub trait TargetResolver: Send + Sync {
    fn exists(&self, target: &TargetRef) -> bool;

    fn dereference(&self, target: &TargetRef) -> Option<serde_json::Value>;
}

/// One entry of a target catalog file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub kind: String,
    pub id: String,
    #[serde(default)]
    pub entity: serde_json::Value,
}

/// Fixed set of known entities, typically loaded from a JSON file.
#[derive(Debug, Clone, Default)]
pub struct TargetCatalog {
    entities: HashMap<TargetRef, serde_json::Value>,
}

impl TargetCatalog {
    pub fn new(entries: impl IntoIterator<Item = CatalogEntry>) -> Self {
        let entities = entries
            .into_iter()
            .map(|e| (TargetRef::new(e.kind, e.id), e.entity))
            .collect();
        Self { entities }
    }

    /// Load a catalog from a JSON array of `{kind, id, entity}` objects.
    /// A missing or malformed file gives an empty catalog.
    pub fn load(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        if !path.exists() {
            tracing::warn!("Target catalog {} not found, starting empty", path.display());
            return Self::default();
        }

        match std::fs::read_to_string(path) {
            Ok(content) => match serde_json::from_str::<Vec<CatalogEntry>>(&content) {
                Ok(entries) => return Self::new(entries),
                Err(e) => {
                    tracing::warn!("Failed to parse {}: {}", path.display(), e);
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read {}: {}", path.display(), e);
            }
        }

        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entities.is_empty()
    }
}

impl TargetResolver for TargetCatalog {
    fn exists(&self, target: &TargetRef) -> bool {
        self.entities.contains_key(target)
    }

    fn dereference(&self, target: &TargetRef) -> Option<serde_json::Value> {
        self.entities.get(target).cloned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn catalog() -> TargetCatalog {
        TargetCatalog::new(vec![CatalogEntry {
            kind: "user".to_string(),
            id: "1".to_string(),
            entity: serde_json::json!({ "name": "Ivan", "surname": "Ivanov" }),
        }])
    }

    #[test]
    fn test_exists_and_dereference() {
        let catalog = catalog();
        let known = TargetRef::new("user", "1");

        assert!(catalog.exists(&known));
        assert_eq!(catalog.dereference(&known).unwrap()["name"], "Ivan");

        // Same id under another kind is a different reference.
        assert!(!catalog.exists(&TargetRef::new("article", "1")));
        assert!(catalog.dereference(&TargetRef::new("user", "2")).is_none());
    }

    #[test]
    fn test_load_from_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"kind": "user", "id": "7", "entity": {{"name": "Kitty"}}}},
                {{"kind": "article", "id": "slug-me"}}]"#
        )
        .unwrap();

        let catalog = TargetCatalog::load(file.path());
        assert_eq!(catalog.len(), 2);
        assert!(catalog.exists(&TargetRef::new("article", "slug-me")));
        assert_eq!(
            catalog.dereference(&TargetRef::new("article", "slug-me")),
            Some(serde_json::Value::Null)
        );
    }

    #[test]
    fn test_load_missing_or_malformed_file_is_empty() {
        assert!(TargetCatalog::load("/nonexistent/targets.json").is_empty());

        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "not json").unwrap();
        assert!(TargetCatalog::load(file.path()).is_empty());
    }

    #[test]
    fn test_display() {
        assert_eq!(TargetRef::new("user", "42").to_string(), "user:42");
    }
}
