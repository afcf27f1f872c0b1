//! Entity name normalization and key derivation.

use folio_core::config::lifecycle::LifecycleConfig;
use folio_core::error::AppError;
use folio_core::result::AppResult;
use folio_core::types::{OwnerId, RecordId};
use folio_entity::drive::entity::{ENTITIES_ROOT, Entity};

/// Trim a user-supplied entity or file name and reject unusable ones.
///
/// Empty names, names containing `/` and dot-only names (`.`, `..`) are
/// rejected. A name must stay a single key segment so one entity's prefix
/// never nests inside another's.
pub fn normalize_name(raw: &str, field: &str) -> AppResult<String> {
    let name = raw.trim();
    if name.is_empty() {
        return Err(AppError::validation(format!("{field} cannot be empty")));
    }
    if name.contains('/') {
        return Err(AppError::validation(format!(
            "{field} cannot contain '/': {name}"
        )));
    }
    if name.chars().all(|c| c == '.') {
        return Err(AppError::validation(format!(
            "{field} cannot be '{name}'"
        )));
    }
    Ok(name.to_string())
}

/// Slug used to derive folder ids: lowercase alphanumeric runs
/// joined by `-`.
///
/// Names with no alphanumeric characters fall back to their lowercased
/// form so they still derive a stable id.
pub fn slugify(name: &str) -> String {
    let slug = name
        .split(|c: char| !c.is_alphanumeric())
        .filter(|run| !run.is_empty())
        .map(str::to_lowercase)
        .collect::<Vec<_>>()
        .join("-");
    if slug.is_empty() {
        name.to_lowercase()
    } else {
        slug
    }
}

/// Every key and path derived from one owner's entity name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityKeys {
    /// Trimmed entity name.
    pub name: String,
    /// Deterministic folder record id.
    pub folder_id: RecordId,
    /// Logical path, `entities/<name>`.
    pub path: String,
    /// Blob key prefix, `<namespace>/<owner>/entities/<name>/`.
    pub prefix: String,
    /// Key of the empty placeholder blob written on create.
    pub placeholder_key: String,
}

impl EntityKeys {
    /// Derive keys for an already-normalized `name`.
    pub fn new(config: &LifecycleConfig, owner: &OwnerId, name: &str) -> Self {
        let prefix = format!(
            "{}/{}/{ENTITIES_ROOT}/{name}/",
            config.key_namespace.trim_end_matches('/'),
            owner
        );
        Self {
            name: name.to_string(),
            folder_id: RecordId::derived(owner, &slugify(name)),
            path: Entity::path_for(name),
            placeholder_key: format!("{prefix}{}", config.placeholder_name),
            prefix,
        }
    }

    /// Rebase a blob key from this entity's prefix onto `target`'s.
    ///
    /// Returns `None` for keys outside the prefix.
    pub fn rebase_key(&self, key: &str, target: &EntityKeys) -> Option<String> {
        key.strip_prefix(&self.prefix)
            .map(|rest| format!("{}{rest}", target.prefix))
    }

    /// Rebase a logical path from this entity onto `target`.
    ///
    /// The entity path itself maps to the target path; paths below it keep
    /// their tail. Anything else is left alone.
    pub fn rebase_path(&self, path: &str, target: &EntityKeys) -> Option<String> {
        if path == self.path {
            return Some(target.path.clone());
        }
        path.strip_prefix(&self.path)
            .and_then(|rest| rest.strip_prefix('/'))
            .map(|rest| format!("{}/{rest}", target.path))
    }
}

/// Replace the final `/`-separated segment of `key` with `name`.
pub fn sibling(key: &str, name: &str) -> String {
    match key.rfind('/') {
        Some(pos) => format!("{}{name}", &key[..=pos]),
        None => name.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_core::error::ErrorKind;

    fn owner() -> OwnerId {
        OwnerId::parse("u1").unwrap()
    }

    #[test]
    fn test_normalize_trims_and_rejects() {
        assert_eq!(normalize_name("  Shopify \t", "name").unwrap(), "Shopify");
        assert_eq!(
            normalize_name("   ", "name").unwrap_err().kind,
            ErrorKind::Validation
        );
        assert_eq!(
            normalize_name("a/b", "name").unwrap_err().kind,
            ErrorKind::Validation
        );
        for dots in [".", "..", " ... "] {
            assert_eq!(
                normalize_name(dots, "name").unwrap_err().kind,
                ErrorKind::Validation
            );
        }
        assert_eq!(normalize_name("v1.2", "name").unwrap(), "v1.2");
    }

    #[test]
    fn test_slugify() {
        assert_eq!(slugify("Shopify"), "shopify");
        assert_eq!(slugify("Shopify Inc"), "shopify-inc");
        assert_eq!(slugify("  A&B -- Co. "), "a-b-co");
        assert_eq!(slugify("***"), "***");
    }

    #[test]
    fn test_keys_for_entity() {
        let keys = EntityKeys::new(&LifecycleConfig::default(), &owner(), "Shopify");
        assert_eq!(keys.path, "entities/Shopify");
        assert_eq!(keys.prefix, "users/u1/entities/Shopify/");
        assert_eq!(keys.placeholder_key, "users/u1/entities/Shopify/.folder");
        assert_eq!(keys.folder_id, RecordId::derived(&owner(), "shopify"));
    }

    #[test]
    fn test_case_variants_share_folder_id() {
        let config = LifecycleConfig::default();
        let a = EntityKeys::new(&config, &owner(), "Shopify");
        let b = EntityKeys::new(&config, &owner(), "shopify");
        assert_eq!(a.folder_id, b.folder_id);
        assert_ne!(a.prefix, b.prefix);
    }

    #[test]
    fn test_rebase() {
        let config = LifecycleConfig::default();
        let old = EntityKeys::new(&config, &owner(), "Shopify");
        let new = EntityKeys::new(&config, &owner(), "Shopify Inc");

        assert_eq!(
            old.rebase_key("users/u1/entities/Shopify/2024/march.pdf", &new)
                .as_deref(),
            Some("users/u1/entities/Shopify Inc/2024/march.pdf")
        );
        assert_eq!(old.rebase_key("users/u1/entities/Shopify2/x", &new), None);

        assert_eq!(
            old.rebase_path("entities/Shopify", &new).as_deref(),
            Some("entities/Shopify Inc")
        );
        assert_eq!(
            old.rebase_path("entities/Shopify/march.pdf", &new).as_deref(),
            Some("entities/Shopify Inc/march.pdf")
        );
        assert_eq!(old.rebase_path("entities/ShopifyX", &new), None);
    }

    #[test]
    fn test_sibling() {
        assert_eq!(sibling("a/b/c.pdf", "d.pdf"), "a/b/d.pdf");
        assert_eq!(sibling("c.pdf", "d.pdf"), "d.pdf");
    }
}
