use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::ResourceLookupError;

/// How many partial matches a lookup miss suggests.
pub const DEFAULT_CANDIDATE_LIMIT: usize = 10;

/// Queryable field metadata for one resource of the reporting API.
///
/// Records are kept exactly as they appear in the catalog file: keys other
/// than the three field lists survive in `extra`, and lists the file omits
/// stay omitted when the record is serialized again.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResourceSchema {
    /// Resource name, unique within the catalog (e.g. "campaign", "ad_group_ad")
    pub resource: String,
    /// Fields allowed in the SELECT clause
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub selectable: Option<Vec<String>>,
    /// Fields allowed in WHERE conditions
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filterable: Option<Vec<String>>,
    /// Fields allowed in ORDER BY
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sortable: Option<Vec<String>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ResourceSchema {
    pub fn new(resource: impl Into<String>) -> Self {
        Self {
            resource: resource.into(),
            selectable: None,
            filterable: None,
            sortable: None,
            extra: Map::new(),
        }
    }
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// Reads the catalog file. A missing or malformed file is logged and yields
/// an empty catalog; the error never reaches the caller.
pub fn load_resources(path: &Path) -> Vec<ResourceSchema> {
    match try_load_resources(path) {
        Ok(resources) => resources,
        Err(err) => {
            tracing::error!(error = %err, "Failed to load resource catalog");
            Vec::new()
        }
    }
}

fn try_load_resources(path: &Path) -> Result<Vec<ResourceSchema>, CatalogError> {
    let data = std::fs::read_to_string(path).map_err(|source| CatalogError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&data).map_err(|source| CatalogError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

/// Read-only index over the resource catalog, shared by every lookup.
#[derive(Debug, Clone, Default)]
pub struct SchemaCatalog {
    resources: Vec<ResourceSchema>,
}

impl SchemaCatalog {
    pub fn load(path: &Path) -> Self {
        let resources = load_resources(path);
        tracing::info!(
            path = %path.display(),
            resources = resources.len(),
            "Resource catalog loaded"
        );
        Self { resources }
    }

    pub fn from_resources(resources: Vec<ResourceSchema>) -> Self {
        Self { resources }
    }

    pub fn resources(&self) -> &[ResourceSchema] {
        &self.resources
    }

    pub fn is_empty(&self) -> bool {
        self.resources.is_empty()
    }

    /// Resource names in catalog order.
    pub fn resource_names(&self) -> impl Iterator<Item = &str> {
        self.resources.iter().map(|r| r.resource.as_str())
    }

    pub fn find_exact(&self, resource: &str) -> Option<&ResourceSchema> {
        self.resources.iter().find(|r| r.resource == resource)
    }

    /// Resources whose name contains `resource`, in catalog order, at most `limit`.
    pub fn find_partial(&self, resource: &str, limit: usize) -> Vec<&ResourceSchema> {
        self.resources
            .iter()
            .filter(|r| r.resource.contains(resource))
            .take(limit)
            .collect()
    }

    /// Payload for a lookup miss: partial-match suggestions when there are
    /// any, otherwise a pointer back to the catalog listing.
    pub fn describe_error(&self, resource: &str, limit: usize) -> ResourceLookupError {
        let matches = self.find_partial(resource, limit);
        if matches.is_empty() {
            return ResourceLookupError {
                error: format!(
                    "Resource '{resource}' not found. Use the search tool description to see available resource names."
                ),
                candidates: None,
            };
        }

        let names: Vec<String> = matches.iter().map(|r| r.resource.clone()).collect();
        let quoted = names
            .iter()
            .map(|name| format!("'{name}'"))
            .collect::<Vec<_>>()
            .join(", ");
        ResourceLookupError {
            error: format!("Resource '{resource}' not found. Did you mean one of: [{quoted}]?"),
            candidates: Some(names),
        }
    }

    /// Exact match, falling back to [`SchemaCatalog::describe_error`].
    pub fn lookup(&self, resource: &str) -> Result<&ResourceSchema, ResourceLookupError> {
        self.find_exact(resource)
            .ok_or_else(|| self.describe_error(resource, DEFAULT_CANDIDATE_LIMIT))
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use serde_json::json;

    use super::*;

    fn sample_catalog() -> SchemaCatalog {
        serde_json::from_value::<Vec<ResourceSchema>>(json!([
            {
                "resource": "campaign",
                "selectable": ["campaign.id", "campaign.name", "campaign.status"],
                "filterable": ["campaign.status"],
                "sortable": ["campaign.name"]
            },
            { "resource": "campaign_budget", "selectable": ["campaign_budget.amount_micros"] },
            { "resource": "ad_group", "selectable": ["ad_group.id"] },
            { "resource": "ad_group_ad", "selectable": ["ad_group_ad.ad.id"] },
            { "resource": "ad_group_criterion", "selectable": [] }
        ]))
        .map(SchemaCatalog::from_resources)
        .expect("sample catalog should deserialize")
    }

    #[test]
    fn exact_lookup_returns_entry_unchanged() {
        let catalog = sample_catalog();
        let schema = catalog.lookup("campaign").expect("campaign should exist");
        assert_eq!(
            serde_json::to_value(schema).unwrap(),
            json!({
                "resource": "campaign",
                "selectable": ["campaign.id", "campaign.name", "campaign.status"],
                "filterable": ["campaign.status"],
                "sortable": ["campaign.name"]
            })
        );
    }

    #[test]
    fn entry_round_trips_extra_keys_and_omitted_lists() {
        let raw = json!({
            "resource": "customer",
            "selectable": ["customer.id"],
            "category": "RESOURCE"
        });
        let schema: ResourceSchema = serde_json::from_value(raw.clone()).unwrap();
        assert_eq!(schema.filterable, None);
        assert_eq!(serde_json::to_value(&schema).unwrap(), raw);
    }

    #[test]
    fn partial_lookup_keeps_catalog_order_and_limit() {
        let catalog = sample_catalog();
        let names: Vec<&str> = catalog
            .find_partial("ad_group", 2)
            .into_iter()
            .map(|r| r.resource.as_str())
            .collect();
        assert_eq!(names, vec!["ad_group", "ad_group_ad"]);
    }

    #[test]
    fn lookup_miss_with_partial_matches_lists_candidates() {
        let catalog = sample_catalog();
        let err = catalog.lookup("budget").expect_err("no exact 'budget' resource");
        assert_eq!(err.candidates, Some(vec!["campaign_budget".to_string()]));
        assert_eq!(
            err.error,
            "Resource 'budget' not found. Did you mean one of: ['campaign_budget']?"
        );
    }

    #[test]
    fn lookup_miss_caps_candidates_at_default_limit() {
        let resources = (0..15)
            .map(|i| ResourceSchema::new(format!("segment_{i}")))
            .collect();
        let catalog = SchemaCatalog::from_resources(resources);
        let err = catalog.lookup("segment").unwrap_err();
        assert_eq!(err.candidates.map(|c| c.len()), Some(DEFAULT_CANDIDATE_LIMIT));
    }

    #[test]
    fn lookup_miss_without_partial_matches_is_generic() {
        let catalog = sample_catalog();
        let err = catalog.lookup("zzz_no_match").unwrap_err();
        assert_eq!(err.candidates, None);
        assert_eq!(
            serde_json::to_value(&err).unwrap(),
            json!({
                "error": "Resource 'zzz_no_match' not found. Use the search tool description to see available resource names."
            })
        );
    }

    #[test]
    fn missing_file_loads_as_empty_catalog() {
        let dir = tempfile::tempdir().unwrap();
        let catalog = SchemaCatalog::load(&dir.path().join("does_not_exist.json"));
        assert!(catalog.is_empty());
        let err = catalog.lookup("campaign").unwrap_err();
        assert_eq!(err.candidates, None);
    }

    #[test]
    fn malformed_file_loads_as_empty_catalog() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, "{{ not json").unwrap();
        assert!(load_resources(file.path()).is_empty());
    }

    #[test]
    fn catalog_file_is_read_in_order() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(
            file,
            r#"[{{"resource": "customer"}}, {{"resource": "campaign", "selectable": ["campaign.id"]}}]"#
        )
        .unwrap();
        let catalog = SchemaCatalog::load(file.path());
        let names: Vec<&str> = catalog.resource_names().collect();
        assert_eq!(names, vec!["customer", "campaign"]);
    }
}
