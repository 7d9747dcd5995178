//! Resource name and type labels derived from a resource path.
//!
//! For `/subscriptions/{sub}/resourceGroups/{rg}/providers/{provider}/{type}/{name}`
//! the name is the last segment and the type is `{provider}/{type}`, taken
//! as the third-to-last and second-to-last segments. This is a shape
//! heuristic, not a resource id parser: nested child resources such as
//! `.../servers/sql1/databases/db1` are labelled `sql1/databases`.

/// Type label used when a path is too short to carry one.
pub const UNKNOWN_RESOURCE_TYPE: &str = "unknown";

/// Name and type label of one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedResource {
    pub name: String,
    pub resource_type: String,
}

/// Classify a resource path.
pub fn classify(resource_path: &str) -> ClassifiedResource {
    let segments: Vec<&str> = resource_path
        .trim_end_matches('/')
        .split('/')
        .filter(|s| !s.is_empty())
        .collect();

    let name = segments
        .last()
        .map(|s| s.to_string())
        .unwrap_or_else(|| resource_path.to_string());

    let resource_type = match segments.as_slice() {
        [.., provider, kind, _name] => format!("{provider}/{kind}"),
        _ => UNKNOWN_RESOURCE_TYPE.to_string(),
    };

    ClassifiedResource {
        name,
        resource_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_virtual_machine() {
        let resource = classify(
            "/subscriptions/abc/resourceGroups/rg1/providers/Microsoft.Compute/virtualMachines/vm1",
        );
        assert_eq!(resource.name, "vm1");
        assert_eq!(resource.resource_type, "Microsoft.Compute/virtualMachines");
    }

    #[test]
    fn test_classify_lowercase_path() {
        let resource = classify(
            "/subscriptions/abc/resourcegroups/rg1/providers/microsoft.storage/storageaccounts/logs01",
        );
        assert_eq!(resource.name, "logs01");
        assert_eq!(resource.resource_type, "microsoft.storage/storageaccounts");
    }

    #[test]
    fn test_trailing_slash_is_ignored() {
        let resource = classify(
            "/subscriptions/abc/resourceGroups/rg1/providers/Microsoft.Web/sites/app1/",
        );
        assert_eq!(resource.name, "app1");
        assert_eq!(resource.resource_type, "Microsoft.Web/sites");
    }

    #[test]
    fn test_nested_resource_keeps_heuristic_label() {
        let resource = classify(
            "/subscriptions/abc/resourceGroups/rg1/providers/Microsoft.Sql/servers/sql1/databases/db1",
        );
        assert_eq!(resource.name, "db1");
        assert_eq!(resource.resource_type, "sql1/databases");
    }

    #[test]
    fn test_short_paths() {
        let resource = classify("/subscriptions/abc");
        assert_eq!(resource.name, "abc");
        assert_eq!(resource.resource_type, UNKNOWN_RESOURCE_TYPE);

        let resource = classify("/");
        assert_eq!(resource.name, "/");
        assert_eq!(resource.resource_type, UNKNOWN_RESOURCE_TYPE);
    }
}
