//! Loading bootstrap configurations from disk

use assert_matches::assert_matches;
use std::io::Write;
use strata_core::{BootstrapConfig, StrataError};

const FULL: &str = r#"
project = "demo"

[features]
group-prefix = "cdf:"
aggregated-level-name = "allprojects"
rawdb-variants = ["", ":state"]
dataset-metadata = { owner-team = "platform" }

[[idp-mappings]]
project = "demo"
group = "cdf:root"
source-id = "2a4f0000-0000-0000-0000-000000000001"
source-name = "platform-admins"

[[namespaces]]
ns-name = "src"
description = "Source systems"

[[namespaces.ns-nodes]]
node-name = "src:001:sap"
description = "SAP ingestion"
external-id = "sap-dataset"
metadata = { system = "sap" }

[[namespaces]]
ns-name = "uc"

[[namespaces.ns-nodes]]
node-name = "uc:001:demand"

[namespaces.ns-nodes.shared-access]
owner = ["src:001:sap"]
read = ["src:allprojects"]

[delete-or-deprecate]
groups = ["cdf:legacy:owner"]
datasets = ["legacy:dataset"]
"#;

#[test]
fn load_full_document_from_file() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(FULL.as_bytes()).unwrap();

    let config = BootstrapConfig::load(file.path()).unwrap();

    assert_eq!(config.project, "demo");
    assert_eq!(config.namespaces.len(), 2);
    assert_eq!(
        config.features.dataset_metadata.get("owner-team").map(String::as_str),
        Some("platform")
    );
    let sap = config.node("src:001:sap").unwrap();
    assert_eq!(sap.external_id.as_deref(), Some("sap-dataset"));
    assert_eq!(sap.metadata.get("system").map(String::as_str), Some("sap"));
    assert_eq!(
        config.idp_mapping("cdf:root").unwrap().source_name,
        "platform-admins"
    );
    assert_eq!(config.delete_or_deprecate.groups, vec!["cdf:legacy:owner"]);
}

#[test]
fn missing_file_is_a_configuration_error() {
    let dir = tempfile::tempdir().unwrap();
    let err = BootstrapConfig::load(&dir.path().join("absent.toml")).unwrap_err();
    assert_matches!(err, StrataError::Config { .. });
}

#[test]
fn invalid_reference_fails_on_load() {
    let content = FULL.replace(r#"owner = ["src:001:sap"]"#, r#"owner = ["src:002:none"]"#);
    let err = BootstrapConfig::from_toml_str(&content).unwrap_err();
    assert_matches!(err, StrataError::Config { ref message } if message.contains("src:002:none"));
}

#[test]
fn node_lookup_ignores_namespace_order() {
    let config = BootstrapConfig::from_toml_str(FULL).unwrap();
    let mut reversed = config.clone();
    reversed.namespaces.reverse();
    assert_eq!(
        config.node("uc:001:demand"),
        reversed.node("uc:001:demand")
    );
}
