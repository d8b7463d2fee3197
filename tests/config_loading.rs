//! Integration tests for config loading across file formats.

use stubtree::config::sources::parse_document;
use stubtree::config::validation::check;

fn load_example(name: &str) -> String {
    let path = format!("example/{name}");
    std::fs::read_to_string(&path).unwrap_or_else(|e| panic!("failed to read {path}: {e}"))
}

#[test]
fn json_example_loads_and_validates() {
    let content = load_example("stubtree.json");
    let document = parse_document("json", &content, "stubtree.json").unwrap();
    let tree = check(document.as_ref()).unwrap();
    assert_eq!(tree.endpoints.len(), 3);
    assert_eq!(tree.total_endpoints(), 4);
}

#[test]
fn minimal_example_loads_and_validates() {
    let content = load_example("minimal.json");
    let document = parse_document("json", &content, "minimal.json").unwrap();
    assert_eq!(check(document.as_ref()).unwrap().total_endpoints(), 1);
}

#[cfg(feature = "yaml")]
#[test]
fn yaml_example_loads_and_validates() {
    let content = load_example("full.yaml");
    let document = parse_document("yaml", &content, "full.yaml").unwrap();
    check(document.as_ref()).unwrap();
}

#[cfg(feature = "yaml")]
#[test]
fn formats_produce_equivalent_trees() {
    let json = parse_document("json", &load_example("stubtree.json"), "json").unwrap();
    let yaml = parse_document("yaml", &load_example("full.yaml"), "yaml").unwrap();
    assert_eq!(check(json.as_ref()).unwrap(), check(yaml.as_ref()).unwrap());
}

#[test]
fn unknown_fields_are_parse_errors() {
    let err = parse_document("json", r#"{"endpoints": [], "routes": []}"#, "x.json").unwrap_err();
    assert!(err.to_string().starts_with("Error reading configuration file:"));
}
