//! Configuration validation with location-tagged error reporting.
//!
//! Validation walks the parsed [`ConfigDocument`] top-down. Each level
//! is a [`SectionValidator`] that checks its own fields, then delegates
//! array items to the validator for the next level, passing a
//! [`SectionName`] extended with the field and index. Findings are
//! collected in a [`ValidationResult`]; nothing short-circuits, so one
//! pass reports every problem in document order.

mod rules;

use std::fmt;

pub use rules::{ActionValidator, EndpointValidator, ResponseValidator, RootValidator};

use super::model::ConfigDocument;
use crate::engine::tree::{EndpointNode, EndpointTree};
use crate::error::ValidationError;

/// Root symbol used for the top of the document.
pub const ROOT_SECTION: &str = "$";

/// Dotted, index-qualified location inside the configuration document.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SectionName(String);

impl SectionName {
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self(path.into())
    }

    #[must_use]
    pub fn root() -> Self {
        Self::new(ROOT_SECTION)
    }

    /// `parent.property`
    #[must_use]
    pub fn with_property(&self, property: &str) -> Self {
        Self(format!("{}.{property}", self.0))
    }

    /// `parent.property[index]`
    #[must_use]
    pub fn with_index(&self, property: &str, index: usize) -> Self {
        self.with_key(property, &index.to_string())
    }

    /// `parent.property[key]`
    #[must_use]
    pub fn with_key(&self, property: &str, key: &str) -> Self {
        Self(format!("{}.{property}[{key}]", self.0))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Ordered, append-only collection of validation findings.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    errors: Vec<ValidationError>,
}

impl ValidationResult {
    #[must_use]
    pub const fn new() -> Self {
        Self { errors: Vec::new() }
    }

    pub fn add_error(&mut self, section: SectionName, message: impl Into<String>) {
        self.errors.push(ValidationError {
            section,
            message: message.into(),
        });
    }

    pub fn append(&mut self, other: Self) {
        self.errors.extend(other.errors);
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    #[must_use]
    pub fn errors(&self) -> &[ValidationError] {
        &self.errors
    }

    #[must_use]
    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

/// Validates one kind of section at a given location.
///
/// `None` means the section is absent from the document.
pub trait SectionValidator<T>: Send + Sync {
    fn validate(&self, section: Option<&T>, name: &SectionName) -> ValidationResult;
}

/// The full validator stack for a configuration document.
pub type ConfigValidator = RootValidator<EndpointValidator<ActionValidator<ResponseValidator>>>;

impl Default for ConfigValidator {
    fn default() -> Self {
        Self::new(EndpointValidator::new(ActionValidator::new(ResponseValidator)))
    }
}

/// Validate a whole document starting at `$`.
#[must_use]
pub fn validate(document: Option<&ConfigDocument>) -> ValidationResult {
    ConfigValidator::default().validate(document, &SectionName::root())
}

/// Validate and compile in one step.
pub fn check(document: Option<&ConfigDocument>) -> Result<EndpointTree, Vec<ValidationError>> {
    let result = validate(document);
    if result.has_errors() {
        return Err(result.into_errors());
    }
    Ok(document.map(EndpointTree::compile).unwrap_or_default())
}

/// Human-readable summary of a valid configuration.
#[must_use]
pub fn format_validation_report(path: &str, tree: &EndpointTree) -> String {
    fn describe(node: &EndpointNode, prefix: &str, lines: &mut Vec<String>) {
        let full = format!("{}/{}", prefix.trim_end_matches('/'), node.segments().join("/"));
        let methods: Vec<String> = node
            .actions
            .iter()
            .map(|a| {
                format!(
                    "{} ({}, {} responses)",
                    a.method.trim().to_uppercase(),
                    a.mode,
                    a.responses.len()
                )
            })
            .collect();
        lines.push(format!("  {full}  -> {}", methods.join(", ")));
        for child in &node.children {
            describe(child, &full, lines);
        }
    }

    let nodes = tree.nodes();
    let actions: usize = nodes.iter().map(|n| n.actions.len()).sum();
    let responses: usize = nodes
        .iter()
        .flat_map(|n| &n.actions)
        .map(|a| a.responses.len())
        .sum();

    let mut lines = vec![format!(
        "  {} endpoints, {actions} actions, {responses} responses\n",
        nodes.len()
    )];
    for node in &tree.endpoints {
        describe(node, "", &mut lines);
    }

    format!("{path} is valid\n{}", lines.join("\n"))
}
