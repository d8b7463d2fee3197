//! The per-section validation rules.
//!
//! Each validator is generic over the validator of the level below it so
//! a level can be exercised in isolation with a substitute.

use std::sync::LazyLock;

use regex::Regex;

use super::{SectionName, SectionValidator, ValidationResult};
use crate::config::model::{ActionSection, ConfigDocument, EndpointSection, ResponseSection};
use crate::engine::tree::ActionMode;

static PATH_PATTERN: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Za-z0-9/]+$"));
static METHOD_PATTERN: LazyLock<Regex> = LazyLock::new(|| compile(r"^[A-Za-z]+$"));
static HEADER_PATTERN: LazyLock<Regex> = LazyLock::new(|| compile(r"^[\x00-\x7F]+$"));

fn compile(pattern: &str) -> Regex {
    // Only called with the literals above.
    Regex::new(pattern).expect("static validation pattern must compile")
}

/// Validates the document root and its top-level endpoints.
#[derive(Debug, Clone)]
pub struct RootValidator<E> {
    endpoints: E,
}

impl<E> RootValidator<E> {
    #[must_use]
    pub const fn new(endpoints: E) -> Self {
        Self { endpoints }
    }
}

impl<E: SectionValidator<EndpointSection>> SectionValidator<ConfigDocument> for RootValidator<E> {
    fn validate(&self, section: Option<&ConfigDocument>, name: &SectionName) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(root) = section else {
            result.add_error(name.clone(), "Endpoints file is null");
            return result;
        };

        let Some(endpoints) = &root.endpoints else {
            result.add_error(name.with_property("endpoints"), "Endpoints array is null");
            return result;
        };

        for (i, endpoint) in endpoints.iter().enumerate() {
            result.append(
                self.endpoints
                    .validate(endpoint.as_ref(), &name.with_index("endpoints", i)),
            );
        }

        result
    }
}

/// Validates one endpoint, its actions and (recursively) its children.
#[derive(Debug, Clone)]
pub struct EndpointValidator<A> {
    actions: A,
}

impl<A> EndpointValidator<A> {
    #[must_use]
    pub const fn new(actions: A) -> Self {
        Self { actions }
    }
}

impl<A: SectionValidator<ActionSection>> SectionValidator<EndpointSection> for EndpointValidator<A> {
    fn validate(&self, section: Option<&EndpointSection>, name: &SectionName) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(endpoint) = section else {
            result.add_error(name.clone(), "Endpoint is null");
            return result;
        };

        match endpoint.path.as_deref() {
            None => result.add_error(name.with_property("path"), "Endpoint must have a path"),
            Some(path) if path.trim().is_empty() => {
                result.add_error(name.with_property("path"), "Endpoint must have a path");
            }
            Some(path) if !PATH_PATTERN.is_match(path) => result.add_error(
                name.with_property("path"),
                format!(
                    "Invalid path '{path}'. Path can only contain A-Z, a-z, 0-9 and slashes (/)."
                ),
            ),
            Some(_) => {}
        }

        match &endpoint.actions {
            None => result.add_error(
                name.with_property("actions"),
                "Endpoints must have an actions array",
            ),
            Some(actions) if actions.is_empty() => result.add_error(
                name.with_property("actions"),
                "Actions array must have at least one item",
            ),
            Some(actions) => {
                for (i, action) in actions.iter().enumerate() {
                    result.append(
                        self.actions
                            .validate(action.as_ref(), &name.with_index("actions", i)),
                    );
                }
            }
        }

        for (i, child) in endpoint.endpoints.iter().flatten().enumerate() {
            result.append(self.validate(child.as_ref(), &name.with_index("endpoints", i)));
        }

        result
    }
}

/// Validates one action and its responses.
#[derive(Debug, Clone)]
pub struct ActionValidator<R> {
    responses: R,
}

impl<R> ActionValidator<R> {
    #[must_use]
    pub const fn new(responses: R) -> Self {
        Self { responses }
    }
}

impl<R: SectionValidator<ResponseSection>> SectionValidator<ActionSection> for ActionValidator<R> {
    fn validate(&self, section: Option<&ActionSection>, name: &SectionName) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(action) = section else {
            result.add_error(name.clone(), "Action is null");
            return result;
        };

        if let Some(method) = &action.method {
            if !METHOD_PATTERN.is_match(method) {
                result.add_error(
                    name.with_property("method"),
                    format!("Invalid method '{method}'. Method can only contain A-Z, a-z."),
                );
            }
        }

        // Mode is optional, but when present it must be a known one.
        if let Some(mode) = &action.mode {
            if matches!(ActionMode::parse(mode), ActionMode::Unknown(_)) {
                result.add_error(
                    name.with_property("mode"),
                    format!(
                        "Invalid mode '{mode}'. Mode must be one of {}.",
                        ActionMode::ALLOWED.join(", ")
                    ),
                );
            }
        }

        match &action.responses {
            None => result.add_error(
                name.with_property("responses"),
                "Action must have a responses array",
            ),
            Some(responses) if responses.is_empty() => result.add_error(
                name.with_property("responses"),
                "Responses array must have at least one item",
            ),
            Some(responses) => {
                for (i, response) in responses.iter().enumerate() {
                    result.append(
                        self.responses
                            .validate(response.as_ref(), &name.with_index("responses", i)),
                    );
                }
            }
        }

        result
    }
}

/// Validates one response: status code, header encoding and body exclusivity.
#[derive(Debug, Clone, Copy, Default)]
pub struct ResponseValidator;

impl SectionValidator<ResponseSection> for ResponseValidator {
    fn validate(&self, section: Option<&ResponseSection>, name: &SectionName) -> ValidationResult {
        let mut result = ValidationResult::new();

        let Some(response) = section else {
            result.add_error(name.clone(), "Response is null");
            return result;
        };

        if !(100..=599).contains(&response.status_code) {
            result.add_error(
                name.with_property("statusCode"),
                format!(
                    "Invalid status code '{}'. Status code must be between 100 and 599.",
                    response.status_code
                ),
            );
        }

        for (key, value) in response.headers.iter().flatten() {
            if !HEADER_PATTERN.is_match(key) {
                result.add_error(
                    name.with_key("headers", key),
                    format!("Invalid header key '{key}'. Headers can only contain ASCII characters."),
                );
            }
            if !HEADER_PATTERN.is_match(value) {
                result.add_error(
                    name.with_key("headers", key),
                    format!(
                        "Invalid header value '{value}'. Headers can only contain ASCII characters."
                    ),
                );
            }
        }

        let bodies = response.set_bodies();
        if bodies.len() > 1 {
            result.add_error(
                name.clone(),
                format!(
                    "Only one type of body can be set per response. {} are set.",
                    join_conjunction(&bodies)
                ),
            );
        }

        result
    }
}

/// `a and b`, or `a, b, and c` for three or more.
fn join_conjunction(items: &[&str]) -> String {
    match items {
        [] => String::new(),
        [only] => (*only).to_string(),
        [first, second] => format!("{first} and {second}"),
        [init @ .., last] => format!("{}, and {last}", init.join(", ")),
    }
}
