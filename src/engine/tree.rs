//! The immutable routing tree built from a validated configuration.
//!
//! An [`EndpointTree`] owns its top-level [`EndpointNode`]s, each node owns
//! its children, actions and responses. Nodes are created once by
//! [`EndpointTree::compile`] and never mutated afterwards, so a tree can be
//! shared behind an `Arc` by any number of concurrent readers.

use std::collections::BTreeMap;
use std::fmt;

use super::segment::segment;
use crate::config::model::{ActionSection, ConfigDocument, EndpointSection, ResponseSection};

pub const ANY_METHOD: &str = "ANY";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct EndpointTree {
    pub endpoints: Vec<EndpointNode>,
}

impl EndpointTree {
    /// Build the tree from a document that has passed validation.
    ///
    /// Absent sections are skipped rather than reported; callers are
    /// expected to validate first.
    #[must_use]
    pub fn compile(document: &ConfigDocument) -> Self {
        Self {
            endpoints: document.present_endpoints().map(EndpointNode::compile).collect(),
        }
    }

    /// Number of endpoint nodes at every depth.
    #[must_use]
    pub fn total_endpoints(&self) -> usize {
        self.endpoints.iter().map(EndpointNode::subtree_len).sum()
    }

    /// Every node in declaration order, parents before their children.
    #[must_use]
    pub fn nodes(&self) -> Vec<&EndpointNode> {
        fn collect<'t>(node: &'t EndpointNode, out: &mut Vec<&'t EndpointNode>) {
            out.push(node);
            for child in &node.children {
                collect(child, out);
            }
        }

        let mut out = Vec::with_capacity(self.total_endpoints());
        for node in &self.endpoints {
            collect(node, &mut out);
        }
        out
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct EndpointNode {
    path: Option<String>,
    segments: Vec<String>,
    pub actions: Vec<Action>,
    pub children: Vec<EndpointNode>,
}

impl EndpointNode {
    /// Create a node, splitting `path` into segments once.
    #[must_use]
    pub fn new(path: Option<&str>, actions: Vec<Action>, children: Vec<Self>) -> Self {
        Self {
            path: path.map(str::to_string),
            segments: segment(path),
            actions,
            children,
        }
    }

    fn compile(section: &EndpointSection) -> Self {
        let actions = section
            .actions
            .iter()
            .flatten()
            .flatten()
            .map(Action::compile)
            .collect();
        let children = section.children().map(Self::compile).collect();
        Self::new(section.path.as_deref(), actions, children)
    }

    #[must_use]
    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    #[must_use]
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    fn subtree_len(&self) -> usize {
        1 + self.children.iter().map(Self::subtree_len).sum::<usize>()
    }
}

/// How an [`Action`] picks among its responses.
///
/// `Unknown` keeps the configured text and behaves exactly like `Single`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ActionMode {
    #[default]
    Single,
    Random,
    Intercept,
    Unknown(String),
}

impl ActionMode {
    pub const ALLOWED: &'static [&'static str] = &["SINGLE", "RANDOM", "INTERCEPT"];

    #[must_use]
    pub fn parse(mode: &str) -> Self {
        match mode.trim().to_uppercase().as_str() {
            "SINGLE" => Self::Single,
            "RANDOM" => Self::Random,
            "INTERCEPT" => Self::Intercept,
            _ => Self::Unknown(mode.to_string()),
        }
    }
}

impl fmt::Display for ActionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Single => f.write_str("SINGLE"),
            Self::Random => f.write_str("RANDOM"),
            Self::Intercept => f.write_str("INTERCEPT"),
            Self::Unknown(raw) => write!(f, "{raw}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Action {
    pub method: String,
    pub mode: ActionMode,
    pub single_index: i64,
    pub responses: Vec<Response>,
}

impl Default for Action {
    fn default() -> Self {
        Self {
            method: ANY_METHOD.to_string(),
            mode: ActionMode::Single,
            single_index: 0,
            responses: Vec::new(),
        }
    }
}

impl Action {
    fn compile(section: &ActionSection) -> Self {
        Self {
            method: section
                .method
                .clone()
                .unwrap_or_else(|| ANY_METHOD.to_string()),
            mode: section
                .mode
                .as_deref()
                .map(ActionMode::parse)
                .unwrap_or_default(),
            single_index: section.single_response_index,
            responses: section
                .responses
                .iter()
                .flatten()
                .flatten()
                .map(Response::compile)
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum ResponseBody {
    #[default]
    Empty,
    Json(serde_json::Value),
    Xml(String),
    Text(String),
}

impl ResponseBody {
    /// Default `content-type` for this body kind.
    #[must_use]
    pub const fn content_type(&self) -> Option<&'static str> {
        match self {
            Self::Empty => None,
            Self::Json(_) => Some("application/json"),
            Self::Xml(_) => Some("application/xml"),
            Self::Text(_) => Some("text/plain; charset=utf-8"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Response {
    pub status_code: u16,
    pub random_weight: i64,
    pub headers: BTreeMap<String, String>,
    pub body: ResponseBody,
}

impl Default for Response {
    fn default() -> Self {
        Self {
            status_code: 200,
            random_weight: 1,
            headers: BTreeMap::new(),
            body: ResponseBody::Empty,
        }
    }
}

impl Response {
    fn compile(section: &ResponseSection) -> Self {
        // Validation allows at most one body, so the order here only matters
        // for documents compiled without validating.
        let body = if let Some(json) = &section.json_body {
            ResponseBody::Json(json.clone())
        } else if let Some(xml) = &section.xml_body {
            ResponseBody::Xml(xml.clone())
        } else if let Some(text) = &section.string_body {
            ResponseBody::Text(text.clone())
        } else {
            ResponseBody::Empty
        };

        Self {
            status_code: u16::try_from(section.status_code).unwrap_or(500),
            random_weight: section.random_weight,
            headers: section.headers.clone().unwrap_or_default(),
            body,
        }
    }
}
