//! Serde data structures for the stubtree configuration file.
//!
//! These types mirror the document as written: every section that the
//! validator must be able to report as missing is an `Option`, and
//! array elements are `Option` so a literal `null` entry survives
//! parsing. [`validation`](super::validation) checks the document and
//! [`EndpointTree::compile`](crate::engine::tree::EndpointTree::compile)
//! turns a checked document into the routing tree.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

const fn default_status_code() -> i64 {
    200
}

const fn default_random_weight() -> i64 {
    1
}

fn is_default_status_code(v: &i64) -> bool {
    *v == default_status_code()
}

fn is_default_random_weight(v: &i64) -> bool {
    *v == default_random_weight()
}

fn is_zero(v: &i64) -> bool {
    *v == 0
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigDocument {
    #[serde(default)]
    pub endpoints: Option<Vec<Option<EndpointSection>>>,
}

impl ConfigDocument {
    /// Iterate the top-level endpoints that are present.
    pub fn present_endpoints(&self) -> impl Iterator<Item = &EndpointSection> {
        self.endpoints.iter().flatten().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,

    #[serde(default)]
    pub actions: Option<Vec<Option<ActionSection>>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoints: Option<Vec<Option<EndpointSection>>>,
}

impl EndpointSection {
    /// Child endpoints that are present; an absent array counts as empty.
    pub fn children(&self) -> impl Iterator<Item = &EndpointSection> {
        self.endpoints.iter().flatten().flatten()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ActionSection {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub method: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mode: Option<String>,

    #[serde(default, alias = "singleIndex", skip_serializing_if = "is_zero")]
    pub single_response_index: i64,

    #[serde(default)]
    pub responses: Option<Vec<Option<ResponseSection>>>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(deny_unknown_fields, rename_all = "camelCase")]
pub struct ResponseSection {
    #[serde(
        default = "default_status_code",
        skip_serializing_if = "is_default_status_code"
    )]
    pub status_code: i64,

    #[serde(
        default = "default_random_weight",
        skip_serializing_if = "is_default_random_weight"
    )]
    pub random_weight: i64,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub headers: Option<BTreeMap<String, String>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub json_body: Option<serde_json::Value>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub xml_body: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub string_body: Option<String>,
}

impl Default for ResponseSection {
    fn default() -> Self {
        Self {
            status_code: default_status_code(),
            random_weight: default_random_weight(),
            headers: None,
            json_body: None,
            xml_body: None,
            string_body: None,
        }
    }
}

impl ResponseSection {
    /// Names of the body fields that are set, in declaration order.
    #[must_use]
    pub fn set_bodies(&self) -> Vec<&'static str> {
        let mut set = Vec::with_capacity(3);
        if self.json_body.is_some() {
            set.push("jsonBody");
        }
        if self.xml_body.is_some() {
            set.push("xmlBody");
        }
        if self.string_body.is_some() {
            set.push("stringBody");
        }
        set
    }
}
