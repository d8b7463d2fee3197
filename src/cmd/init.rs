//! `stubtree init`: generate a starter configuration file.
//!
//! Creates a JSON or YAML config file with either a minimal or a full
//! template. Existing files are never overwritten.

use std::path::PathBuf;

use crate::cli::{ConfigFormat, InitArgs};
use crate::error::StubError;

pub fn execute(args: &InitArgs) -> Result<(), StubError> {
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(format!("stubtree.{}", args.format.extension())));

    if output.exists() {
        return Err(StubError::FileExists { path: output });
    }

    std::fs::write(&output, template(&args.format, args.full))?;
    println!("Created {}", output.display());
    Ok(())
}

#[must_use]
pub const fn template(format: &ConfigFormat, full: bool) -> &'static str {
    match (format, full) {
        (ConfigFormat::Json, false) => JSON_MINIMAL,
        (ConfigFormat::Json, true) => JSON_FULL,
        (ConfigFormat::Yaml, false) => YAML_MINIMAL,
        (ConfigFormat::Yaml, true) => YAML_FULL,
    }
}

const JSON_MINIMAL: &str = r#"{
  "endpoints": [
    {
      "path": "hello",
      "actions": [
        {
          "method": "GET",
          "responses": [
            { "statusCode": 200, "stringBody": "Hello from stubtree" }
          ]
        }
      ]
    }
  ]
}
"#;

const JSON_FULL: &str = r#"{
  "endpoints": [
    {
      "path": "/",
      "actions": [
        { "responses": [ { "stringBody": "stubtree is running" } ] }
      ]
    },
    {
      "path": "users",
      "actions": [
        {
          "method": "GET",
          "mode": "SINGLE",
          "singleResponseIndex": 0,
          "responses": [
            {
              "statusCode": 200,
              "headers": { "Cache-Control": "no-store" },
              "jsonBody": [ { "id": 1, "name": "Ada" }, { "id": 2, "name": "Grace" } ]
            }
          ]
        },
        {
          "method": "POST",
          "responses": [ { "statusCode": 201, "jsonBody": { "id": 3 } } ]
        }
      ],
      "endpoints": [
        {
          "path": "me",
          "actions": [
            {
              "method": "GET",
              "mode": "RANDOM",
              "responses": [
                { "statusCode": 200, "randomWeight": 9, "jsonBody": { "id": 1, "name": "Ada" } },
                { "statusCode": 503, "randomWeight": 1, "stringBody": "try again later" }
              ]
            }
          ]
        }
      ]
    },
    {
      "path": "feeds/latest",
      "actions": [
        {
          "responses": [
            {
              "headers": { "Content-Type": "application/rss+xml" },
              "xmlBody": "<rss version=\"2.0\"><channel><title>stub</title></channel></rss>"
            }
          ]
        }
      ]
    }
  ]
}
"#;

const YAML_MINIMAL: &str = r#"# stubtree config
endpoints:
  - path: hello
    actions:
      - method: GET
        responses:
          - statusCode: 200
            stringBody: Hello from stubtree
"#;

const YAML_FULL: &str = r#"# stubtree config
#
# Endpoints match path segments case-insensitively, in declaration order.
# Child endpoints extend their parent's path. Actions without a method
# answer every method. Modes: SINGLE (default), RANDOM (weighted by
# randomWeight), INTERCEPT (reserved, answers 501).
endpoints:
  - path: /
    actions:
      - responses:
          - stringBody: stubtree is running

  - path: users
    actions:
      - method: GET
        mode: SINGLE
        singleResponseIndex: 0
        responses:
          - statusCode: 200
            headers:
              Cache-Control: no-store
            jsonBody:
              - { id: 1, name: Ada }
              - { id: 2, name: Grace }
      - method: POST
        responses:
          - statusCode: 201
            jsonBody: { id: 3 }
    endpoints:
      - path: me
        actions:
          - method: GET
            mode: RANDOM
            responses:
              - statusCode: 200
                randomWeight: 9
                jsonBody: { id: 1, name: Ada }
              - statusCode: 503
                randomWeight: 1
                stringBody: try again later

  - path: feeds/latest
    actions:
      - responses:
          - headers:
              Content-Type: application/rss+xml
            xmlBody: '<rss version="2.0"><channel><title>stub</title></channel></rss>'
"#;
