//! `stubtree validate`: check a configuration file for errors.
//!
//! Parses and validates the config file, reporting every finding in
//! either human-readable text or machine-readable JSON format.

use crate::cli::{ValidateArgs, ValidateFormat};
use crate::config::sources::{decode_utf8, extension_of, parse_document};
use crate::config::validation;
use crate::error::StubError;

pub fn execute(args: &ValidateArgs) -> Result<(), StubError> {
    let path = &args.config;
    let display = path.display().to_string();

    let bytes = std::fs::read(path).map_err(|source| StubError::ConfigLoad {
        path: path.clone(),
        source,
    })?;
    let content = decode_utf8(bytes, &display)?;

    let document = parse_document(&extension_of(path), &content, &display)?;

    let tree = match validation::check(document.as_ref()) {
        Ok(tree) => tree,
        Err(errors) => {
            match args.format {
                ValidateFormat::Text => {
                    eprintln!("\u{2717} {display} has {} errors\n", errors.len());
                    for error in &errors {
                        eprintln!("{error}");
                    }
                }
                ValidateFormat::Json => {
                    let json_errors: Vec<serde_json::Value> = errors
                        .iter()
                        .map(|e| {
                            serde_json::json!({
                                "section": e.section.as_str(),
                                "message": e.message,
                            })
                        })
                        .collect();
                    println!(
                        "{}",
                        serde_json::json!({
                            "valid": false,
                            "errors": json_errors,
                        })
                    );
                }
            }
            return Err(StubError::ConfigValidation { errors });
        }
    };

    match args.format {
        ValidateFormat::Text => {
            println!("\u{2713} {}", validation::format_validation_report(&display, &tree));
        }
        ValidateFormat::Json => {
            let nodes = tree.nodes();
            let actions: usize = nodes.iter().map(|n| n.actions.len()).sum();
            let responses: usize = nodes
                .iter()
                .flat_map(|n| &n.actions)
                .map(|a| a.responses.len())
                .sum();
            println!(
                "{}",
                serde_json::json!({
                    "valid": true,
                    "endpoints": nodes.len(),
                    "actions": actions,
                    "responses": responses,
                })
            );
        }
    }

    Ok(())
}
