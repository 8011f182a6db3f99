use std::io::{self, BufRead, Read, Write};

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::{json, Map, Value};

use crate::auth::Notice;
use crate::cli::OutputFormat;
use crate::repository::Resource;
use crate::validation::FieldErrors;

fn print_structured(output_format: &OutputFormat, value: &Value) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(value)?),
        _ => println!("{}", serde_json::to_string_pretty(value)?),
    }
    Ok(())
}

/// Output a success message in the appropriate format
pub fn output_success(
    output_format: &OutputFormat,
    message: &str,
    data: Option<Value>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Text => {
            println!("✓ {}", message);
        }
        _ => {
            let mut response = Map::new();
            response.insert("success".into(), json!(true));
            response.insert("message".into(), json!(message));

            match data {
                Some(Value::Object(fields)) => response.extend(fields),
                Some(other) => {
                    response.insert("data".into(), other);
                }
                None => {}
            }

            print_structured(output_format, &Value::Object(response))?;
        }
    }
    Ok(())
}

/// Output an error message in the appropriate format
pub fn output_error(
    output_format: &OutputFormat,
    message: &str,
    error_code: Option<&str>,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Text => {
            eprintln!("Error: {}", message);
        }
        _ => {
            let mut response = json!({
                "success": false,
                "error": message
            });

            if let Some(code) = error_code {
                response["error_code"] = json!(code);
            }

            print_structured(output_format, &response)?;
        }
    }
    Ok(())
}

/// Output an empty collection in the appropriate format
pub fn output_empty_collection(
    output_format: &OutputFormat,
    collection_name: &str,
    message: &str,
) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Text => {
            println!("{}", message);
        }
        _ => {
            print_structured(output_format, &json!({ collection_name: [] }))?;
        }
    }
    Ok(())
}

/// Output a record list: a two-column table in text mode, the raw records
/// otherwise.
pub fn output_records<R: Resource>(output_format: &OutputFormat, records: &[R]) -> anyhow::Result<()> {
    if records.is_empty() {
        return output_empty_collection(output_format, R::PLURAL, &format!("No {} found", R::PLURAL));
    }

    match output_format {
        OutputFormat::Text => {
            println!("{:<26} {}", "ID", "NAME");
            for record in records {
                println!("{:<26} {}", record.id(), record.label());
            }
            println!();
            println!("{} {}", records.len(), R::PLURAL);
        }
        _ => {
            let collection_name = R::PLURAL;
            print_structured(output_format, &json!({ collection_name: records }))?;
        }
    }
    Ok(())
}

/// Output a single serializable value under `title`.
pub fn output_value<T: Serialize>(output_format: &OutputFormat, title: &str, value: &T) -> anyhow::Result<()> {
    let value = serde_json::to_value(value)?;
    match output_format {
        OutputFormat::Text => {
            println!("{}:", title);
            match &value {
                Value::Object(fields) => {
                    for (key, field) in fields {
                        match field {
                            Value::Null => continue,
                            Value::String(s) => println!("  {:<22} {}", key, s),
                            other => println!("  {:<22} {}", key, other),
                        }
                    }
                }
                other => println!("  {}", other),
            }
        }
        _ => print_structured(output_format, &value)?,
    }
    Ok(())
}

pub fn output_notice(output_format: &OutputFormat, notice: &Notice) -> anyhow::Result<()> {
    match notice {
        Notice::Info(text) => output_success(output_format, text, None),
        Notice::Error(text) => output_error(output_format, text, None),
    }
}

pub fn output_field_errors(output_format: &OutputFormat, errors: &FieldErrors) -> anyhow::Result<()> {
    match output_format {
        OutputFormat::Text => {
            eprintln!("Error: validation failed");
            for (field, message) in errors.iter() {
                eprintln!("  {:<20} {}", field, message);
            }
        }
        _ => {
            let fields: Map<String, Value> = errors.iter().map(|(k, v)| (k.to_string(), json!(v))).collect();
            print_structured(
                output_format,
                &json!({
                    "success": false,
                    "error": "validation failed",
                    "error_code": "VALIDATION_FAILED",
                    "fields": fields
                }),
            )?;
        }
    }
    Ok(())
}

/// Read one line from stdin after printing `label` to stderr.
pub fn prompt(label: &str) -> anyhow::Result<String> {
    eprint!("{}", label);
    io::stderr().flush()?;

    let mut line = String::new();
    if io::stdin().lock().read_line(&mut line)? == 0 {
        anyhow::bail!("No input provided");
    }
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

pub fn confirm(question: &str) -> anyhow::Result<bool> {
    let answer = prompt(&format!("{} [y/N] ", question))?;
    Ok(matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes"))
}

/// Parse a JSON payload from `--data`, or from stdin when it is absent.
pub fn read_payload<T: DeserializeOwned>(data: Option<String>) -> anyhow::Result<T> {
    let raw = match data {
        Some(raw) => raw,
        None => {
            let mut raw = String::new();
            io::stdin().read_to_string(&mut raw)?;
            raw
        }
    };

    if raw.trim().is_empty() {
        anyhow::bail!("No JSON payload provided (use --data or pipe JSON on stdin)");
    }

    serde_json::from_str(&raw).map_err(|e| anyhow::anyhow!("Invalid JSON payload: {}", e))
}

/// Parse `key=value` pairs given with `--filter`.
pub fn parse_filters(raw: &[String]) -> anyhow::Result<Vec<(String, String)>> {
    raw.iter()
        .map(|pair| match pair.split_once('=') {
            Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
            _ => Err(anyhow::anyhow!("Invalid filter '{}', expected KEY=VALUE", pair)),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_filter_pairs() {
        let filters = parse_filters(&["organisationId=o1".to_string()]).unwrap();
        assert_eq!(filters, vec![("organisationId".to_string(), "o1".to_string())]);
    }

    #[test]
    fn rejects_malformed_filters() {
        assert!(parse_filters(&["organisationId".to_string()]).is_err());
        assert!(parse_filters(&["=o1".to_string()]).is_err());
    }

    #[test]
    fn reads_payload_from_data_flag() {
        let value: Value = read_payload(Some(r#"{"name":"Acme"}"#.to_string())).unwrap();
        assert_eq!(value["name"], "Acme");
    }

    #[test]
    fn rejects_invalid_payload() {
        let result: anyhow::Result<Value> = read_payload(Some("{not json".to_string()));
        assert!(result.unwrap_err().to_string().starts_with("Invalid JSON payload"));
    }
}
