//! CLI command implementations

pub mod adjacency;
pub mod completions;
pub mod config;
pub mod vertex;

use anyhow::Context;
use trellis_core::{ClassInitializer, Properties};

/// Parse a `key=value` pair. The value is read as JSON when it parses,
/// otherwise kept as a plain string.
pub fn parse_property(raw: &str) -> anyhow::Result<(String, serde_json::Value)> {
    let (key, value) = raw
        .split_once('=')
        .with_context(|| format!("Expected key=value, got '{}'", raw))?;
    let value = serde_json::from_str(value).unwrap_or_else(|_| serde_json::Value::String(value.to_string()));
    Ok((key.trim().to_string(), value))
}

pub fn parse_properties(raw: &[String]) -> anyhow::Result<Properties> {
    raw.iter().map(|p| parse_property(p)).collect()
}

/// Initializer for `type_name`, or `None` when nothing was asked for
pub fn initializer(
    type_name: Option<&str>,
    root: &str,
    label: Option<&str>,
    properties: &[String],
) -> anyhow::Result<Option<ClassInitializer>> {
    if type_name.is_none() && label.is_none() && properties.is_empty() {
        return Ok(None);
    }
    let mut init = ClassInitializer::new(type_name.unwrap_or(root));
    if let Some(label) = label {
        init = init.with_label(label);
    }
    for (key, value) in parse_properties(properties)? {
        init = init.with_property(key, value);
    }
    Ok(Some(init))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_property() {
        assert_eq!(parse_property("age=42").unwrap(), ("age".to_string(), json!(42)));
        assert_eq!(parse_property("name=Ada").unwrap(), ("name".to_string(), json!("Ada")));
        assert_eq!(parse_property("tags=[1,2]").unwrap().1, json!([1, 2]));
        assert!(parse_property("novalue").is_err());
    }

    #[test]
    fn test_initializer_only_when_requested() {
        assert!(initializer(None, "Vertex", None, &[]).unwrap().is_none());

        let init = initializer(None, "Vertex", Some("person"), &[]).unwrap().unwrap();
        assert_eq!(init.initialization_type().as_str(), "Vertex");
        assert_eq!(init.label(), Some("person"));

        let init = initializer(Some("Person"), "Vertex", None, &["age=3".to_string()])
            .unwrap()
            .unwrap();
        assert_eq!(init.properties().get("age"), Some(&json!(3)));
    }
}
