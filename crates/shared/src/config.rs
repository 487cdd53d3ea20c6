use std::env;
use thiserror::Error;

const DEFAULT_ATTACHMENTS_DOMAIN: &str = "s3.amazonaws.com";
const DEFAULT_REGION: &str = "us-east-1";
const OFFLINE_DYNAMODB_ENDPOINT: &str = "http://localhost:8000";

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    Missing(&'static str),

    #[error("Invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub todos_table: String,
    /// Local secondary index keyed by `userId` and sorted by `dueDate`.
    pub todos_index: String,
    pub attachments_bucket: String,
    pub attachments_domain: String,
    pub aws_region: String,
    pub dynamodb_endpoint: Option<String>,
    /// Answer an empty listing with 400 instead of an empty 200 page.
    pub empty_list_is_error: bool,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let optional = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| optional(name).ok_or(ConfigError::Missing(name));

        let is_offline = match lookup("IS_OFFLINE") {
            Some(value) => parse_flag("IS_OFFLINE", &value)?,
            None => false,
        };
        let dynamodb_endpoint = optional("DYNAMODB_ENDPOINT")
            .or_else(|| is_offline.then(|| OFFLINE_DYNAMODB_ENDPOINT.to_string()));
        if is_offline {
            tracing::debug!(endpoint = ?dynamodb_endpoint, "IS_OFFLINE set");
        }

        let empty_list_is_error = match lookup("EMPTY_LIST_IS_ERROR") {
            Some(value) => parse_flag("EMPTY_LIST_IS_ERROR", &value)?,
            None => true,
        };

        Ok(Config {
            todos_table: required("TODOS_TABLE")?,
            todos_index: required("TODO_ID_INDEX")?,
            attachments_bucket: required("ATTACHMENTS_IMAGES_S3_BUCKET")?,
            attachments_domain: optional("ATTACHMENTS_DOMAIN")
                .unwrap_or_else(|| DEFAULT_ATTACHMENTS_DOMAIN.to_string()),
            aws_region: optional("AWS_REGION").unwrap_or_else(|| DEFAULT_REGION.to_string()),
            dynamodb_endpoint,
            empty_list_is_error,
        })
    }
}

fn parse_flag(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" => Ok(true),
        "" | "0" | "false" | "no" => Ok(false),
        _ => Err(ConfigError::Invalid {
            name,
            value: value.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    const BASE: [(&str, &str); 3] = [
        ("TODOS_TABLE", "Todos-dev"),
        ("TODO_ID_INDEX", "TodoIdIndex"),
        ("ATTACHMENTS_IMAGES_S3_BUCKET", "bkt"),
    ];

    #[test]
    fn test_defaults() {
        let config = Config::from_lookup(lookup_from(&BASE)).unwrap();

        assert_eq!(config.todos_table, "Todos-dev");
        assert_eq!(config.todos_index, "TodoIdIndex");
        assert_eq!(config.attachments_bucket, "bkt");
        assert_eq!(config.attachments_domain, "s3.amazonaws.com");
        assert_eq!(config.aws_region, "us-east-1");
        assert_eq!(config.dynamodb_endpoint, None);
        assert!(config.empty_list_is_error);
    }

    #[test]
    fn test_blank_optional_values_fall_back_to_defaults() {
        let mut pairs = BASE.to_vec();
        pairs.push(("ATTACHMENTS_DOMAIN", ""));
        pairs.push(("AWS_REGION", "  "));
        pairs.push(("DYNAMODB_ENDPOINT", " "));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();

        assert_eq!(config.attachments_domain, "s3.amazonaws.com");
        assert_eq!(config.aws_region, "us-east-1");
        assert_eq!(config.dynamodb_endpoint, None);
    }

    #[test]
    fn test_missing_table_is_an_error() {
        let result = Config::from_lookup(lookup_from(&BASE[1..]));
        assert_eq!(result.unwrap_err(), ConfigError::Missing("TODOS_TABLE"));
    }

    #[test]
    fn test_offline_uses_local_endpoint() {
        let mut pairs = BASE.to_vec();
        pairs.push(("IS_OFFLINE", "true"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(
            config.dynamodb_endpoint.as_deref(),
            Some("http://localhost:8000")
        );

        pairs.push(("DYNAMODB_ENDPOINT", "http://dynamodb:8000"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert_eq!(
            config.dynamodb_endpoint.as_deref(),
            Some("http://dynamodb:8000")
        );
    }

    #[test]
    fn test_empty_list_flag() {
        let mut pairs = BASE.to_vec();
        pairs.push(("EMPTY_LIST_IS_ERROR", "false"));
        let config = Config::from_lookup(lookup_from(&pairs)).unwrap();
        assert!(!config.empty_list_is_error);

        let mut pairs = BASE.to_vec();
        pairs.push(("EMPTY_LIST_IS_ERROR", "maybe"));
        assert!(matches!(
            Config::from_lookup(lookup_from(&pairs)),
            Err(ConfigError::Invalid { name: "EMPTY_LIST_IS_ERROR", .. })
        ));
    }
}
