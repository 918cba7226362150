//! URL Query Parameters
//!
//! The shell reacts to two parameters: `token` from email verification links
//! and `connection_id` from the bank aggregation callback.

use serde::Deserialize;

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct QueryParams {
    #[serde(default)]
    pub token: Option<String>,

    #[serde(default)]
    pub connection_id: Option<String>,
}

impl QueryParams {
    /// Decode a raw query string, with or without the leading `?`
    pub fn parse(query: &str) -> Self {
        let query = query.strip_prefix('?').unwrap_or(query);
        let mut params = Self::default();

        for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
            match key.as_ref() {
                "token" => params.token = Some(value.into_owned()),
                "connection_id" => params.connection_id = Some(value.into_owned()),
                _ => {}
            }
        }
        params
    }

    /// Verification token, ignoring an empty value
    pub fn token(&self) -> Option<&str> {
        non_empty(self.token.as_deref())
    }

    /// Bank connection id, ignoring an empty value
    pub fn connection_id(&self) -> Option<&str> {
        non_empty(self.connection_id.as_deref())
    }
}

fn non_empty(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse() {
        let params = QueryParams::parse("?token=abc%2B1&utm_source=mail");
        assert_eq!(params.token(), Some("abc+1"));
        assert_eq!(params.connection_id(), None);

        let params = QueryParams::parse("connection_id=42");
        assert_eq!(params.connection_id(), Some("42"));
    }

    #[test]
    fn test_empty_values_are_absent() {
        let params = QueryParams::parse("token=&connection_id=");
        assert_eq!(params.token(), None);
        assert_eq!(params.connection_id(), None);
    }

    #[test]
    fn test_deserialize() {
        let params: QueryParams = serde_json::from_str(r#"{"token":"t"}"#).unwrap();
        assert_eq!(params.token(), Some("t"));
        assert_eq!(params.connection_id, None);
    }
}
