// Decoding of the `{result: ...}` envelopes the site and the oracle answer with

// =============== Imports ================
use crate::error::{ResolveError, Result};

use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Deserialize)]
struct ResultResponse {
    #[serde(default)]
    result: Option<Value>,
}

/// `{result: string|null}`. Null, blank, or non-string results come back as
/// `None`, only an unparseable body is an error.
pub fn result_string(body: &str, what: &'static str) -> Result<Option<String>> {
    let parsed: ResultResponse =
        serde_json::from_str(body).map_err(|e| ResolveError::decode(what, e))?;

    Ok(match parsed.result {
        Some(Value::String(s)) if !s.trim().is_empty() => Some(s),
        _ => None,
    })
}

/// Unwraps an HTML listing envelope. The payload shows up as a plain HTML
/// string, a JSON-encoded string holding the HTML, or `{html: "..."}`.
pub fn html_fragment(body: &str, what: &'static str) -> Result<String> {
    let parsed: ResultResponse =
        serde_json::from_str(body).map_err(|e| ResolveError::decode(what, e))?;

    match parsed.result {
        Some(Value::String(s)) => {
            if s.trim_start().starts_with('"') {
                serde_json::from_str::<String>(&s).map_err(|e| ResolveError::decode(what, e))
            } else {
                Ok(s)
            }
        }
        Some(Value::Object(map)) => match map.get("html") {
            Some(Value::String(s)) => Ok(s.clone()),
            _ => Err(ResolveError::decode(what, "result object has no html field")),
        },
        _ => Err(ResolveError::decode(what, "missing result")),
    }
}

// ! The oracle has answered with both shapes over time: a structured object,
// ! or the same object serialized into a string
#[derive(Deserialize)]
#[serde(untagged)]
enum OraclePayload<T> {
    Structured(T),
    Encoded(String),
}

#[derive(Deserialize)]
struct OracleResponse<T> {
    result: OraclePayload<T>,
}

/// Decodes an oracle `{result: ...}` response into `T`, trying the
/// structured shape first and falling back to a second decode pass over an
/// encoded string.
pub fn oracle_payload<T: DeserializeOwned>(body: &str, what: &'static str) -> Result<T> {
    let parsed: OracleResponse<T> =
        serde_json::from_str(body).map_err(|e| ResolveError::decode(what, e))?;

    match parsed.result {
        OraclePayload::Structured(value) => Ok(value),
        OraclePayload::Encoded(text) => {
            log::debug!("{} came back as an encoded string, decoding again", what);
            serde_json::from_str(&text).map_err(|e| ResolveError::decode(what, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Iframe {
        url: String,
    }

    #[test]
    fn result_string_treats_null_and_blank_as_missing() {
        assert_eq!(result_string(r#"{"result":"abc"}"#, "t").unwrap(), Some("abc".into()));
        assert_eq!(result_string(r#"{"result":null}"#, "t").unwrap(), None);
        assert_eq!(result_string(r#"{"result":"  "}"#, "t").unwrap(), None);
        assert_eq!(result_string(r#"{"status":200}"#, "t").unwrap(), None);
        assert!(result_string("<html>", "t").is_err());
    }

    #[test]
    fn html_fragment_accepts_every_envelope_shape() {
        let plain = r#"{"result":"<div class=\"eplist\"></div>"}"#;
        let encoded = r#"{"result":"\"<div class=\\\"eplist\\\"></div>\""}"#;
        let object = r#"{"result":{"html":"<div class=\"eplist\"></div>"}}"#;

        for body in [plain, encoded, object] {
            assert_eq!(html_fragment(body, "episodes").unwrap(), r#"<div class="eplist"></div>"#);
        }
        assert!(html_fragment(r#"{"result":null}"#, "episodes").is_err());
    }

    #[test]
    fn oracle_payload_decodes_both_shapes() {
        let structured = r#"{"result":{"url":"https://megaup.cc/e/abc"}}"#;
        let encoded = r#"{"result":"{\"url\":\"https://megaup.cc/e/abc\"}"}"#;

        let expected = Iframe {
            url: "https://megaup.cc/e/abc".into(),
        };
        assert_eq!(oracle_payload::<Iframe>(structured, "iframe").unwrap(), expected);
        assert_eq!(oracle_payload::<Iframe>(encoded, "iframe").unwrap(), expected);
    }

    #[test]
    fn oracle_payload_rejects_garbage() {
        let err = oracle_payload::<Iframe>(r#"{"result":"not json"}"#, "iframe").unwrap_err();
        assert!(matches!(err, ResolveError::DecodeFailure { what: "iframe", .. }));
        assert!(oracle_payload::<Iframe>(r#"{"result":null}"#, "iframe").is_err());
    }
}
