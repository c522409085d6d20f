// src/analyze/records.rs
// =============================================================================
// The data we persist for every page we manage to fetch.
//
// All of these are plain values: built once by the page analyzer, then only
// moved around and serialized. BTreeMap is used wherever keys are involved
// so the JSON output always comes out in the same order.
// =============================================================================

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// One `<input>`, `<textarea>` or `<select>` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputField {
    /// `type` attribute for inputs ("text" when missing), the tag name otherwise
    #[serde(rename = "type")]
    pub field_type: String,
    pub name: String,
    pub id: String,
    /// Value as declared in the markup, empty when there is none
    pub value: String,
}

/// A named field inside a form, with the value we would submit
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormInput {
    pub name: String,
    pub value: String,
}

/// One `<form>` element
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormDescriptor {
    /// Raw `action` attribute, possibly relative
    pub action: String,
    /// Lowercased `method` attribute, "get" when missing
    pub method: String,
    pub inputs: Vec<FormInput>,
}

/// Everything we learned from one fetched page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRecord {
    pub url: String,
    pub input_tags: Vec<InputField>,
    /// Keyed by form id, or `form-<n>` when the id is missing or repeated
    pub forms: BTreeMap<String, FormDescriptor>,
    /// Flat name -> value map of every named field on the page, as POSTed back
    pub form_data: BTreeMap<String, String>,
    pub csrf_token: Option<String>,
    /// `name=value` pairs held by the site session when the page was analyzed
    pub cookies: Vec<String>,
    /// Start of the POST response, or the reason the POST failed
    pub post_response: Option<String>,
}

/// Pages found under each hostname of one site crawl
pub type SiteResult = BTreeMap<String, Vec<PageRecord>>;

/// Pages found under every hostname of a run; this is what ends up on disk
pub type RunResult = BTreeMap<String, Vec<PageRecord>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> PageRecord {
        let mut forms = BTreeMap::new();
        forms.insert(
            "login".to_string(),
            FormDescriptor {
                action: "/session".to_string(),
                method: "post".to_string(),
                inputs: vec![FormInput {
                    name: "user".to_string(),
                    value: "test_value".to_string(),
                }],
            },
        );
        let mut form_data = BTreeMap::new();
        form_data.insert("user".to_string(), "test_value".to_string());
        form_data.insert("greeting".to_string(), "안녕하세요".to_string());

        PageRecord {
            url: "https://www.example.com".to_string(),
            input_tags: vec![InputField {
                field_type: "text".to_string(),
                name: "user".to_string(),
                id: String::new(),
                value: String::new(),
            }],
            forms,
            form_data,
            csrf_token: Some("T".to_string()),
            cookies: vec!["sid=1".to_string()],
            post_response: None,
        }
    }

    #[test]
    fn test_input_field_serializes_type_key() {
        let json = serde_json::to_value(&sample_record().input_tags[0]).unwrap();
        assert_eq!(json["type"], "text");
        assert!(json.get("field_type").is_none());
    }

    #[test]
    fn test_run_result_round_trip_keeps_unicode() {
        let mut run = RunResult::new();
        run.insert("www.example.com".to_string(), vec![sample_record()]);

        let json = serde_json::to_string_pretty(&run).unwrap();
        assert!(json.contains("안녕하세요"));
        assert!(json.contains("\n  \"www.example.com\""));

        let back: RunResult = serde_json::from_str(&json).unwrap();
        assert_eq!(back, run);
    }
}
