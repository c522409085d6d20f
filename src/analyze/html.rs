// src/analyze/html.rs
// =============================================================================
// This module pulls the attack surface out of an HTML page.
//
// From one document we extract:
// - input_tags: every input/textarea/select (button-like inputs optional)
// - form_data: name -> value for every named field, ready to POST back
// - forms: one descriptor per <form> element
// - csrf_token: content of <meta name="csrf-token">
// - links: same-prefix links from anchors (see extract_links)
//
// Parsing never fails: html5ever builds a tree out of whatever it is given.
// The parsed `Html` is not Send, so everything here is synchronous and hands
// back owned data that can live across an await point.
// =============================================================================

use scraper::{ElementRef, Html, Selector};
use std::collections::{BTreeMap, HashSet};
use std::sync::LazyLock;
use url::Url;

use super::records::{FormDescriptor, FormInput, InputField};

/// Value submitted for named fields that declare none
pub const FALLBACK_FIELD_VALUE: &str = "test_value";

/// Key the CSRF token is injected under in `form_data`
pub const CSRF_FORM_KEY: &str = "csrf_token";

static FIELD_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("input, textarea, select").expect("Failed to parse field selector - this is a bug")
});

static FORM_SELECTOR: LazyLock<Selector> =
    LazyLock::new(|| Selector::parse("form").expect("Failed to parse form selector - this is a bug"));

static OPTION_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("option").expect("Failed to parse option selector - this is a bug")
});

static CSRF_META_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse(r#"meta[name="csrf-token"]"#)
        .expect("Failed to parse csrf meta selector - this is a bug")
});

static ANCHOR_SELECTOR: LazyLock<Selector> = LazyLock::new(|| {
    Selector::parse("a[href]").expect("Failed to parse anchor selector - this is a bug")
});

/// Which inputs make it into `input_tags`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InputPolicy {
    pub exclude_button_inputs: bool,
}

impl Default for InputPolicy {
    fn default() -> Self {
        InputPolicy {
            exclude_button_inputs: true,
        }
    }
}

/// Everything extracted from one document, owned
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageSurface {
    pub input_tags: Vec<InputField>,
    pub forms: BTreeMap<String, FormDescriptor>,
    pub form_data: BTreeMap<String, String>,
    pub csrf_token: Option<String>,
    pub links: Vec<String>,
}

// Parses a page body and extracts its surface
//
// Parameters:
//   body: the HTML text
//   page_url: where the body came from (relative links resolve against it)
//   link_prefix: only links starting with this string are kept;
//                None means the page URL itself is the prefix
//   policy: which inputs to list
pub fn extract_surface(
    body: &str,
    page_url: &str,
    link_prefix: Option<&str>,
    policy: InputPolicy,
) -> PageSurface {
    let document = Html::parse_document(body);

    let mut form_data = extract_form_data(&document);
    let csrf_token = extract_csrf_token(&document);
    if let Some(token) = &csrf_token {
        form_data.insert(CSRF_FORM_KEY.to_string(), token.clone());
    }

    PageSurface {
        input_tags: extract_input_tags(&document, policy),
        forms: extract_forms(&document),
        form_data,
        csrf_token,
        links: match link_prefix {
            Some(prefix) => extract_links_from(&document, page_url, prefix),
            None => extract_links(&document, page_url),
        },
    }
}

// Returns every field element, optionally skipping button/submit/reset inputs
pub fn extract_input_tags(document: &Html, policy: InputPolicy) -> Vec<InputField> {
    document
        .select(&FIELD_SELECTOR)
        .filter(|field| !(policy.exclude_button_inputs && is_button_input(field)))
        .map(|field| {
            let element = field.value();
            InputField {
                field_type: element.attr("type").unwrap_or("text").to_string(),
                name: element.attr("name").unwrap_or_default().to_string(),
                id: element.attr("id").unwrap_or_default().to_string(),
                value: element.attr("value").unwrap_or_default().to_string(),
            }
        })
        .collect()
}

// Maps every named field on the page to the value we would submit
pub fn extract_form_data(document: &Html) -> BTreeMap<String, String> {
    document
        .select(&FIELD_SELECTOR)
        .filter_map(|field| {
            let name = field.value().attr("name").filter(|name| !name.is_empty())?;
            Some((name.to_string(), submission_value(&field)))
        })
        .collect()
}

// One descriptor per <form>, keyed by id (or form-<n>, 0-based, when that is
// missing or taken)
pub fn extract_forms(document: &Html) -> BTreeMap<String, FormDescriptor> {
    let mut forms = BTreeMap::new();
    let mut used_keys = HashSet::new();

    for (index, form) in document.select(&FORM_SELECTOR).enumerate() {
        let element = form.value();
        let id = element.attr("id").unwrap_or_default();
        let key = if !id.is_empty() && !used_keys.contains(id) {
            id.to_string()
        } else {
            unused_form_key(&used_keys, index)
        };
        used_keys.insert(key.clone());

        let inputs = form
            .select(&FIELD_SELECTOR)
            .filter_map(|field| {
                let name = field.value().attr("name")?;
                Some(FormInput {
                    name: name.to_string(),
                    value: submission_value(&field),
                })
            })
            .collect();

        forms.insert(
            key,
            FormDescriptor {
                action: element.attr("action").unwrap_or_default().to_string(),
                method: element.attr("method").unwrap_or("get").to_ascii_lowercase(),
                inputs,
            },
        );
    }

    forms
}

pub fn extract_csrf_token(document: &Html) -> Option<String> {
    document
        .select(&CSRF_META_SELECTOR)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .map(str::to_string)
}

/// Same-prefix links from a document, in document order
///
/// Each `href` is resolved against `base_url` and kept only if the result
/// starts with `base_url` as a plain string. That is a prefix check, not an
/// origin check: `https://example.com.evil.net/` passes for a base of
/// `https://example.com`. Duplicates are kept.
pub fn extract_links(document: &Html, base_url: &str) -> Vec<String> {
    extract_links_from(document, base_url, base_url)
}

// Like extract_links, but resolves against the page URL and filters by a
// separate prefix (the site root), for pages below the root
pub fn extract_links_from(document: &Html, page_url: &str, prefix: &str) -> Vec<String> {
    let base = match Url::parse(page_url) {
        Ok(url) => url,
        Err(e) => {
            log::debug!("Cannot resolve links against {}: {}", page_url, e);
            return Vec::new();
        }
    };

    document
        .select(&ANCHOR_SELECTOR)
        .filter_map(|anchor| anchor.value().attr("href"))
        .map(str::trim)
        .filter(|href| !href.is_empty())
        .filter_map(|href| base.join(href).ok())
        .map(|url| url.to_string())
        .filter(|url| url.starts_with(prefix))
        .collect()
}

// form-<index>, bumped until it clashes with no key already handed out
fn unused_form_key(used_keys: &HashSet<String>, index: usize) -> String {
    (index..)
        .map(|n| format!("form-{}", n))
        .find(|key| !used_keys.contains(key))
        .unwrap_or_else(|| format!("form-{}", index))
}

fn is_button_input(field: &ElementRef) -> bool {
    let element = field.value();
    element.name() == "input"
        && element
            .attr("type")
            .map(|t| matches!(t.to_ascii_lowercase().as_str(), "button" | "submit" | "reset"))
            .unwrap_or(false)
}

// select -> first option's value; textarea -> its text; input -> value attr.
// Anything without a value gets the fallback so the form is never sent empty.
fn submission_value(field: &ElementRef) -> String {
    match field.value().name() {
        "select" => field
            .select(&OPTION_SELECTOR)
            .next()
            .map(|option| match option.value().attr("value") {
                Some(value) => value.to_string(),
                None => option.text().collect::<String>().trim().to_string(),
            })
            .unwrap_or_default(),
        "textarea" => {
            let text: String = field.text().collect();
            if text.is_empty() {
                FALLBACK_FIELD_VALUE.to_string()
            } else {
                text
            }
        }
        _ => field
            .value()
            .attr("value")
            .unwrap_or(FALLBACK_FIELD_VALUE)
            .to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BASE: &str = "https://www.example.com";

    fn surface(html: &str) -> PageSurface {
        extract_surface(html, BASE, None, InputPolicy::default())
    }

    #[test]
    fn test_form_data_and_button_exclusion() {
        let html = r#"
            <form>
                <input type="submit">
                <input type="text" name="q" value="x">
                <select name="s"><option value="1"></select>
            </form>
        "#;
        let page = surface(html);

        let expected: BTreeMap<String, String> = [("q", "x"), ("s", "1")]
            .into_iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        assert_eq!(page.form_data, expected);

        let types: Vec<&str> = page.input_tags.iter().map(|f| f.field_type.as_str()).collect();
        assert_eq!(types, vec!["text", "select"]);
    }

    #[test]
    fn test_button_inputs_kept_when_policy_allows() {
        let html = r#"<input type="submit" name="go"><input type="RESET"><input name="q">"#;
        let document = Html::parse_document(html);
        let policy = InputPolicy {
            exclude_button_inputs: false,
        };
        assert_eq!(extract_input_tags(&document, policy).len(), 3);
        assert_eq!(extract_input_tags(&document, InputPolicy::default()).len(), 1);
    }

    #[test]
    fn test_input_field_defaults() {
        let page = surface(r#"<input><textarea name="bio" id="b"></textarea><select name="s"></select>"#);
        assert_eq!(
            page.input_tags,
            vec![
                InputField {
                    field_type: "text".to_string(),
                    name: String::new(),
                    id: String::new(),
                    value: String::new(),
                },
                InputField {
                    field_type: "text".to_string(),
                    name: "bio".to_string(),
                    id: "b".to_string(),
                    value: String::new(),
                },
                InputField {
                    field_type: "text".to_string(),
                    name: "s".to_string(),
                    id: String::new(),
                    value: String::new(),
                },
            ]
        );
    }

    #[test]
    fn test_fallback_values() {
        let page = surface(r#"<input name="user"><textarea name="msg"></textarea><select name="empty"></select>"#);
        assert_eq!(page.form_data["user"], FALLBACK_FIELD_VALUE);
        assert_eq!(page.form_data["msg"], FALLBACK_FIELD_VALUE);
        assert_eq!(page.form_data["empty"], "");
    }

    #[test]
    fn test_csrf_token_is_recorded_and_injected() {
        let html = r#"
            <html><head><meta name="csrf-token" content="T"></head>
            <body><form><input name="q"></form></body></html>
        "#;
        let page = surface(html);
        assert_eq!(page.csrf_token.as_deref(), Some("T"));
        assert_eq!(page.form_data[CSRF_FORM_KEY], "T");
    }

    #[test]
    fn test_forms_are_keyed_by_id_with_fallback() {
        let html = r#"
            <form id="login" action="/session" method="POST">
                <input name="user" value="admin">
                <input type="password" name="pass">
                <input type="submit">
            </form>
            <form action="/search"><input name="q"></form>
            <form id="login"></form>
        "#;
        let forms = surface(html).forms;

        let login = &forms["login"];
        assert_eq!(login.action, "/session");
        assert_eq!(login.method, "post");
        assert_eq!(
            login.inputs,
            vec![
                FormInput { name: "user".to_string(), value: "admin".to_string() },
                FormInput { name: "pass".to_string(), value: FALLBACK_FIELD_VALUE.to_string() },
            ]
        );

        assert_eq!(forms["form-1"].method, "get");
        assert!(forms.contains_key("form-2"));
    }

    #[test]
    fn test_generated_form_key_is_not_overwritten_by_matching_id() {
        let html = r#"
            <form action="/a"><input name="x"></form>
            <form id="form-0" action="/b"><input name="y"></form>
            <form action="/c"></form>
        "#;
        let forms = surface(html).forms;

        assert_eq!(forms.len(), 3);
        assert_eq!(forms["form-0"].action, "/a");
        assert_eq!(forms["form-1"].action, "/b");
        assert_eq!(forms["form-2"].action, "/c");
    }

    #[test]
    fn test_links_use_prefix_filter_in_document_order() {
        let html = r#"
            <a href="/b">b</a>
            <a href="https://other.org/">other</a>
            <a href="">empty</a>
            <a href="a">a</a>
            <a href="/b">b again</a>
            <a href="mailto:x@example.com">mail</a>
        "#;
        let document = Html::parse_document(html);
        assert_eq!(
            extract_links(&document, BASE),
            vec![
                "https://www.example.com/b",
                "https://www.example.com/a",
                "https://www.example.com/b",
            ]
        );
    }

    #[test]
    fn test_prefix_filter_is_not_an_origin_check() {
        let document = Html::parse_document(r#"<a href="https://www.example.com.evil.net/x">x</a>"#);
        assert_eq!(
            extract_links(&document, BASE),
            vec!["https://www.example.com.evil.net/x"]
        );
    }

    #[test]
    fn test_deeper_pages_resolve_against_page_url() {
        let document = Html::parse_document(r#"<a href="next">n</a>"#);
        assert_eq!(
            extract_links_from(&document, "https://www.example.com/docs/", BASE),
            vec!["https://www.example.com/docs/next"]
        );
    }

    #[test]
    fn test_malformed_markup_does_not_panic() {
        let page = surface("<form><input name='a' value='1'<select name=s><option>One</option>");
        assert!(page.form_data.contains_key("a"));
    }
}
