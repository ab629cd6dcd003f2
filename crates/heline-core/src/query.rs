//! Engine request construction.
//!
//! Turns a [`SearchQuery`] into a select request for one [`Domain`], and a
//! batch of documents into an update request. Nothing here performs I/O;
//! the root crate's engine client sends what these functions build.
//!
//! # Select requests
//!
//! The engine takes the query, returned fields, facets and filters as a
//! JSON body, while every highlighting option travels as a URL query
//! parameter. [`SelectRequest`] keeps the two apart so the client can
//! reproduce that split exactly.
//!
//! | Query text                   | Branch       | Engine query                                   | Highlight query         |
//! |------------------------------|--------------|------------------------------------------------|-------------------------|
//! | `function`                   | plain        | `content:function`                             | same as engine query    |
//! | `: void`                     | code pattern | `content:": void"^10 OR content:void^2 OR ...` | `content:"\: void"`     |
//!
//! A query is a code pattern when it contains any of [`SPECIAL_CHARS`].
//! Code patterns broaden retrieval (phrase, single terms, whitespace-free
//! form) but keep the highlight query on the exact phrase.
//!
//! # Example
//!
//! ```rust
//! use heline_core::domain::CODE;
//! use heline_core::models::SearchQuery;
//! use heline_core::query::build_select;
//!
//! let req = build_select(&CODE, &SearchQuery::new("function"));
//! assert_eq!(req.query, "content:function");
//! assert_eq!(req.param("hl.q"), Some("content:function"));
//! ```

use serde::Serialize;
use serde_json::{json, Value};

use crate::domain::{Domain, CONTENT_FIELD};
use crate::models::SearchQuery;

/// Punctuation that switches a query into code-pattern mode.
pub const SPECIAL_CHARS: &[char] = &[
    ':', ';', '{', '}', '(', ')', '[', ']', '<', '>', '=', '+', '-', '!', '*', '?', '~', '^', '&',
    '|', '%',
];

/// Characters with meaning in the engine's standard query syntax.
const SYNTAX_CHARS: &[char] = &[
    '\\', '+', '-', '&', '|', '!', '(', ')', '{', '}', '[', ']', '^', '"', '~', '*', '?', ':', '/',
    ';', '<', '>', '=', '%', '\'',
];

/// Extra characters escaped inside the highlight phrase.
const HIGHLIGHT_ESCAPES: &[char] = &[':', '(', ')', '[', ']', '{', '}'];

const PHRASE_BOOST: u32 = 10;
const NO_SPACE_BOOST: u32 = 5;
const TERM_BOOST: u32 = 2;

const MAX_ANALYZED_CHARS: u32 = 100_000;
const MAX_ANALYZED_CHARS_CODE: u32 = 500_000;
const HIGHLIGHT_PHRASE_LIMIT: u32 = 2000;
const HIGHLIGHT_TAG_PRE: &str = "<mark>";
const HIGHLIGHT_TAG_POST: &str = "</mark>";

/// Which query shape was chosen for the raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    Plain,
    CodePattern,
}

/// A fully built select call: URL parameters plus JSON body.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectRequest {
    pub mode: QueryMode,
    /// Engine query placed in the body.
    pub query: String,
    /// Query used only for highlighting (`hl.q`).
    pub highlight_query: String,
    /// Filter clauses placed in the body; empty means none are sent.
    pub filters: Vec<String>,
    /// URL query parameters, in the order they are sent.
    pub params: Vec<(String, String)>,
    pub body: Value,
}

impl SelectRequest {
    /// First value of a URL parameter.
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, v)| v.as_str())
    }
}

/// A batch upsert: URL parameters plus a JSON array of documents.
#[derive(Debug, Clone, PartialEq)]
pub struct UpdateRequest {
    pub params: Vec<(String, String)>,
    pub body: Value,
}

/// True if the text contains any of [`SPECIAL_CHARS`].
pub fn has_special_chars(text: &str) -> bool {
    text.contains(SPECIAL_CHARS)
}

pub fn query_mode(text: &str) -> QueryMode {
    if has_special_chars(text) {
        QueryMode::CodePattern
    } else {
        QueryMode::Plain
    }
}

/// Backslash-escapes `\`, `*`, `"`, `'` and `/` so user text stays
/// literal. An unescaped `/` would open a regular expression.
pub fn escape_literal(text: &str) -> String {
    escape_chars(text, &['\\', '*', '"', '\'', '/'])
}

/// Escapes every query-syntax character and whitespace, for use as a bare
/// term.
pub fn escape_term(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if SYNTAX_CHARS.contains(&c) || c.is_whitespace() {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Like [`escape_term`] but leaves `*` and `?` as wildcards.
pub fn escape_filter_value(text: &str) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if (SYNTAX_CHARS.contains(&c) && c != '*' && c != '?') || c.is_whitespace() {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

fn escape_chars(text: &str, chars: &[char]) -> String {
    let mut out = String::with_capacity(text.len() * 2);
    for c in text.chars() {
        if chars.contains(&c) {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

/// Builds the engine query and the highlight query for `raw`.
pub fn build_query_strings(raw: &str) -> (QueryMode, String, String) {
    let literal = escape_literal(raw.trim());
    if literal.is_empty() {
        let all = "*:*".to_string();
        return (QueryMode::Plain, all.clone(), all);
    }

    match query_mode(raw) {
        QueryMode::Plain => {
            let query = format!("{}:{}", CONTENT_FIELD, literal);
            (QueryMode::Plain, query.clone(), query)
        }
        QueryMode::CodePattern => {
            let mut query = format!("{}:\"{}\"^{}", CONTENT_FIELD, literal, PHRASE_BOOST);

            for term in raw.split_whitespace() {
                if term.chars().count() > 1 {
                    query.push_str(&format!(
                        " OR {}:{}^{}",
                        CONTENT_FIELD,
                        escape_term(term),
                        TERM_BOOST
                    ));
                }
            }

            let no_space: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
            if no_space != raw.trim() && !no_space.is_empty() {
                query.push_str(&format!(
                    " OR {}:{}^{}",
                    CONTENT_FIELD,
                    escape_term(&no_space),
                    NO_SPACE_BOOST
                ));
            }

            let highlight = format!(
                "{}:\"{}\"",
                CONTENT_FIELD,
                escape_chars(&literal, HIGHLIGHT_ESCAPES)
            );
            (QueryMode::CodePattern, query, highlight)
        }
    }
}

/// Filter clauses for every filterable field of `domain` with values.
///
/// Values inside one clause are OR-combined by the engine; clauses are
/// AND-combined. Empty lists produce no clause.
pub fn build_filters(domain: &Domain, query: &SearchQuery) -> Vec<String> {
    domain
        .filters
        .iter()
        .filter_map(|f| {
            let values = f.values(&query.filters);
            if values.is_empty() {
                return None;
            }
            let terms: Vec<String> = values.iter().map(|v| escape_filter_value(v)).collect();
            Some(format!("{}:({})", f.field, terms.join(" ")))
        })
        .collect()
}

/// Builds the select call for `query` against `domain`.
pub fn build_select(domain: &Domain, query: &SearchQuery) -> SelectRequest {
    let (mode, engine_query, highlight_query) = build_query_strings(&query.raw_text);
    let filters = build_filters(domain, query);

    let max_analyzed = match mode {
        QueryMode::Plain => MAX_ANALYZED_CHARS,
        QueryMode::CodePattern => MAX_ANALYZED_CHARS_CODE,
    };

    let params: Vec<(String, String)> = [
        ("hl", "on".to_string()),
        ("hl.fl", CONTENT_FIELD.to_string()),
        ("hl.q", highlight_query.clone()),
        ("hl.method", "unified".to_string()),
        ("hl.simple.pre", HIGHLIGHT_TAG_PRE.to_string()),
        ("hl.simple.post", HIGHLIGHT_TAG_POST.to_string()),
        ("hl.tag.pre", HIGHLIGHT_TAG_PRE.to_string()),
        ("hl.tag.post", HIGHLIGHT_TAG_POST.to_string()),
        ("hl.snippets", domain.highlight.snippets.to_string()),
        ("hl.fragsize", domain.highlight.fragsize.to_string()),
        ("hl.usePhraseHighlighter", "true".to_string()),
        ("hl.requireFieldMatch", "true".to_string()),
        ("hl.highlightMultiTerm", "true".to_string()),
        ("hl.mergeContiguous", "true".to_string()),
        ("hl.maxAnalyzedChars", max_analyzed.to_string()),
        ("hl.phraseLimit", HIGHLIGHT_PHRASE_LIMIT.to_string()),
        ("hl.multiValuedSeparatorChar", " ".to_string()),
        ("hl.bs.type", "WORD".to_string()),
        ("hl.bs.language", "en".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect();

    let mut body = json!({
        "query": engine_query,
        "fields": domain.select_fields,
        "facet": domain.facet_spec(),
    });
    if !filters.is_empty() {
        body["filter"] = json!(filters);
    }

    SelectRequest {
        mode,
        query: engine_query,
        highlight_query,
        filters,
        params,
        body,
    }
}

/// Builds an upsert of `docs`; documents with an existing `id` are
/// overwritten.
pub fn build_update<T: Serialize>(
    docs: &[T],
    commit_within_ms: u64,
) -> Result<UpdateRequest, serde_json::Error> {
    Ok(UpdateRequest {
        params: vec![
            ("commitWithin".to_string(), commit_within_ms.to_string()),
            ("overwrite".to_string(), "true".to_string()),
            ("wt".to_string(), "json".to_string()),
        ],
        body: serde_json::to_value(docs)?,
    })
}

/// Update body deleting every document and committing.
pub fn delete_all_body() -> Value {
    json!({ "delete": { "query": "*:*" }, "commit": {} })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{CODE, DOCSET};
    use crate::models::{CodeDocument, QueryFilters};

    #[test]
    fn test_plain_query() {
        let req = build_select(&CODE, &SearchQuery::new("function"));
        assert_eq!(req.mode, QueryMode::Plain);
        assert_eq!(req.query, "content:function");
        assert_eq!(req.highlight_query, "content:function");
        assert_eq!(req.body["query"], "content:function");
    }

    #[test]
    fn test_code_pattern_colon() {
        let req = build_select(&CODE, &SearchQuery::new(": void"));
        assert_eq!(req.mode, QueryMode::CodePattern);
        assert_eq!(req.highlight_query, r#"content:"\: void""#);
        assert!(req.query.starts_with(r#"content:": void"^10"#));
        assert!(req.query.contains(" OR content:void^2"));
        assert!(req.query.contains(r" OR content:\:void^5"));
        // ":" alone is too short to be a term clause.
        assert!(!req.query.contains(r"content:\:^2"));
    }

    #[test]
    fn test_every_special_char_selects_code_pattern() {
        for c in [':', '(', ')', '{', '}', '[', ']'] {
            let text = format!("foo{}bar", c);
            assert_eq!(query_mode(&text), QueryMode::CodePattern, "char {}", c);
        }
        for c in SPECIAL_CHARS {
            assert!(has_special_chars(&c.to_string()));
        }
        assert_eq!(query_mode("plain words here"), QueryMode::Plain);
    }

    #[test]
    fn test_code_pattern_without_spaces_has_no_nospace_clause() {
        let req = build_select(&CODE, &SearchQuery::new("function("));
        assert_eq!(req.query, r#"content:"function("^10 OR content:function\(^2"#);
        assert_eq!(req.highlight_query, r#"content:"function\(""#);
    }

    #[test]
    fn test_highlight_escapes_braces() {
        let (_, _, hl) = build_query_strings("{ a: [b] }");
        assert_eq!(hl, r#"content:"\{ a\: \[b\] \}""#);
    }

    #[test]
    fn test_literal_escaping() {
        assert_eq!(escape_literal(r#"a*b"c'd"#), r#"a\*b\"c\'d"#);
        let req = build_select(&CODE, &SearchQuery::new("say \"hi\""));
        assert_eq!(req.mode, QueryMode::Plain);
        assert_eq!(req.query, r#"content:say \"hi\""#);
    }

    #[test]
    fn test_plain_query_escapes_slash() {
        let req = build_select(&CODE, &SearchQuery::new("net/http"));
        assert_eq!(req.mode, QueryMode::Plain);
        assert_eq!(req.query, r"content:net\/http");
        assert_eq!(req.highlight_query, r"content:net\/http");

        let req = build_select(&CODE, &SearchQuery::new("a/b()"));
        assert!(req.query.starts_with(r#"content:"a\/b()"^10"#));
    }

    #[test]
    fn test_wildcard_query_is_code_pattern_and_escaped() {
        let req = build_select(&CODE, &SearchQuery::new("foo*"));
        assert_eq!(req.mode, QueryMode::CodePattern);
        assert!(req.query.starts_with(r#"content:"foo\*"^10"#));
        assert!(req.query.contains(r"content:foo\*^2"));
    }

    #[test]
    fn test_empty_query_matches_all() {
        let req = build_select(&CODE, &SearchQuery::new("   "));
        assert_eq!(req.query, "*:*");
    }

    #[test]
    fn test_filters_omitted_when_empty() {
        let req = build_select(&CODE, &SearchQuery::new("x"));
        assert!(req.filters.is_empty());
        assert!(req.body.get("filter").is_none());
    }

    #[test]
    fn test_filters_in_field_order() {
        let filters = QueryFilters {
            repo: vec!["acme/widget".into()],
            language: vec!["Go".into(), "Rust".into()],
            path: vec!["src/*".into()],
        };
        let req = build_select(&CODE, &SearchQuery::new("x").with_filters(filters));
        assert_eq!(
            req.filters,
            vec![
                "lang:(Go Rust)".to_string(),
                "path:(src\\/*)".to_string(),
                "repo:(acme\\/widget)".to_string(),
            ]
        );
        assert_eq!(req.body["filter"].as_array().map(|a| a.len()), Some(3));
    }

    #[test]
    fn test_filter_value_keeps_wildcards() {
        assert_eq!(escape_filter_value("a?b*"), "a?b*");
        assert_eq!(escape_filter_value("a b:c"), r"a\ b\:c");
    }

    #[test]
    fn test_highlight_params_in_url_not_body() {
        let req = build_select(&CODE, &SearchQuery::new("x"));
        assert_eq!(req.param("hl"), Some("on"));
        assert_eq!(req.param("hl.fl"), Some("content"));
        assert_eq!(req.param("hl.snippets"), Some("3"));
        assert_eq!(req.param("hl.fragsize"), Some("2500"));
        assert_eq!(req.param("hl.maxAnalyzedChars"), Some("100000"));
        assert!(req.body.get("hl").is_none());
        assert_eq!(req.body["fields"], "id,file_id,repo,lang,branch,owner_id");
        assert_eq!(req.body["facet"]["path"]["limit"], 8);
    }

    #[test]
    fn test_code_pattern_raises_analyzed_ceiling() {
        let req = build_select(&CODE, &SearchQuery::new("a => b"));
        assert_eq!(req.param("hl.maxAnalyzedChars"), Some("500000"));
    }

    #[test]
    fn test_docset_profile() {
        let filters = QueryFilters {
            repo: vec!["ignored".into()],
            ..Default::default()
        };
        let req = build_select(&DOCSET, &SearchQuery::new("intro").with_filters(filters));
        assert_eq!(req.param("hl.snippets"), Some("2"));
        assert_eq!(req.param("hl.fragsize"), Some("500"));
        assert!(req.body.get("filter").is_none());
        assert_eq!(req.body["facet"]["document"]["limit"], 10);
    }

    #[test]
    fn test_update_request() {
        let doc = CodeDocument {
            id: "/acme/widget/blob/main/a.go".into(),
            content: vec!["<tr></tr>".into()],
            ..Default::default()
        };
        let req = build_update(&[doc], 1000).unwrap();
        assert_eq!(
            req.params,
            vec![
                ("commitWithin".to_string(), "1000".to_string()),
                ("overwrite".to_string(), "true".to_string()),
                ("wt".to_string(), "json".to_string()),
            ]
        );
        assert_eq!(req.body[0]["id"], "/acme/widget/blob/main/a.go");
        assert!(req.body.is_array());
    }

    #[test]
    fn test_delete_all_body() {
        let body = delete_all_body();
        assert_eq!(body["delete"]["query"], "*:*");
        assert!(body["commit"].is_object());
    }
}
