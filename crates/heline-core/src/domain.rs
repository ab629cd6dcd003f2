//! Search domains as data.
//!
//! Code search and docset search share one query builder and one result
//! normalizer. Everything that differs between them (stored fields,
//! envelope keys, facets, filters, highlight sizing, schema) lives in a
//! [`Domain`] table instead of in duplicated code paths.

use serde_json::{json, Value};

use crate::models::QueryFilters;

/// Engine field carrying the chunked HTML content; highlighting runs on it.
pub const CONTENT_FIELD: &str = "content";

/// Field whose presence marks a core's schema as already provisioned.
pub const SCHEMA_MARKER_FIELD: &str = CONTENT_FIELD;

/// Name of the analysed field type used for [`CONTENT_FIELD`].
pub const CONTENT_FIELD_TYPE: &str = "text_html";

/// Maps a stored engine field to its key in a normalized hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMapping {
    pub field: &'static str,
    pub key: &'static str,
}

/// A terms facet requested with every search.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FacetSpec {
    pub name: &'static str,
    pub field: &'static str,
    pub limit: u32,
}

/// Which [`QueryFilters`] list feeds a filterable field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterSource {
    Language,
    Path,
    Repo,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterField {
    pub field: &'static str,
    pub source: FilterSource,
}

impl FilterField {
    pub fn values<'a>(&self, filters: &'a QueryFilters) -> &'a [String] {
        match self.source {
            FilterSource::Language => &filters.language,
            FilterSource::Path => &filters.path,
            FilterSource::Repo => &filters.repo,
        }
    }
}

/// Highlight sizing for a domain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HighlightProfile {
    pub snippets: u32,
    pub fragsize: u32,
}

/// A stored field provisioned by schema setup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SchemaField {
    pub name: &'static str,
    pub field_type: &'static str,
    pub multi_valued: bool,
}

impl SchemaField {
    const fn string(name: &'static str) -> Self {
        Self {
            name,
            field_type: "string",
            multi_valued: false,
        }
    }

    const fn content() -> Self {
        Self {
            name: CONTENT_FIELD,
            field_type: CONTENT_FIELD_TYPE,
            multi_valued: true,
        }
    }
}

/// Everything that distinguishes one searchable index from another.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Domain {
    pub name: &'static str,
    /// Engine core used when configuration does not override it.
    pub default_core: &'static str,
    /// Stored fields returned by the engine and wrapped as `{"raw": ..}`.
    pub fields: &'static [FieldMapping],
    /// Key of the `{"snippet": [..]}` envelope in a normalized hit.
    pub snippet_key: &'static str,
    /// Fields requested from the engine (may include fields not surfaced).
    pub select_fields: &'static str,
    pub facets: &'static [FacetSpec],
    pub filters: &'static [FilterField],
    pub highlight: HighlightProfile,
    pub schema: &'static [SchemaField],
}

/// General code search over crawled source files.
pub const CODE: Domain = Domain {
    name: "code",
    default_core: "heline",
    fields: &[
        FieldMapping { field: "id", key: "id" },
        FieldMapping { field: "owner_id", key: "owner_id" },
        FieldMapping { field: "file_id", key: "file_id" },
        FieldMapping { field: "branch", key: "branch" },
        FieldMapping { field: "repo", key: "repo" },
    ],
    snippet_key: CONTENT_FIELD,
    select_fields: "id,file_id,repo,lang,branch,owner_id",
    facets: &[
        FacetSpec { name: "lang", field: "lang", limit: 10 },
        FacetSpec { name: "path", field: "path", limit: 8 },
        FacetSpec { name: "repo", field: "repo", limit: 7 },
    ],
    filters: &[
        FilterField { field: "lang", source: FilterSource::Language },
        FilterField { field: "path", source: FilterSource::Path },
        FilterField { field: "repo", source: FilterSource::Repo },
    ],
    highlight: HighlightProfile {
        snippets: 3,
        fragsize: 2500,
    },
    schema: &[
        SchemaField::string("branch"),
        SchemaField::string("path"),
        SchemaField::string("file_id"),
        SchemaField::string("owner_id"),
        SchemaField::string("lang"),
        SchemaField::string("repo"),
        SchemaField::content(),
    ],
};

/// Documentation-set search.
pub const DOCSET: Domain = Domain {
    name: "docset",
    default_core: "docset",
    fields: &[
        FieldMapping { field: "id", key: "id" },
        FieldMapping { field: "title", key: "title" },
        FieldMapping { field: "file_name", key: "file_name" },
        FieldMapping { field: "document", key: "document" },
        FieldMapping { field: "link", key: "link" },
    ],
    snippet_key: CONTENT_FIELD,
    select_fields: "id,file_name,title,link,document",
    facets: &[FacetSpec { name: "document", field: "document", limit: 10 }],
    filters: &[],
    highlight: HighlightProfile {
        snippets: 2,
        fragsize: 500,
    },
    schema: &[
        SchemaField::string("title"),
        SchemaField::string("file_name"),
        SchemaField::string("document"),
        SchemaField::string("link"),
        SchemaField::content(),
    ],
};

impl Domain {
    /// The JSON facet specification sent with every search.
    pub fn facet_spec(&self) -> Value {
        let facets: serde_json::Map<String, Value> = self
            .facets
            .iter()
            .map(|f| {
                (
                    f.name.to_string(),
                    json!({ "type": "terms", "field": f.field, "limit": f.limit }),
                )
            })
            .collect();
        Value::Object(facets)
    }

    /// Schema API body adding this domain's stored fields.
    pub fn add_fields_body(&self) -> Value {
        let fields: Vec<Value> = self
            .schema
            .iter()
            .map(|f| {
                let mut field = json!({
                    "name": f.name,
                    "type": f.field_type,
                    "stored": true,
                });
                if f.multi_valued {
                    field["multiValued"] = json!(true);
                    field["indexed"] = json!(true);
                }
                field
            })
            .collect();
        json!({ "add-field": fields })
    }
}

/// Schema API body defining the HTML-stripping, word-delimited field type
/// used for code content.
///
/// Whitespace tokenization plus word-delimiter splitting keeps punctuation
/// such as `(`, `=>`, or `: void` searchable inside code.
pub fn content_field_type_body() -> Value {
    let token_filters = json!([
        { "class": "solr.WordDelimiterFilterFactory" },
        { "class": "solr.LowerCaseFilterFactory" },
        { "class": "solr.ASCIIFoldingFilterFactory" }
    ]);
    let tokenizer = json!({ "class": "solr.WhitespaceTokenizerFactory", "rule": "java" });
    json!({
        "add-field-type": {
            "name": CONTENT_FIELD_TYPE,
            "class": "solr.TextField",
            "positionIncrementGap": "100",
            "autoGeneratePhraseQueries": "true",
            "analyzer": {
                "charFilters": [{ "class": "solr.HTMLStripCharFilterFactory" }],
                "tokenizer": tokenizer.clone(),
                "filters": token_filters.clone(),
            },
            "query": {
                "tokenizer": tokenizer,
                "filters": token_filters,
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_code_facets() {
        let spec = CODE.facet_spec();
        assert_eq!(spec["lang"]["limit"], 10);
        assert_eq!(spec["path"]["limit"], 8);
        assert_eq!(spec["repo"]["limit"], 7);
        assert_eq!(spec["repo"]["type"], "terms");
    }

    #[test]
    fn test_docset_facets() {
        let spec = DOCSET.facet_spec();
        assert_eq!(spec["document"]["limit"], 10);
        assert_eq!(spec.as_object().map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_add_fields_marks_content_multivalued() {
        let body = CODE.add_fields_body();
        let fields = body["add-field"].as_array().cloned().unwrap_or_default();
        assert_eq!(fields.len(), CODE.schema.len());
        let content = fields.iter().find(|f| f["name"] == CONTENT_FIELD).unwrap();
        assert_eq!(content["type"], CONTENT_FIELD_TYPE);
        assert_eq!(content["multiValued"], true);
        let repo = fields.iter().find(|f| f["name"] == "repo").unwrap();
        assert!(repo.get("multiValued").is_none());
    }

    #[test]
    fn test_filter_sources() {
        let filters = QueryFilters {
            repo: vec!["acme/widget".into()],
            language: vec!["Go".into()],
            path: vec![],
        };
        let values: Vec<&[String]> = CODE.filters.iter().map(|f| f.values(&filters)).collect();
        assert_eq!(values[0], ["Go".to_string()]);
        assert!(values[1].is_empty());
        assert_eq!(values[2], ["acme/widget".to_string()]);
    }
}
