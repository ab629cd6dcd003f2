//! Engine response normalization.
//!
//! Reshapes a raw select response (`response.docs`, `highlighting`,
//! `facets`) into the client-facing [`SearchHits`] shape. One routine
//! serves every [`Domain`]; the domain's field table decides which stored
//! fields are surfaced and under which keys.
//!
//! Each surviving hit wraps stored values as `{"raw": value}` and the
//! highlight fragments as `{"snippet": [..]}`:
//!
//! ```json
//! {
//!   "id":      { "raw": "/acme/widget/blob/main/a.go" },
//!   "repo":    { "raw": "acme/widget" },
//!   "content": { "snippet": ["<mark>fn</mark> main"] }
//! }
//! ```
//!
//! A document without highlight fragments is left out of `hits`, while
//! `total` still reports the engine's `numFound`. The two can diverge.

use std::collections::BTreeMap;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::domain::{Domain, CONTENT_FIELD};

/// Raw select response, as much of it as normalization reads.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawResponse {
    #[serde(default)]
    pub response: RawDocs,
    #[serde(default)]
    pub highlighting: BTreeMap<String, BTreeMap<String, Vec<String>>>,
    #[serde(default)]
    pub facets: Option<Value>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawDocs<T = Map<String, Value>> {
    #[serde(default, rename = "numFound")]
    pub num_found: u64,
    #[serde(default = "Vec::new")]
    pub docs: Vec<T>,
}

/// A hit field: either a stored value or the highlighted fragments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FieldValue {
    Snippet { snippet: Vec<String> },
    Raw { raw: Value },
}

impl FieldValue {
    pub fn as_raw(&self) -> Option<&Value> {
        match self {
            FieldValue::Raw { raw } => Some(raw),
            FieldValue::Snippet { .. } => None,
        }
    }

    pub fn as_snippet(&self) -> Option<&[String]> {
        match self {
            FieldValue::Snippet { snippet } => Some(snippet),
            FieldValue::Raw { .. } => None,
        }
    }
}

/// One normalized hit, keyed by envelope key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Hit(pub BTreeMap<String, FieldValue>);

impl Hit {
    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.0.get(key)
    }
}

/// Client-facing search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchHits {
    pub hits: Vec<Hit>,
    pub facets: Value,
    pub total: u64,
}

impl Default for SearchHits {
    fn default() -> Self {
        Self {
            hits: Vec::new(),
            facets: Value::Object(Map::new()),
            total: 0,
        }
    }
}

/// Decodes and normalizes a raw select response body.
pub fn normalize(domain: &Domain, body: &[u8]) -> Result<SearchHits, serde_json::Error> {
    let raw: RawResponse = serde_json::from_slice(body)?;
    Ok(normalize_response(domain, raw))
}

pub fn normalize_response(domain: &Domain, raw: RawResponse) -> SearchHits {
    let mut hits = Vec::with_capacity(raw.response.docs.len());

    for doc in &raw.response.docs {
        let id = match doc.get("id") {
            Some(Value::String(id)) => id.clone(),
            Some(other) => other.to_string(),
            None => continue,
        };

        let fragments = raw
            .highlighting
            .get(&id)
            .and_then(|h| h.get(CONTENT_FIELD))
            .filter(|f| !f.is_empty());
        let Some(fragments) = fragments else {
            continue;
        };

        let mut fields = BTreeMap::new();
        for mapping in domain.fields {
            let raw_value = doc
                .get(mapping.field)
                .cloned()
                .unwrap_or_else(|| Value::String(String::new()));
            fields.insert(mapping.key.to_string(), FieldValue::Raw { raw: raw_value });
        }
        fields.insert(
            domain.snippet_key.to_string(),
            FieldValue::Snippet {
                snippet: fragments.clone(),
            },
        );
        hits.push(Hit(fields));
    }

    SearchHits {
        hits,
        facets: raw.facets.unwrap_or_else(|| Value::Object(Map::new())),
        total: raw.response.num_found,
    }
}

/// First document of a real-time get / select response, if any.
pub fn first_document<T: DeserializeOwned>(body: &[u8]) -> Result<Option<T>, serde_json::Error> {
    #[derive(Deserialize)]
    #[serde(bound(deserialize = "T: DeserializeOwned"))]
    struct Envelope<T> {
        #[serde(default)]
        response: Option<RawDocs<T>>,
    }

    let envelope: Envelope<T> = serde_json::from_slice(body)?;
    Ok(envelope
        .response
        .and_then(|r| r.docs.into_iter().next()))
}
