//! Document identity and language extraction from crawled URLs.
//!
//! File pages on the code host are addressed as
//! `/{owner}/{repo}/{blob|tree}/{branch-or-commit}/{file path...}`. Every
//! identifier stored with a [`CodeDocument`](crate::models::CodeDocument)
//! is derived from those path segments.
//!
//! All functions here are total: crawled URLs are untrusted, so malformed
//! or shallow input degrades to empty or partial values instead of
//! failing.
//!
//! # Example
//!
//! ```rust
//! use heline_core::extract::{derive_branch, derive_id, derive_language, derive_repo};
//!
//! let url = "https://github.com/acme/widget/blob/main/lib.rs";
//! assert_eq!(derive_id(url), "g/acme/widget/lib.rs");
//! assert_eq!(derive_repo(url), "acme/widget");
//! assert_eq!(derive_branch(url), "main");
//! assert_eq!(derive_language(url), "Rust");
//! ```

use url::Url;

/// Namespace marker for identifiers derived from the code-host crawler.
pub const SOURCE_MARKER: &str = "g";

/// Length of a full hexadecimal commit SHA.
pub const COMMIT_SHA_LEN: usize = 40;

/// Length a commit SHA is shortened to when used as a branch label.
const SHORT_SHA_LEN: usize = 10;

/// Returns the percent-decoded path component of `url`.
///
/// Absolute URLs are parsed; anything else is treated as a bare path with
/// the query string and fragment cut off. A path that does not decode to
/// UTF-8 is returned as given.
pub fn url_path(url: &str) -> String {
    let raw = match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => {
            let end = url.find(['?', '#']).unwrap_or(url.len());
            url[..end].to_string()
        }
    };
    match urlencoding::decode(&raw) {
        Ok(decoded) => decoded.into_owned(),
        Err(_) => raw,
    }
}

/// True if `segment` looks like a full commit SHA.
pub fn is_commit_sha(segment: &str) -> bool {
    segment.len() == COMMIT_SHA_LEN && segment.bytes().all(|b| b.is_ascii_hexdigit())
}

/// Branch-independent file identifier.
///
/// Drops the `blob|tree` and branch segments when the path is deep enough
/// to contain them, then prefixes [`SOURCE_MARKER`]. The same file crawled
/// again maps to the same identifier.
pub fn derive_id(url: &str) -> String {
    let path = url_path(url);
    let segments: Vec<&str> = path.split('/').collect();
    let joined = if segments.len() > 5 {
        segments[..3]
            .iter()
            .chain(&segments[5..])
            .copied()
            .collect::<Vec<_>>()
            .join("/")
    } else {
        segments.join("/")
    };
    format!("{}{}", SOURCE_MARKER, joined)
}

/// File path relative to the branch segment, or `""` for shallow paths.
pub fn derive_path(url: &str) -> String {
    let path = url_path(url);
    let segments: Vec<&str> = path.split('/').collect();
    if segments.len() > 5 {
        segments[5..].join("/")
    } else {
        String::new()
    }
}

/// The branch-or-commit segment following `blob|tree`.
///
/// Paths too shallow to carry one fall back to the last segment of the
/// parent directory. A full commit SHA is shortened to its first ten
/// characters.
pub fn derive_branch(url: &str) -> String {
    let path = url_path(url);
    let segments: Vec<&str> = path.split('/').collect();
    let segment = match segments.get(4).filter(|s| !s.is_empty()) {
        Some(branch) => *branch,
        None => {
            let parent = match path.rfind('/') {
                Some(pos) => &path[..pos],
                None => "",
            };
            parent.rsplit('/').next().unwrap_or_default()
        }
    };
    if is_commit_sha(segment) {
        segment[..SHORT_SHA_LEN].to_string()
    } else {
        segment.to_string()
    }
}

/// `owner/repo`, from path segments 1 and 2.
pub fn derive_repo(url: &str) -> String {
    let path = url_path(url);
    path.split('/')
        .skip(1)
        .take(2)
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("/")
}

/// Canonical language label for the file extension.
///
/// Unmapped extensions fall back to the extension without its leading
/// dot; extensionless files yield `""`.
pub fn derive_language(url: &str) -> String {
    let path = url_path(url);
    let file_name = path.rsplit('/').next().unwrap_or_default();
    let ext = match file_name.rfind('.') {
        Some(pos) => &file_name[pos..],
        None => "",
    };

    let label = match ext {
        ".clj" | ".cljs" => "Clojure",
        ".cc" | ".c++" | ".hpp" | ".h" => "c++",
        ".ex" => "Elixir",
        ".erl" => "Erlang",
        ".hs" => "Haskell",
        ".js" => "JavaScript",
        ".ts" | ".tsx" => "TypeScript",
        ".gitignore" | ".npmignore" | ".dockerignore" | ".eslintignore" | ".prettierignore" => {
            "Ignore"
        }
        ".md" => "Markdown",
        ".rs" => "Rust",
        ".rb" => "Ruby",
        ".scss" => "SCSS",
        ".sh" => "Shell",
        ".txt" => "Text",
        ".json" => "JSON",
        ".yaml" | ".yml" => "YAML",
        ".html" => "HTML",
        ".css" => "CSS",
        ".php" => "PHP",
        ".go" => "Go",
        ".mod" if file_name == "go.mod" => "Go",
        other => other.strip_prefix('.').unwrap_or(other),
    };
    label.to_string()
}
