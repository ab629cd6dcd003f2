//! HTML extraction for crawled pages.
//!
//! Parsing is synchronous and self-contained: a page is parsed, scanned
//! and dropped inside [`scan_page`], which returns owned data only. The
//! parsed DOM never crosses an `.await`.

use heline_core::chunk::chunk_lines;
use heline_core::extract::{
    derive_branch, derive_id, derive_language, derive_path, derive_repo, url_path,
};
use heline_core::models::CodeDocument;
use select::document::Document;
use select::predicate::{And, Class, Name};
use url::Url;

/// Marker in the name of the `<meta>` tag carrying the numeric owner ID.
const OWNER_META_MARKER: &str = "octolytics-dimension-user_id";

/// What one crawled page yields.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageScan {
    /// The file on this page, for file views with rendered code.
    pub document: Option<CodeDocument>,
    /// Every `href` on the page, unresolved and unfiltered.
    pub links: Vec<String>,
}

/// True if `url` is a single-file view.
pub fn is_file_view(url: &Url) -> bool {
    url.path().contains("/blob/")
}

/// Parses `html` fetched from `url`.
pub fn scan_page(url: &Url, html: &str) -> PageScan {
    let doc = Document::from(html);

    let links = doc
        .find(Name("a"))
        .filter_map(|a| a.attr("href"))
        .map(str::to_string)
        .collect();

    let document = if is_file_view(url) {
        extract_document(url, &doc)
    } else {
        None
    };

    PageScan { document, links }
}

/// Builds the document for a file view, or `None` when the page has no
/// code table.
fn extract_document(url: &Url, doc: &Document) -> Option<CodeDocument> {
    let table = doc.find(And(Name("table"), Class("highlight"))).next()?;
    let rows: Vec<String> = table.find(Name("tr")).map(|tr| tr.html()).collect();
    if rows.is_empty() {
        return None;
    }

    let owner_id = doc
        .find(Name("meta"))
        .find(|m| m.attr("name").is_some_and(|n| n.contains(OWNER_META_MARKER)))
        .and_then(|m| m.attr("content"))
        .unwrap_or_default()
        .to_string();

    let address = url.as_str();
    Some(CodeDocument {
        id: url_path(address),
        file_id: derive_id(address),
        owner_id,
        path: derive_path(address),
        repo: derive_repo(address),
        branch: derive_branch(address),
        lang: derive_language(address),
        content: chunk_lines(&rows),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use heline_core::chunk::chunk_body;

    fn file_page(lines: usize) -> String {
        let rows: String = (1..=lines)
            .map(|i| format!("<tr><td id=\"L{i}\">{i}</td><td id=\"LC{i}\">line {i}</td></tr>"))
            .collect();
        format!(
            r#"<html><head>
<meta name="octolytics-dimension-user_id" content="1234">
<meta name="description" content="x">
</head><body>
<a href="/acme/widget/blob/main/src/lib.rs">lib</a>
<a href="https://example.com/elsewhere">out</a>
<a>no href</a>
<table class="highlight tab-size js-file-line-container"><tbody>{rows}</tbody></table>
</body></html>"#
        )
    }

    #[test]
    fn test_file_view_extracts_document() {
        let url = Url::parse("https://github.com/acme/widget/blob/main/src/main.go").unwrap();
        let scan = scan_page(&url, &file_page(7));
        let doc = scan.document.unwrap();

        assert_eq!(doc.id, "/acme/widget/blob/main/src/main.go");
        assert_eq!(doc.file_id, "g/acme/widget/src/main.go");
        assert_eq!(doc.owner_id, "1234");
        assert_eq!(doc.path, "src/main.go");
        assert_eq!(doc.repo, "acme/widget");
        assert_eq!(doc.branch, "main");
        assert_eq!(doc.lang, "Go");
        assert_eq!(doc.content.len(), 2);
        assert_eq!(chunk_body(&doc.content[0]).matches("<tr").count(), 5);
        assert!(doc.content[1].contains("line 7"));
    }

    #[test]
    fn test_encoded_file_name_decoded() {
        let url = Url::parse("https://github.com/acme/widget/blob/dev/my%20dir/na%C3%AFve.rs").unwrap();
        let doc = scan_page(&url, &file_page(1)).document.unwrap();
        assert_eq!(doc.id, "/acme/widget/blob/dev/my dir/naïve.rs");
        assert_eq!(doc.path, "my dir/naïve.rs");
        assert_eq!(doc.file_id, "g/acme/widget/my dir/naïve.rs");
        assert_eq!(doc.branch, "dev");
    }

    #[test]
    fn test_links_collected() {
        let url = Url::parse("https://github.com/acme/widget/blob/main/a.go").unwrap();
        let scan = scan_page(&url, &file_page(1));
        assert_eq!(
            scan.links,
            vec!["/acme/widget/blob/main/src/lib.rs", "https://example.com/elsewhere"]
        );
    }

    #[test]
    fn test_tree_page_has_no_document() {
        let url = Url::parse("https://github.com/acme/widget/tree/main/src").unwrap();
        let scan = scan_page(&url, &file_page(3));
        assert!(scan.document.is_none());
        assert_eq!(scan.links.len(), 2);
    }

    #[test]
    fn test_missing_table_or_owner() {
        let url = Url::parse("https://github.com/acme/widget/blob/main/a.go").unwrap();
        let scan = scan_page(&url, "<html><body><p>binary file</p></body></html>");
        assert!(scan.document.is_none());

        let html = r#"<table class="highlight"><tr><td>x</td></tr></table>"#;
        let doc = scan_page(&url, html).document.unwrap();
        assert_eq!(doc.owner_id, "");
        assert_eq!(doc.content.len(), 1);
    }
}
