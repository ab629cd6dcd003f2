//! Line-window chunker for rendered code tables.
//!
//! A crawled file arrives as one HTML table row per source line. The
//! chunker groups those rows into windows of [`LINES_PER_CHUNK`] lines and
//! re-wraps every window in its own table container, so each stored
//! content fragment renders on its own when returned as a highlight.
//!
//! # Guarantees
//!
//! - Windows are taken in file order with a fixed stride; only the last
//!   window may be shorter.
//! - No input produces an empty chunk; empty input produces no chunks.
//! - Stripping [`CHUNK_OPEN`] / [`CHUNK_CLOSE`] from every chunk and
//!   concatenating the rest gives back the input lines exactly.
//!
//! # Example
//!
//! ```rust
//! use heline_core::chunk::chunk_lines;
//!
//! let rows: Vec<String> = (0..12).map(|i| format!("<tr><td>{}</td></tr>", i)).collect();
//! let chunks = chunk_lines(&rows);
//! assert_eq!(chunks.len(), 3);
//! ```

/// Maximum number of source lines in one content fragment.
pub const LINES_PER_CHUNK: usize = 5;

/// Container opened at the start of every chunk.
pub const CHUNK_OPEN: &str = r#"<table class="highlight tab-size js-file-line-container" data-tab-size="8" data-paste-markdown-skip=""><tbody>"#;

/// Container closed at the end of every chunk.
pub const CHUNK_CLOSE: &str = "</tbody></table>";

/// Split per-line HTML rows into self-contained table fragments.
pub fn chunk_lines<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    lines
        .chunks(LINES_PER_CHUNK)
        .map(|window| {
            let body_len: usize = window.iter().map(|l| l.as_ref().len()).sum();
            let mut chunk = String::with_capacity(CHUNK_OPEN.len() + body_len + CHUNK_CLOSE.len());
            chunk.push_str(CHUNK_OPEN);
            for line in window {
                chunk.push_str(line.as_ref());
            }
            chunk.push_str(CHUNK_CLOSE);
            chunk
        })
        .collect()
}

/// The line content of a chunk, without its container.
pub fn chunk_body(chunk: &str) -> &str {
    chunk
        .strip_prefix(CHUNK_OPEN)
        .and_then(|rest| rest.strip_suffix(CHUNK_CLOSE))
        .unwrap_or(chunk)
}
