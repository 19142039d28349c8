//! Display helpers shared with the render collaborator.

/// Tag chip palette. A tag's color is a stable function of its text so the
/// same tag renders identically everywhere.
const TAG_COLORS: [&str; 10] = [
    "#e53e3e", "#dd6b20", "#d69e2e", "#38a169", "#319795", "#3182ce", "#5a67d8", "#805ad5",
    "#d53f8c", "#718096",
];

/// Deterministic display color for a tag, derived from its text.
#[must_use]
pub fn tag_color(tag: &str) -> &'static str {
    // 32-bit string hash over UTF-16 code units, wrapping like the classic
    // `hash * 31 + c` scheme.
    let mut hash: i32 = 0;
    for unit in tag.encode_utf16() {
        hash = hash
            .wrapping_shl(5)
            .wrapping_sub(hash)
            .wrapping_add(i32::from(unit));
    }
    TAG_COLORS[hash.unsigned_abs() as usize % TAG_COLORS.len()]
}

/// Format a byte size for list metadata: `500 B`, `19.5 KB`, `1.9 MB`.
#[must_use]
pub fn format_size(bytes: u64) -> String {
    const KB: f64 = 1024.0;
    const MB: f64 = KB * 1024.0;

    let bytes_f = bytes as f64;
    if bytes_f < KB {
        format!("{bytes} B")
    } else if bytes_f < MB {
        format!("{:.1} KB", bytes_f / KB)
    } else {
        format!("{:.1} MB", bytes_f / MB)
    }
}

/// Format a token count compactly: `950`, `12K`, `1.2M`.
#[must_use]
pub fn format_tokens(count: u64) -> String {
    if count >= 1_000_000 {
        format!("{:.1}M", count as f64 / 1_000_000.0)
    } else if count >= 1_000 {
        format!("{}K", (count as f64 / 1_000.0).round() as u64)
    } else {
        count.to_string()
    }
}

/// Collapse a working directory to its final component: `~/crate`.
#[must_use]
pub fn short_path(cwd: &str) -> String {
    let last = cwd
        .replace('\\', "/")
        .split('/')
        .filter(|part| !part.is_empty())
        .next_back()
        .map(String::from)
        .unwrap_or_default();
    format!("~/{last}")
}
