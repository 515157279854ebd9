//! Resource kind classification from URL extensions.
//!
//! [`classify`] is a pure function of the URL's lowercased trailing extension
//! token, with any query string or fragment stripped first. Unknown or absent
//! extensions yield `None`, which the loader rejects before touching any
//! collaborator.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Closed category of asset derived from a URL's extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ResourceKind {
    /// JavaScript, attached as a `<script>` element.
    Script,
    /// CSS, attached as a `<link rel="stylesheet">` element.
    Stylesheet,
    /// Raster or vector image, attached as an `<img>` element.
    Image,
    /// Web font, loaded through the font subsystem without a DOM element.
    Font,
    /// JSON document, fetched and parsed; never attached to the document.
    JsonDocument,
    /// Opaque bytes (pdf, zip, bin), fetched; never attached to the document.
    BinaryBlob,
}

impl ResourceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Script => "script",
            ResourceKind::Stylesheet => "stylesheet",
            ResourceKind::Image => "image",
            ResourceKind::Font => "font",
            ResourceKind::JsonDocument => "json-document",
            ResourceKind::BinaryBlob => "binary-blob",
        }
    }

    /// Whether this kind completes through a DOM element's load/error signal.
    pub fn is_element(&self) -> bool {
        matches!(
            self,
            ResourceKind::Script | ResourceKind::Stylesheet | ResourceKind::Image
        )
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Maps a URL to its resource kind, or `None` when the extension is
/// unrecognized or missing. Never panics.
///
/// # Examples
///
/// ```rust
/// use loadstone::kind::{classify, ResourceKind};
///
/// assert_eq!(classify("https://cdn.example.com/lib.js"), Some(ResourceKind::Script));
/// assert_eq!(classify("theme.css?v=3"), Some(ResourceKind::Stylesheet));
/// assert_eq!(classify("README"), None);
/// ```
pub fn classify(url: &str) -> Option<ResourceKind> {
    let kind = match extension(url)?.as_str() {
        "js" => ResourceKind::Script,
        "css" => ResourceKind::Stylesheet,
        "jpg" | "jpeg" | "png" | "gif" | "svg" => ResourceKind::Image,
        "woff" | "woff2" => ResourceKind::Font,
        "json" => ResourceKind::JsonDocument,
        "pdf" | "zip" | "bin" => ResourceKind::BinaryBlob,
        _ => return None,
    };
    Some(kind)
}

/// Trailing extension token of the URL's path, lowercased.
fn extension(url: &str) -> Option<String> {
    let path = url
        .split(|c: char| c == '?' || c == '#')
        .next()
        .unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or(path);
    let (_, ext) = segment.rsplit_once('.')?;
    if ext.is_empty() {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_known_extensions() {
        assert_eq!(classify("a.js"), Some(ResourceKind::Script));
        assert_eq!(classify("a.css"), Some(ResourceKind::Stylesheet));
        assert_eq!(classify("a.jpeg"), Some(ResourceKind::Image));
        assert_eq!(classify("a.svg"), Some(ResourceKind::Image));
        assert_eq!(classify("a.woff2"), Some(ResourceKind::Font));
        assert_eq!(classify("a.json"), Some(ResourceKind::JsonDocument));
        assert_eq!(classify("a.zip"), Some(ResourceKind::BinaryBlob));
    }

    #[test]
    fn test_classify_is_case_insensitive() {
        assert_eq!(classify("LIB.JS"), Some(ResourceKind::Script));
        assert_eq!(classify("Font.WOFF"), Some(ResourceKind::Font));
    }

    #[test]
    fn test_classify_strips_query_and_fragment() {
        assert_eq!(
            classify("https://example.com/app.js?_=123"),
            Some(ResourceKind::Script)
        );
        assert_eq!(classify("style.css#section"), Some(ResourceKind::Stylesheet));
        // The dot in the query must not be mistaken for an extension.
        assert_eq!(classify("page?next=a.js"), None);
    }

    #[test]
    fn test_classify_unknown_or_missing_extension() {
        assert_eq!(classify("archive.xyz"), None);
        assert_eq!(classify("no-extension"), None);
        assert_eq!(classify("https://example.com/"), None);
        assert_eq!(classify("trailing.dot."), None);
        assert_eq!(classify(""), None);
    }

    #[test]
    fn test_classify_dot_in_directory_only() {
        // The extension comes from the last path segment, not a directory name.
        assert_eq!(classify("https://example.com/v1.2/bundle"), None);
        assert_eq!(
            classify("https://example.com/v1.2/bundle.js"),
            Some(ResourceKind::Script)
        );
    }
}
