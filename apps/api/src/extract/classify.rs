//! Format classification: picks the extraction path for a fetched document.

use reqwest::Url;
use serde::Serialize;

/// The three extraction paths a document can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FormatClass {
    Pdf,
    Word,
    Plain,
}

/// Returns the lowercased suffix of the last path segment of `url`.
///
/// Unparsable URLs and segments without a dot yield an empty string.
pub fn extension_from_url(url: &str) -> String {
    let Ok(parsed) = Url::parse(url) else {
        return String::new();
    };
    let segment = parsed.path().rsplit('/').next().unwrap_or_default();
    extension_from_name(segment)
}

/// Lowercased text after the last `.` of a file name, or empty.
pub fn extension_from_name(name: &str) -> String {
    name.rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default()
}

/// Classifies a document by URL suffix first, then by response content type.
///
/// Total and side-effect free: anything unrecognised is `Plain`.
pub fn classify(url: &str, content_type: &str) -> FormatClass {
    classify_parts(&extension_from_url(url), content_type)
}

fn classify_parts(extension: &str, content_type: &str) -> FormatClass {
    match extension {
        "pdf" => return FormatClass::Pdf,
        "docx" | "doc" => return FormatClass::Word,
        _ => {}
    }

    let content_type = content_type.to_ascii_lowercase();
    if content_type.contains("pdf") {
        FormatClass::Pdf
    } else if content_type.contains("word") || content_type.contains("officedocument") {
        FormatClass::Word
    } else {
        FormatClass::Plain
    }
}
