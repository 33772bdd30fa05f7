//! Raw text from Word (OOXML) documents: one pass over `word/document.xml`.

use std::io::{Cursor, Read};

use quick_xml::events::Event;
use quick_xml::Reader;
use thiserror::Error;

const DOCUMENT_PART: &str = "word/document.xml";

#[derive(Debug, Error)]
pub enum WordError {
    #[error("not a Word document container: {0}")]
    Container(#[from] zip::result::ZipError),

    #[error("failed to read {DOCUMENT_PART}: {0}")]
    Io(#[from] std::io::Error),

    #[error("malformed {DOCUMENT_PART}: {0}")]
    Xml(#[from] quick_xml::Error),
}

/// Extracts paragraph text, separating paragraphs with a blank line. Result is trimmed.
pub fn extract_docx_text(bytes: &[u8]) -> Result<String, WordError> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))?;
    let mut xml = String::new();
    archive.by_name(DOCUMENT_PART)?.read_to_string(&mut xml)?;
    document_xml_to_text(&xml)
}

/// `w:tab`, `w:br` and `w:cr` only count inside a run (`w:r`); the same names
/// appear as tab-stop and layout definitions under `w:pPr`.
/// Blank paragraphs add no extra break.
fn document_xml_to_text(xml: &str) -> Result<String, WordError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(false);

    let mut out = String::new();
    let mut run_depth = 0usize;
    let mut in_text_run = false;

    loop {
        match reader.read_event()? {
            Event::Start(e) => match e.local_name().as_ref() {
                b"r" => run_depth += 1,
                b"t" => in_text_run = run_depth > 0,
                _ => {}
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"r" => run_depth = run_depth.saturating_sub(1),
                b"t" => in_text_run = false,
                b"p" => end_paragraph(&mut out),
                _ => {}
            },
            Event::Empty(e) if run_depth > 0 => match e.local_name().as_ref() {
                b"tab" => out.push('\t'),
                b"br" | b"cr" => out.push('\n'),
                _ => {}
            },
            Event::Text(e) if in_text_run => out.push_str(&e.unescape()?),
            Event::CData(e) if in_text_run => {
                out.push_str(&String::from_utf8_lossy(&e.into_inner()))
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(out.trim().to_string())
}

fn end_paragraph(out: &mut String) {
    if !out.is_empty() && !out.ends_with("\n\n") {
        out.push_str("\n\n");
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use zip::write::SimpleFileOptions;

    use super::*;
    use crate::extract::fixtures::docx;

    #[test]
    fn test_single_paragraph() {
        let bytes = docx(&["Hello World"]);
        assert_eq!(extract_docx_text(&bytes).unwrap(), "Hello World");
    }

    #[test]
    fn test_paragraphs_are_separated_by_blank_line() {
        let bytes = docx(&["Jane Doe", "Senior Engineer &amp; Mentor"]);
        assert_eq!(
            extract_docx_text(&bytes).unwrap(),
            "Jane Doe\n\nSenior Engineer & Mentor"
        );
    }

    #[test]
    fn test_runs_tabs_and_breaks() {
        let xml = r#"<w:document xmlns:w="w"><w:body><w:p><w:r><w:t>Rust</w:t><w:tab/><w:t>Go</w:t><w:br/><w:t>SQL</w:t></w:r></w:p></w:body></w:document>"#;
        assert_eq!(document_xml_to_text(xml).unwrap(), "Rust\tGo\nSQL");
    }

    #[test]
    fn test_tab_stop_definitions_are_not_text() {
        let xml = r#"<w:document xmlns:w="w"><w:body><w:p><w:r><w:t>Jane Doe</w:t></w:r></w:p><w:p><w:pPr><w:tabs><w:tab w:val="left" w:pos="720"/><w:tab w:val="right" w:pos="9360"/></w:tabs></w:pPr><w:r><w:t>Engineer</w:t><w:tab/><w:t>2019</w:t></w:r></w:p></w:body></w:document>"#;
        assert_eq!(
            document_xml_to_text(xml).unwrap(),
            "Jane Doe\n\nEngineer\t2019"
        );
    }

    #[test]
    fn test_blank_paragraphs_collapse_into_one_break() {
        let xml = r#"<w:document xmlns:w="w"><w:body><w:p><w:r><w:t>Summary</w:t></w:r></w:p><w:p/><w:p><w:pPr/></w:p><w:p><w:r><w:t>Experience</w:t></w:r></w:p></w:body></w:document>"#;
        assert_eq!(
            document_xml_to_text(xml).unwrap(),
            "Summary\n\nExperience"
        );
    }

    #[test]
    fn test_text_outside_runs_is_ignored() {
        let xml = r#"<w:document xmlns:w="w"><w:body><w:p><w:instrText>PAGE</w:instrText><w:r><w:t>Visible</w:t></w:r></w:p></w:body></w:document>"#;
        assert_eq!(document_xml_to_text(xml).unwrap(), "Visible");
    }

    #[test]
    fn test_legacy_or_corrupt_input_is_container_error() {
        let err = extract_docx_text(b"\xD0\xCF\x11\xE0 legacy binary doc").unwrap_err();
        assert!(matches!(err, WordError::Container(_)));
    }

    #[test]
    fn test_zip_without_document_part_fails() {
        let mut writer = zip::ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file("other.txt", SimpleFileOptions::default())
            .unwrap();
        writer.write_all(b"x").unwrap();
        let bytes = writer.finish().unwrap().into_inner();
        assert!(matches!(
            extract_docx_text(&bytes),
            Err(WordError::Container(_))
        ));
    }
}
