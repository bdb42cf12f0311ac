//! Text extraction across the supported document formats.
//!
//! Each extractor consumes a document staged to a temp file and returns plain unicode text.
//! PDF extraction goes through `pdf-extract`; DOCX documents are opened as zip containers and
//! their `word/document.xml` paragraphs are walked with a streaming XML reader; plain text is
//! decoded as strict UTF-8.

use super::types::{DocumentFormat, ExtractionError};
use quick_xml::Reader;
use quick_xml::events::Event;
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Sentinel returned for PDFs whose pages carry no extractable text.
pub const EMPTY_PDF_SENTINEL: &str = "No readable text found in the PDF.";

/// Extract the textual content of a staged document.
pub fn extract(path: &Path, format: DocumentFormat) -> Result<String, ExtractionError> {
    match format {
        DocumentFormat::Pdf => extract_pdf(path),
        DocumentFormat::Docx => extract_docx(path),
        DocumentFormat::Txt => extract_txt(path),
    }
}

/// Concatenate the extracted text of every page, in page order.
///
/// A parseable PDF with no text layer is a degraded success, not an error: downstream stages
/// receive the sentinel string instead.
fn extract_pdf(path: &Path) -> Result<String, ExtractionError> {
    let text =
        pdf_extract::extract_text(path).map_err(|error| ExtractionError::Pdf(error.to_string()))?;
    Ok(pdf_text_or_sentinel(text, path))
}

fn pdf_text_or_sentinel(text: String, path: &Path) -> String {
    if text.trim().is_empty() {
        tracing::warn!(path = %path.display(), "Extracted empty text from PDF");
        return EMPTY_PDF_SENTINEL.to_string();
    }
    tracing::info!(
        path = %path.display(),
        characters = text.len(),
        "Extracted text from PDF"
    );
    text
}

/// Join paragraph texts with newlines, preserving document order.
fn extract_docx(path: &Path) -> Result<String, ExtractionError> {
    let file = File::open(path)?;
    let mut archive =
        ZipArchive::new(file).map_err(|error| ExtractionError::Docx(error.to_string()))?;
    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|error| ExtractionError::Docx(error.to_string()))?
        .read_to_string(&mut document_xml)?;
    docx_paragraphs(&document_xml)
}

/// Walk the WordprocessingML body, collecting text runs (`w:t`) per paragraph (`w:p`).
fn docx_paragraphs(xml: &str) -> Result<String, ExtractionError> {
    let mut reader = Reader::from_str(xml);
    let mut paragraphs: Vec<String> = Vec::new();
    let mut current = String::new();
    let mut in_text_run = false;

    loop {
        let event = reader
            .read_event()
            .map_err(|error| ExtractionError::Docx(error.to_string()))?;
        match event {
            Event::Start(element) => {
                if element.local_name().as_ref() == b"t" {
                    in_text_run = true;
                }
            }
            Event::End(element) => match element.local_name().as_ref() {
                b"t" => in_text_run = false,
                b"p" => paragraphs.push(std::mem::take(&mut current)),
                _ => {}
            },
            // Self-closed <w:p/> still marks an (empty) paragraph.
            Event::Empty(element) if element.local_name().as_ref() == b"p" => {
                paragraphs.push(std::mem::take(&mut current));
            }
            Event::Text(text) if in_text_run => {
                let value = text
                    .unescape()
                    .map_err(|error| ExtractionError::Docx(error.to_string()))?;
                current.push_str(&value);
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(paragraphs.join("\n"))
}

/// Decode raw bytes as UTF-8 text verbatim.
fn extract_txt(path: &Path) -> Result<String, ExtractionError> {
    let bytes = std::fs::read(path)?;
    Ok(String::from_utf8(bytes)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn stage(suffix: &str, bytes: &[u8]) -> tempfile::NamedTempFile {
        let mut staged = tempfile::Builder::new()
            .suffix(suffix)
            .tempfile()
            .expect("temp file");
        staged.write_all(bytes).expect("write staged bytes");
        staged
    }

    fn docx_bytes(paragraphs: &[&str]) -> Vec<u8> {
        let mut body = String::new();
        for paragraph in paragraphs {
            body.push_str(&format!("<w:p><w:r><w:t>{paragraph}</w:t></w:r></w:p>"));
        }
        let document = format!(
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\
             <w:document xmlns:w=\"http://schemas.openxmlformats.org/wordprocessingml/2006/main\">\
             <w:body>{body}</w:body></w:document>"
        );

        let mut buffer = std::io::Cursor::new(Vec::new());
        let mut writer = zip::ZipWriter::new(&mut buffer);
        writer
            .start_file("word/document.xml", SimpleFileOptions::default())
            .expect("start zip entry");
        writer
            .write_all(document.as_bytes())
            .expect("write zip entry");
        writer.finish().expect("finish zip");
        buffer.into_inner()
    }

    #[test]
    fn txt_files_decode_verbatim() {
        let staged = stage(".txt", "Hello world.\nSecond line.".as_bytes());
        let text = extract(staged.path(), DocumentFormat::Txt).expect("txt");
        assert_eq!(text, "Hello world.\nSecond line.");
    }

    #[test]
    fn txt_rejects_invalid_utf8() {
        let staged = stage(".txt", &[0xff, 0xfe, 0x00]);
        let error = extract(staged.path(), DocumentFormat::Txt).expect_err("decode error");
        assert!(matches!(error, ExtractionError::Decode(_)));
    }

    #[test]
    fn docx_joins_paragraphs_with_newlines() {
        let staged = stage(".docx", &docx_bytes(&["First paragraph.", "Second paragraph."]));
        let text = extract(staged.path(), DocumentFormat::Docx).expect("docx");
        assert_eq!(text, "First paragraph.\nSecond paragraph.");
    }

    #[test]
    fn empty_docx_yields_empty_string() {
        let staged = stage(".docx", &docx_bytes(&[]));
        let text = extract(staged.path(), DocumentFormat::Docx).expect("docx");
        assert_eq!(text, "");
    }

    #[test]
    fn docx_unescapes_entities() {
        let staged = stage(".docx", &docx_bytes(&["a &amp; b"]));
        let text = extract(staged.path(), DocumentFormat::Docx).expect("docx");
        assert_eq!(text, "a & b");
    }

    #[test]
    fn malformed_docx_fails_with_cause() {
        let staged = stage(".docx", b"this is not a zip archive");
        let error = extract(staged.path(), DocumentFormat::Docx).expect_err("docx error");
        assert!(matches!(error, ExtractionError::Docx(_)));
    }

    #[test]
    fn malformed_pdf_fails_with_cause() {
        let staged = stage(".pdf", b"not a pdf at all");
        let error = extract(staged.path(), DocumentFormat::Pdf).expect_err("pdf error");
        assert!(matches!(error, ExtractionError::Pdf(_)));
    }

    #[test]
    fn whitespace_only_pdf_text_becomes_sentinel() {
        let text = pdf_text_or_sentinel("  \n\t ".to_string(), Path::new("sample.pdf"));
        assert_eq!(text, EMPTY_PDF_SENTINEL);
    }

    #[test]
    fn nonempty_pdf_text_passes_through() {
        let text = pdf_text_or_sentinel("Page one. Page two.".to_string(), Path::new("s.pdf"));
        assert_eq!(text, "Page one. Page two.");
    }
}
