//! Text extraction from uploaded files, routed by extension.

use std::fs;
use std::path::Path;
use tracing::{debug, warn};

use crate::{RagError, RagResult};

/// The strategy used to pull text out of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Extractor {
    Text,
    Csv,
    Html,
    Pdf,
    Docx,
    Pptx,
    Excel,
    Image,
}

impl Extractor {
    /// Pick an extractor from the file extension. Unknown extensions are
    /// read as text.
    pub fn for_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_ascii_lowercase())
            .unwrap_or_default();

        match ext.as_str() {
            "pdf" => Extractor::Pdf,
            "docx" => Extractor::Docx,
            "pptx" => Extractor::Pptx,
            "xlsx" | "xls" => Extractor::Excel,
            "csv" => Extractor::Csv,
            "html" | "htm" => Extractor::Html,
            "jpg" | "jpeg" | "png" | "webp" | "gif" | "tif" | "tiff" => Extractor::Image,
            _ => Extractor::Text,
        }
    }

    /// Name recorded on the document and echoed in upload responses.
    pub fn name(&self) -> &'static str {
        match self {
            Extractor::Text => "extract_text_from_txt",
            Extractor::Csv => "extract_text_from_csv",
            Extractor::Html => "extract_text_from_html",
            Extractor::Pdf => "extract_text_from_pdf",
            Extractor::Docx => "extract_text_from_docx",
            Extractor::Pptx => "extract_text_from_pptx",
            Extractor::Excel => "extract_text_from_excel",
            Extractor::Image => "extract_text_from_image",
        }
    }

    /// Whether this build can read text out of the format.
    pub fn is_supported(&self) -> bool {
        matches!(self, Extractor::Text | Extractor::Csv | Extractor::Html)
    }

    fn extract(&self, path: &Path) -> RagResult<String> {
        match self {
            Extractor::Text => read_text(path),
            Extractor::Csv => csv_to_text(path),
            Extractor::Html => Ok(html_to_text(&read_text(path)?)),
            other => Err(RagError::UnsupportedFormat(other.name())),
        }
    }
}

/// Extract text from `path`.
///
/// Failures are logged and yield empty text; the chosen extractor is
/// always returned.
pub fn extract_text(path: &Path) -> (String, Extractor) {
    let extractor = Extractor::for_path(path);
    let text = match extractor.extract(path) {
        Ok(text) => text,
        Err(e) => {
            warn!("Failed to extract text from {:?} with {}: {}", path, extractor.name(), e);
            String::new()
        }
    };
    debug!("Extracted {} chars from {:?}", text.len(), path);
    (text, extractor)
}

/// Best-effort MIME type from the file extension.
pub fn guess_mime_type(path: &Path) -> &'static str {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();

    match ext.as_str() {
        "pdf" => "application/pdf",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "pptx" => "application/vnd.openxmlformats-officedocument.presentationml.presentation",
        "xlsx" => "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet",
        "xls" => "application/vnd.ms-excel",
        "csv" => "text/csv",
        "html" | "htm" => "text/html",
        "txt" => "text/plain",
        "md" => "text/markdown",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "webp" => "image/webp",
        "gif" => "image/gif",
        "tif" | "tiff" => "image/tiff",
        _ => "",
    }
}

/// Read a file as UTF-8, dropping undecodable bytes.
fn read_text(path: &Path) -> RagResult<String> {
    let bytes = fs::read(path)?;
    Ok(String::from_utf8_lossy(&bytes)
        .chars()
        .filter(|c| *c != char::REPLACEMENT_CHARACTER)
        .collect())
}

/// Render a CSV file as an aligned table: header line, then one line per
/// record.
fn csv_to_text(path: &Path) -> RagResult<String> {
    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .from_path(path)?;

    let mut rows: Vec<Vec<String>> = vec![reader.headers()?.iter().map(str::to_string).collect()];
    for record in reader.records() {
        rows.push(record?.iter().map(str::to_string).collect());
    }

    let columns = rows.iter().map(Vec::len).max().unwrap_or(0);
    let mut widths = vec![0usize; columns];
    for row in &rows {
        for (i, cell) in row.iter().enumerate() {
            widths[i] = widths[i].max(cell.chars().count());
        }
    }

    let lines: Vec<String> = rows
        .iter()
        .map(|row| {
            row.iter()
                .enumerate()
                .map(|(i, cell)| format!("{:>width$}", cell, width = widths[i]))
                .collect::<Vec<_>>()
                .join("  ")
                .trim_end()
                .to_string()
        })
        .collect();

    Ok(lines.join("\n"))
}

/// Visible text of an HTML document, one line per text run.
pub fn html_to_text(html: &str) -> String {
    let mut lines = Vec::new();
    let mut rest = html;

    while let Some(start) = rest.find('<') {
        push_text(&rest[..start], &mut lines);
        rest = &rest[start..];

        if rest.starts_with("<!--") {
            rest = rest.find("-->").map_or("", |end| &rest[end + 3..]);
            continue;
        }

        let Some(end) = rest.find('>') else {
            rest = "";
            break;
        };
        let tag = &rest[1..end];
        rest = &rest[end + 1..];

        let name = tag_name(tag);
        if !tag.starts_with('/') && (name == "script" || name == "style") {
            let close = format!("</{}", name);
            let lower = rest.to_ascii_lowercase();
            rest = match lower.find(&close) {
                Some(i) => rest[i..].find('>').map_or("", |j| &rest[i + j + 1..]),
                None => "",
            };
        }
    }
    push_text(rest, &mut lines);

    lines.join("\n")
}

fn tag_name(tag: &str) -> String {
    tag.trim_start_matches('/')
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect::<String>()
        .to_ascii_lowercase()
}

fn push_text(raw: &str, lines: &mut Vec<String>) {
    let decoded = decode_entities(raw);
    let trimmed = decoded.trim();
    if !trimmed.is_empty() {
        lines.push(trimmed.to_string());
    }
}

fn decode_entities(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    let mut rest = raw;

    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];

        let decoded = rest[1..]
            .find(';')
            .filter(|semi| *semi <= 10)
            .and_then(|semi| decode_entity(&rest[1..semi + 1]).map(|c| (c, semi + 2)));

        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn decode_entity(entity: &str) -> Option<char> {
    match entity {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let code = if let Some(hex) = entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                u32::from_str_radix(hex, 16).ok()?
            } else {
                entity.strip_prefix('#')?.parse().ok()?
            };
            char::from_u32(code)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_file(dir: &tempfile::TempDir, name: &str, contents: &[u8]) -> std::path::PathBuf {
        let path = dir.path().join(name);
        let mut file = fs::File::create(&path).unwrap();
        file.write_all(contents).unwrap();
        path
    }

    #[test]
    fn test_extractor_routing() {
        assert_eq!(Extractor::for_path(Path::new("a.PDF")), Extractor::Pdf);
        assert_eq!(Extractor::for_path(Path::new("a.xls")), Extractor::Excel);
        assert_eq!(Extractor::for_path(Path::new("a.htm")), Extractor::Html);
        assert_eq!(Extractor::for_path(Path::new("scan.tiff")), Extractor::Image);
        assert_eq!(Extractor::for_path(Path::new("notes.md")), Extractor::Text);
        assert_eq!(Extractor::for_path(Path::new("Makefile")), Extractor::Text);
        assert_eq!(Extractor::for_path(Path::new("data.json")), Extractor::Text);
    }

    #[test]
    fn test_extractor_names() {
        assert_eq!(Extractor::Text.name(), "extract_text_from_txt");
        assert_eq!(Extractor::Csv.name(), "extract_text_from_csv");
        assert_eq!(Extractor::Html.name(), "extract_text_from_html");
        assert_eq!(Extractor::Excel.name(), "extract_text_from_excel");
        assert_eq!(Extractor::Image.name(), "extract_text_from_image");
    }

    #[test]
    fn test_text_extraction_drops_invalid_bytes() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "notes.txt", b"caf\xc3\xa9 \xff ok");
        let (text, extractor) = extract_text(&path);
        assert_eq!(extractor, Extractor::Text);
        assert_eq!(text, "café  ok");
    }

    #[test]
    fn test_csv_extraction_renders_rows() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "scores.csv", b"player,runs\nKohli,82\nRoot,7\n");
        let (text, extractor) = extract_text(&path);
        assert_eq!(extractor, Extractor::Csv);

        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines, vec!["player  runs", " Kohli    82", "  Root     7"]);
    }

    #[test]
    fn test_html_extraction_skips_scripts_and_decodes_entities() {
        let html = r#"<html><head><title>Menu</title><style>p { color: red }</style></head>
            <body><!-- hidden --><h1>Fish &amp; Chips</h1>
            <script type="text/javascript">var x = "<p>no</p>";</script>
            <p>Price: &lt;10&#36; &#x2014; tasty</p></body></html>"#;
        assert_eq!(html_to_text(html), "Menu\nFish & Chips\nPrice: <10$ \u{2014} tasty");
    }

    #[test]
    fn test_unknown_entities_are_kept() {
        assert_eq!(decode_entities("R&D &bogus; &"), "R&D &bogus; &");
    }

    #[test]
    fn test_unsupported_formats_yield_empty_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_file(&dir, "report.pdf", b"%PDF-1.7 binary");
        let (text, extractor) = extract_text(&path);
        assert_eq!(text, "");
        assert_eq!(extractor.name(), "extract_text_from_pdf");
        assert!(!extractor.is_supported());
    }

    #[test]
    fn test_missing_file_yields_empty_text() {
        let (text, extractor) = extract_text(Path::new("/definitely/not/here.txt"));
        assert_eq!(text, "");
        assert_eq!(extractor, Extractor::Text);
    }

    #[test]
    fn test_guess_mime_type() {
        assert_eq!(guess_mime_type(Path::new("a.csv")), "text/csv");
        assert_eq!(guess_mime_type(Path::new("a.JPG")), "image/jpeg");
        assert_eq!(guess_mime_type(Path::new("a.bin")), "");
    }
}
