//! Word-processor (DOCX) export.
//!
//! A minimal WordprocessingML package: a "Title" styled heading followed by
//! one paragraph per blank-line-delimited block of the story. Line breaks
//! inside a block become `<w:br/>`. Zip entries carry the fixed 1980-01-01
//! timestamp so the archive is reproducible.

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

use super::ExportError;
use crate::story::PARAGRAPH_SEPARATOR;

const CONTENT_TYPES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/><Override PartName="/word/styles.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.styles+xml"/></Types>"#;

const ROOT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#;

const DOCUMENT_RELS: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/styles" Target="styles.xml"/></Relationships>"#;

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:styles xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/><w:rPr><w:sz w:val="24"/></w:rPr></w:style><w:style w:type="paragraph" w:styleId="Title"><w:name w:val="Title"/><w:basedOn w:val="Normal"/><w:next w:val="Normal"/><w:pPr><w:spacing w:after="300"/></w:pPr><w:rPr><w:b/><w:sz w:val="52"/></w:rPr></w:style></w:styles>"#;

/// Render a story as DOCX bytes.
pub fn export_docx(title: &str, body: &str) -> Result<Vec<u8>, ExportError> {
    let document = document_xml(title, body);

    let mut archive = Vec::new();
    {
        let mut zip = ZipWriter::new(Cursor::new(&mut archive));
        let options = SimpleFileOptions::default()
            .last_modified_time(zip::DateTime::default())
            .compression_method(zip::CompressionMethod::Deflated);

        let parts: [(&str, &str); 5] = [
            ("[Content_Types].xml", CONTENT_TYPES),
            ("_rels/.rels", ROOT_RELS),
            ("word/_rels/document.xml.rels", DOCUMENT_RELS),
            ("word/document.xml", &document),
            ("word/styles.xml", STYLES),
        ];

        for (name, content) in parts {
            zip.start_file(name, options)?;
            zip.write_all(content.as_bytes())?;
        }

        zip.finish()?;
    }

    Ok(archive)
}

fn document_xml(title: &str, body: &str) -> String {
    let mut xml = String::from(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<w:document xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main"><w:body>"#,
    );

    xml.push_str(r#"<w:p><w:pPr><w:pStyle w:val="Title"/></w:pPr>"#);
    push_runs(&mut xml, title);
    xml.push_str("</w:p>");

    for block in body.split(PARAGRAPH_SEPARATOR) {
        xml.push_str("<w:p>");
        push_runs(&mut xml, block);
        xml.push_str("</w:p>");
    }

    xml.push_str("</w:body></w:document>");
    xml
}

/// One run per line, joined by line breaks.
fn push_runs(xml: &mut String, text: &str) {
    if text.is_empty() {
        return;
    }
    xml.push_str("<w:r>");
    for (i, line) in text.split('\n').enumerate() {
        if i > 0 {
            xml.push_str("<w:br/>");
        }
        xml.push_str(r#"<w:t xml:space="preserve">"#);
        xml.push_str(&escape_xml(line.trim_end_matches('\r')));
        xml.push_str("</w:t>");
    }
    xml.push_str("</w:r>");
}

/// Escape markup characters and drop characters XML 1.0 cannot carry.
fn escape_xml(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            '\t' => out.push(c),
            c if c.is_control() => {}
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;

    fn read_part(docx: &[u8], name: &str) -> String {
        let mut archive = zip::ZipArchive::new(Cursor::new(docx)).unwrap();
        let mut file = archive.by_name(name).unwrap();
        let mut content = String::new();
        file.read_to_string(&mut content).unwrap();
        content
    }

    #[test]
    fn test_package_parts() {
        let docx = export_docx("Title", "Body").unwrap();
        let archive = zip::ZipArchive::new(Cursor::new(&docx)).unwrap();
        let names: Vec<&str> = archive.file_names().collect();
        for part in [
            "[Content_Types].xml",
            "_rels/.rels",
            "word/document.xml",
            "word/styles.xml",
            "word/_rels/document.xml.rels",
        ] {
            assert!(names.contains(&part), "missing {part}");
        }
    }

    #[test]
    fn test_one_paragraph_per_block() {
        let docx = export_docx("The Dim Café", "Steam curls.\n\nElena sat.\n\nThe end.").unwrap();
        let document = read_part(&docx, "word/document.xml");

        assert_eq!(document.matches("<w:p>").count(), 4);
        assert!(document.contains(r#"<w:pStyle w:val="Title"/>"#));
        assert!(document.contains("The Dim Café"));
        assert!(document.contains("Elena sat."));
    }

    #[test]
    fn test_single_newlines_become_breaks() {
        let document = document_xml("T", "line one\nline two");
        assert!(document.contains("line one</w:t><w:br/><w:t xml:space=\"preserve\">line two"));
    }

    #[test]
    fn test_markup_is_escaped() {
        let document = document_xml("<Tom & Jerry>", "\"quoted\" \u{1}text");
        assert!(document.contains("&lt;Tom &amp; Jerry&gt;"));
        assert!(document.contains("&quot;quoted&quot; text"));
    }

    #[test]
    fn test_export_is_deterministic() {
        let a = export_docx("Same", "One.\n\nTwo.").unwrap();
        let b = export_docx("Same", "One.\n\nTwo.").unwrap();
        assert_eq!(a, b);
    }
}
