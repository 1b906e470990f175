//! In-memory Office package builders shared by the integration tests.

#![allow(dead_code)]

use std::io::{Cursor, Write};

use zip::write::SimpleFileOptions;
use zip::ZipWriter;

const W_NS: &str = "http://schemas.openxmlformats.org/wordprocessingml/2006/main";
const R_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const A_NS: &str = "http://schemas.openxmlformats.org/drawingml/2006/main";
const P_NS: &str = "http://schemas.openxmlformats.org/presentationml/2006/main";
const S_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const PKG_RELS_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

/// Write `parts` into a zip archive.
pub fn zip_package(parts: &[(String, String)]) -> Vec<u8> {
    let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
    for (name, body) in parts {
        writer
            .start_file(name.as_str(), SimpleFileOptions::default())
            .unwrap();
        writer.write_all(body.as_bytes()).unwrap();
    }
    writer.finish().unwrap().into_inner()
}

pub fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn relationships(targets: &[(String, String)]) -> String {
    let mut xml = format!(r#"<?xml version="1.0" encoding="UTF-8"?><Relationships xmlns="{}">"#, PKG_RELS_NS);
    for (id, target) in targets {
        xml.push_str(&format!(
            r#"<Relationship Id="{}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/x" Target="{}"/>"#,
            id, target
        ));
    }
    xml.push_str("</Relationships>");
    xml
}

/// A body-level block of a Word document.
pub enum DocBlock<'a> {
    /// Paragraph with an optional style id
    Paragraph(Option<&'a str>, &'a str),
    /// Table rows of cell texts
    Table(Vec<Vec<&'a str>>),
}

fn doc_paragraph(style: Option<&str>, text: &str) -> String {
    let properties = style
        .map(|id| format!(r#"<w:pPr><w:pStyle w:val="{}"/></w:pPr>"#, id))
        .unwrap_or_default();
    if text.is_empty() {
        return format!("<w:p>{}</w:p>", properties);
    }
    format!(
        r#"<w:p>{}<w:r><w:t xml:space="preserve">{}</w:t></w:r></w:p>"#,
        properties,
        escape(text)
    )
}

/// Build a DOCX with heading styles `Heading1`/`Heading2` defined.
pub fn docx(blocks: &[DocBlock<'_>]) -> Vec<u8> {
    let mut body = String::new();
    for block in blocks {
        match block {
            DocBlock::Paragraph(style, text) => body.push_str(&doc_paragraph(*style, text)),
            DocBlock::Table(rows) => {
                body.push_str("<w:tbl><w:tblPr/>");
                for row in rows {
                    body.push_str("<w:tr>");
                    for cell in row {
                        body.push_str(&format!("<w:tc>{}</w:tc>", doc_paragraph(None, cell)));
                    }
                    body.push_str("</w:tr>");
                }
                body.push_str("</w:tbl>");
            }
        }
    }

    let document = format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document xmlns:w="{}" xmlns:r="{}"><w:body>{}<w:sectPr/></w:body></w:document>"#,
        W_NS, R_NS, body
    );
    let styles = format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><w:styles xmlns:w="{}">
<w:style w:type="paragraph" w:default="1" w:styleId="Normal"><w:name w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading1"><w:name w:val="heading 1"/><w:basedOn w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Heading2"><w:name w:val="heading 2"/><w:basedOn w:val="Normal"/></w:style>
<w:style w:type="paragraph" w:styleId="Quote"><w:name w:val="Quote"/></w:style>
</w:styles>"#,
        W_NS
    );

    zip_package(&[
        ("[Content_Types].xml".into(), content_types("word/document.xml", "application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml")),
        ("_rels/.rels".into(), relationships(&[("rId1".into(), "word/document.xml".into())])),
        ("word/document.xml".into(), document),
        ("word/styles.xml".into(), styles),
    ])
}

fn content_types(main_part: &str, main_type: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/{}" ContentType="{}"/></Types>"#,
        main_part, main_type
    )
}

/// Build an XLSX; cells that parse as numbers are stored as numbers.
/// A `date:` prefix stores the serial number with the built-in short
/// date format (numFmtId 14).
pub fn xlsx(sheets: &[(&str, Vec<Vec<&str>>)]) -> Vec<u8> {
    let mut sheet_entries = String::new();
    let mut rels = Vec::new();
    let mut parts = Vec::new();

    for (index, (name, rows)) in sheets.iter().enumerate() {
        let n = index + 1;
        sheet_entries.push_str(&format!(
            r#"<sheet name="{}" sheetId="{}" r:id="rId{}"/>"#,
            escape(name),
            n,
            n
        ));
        rels.push((format!("rId{}", n), format!("worksheets/sheet{}.xml", n)));

        let mut data = String::new();
        for (r, row) in rows.iter().enumerate() {
            data.push_str(&format!(r#"<row r="{}">"#, r + 1));
            for (c, value) in row.iter().enumerate() {
                let reference = format!("{}{}", (b'A' + c as u8) as char, r + 1);
                if let Some(serial) = value.strip_prefix("date:") {
                    data.push_str(&format!(r#"<c r="{}" s="1"><v>{}</v></c>"#, reference, serial));
                } else if value.parse::<f64>().is_ok() {
                    data.push_str(&format!(r#"<c r="{}"><v>{}</v></c>"#, reference, value));
                } else {
                    data.push_str(&format!(
                        r#"<c r="{}" t="inlineStr"><is><t>{}</t></is></c>"#,
                        reference,
                        escape(value)
                    ));
                }
            }
            data.push_str("</row>");
        }
        parts.push((
            format!("xl/worksheets/sheet{}.xml", n),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><worksheet xmlns="{}" xmlns:r="{}"><sheetData>{}</sheetData></worksheet>"#,
                S_NS, R_NS, data
            ),
        ));
    }

    parts.push((
        "xl/workbook.xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><workbook xmlns="{}" xmlns:r="{}"><sheets>{}</sheets></workbook>"#,
            S_NS, R_NS, sheet_entries
        ),
    ));
    parts.push((
        "xl/styles.xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><styleSheet xmlns="{}"><cellXfs count="2"><xf numFmtId="0"/><xf numFmtId="14" applyNumberFormat="1"/></cellXfs></styleSheet>"#,
            S_NS
        ),
    ));
    parts.push(("xl/_rels/workbook.xml.rels".into(), relationships(&rels)));
    parts.push(("_rels/.rels".into(), relationships(&[("rId1".into(), "xl/workbook.xml".into())])));
    parts.push((
        "[Content_Types].xml".into(),
        content_types("xl/workbook.xml", "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet.main+xml"),
    ));
    zip_package(&parts)
}

/// Build a PPTX; each slide lists the text of its shapes. A picture is
/// placed between the first and second shape of every slide.
pub fn pptx(slides: &[Vec<&str>]) -> Vec<u8> {
    let mut ids = String::new();
    let mut rels = Vec::new();
    let mut parts = Vec::new();

    for (index, shapes) in slides.iter().enumerate() {
        let n = index + 1;
        // Part names run opposite to deck order.
        let part_no = slides.len() - index;
        let rel_id = format!("rId{}", n + 1);
        ids.push_str(&format!(r#"<p:sldId id="{}" r:id="{}"/>"#, 255 + n, rel_id));
        rels.push((rel_id, format!("slides/slide{}.xml", part_no)));

        let mut tree = String::from("<p:nvGrpSpPr/><p:grpSpPr/>");
        for (i, text) in shapes.iter().enumerate() {
            if i == 1 {
                tree.push_str("<p:pic><p:nvPicPr/><p:blipFill/><p:spPr/></p:pic>");
            }
            let paragraphs: String = text
                .split('\n')
                .map(|line| format!("<a:p><a:r><a:t>{}</a:t></a:r></a:p>", escape(line)))
                .collect();
            tree.push_str(&format!(
                "<p:sp><p:nvSpPr/><p:spPr/><p:txBody><a:bodyPr/>{}</p:txBody></p:sp>",
                paragraphs
            ));
        }
        parts.push((
            format!("ppt/slides/slide{}.xml", part_no),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8"?><p:sld xmlns:a="{}" xmlns:p="{}" xmlns:r="{}"><p:cSld><p:spTree>{}</p:spTree></p:cSld></p:sld>"#,
                A_NS, P_NS, R_NS, tree
            ),
        ));
    }

    parts.push((
        "ppt/presentation.xml".into(),
        format!(
            r#"<?xml version="1.0" encoding="UTF-8"?><p:presentation xmlns:a="{}" xmlns:p="{}" xmlns:r="{}"><p:sldIdLst>{}</p:sldIdLst></p:presentation>"#,
            A_NS, P_NS, R_NS, ids
        ),
    ));
    parts.push(("ppt/_rels/presentation.xml.rels".into(), relationships(&rels)));
    parts.push(("_rels/.rels".into(), relationships(&[("rId1".into(), "ppt/presentation.xml".into())])));
    parts.push((
        "[Content_Types].xml".into(),
        content_types("ppt/presentation.xml", "application/vnd.openxmlformats-officedocument.presentationml.presentation.main+xml"),
    ));
    zip_package(&parts)
}

/// Text shown on each page of a PDF, one entry per `Tj` operator.
pub fn page_texts(pdf: &[u8]) -> Vec<Vec<String>> {
    let doc = lopdf::Document::load_mem(pdf).unwrap();
    doc.get_pages()
        .values()
        .map(|page_id| {
            let content = doc.get_page_content(*page_id).unwrap();
            lopdf::content::Content::decode(&content)
                .unwrap()
                .operations
                .iter()
                .filter(|op| op.operator == "Tj")
                .map(|op| {
                    let bytes = op.operands[0].as_str().unwrap();
                    let (text, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
                    text.into_owned()
                })
                .collect()
        })
        .collect()
}
