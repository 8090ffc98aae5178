//! HTML page sent to the external renderer

use crate::layout::{Margins, PageMargins};
use super::document::{ContentType, DocumentRecord};

/// Shared text style for the report body
const BODY_STYLE: &str = "font-family: Arial, sans-serif; font-size:14px; line-height:1.6;";

/// Escape text for inclusion in HTML element content or attribute values
pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn margin_rules(margins: &Margins) -> String {
    format!(
        "margin-top: {}mm; margin-bottom: {}mm; margin-left: {}mm; margin-right: {}mm;",
        margins.top.mm(),
        margins.bottom.mm(),
        margins.left.mm(),
        margins.right.mm()
    )
}

/// Build the full HTML document for a record.
///
/// Plain text is escaped and keeps its line breaks; HTML bodies are inserted
/// as-is. The header carries the document number and creation time so a
/// regenerated PDF is identical to the first one.
pub fn wrap_content(record: &DocumentRecord, margins: &PageMargins) -> String {
    let title = escape_html(&record.title);

    let (title_html, content_html) = match record.content_type {
        ContentType::PlainText => (
            format!("<div class='pdf-title' style='text-align:center;'>{}</div>", title),
            format!(
                "<div style='{} white-space: pre-wrap; word-wrap: break-word;'>{}</div>",
                BODY_STYLE,
                escape_html(&record.content)
            ),
        ),
        ContentType::Html => (
            format!("<div class='pdf-title'>{}</div>", title),
            format!("<div style='{}'>{}</div>", BODY_STYLE, record.content),
        ),
    };

    format!(
        r#"<!DOCTYPE html>
<html>
<head>
    <meta charset='utf-8'>
    <title>{title}</title>
    <style>
        body {{
            font-family: Arial, sans-serif;
            line-height: 1.6;
            color: #333;
            margin: 0;
            padding: 0;
        }}

        main {{
            margin: 0;
            padding: 0;
        }}

        @page:first {{
            {first_margins}
        }}

        @page {{
            {other_margins}
        }}

        .pdf-header {{
            font-size: 12px;
            color: gray;
            margin-bottom: 10px;
            text-align: right;
        }}

        .pdf-title {{
            font-size: 18px;
            font-weight: bold;
            margin-bottom: 10px;
        }}
    </style>
</head>
<body>
    <main>
        <div class='pdf-header'>
            <div>Belge Numarası: {id}</div>
            <div>Oluşturulma Tarihi: {created}</div>
        </div>
        {title_html}
        {content_html}
    </main>
</body>
</html>"#,
        title = title,
        first_margins = margin_rules(&margins.first),
        other_margins = margin_rules(&margins.other),
        id = record.id.hyphenated(),
        created = record.created_at.format("%Y-%m-%d %H:%M:%S"),
        title_html = title_html,
        content_html = content_html,
    )
}
