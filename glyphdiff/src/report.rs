// Copyright 2025 the Glyphdiff Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! HTML review document.

use core::fmt;
use std::borrow::Cow;
use std::fs;
use std::path::Path;

use crate::error::ReportError;
use crate::rank::Ranking;

const HEAD: &str = "<!DOCTYPE html>
<html>
<head>
<meta charset=\"utf-8\">
<style>
img { image-rendering: pixelated; image-rendering: crisp-edges; min-width: 10%; }
table, th, td { border: 1px solid black; border-collapse: collapse; }
td.missing { color: gray; }
</style>
</head>
<body>
";

/// Render the review document for `ranking`.
///
/// One row per record with a non-zero difference, in ranked order, each with its
/// zero-based rank, glyph id, difference, and the base and test images side by
/// side. Records with no difference are left out of the document only; the
/// ranking itself is not touched.
pub fn emit(ranking: &Ranking, font_label: &str) -> String {
    Document {
        ranking,
        font_label,
    }
    .to_string()
}

struct Document<'a> {
    ranking: &'a Ranking,
    font_label: &'a str,
}

impl fmt::Display for Document<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(HEAD)?;
        writeln!(f, "<p>{}</p>", escape_html(self.font_label))?;
        writeln!(
            f,
            "<p>{} divergent glyph(s)</p>",
            self.ranking.divergent().count()
        )?;
        f.write_str("<table style=\"width:100%\">\n")?;
        f.write_str(
            "<tr><th>Rank</th><th>Glyph</th><th>Difference</th><th>Base glyph | Test glyph</th></tr>\n",
        )?;
        for (rank, record) in self.ranking.divergent().enumerate() {
            writeln!(
                f,
                "<tr><td>{rank}</td><td>{}</td><td>{:.2}</td><td>{} {}</td></tr>",
                record.glyph_id,
                record.difference,
                image_cell(record.base_image.as_deref()),
                image_cell(record.test_image.as_deref()),
            )?;
        }
        f.write_str("</table>\n</body>\n</html>\n")
    }
}

/// Render the review document and write it to `path`, replacing any old one.
///
/// Returns the number of rows written.
pub fn write_report(
    path: &Path,
    ranking: &Ranking,
    font_label: &str,
) -> Result<usize, ReportError> {
    let doc = emit(ranking, font_label);
    fs::write(path, doc).map_err(|source| ReportError {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(ranking.divergent().count())
}

fn image_cell(path: Option<&Path>) -> String {
    match path {
        Some(path) => {
            let src = path
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            format!("<img src=\"{}\">", escape_html(&src))
        }
        None => String::from("<span class=\"missing\">(empty)</span>"),
    }
}

fn escape_html(text: &str) -> Cow<'_, str> {
    if !text.contains(['&', '<', '>', '"', '\'']) {
        return Cow::Borrowed(text);
    }
    let mut out = String::with_capacity(text.len() + 8);
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    Cow::Owned(out)
}
