//! Generates worksheet XML from a [`Worksheet`].
//!
//! Text is written as inline strings (`t="inlineStr"`), so the package needs
//! no shared string table.

use quick_xml::escape::escape;

use super::styles::{style_index, DXF_FREE, DXF_TAKEN};
use super::Worksheet;
use crate::cell_ref::{cell_ref, col_to_letter, range_ref};
use crate::error::Result;

/// Write a complete worksheet XML string.
///
/// # Errors
/// Returns [`BookgridError::ColumnOutOfRange`](crate::error::BookgridError::ColumnOutOfRange)
/// when a cell lies past column `Z`.
pub(crate) fn write_sheet_xml(sheet: &Worksheet) -> Result<String> {
    let mut out = String::with_capacity(4096);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    );
    out.push_str(
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );
    out.push('\n');

    // <dimension>
    if let Some((max_row, max_col)) = sheet.extent() {
        out.push_str(&format!(
            "<dimension ref=\"A1:{}{}\"/>\n",
            col_to_letter(max_col)?,
            max_row + 1
        ));
    }

    // <cols>
    if !sheet.col_widths.is_empty() {
        out.push_str("<cols>\n");
        for (&col, &width) in &sheet.col_widths {
            let col1 = col + 1; // XLSX is 1-based
            out.push_str(&format!(
                "<col min=\"{col1}\" max=\"{col1}\" width=\"{width:.2}\" customWidth=\"1\"/>\n"
            ));
        }
        out.push_str("</cols>\n");
    }

    // <sheetData>
    out.push_str("<sheetData>\n");
    write_sheet_data(&mut out, sheet)?;
    out.push_str("</sheetData>\n");

    // <mergeCells>
    if !sheet.merges.is_empty() {
        out.push_str(&format!("<mergeCells count=\"{}\">\n", sheet.merges.len()));
        for merge in &sheet.merges {
            out.push_str(&format!("<mergeCell ref=\"{}\"/>\n", range_ref(merge)?));
        }
        out.push_str("</mergeCells>\n");
    }

    // <conditionalFormatting>
    let mut priority = 1;
    for rule in &sheet.conditional {
        let sqref = range_ref(&rule.range)?;
        let anchor = cell_ref(rule.range.first_row, rule.range.first_col)?;
        let needle = escape(rule.needle.as_str());
        // Excel's own formulas for containsText rules; the needle is doubled-quoted
        let doubled = rule.needle.replace('"', "\"\"");
        let formula_needle = escape(doubled.as_str());
        out.push_str(&format!("<conditionalFormatting sqref=\"{sqref}\">"));
        out.push_str(&format!(
            "<cfRule type=\"containsText\" dxfId=\"{DXF_FREE}\" priority=\"{priority}\" operator=\"containsText\" text=\"{needle}\"><formula>NOT(ISERROR(SEARCH(&quot;{formula_needle}&quot;,{anchor})))</formula></cfRule>",
        ));
        out.push_str(&format!(
            "<cfRule type=\"notContainsText\" dxfId=\"{DXF_TAKEN}\" priority=\"{}\" operator=\"notContains\" text=\"{needle}\"><formula>ISERROR(SEARCH(&quot;{formula_needle}&quot;,{anchor}))</formula></cfRule>",
            priority + 1
        ));
        out.push_str("</conditionalFormatting>\n");
        priority += 2;
    }

    out.push_str("</worksheet>");
    Ok(out)
}

/// Write all cell rows into `<sheetData>`.
fn write_sheet_data(out: &mut String, sheet: &Worksheet) -> Result<()> {
    let mut current_row: Option<u32> = None;

    for (&(row, col), cell) in &sheet.cells {
        if current_row != Some(row) {
            if current_row.is_some() {
                out.push_str("</row>\n");
            }
            out.push_str(&format!("<row r=\"{}\">", row + 1));
            current_row = Some(row);
        }

        out.push_str(&format!(
            "<c r=\"{}\" s=\"{}\"",
            cell_ref(row, col)?,
            style_index(cell.style)
        ));
        match &cell.text {
            Some(text) => {
                out.push_str(" t=\"inlineStr\"><is><t>");
                out.push_str(&escape(text.as_str()));
                out.push_str("</t></is></c>");
            }
            None => out.push_str("/>"),
        }
    }

    if current_row.is_some() {
        out.push_str("</row>\n");
    }
    Ok(())
}
