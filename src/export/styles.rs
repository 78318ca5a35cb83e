//! Generates `xl/styles.xml` for the booking workbook.
//!
//! The style table is fixed: one cell format per [`CellStyle`] plus two
//! differential formats used by the conditional coloring rules.

use crate::layout::CellStyle;

/// Differential format applied to cells containing "Free".
pub(crate) const DXF_FREE: u32 = 0;
/// Differential format applied to all other cells of a rule range.
pub(crate) const DXF_TAKEN: u32 = 1;

const FILL_RED: &str = "FFFF0000";
const FILL_GREEN: &str = "FF00FF00";

struct FontSpec {
    bold: bool,
    size: u32,
}

struct XfSpec {
    font_id: u32,
    fill_id: u32,
    border_id: u32,
    horizontal: Option<&'static str>,
    vertical: Option<&'static str>,
}

// fonts: 0 regular, 1 bold, 2 bold 14pt
const FONTS: [FontSpec; 3] = [
    FontSpec {
        bold: false,
        size: 11,
    },
    FontSpec {
        bold: true,
        size: 11,
    },
    FontSpec {
        bold: true,
        size: 14,
    },
];

// fills: 0 none, 1 gray125 (both reserved by Excel), 2 red, 3 green
const FILLS: [Option<&str>; 4] = [None, None, Some(FILL_RED), Some(FILL_GREEN)];

/// Index of the `cellXfs` entry for `style`.
pub(crate) fn style_index(style: CellStyle) -> u32 {
    match style {
        CellStyle::Plain => 0,
        CellStyle::Title => 1,
        CellStyle::RoomType => 2,
        CellStyle::RoomId => 3,
        CellStyle::Names => 4,
        CellStyle::Taken => 5,
        CellStyle::Free => 6,
    }
}

fn xf_table() -> [XfSpec; 7] {
    let centered = |font_id, border_id| XfSpec {
        font_id,
        fill_id: 0,
        border_id,
        horizontal: Some("center"),
        vertical: Some("center"),
    };
    let left = |fill_id| XfSpec {
        font_id: 0,
        fill_id,
        border_id: 0,
        horizontal: Some("left"),
        vertical: Some("center"),
    };
    [
        XfSpec {
            font_id: 0,
            fill_id: 0,
            border_id: 0,
            horizontal: None,
            vertical: None,
        },
        centered(2, 1),
        centered(1, 1),
        centered(0, 0),
        left(0),
        left(2),
        left(3),
    ]
}

fn solid_fill(rgb: &str) -> String {
    format!(
        r#"<fill><patternFill patternType="solid"><fgColor rgb="{rgb}"/><bgColor rgb="{rgb}"/></patternFill></fill>"#
    )
}

/// Write the complete styles part.
pub(crate) fn write_styles_xml() -> String {
    let mut xml = String::with_capacity(2048);
    xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    xml.push_str(r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">"#);

    // Fonts
    xml.push_str(&format!(r#"<fonts count="{}">"#, FONTS.len()));
    for font in &FONTS {
        xml.push_str("<font>");
        if font.bold {
            xml.push_str("<b/>");
        }
        xml.push_str(&format!(r#"<sz val="{}"/>"#, font.size));
        xml.push_str(r#"<name val="Calibri"/><family val="2"/>"#);
        xml.push_str("</font>");
    }
    xml.push_str("</fonts>");

    // Fills
    xml.push_str(&format!(r#"<fills count="{}">"#, FILLS.len()));
    xml.push_str(r#"<fill><patternFill patternType="none"/></fill>"#);
    xml.push_str(r#"<fill><patternFill patternType="gray125"/></fill>"#);
    for rgb in FILLS.iter().flatten() {
        xml.push_str(&solid_fill(rgb));
    }
    xml.push_str("</fills>");

    // Borders: 0 none, 1 thin all round
    xml.push_str(r#"<borders count="2">"#);
    xml.push_str("<border><left/><right/><top/><bottom/><diagonal/></border>");
    xml.push_str(
        r#"<border><left style="thin"><color auto="1"/></left><right style="thin"><color auto="1"/></right><top style="thin"><color auto="1"/></top><bottom style="thin"><color auto="1"/></bottom><diagonal/></border>"#,
    );
    xml.push_str("</borders>");

    xml.push_str(r#"<cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>"#);

    // Cell formats, indexed by style_index()
    let xfs = xf_table();
    xml.push_str(&format!(r#"<cellXfs count="{}">"#, xfs.len()));
    for xf in &xfs {
        let mut attrs = format!(
            r#"numFmtId="0" fontId="{}" fillId="{}" borderId="{}" xfId="0""#,
            xf.font_id, xf.fill_id, xf.border_id
        );
        if xf.font_id > 0 {
            attrs.push_str(r#" applyFont="1""#);
        }
        if xf.fill_id > 0 {
            attrs.push_str(r#" applyFill="1""#);
        }
        if xf.border_id > 0 {
            attrs.push_str(r#" applyBorder="1""#);
        }
        if xf.horizontal.is_none() && xf.vertical.is_none() {
            xml.push_str(&format!("<xf {attrs}/>"));
            continue;
        }
        xml.push_str(&format!(r#"<xf {attrs} applyAlignment="1"><alignment"#));
        if let Some(h) = xf.horizontal {
            xml.push_str(&format!(r#" horizontal="{h}""#));
        }
        if let Some(v) = xf.vertical {
            xml.push_str(&format!(r#" vertical="{v}""#));
        }
        xml.push_str("/></xf>");
    }
    xml.push_str("</cellXfs>");

    xml.push_str(r#"<cellStyles count="1"><cellStyle name="Normal" xfId="0" builtinId="0"/></cellStyles>"#);

    // Differential formats for conditional rules, indexed by DXF_FREE / DXF_TAKEN
    xml.push_str(r#"<dxfs count="2">"#);
    for rgb in [FILL_GREEN, FILL_RED] {
        xml.push_str(&format!(
            r#"<dxf><fill><patternFill patternType="solid"><fgColor rgb="{rgb}"/><bgColor rgb="{rgb}"/></patternFill></fill></dxf>"#
        ));
    }
    xml.push_str("</dxfs>");

    xml.push_str("</styleSheet>");
    xml
}
