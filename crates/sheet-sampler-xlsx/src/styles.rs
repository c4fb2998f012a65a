//! Style table handling
//!
//! Only number formats matter here: a numeric cell whose `cellXfs` entry
//! points at a date/time format is read as a date.

use std::io::{BufReader, Read};

use ahash::AHashMap;
use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use crate::error::{XlsxError, XlsxResult};
use sheet_sampler_core::NumberFormat;

/// Index of the date/time cell format in [`STYLES_XML`]
pub(crate) const DATETIME_XF: u32 = 1;

/// Minimal stylesheet written with every workbook
///
/// `cellXfs` holds the default format at index 0 and a date/time format
/// (built-in 22) at [`DATETIME_XF`].
pub(crate) const STYLES_XML: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <fonts count="1">
    <font><sz val="11"/><name val="Calibri"/><family val="2"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1">
    <border><left/><right/><top/><bottom/><diagonal/></border>
  </borders>
  <cellStyleXfs count="1">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0"/>
  </cellStyleXfs>
  <cellXfs count="2">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="22" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
  </cellXfs>
  <cellStyles count="1">
    <cellStyle name="Normal" xfId="0" builtinId="0"/>
  </cellStyles>
</styleSheet>"#;

/// Read `xl/styles.xml` into the number format of each `cellXfs` entry
///
/// The returned vector is indexed by the `s` attribute of worksheet cells.
pub(crate) fn read_cell_formats<R: Read>(reader: R) -> XlsxResult<Vec<NumberFormat>> {
    let mut xml_reader = Reader::from_reader(BufReader::new(reader));
    xml_reader.trim_text(true);

    let mut buf = Vec::new();

    let mut numfmts: AHashMap<u32, String> = AHashMap::new();
    let mut xf_format_ids: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;

    loop {
        match xml_reader.read_event_into(&mut buf) {
            Ok(Event::Start(e)) | Ok(Event::Empty(e)) => match e.name().as_ref() {
                b"numFmt" => {
                    if let Some((id, code)) = parse_num_fmt(&e) {
                        numfmts.insert(id, code);
                    }
                }
                b"cellXfs" => {
                    in_cell_xfs = true;
                }
                b"xf" if in_cell_xfs => {
                    xf_format_ids.push(attr_u32(&e, b"numFmtId").unwrap_or(0));
                }
                _ => {}
            },
            Ok(Event::End(e)) if e.name().as_ref() == b"cellXfs" => {
                in_cell_xfs = false;
            }
            Ok(Event::Eof) => break,
            Err(e) => return Err(XlsxError::Xml(e)),
            _ => {}
        }

        buf.clear();
    }

    Ok(xf_format_ids
        .into_iter()
        .map(|id| NumberFormat::resolve(id, numfmts.get(&id).map(String::as_str)))
        .collect())
}

fn parse_num_fmt(e: &BytesStart<'_>) -> Option<(u32, String)> {
    let mut id = None;
    let mut code = None;
    for attr in e.attributes().flatten() {
        match attr.key.as_ref() {
            b"numFmtId" => id = attr.unescape_value().ok().and_then(|s| s.parse().ok()),
            b"formatCode" => code = attr.unescape_value().ok().map(|s| s.to_string()),
            _ => {}
        }
    }
    Some((id?, code?))
}

fn attr_u32(e: &BytesStart<'_>, key: &[u8]) -> Option<u32> {
    e.attributes()
        .flatten()
        .find(|attr| attr.key.as_ref() == key)
        .and_then(|attr| attr.unescape_value().ok().and_then(|s| s.parse().ok()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_read_cell_formats() {
        let xml = r#"<?xml version="1.0"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="2">
    <numFmt numFmtId="164" formatCode="yyyy\-mm\-dd"/>
    <numFmt numFmtId="165" formatCode="0.000"/>
  </numFmts>
  <cellStyleXfs count="1"><xf numFmtId="14"/></cellStyleXfs>
  <cellXfs count="5">
    <xf numFmtId="0" fontId="0"/>
    <xf numFmtId="164" applyNumberFormat="1"/>
    <xf numFmtId="165"/>
    <xf numFmtId="14"><alignment horizontal="left"/></xf>
    <xf fontId="1"/>
  </cellXfs>
</styleSheet>"#;

        let formats = read_cell_formats(xml.as_bytes()).unwrap();
        assert_eq!(
            formats,
            vec![
                NumberFormat::General,
                NumberFormat::Custom("yyyy\\-mm\\-dd".into()),
                NumberFormat::Custom("0.000".into()),
                NumberFormat::BuiltIn(14),
                NumberFormat::General,
            ]
        );
        assert!(formats[1].is_date_format());
        assert!(!formats[2].is_date_format());
        assert!(formats[3].is_date_format());
    }

    #[test]
    fn test_written_stylesheet_has_date_xf() {
        let formats = read_cell_formats(STYLES_XML.as_bytes()).unwrap();
        assert_eq!(formats.len(), 2);
        assert_eq!(
            formats[DATETIME_XF as usize],
            NumberFormat::BuiltIn(NumberFormat::ID_DATETIME)
        );
        assert!(formats[DATETIME_XF as usize].is_date_format());
    }
}
