//! Setter operations over a live XML buffer: each takes a typed sub-record and
//! either replaces the matching subtree in place or appends a fresh one when
//! absent. Unlike `xml_import`/`xml_export`, which round-trip a whole
//! `MetadataModel`, these edit one section of an already-serialized document —
//! the shape the facade's `bagUpdateMetadata`-style calls need when a caller
//! only has one sub-record to change and wants to keep everything else in the
//! buffer untouched.
//!
//! `roxmltree` gives read-only tree navigation, not a writer, so a subtree
//! replace is: parse, locate the element's byte range in the original text
//! (`Node::range`), and splice new serialized text over that range. Appending
//! inserts just before the document's closing root tag.

use roxmltree::Document;

use crate::error::{BagMetadataError, BagResult};

use super::xml_export::{elem, elem_opt, param};
use super::{Identification, ReferenceSystem, Spatial};

fn find_range(xml: &str, tag: &str) -> BagResult<Option<std::ops::Range<usize>>> {
    let doc = Document::parse(xml).map_err(|e| BagMetadataError::NodeNotFound(e.to_string()))?;
    Ok(doc.descendants().find(|n| n.is_element() && n.tag_name().name() == tag).map(|n| n.range()))
}

fn root_close_offset(xml: &str) -> BagResult<usize> {
    let doc = Document::parse(xml).map_err(|e| BagMetadataError::NodeNotFound(e.to_string()))?;
    Ok(doc.root_element().range().end)
}

/// Replaces the `<tag>...</tag>` subtree with `replacement` if present;
/// otherwise appends `replacement` just before the document's closing root
/// tag. `replacement` must itself be a single well-formed element.
fn replace_or_append(xml: &mut String, tag: &str, replacement: String) -> BagResult<()> {
    match find_range(xml, tag)? {
        Some(range) => {
            xml.replace_range(range, &replacement);
            Ok(())
        }
        None => {
            let at = root_close_offset(xml)?;
            xml.insert_str(at, &replacement);
            Ok(())
        }
    }
}

/// Replaces `<tag>...</tag>` in place; fails with `NodeNotFound` when the
/// caller expects a replacement context (the target section must already
/// exist) and it does not.
fn replace_or_fail(xml: &mut String, tag: &str, replacement: String) -> BagResult<()> {
    match find_range(xml, tag)? {
        Some(range) => {
            xml.replace_range(range, &replacement);
            Ok(())
        }
        None => Err(BagMetadataError::NodeNotFound(tag.to_string()).into()),
    }
}

/// Sets the `identificationInfo` subtree, appending it if the document has none yet.
pub fn set_identification(xml: &mut String, id: &Identification) -> BagResult<()> {
    let mut out = String::from("<identificationInfo>");
    elem_opt(&mut out, "title", &id.title);
    elem_opt(&mut out, "date", &id.date);
    elem_opt(&mut out, "dateType", &id.date_type);
    elem_opt(&mut out, "abstract", &id.abstract_);
    elem_opt(&mut out, "status", &id.status);
    elem_opt(&mut out, "language", &id.language);
    elem_opt(&mut out, "topicCategory", &id.topic_category);
    elem(&mut out, "westBoundLongitude", &param(id.west));
    elem(&mut out, "eastBoundLongitude", &param(id.east));
    elem(&mut out, "southBoundLatitude", &param(id.south));
    elem(&mut out, "northBoundLatitude", &param(id.north));
    out.push_str("</identificationInfo>");
    replace_or_append(xml, "identificationInfo", out)
}

/// Sets the `spatialRepresentationInfo` subtree. Requires the section already
/// exist — a BAG file's spatial block is written once at creation and is never
/// appended fresh by a mutator, so a miss here means the buffer is not a BAG
/// metadata document and the caller should be told which node it expected.
pub fn set_spatial(xml: &mut String, sp: &Spatial) -> BagResult<()> {
    use super::xml_export::resolution;
    let mut out = String::from("<spatialRepresentationInfo>");
    elem(&mut out, "rows", &sp.rows.to_string());
    elem(&mut out, "rowResolution", &resolution(sp.row_resolution));
    elem(&mut out, "columns", &sp.cols.to_string());
    elem(&mut out, "columnResolution", &resolution(sp.column_resolution));
    elem_opt(&mut out, "resolutionUnit", &sp.resolution_unit);
    elem_opt(&mut out, "cellGeometry", &sp.cell_geometry);
    elem(&mut out, "llCornerX", &param(sp.ll_corner_x));
    elem(&mut out, "llCornerY", &param(sp.ll_corner_y));
    elem(&mut out, "urCornerX", &param(sp.ur_corner_x));
    elem(&mut out, "urCornerY", &param(sp.ur_corner_y));
    out.push_str("</spatialRepresentationInfo>");
    replace_or_fail(xml, "spatialRepresentationInfo", out)
}

/// Sets the horizontal reference system fields, appending a `referenceSystemInfo`
/// wrapper if none exists yet.
pub fn set_horizontal_reference_system(xml: &mut String, rs: &ReferenceSystem) -> BagResult<()> {
    set_reference_system(xml, "horizontalReferenceSystemType", "horizontalReferenceSystemDefinition", rs)
}

/// Sets the vertical reference system fields, appending a `referenceSystemInfo`
/// wrapper if none exists yet.
pub fn set_vertical_reference_system(xml: &mut String, rs: &ReferenceSystem) -> BagResult<()> {
    set_reference_system(xml, "verticalReferenceSystemType", "verticalReferenceSystemDefinition", rs)
}

fn set_reference_system(xml: &mut String, kind_tag: &str, def_tag: &str, rs: &ReferenceSystem) -> BagResult<()> {
    let had_kind = find_range(xml, kind_tag)?.is_some();
    let had_def = find_range(xml, def_tag)?.is_some();
    if had_def {
        if let Some(def) = &rs.definition {
            let mut out = String::new();
            elem(&mut out, def_tag, def);
            replace_or_fail(xml, def_tag, out)?;
        }
    }
    if had_kind {
        if let Some(kind) = &rs.kind {
            let mut out = String::new();
            elem(&mut out, kind_tag, kind);
            replace_or_fail(xml, kind_tag, out)?;
        }
    }
    if !had_kind && !had_def {
        let mut out = String::from("<referenceSystemInfo>");
        elem_opt(&mut out, kind_tag, &rs.kind);
        elem_opt(&mut out, def_tag, &rs.definition);
        out.push_str("</referenceSystemInfo>");
        let at = root_close_offset(xml)?;
        xml.insert_str(at, &out);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> String {
        r#"<gmi:MI_Metadata xmlns:gmi="http://www.isotc211.org/2005/gmi"><fileIdentifier>a</fileIdentifier></gmi:MI_Metadata>"#.to_string()
    }

    #[test]
    fn appends_identification_when_absent() {
        let mut xml = doc();
        let id = Identification { title: Some("Survey 1".to_string()), west: -1.0, east: 1.0, south: -2.0, north: 2.0, ..Default::default() };
        set_identification(&mut xml, &id).unwrap();
        assert!(xml.contains("<identificationInfo>"));
        assert!(xml.contains("Survey 1"));
    }

    #[test]
    fn replaces_identification_in_place_on_second_call() {
        let mut xml = doc();
        let first = Identification { title: Some("First".to_string()), ..Default::default() };
        set_identification(&mut xml, &first).unwrap();
        let second = Identification { title: Some("Second".to_string()), ..Default::default() };
        set_identification(&mut xml, &second).unwrap();
        assert_eq!(xml.matches("<identificationInfo>").count(), 1);
        assert!(xml.contains("Second"));
        assert!(!xml.contains("First"));
    }

    #[test]
    fn set_spatial_fails_with_node_not_found_when_section_is_missing() {
        let mut xml = doc();
        let sp = Spatial { rows: 10, cols: 10, ..Default::default() };
        assert!(set_spatial(&mut xml, &sp).is_err());
    }

    #[test]
    fn set_horizontal_reference_system_appends_then_replaces() {
        let mut xml = doc();
        let rs = ReferenceSystem { kind: Some("WKT".to_string()), definition: Some("GEOGCS[...]".to_string()) };
        set_horizontal_reference_system(&mut xml, &rs).unwrap();
        assert!(xml.contains("GEOGCS[...]"));

        let rs2 = ReferenceSystem { kind: Some("WKT".to_string()), definition: Some("PROJCS[...]".to_string()) };
        set_horizontal_reference_system(&mut xml, &rs2).unwrap();
        assert!(xml.contains("PROJCS[...]"));
        assert!(!xml.contains("GEOGCS[...]"));
    }
}
