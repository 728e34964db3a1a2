//! Imports the embedded ISO-19115/19139 metadata XML into a `MetadataModel`.
//!
//! Supported schema versions are discriminated by the root element's namespace
//! prefix: the legacy `smXML` form ("version 1") and the modern `gmi`/`gmd` form
//! ("version 2"). Both are walked with the same small set of helpers over a
//! `roxmltree::Document` — the portable artifact is the field → tag-name table
//! below, not the DOM library doing the walking.

use roxmltree::{Document, Node};

use crate::error::{BagMetadataError, BagResult};
use crate::wkt::{self, CoordSys, Datum, LegacyBlock};

use super::enums::{DepthCorrectionType, GroupType, VerticalUncertaintyType};
use super::{
    DataQuality, Identification, LegalConstraints, MetadataModel, ProcessStep, ReferenceSystem,
    ResponsibleParty, SecurityConstraints, Source, Spatial,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum SchemaVersion {
    Legacy,
    Iso19139,
}

fn detect_schema(xml: &str) -> SchemaVersion {
    if xml.contains("smXML") {
        SchemaVersion::Legacy
    } else {
        SchemaVersion::Iso19139
    }
}

fn find<'a, 'input>(doc: &'a Document<'input>, tag: &str) -> Option<Node<'a, 'input>> {
    doc.descendants().find(|n| n.is_element() && n.tag_name().name() == tag)
}

fn text_of(node: Node) -> Option<String> {
    let text: String = node
        .descendants()
        .filter(|n| n.is_text())
        .filter_map(|n| n.text())
        .collect();
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn text(doc: &Document, tag: &str) -> Option<String> {
    find(doc, tag).and_then(text_of)
}

fn required_text(doc: &Document, tag: &str) -> BagResult<String> {
    text(doc, tag).ok_or_else(|| BagMetadataError::MissingMandatoryItem(tag.to_string()).into())
}

fn number(doc: &Document, tag: &str) -> BagResult<f64> {
    let raw = required_text(doc, tag)?;
    raw.trim()
        .parse::<f64>()
        .map_err(|_| BagMetadataError::UnparseableNumber(raw).into())
}

fn optional_number(doc: &Document, tag: &str) -> f64 {
    text(doc, tag).and_then(|s| s.trim().parse::<f64>().ok()).unwrap_or(0.0)
}

fn bool_flag(doc: &Document, tag: &str) -> bool {
    matches!(text(doc, tag).as_deref(), Some("1") | Some("true") | Some("True"))
}

fn responsible_party(node: Node) -> ResponsibleParty {
    ResponsibleParty {
        individual_name: find_child_text(node, "individualName"),
        organisation_name: find_child_text(node, "organisationName"),
        position_name: find_child_text(node, "positionName"),
        role: find_child_text(node, "role"),
    }
}

fn find_child_text(node: Node, tag: &str) -> Option<String> {
    node.descendants().find(|n| n.is_element() && n.tag_name().name() == tag).and_then(text_of)
}

fn contact(doc: &Document) -> Option<ResponsibleParty> {
    find(doc, "contact").map(responsible_party)
}

fn responsible_parties(doc: &Document) -> Vec<ResponsibleParty> {
    doc.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "CI_ResponsibleParty")
        .map(responsible_party)
        .collect()
}

fn legal_constraints(doc: &Document) -> LegalConstraints {
    let use_constraints = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "useConstraints")
        .filter_map(text_of)
        .collect();
    let other_constraints = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "otherConstraints")
        .filter_map(text_of)
        .collect();
    LegalConstraints { use_constraints, other_constraints }
}

fn security_constraints(doc: &Document) -> SecurityConstraints {
    SecurityConstraints {
        classification: text(doc, "classification"),
        user_note: text(doc, "userNote"),
    }
}

fn sources(node: Node) -> Vec<Source> {
    node.descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "LI_Source")
        .map(|n| Source {
            description: find_child_text(n, "description"),
            title: find_child_text(n, "title"),
            date: find_child_text(n, "date"),
            date_type: find_child_text(n, "dateType"),
        })
        .collect()
}

fn data_quality(doc: &Document) -> DataQuality {
    let lineage = doc
        .descendants()
        .filter(|n| n.is_element() && n.tag_name().name() == "LI_ProcessStep")
        .map(|n| ProcessStep {
            description: find_child_text(n, "description"),
            tracking_id: find_child_text(n, "trackingId"),
            processor: n
                .descendants()
                .find(|c| c.is_element() && c.tag_name().name() == "processor")
                .map(responsible_party),
            sources: sources(n),
        })
        .collect();
    DataQuality { scope: text(doc, "scope"), lineage }
}

/// Looks fields up under `identificationInfo` when that wrapper is present
/// (the version-2 shape `export` always writes) so a document-global
/// `<language>` before it doesn't leak into `Identification.language`; falls
/// back to a document-wide search for the flat legacy (version-1) shape,
/// which has no `identificationInfo` wrapper at all.
fn identification(doc: &Document) -> BagResult<Identification> {
    let scope = find(doc, "identificationInfo");

    let text_in = |tag: &str| -> Option<String> {
        match scope {
            Some(n) => find_child_text(n, tag),
            None => text(doc, tag),
        }
    };
    let required_in = |tag: &str| -> BagResult<String> {
        text_in(tag).ok_or_else(|| BagMetadataError::MissingMandatoryItem(tag.to_string()).into())
    };
    let number_in = |tag: &str| -> BagResult<f64> {
        let raw = required_in(tag)?;
        raw.trim().parse::<f64>().map_err(|_| BagMetadataError::UnparseableNumber(raw).into())
    };

    Ok(Identification {
        title: text_in("title"),
        date: text_in("date"),
        date_type: text_in("dateType"),
        abstract_: text_in("abstract"),
        status: text_in("status"),
        language: text_in("language"),
        topic_category: text_in("topicCategory"),
        west: number_in("westBoundLongitude")?,
        east: number_in("eastBoundLongitude")?,
        south: number_in("southBoundLatitude")?,
        north: number_in("northBoundLatitude")?,
        vertical_uncertainty_type: text_in("verticalUncertaintyType")
            .map(|s| VerticalUncertaintyType::parse(&s))
            .unwrap_or_default(),
        depth_correction_type: text_in("depthCorrectionType")
            .map(|s| DepthCorrectionType::parse(&s))
            .unwrap_or_default(),
        node_group_type: text_in("nodeGroupType").map(|s| GroupType::parse(&s)).unwrap_or_default(),
        elevation_solution_group_type: text_in("elevationSolutionGroupType")
            .map(|s| GroupType::parse(&s))
            .unwrap_or_default(),
        responsible_parties: responsible_parties(doc),
    })
}

/// Parses a `gml:coordinates` element's `"llx,lly urx,ury"` text (the `ts`
/// space splits the two tuples, the `cs` comma splits each tuple) into the
/// four grid corners `export` writes it from.
fn gml_coordinates(doc: &Document) -> Option<(f64, f64, f64, f64)> {
    let raw = text(doc, "coordinates")?;
    let mut tuples = raw.split_whitespace();
    let ll = tuples.next()?;
    let ur = tuples.next()?;
    let mut ll = ll.split(',');
    let mut ur = ur.split(',');
    let llx: f64 = ll.next()?.trim().parse().ok()?;
    let lly: f64 = ll.next()?.trim().parse().ok()?;
    let urx: f64 = ur.next()?.trim().parse().ok()?;
    let ury: f64 = ur.next()?.trim().parse().ok()?;
    Some((llx, lly, urx, ury))
}

fn spatial(doc: &Document) -> BagResult<Spatial> {
    let (ll_corner_x, ll_corner_y, ur_corner_x, ur_corner_y) = match gml_coordinates(doc) {
        Some(corners) => corners,
        None => (
            number(doc, "llCornerX")?,
            number(doc, "llCornerY")?,
            number(doc, "urCornerX")?,
            number(doc, "urCornerY")?,
        ),
    };

    Ok(Spatial {
        rows: number(doc, "rows")? as u32,
        row_resolution: number(doc, "rowResolution")?,
        cols: number(doc, "columns")? as u32,
        column_resolution: number(doc, "columnResolution")?,
        resolution_unit: text(doc, "resolutionUnit"),
        cell_geometry: text(doc, "cellGeometry"),
        transformation_parameter_availability: bool_flag(doc, "transformationParameterAvailability"),
        check_point_availability: bool_flag(doc, "checkPointAvailability"),
        ll_corner_x,
        ll_corner_y,
        ur_corner_x,
        ur_corner_y,
    })
}

/// Decodes the legacy (version-1) horizontal/vertical reference system block,
/// found under `horizontalReferenceSystem`/`verticalReferenceSystem` in smXML
/// form, into a WKT pair via the same codec the facade's legacy API used.
fn legacy_reference_system(doc: &Document) -> BagResult<(ReferenceSystem, ReferenceSystem)> {
    let coord_sys = match text(doc, "projection").as_deref() {
        Some("UTM") => CoordSys::Utm,
        Some("Mercator") => CoordSys::Mercator,
        Some("Transverse_Mercator") => CoordSys::TransverseMercator,
        _ => CoordSys::Geodetic,
    };
    let datum = match text(doc, "horizontalDatum").as_deref() {
        Some("WGS72") => Datum::Wgs72,
        Some("NAD83") => Datum::Nad83,
        _ => Datum::Wgs84,
    };
    let legacy = LegacyBlock {
        coord_sys,
        datum,
        ellipsoid_name: text(doc, "ellipsoid").unwrap_or_default(),
        vertical_datum_name: text(doc, "verticalDatum"),
        utm_zone: text(doc, "zone").and_then(|s| s.parse().ok()).unwrap_or(0),
        false_northing: optional_number(doc, "falseNorthing"),
        ..Default::default()
    };
    let (horizontal, vertical) = wkt::legacy_to_wkt(&legacy)?;
    Ok((
        ReferenceSystem { kind: Some("WKT".to_string()), definition: horizontal },
        ReferenceSystem { kind: vertical.as_ref().map(|_| "WKT".to_string()), definition: vertical },
    ))
}

fn iso_reference_system(doc: &Document) -> (ReferenceSystem, ReferenceSystem) {
    (
        ReferenceSystem {
            kind: text(doc, "horizontalReferenceSystemType"),
            definition: text(doc, "horizontalReferenceSystemDefinition"),
        },
        ReferenceSystem {
            kind: text(doc, "verticalReferenceSystemType"),
            definition: text(doc, "verticalReferenceSystemDefinition"),
        },
    )
}

/// Parses an embedded metadata XML document into a typed `MetadataModel`.
pub fn import(xml: &str) -> BagResult<MetadataModel> {
    let doc = Document::parse(xml).map_err(|e| BagMetadataError::NodeNotFound(e.to_string()))?;
    let version = detect_schema(xml);

    let (horizontal_reference_system, vertical_reference_system) = match version {
        SchemaVersion::Legacy => legacy_reference_system(&doc)?,
        SchemaVersion::Iso19139 => iso_reference_system(&doc),
    };

    let model = MetadataModel {
        file_identifier: Some(required_text(&doc, "fileIdentifier")?),
        language: text(&doc, "language"),
        character_set: text(&doc, "characterSet"),
        hierarchy_level: text(&doc, "hierarchyLevel"),
        date_stamp: text(&doc, "dateStamp"),
        metadata_standard_name: text(&doc, "metadataStandardName"),
        metadata_standard_version: text(&doc, "metadataStandardVersion"),
        contact: contact(&doc),
        identification: identification(&doc)?,
        spatial: spatial(&doc)?,
        horizontal_reference_system,
        vertical_reference_system,
        data_quality: data_quality(&doc),
        legal_constraints: legal_constraints(&doc),
        security_constraints: security_constraints(&doc),
    };
    model.validate()?;
    Ok(model)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal_v2_xml() -> &'static str {
        r#"<gmi:MI_Metadata xmlns:gmi="http://www.isotc211.org/2005/gmi">
            <fileIdentifier>doc-1</fileIdentifier>
            <language>eng</language>
            <westBoundLongitude>-80.0</westBoundLongitude>
            <eastBoundLongitude>-79.0</eastBoundLongitude>
            <southBoundLatitude>25.0</southBoundLatitude>
            <northBoundLatitude>26.0</northBoundLatitude>
            <rows>100</rows>
            <columns>100</columns>
            <rowResolution>1.0</rowResolution>
            <columnResolution>1.0</columnResolution>
            <llCornerX>0</llCornerX>
            <llCornerY>0</llCornerY>
            <urCornerX>99</urCornerX>
            <urCornerY>99</urCornerY>
        </gmi:MI_Metadata>"#
    }

    #[test]
    fn imports_minimal_iso19139_document() {
        let model = import(minimal_v2_xml()).unwrap();
        assert_eq!(model.file_identifier.as_deref(), Some("doc-1"));
        assert_eq!(model.spatial.rows, 100);
        assert_eq!(model.identification.west, -80.0);
    }

    #[test]
    fn missing_file_identifier_is_a_mandatory_item_error() {
        let xml = r#"<gmi:MI_Metadata xmlns:gmi="http://www.isotc211.org/2005/gmi">
            <westBoundLongitude>0</westBoundLongitude>
            <eastBoundLongitude>1</eastBoundLongitude>
            <southBoundLatitude>0</southBoundLatitude>
            <northBoundLatitude>1</northBoundLatitude>
            <rows>1</rows><columns>1</columns>
            <rowResolution>1</rowResolution><columnResolution>1</columnResolution>
            <llCornerX>0</llCornerX><llCornerY>0</llCornerY>
            <urCornerX>1</urCornerX><urCornerY>1</urCornerY>
        </gmi:MI_Metadata>"#;
        assert!(import(xml).is_err());
    }

    #[test]
    fn parses_grid_corners_from_gml_coordinates() {
        let xml = r#"<gmi:MI_Metadata xmlns:gmi="http://www.isotc211.org/2005/gmi" xmlns:gml="http://www.opengis.net/gml">
            <fileIdentifier>doc-2</fileIdentifier>
            <westBoundLongitude>-80.0</westBoundLongitude>
            <eastBoundLongitude>-79.0</eastBoundLongitude>
            <southBoundLatitude>25.0</southBoundLatitude>
            <northBoundLatitude>26.0</northBoundLatitude>
            <rows>100</rows>
            <columns>100</columns>
            <rowResolution>1.0</rowResolution>
            <columnResolution>1.0</columnResolution>
            <gml:coordinates decimal="." cs="," ts=" ">0.000000000000,0.000000000000 99.000000000000,49.000000000000</gml:coordinates>
        </gmi:MI_Metadata>"#;
        let model = import(xml).unwrap();
        assert_eq!(model.spatial.ll_corner_x, 0.0);
        assert_eq!(model.spatial.ll_corner_y, 0.0);
        assert_eq!(model.spatial.ur_corner_x, 99.0);
        assert_eq!(model.spatial.ur_corner_y, 49.0);
    }

    #[test]
    fn legacy_smxml_utm_zone_17_resolves_to_expected_wkt_and_epsg() {
        let xml = r#"<smXML:MD_Metadata xmlns:smXML="http://metadata.dgiwg.org/smXML">
            <fileIdentifier>legacy-1</fileIdentifier>
            <westBoundLongitude>-81.5</westBoundLongitude>
            <eastBoundLongitude>-80.5</eastBoundLongitude>
            <southBoundLatitude>24.0</southBoundLatitude>
            <northBoundLatitude>25.0</northBoundLatitude>
            <rows>10</rows><columns>10</columns>
            <rowResolution>1</rowResolution><columnResolution>1</columnResolution>
            <llCornerX>0</llCornerX><llCornerY>0</llCornerY>
            <urCornerX>9</urCornerX><urCornerY>9</urCornerY>
            <horizontalReferenceSystem>
                <projection>UTM</projection>
                <zone>17</zone>
                <horizontalDatum>WGS84</horizontalDatum>
                <ellipsoid>WGS 84</ellipsoid>
                <falseNorthing>0</falseNorthing>
            </horizontalReferenceSystem>
        </smXML:MD_Metadata>"#;
        let model = import(xml).unwrap();
        let wkt = model.horizontal_reference_system.definition.unwrap();
        assert!(wkt.starts_with("PROJCS[\"UTM Zone 17, Northern Hemisphere\""));
        let recovered = crate::wkt::wkt_to_legacy(Some(&wkt), None).unwrap();
        assert_eq!(crate::wkt::infer_epsg(recovered.coord_sys, recovered.datum, recovered.utm_zone, recovered.false_northing), 32617);
    }
}
