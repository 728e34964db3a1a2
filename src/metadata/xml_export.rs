//! Exports a `MetadataModel` as UTF-8 ISO-19139 (version-2) XML with a
//! deterministic element order and fixed-precision decimal formatting, so that
//! two exports of the same model are byte-identical.

use super::MetadataModel;

pub(crate) fn fixed(value: f64, digits: usize) -> String {
    format!("{:.*}", digits, value)
}

pub(crate) fn corner(value: f64) -> String {
    fixed(value, 12)
}

pub(crate) fn param(value: f64) -> String {
    fixed(value, 7)
}

pub(crate) fn resolution(value: f64) -> String {
    fixed(value, 15)
}

pub(crate) fn escape(text: &str) -> String {
    text.replace('&', "&amp;").replace('<', "&lt;").replace('>', "&gt;").replace('"', "&quot;")
}

pub(crate) fn elem(out: &mut String, tag: &str, value: &str) {
    out.push_str(&format!("<{0}>{1}</{0}>", tag, escape(value)));
}

pub(crate) fn elem_opt(out: &mut String, tag: &str, value: &Option<String>) {
    if let Some(v) = value {
        elem(out, tag, v);
    }
}

/// Serializes `model` to a single `gmi:MI_Metadata` document. Coordinates in the
/// bounding envelope are written as a single `gml:coordinates` element with the
/// `"llx,lly urx,ury"` layout and `decimal="." cs="," ts=" "` attributes.
pub fn export(model: &MetadataModel) -> String {
    let mut out = String::new();
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8"?>"#);
    out.push_str(r#"<gmi:MI_Metadata xmlns:gmi="http://www.isotc211.org/2005/gmi" xmlns:gml="http://www.opengis.net/gml">"#);

    elem_opt(&mut out, "fileIdentifier", &model.file_identifier);
    elem_opt(&mut out, "language", &model.language);
    elem_opt(&mut out, "characterSet", &model.character_set);
    elem_opt(&mut out, "hierarchyLevel", &model.hierarchy_level);
    elem_opt(&mut out, "dateStamp", &model.date_stamp);
    elem_opt(&mut out, "metadataStandardName", &model.metadata_standard_name);
    elem_opt(&mut out, "metadataStandardVersion", &model.metadata_standard_version);

    if let Some(contact) = &model.contact {
        out.push_str("<contact>");
        elem_opt(&mut out, "individualName", &contact.individual_name);
        elem_opt(&mut out, "organisationName", &contact.organisation_name);
        elem_opt(&mut out, "positionName", &contact.position_name);
        elem_opt(&mut out, "role", &contact.role);
        out.push_str("</contact>");
    }

    let id = &model.identification;
    out.push_str("<identificationInfo>");
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

    let sp = &model.spatial;
    out.push_str("<spatialRepresentationInfo>");
    elem(&mut out, "rows", &sp.rows.to_string());
    elem(&mut out, "rowResolution", &resolution(sp.row_resolution));
    elem(&mut out, "columns", &sp.cols.to_string());
    elem(&mut out, "columnResolution", &resolution(sp.column_resolution));
    elem_opt(&mut out, "resolutionUnit", &sp.resolution_unit);
    elem_opt(&mut out, "cellGeometry", &sp.cell_geometry);
    elem(
        &mut out,
        "transformationParameterAvailability",
        if sp.transformation_parameter_availability { "1" } else { "0" },
    );
    elem(&mut out, "checkPointAvailability", if sp.check_point_availability { "1" } else { "0" });
    out.push_str(&format!(
        r#"<gml:coordinates decimal="." cs="," ts=" ">{},{} {},{}</gml:coordinates>"#,
        corner(sp.ll_corner_x),
        corner(sp.ll_corner_y),
        corner(sp.ur_corner_x),
        corner(sp.ur_corner_y),
    ));
    out.push_str("</spatialRepresentationInfo>");

    out.push_str("<referenceSystemInfo>");
    elem_opt(&mut out, "horizontalReferenceSystemType", &model.horizontal_reference_system.kind);
    elem_opt(&mut out, "horizontalReferenceSystemDefinition", &model.horizontal_reference_system.definition);
    elem_opt(&mut out, "verticalReferenceSystemType", &model.vertical_reference_system.kind);
    elem_opt(&mut out, "verticalReferenceSystemDefinition", &model.vertical_reference_system.definition);
    out.push_str("</referenceSystemInfo>");

    out.push_str("<dataQualityInfo>");
    elem_opt(&mut out, "scope", &model.data_quality.scope);
    for step in &model.data_quality.lineage {
        out.push_str("<LI_ProcessStep>");
        elem_opt(&mut out, "description", &step.description);
        elem_opt(&mut out, "trackingId", &step.tracking_id);
        for source in &step.sources {
            out.push_str("<LI_Source>");
            elem_opt(&mut out, "description", &source.description);
            elem_opt(&mut out, "title", &source.title);
            elem_opt(&mut out, "date", &source.date);
            elem_opt(&mut out, "dateType", &source.date_type);
            out.push_str("</LI_Source>");
        }
        out.push_str("</LI_ProcessStep>");
    }
    out.push_str("</dataQualityInfo>");

    out.push_str("<resourceConstraints>");
    for c in &model.legal_constraints.use_constraints {
        elem(&mut out, "useConstraints", c);
    }
    for c in &model.legal_constraints.other_constraints {
        elem(&mut out, "otherConstraints", c);
    }
    elem_opt(&mut out, "classification", &model.security_constraints.classification);
    elem_opt(&mut out, "userNote", &model.security_constraints.user_note);
    out.push_str("</resourceConstraints>");

    out.push_str("</gmi:MI_Metadata>");
    out
}
