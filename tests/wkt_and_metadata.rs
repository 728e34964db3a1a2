//! Black-box tests over the WKT codec and the metadata import/export/mutator
//! surface, independent of any `Dataset`.

use bag::wkt::{self, CoordSys, Datum, LegacyBlock};

/// Seed scenario 4: a legacy `smXML` document describing UTM zone 17 north on
/// WGS84 resolves to the documented WKT prefix and EPSG 32617.
#[test]
fn seed_scenario_four_legacy_utm17_resolves_to_wkt_and_epsg() {
    let xml = r#"<smXML:MD_Metadata xmlns:smXML="http://metadata.dgiwg.org/smXML">
        <fileIdentifier>legacy-survey</fileIdentifier>
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

    let model = bag::metadata::xml_import::import(xml).unwrap();
    let wkt_string = model.horizontal_reference_system.definition.unwrap();
    assert!(wkt_string.starts_with(
        r#"PROJCS["UTM Zone 17, Northern Hemisphere", GEOGCS["WGS 84""#
    ));
    assert!(wkt_string.contains(r#"PARAMETER["central_meridian",-81]"#));
    assert!(wkt_string.contains(r#"PARAMETER["scale_factor",0.9996]"#));

    let legacy = wkt::wkt_to_legacy(Some(&wkt_string), None).unwrap();
    assert_eq!(wkt::infer_epsg(legacy.coord_sys, legacy.datum, legacy.utm_zone, legacy.false_northing), 32617);
}

/// `wktToLegacy(legacyToWkt(B)) = B` up to numeric tolerance, for a UTM block.
#[test]
fn legacy_to_wkt_to_legacy_round_trips_a_utm_block() {
    let legacy = LegacyBlock { coord_sys: CoordSys::Utm, datum: Datum::Wgs84, utm_zone: 17, ..Default::default() };
    let (horizontal, _vertical) = wkt::legacy_to_wkt(&legacy).unwrap();
    let recovered = wkt::wkt_to_legacy(horizontal.as_deref(), None).unwrap();
    assert_eq!(recovered.coord_sys, CoordSys::Utm);
    assert_eq!(recovered.datum, Datum::Wgs84);
    assert_eq!(recovered.utm_zone, 17);
}

/// `parseXml(exportXml(M)) = M` for a representative model with nested
/// lineage, constraints, and a contact block.
#[test]
fn export_then_import_recovers_a_fully_populated_model() {
    use bag::metadata::{xml_export, xml_import, MetadataModel, ProcessStep, ResponsibleParty, Source};

    let mut model = MetadataModel::default();
    model.file_identifier = Some("round-trip-full".to_string());
    model.language = Some("eng".to_string());
    model.contact = Some(ResponsibleParty {
        individual_name: Some("J. Surveyor".to_string()),
        organisation_name: Some("Hydro Office".to_string()),
        position_name: None,
        role: Some("pointOfContact".to_string()),
    });
    model.identification.title = Some("Harbor Approach Survey".to_string());
    model.identification.west = -81.5;
    model.identification.east = -80.5;
    model.identification.south = 24.0;
    model.identification.north = 25.0;
    model.spatial.rows = 20;
    model.spatial.cols = 30;
    model.spatial.row_resolution = 2.0;
    model.spatial.column_resolution = 2.0;
    model.spatial.ur_corner_x = 58.0;
    model.spatial.ur_corner_y = 38.0;
    model.data_quality.lineage.push(ProcessStep {
        description: Some("Multibeam acquisition".to_string()),
        tracking_id: Some("step-1".to_string()),
        processor: None,
        sources: vec![Source { description: Some("Vessel log".to_string()), title: None, date: None, date_type: None }],
    });
    model.legal_constraints.use_constraints.push("copyright".to_string());

    let xml = xml_export::export(&model);
    let parsed = xml_import::import(&xml).unwrap();

    assert_eq!(parsed.file_identifier, model.file_identifier);
    assert_eq!(parsed.identification.title, model.identification.title);
    assert_eq!(parsed.spatial.rows, 20);
    assert_eq!(parsed.data_quality.lineage.len(), 1);
    assert_eq!(parsed.data_quality.lineage[0].sources.len(), 1);
    assert_eq!(parsed.legal_constraints.use_constraints, vec!["copyright".to_string()]);
}

/// Mutators replace an existing subtree in place and leave the rest of the
/// document untouched; a required-but-absent target fails with `NodeNotFound`.
#[test]
fn mutators_replace_in_place_and_fail_on_missing_required_node() {
    use bag::metadata::mutators;
    use bag::metadata::{xml_export, Identification, MetadataModel, Spatial};

    let mut model = MetadataModel::default();
    model.file_identifier = Some("mutator-doc".to_string());
    model.spatial.ur_corner_x = 9.0;
    model.spatial.ur_corner_y = 9.0;
    let mut xml = xml_export::export(&model);

    let new_identification = Identification { title: Some("Updated Title".to_string()), west: -1.0, east: 1.0, south: -1.0, north: 1.0, ..Default::default() };
    mutators::set_identification(&mut xml, &new_identification).unwrap();
    assert_eq!(xml.matches("<identificationInfo>").count(), 1);
    assert!(xml.contains("Updated Title"));

    let sp = Spatial { rows: 99, cols: 99, ..Default::default() };
    mutators::set_spatial(&mut xml, &sp).unwrap();
    assert!(xml.contains("<rows>99</rows>"));

    let bare = r#"<gmi:MI_Metadata xmlns:gmi="http://www.isotc211.org/2005/gmi"></gmi:MI_Metadata>"#.to_string();
    let mut bare = bare;
    let missing_spatial = Spatial::default();
    assert!(mutators::set_spatial(&mut bare, &missing_spatial).is_err());
}
