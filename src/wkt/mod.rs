//! Converts between the legacy BAG coordinate-system parameter block (projection
//! id + ellipsoid + datum + numeric parameters) and OGC Well-Known Text, and
//! infers EPSG codes for the common combinations the format actually carries.
//!
//! The construction and parsing rules below are grounded bit-for-bit in
//! `bagLegacyToWkt`/`bagWktToLegacy` (original reference-system translator) and
//! `bagIdentifyEPSG` (original EPSG inference), down to the UTM-from-
//! Transverse_Mercator detection arithmetic and the per-datum TOWGS84 vectors.

pub mod ellipsoid;

use crate::error::{BagResult, ProjectionError};

const PI: f64 = std::f64::consts::PI;

/// The three datums a legacy BAG reference system may declare.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Datum {
    Wgs84,
    Wgs72,
    Nad83,
}

impl Datum {
    fn wkt_token(self) -> &'static str {
        match self {
            Datum::Wgs84 => "wgs_1984",
            Datum::Wgs72 => "wgs_1972",
            Datum::Nad83 => "north_american_datum_1983",
        }
    }

    fn from_wkt_token(token: &str) -> Option<Datum> {
        match token {
            "wgs_1984" => Some(Datum::Wgs84),
            "wgs_1972" => Some(Datum::Wgs72),
            "north_american_datum_1983" => Some(Datum::Nad83),
            _ => None,
        }
    }
}

/// The closed set of coordinate systems a legacy parameter block may name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CoordSys {
    Geodetic,
    Utm,
    Mercator,
    TransverseMercator,
    LambertConformalConic,
    PolarStereographic,
    Stereographic,
    Albers,
    AzimuthalEquidistant,
    Bonne,
    Cassini,
    CylindricalEqualArea,
    Eckert4,
    Eckert6,
    EquidistantCylindrical,
    Gnomonic,
    MillerCylindrical,
    Mollweide,
    Nzmg,
    Orthographic,
    Polyconic,
    Sinusoidal,
    VanDerGrinten,
}

impl CoordSys {
    /// The WKT `PROJECTION["..."]` token this coordinate system is written and
    /// recognized with. UTM shares Transverse_Mercator's token: it is the same
    /// projection, distinguished only by the parameter signature (see `wkt_to_legacy`).
    fn projection_name(self) -> Option<&'static str> {
        use CoordSys::*;
        match self {
            Geodetic => None,
            Utm | TransverseMercator => Some("Transverse_Mercator"),
            Albers => Some("Albers_Conic_Equal_Area"),
            AzimuthalEquidistant => Some("Azimuthal_Equidistant"),
            Bonne => Some("Bonne"),
            Cassini => Some("Cassini_Soldner"),
            CylindricalEqualArea => Some("Cylindrical_Equal_Area"),
            Eckert4 => Some("Eckert_IV"),
            Eckert6 => Some("Eckert_VI"),
            EquidistantCylindrical => Some("Equirectangular"),
            Gnomonic => Some("Gnomonic"),
            LambertConformalConic => Some("Lambert_Conformal_Conic_2SP"),
            Mercator => Some("Mercator_1SP"),
            MillerCylindrical => Some("Miller_Cylindrical"),
            Mollweide => Some("Mollweide"),
            Nzmg => Some("New_Zealand_Map_Grid"),
            Orthographic => Some("Orthographic"),
            PolarStereographic => Some("Polar_Stereographic"),
            Polyconic => Some("Polyconic"),
            Sinusoidal => Some("Sinusoidal"),
            Stereographic => Some("Oblique_Stereographic"),
            VanDerGrinten => Some("VanDerGrinten"),
        }
    }

    fn from_projection_token(token: &str) -> Option<CoordSys> {
        use CoordSys::*;
        Some(match token {
            "albers_conic_equal_area" => Albers,
            "azimuthal_equidistant" => AzimuthalEquidistant,
            "bonne" => Bonne,
            "cassini_soldner" => Cassini,
            "cylindrical_equal_area" => CylindricalEqualArea,
            "eckert_iv" => Eckert4,
            "eckert_vi" => Eckert6,
            "equirectangular" => EquidistantCylindrical,
            "gnomonic" => Gnomonic,
            "lambert_conformal_conic_2sp" => LambertConformalConic,
            "mercator_1sp" => Mercator,
            "miller_cylindrical" => MillerCylindrical,
            "mollweide" => Mollweide,
            "new_zealand_map_grid" => Nzmg,
            "orthographic" => Orthographic,
            "polar_stereographic" => PolarStereographic,
            "polyconic" => Polyconic,
            "sinusoidal" => Sinusoidal,
            "oblique_stereographic" => Stereographic,
            "transverse_mercator" => TransverseMercator,
            "vandergrinten" => VanDerGrinten,
            _ => return None,
        })
    }
}

/// The legacy BAG coordinate-reference-system parameter block: projection id,
/// ellipsoid, datum, and the numeric parameters the closed set of projections
/// above draws from (unused fields for a given projection are simply ignored).
#[derive(Debug, Clone, PartialEq)]
pub struct LegacyBlock {
    pub coord_sys: CoordSys,
    pub datum: Datum,
    pub ellipsoid_name: String,
    pub vertical_datum_name: Option<String>,
    pub origin_latitude: f64,
    pub central_meridian: f64,
    pub scale_factor: f64,
    pub false_easting: f64,
    pub false_northing: f64,
    pub std_parallel_1: f64,
    pub std_parallel_2: f64,
    pub latitude_of_centre: f64,
    pub longitude_of_centre: f64,
    pub utm_zone: i32,
}

impl Default for LegacyBlock {
    fn default() -> Self {
        LegacyBlock {
            coord_sys: CoordSys::Geodetic,
            datum: Datum::Wgs84,
            ellipsoid_name: String::new(),
            vertical_datum_name: None,
            origin_latitude: 0.0,
            central_meridian: 0.0,
            scale_factor: 0.0,
            false_easting: 0.0,
            false_northing: 0.0,
            std_parallel_1: 0.0,
            std_parallel_2: 0.0,
            latitude_of_centre: 0.0,
            longitude_of_centre: 0.0,
            utm_zone: 0,
        }
    }
}

/// Formats a WKT numeric parameter with the classic decimal point, fixed
/// precision, and no trailing zeros — deterministic and locale-independent
/// regardless of which projection or host platform produced the value.
fn format_param(value: f64) -> String {
    let s = format!("{:.6}", value);
    let s = s.trim_end_matches('0');
    s.trim_end_matches('.').to_string()
}

fn ellipsoid_wkt_or_fallback(datum: Datum, ellipsoid_name: &str) -> String {
    if let Some(row) = ellipsoid::lookup(ellipsoid_name) {
        format!(
            "SPHEROID[\"{}\",{},{}]",
            ellipsoid_name.trim(),
            format_param(row.semi_major),
            format_param(row.inverse_flattening)
        )
    } else {
        match datum {
            Datum::Wgs84 => "SPHEROID[\"WGS 84\",6378137,298.257223563]".to_string(),
            Datum::Wgs72 => "SPHEROID[\"WGS 72\",6378135,298.26]".to_string(),
            Datum::Nad83 => "SPHEROID[\"GRS 1980\",6378137,298.257222101]".to_string(),
        }
    }
}

fn datum_to_wkt(datum: Datum, ellipsoid_name: &str) -> String {
    let ellip = ellipsoid_wkt_or_fallback(datum, ellipsoid_name);
    match datum {
        Datum::Wgs84 => format!(
            "GEOGCS[\"WGS 84\", DATUM[\"WGS_1984\", {}, TOWGS84[0,0,0,0,0,0,0]], PRIMEM[\"Greenwich\",0], UNIT[\"degree\",0.0174532925199433]]",
            ellip
        ),
        Datum::Wgs72 => format!(
            "GEOGCS[\"WGS 72\", DATUM[\"WGS_1972\", {}, TOWGS84[0,0,4.5,0,0,0.554,0.2263]], PRIMEM[\"Greenwich\",0], UNIT[\"degree\",0.0174532925199433]]",
            ellip
        ),
        Datum::Nad83 => format!(
            "GEOGCS[\"NAD83\", DATUM[\"North_American_Datum_1983\", {}, TOWGS84[0,0,0,0,0,0,0]], PRIMEM[\"Greenwich\",0], UNIT[\"degree\",0.0174532925199433]]",
            ellip
        ),
    }
}

/// `(field_name, value)` pairs emitted as `PARAMETER["name",value]` in declaration order.
fn projection_params(legacy: &LegacyBlock) -> Vec<(&'static str, f64)> {
    use CoordSys::*;
    match legacy.coord_sys {
        Geodetic => vec![],
        Utm | TransverseMercator => vec![
            ("latitude_of_origin", legacy.origin_latitude),
            ("central_meridian", legacy.central_meridian),
            ("scale_factor", legacy.scale_factor),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
        Albers => vec![
            ("standard_parallel_1", legacy.std_parallel_1),
            ("standard_parallel_2", legacy.std_parallel_2),
            ("latitude_of_center", legacy.latitude_of_centre),
            ("longitude_of_center", legacy.longitude_of_centre),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
        AzimuthalEquidistant => vec![
            ("latitude_of_center", legacy.latitude_of_centre),
            ("longitude_of_center", legacy.longitude_of_centre),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
        Bonne => vec![
            ("standard_parallel_1", legacy.std_parallel_1),
            ("central_meridian", legacy.central_meridian),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
        Cassini => vec![
            ("latitude_of_origin", legacy.origin_latitude),
            ("central_meridian", legacy.central_meridian),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
        CylindricalEqualArea => vec![
            ("standard_parallel_1", legacy.std_parallel_1),
            ("central_meridian", legacy.central_meridian),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
        Eckert4 | Eckert6 | Mollweide | VanDerGrinten => vec![
            ("central_meridian", legacy.central_meridian),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
        EquidistantCylindrical | Gnomonic | Nzmg | Orthographic | Polyconic => vec![
            ("latitude_of_origin", legacy.origin_latitude),
            ("central_meridian", legacy.central_meridian),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
        LambertConformalConic => vec![
            ("standard_parallel_1", legacy.std_parallel_1),
            ("standard_parallel_2", legacy.std_parallel_2),
            ("latitude_of_origin", legacy.origin_latitude),
            ("central_meridian", legacy.central_meridian),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
        Mercator => vec![
            ("latitude_of_origin", legacy.origin_latitude),
            ("central_meridian", legacy.central_meridian),
            ("scale_factor", legacy.scale_factor),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
        MillerCylindrical => vec![
            ("latitude_of_center", legacy.latitude_of_centre),
            ("longitude_of_center", legacy.longitude_of_centre),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
        PolarStereographic | Stereographic => vec![
            ("latitude_of_origin", legacy.origin_latitude),
            ("central_meridian", legacy.central_meridian),
            ("scale_factor", legacy.scale_factor),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
        Sinusoidal => vec![
            ("longitude_of_center", legacy.longitude_of_centre),
            ("false_easting", legacy.false_easting),
            ("false_northing", legacy.false_northing),
        ],
    }
}

fn utm_is_north(false_northing: f64, zone: i32) -> bool {
    if false_northing == 0.0 {
        true
    } else if false_northing == 10_000_000.0 {
        false
    } else {
        zone >= 0
    }
}

/// Converts a legacy parameter block to horizontal/vertical WKT strings.
pub fn legacy_to_wkt(legacy: &LegacyBlock) -> BagResult<(Option<String>, Option<String>)> {
    let vertical = legacy.vertical_datum_name.as_ref().filter(|n| !n.is_empty()).map(|name| {
        format!("VERT_CS[\"{0}\", VERT_DATUM[\"{0}\", 2000]]", name)
    });

    let horizontal = if legacy.coord_sys == CoordSys::Geodetic {
        datum_to_wkt(legacy.datum, &legacy.ellipsoid_name)
    } else if legacy.coord_sys == CoordSys::Utm {
        let is_north = utm_is_north(legacy.false_northing, legacy.utm_zone);
        let zone = legacy.utm_zone.unsigned_abs();
        let central_meridian = (zone as f64) * 6.0 - 183.0;
        let false_northing = if is_north { 0.0 } else { 10_000_000.0 };
        format!(
            "PROJCS[\"UTM Zone {}, {} Hemisphere\", {}, PROJECTION[\"Transverse_Mercator\"], PARAMETER[\"latitude_of_origin\",{}], PARAMETER[\"central_meridian\",{}], PARAMETER[\"scale_factor\",{}], PARAMETER[\"false_easting\",{}], PARAMETER[\"false_northing\",{}], UNIT[\"metre\",1]]",
            zone,
            if is_north { "Northern" } else { "Southern" },
            datum_to_wkt(legacy.datum, &legacy.ellipsoid_name),
            format_param(0.0),
            format_param(central_meridian),
            format_param(0.9996),
            format_param(500_000.0),
            format_param(false_northing),
        )
    } else {
        let name = legacy.coord_sys.projection_name().ok_or_else(|| {
            ProjectionError::InvalidProjection(format!("{:?}", legacy.coord_sys))
        })?;
        let params = projection_params(legacy)
            .into_iter()
            .map(|(k, v)| format!("PARAMETER[\"{}\",{}]", k, format_param(v)))
            .collect::<Vec<_>>()
            .join(", ");
        format!(
            "PROJCS[\"unnamed\", {}, PROJECTION[\"{}\"], {}, UNIT[\"metre\",1]]",
            datum_to_wkt(legacy.datum, &legacy.ellipsoid_name),
            name,
            params
        )
    };

    Ok((Some(horizontal), vertical))
}

/// Extracts the text between the first `,` and the following `]` after `name`
/// appears in `wkt` (case-insensitive input expected), and parses it as f64.
/// Mirrors `getProjectionParam`'s index arithmetic in the original translator.
fn extract_param(wkt: &str, name: &str) -> BagResult<f64> {
    let start = wkt.find(name).ok_or_else(|| ProjectionError::InvalidProjection(name.to_string()))?;
    let rest = &wkt[start..];
    let comma = rest.find(',').ok_or_else(|| ProjectionError::InvalidProjection(name.to_string()))?;
    let close = rest[comma..].find(']').ok_or_else(|| ProjectionError::InvalidProjection(name.to_string()))?;
    let value_str = rest[comma + 1..comma + close].trim();
    value_str
        .parse::<f64>()
        .map_err(|_| ProjectionError::InvalidProjection(format!("unparseable parameter `{}`", name)).into())
}

fn extract_between(wkt: &str, open: &str, stop: char) -> Option<String> {
    let start = wkt.find(open)? + open.len();
    let rest = &wkt[start..];
    let end = rest.find(stop)?;
    Some(rest[..end].trim_matches('"').trim().to_string())
}

fn coordinate_type(wkt: &str) -> BagResult<CoordSys> {
    let Some(start) = wkt.find("projection[\"") else {
        return Ok(CoordSys::Geodetic);
    };
    let rest = &wkt[start + "projection[\"".len()..];
    let end = rest.find("\"]").ok_or_else(|| ProjectionError::InvalidProjection(wkt.to_string()))?;
    let name = &rest[..end];
    CoordSys::from_projection_token(name).ok_or_else(|| ProjectionError::InvalidProjection(name.to_string()).into())
}

fn datum_type(wkt: &str) -> BagResult<Datum> {
    let token = extract_between(wkt, "datum[\"", ',').ok_or_else(|| ProjectionError::InvalidDatum(wkt.to_string()))?;
    Datum::from_wkt_token(token.trim_end_matches('"').trim())
        .ok_or_else(|| ProjectionError::InvalidDatum(token).into())
}

fn ellipsoid_name(wkt: &str) -> BagResult<String> {
    extract_between(wkt, "spheroid[\"", ',').ok_or_else(|| ProjectionError::InvalidDatum(wkt.to_string()).into())
}

fn vertical_datum_name(wkt: &str) -> BagResult<String> {
    extract_between(wkt, "vert_datum[\"", ',').ok_or_else(|| ProjectionError::InvalidDatum(wkt.to_string()).into())
}

/// Converts horizontal/vertical WKT strings back into a legacy parameter block.
/// Parsing is case-insensitive and ignores surrounding whitespace.
pub fn wkt_to_legacy(horizontal: Option<&str>, vertical: Option<&str>) -> BagResult<LegacyBlock> {
    let mut legacy = LegacyBlock::default();

    if let Some(v) = vertical.filter(|s| !s.is_empty()) {
        let lower = v.to_lowercase();
        legacy.vertical_datum_name = Some(vertical_datum_name(&lower)?);
    }

    let Some(h) = horizontal.filter(|s| !s.is_empty()) else {
        return Ok(legacy);
    };
    let lower = h.to_lowercase();

    legacy.datum = datum_type(&lower)?;
    legacy.ellipsoid_name = ellipsoid_name(&lower)?;
    legacy.coord_sys = coordinate_type(&lower)?;

    use CoordSys::*;
    match legacy.coord_sys {
        Geodetic => {}
        Utm | TransverseMercator => {
            legacy.origin_latitude = extract_param(&lower, "latitude_of_origin")?;
            legacy.central_meridian = extract_param(&lower, "central_meridian")?;
            legacy.scale_factor = extract_param(&lower, "scale_factor")?;
            legacy.false_easting = extract_param(&lower, "false_easting")?;
            legacy.false_northing = extract_param(&lower, "false_northing")?;

            let utm_zone = ((legacy.central_meridian * PI / 180.0 + PI) / (PI / 30.0) + 1.0) as i32;
            let utm_central_meridian = (utm_zone as f64) * 6.0 - 183.0;
            if legacy.origin_latitude == 0.0
                && legacy.scale_factor == 0.9996
                && legacy.false_easting == 500_000.0
                && legacy.central_meridian == utm_central_meridian
            {
                legacy.coord_sys = Utm;
                legacy.utm_zone = utm_zone;
            } else {
                legacy.coord_sys = TransverseMercator;
            }
        }
        Albers => {
            legacy.std_parallel_1 = extract_param(&lower, "standard_parallel_1")?;
            legacy.std_parallel_2 = extract_param(&lower, "standard_parallel_2")?;
            legacy.latitude_of_centre = extract_param(&lower, "latitude_of_center")?;
            legacy.longitude_of_centre = extract_param(&lower, "longitude_of_center")?;
            legacy.false_easting = extract_param(&lower, "false_easting")?;
            legacy.false_northing = extract_param(&lower, "false_northing")?;
        }
        AzimuthalEquidistant | MillerCylindrical => {
            legacy.latitude_of_centre = extract_param(&lower, "latitude_of_center")?;
            legacy.longitude_of_centre = extract_param(&lower, "longitude_of_center")?;
            legacy.false_easting = extract_param(&lower, "false_easting")?;
            legacy.false_northing = extract_param(&lower, "false_northing")?;
        }
        Bonne | CylindricalEqualArea => {
            legacy.std_parallel_1 = extract_param(&lower, "standard_parallel_1")?;
            legacy.central_meridian = extract_param(&lower, "central_meridian")?;
            legacy.false_easting = extract_param(&lower, "false_easting")?;
            legacy.false_northing = extract_param(&lower, "false_northing")?;
        }
        Eckert4 | Eckert6 | Mollweide | VanDerGrinten => {
            legacy.central_meridian = extract_param(&lower, "central_meridian")?;
            legacy.false_easting = extract_param(&lower, "false_easting")?;
            legacy.false_northing = extract_param(&lower, "false_northing")?;
        }
        Sinusoidal => {
            legacy.longitude_of_centre = extract_param(&lower, "longitude_of_center")?;
            legacy.false_easting = extract_param(&lower, "false_easting")?;
            legacy.false_northing = extract_param(&lower, "false_northing")?;
        }
        Cassini | EquidistantCylindrical | Gnomonic | Nzmg | Orthographic | Polyconic => {
            legacy.origin_latitude = extract_param(&lower, "latitude_of_origin")?;
            legacy.central_meridian = extract_param(&lower, "central_meridian")?;
            legacy.false_easting = extract_param(&lower, "false_easting")?;
            legacy.false_northing = extract_param(&lower, "false_northing")?;
        }
        LambertConformalConic => {
            legacy.std_parallel_1 = extract_param(&lower, "standard_parallel_1")?;
            legacy.std_parallel_2 = extract_param(&lower, "standard_parallel_2")?;
            legacy.origin_latitude = extract_param(&lower, "latitude_of_origin")?;
            legacy.central_meridian = extract_param(&lower, "central_meridian")?;
            legacy.false_easting = extract_param(&lower, "false_easting")?;
            legacy.false_northing = extract_param(&lower, "false_northing")?;
        }
        Mercator => {
            legacy.origin_latitude = extract_param(&lower, "latitude_of_origin")?;
            legacy.central_meridian = extract_param(&lower, "central_meridian")?;
            legacy.scale_factor = extract_param(&lower, "scale_factor")?;
            legacy.false_easting = extract_param(&lower, "false_easting")?;
            legacy.false_northing = extract_param(&lower, "false_northing")?;
        }
        PolarStereographic | Stereographic => {
            legacy.origin_latitude = extract_param(&lower, "latitude_of_origin")?;
            legacy.central_meridian = extract_param(&lower, "central_meridian")?;
            legacy.scale_factor = extract_param(&lower, "scale_factor")?;
            legacy.false_easting = extract_param(&lower, "false_easting")?;
            legacy.false_northing = extract_param(&lower, "false_northing")?;
        }
    }

    Ok(legacy)
}

/// Infers an EPSG authority code for the common cases BAG files actually carry.
/// Returns 0 when there is no known match, matching `bagIdentifyEPSG`.
pub fn infer_epsg(coord_sys: CoordSys, datum: Datum, zone: i32, false_northing: f64) -> i32 {
    let is_north = false_northing == 0.0;

    match coord_sys {
        CoordSys::Geodetic => match datum {
            Datum::Wgs84 => 4326,
            Datum::Nad83 => 4269,
            Datum::Wgs72 => 4322,
        },
        CoordSys::Mercator => 3395,
        CoordSys::Utm => match datum {
            Datum::Nad83 if (1..=23).contains(&zone) && is_north => 26900 + zone,
            Datum::Wgs84 | Datum::Nad83 => {
                if is_north {
                    32600 + zone
                } else {
                    32700 + zone
                }
            }
            Datum::Wgs72 => {
                if is_north {
                    32200 + zone
                } else {
                    32300 + zone
                }
            }
        },
        _ => 0,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn utm17_wgs84() -> LegacyBlock {
        LegacyBlock {
            coord_sys: CoordSys::Utm,
            datum: Datum::Wgs84,
            ellipsoid_name: "WGS 84".into(),
            utm_zone: 17,
            false_northing: 0.0,
            ..Default::default()
        }
    }

    #[test]
    fn utm_zone_17_north_wgs84_matches_expected_wkt_prefix() {
        let (horizontal, _) = legacy_to_wkt(&utm17_wgs84()).unwrap();
        let wkt = horizontal.unwrap();
        let expected_prefix = "PROJCS[\"UTM Zone 17, Northern Hemisphere\", GEOGCS[\"WGS 84\", ";
        assert!(wkt.starts_with(expected_prefix), "got: {}", wkt);
        assert!(wkt.contains("PROJECTION[\"Transverse_Mercator\"]"));
        assert!(wkt.contains("PARAMETER[\"latitude_of_origin\",0]"));
        assert!(wkt.contains("PARAMETER[\"central_meridian\",-81]"));
        assert!(wkt.contains("PARAMETER[\"scale_factor\",0.9996]"));
        assert!(wkt.contains("PARAMETER[\"false_easting\",500000]"));
        assert!(wkt.contains("PARAMETER[\"false_northing\",0]"));
    }

    #[test]
    fn utm_zone_17_north_wgs84_infers_epsg_32617() {
        assert_eq!(infer_epsg(CoordSys::Utm, Datum::Wgs84, 17, 0.0), 32617);
    }

    #[test]
    fn wkt_to_legacy_recovers_utm_zone_from_transverse_mercator_signature() {
        let (horizontal, _) = legacy_to_wkt(&utm17_wgs84()).unwrap();
        let recovered = wkt_to_legacy(horizontal.as_deref(), None).unwrap();
        assert_eq!(recovered.coord_sys, CoordSys::Utm);
        assert_eq!(recovered.utm_zone, 17);
        assert_eq!(recovered.datum, Datum::Wgs84);
    }

    #[test]
    fn geodetic_round_trips_through_wkt() {
        let legacy = LegacyBlock {
            coord_sys: CoordSys::Geodetic,
            datum: Datum::Nad83,
            ellipsoid_name: "GRS 1980".into(),
            ..Default::default()
        };
        let (horizontal, _) = legacy_to_wkt(&legacy).unwrap();
        let recovered = wkt_to_legacy(horizontal.as_deref(), None).unwrap();
        assert_eq!(recovered.coord_sys, CoordSys::Geodetic);
        assert_eq!(recovered.datum, Datum::Nad83);
    }

    #[test]
    fn vertical_wkt_round_trips() {
        let legacy = LegacyBlock {
            vertical_datum_name: Some("Mean Lower Low Water".into()),
            ..Default::default()
        };
        let (_, vertical) = legacy_to_wkt(&legacy).unwrap();
        let vertical = vertical.unwrap();
        assert!(vertical.starts_with("VERT_CS[\"Mean Lower Low Water\""));
        let recovered = wkt_to_legacy(None, Some(&vertical)).unwrap();
        assert_eq!(recovered.vertical_datum_name.as_deref(), Some("mean lower low water"));
    }

    #[test]
    fn mercator_infers_epsg_3395_regardless_of_datum() {
        assert_eq!(infer_epsg(CoordSys::Mercator, Datum::Wgs72, 0, 0.0), 3395);
    }

    #[test]
    fn nad83_utm_outside_north_american_zone_range_falls_back_to_wgs84_codes() {
        assert_eq!(infer_epsg(CoordSys::Utm, Datum::Nad83, 30, 0.0), 32630);
    }
}
