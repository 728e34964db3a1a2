//! Ellipsoid name lookup, standing in for the `ellips.dat` text table the
//! original library scans line by line under `$BAG_HOME/ellips.dat`. Each row
//! is `(name, semi_major, inverse_flattening)`, matched case-insensitively.

/// One row of the ellipsoid table: name, semi-major axis (metres), inverse flattening.
pub struct EllipsoidRow {
    pub name: &'static str,
    pub semi_major: f64,
    pub inverse_flattening: f64,
}

/// A small built-in table covering the ellipsoids the three supported datums
/// normally pair with. Unknown names fall back to a hardcoded per-datum
/// spheroid in `wkt::ellipsoid_wkt_or_fallback`, exactly as `datumToWkt` falls
/// back on a lookup miss in the original library.
pub const TABLE: &[EllipsoidRow] = &[
    EllipsoidRow { name: "wgs 84", semi_major: 6_378_137.0, inverse_flattening: 298.257_223_563 },
    EllipsoidRow { name: "wgs 72", semi_major: 6_378_135.0, inverse_flattening: 298.26 },
    EllipsoidRow { name: "grs 1980", semi_major: 6_378_137.0, inverse_flattening: 298.257_222_101 },
    EllipsoidRow { name: "clarke 1866", semi_major: 6_378_206.4, inverse_flattening: 294.978_698_2 },
    EllipsoidRow { name: "international 1924", semi_major: 6_378_388.0, inverse_flattening: 297.0 },
];

/// Scan the table for a case-insensitive name match.
pub fn lookup(name: &str) -> Option<&'static EllipsoidRow> {
    let needle = name.trim().to_lowercase();
    TABLE.iter().find(|row| row.name == needle)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_case_insensitive() {
        assert!(lookup("WGS 84").is_some());
        assert!(lookup("wgs 84").is_some());
        assert!(lookup("  Wgs 84  ").is_some());
    }

    #[test]
    fn unknown_name_falls_back_to_none() {
        assert!(lookup("not a real ellipsoid").is_none());
    }
}
