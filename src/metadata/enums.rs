//! Small case-folded enumerations parsed out of the ISO-19139 identification block.
//! Unknown or absent spellings soft-recover to `Unknown` rather than failing the import.

fn fold(s: &str) -> String {
    s.trim().to_lowercase().replace([' ', '_', '-'], "")
}

/// How per-node vertical uncertainty was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum VerticalUncertaintyType {
    RawStdDev,
    CubeStdDev,
    ProductUncert,
    AverageTpe,
    HistoricalStdDev,
    #[default]
    Unknown,
}

impl VerticalUncertaintyType {
    pub fn parse(raw: &str) -> Self {
        match fold(raw).as_str() {
            "rawstddev" => Self::RawStdDev,
            "cubestddev" => Self::CubeStdDev,
            "productuncert" | "productuncertainty" => Self::ProductUncert,
            "averagetpe" => Self::AverageTpe,
            "historicalstddev" => Self::HistoricalStdDev,
            _ => Self::Unknown,
        }
    }
}

/// How elevation values were corrected for depth reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DepthCorrectionType {
    TrueDepth,
    NominalDepthMeters,
    NominalDepthFeet,
    CorrectedCarters,
    CorrectedMatthews,
    #[default]
    Unknown,
}

impl DepthCorrectionType {
    pub fn parse(raw: &str) -> Self {
        match fold(raw).as_str() {
            "truedepth" => Self::TrueDepth,
            "nominaldepthmeters" | "nominaldepthmetres" => Self::NominalDepthMeters,
            "nominaldepthfeet" => Self::NominalDepthFeet,
            "correctedcarters" | "carterscorrected" => Self::CorrectedCarters,
            "correctedmatthews" | "matthewscorrected" => Self::CorrectedMatthews,
            _ => Self::Unknown,
        }
    }
}

/// The statistical combination behind a node or elevation-solution group.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GroupType {
    Cube,
    Product,
    Average,
    #[default]
    Unknown,
}

impl GroupType {
    pub fn parse(raw: &str) -> Self {
        match fold(raw).as_str() {
            "cube" => Self::Cube,
            "product" => Self::Product,
            "average" => Self::Average,
            _ => Self::Unknown,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertical_uncertainty_accepts_spaced_and_camel_spellings() {
        assert_eq!(VerticalUncertaintyType::parse("raw std dev"), VerticalUncertaintyType::RawStdDev);
        assert_eq!(VerticalUncertaintyType::parse("RawStdDev"), VerticalUncertaintyType::RawStdDev);
        assert_eq!(VerticalUncertaintyType::parse("nonsense"), VerticalUncertaintyType::Unknown);
    }

    #[test]
    fn depth_correction_defaults_to_unknown_on_empty_input() {
        assert_eq!(DepthCorrectionType::parse(""), DepthCorrectionType::Unknown);
    }

    #[test]
    fn group_type_is_case_insensitive() {
        assert_eq!(GroupType::parse("CUBE"), GroupType::Cube);
        assert_eq!(GroupType::parse("product"), GroupType::Product);
    }
}
