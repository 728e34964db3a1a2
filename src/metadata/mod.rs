//! The typed ISO-19115/19139 metadata record tree, plus XML import/export.
//!
//! `MetadataModel` is the parsed, validated form; `xml_import`/`xml_export` convert
//! it to and from the two schema generations a BAG file's embedded XML may use.

pub mod enums;
pub mod mutators;
pub mod xml_export;
pub mod xml_import;

use enums::{DepthCorrectionType, GroupType, VerticalUncertaintyType};

/// `individualName`/`organisationName`/`positionName`/`role` — ISO-19115 `CI_ResponsibleParty`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResponsibleParty {
    pub individual_name: Option<String>,
    pub organisation_name: Option<String>,
    pub position_name: Option<String>,
    pub role: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct LegalConstraints {
    pub use_constraints: Vec<String>,
    pub other_constraints: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct SecurityConstraints {
    pub classification: Option<String>,
    pub user_note: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Source {
    pub description: Option<String>,
    pub title: Option<String>,
    pub date: Option<String>,
    pub date_type: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ProcessStep {
    pub description: Option<String>,
    pub tracking_id: Option<String>,
    pub processor: Option<ResponsibleParty>,
    pub sources: Vec<Source>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct DataQuality {
    pub scope: Option<String>,
    pub lineage: Vec<ProcessStep>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Identification {
    pub title: Option<String>,
    pub date: Option<String>,
    pub date_type: Option<String>,
    pub abstract_: Option<String>,
    pub status: Option<String>,
    pub language: Option<String>,
    pub topic_category: Option<String>,
    pub west: f64,
    pub east: f64,
    pub south: f64,
    pub north: f64,
    pub vertical_uncertainty_type: VerticalUncertaintyType,
    pub depth_correction_type: DepthCorrectionType,
    pub node_group_type: GroupType,
    pub elevation_solution_group_type: GroupType,
    pub responsible_parties: Vec<ResponsibleParty>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Spatial {
    pub rows: u32,
    pub row_resolution: f64,
    pub cols: u32,
    pub column_resolution: f64,
    pub resolution_unit: Option<String>,
    pub cell_geometry: Option<String>,
    pub transformation_parameter_availability: bool,
    pub check_point_availability: bool,
    pub ll_corner_x: f64,
    pub ll_corner_y: f64,
    pub ur_corner_x: f64,
    pub ur_corner_y: f64,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ReferenceSystem {
    pub kind: Option<String>,
    pub definition: Option<String>,
}

/// The parsed, validated ISO-19115/19139 metadata record a `Dataset` carries.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MetadataModel {
    pub file_identifier: Option<String>,
    pub language: Option<String>,
    pub character_set: Option<String>,
    pub hierarchy_level: Option<String>,
    pub date_stamp: Option<String>,
    pub metadata_standard_name: Option<String>,
    pub metadata_standard_version: Option<String>,
    pub contact: Option<ResponsibleParty>,
    pub identification: Identification,
    pub spatial: Spatial,
    pub horizontal_reference_system: ReferenceSystem,
    pub vertical_reference_system: ReferenceSystem,
    pub data_quality: DataQuality,
    pub legal_constraints: LegalConstraints,
    pub security_constraints: SecurityConstraints,
}

impl MetadataModel {
    /// Checks the cross-field invariants §3 names: bounding box ordering and the
    /// list-length agreement every `Vec` field above is expected to satisfy by construction
    /// (kept here as a defense for models built outside `xml_import`, e.g. by hand in tests).
    pub fn validate(&self) -> crate::error::BagResult<()> {
        use crate::error::BagMetadataError;
        let id = &self.identification;
        if id.west > id.east || id.south > id.north {
            return Err(BagMetadataError::InconsistentBoundingBox {
                west: id.west,
                east: id.east,
                south: id.south,
                north: id.north,
            }
            .into());
        }
        if self.spatial.ll_corner_x > self.spatial.ur_corner_x || self.spatial.ll_corner_y > self.spatial.ur_corner_y
        {
            return Err(BagMetadataError::InconsistentBoundingBox {
                west: self.spatial.ll_corner_x,
                east: self.spatial.ur_corner_x,
                south: self.spatial.ll_corner_y,
                north: self.spatial.ur_corner_y,
            }
            .into());
        }
        Ok(())
    }
}
