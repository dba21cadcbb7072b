use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::{DetectionId, EpochMillis};

pub const DEFAULT_SIZE: &str = "330 ml";
pub const DEFAULT_COLOR: &str = "clear";
pub const DEFAULT_MATERIAL: &str = "PET";

/// Manual entries are always recorded at full confidence.
pub const MANUAL_CONFIDENCE: u8 = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum DetectionSource {
    Scan,
    Manual,
}

/// One logged collection event. Immutable once appended to a ledger.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DetectionRecord {
    pub id: DetectionId,
    pub timestamp: EpochMillis,
    pub bottles: u32,
    pub size: String,
    pub color: String,
    pub material: String,
    pub confidence: u8, // percent, 0-100
    pub source: DetectionSource,
    pub points: u64,
    pub earnings: f64,
    pub co2_saved: f64, // kg
    pub poly_money: u64,
}

/// Input accepted by the ledger's append operation.
///
/// Everything except `bottles` is optional; reward fields left as `None`
/// are derived from `bottles` when the record is created.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct NewDetection {
    pub bottles: u32,
    pub size: Option<String>,
    pub color: Option<String>,
    pub material: Option<String>,
    pub confidence: Option<u8>,
    pub source: DetectionSource,
    pub points: Option<u64>,
    pub earnings: Option<f64>,
    pub co2_saved: Option<f64>,
    pub poly_money: Option<u64>,
}

impl NewDetection {
    /// A manual log entry with default bottle description.
    pub fn manual(bottles: u32) -> Self {
        Self {
            bottles,
            size: None,
            color: None,
            material: None,
            confidence: Some(MANUAL_CONFIDENCE),
            source: DetectionSource::Manual,
            points: None,
            earnings: None,
            co2_saved: None,
            poly_money: None,
        }
    }

    pub fn scanned(bottles: u32, confidence: u8) -> Self {
        Self {
            confidence: Some(confidence),
            source: DetectionSource::Scan,
            ..Self::manual(bottles)
        }
    }

    pub fn with_description(mut self, size: &str, color: &str, material: &str) -> Self {
        self.size = Some(size.to_string());
        self.color = Some(color.to_string());
        self.material = Some(material.to_string());
        self
    }
}

/// Raw answer from an object-detection capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct DetectionResult {
    pub bottle_count: u32,
    pub confidence: f64, // 0.0 - 1.0
    pub bounding_boxes: Vec<BoundingBox>,
    /// Size label reported by the detector itself, when it has one.
    #[serde(default)]
    pub size_hint: Option<String>,
    #[serde(default)]
    pub material_hint: Option<String>,
}

/// Coordinates are normalized to the captured frame (0.0 - 1.0).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BoundingBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub confidence: f64,
    pub label: String,
}
