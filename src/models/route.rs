use crate::constants::MIN_ROUTE_POINTS;
use crate::models::NormalizedPoint;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A climbing route line drawn over a crag photo.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DraftRoute {
    pub id: Uuid,
    pub name: String,
    pub grade: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Ordered line points, normalized to the image content
    pub points: Vec<NormalizedPoint>,
    /// 1-based position among the routes drawn on the same photo
    pub sequence_order: u32,
}

impl DraftRoute {
    pub fn new(
        name: String,
        grade: String,
        description: Option<String>,
        points: Vec<NormalizedPoint>,
        sequence_order: u32,
    ) -> Self {
        DraftRoute {
            id: Uuid::new_v4(),
            name,
            grade,
            description,
            points,
            sequence_order,
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.name.trim().is_empty() {
            return Err(format!("Route {} has no name", self.id));
        }
        if self.points.len() < MIN_ROUTE_POINTS {
            return Err(format!(
                "Route '{}' has {} point(s), at least {} required",
                self.name,
                self.points.len(),
                MIN_ROUTE_POINTS
            ));
        }
        Ok(())
    }
}
