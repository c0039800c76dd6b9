//! Route drawing session over a single crag photo.
//!
//! The session owns the route being drawn and the routes already completed.
//! Points are captured in pixel space and stored normalized; every mutation
//! bumps a revision counter so autosave can tell when a snapshot is stale.

use crate::config::DraftConfig;
use crate::constants::{DEFAULT_GRADE, MIN_ROUTE_POINTS};
use crate::models::{CanvasDraftSnapshot, DraftRoute, ImageBounds, NormalizedPoint, PixelPoint};
use crate::services::canvas::{denormalize_point, normalize_point};
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use uuid::Uuid;

#[derive(Error, Debug, PartialEq)]
pub enum DrawError {
    #[error("A route needs at least {need} points, got {have}")]
    TooFewPoints { have: usize, need: usize },

    #[error("A route needs a name")]
    MissingName,

    #[error("Route {0} not found")]
    RouteNotFound(Uuid),

    #[error("Point {index} out of range for a route of {len} points")]
    PointOutOfRange { index: usize, len: usize },

    #[error("No route is selected")]
    NothingSelected,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftPhase {
    /// No point placed for the next route
    Empty,
    /// At least one point placed
    Drawing,
}

/// Partial update of a completed route. An empty description clears it.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RouteEdit {
    pub name: Option<String>,
    pub grade: Option<String>,
    pub description: Option<String>,
}

#[derive(Debug, Clone)]
pub struct DrawingSession {
    completed: Vec<DraftRoute>,
    current_points: Vec<NormalizedPoint>,
    current_name: String,
    current_grade: String,
    current_description: String,
    selected: Option<Uuid>,
    min_point_spacing_px: f64,
    revision: u64,
}

fn non_blank(text: &str) -> Option<String> {
    let trimmed = text.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl DrawingSession {
    pub fn new(min_point_spacing_px: f64) -> Self {
        DrawingSession {
            completed: Vec::new(),
            current_points: Vec::new(),
            current_name: String::new(),
            current_grade: DEFAULT_GRADE.to_string(),
            current_description: String::new(),
            selected: None,
            min_point_spacing_px: min_point_spacing_px.max(0.0),
            revision: 0,
        }
    }

    pub fn from_config(config: &DraftConfig) -> Self {
        Self::new(config.min_point_spacing_px)
    }

    pub fn phase(&self) -> DraftPhase {
        if self.current_points.is_empty() {
            DraftPhase::Empty
        } else {
            DraftPhase::Drawing
        }
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn completed_routes(&self) -> &[DraftRoute] {
        &self.completed
    }

    pub fn current_points(&self) -> &[NormalizedPoint] {
        &self.current_points
    }

    pub fn current_name(&self) -> &str {
        &self.current_name
    }

    pub fn current_grade(&self) -> &str {
        &self.current_grade
    }

    pub fn current_description(&self) -> &str {
        &self.current_description
    }

    fn bump(&mut self) {
        self.revision += 1;
    }

    /// Capture a pointer position. Returns whether the point was kept: a
    /// point closer than the minimum spacing to the previous one is dropped
    /// so continuous pointer movement does not flood the route.
    pub fn add_point(&mut self, pixel: PixelPoint, bounds: &ImageBounds) -> bool {
        if !pixel.x.is_finite() || !pixel.y.is_finite() {
            return false;
        }
        if let Some(last) = self.current_points.last() {
            let last_pixel = denormalize_point(*last, bounds);
            if last_pixel.distance_to(&pixel) < self.min_point_spacing_px {
                return false;
            }
        }
        self.current_points.push(normalize_point(pixel, bounds));
        self.bump();
        true
    }

    pub fn undo_point(&mut self) -> Option<NormalizedPoint> {
        let removed = self.current_points.pop()?;
        self.bump();
        Some(removed)
    }

    /// Drop the route being drawn. The chosen grade is kept for the next one.
    pub fn cancel_current(&mut self) {
        if self.current_points.is_empty()
            && self.current_name.is_empty()
            && self.current_description.is_empty()
        {
            return;
        }
        self.current_points.clear();
        self.current_name.clear();
        self.current_description.clear();
        self.bump();
    }

    pub fn set_current_name(&mut self, name: impl Into<String>) {
        self.current_name = name.into();
        self.bump();
    }

    pub fn set_current_grade(&mut self, grade: impl Into<String>) {
        self.current_grade = grade.into();
        self.bump();
    }

    pub fn set_current_description(&mut self, description: impl Into<String>) {
        self.current_description = description.into();
        self.bump();
    }

    /// Turn the current points into a completed route and start over.
    pub fn complete_route(&mut self) -> Result<&DraftRoute, DrawError> {
        if self.current_points.len() < MIN_ROUTE_POINTS {
            return Err(DrawError::TooFewPoints {
                have: self.current_points.len(),
                need: MIN_ROUTE_POINTS,
            });
        }
        let name = non_blank(&self.current_name).ok_or(DrawError::MissingName)?;
        let grade = non_blank(&self.current_grade).unwrap_or_else(|| DEFAULT_GRADE.to_string());

        let route = DraftRoute::new(
            name,
            grade,
            non_blank(&self.current_description),
            std::mem::take(&mut self.current_points),
            self.completed.len() as u32 + 1,
        );
        tracing::debug!(
            "Completed route '{}' with {} points",
            route.name,
            route.points.len()
        );
        self.completed.push(route);
        self.current_name.clear();
        self.current_description.clear();
        self.bump();

        Ok(&self.completed[self.completed.len() - 1])
    }

    fn index_of(&self, id: Uuid) -> Result<usize, DrawError> {
        self.completed
            .iter()
            .position(|r| r.id == id)
            .ok_or(DrawError::RouteNotFound(id))
    }

    pub fn select(&mut self, id: Uuid) -> Result<(), DrawError> {
        self.index_of(id)?;
        self.selected = Some(id);
        Ok(())
    }

    pub fn deselect(&mut self) {
        self.selected = None;
    }

    pub fn selected(&self) -> Option<&DraftRoute> {
        let id = self.selected?;
        self.completed.iter().find(|r| r.id == id)
    }

    pub fn update_selected(&mut self, edit: RouteEdit) -> Result<&DraftRoute, DrawError> {
        let id = self.selected.ok_or(DrawError::NothingSelected)?;
        let index = self.index_of(id)?;

        let name = match edit.name {
            Some(name) => Some(non_blank(&name).ok_or(DrawError::MissingName)?),
            None => None,
        };

        let route = &mut self.completed[index];
        if let Some(name) = name {
            route.name = name;
        }
        if let Some(grade) = edit.grade.as_deref().and_then(non_blank) {
            route.grade = grade;
        }
        if let Some(description) = edit.description {
            route.description = non_blank(&description);
        }
        self.bump();

        Ok(&self.completed[index])
    }

    /// Drag one handle of a completed route to a new pixel position.
    pub fn move_point(
        &mut self,
        route_id: Uuid,
        index: usize,
        pixel: PixelPoint,
        bounds: &ImageBounds,
    ) -> Result<(), DrawError> {
        let route_index = self.index_of(route_id)?;
        let points = &mut self.completed[route_index].points;
        let len = points.len();
        let slot = points
            .get_mut(index)
            .ok_or(DrawError::PointOutOfRange { index, len })?;
        *slot = normalize_point(pixel, bounds);
        self.bump();
        Ok(())
    }

    /// Remove a completed route. Later routes move up one place so the
    /// sequence stays contiguous.
    pub fn delete_route(&mut self, id: Uuid) -> Result<DraftRoute, DrawError> {
        let index = self.index_of(id)?;
        let removed = self.completed.remove(index);
        self.renumber();
        if self.selected == Some(id) {
            self.selected = None;
        }
        self.bump();
        Ok(removed)
    }

    fn renumber(&mut self) {
        for (i, route) in self.completed.iter_mut().enumerate() {
            route.sequence_order = i as u32 + 1;
        }
    }

    pub fn snapshot(&self, now_ms: i64, ttl: Duration) -> CanvasDraftSnapshot {
        CanvasDraftSnapshot {
            completed_routes: self.completed.clone(),
            current_points: self.current_points.clone(),
            current_name: self.current_name.clone(),
            current_grade: self.current_grade.clone(),
            current_description: self.current_description.clone(),
            ..CanvasDraftSnapshot::default()
        }
        .touch(now_ms, ttl)
    }

    /// Replace the session state with a resumed snapshot. Selection is
    /// cleared and the revision is left alone, so resuming alone does not
    /// trigger a save.
    pub fn restore(&mut self, snapshot: CanvasDraftSnapshot) {
        let mut completed = snapshot.completed_routes;
        completed.sort_by_key(|r| r.sequence_order);
        self.completed = completed;
        self.renumber();
        self.current_points = snapshot.current_points;
        self.current_name = snapshot.current_name;
        self.current_grade =
            non_blank(&snapshot.current_grade).unwrap_or_else(|| DEFAULT_GRADE.to_string());
        self.current_description = snapshot.current_description;
        self.selected = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bounds() -> ImageBounds {
        ImageBounds::new(800.0, 600.0, 4000.0, 3000.0).unwrap()
    }

    fn draw(session: &mut DrawingSession, name: &str, pixels: &[(f64, f64)]) -> Uuid {
        for &(x, y) in pixels {
            session.add_point(PixelPoint::new(x, y), &bounds());
        }
        session.set_current_name(name);
        session.complete_route().unwrap().id
    }

    #[test]
    fn empty_to_drawing_on_first_point() {
        let mut session = DrawingSession::new(4.0);
        assert_eq!(session.phase(), DraftPhase::Empty);
        assert!(session.add_point(PixelPoint::new(400.0, 300.0), &bounds()));
        assert_eq!(session.phase(), DraftPhase::Drawing);
        assert_eq!(session.current_points()[0].x(), 0.5);
    }

    #[test]
    fn close_points_are_dropped() {
        let mut session = DrawingSession::new(4.0);
        assert!(session.add_point(PixelPoint::new(100.0, 100.0), &bounds()));
        assert!(!session.add_point(PixelPoint::new(102.0, 102.0), &bounds()));
        assert!(session.add_point(PixelPoint::new(105.0, 100.0), &bounds()));
        assert_eq!(session.current_points().len(), 2);
    }

    #[test]
    fn undo_returns_to_empty() {
        let mut session = DrawingSession::new(0.0);
        session.add_point(PixelPoint::new(10.0, 10.0), &bounds());
        assert!(session.undo_point().is_some());
        assert_eq!(session.phase(), DraftPhase::Empty);
        assert_eq!(session.undo_point(), None);
    }

    #[test]
    fn complete_requires_two_points_and_name() {
        let mut session = DrawingSession::new(4.0);
        session.add_point(PixelPoint::new(10.0, 10.0), &bounds());
        session.set_current_name("Arête");
        assert_eq!(
            session.complete_route().unwrap_err(),
            DrawError::TooFewPoints { have: 1, need: 2 }
        );

        session.add_point(PixelPoint::new(50.0, 80.0), &bounds());
        session.set_current_name("   ");
        assert_eq!(session.complete_route().unwrap_err(), DrawError::MissingName);
        assert_eq!(session.phase(), DraftPhase::Drawing);
    }

    #[test]
    fn complete_resets_but_keeps_grade() {
        let mut session = DrawingSession::new(4.0);
        session.set_current_grade("7B+");
        session.set_current_description("sit start");
        let id = draw(&mut session, "The Prow", &[(10.0, 10.0), (90.0, 200.0)]);

        let route = &session.completed_routes()[0];
        assert_eq!(route.id, id);
        assert_eq!(route.grade, "7B+");
        assert_eq!(route.description.as_deref(), Some("sit start"));
        assert_eq!(route.sequence_order, 1);

        assert_eq!(session.phase(), DraftPhase::Empty);
        assert_eq!(session.current_name(), "");
        assert_eq!(session.current_description(), "");
        assert_eq!(session.current_grade(), "7B+");
    }

    #[test]
    fn cancel_current_keeps_completed_routes() {
        let mut session = DrawingSession::new(4.0);
        draw(&mut session, "One", &[(10.0, 10.0), (90.0, 200.0)]);
        session.add_point(PixelPoint::new(300.0, 300.0), &bounds());
        session.set_current_name("Two");
        session.cancel_current();

        assert_eq!(session.phase(), DraftPhase::Empty);
        assert_eq!(session.current_name(), "");
        assert_eq!(session.completed_routes().len(), 1);
    }

    #[test]
    fn delete_renumbers_and_clears_selection() {
        let mut session = DrawingSession::new(4.0);
        let a = draw(&mut session, "A", &[(10.0, 10.0), (90.0, 200.0)]);
        let b = draw(&mut session, "B", &[(110.0, 10.0), (190.0, 200.0)]);
        let c = draw(&mut session, "C", &[(210.0, 10.0), (290.0, 200.0)]);

        session.select(b).unwrap();
        session.delete_route(b).unwrap();

        assert!(session.selected().is_none());
        let orders: Vec<(Uuid, u32)> = session
            .completed_routes()
            .iter()
            .map(|r| (r.id, r.sequence_order))
            .collect();
        assert_eq!(orders, vec![(a, 1), (c, 2)]);
        assert_eq!(session.delete_route(b).unwrap_err(), DrawError::RouteNotFound(b));
    }

    #[test]
    fn edit_selected_route() {
        let mut session = DrawingSession::new(4.0);
        let id = draw(&mut session, "Old", &[(10.0, 10.0), (90.0, 200.0)]);

        assert_eq!(
            session.update_selected(RouteEdit::default()).unwrap_err(),
            DrawError::NothingSelected
        );

        session.select(id).unwrap();
        let edited = session
            .update_selected(RouteEdit {
                name: Some("New".to_string()),
                grade: Some("6C".to_string()),
                description: Some(String::new()),
            })
            .unwrap();
        assert_eq!(edited.name, "New");
        assert_eq!(edited.grade, "6C");
        assert_eq!(edited.description, None);

        let blank = RouteEdit {
            name: Some(" ".to_string()),
            ..RouteEdit::default()
        };
        assert_eq!(session.update_selected(blank).unwrap_err(), DrawError::MissingName);
    }

    #[test]
    fn drag_handle_moves_point() {
        let mut session = DrawingSession::new(4.0);
        let id = draw(&mut session, "Drag", &[(10.0, 10.0), (90.0, 200.0)]);

        session
            .move_point(id, 1, PixelPoint::new(400.0, 300.0), &bounds())
            .unwrap();
        let p = session.completed_routes()[0].points[1];
        assert_eq!((p.x(), p.y()), (0.5, 0.5));

        assert_eq!(
            session.move_point(id, 5, PixelPoint::new(0.0, 0.0), &bounds()),
            Err(DrawError::PointOutOfRange { index: 5, len: 2 })
        );
    }

    #[test]
    fn every_mutation_bumps_revision() {
        let mut session = DrawingSession::new(4.0);
        let start = session.revision();
        session.add_point(PixelPoint::new(10.0, 10.0), &bounds());
        let after_add = session.revision();
        assert!(after_add > start);

        // A rejected point leaves it alone
        session.add_point(PixelPoint::new(11.0, 10.0), &bounds());
        assert_eq!(session.revision(), after_add);
    }

    #[test]
    fn snapshot_restore_round_trip() {
        let mut session = DrawingSession::new(4.0);
        draw(&mut session, "A", &[(10.0, 10.0), (90.0, 200.0)]);
        session.add_point(PixelPoint::new(300.0, 300.0), &bounds());
        session.set_current_name("half done");

        let snapshot = session.snapshot(1_000, Duration::from_secs(60));
        assert_eq!(snapshot.updated_at, 1_000);
        assert_eq!(snapshot.expires_at, 61_000);

        let mut resumed = DrawingSession::new(4.0);
        let revision = resumed.revision();
        resumed.restore(snapshot);
        assert_eq!(resumed.revision(), revision);
        assert_eq!(resumed.completed_routes(), session.completed_routes());
        assert_eq!(resumed.current_points(), session.current_points());
        assert_eq!(resumed.current_name(), "half done");
        assert_eq!(resumed.phase(), DraftPhase::Drawing);
    }
}
