//! Collision detection and response for axis-aligned boxes
//!
//! Everything in the level is a box: terrain, pickups, enemies and the player.
//! `overlaps` is the broad test, `resolve` classifies which face of the
//! obstacle the moving box ran into so callers can apply a positional fix.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// An axis-aligned box (top-left origin, y grows downward)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub pos: Vec2,
    pub size: Vec2,
}

impl Aabb {
    pub fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            pos: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub fn left(&self) -> f32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> f32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> f32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> f32 {
        self.pos.y + self.size.y
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size * 0.5
    }

    /// Point containment, inclusive on every edge
    #[inline]
    pub fn contains_point(&self, p: Vec2) -> bool {
        p.x >= self.left() && p.x <= self.right() && p.y >= self.top() && p.y <= self.bottom()
    }

    /// Cheap proximity test: boxes within `margin` of each other on both axes
    #[inline]
    pub fn near(&self, other: &Aabb, margin: f32) -> bool {
        !(self.right() + margin < other.left()
            || self.left() - margin > other.right()
            || self.bottom() + margin < other.top()
            || self.top() - margin > other.bottom())
    }
}

/// Which face of the obstacle the moving box hit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Side {
    /// Landed on the obstacle
    Top,
    /// Hit the obstacle from below
    Bottom,
    /// Ran into the obstacle's left face (moving box ends up to the left)
    Left,
    /// Ran into the obstacle's right face
    Right,
    None,
}

/// Strict overlap: touching edges do not count
#[inline]
pub fn overlaps(a: &Aabb, b: &Aabb) -> bool {
    a.left() < b.right() && a.right() > b.left() && a.top() < b.bottom() && a.bottom() > b.top()
}

/// Classify the contact face between `moving` and `obstacle`
///
/// Compares the center offset scaled by the opposite combined half-extent
/// (`half_w * dy` against `half_h * dx`); the larger term names the axis of
/// least penetration. On an exact diagonal (equal magnitudes) the horizontal
/// axis wins, so a perfect corner clip reads as a wall hit rather than a
/// landing. With coincident centers that resolves to `Left`.
pub fn resolve(moving: &Aabb, obstacle: &Aabb) -> Side {
    let d = moving.center() - obstacle.center();
    let half_w = (moving.size.x + obstacle.size.x) / 2.0;
    let half_h = (moving.size.y + obstacle.size.y) / 2.0;

    if d.x.abs() > half_w || d.y.abs() > half_h {
        return Side::None;
    }

    let cross_w = half_w * d.y;
    let cross_h = half_h * d.x;

    if cross_w.abs() > cross_h.abs() {
        if d.y > 0.0 { Side::Bottom } else { Side::Top }
    } else if d.x > 0.0 {
        Side::Right
    } else {
        Side::Left
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn block() -> Aabb {
        Aabb::new(0.0, 100.0, 200.0, 48.0)
    }

    #[test]
    fn test_touching_edges_do_not_overlap() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(10.0, 0.0, 10.0, 10.0);
        assert!(!overlaps(&a, &b));
        let c = Aabb::new(0.0, 10.0, 10.0, 10.0);
        assert!(!overlaps(&a, &c));
        let d = Aabb::new(9.9, 9.9, 10.0, 10.0);
        assert!(overlaps(&a, &d));
    }

    #[test]
    fn test_resolve_landing() {
        // Player sunk 5px into the top of a wide block
        let player = Aabb::new(80.0, 65.0, 40.0, 40.0);
        assert_eq!(resolve(&player, &block()), Side::Top);
    }

    #[test]
    fn test_resolve_head_bump() {
        let player = Aabb::new(80.0, 143.0, 40.0, 40.0);
        assert_eq!(resolve(&player, &block()), Side::Bottom);
    }

    #[test]
    fn test_resolve_walls() {
        let wall = Aabb::new(100.0, 0.0, 48.0, 200.0);
        let from_left = Aabb::new(65.0, 80.0, 40.0, 40.0);
        assert_eq!(resolve(&from_left, &wall), Side::Left);
        let from_right = Aabb::new(143.0, 80.0, 40.0, 40.0);
        assert_eq!(resolve(&from_right, &wall), Side::Right);
    }

    #[test]
    fn test_resolve_disjoint_is_none() {
        let player = Aabb::new(500.0, 0.0, 40.0, 40.0);
        assert_eq!(resolve(&player, &block()), Side::None);
    }

    #[test]
    fn test_resolve_exact_diagonal_prefers_horizontal() {
        // Two 40x40 boxes, offset along the exact diagonal
        let obstacle = Aabb::new(0.0, 0.0, 40.0, 40.0);
        let up_right = Aabb::new(30.0, -30.0, 40.0, 40.0);
        assert_eq!(resolve(&up_right, &obstacle), Side::Right);
        let up_left = Aabb::new(-30.0, -30.0, 40.0, 40.0);
        assert_eq!(resolve(&up_left, &obstacle), Side::Left);
        let down_right = Aabb::new(30.0, 30.0, 40.0, 40.0);
        assert_eq!(resolve(&down_right, &obstacle), Side::Right);

        // Nudged off the diagonal, the vertical axis takes over
        let mostly_above = Aabb::new(30.0, -30.5, 40.0, 40.0);
        assert_eq!(resolve(&mostly_above, &obstacle), Side::Top);
    }

    #[test]
    fn test_resolve_coincident_centers() {
        let a = Aabb::new(0.0, 0.0, 40.0, 40.0);
        assert_eq!(resolve(&a, &a), Side::Left);
    }

    #[test]
    fn test_near_margin() {
        let a = Aabb::new(0.0, 0.0, 10.0, 10.0);
        let b = Aabb::new(105.0, 0.0, 10.0, 10.0);
        assert!(a.near(&b, 100.0));
        assert!(!a.near(&b, 90.0));
    }

    fn arb_box() -> impl Strategy<Value = Aabb> {
        (-500.0f32..500.0, -500.0f32..500.0, 1.0f32..200.0, 1.0f32..200.0)
            .prop_map(|(x, y, w, h)| Aabb::new(x, y, w, h))
    }

    proptest! {
        #[test]
        fn overlap_is_symmetric(a in arb_box(), b in arb_box()) {
            prop_assert_eq!(overlaps(&a, &b), overlaps(&b, &a));
        }

        #[test]
        fn overlapping_boxes_always_resolve(a in arb_box(), b in arb_box()) {
            if overlaps(&a, &b) {
                prop_assert_ne!(resolve(&a, &b), Side::None);
            }
        }

        #[test]
        fn resolved_side_matches_offset_direction(a in arb_box(), b in arb_box()) {
            let d = a.center() - b.center();
            match resolve(&a, &b) {
                Side::Top => prop_assert!(d.y <= 0.0),
                Side::Bottom => prop_assert!(d.y > 0.0),
                Side::Left => prop_assert!(d.x <= 0.0),
                Side::Right => prop_assert!(d.x > 0.0),
                Side::None => {}
            }
        }

        #[test]
        fn resolved_side_is_the_shallower_axis(a in arb_box(), b in arb_box()) {
            // Penetration depth normalised by combined extent on each axis
            let d = a.center() - b.center();
            let half_w = (a.size.x + b.size.x) / 2.0;
            let half_h = (a.size.y + b.size.y) / 2.0;
            let slack_x = (half_w - d.x.abs()) / half_w;
            let slack_y = (half_h - d.y.abs()) / half_h;
            match resolve(&a, &b) {
                Side::Top | Side::Bottom => prop_assert!(slack_y <= slack_x + 1e-4),
                Side::Left | Side::Right => prop_assert!(slack_x <= slack_y + 1e-4),
                Side::None => {}
            }
        }
    }
}
