//! Narrow-phase separation of an axis-aligned body from one isometric tile.
//!
//! Case selection ([`classify`]) and correction math ([`correction`]) are
//! separate steps; [`separate`] runs both and [`separate_body`] also writes
//! the corrected position back.
//!
//! Cases, first match wins:
//! 1. bottom-left corner inside: slide onto the top/right edge,
//! 2. top-left corner inside: slide onto the right/bottom edge,
//! 3. bottom-right corner inside: slide onto the left/top edge,
//! 4. top-right corner inside: slide onto the bottom/left edge,
//! 5. no corner inside: every body side crossing the diamond pushes the body
//!    out along its own axis to the diamond's far vertex.
//!
//! Each penetrated edge is parallel to the diamond edge opposite it, so the
//! slope used in cases 1-4 is the same whichever of the pair it is read from.

use glam::DVec2;
use tracing::trace;

use crate::api::{BodyApi, NarrowphaseApi};
use crate::narrowphase::Narrowphase;
use crate::projection::IsoProjection;
use crate::types::*;

/// Which resolver case applies to `body` against `poly`.
pub fn classify(body: &BodyRect, poly: &TilePolygon, cfg: &IsoConfig) -> SeparationOutcome {
    if poly.is_degenerate() || !body.position.is_finite() || !body.size.is_finite() {
        return SeparationOutcome::None;
    }
    let eps = cfg.contact_eps;
    let (pmin, pmax) = poly.bounds();
    if !Narrowphase::overlap_aabb_aabb(body.min(), body.max(), pmin, pmax, eps) {
        return SeparationOutcome::None;
    }

    let points = poly.points();
    for corner in Corner::PRIORITY {
        if Narrowphase::point_in_convex_polygon(body.corner(corner), &points, eps) {
            return SeparationOutcome::Corner(corner);
        }
    }

    let sides: SideSet = Side::ALL
        .into_iter()
        .filter(|&side| {
            let (a, b) = body.side(side);
            Narrowphase::segment_polygon_overlap(a, b, &points, eps)
        })
        .collect();
    if sides.is_empty() {
        SeparationOutcome::None
    } else {
        SeparationOutcome::Edges(sides)
    }
}

/// Position delta that resolves `outcome`, computed from the uncorrected `body`.
pub fn correction(outcome: SeparationOutcome, body: &BodyRect, poly: &TilePolygon) -> DVec2 {
    match outcome {
        SeparationOutcome::None => DVec2::ZERO,
        SeparationOutcome::Corner(corner) => {
            let (a, b) = penetrated_edge(corner, poly);
            project_onto_line(body.corner(corner), a, b)
        }
        SeparationOutcome::Edges(sides) => sides
            .iter()
            .map(|side| side_push(side, body, poly))
            .fold(DVec2::ZERO, |acc, d| acc + d),
    }
}

/// Classify and compute the correction in one step.
pub fn separate(body: &BodyRect, poly: &TilePolygon, cfg: &IsoConfig) -> Separation {
    let outcome = classify(body, poly, cfg);
    let delta = correction(outcome, body, poly);
    if !matches!(outcome, SeparationOutcome::None) {
        trace!("separation {:?} against tile at {:?}: delta {:?}", outcome, poly.top, delta);
    }
    Separation { outcome, delta }
}

/// Separate `body` from `poly` and move it. Returns whether any case fired.
pub fn separate_body<B: BodyApi + ?Sized>(
    body: &mut B,
    poly: &TilePolygon,
    cfg: &IsoConfig,
) -> bool {
    let sep = separate(&body.rect(), poly, cfg);
    if sep.collided() {
        body.set_position(body.position() + sep.delta);
    }
    sep.collided()
}

/// Separate `body` from the diamond of `tile` as placed by `projection`.
pub fn separate_tile<B: BodyApi + ?Sized>(
    body: &mut B,
    tile: &Tile,
    projection: &IsoProjection,
    cfg: &IsoConfig,
) -> bool {
    let poly = projection.tile_corners(tile.x as i64, tile.y as i64);
    separate_body(body, &poly, cfg)
}

/// Edge a corner has pushed through, as an ordered vertex pair.
fn penetrated_edge(corner: Corner, poly: &TilePolygon) -> (DVec2, DVec2) {
    match corner {
        Corner::BottomLeft => (poly.top, poly.right),
        Corner::TopLeft => (poly.right, poly.bottom),
        Corner::BottomRight => (poly.left, poly.top),
        Corner::TopRight => (poly.bottom, poly.left),
    }
}

/// Perpendicular offset moving `p` onto the line through `a` and `b`.
fn project_onto_line(p: DVec2, a: DVec2, b: DVec2) -> DVec2 {
    let n = (b - a).perp();
    let nn = n.length_squared();
    if nn == 0.0 {
        return DVec2::ZERO;
    }
    -n * ((p - a).dot(n) / nn)
}

fn side_push(side: Side, body: &BodyRect, poly: &TilePolygon) -> DVec2 {
    let (min, max) = (body.min(), body.max());
    match side {
        Side::Left => DVec2::new(poly.right.x - min.x, 0.0),
        Side::Right => DVec2::new(poly.left.x - max.x, 0.0),
        Side::Top => DVec2::new(0.0, poly.bottom.y - min.y),
        Side::Bottom => DVec2::new(0.0, poly.top.y - max.y),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    /// Tile (5, 5) of a 10x10 layer with 64x32 tiles:
    /// top (320,160), right (352,176), bottom (320,192), left (288,176).
    fn tile_55() -> TilePolygon {
        IsoProjection::new(10, 10, 64.0, 32.0).tile_corners(5, 5)
    }

    fn cfg() -> IsoConfig {
        IsoConfig::default()
    }

    /// Distance of `p` from the infinite line through `a` and `b`.
    fn line_distance(p: DVec2, a: DVec2, b: DVec2) -> f64 {
        let e = b - a;
        e.perp_dot(p - a).abs() / e.length()
    }

    fn apply(body: &BodyRect) -> (Separation, BodyRect) {
        let sep = separate(body, &tile_55(), &cfg());
        let mut moved = *body;
        moved.position += sep.delta;
        (sep, moved)
    }

    #[test]
    fn test_bottom_left_corner_lands_on_edge() {
        let poly = tile_55();
        let body = BodyRect::new(330.0, 152.0, 10.0, 20.0);
        let (sep, moved) = apply(&body);
        assert_eq!(sep.outcome, SeparationOutcome::Corner(Corner::BottomLeft));
        assert_abs_diff_eq!(sep.delta.x, 2.8, epsilon = 1e-9);
        assert_abs_diff_eq!(sep.delta.y, -5.6, epsilon = 1e-9);
        let c = moved.corner(Corner::BottomLeft);
        assert!(line_distance(c, poly.top, poly.right) < 1e-9);
        // Same slope as the left/bottom edge.
        let s1 = (poly.right - poly.top).y / (poly.right - poly.top).x;
        let s2 = (poly.bottom - poly.left).y / (poly.bottom - poly.left).x;
        assert_abs_diff_eq!(s1, s2, epsilon = 1e-12);
        assert_eq!(moved.size, body.size);
    }

    #[test]
    fn test_top_left_corner() {
        let poly = tile_55();
        let (sep, moved) = apply(&BodyRect::new(336.0, 182.0, 10.0, 20.0));
        assert_eq!(sep.outcome, SeparationOutcome::Corner(Corner::TopLeft));
        assert_abs_diff_eq!(sep.delta.x, 0.8, epsilon = 1e-9);
        assert_abs_diff_eq!(sep.delta.y, 1.6, epsilon = 1e-9);
        assert!(line_distance(moved.corner(Corner::TopLeft), poly.right, poly.bottom) < 1e-9);
    }

    #[test]
    fn test_bottom_right_corner() {
        let poly = tile_55();
        let (sep, moved) = apply(&BodyRect::new(294.0, 150.0, 10.0, 20.0));
        assert_eq!(sep.outcome, SeparationOutcome::Corner(Corner::BottomRight));
        assert_abs_diff_eq!(sep.delta.x, -0.8, epsilon = 1e-9);
        assert_abs_diff_eq!(sep.delta.y, -1.6, epsilon = 1e-9);
        assert!(line_distance(moved.corner(Corner::BottomRight), poly.left, poly.top) < 1e-9);
    }

    #[test]
    fn test_top_right_corner() {
        let poly = tile_55();
        let (sep, moved) = apply(&BodyRect::new(290.0, 180.0, 10.0, 20.0));
        assert_eq!(sep.outcome, SeparationOutcome::Corner(Corner::TopRight));
        assert_abs_diff_eq!(sep.delta.x, -0.8, epsilon = 1e-9);
        assert_abs_diff_eq!(sep.delta.y, 1.6, epsilon = 1e-9);
        assert!(line_distance(moved.corner(Corner::TopRight), poly.bottom, poly.left) < 1e-9);
    }

    #[test]
    fn test_corner_priority_prefers_bottom_left() {
        // Both bottom corners sit inside; bottom-left wins.
        let body = BodyRect::new(330.0, 152.0, 10.0, 20.0);
        let poly = tile_55();
        assert!(Narrowphase::point_in_convex_polygon(
            body.corner(Corner::BottomRight),
            &poly.points(),
            1e-9
        ));
        assert_eq!(
            classify(&body, &poly, &cfg()),
            SeparationOutcome::Corner(Corner::BottomLeft)
        );
    }

    #[test]
    fn test_corner_inside_never_falls_back_to_edges() {
        let poly = tile_55();
        let bodies = [
            BodyRect::new(330.0, 152.0, 10.0, 20.0),
            BodyRect::new(336.0, 182.0, 10.0, 20.0),
            BodyRect::new(294.0, 150.0, 10.0, 20.0),
            BodyRect::new(290.0, 180.0, 10.0, 20.0),
            // Small body entirely inside the diamond.
            BodyRect::new(316.0, 172.0, 8.0, 8.0),
        ];
        for body in bodies {
            let outcome = classify(&body, &poly, &cfg());
            assert!(matches!(outcome, SeparationOutcome::Corner(_)), "{body:?} -> {outcome:?}");
        }
    }

    #[test]
    fn test_left_side_push() {
        let (sep, moved) = apply(&BodyRect::new(340.0, 150.0, 30.0, 60.0));
        let expected: SideSet = [Side::Left].into_iter().collect();
        assert_eq!(sep.outcome, SeparationOutcome::Edges(expected));
        assert_eq!(sep.delta, DVec2::new(12.0, 0.0));
        assert_eq!(moved.position.x, 352.0);
    }

    #[test]
    fn test_right_side_push() {
        let (sep, _) = apply(&BodyRect::new(250.0, 150.0, 40.0, 60.0));
        let expected: SideSet = [Side::Right].into_iter().collect();
        assert_eq!(sep.outcome, SeparationOutcome::Edges(expected));
        assert_eq!(sep.delta, DVec2::new(-2.0, 0.0));
    }

    #[test]
    fn test_top_side_push() {
        let (sep, _) = apply(&BodyRect::new(290.0, 180.0, 60.0, 40.0));
        let expected: SideSet = [Side::Top].into_iter().collect();
        assert_eq!(sep.outcome, SeparationOutcome::Edges(expected));
        assert_eq!(sep.delta, DVec2::new(0.0, 12.0));
    }

    #[test]
    fn test_bottom_side_push() {
        let (sep, _) = apply(&BodyRect::new(290.0, 100.0, 60.0, 70.0));
        let expected: SideSet = [Side::Bottom].into_iter().collect();
        assert_eq!(sep.outcome, SeparationOutcome::Edges(expected));
        assert_eq!(sep.delta, DVec2::new(0.0, -10.0));
    }

    #[test]
    fn test_two_sides_push_both_axes() {
        let (sep, _) = apply(&BodyRect::new(300.0, 165.0, 100.0, 100.0));
        let expected: SideSet = [Side::Left, Side::Top].into_iter().collect();
        assert_eq!(sep.outcome, SeparationOutcome::Edges(expected));
        assert_eq!(sep.delta, DVec2::new(52.0, 27.0));
    }

    #[test]
    fn test_single_application_is_enough() {
        let bodies = [
            BodyRect::new(330.0, 152.0, 10.0, 20.0),
            BodyRect::new(336.0, 182.0, 10.0, 20.0),
            BodyRect::new(294.0, 150.0, 10.0, 20.0),
            BodyRect::new(290.0, 180.0, 10.0, 20.0),
            BodyRect::new(340.0, 150.0, 30.0, 60.0),
            BodyRect::new(250.0, 150.0, 40.0, 60.0),
            BodyRect::new(290.0, 180.0, 60.0, 40.0),
            BodyRect::new(290.0, 100.0, 60.0, 70.0),
        ];
        let poly = tile_55();
        for body in bodies {
            let mut b = body;
            assert!(separate_body(&mut b, &poly, &cfg()), "{body:?}");
            assert!(!separate_body(&mut b, &poly, &cfg()), "{body:?} still collides at {b:?}");
        }
    }

    #[test]
    fn test_no_overlap_is_noop() {
        let mut body = BodyRect::new(0.0, 0.0, 10.0, 10.0);
        let sep = separate(&body, &tile_55(), &cfg());
        assert_eq!(sep, Separation::NONE);
        assert!(!separate_body(&mut body, &tile_55(), &cfg()));
        assert_eq!(body.position, DVec2::ZERO);
    }

    #[test]
    fn test_body_touching_vertex_does_not_collide() {
        // Left side flush with the right vertex.
        let body = BodyRect::new(352.0, 150.0, 30.0, 60.0);
        assert_eq!(classify(&body, &tile_55(), &cfg()), SeparationOutcome::None);
    }

    #[test]
    fn test_degenerate_tile_never_collides() {
        let flat = IsoProjection::new(10, 10, 64.0, 0.0).tile_corners(5, 5);
        let thin = IsoProjection::new(10, 10, 0.0, 32.0).tile_corners(5, 5);
        let body = BodyRect::new(300.0, 150.0, 40.0, 40.0);
        for poly in [flat, thin] {
            let sep = separate(&body, &poly, &cfg());
            assert_eq!(sep, Separation::NONE);
            assert!(sep.delta.is_finite());
        }
    }

    #[test]
    fn test_separate_tile_uses_projection() {
        let projection = IsoProjection::new(10, 10, 64.0, 32.0);
        let mut tile = Tile::new(5, 5, 3);
        tile.collides = true;
        let mut body = BodyRect::new(330.0, 152.0, 10.0, 20.0);
        assert!(separate_tile(&mut body, &tile, &projection, &cfg()));
        assert_abs_diff_eq!(body.position.x, 332.8, epsilon = 1e-9);
        assert_abs_diff_eq!(body.position.y, 146.4, epsilon = 1e-9);
    }

    #[test]
    fn test_correction_is_independent_of_classification() {
        let body = BodyRect::new(300.0, 165.0, 100.0, 100.0);
        let only_left: SideSet = [Side::Left].into_iter().collect();
        let d = correction(SeparationOutcome::Edges(only_left), &body, &tile_55());
        assert_eq!(d, DVec2::new(52.0, 0.0));
        assert_eq!(correction(SeparationOutcome::None, &body, &tile_55()), DVec2::ZERO);
    }
}
