use glam::DVec2;

use crate::api::NarrowphaseApi;

/// Convex-polygon primitive tests.
pub struct Narrowphase;

impl Narrowphase {
    /// Projection interval of `poly` onto `axis`.
    fn project(poly: &[DVec2], axis: DVec2) -> (f64, f64) {
        let mut lo = f64::INFINITY;
        let mut hi = f64::NEG_INFINITY;
        for p in poly {
            let d = p.dot(axis);
            lo = lo.min(d);
            hi = hi.max(d);
        }
        (lo, hi)
    }

    /// Distance one interval must move to clear the other; `<= 0` when disjoint or touching.
    fn penetration(a_lo: f64, a_hi: f64, b_lo: f64, b_hi: f64) -> f64 {
        (a_hi - b_lo).min(b_hi - a_lo)
    }

    /// True when the two point sets are separated (or only touching) along `axis`.
    fn separated_on(a: &[DVec2], b: &[DVec2], axis: DVec2, eps: f64) -> bool {
        let len = axis.length();
        if len == 0.0 {
            return false;
        }
        let axis = axis / len;
        let (a_lo, a_hi) = Self::project(a, axis);
        let (b_lo, b_hi) = Self::project(b, axis);
        Self::penetration(a_lo, a_hi, b_lo, b_hi) <= eps
    }
}

impl NarrowphaseApi for Narrowphase {
    fn point_in_convex_polygon(p: DVec2, poly: &[DVec2], eps: f64) -> bool {
        if poly.len() < 3 {
            return false;
        }
        // Signed distance to every edge must share one sign and clear eps.
        let mut sign = 0.0;
        for (i, &a) in poly.iter().enumerate() {
            let b = poly[(i + 1) % poly.len()];
            let e = b - a;
            let len = e.length();
            if len == 0.0 {
                return false;
            }
            let dist = e.perp_dot(p - a) / len;
            if dist.abs() <= eps {
                return false;
            }
            if sign == 0.0 {
                sign = dist.signum();
            } else if dist.signum() != sign {
                return false;
            }
        }
        true
    }

    fn segment_polygon_overlap(a: DVec2, b: DVec2, poly: &[DVec2], eps: f64) -> bool {
        if poly.len() < 3 {
            return false;
        }
        let seg = [a, b];
        for (i, &p0) in poly.iter().enumerate() {
            let p1 = poly[(i + 1) % poly.len()];
            if Self::separated_on(&seg, poly, (p1 - p0).perp(), eps) {
                return false;
            }
        }
        let d = b - a;
        if d.length_squared() > 0.0 && Self::separated_on(&seg, poly, d.perp(), eps) {
            return false;
        }
        true
    }

    fn overlap_aabb_aabb(min0: DVec2, max0: DVec2, min1: DVec2, max1: DVec2, eps: f64) -> bool {
        Self::penetration(min0.x, max0.x, min1.x, max1.x) > eps
            && Self::penetration(min0.y, max0.y, min1.y, max1.y) > eps
    }
}
