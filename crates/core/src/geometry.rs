//! Normalized arc geometry and its mapping to pixels.
//!
//! Angles are radians in `[0, 2π]`. Radii are ring indices: a node at depth
//! `d` occupies the band `[d, d + 1]` before any zoom is applied.

use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, TAU};

use crate::config::ViewConfig;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ArcGeometry {
    /// Angular start.
    pub x0: f64,
    /// Angular end.
    pub x1: f64,
    /// Inner ring index.
    pub y0: f64,
    /// Outer ring index.
    pub y1: f64,
}

impl ArcGeometry {
    pub const fn new(x0: f64, x1: f64, y0: f64, y1: f64) -> Self {
        Self { x0, x1, y0, y1 }
    }

    pub fn angular_span(&self) -> f64 {
        self.x1 - self.x0
    }

    pub fn radial_span(&self) -> f64 {
        self.y1 - self.y0
    }

    /// Geometry of `self` re-expressed in the reference frame of `focus`:
    /// the focus span is stretched to the full circle and its ring becomes
    /// the centre.
    pub fn relative_to(&self, focus: &ArcGeometry, focus_depth: f64) -> ArcGeometry {
        let span = focus.angular_span();
        let rescale = |x: f64| {
            let t = if span > 0.0 { (x - focus.x0) / span } else { 0.0 };
            t.clamp(0.0, 1.0) * TAU
        };
        ArcGeometry {
            x0: rescale(self.x0),
            x1: rescale(self.x1),
            y0: (self.y0 - focus_depth).max(0.0),
            y1: (self.y1 - focus_depth).max(0.0),
        }
    }

    pub fn approx_eq(&self, other: &ArcGeometry, eps: f64) -> bool {
        (self.x0 - other.x0).abs() <= eps
            && (self.x1 - other.x1).abs() <= eps
            && (self.y0 - other.y0).abs() <= eps
            && (self.y1 - other.y1).abs() <= eps
    }
}

/// Componentwise interpolation between two snapshots, `t` in `[0, 1]`.
pub fn lerp(from: &ArcGeometry, to: &ArcGeometry, t: f64) -> ArcGeometry {
    let t = t.clamp(0.0, 1.0);
    let mix = |a: f64, b: f64| a + (b - a) * t;
    ArcGeometry {
        x0: mix(from.x0, to.x0),
        x1: mix(from.x1, to.x1),
        y0: mix(from.y0, to.y0),
        y1: mix(from.y1, to.y1),
    }
}

/// Whether an arc lies inside the ring window around the focus.
pub fn arc_visible(g: &ArcGeometry, cfg: &ViewConfig) -> bool {
    g.y1 <= cfg.ring_window as f64 && g.y0 >= cfg.inner_ring as f64 && g.x1 > g.x0
}

/// Labels need the ring window and enough area to be legible. The
/// threshold is exclusive.
pub fn label_visible(g: &ArcGeometry, cfg: &ViewConfig) -> bool {
    arc_visible(g, cfg) && g.angular_span() * g.radial_span() > cfg.label_threshold
}

/// Pixel-space shape of one arc.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ArcShape {
    pub start_angle: f64,
    pub end_angle: f64,
    pub inner_radius: f64,
    pub outer_radius: f64,
    pub pad_angle: f64,
}

impl ArcShape {
    pub fn from_geometry(g: &ArcGeometry, unit: f64, cfg: &ViewConfig) -> Self {
        let inner = g.y0 * unit;
        Self {
            start_angle: g.x0,
            end_angle: g.x1,
            inner_radius: inner,
            outer_radius: inner.max(g.y1 * unit - cfg.band_inset_px),
            pad_angle: (g.angular_span() / 2.0).min(cfg.max_pad_angle),
        }
    }

    /// Start and end angles after the pad is split between both edges.
    pub fn padded_angles(&self) -> (f64, f64) {
        let half = self.pad_angle / 2.0;
        let (a0, a1) = (self.start_angle + half, self.end_angle - half);
        if a1 > a0 {
            (a0, a1)
        } else {
            let mid = (self.start_angle + self.end_angle) / 2.0;
            (mid, mid)
        }
    }

    /// Outline of the annular sector in canvas coordinates centred on the
    /// origin, y pointing down, angle 0 at twelve o'clock.
    pub fn outline(&self, segments_per_radian: f64) -> Vec<(f64, f64)> {
        let (a0, a1) = self.padded_angles();
        let steps = (((a1 - a0) * segments_per_radian).ceil() as usize).max(1);
        let mut points = Vec::with_capacity(2 * (steps + 1));
        for i in 0..=steps {
            let a = a0 + (a1 - a0) * i as f64 / steps as f64;
            points.push(polar(self.outer_radius, a));
        }
        for i in (0..=steps).rev() {
            let a = a0 + (a1 - a0) * i as f64 / steps as f64;
            points.push(polar(self.inner_radius, a));
        }
        points
    }

    pub fn contains_polar(&self, radius: f64, angle: f64) -> bool {
        radius >= self.inner_radius
            && radius <= self.outer_radius
            && angle >= self.start_angle
            && angle < self.end_angle
    }
}

/// Where to anchor an arc's label: the midpoint of its angular span at the
/// middle of its band.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LabelAnchor {
    pub x: f64,
    pub y: f64,
    /// Text rotation in degrees, flipped on the left half so text is never
    /// upside down.
    pub rotation_deg: f64,
}

impl LabelAnchor {
    pub fn for_geometry(g: &ArcGeometry, unit: f64) -> Self {
        let angle = (g.x0 + g.x1) / 2.0;
        let radius = (g.y0 + g.y1) / 2.0 * unit;
        let (x, y) = polar(radius, angle);
        let deg = angle.to_degrees();
        let rotation_deg = (deg - 90.0) + if deg < 180.0 { 0.0 } else { 180.0 };
        Self { x, y, rotation_deg }
    }
}

pub fn polar(radius: f64, angle: f64) -> (f64, f64) {
    let a = angle - FRAC_PI_2;
    (radius * a.cos(), radius * a.sin())
}

/// Inverse of [`polar`]: returns `(radius, angle)` with the angle in
/// `[0, 2π)`.
pub fn to_polar(x: f64, y: f64) -> (f64, f64) {
    let radius = (x * x + y * y).sqrt();
    let angle = (y.atan2(x) + FRAC_PI_2).rem_euclid(TAU);
    (radius, angle)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f64::consts::PI;

    #[test]
    fn lerp_endpoints() {
        let a = ArcGeometry::new(0.0, 1.0, 1.0, 2.0);
        let b = ArcGeometry::new(1.0, 3.0, 0.0, 1.0);
        assert_eq!(lerp(&a, &b, 0.0), a);
        assert_eq!(lerp(&a, &b, 1.0), b);
        assert_eq!(lerp(&a, &b, 0.5), ArcGeometry::new(0.5, 2.0, 0.5, 1.5));
        assert_eq!(lerp(&a, &b, 7.0), b);
    }

    #[test]
    fn relative_to_clamps_outside_nodes() {
        let focus = ArcGeometry::new(0.0, PI, 1.0, 2.0);
        let outside = ArcGeometry::new(1.5 * PI, 2.0 * PI, 1.0, 2.0);
        let r = outside.relative_to(&focus, 1.0);
        assert_eq!(r.x0, TAU);
        assert_eq!(r.x1, TAU);
        assert_eq!((r.y0, r.y1), (0.0, 1.0));
        let inside = ArcGeometry::new(0.0, PI / 2.0, 2.0, 3.0).relative_to(&focus, 1.0);
        assert!(inside.approx_eq(&ArcGeometry::new(0.0, PI, 1.0, 2.0), 1e-12));
    }

    #[test]
    fn ring_window() {
        let cfg = ViewConfig::default();
        assert!(arc_visible(&ArcGeometry::new(0.0, 1.0, 1.0, 2.0), &cfg));
        assert!(arc_visible(&ArcGeometry::new(0.0, 1.0, 2.0, 3.0), &cfg));
        assert!(!arc_visible(&ArcGeometry::new(0.0, 1.0, 3.0, 4.0), &cfg));
        assert!(!arc_visible(&ArcGeometry::new(0.0, 1.0, 0.0, 1.0), &cfg));
        assert!(!arc_visible(&ArcGeometry::new(1.0, 1.0, 1.0, 2.0), &cfg));
    }

    #[test]
    fn label_threshold_is_exclusive() {
        let cfg = ViewConfig::default();
        let at = ArcGeometry::new(0.0, 0.03, 1.0, 2.0);
        assert_eq!(at.angular_span() * at.radial_span(), 0.03);
        assert!(arc_visible(&at, &cfg));
        assert!(!label_visible(&at, &cfg));
        assert!(label_visible(&ArcGeometry::new(0.0, 0.031, 1.0, 2.0), &cfg));
    }

    #[test]
    fn shape_insets_outer_edge_and_caps_pad() {
        let cfg = ViewConfig::default();
        let s = ArcShape::from_geometry(&ArcGeometry::new(0.0, 1.0, 1.0, 2.0), 100.0, &cfg);
        assert_eq!(s.inner_radius, 100.0);
        assert_eq!(s.outer_radius, 199.0);
        assert_eq!(s.pad_angle, 0.005);
        let thin = ArcShape::from_geometry(&ArcGeometry::new(0.0, 0.004, 1.0, 1.0), 100.0, &cfg);
        assert_eq!(thin.pad_angle, 0.002);
        assert_eq!(thin.outer_radius, thin.inner_radius);
    }

    #[test]
    fn polar_round_trip() {
        let (x, y) = polar(10.0, PI / 2.0);
        assert!((x - 10.0).abs() < 1e-9 && y.abs() < 1e-9);
        let (r, a) = to_polar(x, y);
        assert!((r - 10.0).abs() < 1e-9);
        assert!((a - PI / 2.0).abs() < 1e-9);
        let (_, top) = to_polar(0.0, -5.0);
        assert!(top.abs() < 1e-9);
    }

    #[test]
    fn label_rotation_flips_on_left_half() {
        let right = LabelAnchor::for_geometry(&ArcGeometry::new(0.0, PI / 2.0, 1.0, 2.0), 10.0);
        assert!((right.rotation_deg - (45.0 - 90.0)).abs() < 1e-9);
        let left = LabelAnchor::for_geometry(&ArcGeometry::new(PI, 2.0 * PI, 1.0, 2.0), 10.0);
        assert!((left.rotation_deg - (270.0 - 90.0 + 180.0)).abs() < 1e-9);
    }
}
