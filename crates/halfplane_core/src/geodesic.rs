//! Hyperbolic geodesics in the upper half-plane, traced as polylines.
//!
//! A geodesic between two points is either a vertical line (equal real parts,
//! or an endpoint at ∞) or an arc of a circle centred on the real axis.

use crate::cosets::CosetRepresentativeSet;
use crate::domain::FundamentalDomain;
use crate::error::{ModularError, Result};
use crate::moebius::MoebiusTransformation;
use crate::plane::{polar_angle, ExtendedComplex};
use num_complex::Complex64;
use serde::{Deserialize, Serialize};
use std::f64::consts::{PI, TAU};
use std::iter::FusedIterator;

/// Real parts closer than this are treated as a vertical geodesic.
pub const VERTICAL_TOLERANCE: f64 = 1e-10;

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct GeodesicSettings {
    /// Straight pieces per circular arc; vertical lines always use one.
    pub segments: usize,
}

impl Default for GeodesicSettings {
    fn default() -> Self {
        Self { segments: 15 }
    }
}

/// `segments + 1` points on a Euclidean circle, evenly spaced in angle.
#[derive(Debug, Clone)]
pub struct CircleArc {
    center: Complex64,
    radius: f64,
    start_angle: f64,
    step: f64,
    next: usize,
    segments: usize,
}

impl CircleArc {
    pub fn new(
        radius: f64,
        center: Complex64,
        start_angle: f64,
        stop_angle: f64,
        segments: usize,
    ) -> Result<Self> {
        if segments == 0 {
            return Err(ModularError::InvalidArgument(
                "segments must be greater than zero".into(),
            ));
        }
        Ok(Self {
            center,
            radius,
            start_angle,
            step: (stop_angle - start_angle) / segments as f64,
            next: 0,
            segments,
        })
    }
}

impl Iterator for CircleArc {
    type Item = ExtendedComplex;

    fn next(&mut self) -> Option<Self::Item> {
        if self.next > self.segments {
            return None;
        }
        let theta = self.start_angle + self.next as f64 * self.step;
        self.next += 1;
        Some(ExtendedComplex::Finite(
            self.center + Complex64::from_polar(self.radius, theta),
        ))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.segments + 1).saturating_sub(self.next);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for CircleArc {}
impl FusedIterator for CircleArc {}

/// Lazy point sequence along one geodesic; consumed once.
#[derive(Debug, Clone)]
pub struct Geodesic {
    inner: GeodesicPath,
}

#[derive(Debug, Clone)]
enum GeodesicPath {
    Vertical(std::array::IntoIter<ExtendedComplex, 2>),
    Arc(CircleArc),
}

impl Geodesic {
    /// True when the geodesic is drawn as a single straight segment.
    pub fn is_vertical(&self) -> bool {
        matches!(self.inner, GeodesicPath::Vertical(_))
    }
}

impl Iterator for Geodesic {
    type Item = ExtendedComplex;

    fn next(&mut self) -> Option<Self::Item> {
        match &mut self.inner {
            GeodesicPath::Vertical(points) => points.next(),
            GeodesicPath::Arc(arc) => arc.next(),
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        match &self.inner {
            GeodesicPath::Vertical(points) => points.size_hint(),
            GeodesicPath::Arc(arc) => arc.size_hint(),
        }
    }
}

impl ExactSizeIterator for Geodesic {}
impl FusedIterator for Geodesic {}

/// Traces the geodesic from `from` to `to`.
///
/// Vertical geodesics yield exactly `[from, to]`; arcs yield `segments + 1`
/// points from `from` to `to`.
pub fn trace_geodesic(
    from: ExtendedComplex,
    to: ExtendedComplex,
    segments: usize,
) -> Result<Geodesic> {
    if segments == 0 {
        return Err(ModularError::InvalidArgument(
            "segments must be greater than zero".into(),
        ));
    }

    let (f, t) = match (from.as_finite(), to.as_finite()) {
        (Some(f), Some(t)) if (f.re - t.re).abs() >= VERTICAL_TOLERANCE => (f, t),
        _ => {
            return Ok(Geodesic {
                inner: GeodesicPath::Vertical([from, to].into_iter()),
            })
        }
    };

    let center = Complex64::new((f.norm_sqr() - t.norm_sqr()) / 2.0 / (f.re - t.re), 0.0);
    let cf = f - center;
    let ct = t - center;
    let (start, stop) = continuous_angles(polar_angle(cf), polar_angle(ct));

    Ok(Geodesic {
        inner: GeodesicPath::Arc(CircleArc::new(cf.norm(), center, start, stop, segments)?),
    })
}

/// Moves one angle by a full turn when the pair straddles the branch cut, so
/// that interpolating between them sweeps the short way round.
fn continuous_angles(start: f64, stop: f64) -> (f64, f64) {
    if stop - start > PI {
        (start + TAU, stop)
    } else if start - stop > PI {
        (start, stop + TAU)
    } else {
        (start, stop)
    }
}

/// Boundary of `transform` applied to `domain`: the images of consecutive
/// vertices joined by geodesics, closing back to the first vertex.
pub fn trace_domain_outline(
    domain: &FundamentalDomain,
    transform: &MoebiusTransformation,
    settings: &GeodesicSettings,
) -> Result<Vec<ExtendedComplex>> {
    let corners: Vec<ExtendedComplex> = domain
        .vertices()
        .iter()
        .map(|&v| transform.act(v))
        .collect();
    if corners.len() < 3 {
        return Err(ModularError::InvalidArgument(format!(
            "a domain needs at least 3 vertices, got {}",
            corners.len()
        )));
    }

    let mut outline = Vec::new();
    for (i, &from) in corners.iter().enumerate() {
        let to = corners[(i + 1) % corners.len()];
        outline.extend(trace_geodesic(from, to, settings.segments)?);
    }
    Ok(outline)
}

/// One outline per coset representative, in the order of the set.
pub fn trace_coset_outlines(
    cosets: &CosetRepresentativeSet,
    domain: &FundamentalDomain,
    settings: &GeodesicSettings,
) -> Result<Vec<Vec<ExtendedComplex>>> {
    cosets
        .iter()
        .map(|t| trace_domain_outline(domain, t, settings))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::subgroup::{CongruenceSubgroup, Level};

    fn point(p: ExtendedComplex) -> Complex64 {
        p.as_finite().expect("finite point")
    }

    #[test]
    fn equal_real_parts_give_a_segment() {
        let from = ExtendedComplex::finite(0.0, 1.0);
        let to = ExtendedComplex::finite(0.0, 2.0);
        let geodesic = trace_geodesic(from, to, 15).unwrap();
        assert!(geodesic.is_vertical());
        let points: Vec<_> = geodesic.collect();
        assert_eq!(points, vec![from, to]);
    }

    #[test]
    fn infinite_endpoint_gives_a_segment() {
        let from = ExtendedComplex::finite(0.5, 0.8);
        let points: Vec<_> = trace_geodesic(from, ExtendedComplex::Infinity, 15)
            .unwrap()
            .collect();
        assert_eq!(points, vec![from, ExtendedComplex::Infinity]);

        let points: Vec<_> = trace_geodesic(ExtendedComplex::Infinity, from, 15)
            .unwrap()
            .collect();
        assert_eq!(points, vec![ExtendedComplex::Infinity, from]);
    }

    #[test]
    fn arc_points_share_a_circle() {
        let from = ExtendedComplex::finite(-1.0, 1.0);
        let to = ExtendedComplex::finite(1.0, 1.0);
        let geodesic = trace_geodesic(from, to, 4).unwrap();
        assert_eq!(geodesic.len(), 5);
        let points: Vec<Complex64> = geodesic.map(point).collect();

        assert_eq!(points.len(), 5);
        for p in &points {
            assert!((p.norm() - 2f64.sqrt()).abs() < 1e-12, "{p} off circle");
            assert!(p.im > 0.0);
        }
        assert!((points[0] - Complex64::new(-1.0, 1.0)).norm() < 1e-12);
        assert!((points[4] - Complex64::new(1.0, 1.0)).norm() < 1e-12);
        assert!((points[2] - Complex64::new(0.0, 2f64.sqrt())).norm() < 1e-12);
    }

    #[test]
    fn arc_between_real_points_is_upper_semicircle() {
        let from = ExtendedComplex::finite(1.0, 0.0);
        let to = ExtendedComplex::finite(3.0, 0.0);
        let points: Vec<Complex64> = trace_geodesic(from, to, 8).unwrap().map(point).collect();
        assert_eq!(points.len(), 9);
        for p in &points {
            assert!(((p - Complex64::new(2.0, 0.0)).norm() - 1.0).abs() < 1e-12);
            assert!(p.im >= -1e-12);
        }
        assert!((points[4] - Complex64::new(2.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn arc_takes_short_way_across_branch_cut() {
        let from = ExtendedComplex::finite(1.0, -0.1);
        let to = ExtendedComplex::finite(0.0, 1.0);
        let points: Vec<Complex64> = trace_geodesic(from, to, 10).unwrap().map(point).collect();
        // the long way round would pass through Re z ≈ -1
        for p in &points {
            assert!(p.re >= -1e-9, "{p} swept the long way");
        }
        assert!((points[0] - Complex64::new(1.0, -0.1)).norm() < 1e-12);
        assert!((points[10] - Complex64::new(0.0, 1.0)).norm() < 1e-12);
    }

    #[test]
    fn zero_segments_is_rejected() {
        let from = ExtendedComplex::finite(-1.0, 1.0);
        let to = ExtendedComplex::finite(1.0, 1.0);
        assert!(matches!(
            trace_geodesic(from, to, 0),
            Err(ModularError::InvalidArgument(_))
        ));
    }

    #[test]
    fn circle_arc_requires_a_segment() {
        let err = CircleArc::new(1.0, Complex64::new(0.0, 0.0), 0.0, PI, 0)
            .expect_err("zero segments");
        assert!(matches!(err, ModularError::InvalidArgument(_)));

        let arc = CircleArc::new(1.0, Complex64::new(0.0, 0.0), 0.0, PI, 1).unwrap();
        let points: Vec<Complex64> = arc.map(point).collect();
        assert_eq!(points.len(), 2);
        assert!((points[0] - Complex64::new(1.0, 0.0)).norm() < 1e-12);
        assert!((points[1] - Complex64::new(-1.0, 0.0)).norm() < 1e-12);
    }

    #[test]
    fn geodesic_is_not_restartable() {
        let mut geodesic = trace_geodesic(
            ExtendedComplex::finite(-1.0, 1.0),
            ExtendedComplex::finite(1.0, 1.0),
            2,
        )
        .unwrap();
        assert_eq!(geodesic.by_ref().count(), 3);
        assert_eq!(geodesic.next(), None);
    }

    #[test]
    fn standard_domain_outline_closes() {
        let domain = FundamentalDomain::standard();
        let settings = GeodesicSettings::default();
        let outline =
            trace_domain_outline(domain, &MoebiusTransformation::identity(), &settings).unwrap();

        // two vertical sides of two points each, one arc of 16 points
        assert_eq!(outline.len(), 2 + 2 + 16);
        assert_eq!(outline[0], domain.vertices()[0]);
        assert_eq!(outline[1], ExtendedComplex::Infinity);
        assert_eq!(outline[2], ExtendedComplex::Infinity);
        for p in &outline[4..] {
            assert!((point(*p).norm() - 1.0).abs() < 1e-12);
        }
        let last = point(*outline.last().unwrap());
        assert!((last - point(domain.vertices()[0])).norm() < 1e-12);
    }

    #[test]
    fn transformed_outline_follows_the_vertices() {
        let domain = FundamentalDomain::standard();
        let s = MoebiusTransformation::new(0.0, -1.0, 1.0, 0.0).unwrap();
        let outline = trace_domain_outline(domain, &s, &GeodesicSettings { segments: 6 }).unwrap();
        // S moves the cusp at ∞ to 0, so every side becomes an arc
        assert!(outline.iter().all(|p| !p.is_infinite()));
        assert!(outline.iter().any(|p| point(*p).norm() < 1e-12));
        assert_eq!(outline.len(), 3 * 7);
    }

    #[test]
    fn one_outline_per_coset() {
        let cosets = CongruenceSubgroup::Gamma0
            .coset_representatives(Level::new(3).unwrap())
            .unwrap();
        let outlines =
            trace_coset_outlines(&cosets, FundamentalDomain::shifted(), &GeodesicSettings::default())
                .unwrap();
        assert_eq!(outlines.len(), cosets.len());
        assert!(outlines.iter().all(|o| o.len() >= 4 * 2));
    }
}
