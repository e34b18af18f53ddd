//! Fundamental domains of the modular group and reduction of points into them.

use crate::error::{ModularError, Result};
use crate::moebius::MoebiusTransformation;
use crate::plane::ExtendedComplex;
use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};
use std::f64::consts::PI;
use tracing::warn;

/// `z ↦ -1/z`, applied when the point is inside the unit circle.
pub static INVERSION: Lazy<MoebiusTransformation> =
    Lazy::new(|| MoebiusTransformation::from_entries(0.0, 1.0, -1.0, 0.0));

/// Triangle with vertices `e^{iπ/3}`, `∞`, `e^{2iπ/3}`.
pub static STANDARD_DOMAIN: Lazy<FundamentalDomain> = Lazy::new(|| FundamentalDomain {
    kind: DomainKind::Standard,
    vertices: vec![
        ExtendedComplex::unit(PI / 3.0),
        ExtendedComplex::Infinity,
        ExtendedComplex::unit(2.0 * PI / 3.0),
    ],
});

/// Quadrilateral with vertices `i`, `∞`, `1 + i`, `e^{iπ/3}`.
pub static SHIFTED_DOMAIN: Lazy<FundamentalDomain> = Lazy::new(|| FundamentalDomain {
    kind: DomainKind::Shifted,
    vertices: vec![
        ExtendedComplex::finite(0.0, 1.0),
        ExtendedComplex::Infinity,
        ExtendedComplex::finite(1.0, 1.0),
        ExtendedComplex::unit(PI / 3.0),
    ],
});

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DomainKind {
    /// `|Re z| ≤ 1/2`, `|z| ≥ 1`.
    Standard,
    /// The standard domain with its left half moved one unit to the right.
    Shifted,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ReductionSettings {
    pub max_iterations: usize,
}

impl Default for ReductionSettings {
    fn default() -> Self {
        Self {
            max_iterations: 1000,
        }
    }
}

/// A polygon whose edges are hyperbolic geodesics between consecutive
/// vertices, closing from the last vertex back to the first.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FundamentalDomain {
    kind: DomainKind,
    vertices: Vec<ExtendedComplex>,
}

impl FundamentalDomain {
    pub fn standard() -> &'static FundamentalDomain {
        &STANDARD_DOMAIN
    }

    pub fn shifted() -> &'static FundamentalDomain {
        &SHIFTED_DOMAIN
    }

    pub fn of_kind(kind: DomainKind) -> &'static FundamentalDomain {
        match kind {
            DomainKind::Standard => Self::standard(),
            DomainKind::Shifted => Self::shifted(),
        }
    }

    pub fn kind(&self) -> DomainKind {
        self.kind
    }

    pub fn vertices(&self) -> &[ExtendedComplex] {
        &self.vertices
    }

    /// Transformation taking `point` into this domain.
    pub fn reduce(
        &self,
        point: ExtendedComplex,
        settings: &ReductionSettings,
    ) -> Result<MoebiusTransformation> {
        match self.kind {
            DomainKind::Standard => reduce_to_domain(point, settings),
            DomainKind::Shifted => reduce_to_shifted_domain(point, settings),
        }
    }
}

/// Continued-fraction style reduction into the standard domain.
///
/// Alternates translating to the nearest integer (ties toward +∞) with
/// inverting through the unit circle, until the point lands on or outside the
/// unit circle inside the strip, or reaches ∞.
pub fn reduce_to_domain(
    point: ExtendedComplex,
    settings: &ReductionSettings,
) -> Result<MoebiusTransformation> {
    if settings.max_iterations == 0 {
        return Err(ModularError::InvalidArgument(
            "max_iterations must be greater than zero".into(),
        ));
    }

    let mut result = MoebiusTransformation::identity();
    let mut current = point;

    for _ in 0..settings.max_iterations {
        let z = match current {
            ExtendedComplex::Infinity => return Ok(result),
            ExtendedComplex::Finite(z) => z,
        };

        let n = (z.re + 0.5).floor();
        result = MoebiusTransformation::translation(-n).compose(&result);
        current = result.act(point);

        match current {
            ExtendedComplex::Infinity => return Ok(result),
            ExtendedComplex::Finite(z) if z.norm_sqr() >= 1.0 => return Ok(result),
            ExtendedComplex::Finite(_) => {}
        }

        result = INVERSION.compose(&result);
        current = result.act(point);
    }

    warn!(
        point = %point,
        max_iterations = settings.max_iterations,
        "reduction to the fundamental domain did not converge"
    );
    Err(ModularError::NotConverged {
        max_iterations: settings.max_iterations,
    })
}

/// Reduction into the shifted domain: reduce into the standard domain, then
/// move the left half (`Re z < 0`) one unit to the right.
pub fn reduce_to_shifted_domain(
    point: ExtendedComplex,
    settings: &ReductionSettings,
) -> Result<MoebiusTransformation> {
    let result = reduce_to_domain(point, settings)?;
    match result.act(point) {
        ExtendedComplex::Finite(z) if z.re < 0.0 => {
            Ok(MoebiusTransformation::translation(1.0).compose(&result))
        }
        _ => Ok(result),
    }
}
