//! The `halfplane_core` crate is the mathematical engine behind the modular
//! group explorer: the action of `SL(2, Z)` on the upper half-plane.
//!
//! Key components:
//! - **Plane**: `ExtendedComplex`, complex numbers plus the point at infinity.
//! - **Moebius**: unit-determinant 2×2 matrices, composition, inversion and action.
//! - **Subgroup / Cosets**: `Γ₀(N)`, `Γ₁(N)`, `Γ(N)` membership and coset
//!   representatives found by breadth-first search.
//! - **Domain**: reduction of a point into a fundamental domain.
//! - **Geodesic**: hyperbolic lines traced as polylines for drawing domain outlines.
pub mod cosets;
pub mod domain;
pub mod error;
pub mod geodesic;
pub mod moebius;
pub mod plane;
pub mod subgroup;
pub mod wire;

pub use cosets::{
    CosetCache, CosetRepresentativeSet, DuplicateCheck, EnumerationSettings, PointLocation,
};
pub use domain::{
    reduce_to_domain, reduce_to_shifted_domain, DomainKind, FundamentalDomain, ReductionSettings,
};
pub use error::{ModularError, Result};
pub use geodesic::{trace_domain_outline, trace_geodesic, GeodesicSettings};
pub use moebius::{Cusp, MoebiusTransformation};
pub use plane::{ExtendedComplex, Operand};
pub use subgroup::{CongruenceSubgroup, Level};
