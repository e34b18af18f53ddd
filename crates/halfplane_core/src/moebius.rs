//! Möbius transformations as unit-determinant 2×2 real matrices.

use crate::error::{ModularError, Result};
use crate::plane::ExtendedComplex;
use crate::wire::MathValue;
use nalgebra::Matrix2;
use num_complex::Complex64;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::ops::Mul;

/// Accepted deviation of `ad - bc` from 1 when validating untrusted entries.
pub const DETERMINANT_TOLERANCE: f64 = 1e-9;

/// The map `z ↦ (az + b) / (cz + d)` stored as `[[a, b], [c, d]]` with `ad - bc = 1`.
///
/// Equality and hashing are exact on the four entries.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "MathValue", try_from = "MathValue")]
pub struct MoebiusTransformation {
    matrix: Matrix2<f64>,
}

/// A cusp `p/q` in lowest terms with `q > 0`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Cusp {
    pub numerator: i64,
    pub denominator: i64,
}

impl MoebiusTransformation {
    /// Validated constructor.
    pub fn new(a: f64, b: f64, c: f64, d: f64) -> Result<Self> {
        let determinant = a * d - b * c;
        if !determinant.is_finite() || (determinant - 1.0).abs() > DETERMINANT_TOLERANCE {
            return Err(ModularError::InvalidTransformation {
                a,
                b,
                c,
                d,
                determinant,
            });
        }
        Ok(Self::from_entries(a, b, c, d))
    }

    /// Builds the matrix without checking the determinant. The caller
    /// guarantees `ad - bc = 1`; otherwise [`inverse`](Self::inverse) is wrong.
    pub(crate) fn from_entries(a: f64, b: f64, c: f64, d: f64) -> Self {
        Self {
            matrix: Matrix2::new(a, b, c, d),
        }
    }

    pub fn identity() -> Self {
        Self {
            matrix: Matrix2::identity(),
        }
    }

    /// `z ↦ z + n`.
    pub fn translation(n: f64) -> Self {
        Self::from_entries(1.0, n, 0.0, 1.0)
    }

    pub fn a(&self) -> f64 {
        self.matrix[(0, 0)]
    }

    pub fn b(&self) -> f64 {
        self.matrix[(0, 1)]
    }

    pub fn c(&self) -> f64 {
        self.matrix[(1, 0)]
    }

    pub fn d(&self) -> f64 {
        self.matrix[(1, 1)]
    }

    /// `[a, b, c, d]`.
    pub fn entries(&self) -> [f64; 4] {
        [self.a(), self.b(), self.c(), self.d()]
    }

    pub fn determinant(&self) -> f64 {
        self.a() * self.d() - self.b() * self.c()
    }

    /// Matrix product `self · other`; apply `other` first, then `self`.
    pub fn compose(&self, other: &Self) -> Self {
        Self {
            matrix: self.matrix * other.matrix,
        }
    }

    /// The adjugate `(d, -b, -c, a)`, the inverse under `ad - bc = 1`.
    pub fn inverse(&self) -> Self {
        Self::from_entries(self.d(), -self.b(), -self.c(), self.a())
    }

    /// Fractional-linear action on the extended plane.
    ///
    /// Images that overflow `f64` are reported as ∞.
    pub fn act(&self, point: impl Into<ExtendedComplex>) -> ExtendedComplex {
        let image = match point.into() {
            ExtendedComplex::Infinity => {
                if self.c() == 0.0 {
                    return ExtendedComplex::Infinity;
                }
                Complex64::new(self.a() / self.c(), 0.0)
            }
            ExtendedComplex::Finite(z) => {
                let denominator = z * self.c() + self.d();
                if denominator.is_zero() {
                    return ExtendedComplex::Infinity;
                }
                (z * self.a() + self.b()) / denominator
            }
        };
        if image.is_finite() {
            ExtendedComplex::Finite(image)
        } else {
            ExtendedComplex::Infinity
        }
    }

    /// True when all four entries are integers.
    pub fn is_integral(&self) -> bool {
        self.entries().iter().all(|v| v.fract() == 0.0)
    }

    /// Image of ∞ as a reduced fraction, for integral transformations with `c ≠ 0`.
    pub fn cusp(&self) -> Option<Cusp> {
        if self.c() == 0.0 || !self.is_integral() {
            return None;
        }
        let mut p = self.a() as i64;
        let mut q = self.c() as i64;
        let g = gcd(p, q);
        p /= g;
        q /= g;
        if q < 0 {
            p = -p;
            q = -q;
        }
        Some(Cusp {
            numerator: p,
            denominator: q,
        })
    }

    /// `\begin{pmatrix}a&b\\c&d\end{pmatrix}` for label typesetting.
    pub fn tex(&self) -> String {
        let [a, b, c, d] = self.entries();
        format!("\\begin{{pmatrix}}{a}&{b}\\\\{c}&{d}\\end{{pmatrix}}")
    }
}

fn gcd(a: i64, b: i64) -> i64 {
    let (mut a, mut b) = (a.abs(), b.abs());
    while b != 0 {
        let r = a % b;
        a = b;
        b = r;
    }
    a
}

impl Default for MoebiusTransformation {
    fn default() -> Self {
        Self::identity()
    }
}

impl Mul for MoebiusTransformation {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.compose(&rhs)
    }
}

impl Mul for &MoebiusTransformation {
    type Output = MoebiusTransformation;
    fn mul(self, rhs: Self) -> MoebiusTransformation {
        self.compose(rhs)
    }
}

// Entries are finite by construction, so equality is reflexive.
impl Eq for MoebiusTransformation {}

impl Hash for MoebiusTransformation {
    fn hash<H: Hasher>(&self, state: &mut H) {
        for v in self.entries() {
            // -0.0 == 0.0, so both must hash alike.
            let v = if v == 0.0 { 0.0 } else { v };
            v.to_bits().hash(state);
        }
    }
}

impl fmt::Display for MoebiusTransformation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [a, b, c, d] = self.entries();
        write!(f, "[[{a}, {b}], [{c}, {d}]]")
    }
}

impl TryFrom<[f64; 4]> for MoebiusTransformation {
    type Error = ModularError;
    fn try_from([a, b, c, d]: [f64; 4]) -> Result<Self> {
        Self::new(a, b, c, d)
    }
}

impl From<MoebiusTransformation> for [f64; 4] {
    fn from(value: MoebiusTransformation) -> Self {
        value.entries()
    }
}
