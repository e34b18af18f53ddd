//! The extended complex plane: finite complex numbers plus a single point at infinity.
//!
//! Finite values are backed by `num_complex::Complex64`. Arithmetic is only
//! defined between finite values (or a finite value and a real scalar); the
//! point at infinity is resolved one level up, in the Möbius action.

use crate::error::{ModularError, Result};
use crate::wire::MathValue;
use num_complex::Complex64;
use num_traits::Zero;
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, PI};
use std::fmt;

/// A point of the Riemann sphere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(into = "MathValue", try_from = "MathValue")]
pub enum ExtendedComplex {
    /// Both components are finite.
    Finite(Complex64),
    Infinity,
}

/// Right-hand side of a plane operation: a bare real scalar or another point.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Operand {
    Scalar(f64),
    Point(ExtendedComplex),
}

impl From<f64> for Operand {
    fn from(value: f64) -> Self {
        Operand::Scalar(value)
    }
}

impl From<Complex64> for Operand {
    fn from(value: Complex64) -> Self {
        Operand::Point(ExtendedComplex::Finite(value))
    }
}

impl From<ExtendedComplex> for Operand {
    fn from(value: ExtendedComplex) -> Self {
        Operand::Point(value)
    }
}

impl From<Complex64> for ExtendedComplex {
    fn from(value: Complex64) -> Self {
        ExtendedComplex::Finite(value)
    }
}

/// A real number is promoted to the point `(value, 0)`.
impl From<f64> for ExtendedComplex {
    fn from(value: f64) -> Self {
        ExtendedComplex::Finite(Complex64::new(value, 0.0))
    }
}

impl ExtendedComplex {
    /// Finite point with the given components. Callers pass finite values;
    /// use [`ExtendedComplex::try_finite`] for untrusted input.
    pub fn finite(re: f64, im: f64) -> Self {
        debug_assert!(re.is_finite() && im.is_finite());
        ExtendedComplex::Finite(Complex64::new(re, im))
    }

    pub fn try_finite(re: f64, im: f64) -> Result<Self> {
        if !re.is_finite() || !im.is_finite() {
            return Err(ModularError::InvalidArgument(format!(
                "point components must be finite, got ({re}, {im})"
            )));
        }
        Ok(Self::finite(re, im))
    }

    /// `e^{iθ}`.
    pub fn unit(theta: f64) -> Self {
        ExtendedComplex::Finite(Complex64::new(theta.cos(), theta.sin()))
    }

    pub fn is_infinite(&self) -> bool {
        matches!(self, ExtendedComplex::Infinity)
    }

    pub fn as_finite(&self) -> Option<Complex64> {
        match self {
            ExtendedComplex::Finite(z) => Some(*z),
            ExtendedComplex::Infinity => None,
        }
    }

    pub fn add(&self, rhs: impl Into<Operand>) -> Result<Self> {
        let z = self.finite_part("add")?;
        let out = match rhs.into() {
            Operand::Scalar(s) => z + s,
            Operand::Point(p) => z + p.finite_part("add")?,
        };
        Ok(out.into())
    }

    pub fn subtract(&self, rhs: impl Into<Operand>) -> Result<Self> {
        let z = self.finite_part("subtract")?;
        let out = match rhs.into() {
            Operand::Scalar(s) => z - s,
            Operand::Point(p) => z - p.finite_part("subtract")?,
        };
        Ok(out.into())
    }

    pub fn multiply(&self, rhs: impl Into<Operand>) -> Result<Self> {
        let z = self.finite_part("multiply")?;
        let out = match rhs.into() {
            Operand::Scalar(s) => z * s,
            Operand::Point(p) => z * p.finite_part("multiply")?,
        };
        Ok(out.into())
    }

    pub fn divide(&self, rhs: impl Into<Operand>) -> Result<Self> {
        let z = self.finite_part("divide")?;
        let out = match rhs.into() {
            Operand::Scalar(s) => {
                if s == 0.0 {
                    return Err(ModularError::DivisionByZero);
                }
                z / s
            }
            Operand::Point(p) => z * reciprocal(p.finite_part("divide")?)?,
        };
        Ok(out.into())
    }

    /// `re² + im²`.
    pub fn squared_modulus(&self) -> Result<f64> {
        Ok(self.finite_part("squared_modulus")?.norm_sqr())
    }

    pub fn modulus(&self) -> Result<f64> {
        Ok(self.squared_modulus()?.sqrt())
    }

    pub fn reciprocal(&self) -> Result<Self> {
        reciprocal(self.finite_part("reciprocal")?).map(Into::into)
    }

    /// Angle in `[0, 2π)`; see [`polar_angle`].
    pub fn polar_angle(&self) -> Result<f64> {
        Ok(polar_angle(self.finite_part("polar_angle")?))
    }

    fn finite_part(&self, operation: &str) -> Result<Complex64> {
        self.as_finite().ok_or_else(|| {
            ModularError::InvalidArgument(format!(
                "{operation} is not defined for the point at infinity"
            ))
        })
    }
}

impl fmt::Display for ExtendedComplex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExtendedComplex::Finite(z) => write!(f, "{} + {}i", z.re, z.im),
            ExtendedComplex::Infinity => write!(f, "∞"),
        }
    }
}

/// `(re/|z|², -im/|z|²)`, failing at zero.
pub fn reciprocal(z: Complex64) -> Result<Complex64> {
    if z.is_zero() {
        return Err(ModularError::DivisionByZero);
    }
    let n = z.norm_sqr();
    Ok(Complex64::new(z.re / n, -z.im / n))
}

/// Polar angle on the `[0, 2π)` branch.
///
/// The zero vector maps to 0. Geodesic arcs interpolate linearly between two
/// of these angles, so the branch cut sits on the positive real axis rather
/// than the negative one.
pub fn polar_angle(z: Complex64) -> f64 {
    if z.re == 0.0 {
        return if z.im == 0.0 {
            0.0
        } else if z.im > 0.0 {
            FRAC_PI_2
        } else {
            3.0 * FRAC_PI_2
        };
    }
    let phi = (z.im / z.re).atan();
    if z.re > 0.0 {
        if phi < 0.0 {
            2.0 * PI + phi
        } else {
            phi
        }
    } else {
        phi + PI
    }
}
