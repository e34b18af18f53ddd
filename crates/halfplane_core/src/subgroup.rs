//! Congruence subgroups of the modular group and their membership predicates.

use crate::error::{ModularError, Result};
use crate::moebius::MoebiusTransformation;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The congruence level `N ≥ 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u32")]
pub struct Level(u32);

impl Level {
    pub fn new(level: i64) -> Result<Self> {
        if level < 1 || level > u32::MAX as i64 {
            return Err(ModularError::InvalidArgument(format!(
                "level must be a positive integer, got {level}"
            )));
        }
        Ok(Level(level as u32))
    }

    pub fn get(self) -> u32 {
        self.0
    }

    /// Residue of `x` in `[0, N)`, also for negative `x`.
    fn residue(self, x: f64) -> f64 {
        x.rem_euclid(self.0 as f64)
    }

    /// `a ≡ ±1 (mod N)`.
    fn is_plus_minus_one(self, x: f64) -> bool {
        let r = self.residue(x);
        r == 1.0 || r == self.0 as f64 - 1.0
    }
}

impl TryFrom<i64> for Level {
    type Error = ModularError;
    fn try_from(value: i64) -> Result<Self> {
        Level::new(value)
    }
}

impl From<Level> for u32 {
    fn from(value: Level) -> Self {
        value.0
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The three supported congruence-subgroup families.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CongruenceSubgroup {
    /// `c ≡ 0 (mod N)`.
    #[serde(rename = "Gamma_0")]
    Gamma0,
    /// `c ≡ 0` and `a ≡ ±1 (mod N)`.
    #[serde(rename = "Gamma_1")]
    Gamma1,
    /// `c ≡ b ≡ 0` and `a ≡ ±1 (mod N)`.
    #[serde(rename = "Gamma")]
    Gamma,
}

impl CongruenceSubgroup {
    pub const ALL: [CongruenceSubgroup; 3] = [
        CongruenceSubgroup::Gamma0,
        CongruenceSubgroup::Gamma1,
        CongruenceSubgroup::Gamma,
    ];

    /// Display name in TeX.
    pub fn tex(&self) -> &'static str {
        match self {
            CongruenceSubgroup::Gamma0 => "\\Gamma_0",
            CongruenceSubgroup::Gamma1 => "\\Gamma_1",
            CongruenceSubgroup::Gamma => "\\Gamma",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            CongruenceSubgroup::Gamma0 => "Gamma_0",
            CongruenceSubgroup::Gamma1 => "Gamma_1",
            CongruenceSubgroup::Gamma => "Gamma",
        }
    }

    pub fn is_member(&self, level: Level, t: &MoebiusTransformation) -> bool {
        let c_vanishes = level.residue(t.c()) == 0.0;
        match self {
            CongruenceSubgroup::Gamma0 => c_vanishes,
            CongruenceSubgroup::Gamma1 => c_vanishes && level.is_plus_minus_one(t.a()),
            CongruenceSubgroup::Gamma => {
                c_vanishes && level.residue(t.b()) == 0.0 && level.is_plus_minus_one(t.a())
            }
        }
    }

    /// True when `x` and `y` lie in the same coset, i.e. `x · y⁻¹` is a member.
    pub fn equivalent(
        &self,
        level: Level,
        x: &MoebiusTransformation,
        y: &MoebiusTransformation,
    ) -> bool {
        self.is_member(level, &x.compose(&y.inverse()))
    }

    /// Index `i` with `list[i] · value⁻¹` in the subgroup.
    pub fn coset_representative_index(
        &self,
        level: Level,
        list: &[MoebiusTransformation],
        value: &MoebiusTransformation,
    ) -> Option<usize> {
        let value_inv = value.inverse();
        list.iter()
            .position(|candidate| self.is_member(level, &candidate.compose(&value_inv)))
    }

    pub fn coset_representative<'a>(
        &self,
        level: Level,
        list: &'a [MoebiusTransformation],
        value: &MoebiusTransformation,
    ) -> Option<&'a MoebiusTransformation> {
        self.coset_representative_index(level, list, value)
            .map(|i| &list[i])
    }
}

impl fmt::Display for CongruenceSubgroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for CongruenceSubgroup {
    type Err = ModularError;

    fn from_str(s: &str) -> Result<Self> {
        let key: String = s
            .trim()
            .trim_start_matches('\\')
            .chars()
            .filter(|c| !matches!(c, '_' | '(' | ')' | ' ' | '{' | '}'))
            .collect::<String>()
            .to_lowercase();
        match key.as_str() {
            "gamma0" | "γ0" | "γ₀" => Ok(CongruenceSubgroup::Gamma0),
            "gamma1" | "γ1" | "γ₁" => Ok(CongruenceSubgroup::Gamma1),
            "gamma" | "γ" => Ok(CongruenceSubgroup::Gamma),
            _ => Err(ModularError::InvalidArgument(format!(
                "unknown congruence subgroup: {s}"
            ))),
        }
    }
}
