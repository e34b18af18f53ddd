//! Stateless reduction and geodesic helpers.

use crate::{js_error, to_js};
use anyhow::{bail, Context, Result};
use halfplane_core::{
    trace_geodesic as core_trace_geodesic, DomainKind, ExtendedComplex, FundamentalDomain,
    ModularError, ReductionSettings,
};
use serde_wasm_bindgen::from_value;
use wasm_bindgen::prelude::*;

pub(crate) fn parse_domain(name: &str) -> Result<DomainKind> {
    match name {
        "" | "1" | "standard" => Ok(DomainKind::Standard),
        "2" | "shifted" => Ok(DomainKind::Shifted),
        other => bail!("Unknown fundamental domain: {other}"),
    }
}

pub(crate) fn reduction_settings(max_iterations: u32) -> ReductionSettings {
    if max_iterations == 0 {
        ReductionSettings::default()
    } else {
        ReductionSettings {
            max_iterations: max_iterations as usize,
        }
    }
}

/// Entries of the reducing transformation, or `None` when it did not converge.
pub(crate) fn reduce_entries(
    re: f64,
    im: f64,
    domain: &str,
    max_iterations: u32,
) -> Result<Option<[f64; 4]>> {
    let point = ExtendedComplex::try_finite(re, im).context("Invalid query point")?;
    let domain = FundamentalDomain::of_kind(parse_domain(domain)?);
    match domain.reduce(point, &reduction_settings(max_iterations)) {
        Ok(t) => Ok(Some(t.entries())),
        Err(ModularError::NotConverged { .. }) => Ok(None),
        Err(err) => Err(err).context("Reduction failed"),
    }
}

pub(crate) fn geodesic_points(
    from: ExtendedComplex,
    to: ExtendedComplex,
    segments: u32,
) -> Result<Vec<ExtendedComplex>> {
    let segments = if segments == 0 { 15 } else { segments as usize };
    Ok(core_trace_geodesic(from, to, segments)
        .context("Geodesic tracing failed")?
        .collect())
}

/// `[a, b, c, d]` mapping `(re, im)` into the named domain, or `undefined`.
///
/// `max_iterations == 0` selects the default budget.
#[wasm_bindgen]
pub fn reduce_to_domain(
    re: f64,
    im: f64,
    domain: &str,
    max_iterations: u32,
) -> Result<JsValue, JsValue> {
    let entries = reduce_entries(re, im, domain, max_iterations).map_err(js_error)?;
    to_js(&entries)
}

/// Points along the geodesic between two tagged plane values.
#[wasm_bindgen]
pub fn trace_geodesic(from: JsValue, to: JsValue, segments: u32) -> Result<JsValue, JsValue> {
    let from: ExtendedComplex =
        from_value(from).map_err(|e| JsValue::from_str(&format!("Invalid start point: {}", e)))?;
    let to: ExtendedComplex =
        from_value(to).map_err(|e| JsValue::from_str(&format!("Invalid end point: {}", e)))?;
    let points = geodesic_points(from, to, segments).map_err(js_error)?;
    to_js(&points)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domains_parse_by_name_or_index() {
        assert_eq!(parse_domain("standard").unwrap(), DomainKind::Standard);
        assert_eq!(parse_domain("1").unwrap(), DomainKind::Standard);
        assert_eq!(parse_domain("2").unwrap(), DomainKind::Shifted);
        let err = parse_domain("3").unwrap_err();
        assert!(format!("{err}").contains("Unknown fundamental domain"));
    }

    #[test]
    fn zero_iterations_selects_default_budget() {
        assert_eq!(reduction_settings(0).max_iterations, 1000);
        assert_eq!(reduction_settings(7).max_iterations, 7);
    }

    #[test]
    fn reduce_entries_reports_transform_or_none() {
        let entries = reduce_entries(2.0, 0.5, "standard", 0).unwrap();
        assert_eq!(entries, Some([0.0, 1.0, -1.0, 2.0]));

        let entries = reduce_entries(-0.3, 1.2, "shifted", 0).unwrap();
        assert_eq!(entries, Some([1.0, 1.0, 0.0, 1.0]));

        assert_eq!(reduce_entries(0.3, 0.2, "standard", 1).unwrap(), None);
        assert!(reduce_entries(f64::NAN, 1.0, "standard", 0).is_err());
    }

    #[test]
    fn geodesic_points_default_to_fifteen_segments() {
        let points = geodesic_points(
            ExtendedComplex::finite(-1.0, 1.0),
            ExtendedComplex::finite(1.0, 1.0),
            0,
        )
        .unwrap();
        assert_eq!(points.len(), 16);
    }
}
