//! Coset explorer: the selected subgroup and level, their coset
//! representatives, and the queries the drawing surface needs.

use crate::geometry::{parse_domain, reduction_settings};
use crate::{js_error, to_js};
use anyhow::{Context, Result};
use halfplane_core::geodesic::trace_coset_outlines;
use halfplane_core::{
    CongruenceSubgroup, CosetCache, EnumerationSettings, ExtendedComplex, FundamentalDomain,
    GeodesicSettings, Level, PointLocation,
};
use js_sys::Float64Array;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
pub struct WasmCosetExplorer {
    cosets: CosetCache,
}

impl WasmCosetExplorer {
    pub(crate) fn build(subgroup: &str, level: i32) -> Result<Self> {
        let subgroup: CongruenceSubgroup = subgroup.parse()?;
        let level = Level::new(level as i64)?;
        let cosets = CosetCache::new(subgroup, level, EnumerationSettings::default())
            .with_context(|| format!("Failed to enumerate cosets of {subgroup}({level})"))?;
        Ok(Self { cosets })
    }

    pub(crate) fn select_level(&self, level: i32) -> Result<()> {
        let level = Level::new(level as i64)?;
        self.cosets
            .change_level(level)
            .with_context(|| format!("Failed to enumerate cosets at level {level}"))?;
        Ok(())
    }

    pub(crate) fn select_group(&self, subgroup: &str) -> Result<()> {
        let subgroup: CongruenceSubgroup = subgroup.parse()?;
        self.cosets
            .change_group(subgroup)
            .with_context(|| format!("Failed to enumerate cosets of {subgroup}"))?;
        Ok(())
    }

    pub(crate) fn flat_matrices(&self) -> Vec<f64> {
        self.cosets
            .current()
            .iter()
            .flat_map(|t| t.entries())
            .collect()
    }

    pub(crate) fn outlines(&self, domain: &str, segments: u32) -> Result<Vec<Vec<ExtendedComplex>>> {
        let domain = FundamentalDomain::of_kind(parse_domain(domain)?);
        let settings = if segments == 0 {
            GeodesicSettings::default()
        } else {
            GeodesicSettings {
                segments: segments as usize,
            }
        };
        Ok(trace_coset_outlines(&self.cosets.current(), domain, &settings)?)
    }

    pub(crate) fn location(
        &self,
        re: f64,
        im: f64,
        max_iterations: u32,
    ) -> Result<Option<PointLocation>> {
        let point = ExtendedComplex::try_finite(re, im).context("Invalid query point")?;
        Ok(self
            .cosets
            .current()
            .locate(point, &reduction_settings(max_iterations))?)
    }
}

#[wasm_bindgen]
impl WasmCosetExplorer {
    #[wasm_bindgen(constructor)]
    pub fn new(subgroup: &str, level: i32) -> Result<WasmCosetExplorer, JsValue> {
        console_error_panic_hook::set_once();
        Self::build(subgroup, level).map_err(js_error)
    }

    pub fn change_level(&self, level: i32) -> Result<(), JsValue> {
        self.select_level(level).map_err(js_error)
    }

    pub fn change_group(&self, subgroup: &str) -> Result<(), JsValue> {
        self.select_group(subgroup).map_err(js_error)
    }

    pub fn subgroup_tex(&self) -> String {
        self.cosets.current().subgroup().tex().to_string()
    }

    pub fn level(&self) -> u32 {
        self.cosets.current().level().get()
    }

    pub fn coset_count(&self) -> usize {
        self.cosets.current().len()
    }

    /// Representatives as a flat `[a, b, c, d, a, b, c, d, ...]` array.
    pub fn coset_matrices(&self) -> Float64Array {
        Float64Array::from(self.flat_matrices().as_slice())
    }

    pub fn coset_matrix_tex(&self) -> Vec<String> {
        self.cosets.current().iter().map(|t| t.tex()).collect()
    }

    /// Outline of the domain's image under every representative.
    pub fn domain_outlines(&self, domain: &str, segments: u32) -> Result<JsValue, JsValue> {
        let outlines = self.outlines(domain, segments).map_err(js_error)?;
        to_js(&outlines)
    }

    /// Hover information for a point, or `undefined` if it could not be reduced.
    pub fn locate(&self, re: f64, im: f64, max_iterations: u32) -> Result<JsValue, JsValue> {
        let location = self.location(re, im, max_iterations).map_err(js_error)?;
        to_js(&location)
    }
}

#[cfg(test)]
mod tests {
    use super::WasmCosetExplorer;

    fn assert_err_contains<T>(result: anyhow::Result<T>, needle: &str) {
        let err = match result {
            Ok(_) => panic!("expected error"),
            Err(err) => err,
        };
        let message = format!("{err:#}");
        assert!(
            message.contains(needle),
            "expected error to contain \"{needle}\", got \"{message}\""
        );
    }

    #[test]
    fn explorer_tracks_group_and_level() {
        let explorer = WasmCosetExplorer::build("Gamma_0", 5).expect("explorer should build");
        assert_eq!(explorer.coset_count(), 6);
        assert_eq!(explorer.subgroup_tex(), "\\Gamma_0");
        assert_eq!(explorer.flat_matrices().len(), 24);
        assert_eq!(&explorer.flat_matrices()[..4], &[1.0, 0.0, 0.0, 1.0]);

        explorer.select_level(3).unwrap();
        assert_eq!(explorer.level(), 3);
        assert_eq!(explorer.coset_count(), 4);

        explorer.select_group("Gamma").unwrap();
        assert_eq!(explorer.subgroup_tex(), "\\Gamma");
        assert_eq!(explorer.coset_count(), 12);
        assert_eq!(explorer.coset_matrix_tex().len(), 12);
    }

    #[test]
    fn explorer_rejects_bad_selectors() {
        assert_err_contains(WasmCosetExplorer::build("Gamma_0", 0), "level must be a positive");
        assert_err_contains(WasmCosetExplorer::build("Delta", 3), "unknown congruence subgroup");

        let explorer = WasmCosetExplorer::build("Gamma_1", 4).unwrap();
        assert_err_contains(explorer.select_level(-2), "level must be a positive");
        assert_eq!(explorer.level(), 4);
    }

    #[test]
    fn outlines_cover_every_coset() {
        let explorer = WasmCosetExplorer::build("Gamma_0", 2).unwrap();
        let outlines = explorer.outlines("standard", 4).unwrap();
        assert_eq!(outlines.len(), 3);
        // identity tile: two vertical sides and one arc of five points
        assert_eq!(outlines[0].len(), 2 + 2 + 5);
        assert_err_contains(explorer.outlines("hexagon", 4), "Unknown fundamental domain");
    }

    #[test]
    fn location_matches_core_hover_query() {
        let explorer = WasmCosetExplorer::build("Gamma_0", 5).unwrap();
        let location = explorer
            .location(2.0, 0.5, 0)
            .unwrap()
            .expect("reduction converges");
        assert_eq!(location.to_domain.entries(), [0.0, 1.0, -1.0, 2.0]);
        assert!(location.coset_index.is_some());

        assert!(explorer.location(0.3, 0.2, 1).unwrap().is_none());
        assert_err_contains(explorer.location(f64::INFINITY, 1.0, 0), "Invalid query point");
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::WasmCosetExplorer;
    use wasm_bindgen_test::*;

    #[wasm_bindgen_test]
    fn locate_serializes_hover_payload() {
        let explorer = WasmCosetExplorer::new("Gamma_0", 5).unwrap();
        let value = explorer.locate(2.0, 0.5, 0).unwrap();
        assert!(value.is_object());
        assert_eq!(explorer.coset_matrices().length(), 24);
    }
}
