//! Coset representatives of a congruence subgroup inside the modular group.
//!
//! Representatives are found by a breadth-first search over the Cayley graph
//! generated by `S`, `T` and `T⁻¹`. A candidate is kept when it is not
//! equivalent to any representative already known; how much of the known list
//! is consulted is controlled by [`DuplicateCheck`].

use crate::domain::{reduce_to_domain, ReductionSettings};
use crate::error::{ModularError, Result};
use crate::moebius::{Cusp, MoebiusTransformation};
use crate::plane::ExtendedComplex;
use crate::subgroup::{CongruenceSubgroup, Level};
use once_cell::sync::Lazy;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{debug, warn};

/// `S = (0, -1, 1, 0)`, `T = (1, 1, 0, 1)` and `T⁻¹ = (1, -1, 0, 1)`.
pub static GENERATORS: Lazy<[MoebiusTransformation; 3]> = Lazy::new(|| {
    [
        MoebiusTransformation::from_entries(0.0, -1.0, 1.0, 0.0),
        MoebiusTransformation::translation(1.0),
        MoebiusTransformation::translation(-1.0),
    ]
});

/// Which previously found representatives a new candidate is compared with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DuplicateCheck {
    /// The current round and the two before it.
    #[default]
    RecentRounds,
    /// Every representative found so far.
    Exhaustive,
    /// Run both searches, warn when they disagree, keep the exhaustive result.
    Verified,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct EnumerationSettings {
    pub duplicate_check: DuplicateCheck,
    /// Safety cap on breadth-first rounds.
    pub max_rounds: usize,
}

impl Default for EnumerationSettings {
    fn default() -> Self {
        Self {
            duplicate_check: DuplicateCheck::RecentRounds,
            max_rounds: 4096,
        }
    }
}

/// Pairwise inequivalent representatives covering every coset.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CosetRepresentativeSet {
    subgroup: CongruenceSubgroup,
    level: Level,
    representatives: Vec<MoebiusTransformation>,
}

/// Where a query point sits relative to the tiling by coset images.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PointLocation {
    /// Maps the point into the standard fundamental domain.
    pub to_domain: MoebiusTransformation,
    /// Inverse of `to_domain`: the image of the domain containing the point.
    pub tile: MoebiusTransformation,
    pub coset_index: Option<usize>,
    /// Image of the reduced point under the matching representative.
    pub representative_image: Option<ExtendedComplex>,
    /// Cusp of the tile, if it is not at infinity.
    pub cusp: Option<Cusp>,
}

impl CosetRepresentativeSet {
    pub fn enumerate(
        subgroup: CongruenceSubgroup,
        level: Level,
        settings: &EnumerationSettings,
    ) -> Result<Self> {
        if settings.max_rounds == 0 {
            return Err(ModularError::InvalidArgument(
                "max_rounds must be greater than zero".into(),
            ));
        }
        let representatives = match settings.duplicate_check {
            DuplicateCheck::RecentRounds => {
                breadth_first(subgroup, level, settings.max_rounds, Window::Recent)?
            }
            DuplicateCheck::Exhaustive => {
                breadth_first(subgroup, level, settings.max_rounds, Window::All)?
            }
            DuplicateCheck::Verified => {
                let recent = breadth_first(subgroup, level, settings.max_rounds, Window::Recent)?;
                let all = breadth_first(subgroup, level, settings.max_rounds, Window::All)?;
                if recent.len() != all.len() {
                    warn!(
                        subgroup = subgroup.name(),
                        level = level.get(),
                        recent = recent.len(),
                        exhaustive = all.len(),
                        "recent-rounds duplicate check disagrees with exhaustive search"
                    );
                }
                all
            }
        };
        debug!(
            subgroup = subgroup.name(),
            level = level.get(),
            count = representatives.len(),
            "enumerated coset representatives"
        );
        Ok(Self {
            subgroup,
            level,
            representatives,
        })
    }

    pub fn subgroup(&self) -> CongruenceSubgroup {
        self.subgroup
    }

    pub fn level(&self) -> Level {
        self.level
    }

    pub fn representatives(&self) -> &[MoebiusTransformation] {
        &self.representatives
    }

    pub fn len(&self) -> usize {
        self.representatives.len()
    }

    pub fn is_empty(&self) -> bool {
        self.representatives.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, MoebiusTransformation> {
        self.representatives.iter()
    }

    pub fn index_of(&self, value: &MoebiusTransformation) -> Option<usize> {
        self.subgroup
            .coset_representative_index(self.level, &self.representatives, value)
    }

    pub fn representative(&self, value: &MoebiusTransformation) -> Option<&MoebiusTransformation> {
        self.index_of(value).map(|i| &self.representatives[i])
    }

    /// Same size, and every element of `other` equivalent to one of ours.
    pub fn is_equivalent_to(&self, other: &Self) -> bool {
        self.subgroup == other.subgroup
            && self.level == other.level
            && self.len() == other.len()
            && other.iter().all(|t| self.index_of(t).is_some())
    }

    /// Reduces `point` and finds which coset's tile it falls in.
    ///
    /// `Ok(None)` when the reduction does not converge.
    pub fn locate(
        &self,
        point: ExtendedComplex,
        settings: &ReductionSettings,
    ) -> Result<Option<PointLocation>> {
        let to_domain = match reduce_to_domain(point, settings) {
            Ok(t) => t,
            Err(err) if err.is_undetermined() => return Ok(None),
            Err(err) => return Err(err),
        };
        let tile = to_domain.inverse();
        let coset_index = self.index_of(&tile);
        let representative_image =
            coset_index.map(|i| self.representatives[i].act(to_domain.act(point)));
        Ok(Some(PointLocation {
            to_domain,
            tile,
            coset_index,
            representative_image,
            cusp: tile.cusp(),
        }))
    }
}

impl<'a> IntoIterator for &'a CosetRepresentativeSet {
    type Item = &'a MoebiusTransformation;
    type IntoIter = std::slice::Iter<'a, MoebiusTransformation>;
    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl CongruenceSubgroup {
    /// Coset representatives with the default settings.
    pub fn coset_representatives(&self, level: Level) -> Result<CosetRepresentativeSet> {
        CosetRepresentativeSet::enumerate(*self, level, &EnumerationSettings::default())
    }
}

#[derive(Clone, Copy)]
enum Window {
    Recent,
    All,
}

fn breadth_first(
    subgroup: CongruenceSubgroup,
    level: Level,
    max_rounds: usize,
    window: Window,
) -> Result<Vec<MoebiusTransformation>> {
    let identity = MoebiusTransformation::identity();
    let mut complete = vec![identity];

    // `checks` is the round before `seeds`; `added` collects the current round.
    let mut checks: Vec<MoebiusTransformation> = Vec::new();
    let mut added = vec![identity];
    let mut rounds = 0usize;

    while !added.is_empty() {
        if rounds >= max_rounds {
            return Err(ModularError::RoundLimitExceeded { rounds });
        }
        rounds += 1;

        let seeds = std::mem::take(&mut added);
        let complete_before = complete.len();

        for s in &seeds {
            for g in GENERATORS.iter() {
                let x = s.compose(g);
                let known = match window {
                    Window::Recent => {
                        let found = |list: &[MoebiusTransformation]| {
                            subgroup
                                .coset_representative_index(level, list, &x)
                                .is_some()
                        };
                        found(&checks) || found(&added) || found(&seeds)
                    }
                    Window::All => subgroup
                        .coset_representative_index(level, &complete, &x)
                        .is_some(),
                };
                if !known {
                    complete.push(x);
                    added.push(x);
                }
            }
        }
        debug_assert_eq!(complete.len() - complete_before, added.len());
        checks = seeds;
    }

    debug!(rounds, count = complete.len(), "breadth-first search finished");
    Ok(complete)
}

/// The coset set for the currently selected subgroup and level.
///
/// Readers get an `Arc` snapshot. Selecting a new subgroup or level records
/// the request, builds the replacement outside both locks, and publishes it
/// only if no later request has arrived in the meantime.
#[derive(Debug)]
pub struct CosetCache {
    settings: EnumerationSettings,
    requested: Mutex<Selection>,
    current: RwLock<Arc<CosetRepresentativeSet>>,
}

/// The latest requested selection; `generation` increases with every request.
#[derive(Debug, Clone, Copy)]
struct Selection {
    subgroup: CongruenceSubgroup,
    level: Level,
    generation: u64,
}

impl CosetCache {
    pub fn new(
        subgroup: CongruenceSubgroup,
        level: Level,
        settings: EnumerationSettings,
    ) -> Result<Self> {
        let set = CosetRepresentativeSet::enumerate(subgroup, level, &settings)?;
        Ok(Self {
            settings,
            requested: Mutex::new(Selection {
                subgroup,
                level,
                generation: 0,
            }),
            current: RwLock::new(Arc::new(set)),
        })
    }

    pub fn current(&self) -> Arc<CosetRepresentativeSet> {
        Arc::clone(&*self.current.read())
    }

    /// Switches to `(subgroup, level)`, recomputing only if it differs.
    pub fn select(
        &self,
        subgroup: CongruenceSubgroup,
        level: Level,
    ) -> Result<Arc<CosetRepresentativeSet>> {
        self.request(|_| (subgroup, level))
    }

    /// Keeps the most recently requested subgroup.
    pub fn change_level(&self, level: Level) -> Result<Arc<CosetRepresentativeSet>> {
        self.request(|requested| (requested.subgroup, level))
    }

    /// Keeps the most recently requested level.
    pub fn change_group(&self, subgroup: CongruenceSubgroup) -> Result<Arc<CosetRepresentativeSet>> {
        self.request(|requested| (subgroup, requested.level))
    }

    /// Returns the set for the request even when a newer request wins the
    /// publish.
    fn request(
        &self,
        target: impl FnOnce(&Selection) -> (CongruenceSubgroup, Level),
    ) -> Result<Arc<CosetRepresentativeSet>> {
        let wanted = {
            let mut requested = self.requested.lock();
            let (subgroup, level) = target(&requested);
            requested.subgroup = subgroup;
            requested.level = level;
            requested.generation += 1;
            *requested
        };

        {
            let current = self.current.read();
            if current.subgroup() == wanted.subgroup && current.level() == wanted.level {
                return Ok(Arc::clone(&*current));
            }
        }

        let enumerated =
            CosetRepresentativeSet::enumerate(wanted.subgroup, wanted.level, &self.settings);

        let mut requested = self.requested.lock();
        let latest = requested.generation == wanted.generation;
        let fresh = match enumerated {
            Ok(set) => Arc::new(set),
            Err(err) => {
                if latest {
                    // Fall back to what is actually published.
                    let current = self.current.read();
                    requested.subgroup = current.subgroup();
                    requested.level = current.level();
                }
                return Err(err);
            }
        };
        if latest {
            *self.current.write() = Arc::clone(&fresh);
        } else {
            debug!(
                subgroup = wanted.subgroup.name(),
                level = wanted.level.get(),
                "coset selection superseded before publish"
            );
        }
        Ok(fresh)
    }
}
