//! Completion-gated plot data for the highlighted gene pair

use std::cell::RefCell;
use std::rc::Rc;

use super::plot::{join_plot_data, MutationOverlay, PlotDatum};
use crate::cache::{Derived, FetchCache, FetchHandle, FetchStatus};
use crate::data::{
    CoverageInformation, EntrezGeneId, Gene, MutationRecord, NumericDataQuery, NumericMolecularDatum,
    StudyMutationProfiles,
};
use crate::error::CoexprError;

/// Caches the plot data is fetched through
#[derive(Clone)]
pub struct PlotSources {
    pub numeric: FetchCache<NumericDataQuery, Vec<NumericMolecularDatum>>,
    /// `None` disables the mutation overlay
    pub mutations: Option<FetchCache<EntrezGeneId, Vec<MutationRecord>>>,
    pub coverage: FetchCache<(), CoverageInformation>,
    pub study_profiles: FetchCache<(), StudyMutationProfiles>,
}

impl PlotSources {
    fn versions(&self) -> [u64; 4] {
        [
            self.numeric.version(),
            self.mutations.as_ref().map_or(0, |m| m.version()),
            self.coverage.version(),
            self.study_profiles.version(),
        ]
    }
}

/// Parameters for the join
#[derive(Debug, Clone)]
pub struct JoinParams {
    /// Exclude samples whose value is NaN or infinite on either side
    pub drop_non_finite: bool,
}

impl Default for JoinParams {
    fn default() -> Self {
        Self {
            drop_non_finite: true,
        }
    }
}

/// Inputs selecting one plot
#[derive(Debug, Clone, PartialEq)]
pub struct PlotRequest {
    pub reference_gene: Gene,
    /// Highlighted comparison gene, if any
    pub comparison_gene: Option<Gene>,
    pub molecular_profile_id: String,
    /// The plot is not shown; nothing is fetched
    pub hidden: bool,
}

impl PlotRequest {
    pub fn new(reference_gene: Gene, comparison_gene: Option<Gene>, molecular_profile_id: &str) -> Self {
        Self {
            reference_gene,
            comparison_gene,
            molecular_profile_id: molecular_profile_id.to_string(),
            hidden: false,
        }
    }
}

/// Folds dependency statuses: the first failure wins over pending
enum Gate {
    Open,
    Pending,
    Failed(CoexprError),
}

impl Gate {
    fn check<T>(&mut self, handle: &FetchHandle<T>, resource: &str) {
        if matches!(self, Gate::Failed(_)) {
            return;
        }
        match handle.status() {
            FetchStatus::Complete => {}
            FetchStatus::Pending => *self = Gate::Pending,
            FetchStatus::Error => {
                let reason = handle.error().unwrap_or_default();
                *self = Gate::Failed(CoexprError::fetch_failed(resource, reason));
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct MemoKey {
    reference: EntrezGeneId,
    comparison: EntrezGeneId,
    molecular_profile_id: String,
}

struct PlotMemo {
    key: MemoKey,
    versions: [u64; 4],
    data: Rc<Vec<PlotDatum>>,
}

/// Builds plot data for the reference/comparison pair.
///
/// Holds only a memo of its last result, keyed on the request and the
/// versions of its caches; any change to either triggers a recompute on the
/// next `build`.
pub struct PlotDataBuilder {
    sources: PlotSources,
    params: JoinParams,
    memo: RefCell<Option<PlotMemo>>,
}

impl PlotDataBuilder {
    pub fn new(sources: PlotSources, params: JoinParams) -> Self {
        Self {
            sources,
            params,
            memo: RefCell::new(None),
        }
    }

    pub fn sources(&self) -> &PlotSources {
        &self.sources
    }

    pub fn mutation_overlay_enabled(&self) -> bool {
        self.sources.mutations.is_some()
    }

    /// Plot data for `request`.
    ///
    /// Empty without fetching when the request is hidden or has no
    /// comparison gene. Otherwise pending until every dependency completes,
    /// and failed if any dependency failed.
    pub fn build(&self, request: &PlotRequest) -> Derived<Rc<Vec<PlotDatum>>> {
        let comparison = match &request.comparison_gene {
            Some(gene) if !request.hidden => gene,
            _ => return Derived::Ready(Rc::new(Vec::new())),
        };
        let x_gene = request.reference_gene.entrez_gene_id;
        let y_gene = comparison.entrez_gene_id;
        let profile = request.molecular_profile_id.as_str();
        let sources = &self.sources;

        // issue every fetch before inspecting any status
        let x_data = sources.numeric.get(&NumericDataQuery::new(x_gene, profile));
        let y_data = sources.numeric.get(&NumericDataQuery::new(y_gene, profile));
        let mutations = sources
            .mutations
            .as_ref()
            .map(|cache| (cache.get(&x_gene), cache.get(&y_gene), cache.resource()));
        let coverage = sources.coverage.get(&());
        let study_profiles = sources.study_profiles.get(&());

        let mut gate = Gate::Open;
        gate.check(&x_data, sources.numeric.resource());
        gate.check(&y_data, sources.numeric.resource());
        if let Some((x_muts, y_muts, resource)) = &mutations {
            gate.check(x_muts, resource);
            gate.check(y_muts, resource);
        }
        gate.check(&coverage, sources.coverage.resource());
        gate.check(&study_profiles, sources.study_profiles.resource());

        match gate {
            Gate::Open => {}
            Gate::Pending => return Derived::Pending,
            Gate::Failed(err) => {
                log::warn!("Plot data for {} vs {} unavailable: {}", x_gene, y_gene, err);
                return Derived::Failed(err);
            }
        }

        let key = MemoKey {
            reference: x_gene,
            comparison: y_gene,
            molecular_profile_id: request.molecular_profile_id.clone(),
        };
        let versions = sources.versions();
        if let Some(memo) = self.memo.borrow().as_ref() {
            if memo.key == key && memo.versions == versions {
                return Derived::Ready(Rc::clone(&memo.data));
            }
        }

        let (Some(x_data), Some(y_data), Some(coverage), Some(study_profiles)) = (
            x_data.value(),
            y_data.value(),
            coverage.value(),
            study_profiles.value(),
        ) else {
            return Derived::Pending;
        };
        let mutation_values = mutations.and_then(|(x, y, _)| x.value().zip(y.value()));
        let overlay = mutation_values.as_ref().map(|(x_muts, y_muts)| MutationOverlay {
            x_gene,
            y_gene,
            x_mutations: x_muts.as_slice(),
            y_mutations: y_muts.as_slice(),
            coverage: &coverage,
            study_profiles: &study_profiles,
        });

        let data = Rc::new(join_plot_data(&x_data, &y_data, overlay, self.params.drop_non_finite));
        log::debug!(
            "Joined {} samples for {} vs {} on {}",
            data.len(),
            request.reference_gene.hugo_gene_symbol,
            comparison.hugo_gene_symbol,
            profile
        );

        *self.memo.borrow_mut() = Some(PlotMemo {
            key,
            versions,
            data: Rc::clone(&data),
        });
        Derived::Ready(data)
    }
}
