use std::time::Instant;

use super::envelope::{ResultEnvelope, assemble};
use super::execute::{Strategy, execute};
use crate::options::{PaginateDefaults, PaginateOptions, ResolvedOptions, resolve};
use crate::pipeline::{ComposedPipelines, PipelineFragment, compose};
use crate::store::AggregateStore;

/// Everything a call will send to the store, computed without touching it.
#[derive(Debug, Clone, PartialEq)]
pub struct PaginationPlan {
    pub options: ResolvedOptions,
    pub pipelines: ComposedPipelines,
    pub strategy: Strategy,
}

/// Resolve options and compose both pipelines.
#[must_use]
pub fn plan(
    conditions: &PipelineFragment,
    sort: &PipelineFragment,
    shaping: &PipelineFragment,
    options: &PaginateOptions,
    defaults: &PaginateDefaults,
) -> PaginationPlan {
    let resolved = resolve(options, defaults);
    let pipelines =
        compose(conditions, sort, shaping, resolved.skip, resolved.limit, resolved.pagination);
    let strategy = Strategy::from_use_facet(resolved.use_facet);
    PaginationPlan { options: resolved, pipelines, strategy }
}

fn dump_plan(plan: &PaginationPlan) {
    let stages = |p: &[bson::Document]| {
        p.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
    };
    crate::devlog!("[Paginate Options] {:?}", plan.options);
    crate::devlog!("[Count Aggregation Pipeline] [{}]", stages(&plan.pipelines.count));
    crate::devlog!("[Documents Aggregation Pipeline] [{}]", stages(&plan.pipelines.documents));
    log::debug!(
        "paginate plan: strategy={} skip={} limit={} docs_stages={} count_stages={}",
        plan.strategy.as_str(),
        plan.options.skip,
        plan.options.limit,
        plan.pipelines.documents.len(),
        plan.pipelines.count.len()
    );
}

/// Paginates aggregation pipelines against one store.
///
/// Library-level defaults are fixed at construction and apply to every call; per-call
/// [`PaginateOptions`] override them.
#[derive(Debug, Clone)]
pub struct Paginator<S> {
    store: S,
    defaults: PaginateDefaults,
}

impl<S: AggregateStore> Paginator<S> {
    pub fn new(store: S) -> Self {
        Self::with_defaults(store, PaginateDefaults::default())
    }

    pub fn with_defaults(store: S, defaults: PaginateDefaults) -> Self {
        Self { store, defaults }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn defaults(&self) -> &PaginateDefaults {
        &self.defaults
    }

    /// See [`plan`].
    pub fn plan(
        &self,
        conditions: impl Into<PipelineFragment>,
        sort: impl Into<PipelineFragment>,
        shaping: impl Into<PipelineFragment>,
        options: &PaginateOptions,
    ) -> PaginationPlan {
        plan(&conditions.into(), &sort.into(), &shaping.into(), options, &self.defaults)
    }

    /// Run one page of `conditions ++ sort ++ shaping`.
    ///
    /// Store errors are returned as-is; nothing is returned for a failed call.
    pub async fn paginate(
        &self,
        conditions: impl Into<PipelineFragment>,
        sort: impl Into<PipelineFragment>,
        shaping: impl Into<PipelineFragment>,
        options: &PaginateOptions,
    ) -> Result<ResultEnvelope, S::Error> {
        let plan = self.plan(conditions, sort, shaping, options);
        if plan.options.debug {
            dump_plan(&plan);
        }
        let started = Instant::now();
        let PaginationPlan { options: resolved, pipelines, strategy } = plan;
        let raw = match execute(&self.store, pipelines, strategy, &resolved.aggregate_options).await {
            Ok(raw) => raw,
            Err(e) => {
                log::warn!("paginate failed ({} strategy): {e}", strategy.as_str());
                return Err(e);
            }
        };
        let envelope = assemble(raw, &resolved);
        crate::devlog!(
            "{{\"bench\":\"paginate\",\"strategy\":\"{}\",\"duration_ms\":{},\"total_docs\":{},\"returned\":{},\"page\":{},\"limit\":{}}}",
            strategy.as_str(),
            started.elapsed().as_millis(),
            envelope.meta.total_docs,
            envelope.docs.len(),
            envelope.meta.page,
            envelope.meta.limit
        );
        Ok(envelope)
    }

    /// Callback-style adapter over [`paginate`](Self::paginate): the outcome goes to `callback`
    /// and its return value is handed back.
    pub async fn paginate_with_callback<F, R>(
        &self,
        conditions: impl Into<PipelineFragment>,
        sort: impl Into<PipelineFragment>,
        shaping: impl Into<PipelineFragment>,
        options: &PaginateOptions,
        callback: F,
    ) -> R
    where
        F: FnOnce(Result<ResultEnvelope, S::Error>) -> R,
    {
        callback(self.paginate(conditions, sort, shaping, options).await)
    }
}
