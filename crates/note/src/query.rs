use async_trait::async_trait;

/// Result of one opaque query evaluation.
///
/// A successful-but-empty result is distinct from an engine failure:
/// `Rows(vec![])` means the query ran and matched nothing, `Failed`
/// means the engine itself reported an error.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryOutcome {
    Rows(Vec<Vec<String>>),
    Failed(String),
}

/// Third-party query-language engine, invoked opaquely.
#[async_trait]
pub trait QueryEngine: Send + Sync {
    async fn query(&self, query: &str) -> QueryOutcome;
}
