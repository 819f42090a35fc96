use tracing::{debug, instrument, warn};

use crate::compile::{combine_sources, compile_source, CompiledSource};
use crate::evaluate::check_depth;
use crate::store::{MemoryStore, Page, RuleStore};
use crate::{EngineConfig, Record, Rule, RuleId, RuleRef, RuleitError, Verdict};

/// Compiles, stores, and evaluates rules.
///
/// The engine owns its store. Every write goes through `&mut self`, so a
/// compile or edit is never observed half done; share an engine across
/// threads behind a lock, or as `Arc<RuleEngine>` for read-only evaluation.
///
/// ```
/// use ruleit::{Record, RuleEngine, Verdict};
///
/// let mut engine = RuleEngine::new();
/// let rule = engine.compile("age > 30 AND department = 'Sales'", Some("senior_sales")).unwrap();
///
/// let record = Record::new().set("age", 35).set("department", "Sales");
/// assert_eq!(engine.evaluate(rule.id, &record).unwrap(), Verdict::Bool(true));
/// assert_eq!(engine.evaluate("senior_sales", &Record::new()).unwrap(), Verdict::Unknown);
/// ```
#[derive(Debug, Clone, Default)]
pub struct RuleEngine<S: RuleStore = MemoryStore> {
    store: S,
    config: EngineConfig,
}

impl RuleEngine<MemoryStore> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: EngineConfig) -> Self {
        Self::with_store(MemoryStore::new(), config)
    }
}

impl<S: RuleStore> RuleEngine<S> {
    #[must_use]
    pub fn with_store(store: S, config: EngineConfig) -> Self {
        Self { store, config }
    }

    /// Compile `source` and store it as a new rule.
    ///
    /// # Errors
    ///
    /// Returns a syntax error for malformed input, or
    /// [`StoreError::DuplicateName`](crate::StoreError::DuplicateName) when
    /// `name` is taken. Nothing is stored on failure.
    #[instrument(skip(self))]
    pub fn compile(&mut self, source: &str, name: Option<&str>) -> Result<Rule, RuleitError> {
        let compiled = compile_source(source, self.config.lexing)
            .inspect_err(|err| warn!(%err, "rejected rule string"))?;
        self.store_new(compiled, name)
    }

    /// Join several rule strings with connectives and store the result as
    /// one rule. An empty `operators` slice joins everything with `AND`.
    ///
    /// # Errors
    ///
    /// Rule and operator counts and the connectives themselves are checked
    /// before any rule string is parsed; see
    /// [`combine_sources`](crate::combine_sources).
    #[instrument(skip(self, rules, operators), fields(rules = rules.len()))]
    pub fn combine<R, O>(
        &mut self,
        name: Option<&str>,
        rules: &[R],
        operators: &[O],
    ) -> Result<Rule, RuleitError>
    where
        R: AsRef<str>,
        O: AsRef<str>,
    {
        let source = combine_sources(rules, operators)
            .inspect_err(|err| warn!(%err, "rejected combination"))?;
        let compiled = compile_source(&source, self.config.lexing)
            .inspect_err(|err| warn!(%err, %source, "rejected combined rule string"))?;
        self.store_new(compiled, name)
    }

    /// Rebuild rule `id` from `source`, keeping its id and name.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown id and a syntax error for
    /// malformed input. The rule is unchanged on failure.
    #[instrument(skip(self))]
    pub fn edit(&mut self, id: RuleId, source: &str) -> Result<Rule, RuleitError> {
        self.store.get(&RuleRef::Id(id))?;
        let compiled = compile_source(source, self.config.lexing)
            .inspect_err(|err| warn!(%err, rule_id = %id, "rejected rule string"))?;
        let (nodes, tokens) = (compiled.ast.len(), compiled.tokens.len());
        self.store.replace(id, compiled.ast, compiled.tokens)?;
        debug!(rule_id = %id, nodes, tokens, "replaced rule");
        Ok(self.store.get(&RuleRef::Id(id))?.clone())
    }

    /// Evaluate a stored rule against `record`.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown rule, or any
    /// [`EvalError`](crate::EvalError) raised while walking its graph.
    #[instrument(skip(self, rule, record))]
    pub fn evaluate(&self, rule: impl Into<RuleRef>, record: &Record) -> Result<Verdict, RuleitError> {
        let rule = self.store.get(&rule.into())?;
        let verdict = crate::evaluate(&self.store, rule.root, record, self.config.max_depth)
            .inspect_err(|err| warn!(%err, rule_id = %rule.id, "evaluation failed"))?;
        debug!(rule_id = %rule.id, %verdict, "evaluated rule");
        Ok(verdict)
    }

    /// # Errors
    ///
    /// Returns a not-found error for an unknown id or name.
    pub fn rule(&self, rule: impl Into<RuleRef>) -> Result<&Rule, RuleitError> {
        Ok(self.store.get(&rule.into())?)
    }

    #[must_use]
    pub fn rules(&self, page: Page) -> Vec<&Rule> {
        self.store.list(page)
    }

    /// Render a stored rule as a fully parenthesised infix string.
    ///
    /// # Errors
    ///
    /// Returns a not-found error for an unknown rule, or
    /// [`EvalError::DepthExceeded`](crate::EvalError::DepthExceeded) when the
    /// graph nests deeper than the configured limit.
    pub fn render(&self, rule: impl Into<RuleRef>) -> Result<String, RuleitError> {
        let rule = self.store.get(&rule.into())?;
        check_depth(&self.store, rule.root, self.config.max_depth)?;
        Ok(self.store.display(rule.root).to_string())
    }

    #[must_use]
    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    #[must_use]
    pub fn into_store(self) -> S {
        self.store
    }

    #[must_use]
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    fn store_new(
        &mut self,
        compiled: CompiledSource,
        name: Option<&str>,
    ) -> Result<Rule, RuleitError> {
        let (nodes, tokens) = (compiled.ast.len(), compiled.tokens.len());
        let id = self
            .store
            .insert(compiled.ast, compiled.tokens, name.map(str::to_owned))
            .inspect_err(|err| warn!(%err, "store rejected rule"))?;
        debug!(rule_id = %id, nodes, tokens, "created rule");
        Ok(self.store.get(&RuleRef::Id(id))?.clone())
    }
}
