//! The live request pipeline.
//!
//! Wires the stages in order: input validation, scope classification, SQL
//! generation, the safety gate, and (optionally) execution. A false verdict
//! from any stage is terminal; the reason travels to the caller.

use std::sync::Arc;

use tracing::{info, warn};

use crate::config::OracleConfig;
use crate::oracle::{build_generation_prompt, GenerationConfig, Oracle, REFUSAL_TOKEN};
use crate::probe::{ExecutionOutcome, ExecutionProbe};
use crate::safety::{validate_question, CandidateSql, ScopeClassifier, ScopeLabel, SqlGate};
use crate::warehouse::{DatasetSchema, WarehouseClient};

/// Terminal outcome of one question through the pipeline.
#[derive(Debug)]
pub enum PipelineOutcome {
    /// The question failed input validation; no oracle call was made.
    Invalid,
    /// The question does not concern the supported business domain.
    OutOfScope,
    /// The model could not produce a query; the user should rephrase.
    NeedsClarification,
    /// The generated SQL was rejected by the safety gate.
    Unsafe {
        /// Machine-readable gate reason.
        reason: String,
    },
    /// A safe query was produced.
    Answer {
        sql: String,
        /// Present when the pipeline was built with execution enabled.
        execution: Option<ExecutionOutcome>,
    },
}

impl PipelineOutcome {
    /// Returns true if the pipeline produced an executable query.
    pub fn is_answer(&self) -> bool {
        matches!(self, Self::Answer { .. })
    }

    /// A short user-facing description of the outcome.
    pub fn describe(&self) -> String {
        match self {
            Self::Invalid => "invalid input: please enter a more descriptive question".to_string(),
            Self::OutOfScope => "question is outside the supported business domain".to_string(),
            Self::NeedsClarification => {
                "the model cannot answer this question: please clarify or rephrase".to_string()
            }
            Self::Unsafe { reason } => format!("generated SQL was rejected: {reason}"),
            Self::Answer { sql, .. } => sql.clone(),
        }
    }
}

/// The question-to-SQL pipeline over injected collaborators.
pub struct QueryPipeline {
    oracle: Arc<dyn Oracle>,
    warehouse: Arc<dyn WarehouseClient>,
    classifier: ScopeClassifier,
    gate: SqlGate,
    generation: GenerationConfig,
    execute: bool,
}

impl QueryPipeline {
    /// Creates a pipeline. Generation settings come from the oracle config;
    /// execution is off by default.
    pub fn new(
        oracle: Arc<dyn Oracle>,
        warehouse: Arc<dyn WarehouseClient>,
        config: &OracleConfig,
    ) -> Self {
        Self {
            classifier: ScopeClassifier::new(Arc::clone(&oracle)),
            gate: SqlGate::new(),
            generation: GenerationConfig::for_generation(config),
            execute: false,
            oracle,
            warehouse,
        }
    }

    /// Enables execution of gated-safe queries.
    pub fn with_execution(mut self) -> Self {
        self.execute = true;
        self
    }

    /// Runs one question through the full pipeline.
    pub async fn ask(&self, question: &str) -> PipelineOutcome {
        if !validate_question(question) {
            return PipelineOutcome::Invalid;
        }

        if self.classifier.classify(question).await == ScopeLabel::OutOfScope {
            info!(question, "refused out-of-scope question");
            return PipelineOutcome::OutOfScope;
        }

        let completion = match self.generate_sql(question).await {
            Some(completion) => completion,
            None => return PipelineOutcome::NeedsClarification,
        };

        let candidate = CandidateSql::from_completion(completion.as_deref());
        if matches!(&candidate, CandidateSql::Text(text) if text == REFUSAL_TOKEN) {
            return PipelineOutcome::NeedsClarification;
        }

        let verdict = self.gate.sanitize(&candidate);
        if !verdict.is_safe() {
            let reason = verdict.reason();
            warn!(question, reason, "generated SQL rejected by safety gate");
            return PipelineOutcome::Unsafe { reason };
        }

        // A Safe verdict only ever comes from a textual candidate; the
        // normalized text is what gets reported and executed.
        let CandidateSql::Text(sql) = candidate else {
            return PipelineOutcome::Unsafe {
                reason: "non-textual output".to_string(),
            };
        };

        let execution = if self.execute {
            let probe = ExecutionProbe::new(Arc::clone(&self.warehouse));
            Some(probe.execute(&sql).await)
        } else {
            None
        };

        PipelineOutcome::Answer { sql, execution }
    }

    /// Calls the oracle for SQL generation.
    ///
    /// Generation failures degrade to a clarification request rather than an
    /// error: the caller cannot act on a transport failure any differently.
    async fn generate_sql(&self, question: &str) -> Option<Option<String>> {
        let schema = self.fetch_schema().await;
        let prompt = build_generation_prompt(&schema, question);

        match self.oracle.generate(&prompt, &self.generation).await {
            Ok(completion) => Some(completion),
            Err(e) => {
                warn!(error = %e, "SQL generation failed");
                None
            }
        }
    }

    /// Fetches the dataset schema for prompt injection.
    ///
    /// An introspection failure degrades to an empty schema; the model is
    /// instructed to answer with the refusal token when the schema is
    /// insufficient.
    async fn fetch_schema(&self) -> DatasetSchema {
        match self.warehouse.list_tables().await {
            Ok(schema) => schema,
            Err(e) => {
                warn!(error = %e, "schema introspection failed");
                DatasetSchema::new()
            }
        }
    }
}
