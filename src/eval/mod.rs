//! Offline evaluation harness.
//!
//! Replays a validation set of (question, expected SQL) pairs against two
//! generators — the base model and the fine-tuned one — and measures safety,
//! execution and semantic quality per scope. Runs entirely through the same
//! gate and probe as the live pipeline, so evaluation numbers reflect what
//! production would actually execute.

use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::config::OracleConfig;
use crate::error::{Result, SqlwardError};
use crate::judge::{SemanticJudge, MAX_SCORE};
use crate::oracle::{build_generation_prompt, GenerationConfig, Oracle};
use crate::probe::ExecutionProbe;
use crate::safety::{CandidateSql, ScopeClassifier, ScopeLabel, SqlGate};
use crate::warehouse::{DatasetSchema, WarehouseClient};

/// One validation pair from the evaluation set.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalCase {
    /// The natural-language question.
    pub question: String,
    /// The approved reference query.
    pub expected_sql: String,
}

/// Loads evaluation cases from a JSONL file (one case per line).
pub fn load_cases(path: &Path) -> Result<Vec<EvalCase>> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| SqlwardError::config(format!("Failed to read eval set: {e}")))?;

    content
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| {
            serde_json::from_str(line)
                .map_err(|e| SqlwardError::config(format!("Invalid eval case: {e}")))
        })
        .collect()
}

/// Per-model result for one case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelResult {
    /// Normalized generated SQL, absent when the completion carried no
    /// usable text (oracle failure, non-textual, empty or boolean output).
    pub sql: Option<String>,
    /// Whether the safety gate passed the candidate.
    pub safe: bool,
    /// Gate reason ("OK" when safe).
    pub reason: String,
    /// Whether the probe executed the query successfully.
    pub executed: bool,
    /// Semantic similarity score in [0.0, 2.0].
    pub semantic: f64,
}

/// Full record for one evaluated case.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EvalRecord {
    pub question: String,
    pub expected_sql: String,
    pub scope: ScopeLabel,
    pub base: ModelResult,
    pub tuned: ModelResult,
}

/// Aggregated metrics for one model.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct ModelSummary {
    /// Share of in-scope queries that executed successfully, in percent.
    pub exec_accuracy: f64,
    /// Mean in-scope semantic score normalized to percent.
    pub semantic_accuracy: f64,
    /// Share of out-of-scope cases the gate refused, in percent.
    pub refusal_rate: f64,
}

/// Aggregated metrics over a whole evaluation run.
#[derive(Debug, Clone, Copy, Default, Serialize)]
pub struct EvalSummary {
    pub total: usize,
    pub in_scope: usize,
    pub out_of_scope: usize,
    pub base: ModelSummary,
    pub tuned: ModelSummary,
}

/// Which model a per-record accessor should read.
#[derive(Debug, Clone, Copy)]
enum Model {
    Base,
    Tuned,
}

fn model_result<'a>(record: &'a EvalRecord, model: Model) -> &'a ModelResult {
    match model {
        Model::Base => &record.base,
        Model::Tuned => &record.tuned,
    }
}

/// Computes the aggregated summary over a set of records.
pub fn summarize(records: &[EvalRecord]) -> EvalSummary {
    let in_scope: Vec<&EvalRecord> = records
        .iter()
        .filter(|r| r.scope == ScopeLabel::InScope)
        .collect();
    let out_of_scope: Vec<&EvalRecord> = records
        .iter()
        .filter(|r| r.scope == ScopeLabel::OutOfScope)
        .collect();

    let summarize_model = |model: Model| -> ModelSummary {
        let exec_accuracy = mean(
            in_scope
                .iter()
                .map(|r| if model_result(r, model).executed { 1.0 } else { 0.0 }),
        ) * 100.0;
        let semantic_accuracy = mean(in_scope.iter().map(|r| model_result(r, model).semantic))
            / MAX_SCORE
            * 100.0;
        let refusal_rate = mean(
            out_of_scope
                .iter()
                .map(|r| if model_result(r, model).safe { 0.0 } else { 1.0 }),
        ) * 100.0;

        ModelSummary {
            exec_accuracy,
            semantic_accuracy,
            refusal_rate,
        }
    };

    EvalSummary {
        total: records.len(),
        in_scope: in_scope.len(),
        out_of_scope: out_of_scope.len(),
        base: summarize_model(Model::Base),
        tuned: summarize_model(Model::Tuned),
    }
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    if count == 0 {
        0.0
    } else {
        sum / count as f64
    }
}

/// Writes evaluation records as JSONL.
pub fn write_records(path: &Path, records: &[EvalRecord]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .map_err(|e| SqlwardError::internal(format!("Failed to create results dir: {e}")))?;
    }

    let mut out = String::new();
    for record in records {
        let line = serde_json::to_string(record)
            .map_err(|e| SqlwardError::internal(format!("Failed to serialize record: {e}")))?;
        out.push_str(&line);
        out.push('\n');
    }

    std::fs::write(path, out)
        .map_err(|e| SqlwardError::internal(format!("Failed to write results: {e}")))
}

/// Evaluates two generators against a validation set.
pub struct Evaluator {
    base: Arc<dyn Oracle>,
    tuned: Arc<dyn Oracle>,
    classifier: ScopeClassifier,
    judge: SemanticJudge,
    probe: ExecutionProbe,
    warehouse: Arc<dyn WarehouseClient>,
    gate: SqlGate,
    generation: GenerationConfig,
}

impl Evaluator {
    /// Creates an evaluator.
    ///
    /// `judge_oracle` scores semantic similarity and classifies scope; it is
    /// usually the base model with deterministic settings.
    pub fn new(
        base: Arc<dyn Oracle>,
        tuned: Arc<dyn Oracle>,
        judge_oracle: Arc<dyn Oracle>,
        warehouse: Arc<dyn WarehouseClient>,
        config: &OracleConfig,
    ) -> Self {
        Self {
            base,
            tuned,
            classifier: ScopeClassifier::new(Arc::clone(&judge_oracle)),
            judge: SemanticJudge::new(judge_oracle),
            probe: ExecutionProbe::new(Arc::clone(&warehouse)),
            warehouse,
            gate: SqlGate::new(),
            generation: GenerationConfig::for_generation(config),
        }
    }

    /// Runs the full evaluation over the given cases.
    pub async fn evaluate(&self, cases: &[EvalCase]) -> Vec<EvalRecord> {
        let schema = match self.warehouse.list_tables().await {
            Ok(schema) => schema,
            Err(e) => {
                warn!(error = %e, "schema introspection failed, evaluating with empty schema");
                DatasetSchema::new()
            }
        };

        let mut records = Vec::with_capacity(cases.len());
        for (i, case) in cases.iter().enumerate() {
            info!(case = i + 1, total = cases.len(), "evaluating");
            records.push(self.evaluate_case(&schema, case).await);
        }
        records
    }

    async fn evaluate_case(&self, schema: &DatasetSchema, case: &EvalCase) -> EvalRecord {
        let scope = self.classifier.classify(&case.question).await;

        // The two generators are independent; run them concurrently.
        let (base, tuned) = futures::join!(
            self.evaluate_model(&self.base, schema, case),
            self.evaluate_model(&self.tuned, schema, case),
        );

        EvalRecord {
            question: case.question.clone(),
            expected_sql: case.expected_sql.clone(),
            scope,
            base,
            tuned,
        }
    }

    async fn evaluate_model(
        &self,
        oracle: &Arc<dyn Oracle>,
        schema: &DatasetSchema,
        case: &EvalCase,
    ) -> ModelResult {
        let prompt = build_generation_prompt(schema, &case.question);

        let completion = match oracle.generate(&prompt, &self.generation).await {
            Ok(completion) => completion,
            Err(e) => {
                warn!(error = %e, "generation failed during evaluation");
                None
            }
        };

        let candidate = CandidateSql::from_completion(completion.as_deref());
        let verdict = self.gate.sanitize(&candidate);
        let safe = verdict.is_safe();

        // The normalized text is the candidate of record; degenerate
        // completions carry no SQL.
        let sql = match candidate {
            CandidateSql::Text(text) => Some(text),
            _ => None,
        };

        // Only gated-safe SQL ever reaches the warehouse, mirroring the
        // live pipeline.
        let executed = match (&sql, safe) {
            (Some(sql), true) => self.probe.execute(sql).await.succeeded,
            _ => false,
        };

        let semantic = self
            .judge
            .score(
                &case.question,
                &case.expected_sql,
                sql.as_deref().unwrap_or(""),
            )
            .await;

        ModelResult {
            sql,
            safe,
            reason: verdict.reason(),
            executed,
            semantic,
        }
    }
}
