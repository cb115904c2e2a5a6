//! Evaluation harness tests over the mock oracle and mock warehouse.

use std::sync::Arc;

use pretty_assertions::assert_eq;
use tempfile::tempdir;

use sqlward::config::OracleConfig;
use sqlward::eval::{load_cases, summarize, write_records, EvalCase, Evaluator};
use sqlward::oracle::{MockOracle, REFUSAL_TOKEN};
use sqlward::safety::ScopeLabel;
use sqlward::warehouse::MockWarehouseClient;

fn cases() -> Vec<EvalCase> {
    vec![
        EvalCase {
            question: "Combien de clients ont commandé ?".to_string(),
            expected_sql: "SELECT COUNT(*) AS total FROM clients".to_string(),
        },
        EvalCase {
            question: "Quel est le chiffre d'affaires total ?".to_string(),
            expected_sql: "SELECT SUM(montant) AS total FROM tickets".to_string(),
        },
        EvalCase {
            question: "Quelle est la capitale de la France ?".to_string(),
            expected_sql: "".to_string(),
        },
    ]
}

fn evaluator(base: MockOracle, tuned: MockOracle) -> Evaluator {
    Evaluator::new(
        Arc::new(base),
        Arc::new(tuned),
        Arc::new(MockOracle::new()),
        Arc::new(MockWarehouseClient::new()),
        &OracleConfig::default(),
    )
}

#[tokio::test]
async fn test_full_run_over_mixed_scope_cases() {
    let evaluator = evaluator(MockOracle::new(), MockOracle::new());
    let records = evaluator.evaluate(&cases()).await;

    assert_eq!(records.len(), 3);
    assert_eq!(records[0].scope, ScopeLabel::InScope);
    assert_eq!(records[1].scope, ScopeLabel::InScope);
    assert_eq!(records[2].scope, ScopeLabel::OutOfScope);

    let summary = summarize(&records);
    assert_eq!(summary.in_scope, 2);
    assert_eq!(summary.out_of_scope, 1);

    // Both in-scope completions pass the gate and execute on the mock
    // warehouse; the judge mock awards full marks.
    assert_eq!(summary.base.exec_accuracy, 100.0);
    assert_eq!(summary.base.semantic_accuracy, 100.0);
}

#[tokio::test]
async fn test_tuned_refusal_shows_up_in_refusal_rate() {
    // The tuned model answers the out-of-scope question with the refusal
    // token, which the gate rejects; the base model hallucinates a query.
    let tuned = MockOracle::new().with_response("Question : Quelle est la capitale", REFUSAL_TOKEN);
    let evaluator = evaluator(MockOracle::new(), tuned);

    let records = evaluator.evaluate(&cases()).await;
    let summary = summarize(&records);

    assert_eq!(summary.base.refusal_rate, 0.0);
    assert_eq!(summary.tuned.refusal_rate, 100.0);

    let tuned_result = &records[2].tuned;
    assert!(!tuned_result.safe);
    assert_eq!(tuned_result.reason, "does not start with SELECT or WITH");
    assert!(!tuned_result.executed);
}

#[tokio::test]
async fn test_quoted_completion_is_normalized_before_probing() {
    // The quote layer is stripped before the gate runs; the stripped text
    // is what the record carries and what the warehouse receives.
    let tuned = MockOracle::new().with_response(
        "Question : Combien de clients",
        "\"SELECT COUNT(*) AS total FROM clients\"",
    );
    let evaluator = evaluator(MockOracle::new(), tuned);

    let records = evaluator.evaluate(&cases()).await;
    let result = &records[0].tuned;

    assert!(result.safe);
    assert_eq!(
        result.sql.as_deref(),
        Some("SELECT COUNT(*) AS total FROM clients")
    );
    assert!(result.executed);
}

#[tokio::test]
async fn test_failing_generator_scores_zero_everywhere() {
    let evaluator = evaluator(MockOracle::failing(), MockOracle::new());
    let records = evaluator.evaluate(&cases()).await;
    let summary = summarize(&records);

    assert_eq!(summary.base.exec_accuracy, 0.0);
    for record in &records {
        assert!(record.base.sql.is_none());
        assert_eq!(record.base.reason, "non-textual output");
    }
}

#[test]
fn test_cases_roundtrip_through_jsonl() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("validation.jsonl");

    let mut content = String::new();
    for case in cases() {
        content.push_str(&serde_json::to_string(&case).unwrap());
        content.push('\n');
    }
    // Blank lines between records are tolerated.
    content.push('\n');
    std::fs::write(&path, content).unwrap();

    let loaded = load_cases(&path).unwrap();
    assert_eq!(loaded.len(), 3);
    assert_eq!(loaded[0].question, "Combien de clients ont commandé ?");
}

#[test]
fn test_load_cases_rejects_malformed_lines() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("broken.jsonl");
    std::fs::write(&path, "{\"question\": \"q\"}\n").unwrap();

    assert!(load_cases(&path).is_err());
}

#[tokio::test]
async fn test_write_records_creates_parent_dirs() {
    let evaluator = evaluator(MockOracle::new(), MockOracle::new());
    let records = evaluator.evaluate(&cases()[..1].to_vec()).await;

    let dir = tempdir().unwrap();
    let path = dir.path().join("nested").join("results.jsonl");
    write_records(&path, &records).unwrap();

    let written = std::fs::read_to_string(&path).unwrap();
    assert_eq!(written.lines().count(), 1);
    assert!(written.contains("\"scope\":\"in_scope\""));
}
