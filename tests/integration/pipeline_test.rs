//! End-to-end pipeline tests over the mock oracle and mock warehouse.

use std::sync::Arc;

use sqlward::config::OracleConfig;
use sqlward::oracle::{MockOracle, REFUSAL_TOKEN};
use sqlward::pipeline::{PipelineOutcome, QueryPipeline};
use sqlward::warehouse::{FailingWarehouseClient, MockWarehouseClient};

fn mock_pipeline(oracle: MockOracle) -> QueryPipeline {
    QueryPipeline::new(
        Arc::new(oracle),
        Arc::new(MockWarehouseClient::new()),
        &OracleConfig::default(),
    )
}

#[tokio::test]
async fn test_in_scope_question_end_to_end() {
    let pipeline = mock_pipeline(MockOracle::new()).with_execution();

    let outcome = pipeline
        .ask("Combien de clients ont acheté un produit en solde ?")
        .await;

    match outcome {
        PipelineOutcome::Answer { sql, execution } => {
            assert!(sql.to_uppercase().starts_with("SELECT"));
            let execution = execution.expect("execution was enabled");
            assert!(execution.succeeded);
            let rows = execution.rows.expect("successful probe carries rows");
            assert_eq!(rows.row_count, 1);
        }
        other => panic!("expected Answer, got {other:?}"),
    }
}

#[tokio::test]
async fn test_out_of_scope_question_never_reaches_warehouse() {
    let pipeline = QueryPipeline::new(
        Arc::new(MockOracle::new()),
        // A failing warehouse proves nothing downstream of the scope
        // classifier runs for a refused question.
        Arc::new(FailingWarehouseClient::new()),
        &OracleConfig::default(),
    )
    .with_execution();

    let outcome = pipeline.ask("Quelle est la capitale de la France ?").await;
    assert!(matches!(outcome, PipelineOutcome::OutOfScope));
}

#[tokio::test]
async fn test_dangerous_completion_is_blocked() {
    let oracle = MockOracle::new().with_response(
        "Question : Supprime",
        "SELECT id FROM clients; DROP TABLE clients;",
    );
    let pipeline = mock_pipeline(oracle).with_execution();

    let outcome = pipeline.ask("Supprime tous les clients").await;

    match outcome {
        PipelineOutcome::Unsafe { reason } => {
            assert_eq!(reason, "forbidden keyword: DROP");
        }
        other => panic!("expected Unsafe, got {other:?}"),
    }
}

#[tokio::test]
async fn test_refusal_token_requests_clarification() {
    let oracle = MockOracle::new().with_response("Question : Combien", REFUSAL_TOKEN);
    let outcome = mock_pipeline(oracle)
        .ask("Combien de licornes vendues ?")
        .await;
    assert!(matches!(outcome, PipelineOutcome::NeedsClarification));
}

#[tokio::test]
async fn test_warehouse_failure_degrades_execution_only() {
    // Introspection and execution both fail, but a well-formed completion
    // still yields an Answer; only the probe outcome records the failure.
    let pipeline = QueryPipeline::new(
        Arc::new(MockOracle::new()),
        Arc::new(FailingWarehouseClient::new()),
        &OracleConfig::default(),
    )
    .with_execution();

    let outcome = pipeline.ask("Combien de tickets ce mois-ci ?").await;

    match outcome {
        PipelineOutcome::Answer { execution, .. } => {
            let execution = execution.expect("execution was enabled");
            assert!(!execution.succeeded);
            assert!(execution.rows.is_none());
        }
        other => panic!("expected Answer, got {other:?}"),
    }
}

#[tokio::test]
async fn test_blank_question_is_rejected_before_any_call() {
    let pipeline = QueryPipeline::new(
        Arc::new(MockOracle::failing()),
        Arc::new(FailingWarehouseClient::new()),
        &OracleConfig::default(),
    );

    let outcome = pipeline.ask("   ").await;
    assert!(matches!(outcome, PipelineOutcome::Invalid));
}
