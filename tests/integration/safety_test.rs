//! Adversarial tests for the safety gate public surface.
//!
//! Exercises the same completion shapes a drifting or manipulated model
//! emits in practice: decorated output, smuggled DML, degenerate literals.

use pretty_assertions::assert_eq;

use sqlward::safety::{validate_question, SqlGate, FORBIDDEN_KEYWORDS};

fn reason(completion: &str) -> String {
    SqlGate::new().sanitize_completion(Some(completion)).reason()
}

#[test]
fn test_plain_select_is_ok() {
    assert_eq!(reason("SELECT * FROM tickets LIMIT 10"), "OK");
}

#[test]
fn test_quoted_select_is_ok() {
    // One decorating quote layer comes off before the checks run.
    assert_eq!(reason("\"SELECT COUNT(*) AS total FROM clients\""), "OK");
    assert_eq!(reason("“SELECT COUNT(*) AS total FROM clients”"), "OK");
}

#[test]
fn test_every_forbidden_keyword_is_caught() {
    for keyword in FORBIDDEN_KEYWORDS {
        let smuggled = format!("SELECT 1; {keyword} TABLE clients");
        assert_eq!(reason(&smuggled), format!("forbidden keyword: {keyword}"));

        let lowercase = format!("select 1; {} table clients", keyword.to_lowercase());
        assert_eq!(reason(&lowercase), format!("forbidden keyword: {keyword}"));
    }
}

#[test]
fn test_keyword_inside_identifier_is_allowed() {
    assert_eq!(reason("SELECT updated_at FROM tickets"), "OK");
    assert_eq!(reason("SELECT * FROM inserted_rows"), "OK");
    assert_eq!(reason("SELECT droplet_id FROM servers"), "OK");
}

#[test]
fn test_keyword_in_subquery_is_caught() {
    let sql = "SELECT * FROM (SELECT 1) t; DELETE FROM clients WHERE 1=1";
    assert_eq!(reason(sql), "forbidden keyword: DELETE");
}

#[test]
fn test_non_select_statements_are_rejected() {
    assert_eq!(
        reason("EXPLAIN SELECT 1"),
        "does not start with SELECT or WITH"
    );
    assert_eq!(
        reason("Here is your query: SELECT 1"),
        "does not start with SELECT or WITH"
    );
}

#[test]
fn test_leading_clause_check_runs_before_denylist() {
    // The clause check wins over the keyword scan when both would fire.
    assert_eq!(
        reason("GRANT ALL ON clients; DROP TABLE clients"),
        "does not start with SELECT or WITH"
    );
}

#[test]
fn test_degenerate_completions() {
    let gate = SqlGate::new();
    assert_eq!(gate.sanitize_completion(None).reason(), "non-textual output");
    assert_eq!(reason("   "), "empty output");
    assert_eq!(reason("True"), "invalid boolean output");
    assert_eq!(reason("'false'"), "invalid boolean output");
}

#[test]
fn test_verdict_is_stable_across_calls() {
    let gate = SqlGate::new();
    let first = gate.sanitize_completion(Some("SELECT 1; DROP TABLE t"));
    let second = gate.sanitize_completion(Some("SELECT 1; DROP TABLE t"));
    assert_eq!(first, second);
}

#[test]
fn test_question_validation_counts_characters_not_bytes() {
    assert!(validate_question("été"));
    assert!(!validate_question("é "));
}
