//! Prompt construction for SQL generation.
//!
//! Builds the generation prompt with the dataset schema injected, plus a
//! small few-shot block that anchors the output format.

use crate::warehouse::DatasetSchema;

/// Token the model is instructed to answer with when it cannot produce a
/// query for the question. The pipeline turns it into a clarification
/// request rather than a refusal.
pub const REFUSAL_TOKEN: &str = "INCOMPLETE_SCHEMA";

/// Few-shot examples anchoring the expected output shape.
const FEW_SHOT_EXAMPLES: &str = r#"Example 1:
Question: Quel est le chiffre d'affaires total ?
SQL:
SELECT SUM(montant) AS total FROM tickets

Example 2:
Question: Combien de tickets ont été émis en 2023 ?
SQL:
SELECT COUNT(*) AS total FROM tickets
WHERE EXTRACT(YEAR FROM PARSE_DATE('%d/%m/%Y', DATE_TICKET)) = 2023

Example 3:
Question: Quel est le produit le plus vendu ?
SQL:
SELECT produit, COUNT(*) AS total FROM ventes
GROUP BY produit ORDER BY total DESC LIMIT 1"#;

/// System prompt template for the SQL generation call.
const GENERATION_PROMPT_TEMPLATE: &str = r#"You are a SQL assistant for a retail analytics warehouse. Translate the natural-language question into a single valid BigQuery SQL query.

DATABASE SCHEMA:
{schema}

INSTRUCTIONS:
- If the question cannot be answered from the schema, reply ONLY with 'INCOMPLETE_SCHEMA'
- For "how many" questions, use COUNT(*) AS total
- Use only valid BigQuery functions
- Do not invent table or column names
- No SQL comments (--)
- Return the simplest query that answers the question
- The DATE_TICKET column is a STRING in DD/MM/YYYY format; use PARSE_DATE('%d/%m/%Y', DATE_TICKET)

EXAMPLES:
{examples}

Question : {question}"#;

/// Builds the full generation prompt for a question.
pub fn build_generation_prompt(schema: &DatasetSchema, question: &str) -> String {
    GENERATION_PROMPT_TEMPLATE
        .replace("{schema}", &schema.format_for_prompt())
        .replace("{examples}", FEW_SHOT_EXAMPLES)
        .replace("{question}", question)
}
