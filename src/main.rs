//! sqlward - natural-language to SQL with a query-safety gate.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::{error, info};

use sqlward::cli::{Cli, Command};
use sqlward::config::Config;
use sqlward::eval::{load_cases, summarize, write_records, Evaluator};
use sqlward::logging;
use sqlward::oracle::{GeminiClient, MockOracle, Oracle, OracleProvider};
use sqlward::pipeline::{PipelineOutcome, QueryPipeline};
use sqlward::safety::ScopeClassifier;
use sqlward::warehouse::{self, WarehouseBackend, WarehouseClient};

/// Probe questions for the scope command, mirroring the manual test set.
const SCOPE_PROBE_QUESTIONS: [&str; 5] = [
    "Quel est le chiffre d'affaires total en 2023 ?",
    "Combien de clients ont acheté un produit en solde ?",
    "Quelle est la capitale de la France ?",
    "Combien de tickets ont été vendus à Paris ?",
    "Quels sont les produits les plus vendus par région ?",
];

#[tokio::main]
async fn main() {
    // .env is optional; ignore a missing file.
    let _ = dotenvy::dotenv();
    logging::init_stderr_logging();

    if let Err(e) = run().await {
        error!("{e:#}");
        std::process::exit(1);
    }
}

async fn run() -> Result<()> {
    let cli = Cli::parse_args();

    let config_path = cli.config_path();
    info!("Loading config from: {}", config_path.display());
    let mut config = Config::load_from_file(&config_path)?;
    config.apply_env_defaults();

    let warehouse = build_warehouse(&cli, &config)?;

    match &cli.command {
        Command::Ask { question, execute } => {
            let oracle = build_generation_oracle(&cli, &config)?;
            let mut pipeline = QueryPipeline::new(oracle, warehouse, &config.oracle);
            if *execute {
                pipeline = pipeline.with_execution();
            }

            let outcome = pipeline.ask(question).await;
            match &outcome {
                PipelineOutcome::Answer { sql, execution } => {
                    println!("{sql}");
                    if let Some(execution) = execution {
                        match &execution.rows {
                            Some(rows) => println!("{}", serde_json::to_string_pretty(rows)?),
                            None => eprintln!("query execution failed"),
                        }
                    }
                }
                refused => {
                    eprintln!("{}", refused.describe());
                    std::process::exit(2);
                }
            }
        }

        Command::Eval { cases, output } => {
            let (base, tuned, judge) = build_eval_oracles(&cli, &config)?;
            let evaluator = Evaluator::new(base, tuned, judge, warehouse, &config.oracle);

            let cases = load_cases(cases)?;
            info!("Evaluating {} cases", cases.len());
            let records = evaluator.evaluate(&cases).await;

            let output = output
                .clone()
                .unwrap_or_else(|| logging::eval_output_dir().join("evaluation_results.jsonl"));
            write_records(&output, &records)?;
            info!("Results written to: {}", output.display());

            let summary = summarize(&records);
            println!("Cases: {} ({} in-scope, {} out-of-scope)", summary.total, summary.in_scope, summary.out_of_scope);
            println!("Base execution accuracy:       {:.1}%", summary.base.exec_accuracy);
            println!("Fine-tuned execution accuracy: {:.1}%", summary.tuned.exec_accuracy);
            println!("Base semantic accuracy:        {:.1}%", summary.base.semantic_accuracy);
            println!("Fine-tuned semantic accuracy:  {:.1}%", summary.tuned.semantic_accuracy);
            println!("Base refusal rate:             {:.1}%", summary.base.refusal_rate);
            println!("Fine-tuned refusal rate:       {:.1}%", summary.tuned.refusal_rate);
        }

        Command::Scope { questions } => {
            let oracle = build_generation_oracle(&cli, &config)?;
            let classifier = ScopeClassifier::new(oracle);

            let questions: Vec<String> = if questions.is_empty() {
                SCOPE_PROBE_QUESTIONS.iter().map(|q| q.to_string()).collect()
            } else {
                questions.clone()
            };

            for question in &questions {
                let label = classifier.classify(question).await;
                println!("[{}] {question}", label.as_str().to_uppercase());
            }
        }
    }

    Ok(())
}

/// Builds the warehouse client, honoring the global --mock flag.
fn build_warehouse(cli: &Cli, config: &Config) -> Result<Arc<dyn WarehouseClient>> {
    let backend = if cli.mock {
        WarehouseBackend::Mock
    } else {
        WarehouseBackend::BigQuery
    };
    let client = warehouse::connect(backend, &config.warehouse)
        .context("failed to create warehouse client")?;
    Ok(Arc::from(client))
}

/// Builds the oracle used for generation, scope and judging in live commands.
fn build_generation_oracle(cli: &Cli, config: &Config) -> Result<Arc<dyn Oracle>> {
    let provider = if cli.mock {
        OracleProvider::Mock
    } else {
        config
            .oracle
            .provider
            .parse::<OracleProvider>()
            .map_err(anyhow::Error::msg)?
    };

    Ok(match provider {
        OracleProvider::Mock => Arc::new(MockOracle::new()),
        OracleProvider::Gemini => Arc::new(
            GeminiClient::for_model(&config.oracle).context("failed to create oracle client")?,
        ),
    })
}

/// Builds the (base, tuned, judge) oracle triple for evaluation.
fn build_eval_oracles(
    cli: &Cli,
    config: &Config,
) -> Result<(Arc<dyn Oracle>, Arc<dyn Oracle>, Arc<dyn Oracle>)> {
    if cli.mock {
        let mock: Arc<dyn Oracle> = Arc::new(MockOracle::new());
        return Ok((Arc::clone(&mock), Arc::clone(&mock), mock));
    }

    let base: Arc<dyn Oracle> = Arc::new(
        GeminiClient::for_model(&config.oracle).context("failed to create base oracle")?,
    );
    let tuned: Arc<dyn Oracle> = Arc::new(
        GeminiClient::for_tuned_endpoint(&config.oracle)
            .context("failed to create fine-tuned oracle")?,
    );
    Ok((Arc::clone(&base), tuned, base))
}
