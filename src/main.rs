use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use happyhour::cli::Cli;
use happyhour::config::Settings;
use happyhour::data::parse_csv;
use happyhour::embeddings::{
    ItemsEmbeddingConfig, ItemsEmbeddingContext, OpenAIEmbeddings, SemanticSearchConfig,
};
use happyhour::llm::LlmClient;
use happyhour::recommend::{self, HappyHourRow};
use happyhour::ui::Console;

#[tokio::main]
async fn main() -> ExitCode {
    // Usage errors exit with 1 like every other failure; help and version exit 0
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.exit_code() == 0 {
                ExitCode::SUCCESS
            } else {
                ExitCode::FAILURE
            };
        }
    };
    init_tracing(cli.verbose);

    let console = Console::new();
    match run(cli, &console).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            console.error(&format!("{:#}", e));
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, console: &Console) -> Result<()> {
    let settings = Settings::load(cli.config.as_deref())?;

    let source = cli
        .data
        .clone()
        .unwrap_or_else(|| settings.search.data_path.clone());
    let search_config = SemanticSearchConfig {
        limit: cli.limit.unwrap_or(settings.search.limit),
        threshold: cli.threshold.or(settings.search.threshold),
    };

    let provider = Arc::new(OpenAIEmbeddings::from_config(&settings.openai)?);
    let config = ItemsEmbeddingConfig::new(
        &source,
        |contents: &str| parse_csv::<HappyHourRow>(contents),
        HappyHourRow::describe,
    );
    let mut ctx = ItemsEmbeddingContext::new(config, provider);

    // Cache lands next to the source, e.g. `drinks-happy-hour.embeddings.csv`
    let outcome = ctx.ensure_embeddings(cli.rebuild).await?;
    console.ensure_outcome(outcome);

    let query = cli.query();
    let results = ctx.semantic_search(query, &search_config).await?;

    if cli.search_only {
        console.search_results(query, &results);
        return Ok(());
    }

    if results.is_empty() {
        console.warn("No spots matched; nothing to recommend");
        return Ok(());
    }

    let llm = LlmClient::from_config(&settings.openai)?;
    let reply = recommend::recommend(&llm, query, &results).await?;
    console.recommendation(&reply);

    Ok(())
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "happyhour=debug"
    } else {
        "happyhour=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();
}
