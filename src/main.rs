mod cli;

use std::sync::Arc;

use anyhow::Context;
use ragloom::{
    ApplicationConfig, Embeddings, FileLoader, InMemoryCache, InMemoryVectorDb, Model,
    RagApplicationBuilder, SimpleModel, TextLoader,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::output::Output;
use crate::cli::{Cli, Commands};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let default_level = if cli.verbose { "ragloom=debug" } else { "ragloom=warn" };
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let output = if cli.no_color {
        Output::no_color()
    } else {
        Output::new()
    };

    if let Err(err) = run(cli, &output).await {
        output.error(&format!("{:#}", err));
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli, output: &Output) -> anyhow::Result<()> {
    match cli.command {
        Commands::Presets => {
            output.header("Model presets");
            for preset in SimpleModel::all() {
                let marker = if preset == SimpleModel::default() {
                    " (default)"
                } else {
                    ""
                };
                output.list_item(&format!("{}{}", preset, marker));
            }
            Ok(())
        }
        Commands::Query {
            question,
            texts,
            files,
            model,
            temperature,
            top_k,
        } => {
            let config = if cli.config.exists() {
                output.info(&format!("Using {}", cli.config.display()));
                ApplicationConfig::load(&cli.config)
                    .with_context(|| format!("loading {}", cli.config.display()))?
            } else {
                ApplicationConfig::default()
            };

            if texts.is_empty() && files.is_empty() {
                output.warning("No --text or --file given; answering without context");
            }

            // The store lives only as long as this process, so the cache must too
            let mut builder = config
                .apply(RagApplicationBuilder::new())?
                .set_vector_db(Arc::new(InMemoryVectorDb::new()))
                .set_cache(Arc::new(InMemoryCache::new()));

            if let Some(temperature) = temperature {
                builder = builder.set_temperature(temperature);
            }
            if let Some(model) = model {
                builder = builder.set_model(model.parse::<SimpleModel>()?);
            }
            if let Some(k) = top_k {
                builder = builder.set_search_result_count(k);
            }
            for text in texts {
                builder = builder.add_loader(Arc::new(TextLoader::new(text)));
            }
            for file in files {
                let loader = FileLoader::open(&file)
                    .await
                    .with_context(|| format!("opening {}", file.display()))?;
                builder = builder.add_loader(Arc::new(loader));
            }

            output.kv("Model", builder.model().model_name());
            output.kv("Temperature", &builder.temperature().to_string());
            output.kv("Embeddings", builder.embedding_model().model_name());

            let app = builder.build().await.context("building application")?;
            output.success(&format!(
                "Ingested {} chunks from {} sources",
                app.get_embeddings_count().await?,
                app.loader_ids().len()
            ));

            let response = app.query(&question).await?;

            output.header("Answer");
            output.answer(&response.result);
            if !response.sources.is_empty() {
                output.header("Sources");
                for source in &response.sources {
                    output.list_item(source);
                }
            }
            output.newline();
            Ok(())
        }
    }
}
