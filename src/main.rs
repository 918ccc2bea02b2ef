use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::task::JoinSet;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use eikenvocab::args::{Cli, Commands, GradeArgs, MakeListsArgs, RankArgs, ReorderArgs};
use eikenvocab::config::AppConfig;
use eikenvocab::dict::DictionarySet;
use eikenvocab::duplex::reorder_pdf;
use eikenvocab::enrich::EnrichOptions;
use eikenvocab::lookup::{HttpLookup, Throttle};
use eikenvocab::pipeline::{format_ranked, Pipeline};
use eikenvocab::store::JsonStore;

type AppPipeline = Pipeline<HttpLookup, JsonStore>;

fn pipeline(config: &AppConfig, args: &GradeArgs, store: JsonStore) -> anyhow::Result<AppPipeline> {
    let dictionaries = DictionarySet::load(&config.dictionaries.dir, &config.dictionaries.names)
        .context("couldn't load spelling dictionaries")?;
    Ok(Pipeline {
        dictionaries: Arc::new(dictionaries),
        lookup: Arc::new(HttpLookup::new(&config.lookup)?),
        store: Arc::new(store),
        options: EnrichOptions::from(&config.lookup),
        throttle: Arc::new(Throttle::new(config.lookup.throttle())),
        data_dir: args
            .datapath
            .clone()
            .unwrap_or_else(|| config.paths.data_dir.clone()),
        drop_first_and_last_pages: config.corpus.drop_first_and_last_pages,
        limit: args.wordlimit,
    })
}

async fn make_lists(config: &AppConfig, args: MakeListsArgs) -> anyhow::Result<()> {
    let output = args
        .outputpath
        .clone()
        .unwrap_or_else(|| config.paths.output_dir.clone());
    let pipeline = pipeline(config, &args.grades, JsonStore::new(output))?;
    pipeline.lookup.check_credentials()?;

    let grades = args.grades.grades();
    if !args.parallel {
        for grade in grades {
            pipeline
                .make_list(grade)
                .await
                .with_context(|| format!("grade {grade} failed"))?;
        }
        return Ok(());
    }

    // grades write to separate tables, so one failing leaves the rest intact
    let mut set = JoinSet::new();
    for grade in grades {
        let pipeline = pipeline.clone();
        set.spawn(async move { (grade, pipeline.make_list(grade).await) });
    }
    let mut failed = vec![];
    while let Some(joined) = set.join_next().await {
        let (grade, result) = joined?;
        if let Err(e) = result {
            error!("grade {} failed: {}", grade, e);
            failed.push(grade.to_string());
        }
    }
    if !failed.is_empty() {
        anyhow::bail!("grades failed: {}", failed.join(", "));
    }
    Ok(())
}

async fn rank(config: &AppConfig, args: RankArgs) -> anyhow::Result<()> {
    let pipeline = pipeline(
        config,
        &args.grades,
        JsonStore::new(config.paths.output_dir.clone()),
    )?;
    for grade in args.grades.grades() {
        let words = pipeline
            .rank_grade(grade)
            .await
            .with_context(|| format!("grade {grade} failed"))?;
        println!("# grade {}", grade.label());
        print!("{}", format_ranked(&words));
    }
    Ok(())
}

fn reorder(args: ReorderArgs) -> anyhow::Result<()> {
    let output = reorder_pdf(&args.input, args.output.as_deref())
        .with_context(|| format!("couldn't reorder {}", args.input.display()))?;
    println!("{}", output.display());
    Ok(())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("eikenvocab=info")),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref()).context("couldn't load config")?;
    info!("data in {}", config.paths.data_dir.display());

    match cli.cmd {
        Commands::MakeLists(args) => make_lists(&config, args).await,
        Commands::Rank(args) => rank(&config, args).await,
        Commands::Reorder(args) => reorder(args),
    }
}
