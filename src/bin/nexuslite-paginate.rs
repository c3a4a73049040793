use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};

use bson::{Bson, Document};
use clap::Parser;
use nexuslite_paginate::utils::json::{bson_to_json, parse_json_to_bson_document, parse_json_to_stages};
use nexuslite_paginate::{
    LabelOverrides, MemoryStore, PaginateDefaults, PaginateOptions, PaginationPlan, Paginator,
    PipelineFragment, logger,
};

#[derive(Parser, Debug)]
#[command(name = "nexuslite-paginate", version, about = "Paginate an NDJSON collection through an aggregation pipeline", long_about = None)]
struct Cli {
    #[arg(long, help = "NDJSON file with one document per line")]
    docs: PathBuf,
    #[arg(long = "match", help = "Filter JSON for the $match stage (e.g., {\"age\": {\"$gte\": 21}})")]
    filter: Option<String>,
    #[arg(long, help = "Sort JSON for the $sort stage (e.g., {\"age\": -1})")]
    sort: Option<String>,
    #[arg(long, help = "Shaping stages: a stage object or an array of stage objects")]
    shape: Option<String>,
    #[arg(long, conflicts_with = "offset", help = "1-based page number")]
    page: Option<String>,
    #[arg(long, help = "Number of documents to skip")]
    offset: Option<String>,
    #[arg(long, help = "Page size")]
    limit: Option<String>,
    #[arg(long, help = "Return every matching document as one page")]
    no_pagination: bool,
    #[arg(long, help = "Run documents and count as two parallel calls instead of one $facet")]
    no_facet: bool,
    #[arg(long, help = "Nest metadata under this field; an empty value flattens it")]
    meta_label: Option<String>,
    #[arg(long, help = "Path to a TOML file with paginate defaults")]
    config: Option<PathBuf>,
    #[arg(long, help = "Print the resolved options and both pipelines without running them")]
    explain: bool,
    #[arg(long, help = "Log the resolved options and pipelines to the dev log")]
    debug: bool,
    #[arg(long, help = "Directory for app.log and dev.log")]
    log_dir: Option<PathBuf>,
    #[arg(long, help = "off|error|warn|info|debug|trace")]
    log_level: Option<String>,
}

fn load_ndjson(path: &Path) -> Result<Vec<Document>, Box<dyn std::error::Error>> {
    let file = std::fs::File::open(path).map_err(|e| format!("{}: {e}", path.display()))?;
    let mut docs = Vec::new();
    for (n, line) in BufReader::new(file).lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let doc = parse_json_to_bson_document(&line).map_err(|e| format!("{}:{}: {e}", path.display(), n + 1))?;
        docs.push(doc);
    }
    Ok(docs)
}

fn stage(op: &str, json: Option<&str>) -> Result<PipelineFragment, Box<dyn std::error::Error>> {
    Ok(match json {
        Some(s) => {
            let mut d = Document::new();
            d.insert(op, parse_json_to_bson_document(s)?);
            PipelineFragment::from(d)
        }
        None => PipelineFragment::empty(),
    })
}

fn options_from(cli: &Cli) -> PaginateOptions {
    let mut opts = PaginateOptions::new();
    if let Some(l) = &cli.limit {
        opts = opts.limit(l.as_str());
    }
    if let Some(p) = &cli.page {
        opts = opts.page(p.as_str());
    }
    if let Some(o) = &cli.offset {
        opts = opts.offset(o.as_str());
    }
    if cli.no_pagination {
        opts = opts.pagination(false);
    }
    if cli.no_facet {
        opts = opts.use_facet(false);
    }
    if cli.debug {
        opts = opts.debug(true);
    }
    if let Some(m) = &cli.meta_label {
        let labels = if m.is_empty() { LabelOverrides::default().flatten() } else { LabelOverrides::default().meta(m) };
        opts = opts.custom_labels(labels);
    }
    opts
}

fn explain(plan: &PaginationPlan) -> serde_json::Value {
    let stages = |p: &[Document]| Bson::Array(p.iter().cloned().map(Bson::Document).collect());
    serde_json::json!({
        "strategy": plan.strategy.as_str(),
        "limit": plan.options.limit,
        "page": plan.options.page,
        "skip": plan.options.skip,
        "pagination": plan.options.pagination,
        "documents": bson_to_json(stages(&plan.pipelines.documents)),
        "count": bson_to_json(stages(&plan.pipelines.count)),
    })
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    let defaults = PaginateDefaults::load(cli.config.as_deref())?;
    let conditions = stage("$match", cli.filter.as_deref())?;
    let sort = stage("$sort", cli.sort.as_deref())?;
    let shaping = match cli.shape.as_deref() {
        Some(s) => PipelineFragment::from(parse_json_to_stages(s)?),
        None => PipelineFragment::empty(),
    };
    let options = options_from(&cli);

    let store = MemoryStore::with_docs(load_ndjson(&cli.docs)?);
    log::info!("loaded {} documents from {}", store.len(), cli.docs.display());
    let paginator = Paginator::with_defaults(store, defaults);

    if cli.explain {
        let plan = paginator.plan(conditions, sort, shaping, &options);
        println!("{}", serde_json::to_string_pretty(&explain(&plan))?);
        return Ok(());
    }

    let envelope = paginator.paginate(conditions, sort, shaping, &options).await?;
    let out = bson_to_json(Bson::Document(envelope.into_document()));
    println!("{}", serde_json::to_string_pretty(&out)?);
    Ok(())
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let logged = if cli.log_dir.is_some() || cli.log_level.is_some() {
        logger::configure_logging(cli.log_dir.as_deref(), cli.log_level.as_deref(), None)
    } else if std::env::var_os("NEXUS_PAGINATE_LOG_DIR").is_some() {
        logger::configure_from_env()
    } else {
        Ok(())
    };
    if let Err(e) = logged {
        eprintln!("warning: logging disabled: {e}");
    }
    if let Err(e) = run(cli).await {
        log::error!("{e}");
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}
