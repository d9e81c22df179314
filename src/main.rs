use log::{debug, info};
use std::env;
use std::fs;
use std::sync::Arc;

use recipe_ingest::config::ResolverConfig;
use recipe_ingest::{
    load_config, EntityResolver, IngestError, InMemoryTaxonomy, ParserContext, ParserRegistry,
};

const USAGE: &str = "usage:
  recipe-ingest parse <file> [--url <source-url>] [--parser <name>]
  recipe-ingest label <text> [--taxonomy <entries.json>]
  recipe-ingest parsers";

/// Value following `flag`, if the flag is present.
fn flag_value(args: &[String], flag: &str) -> Result<Option<String>, IngestError> {
    match args.iter().position(|arg| arg == flag) {
        Some(idx) => args
            .get(idx + 1)
            .cloned()
            .map(Some)
            .ok_or_else(|| IngestError::Usage(format!("{} needs a value", flag))),
        None => Ok(None),
    }
}

/// First argument that is neither a flag nor the value of one.
fn positional<'a>(args: &'a [String], flags: &[&str]) -> Option<&'a String> {
    let mut skip_next = false;
    for arg in args {
        if skip_next {
            skip_next = false;
        } else if flags.contains(&arg.as_str()) {
            skip_next = true;
        } else {
            return Some(arg);
        }
    }
    None
}

fn parse_file(registry: &ParserRegistry, args: &[String]) -> Result<(), IngestError> {
    let path = positional(args, &["--url", "--parser"])
        .ok_or_else(|| IngestError::Usage("parse needs a file".to_string()))?;
    let content = fs::read_to_string(path)?;

    let mut context = ParserContext::new().with_file_name(path.as_str());
    if let Some(url) = flag_value(args, "--url")? {
        context = context.with_source_url(url);
    }

    let recipes = match flag_value(args, "--parser")? {
        Some(name) => registry.get_by_name(&name)?.parse(&content, &context)?,
        None => registry.parse(&content, &context)?,
    };
    info!("Parsed {} recipes from {}", recipes.len(), path);
    println!("{}", serde_json::to_string_pretty(&recipes)?);
    Ok(())
}

async fn label(resolver_config: ResolverConfig, args: &[String]) -> Result<(), IngestError> {
    let text = positional(args, &["--taxonomy"])
        .ok_or_else(|| IngestError::Usage("label needs the label text".to_string()))?;

    let taxonomy = match flag_value(args, "--taxonomy")? {
        Some(path) => InMemoryTaxonomy::from_json(&fs::read_to_string(path)?)?,
        None => InMemoryTaxonomy::default(),
    };
    debug!("Loaded {} taxonomy entries", taxonomy.entries().len());

    let resolver = EntityResolver::with_config(Arc::new(taxonomy), resolver_config);
    let result = resolver.decompose(text).await;
    println!("{}", serde_json::to_string_pretty(&result)?);
    Ok(())
}

#[tokio::main]
async fn main() -> Result<(), IngestError> {
    env_logger::init();

    let config = load_config()?;
    let registry = ParserRegistry::from_config(&config);

    let args: Vec<String> = env::args().skip(1).collect();
    let Some(command) = args.first() else {
        eprintln!("{}", USAGE);
        return Err(IngestError::Usage("missing command".to_string()));
    };

    match command.as_str() {
        "parse" => parse_file(&registry, &args[1..]),
        "label" => label(config.resolver.clone(), &args[1..]).await,
        "parsers" => {
            for parser in registry.parsers() {
                println!("{:<16} {:<16} {:?}", parser.name(), parser.source_type(), parser.tier());
            }
            Ok(())
        }
        other => {
            eprintln!("{}", USAGE);
            Err(IngestError::Usage(format!("unknown command: {}", other)))
        }
    }
}
