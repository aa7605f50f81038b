//! Tracking Protection CLI
//!
//! CLI tool for classifying URLs against the Disconnect list, querying it,
//! and converting ABP filter lists into the Disconnect format.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Instant;

use clap::{Args, Parser, Subcommand};
use log::LevelFilter;

use tpt_compiler::{convert, write_lists, ConvertOptions};
use tpt_core::{DisconnectParser, ParserConfig};

#[derive(Parser, Debug)]
#[command(name = "tpt", version)]
#[command(about = "Disconnect list classifier and tools")]
struct Cli {
    #[command(flatten)]
    lists: ListArgs,

    /// Verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// List locations; these take precedence over the config file.
#[derive(Args, Debug, Default)]
struct ListArgs {
    /// TOML file with list locations and options
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Blocklist file
    #[arg(long, global = true)]
    blocklist: Option<PathBuf>,

    /// Blocklist URL
    #[arg(long, global = true)]
    blocklist_url: Option<String>,

    /// Entitylist file
    #[arg(long, global = true)]
    entitylist: Option<PathBuf>,

    /// Entitylist URL
    #[arg(long, global = true)]
    entitylist_url: Option<String>,

    /// Remap table for the Disconnect category
    #[arg(long, global = true)]
    mapping: Option<PathBuf>,

    /// Remap table URL
    #[arg(long, global = true)]
    mapping_url: Option<String>,

    /// Category left out of matching (repeatable)
    #[arg(long = "exclude", value_name = "CATEGORY", global = true)]
    exclude: Vec<String>,

    /// Public Suffix List file
    #[arg(long, global = true)]
    psl: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Classify URLs or hostnames
    Classify {
        /// Top-level page the requests were loaded on
        #[arg(long)]
        top_url: Option<String>,

        /// URLs or hostnames to classify
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// List categories with their domain counts
    Categories,

    /// Print the domains of categories or tags
    Domains {
        /// Category to include (repeatable)
        #[arg(long, required_unless_present = "tag", conflicts_with = "tag")]
        category: Vec<String>,

        /// Tag to include, e.g. fingerprinting or w3c (repeatable)
        #[arg(long)]
        tag: Vec<String>,
    },

    /// Convert an ABP filter list into Disconnect-format lists
    Convert {
        /// Input filter list file
        #[arg(short, long)]
        input: PathBuf,

        /// List name, used as category and file prefix
        #[arg(short, long)]
        name: String,

        /// Output directory
        #[arg(short, long, default_value = ".")]
        output_dir: PathBuf,

        /// Drop rules with paths
        #[arg(long)]
        skip_paths: bool,

        /// Keep rules restricted to request types
        #[arg(long)]
        keep_types: bool,
    },
}

fn main() {
    let cli = Cli::parse();
    init_logger(cli.verbose);

    let result = match cli.command {
        Commands::Classify { top_url, urls } => cmd_classify(&cli.lists, top_url.as_deref(), &urls),
        Commands::Categories => cmd_categories(&cli.lists),
        Commands::Domains { category, tag } => cmd_domains(&cli.lists, &category, &tag),
        Commands::Convert {
            input,
            name,
            output_dir,
            skip_paths,
            keep_types,
        } => {
            let options = ConvertOptions {
                skip_paths,
                skip_types: !keep_types,
            };
            cmd_convert(&input, &name, &output_dir, options)
        }
    };

    if let Err(e) = result {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

/// Log level from `RUST_LOG` (default `warn`), raised to `debug` by `--verbose`.
fn init_logger(verbose: bool) {
    let mut builder = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"));
    if verbose {
        builder.filter_level(LevelFilter::Debug);
    }
    builder.filter_module("reqwest", LevelFilter::Info);
    builder.filter_module("hyper", LevelFilter::Info);
    let _ = builder.try_init();
}

impl ListArgs {
    /// Command line values first, then the config file.
    fn to_config(&self) -> Result<ParserConfig, String> {
        let cli = ParserConfig {
            blocklist: self.blocklist.clone(),
            blocklist_url: self.blocklist_url.clone(),
            entitylist: self.entitylist.clone(),
            entitylist_url: self.entitylist_url.clone(),
            disconnect_mapping: self.mapping.clone(),
            disconnect_mapping_url: self.mapping_url.clone(),
            categories_to_exclude: self.exclude.clone(),
            public_suffix_list: self.psl.clone(),
        };

        match &self.config {
            Some(path) => {
                let file = ParserConfig::load(path).map_err(|e| e.to_string())?;
                Ok(cli.or(file))
            }
            None => Ok(cli),
        }
    }

    fn load_parser(&self) -> Result<DisconnectParser, String> {
        let start = Instant::now();
        let parser = self
            .to_config()?
            .build()
            .map_err(|e| format!("Failed to load lists: {e}"))?;
        log::info!(
            "Loaded {} blocklist domains and {} entitylist properties in {:.1}ms",
            parser.blocklist_len(),
            parser.entitylist_len(),
            start.elapsed().as_secs_f64() * 1000.0
        );
        Ok(parser)
    }
}

fn cmd_classify(lists: &ListArgs, top_url: Option<&str>, urls: &[String]) -> Result<(), String> {
    let parser = lists.load_parser()?;

    for url in urls {
        let result = parser.should_block_with_match(url, top_url);
        println!("{}\t{}\t{}", url, result.decision, result.matched.unwrap_or("-"));
    }

    Ok(())
}

fn cmd_categories(lists: &ListArgs) -> Result<(), String> {
    let parser = lists.load_parser()?;

    for category in parser.all_list_categories() {
        let count = parser
            .get_domains_with_category([category])
            .map_err(|e| e.to_string())?
            .len();
        if parser.blocklist().is_remapped() && category == tpt_core::types::DISCONNECT_CATEGORY {
            println!("{category}\t{count}\t(remapped)");
        } else {
            println!("{category}\t{count}");
        }
    }
    println!("Total: {} domains used for matching", parser.blocklist_len());

    Ok(())
}

fn cmd_domains(lists: &ListArgs, categories: &[String], tags: &[String]) -> Result<(), String> {
    let parser = lists.load_parser()?;

    let domains = if categories.is_empty() {
        parser.get_domains_with_tag(tags)
    } else {
        parser
            .get_domains_with_category(categories)
            .map_err(|e| e.to_string())?
    };

    let mut domains: Vec<&str> = domains.into_iter().collect();
    domains.sort_unstable();
    for domain in domains {
        println!("{domain}");
    }

    Ok(())
}

fn cmd_convert(input: &Path, name: &str, output_dir: &Path, options: ConvertOptions) -> Result<(), String> {
    let start = Instant::now();
    let text = fs::read_to_string(input)
        .map_err(|e| format!("Failed to read '{}': {}", input.display(), e))?;

    let (conversion, stats) = convert(name, &text, options);
    let (blocklist, entitylist) =
        write_lists(&conversion, name, output_dir).map_err(|e| e.to_string())?;

    println!("Converted '{}' as {}", input.display(), name);
    println!("  Rules:       {}", stats.rules_in);
    println!("  Domains:     {} -> {}", stats.domains_out, blocklist.display());
    println!("  Exceptions:  {} -> {}", stats.exceptions_out, entitylist.display());
    println!("  Time:        {:.1}ms", start.elapsed().as_secs_f64() * 1000.0);

    Ok(())
}
