use anyhow::{anyhow, bail, Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use colored::Colorize;
use contacts::{loader, Contact, ContactBook, MaterializedSegment};
use segments::{CallingCodeNormalizer, Explanation, FixedClock, SegmentEngine};
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// segmentctl - Audience segmentation over contact exports
#[derive(Parser)]
#[command(name = "segmentctl")]
#[command(about = "Evaluate segment filter rules against a contact export", long_about = None)]
struct Cli {
    /// Contacts file (.json array or .jsonl)
    #[arg(short, long, global = true, default_value = "data/contacts.json")]
    contacts: PathBuf,

    /// Evaluate relative-time rules as of this instant (RFC 3339)
    #[arg(long, global = true)]
    now: Option<String>,

    /// ISO country used for phone numbers written without a calling code
    #[arg(long, global = true)]
    default_region: Option<String>,

    /// Print machine-readable JSON instead of text
    #[arg(long, global = true)]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the contacts matching a rule-set
    Match {
        /// Rule-set file (JSON array of {field, operator, value})
        #[arg(long)]
        rules: PathBuf,

        /// Show the per-rule outcome for every matching contact
        #[arg(long)]
        explain: bool,
    },

    /// Materialize every segment in a segments file
    Segments {
        /// Segments file (JSON array of {name, rules})
        #[arg(long)]
        file: PathBuf,

        /// Write the materialized segments here as JSON
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Show why one contact does or does not match a rule-set
    Explain {
        #[arg(long)]
        rules: PathBuf,

        /// Contact ID to explain
        #[arg(long)]
        contact: String,
    },

    /// Contact counts by channel and country
    Stats,
}

fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();
    let engine = build_engine(cli.now.as_deref(), cli.default_region.as_deref())?;

    let start = Instant::now();
    let book = ContactBook::load_from_file(&cli.contacts)
        .with_context(|| format!("Failed to load contacts from {}", cli.contacts.display()))?;
    if !cli.json {
        println!(
            "{} Loaded {} contacts in {:?}",
            "✓".green(),
            book.len(),
            start.elapsed()
        );
    }

    // Dispatch to appropriate command handler
    match cli.command {
        Commands::Match { rules, explain } => handle_match(&engine, &book, &rules, explain, cli.json)?,
        Commands::Segments { file, out } => {
            handle_segments(&engine, &book, &file, out.as_deref(), cli.json)?
        }
        Commands::Explain { rules, contact } => {
            handle_explain(&engine, &book, &rules, &contact, cli.json)?
        }
        Commands::Stats => handle_stats(&book, cli.json)?,
    }

    Ok(())
}

/// Build the engine from the global flags
fn build_engine(now: Option<&str>, default_region: Option<&str>) -> Result<SegmentEngine> {
    let mut builder = SegmentEngine::builder();

    if let Some(now) = now {
        let at = DateTime::parse_from_rfc3339(now)
            .with_context(|| format!("Invalid --now value: {now}"))?
            .with_timezone(&Utc);
        tracing::info!("Clock pinned to {}", at.to_rfc3339());
        builder = builder.clock(FixedClock::new(at));
    }

    if let Some(iso) = default_region {
        let normalizer = CallingCodeNormalizer::with_default_region(iso);
        if normalizer.default_region().is_none() {
            bail!("Unknown default region: {iso}");
        }
        builder = builder.phone_normalizer(normalizer);
    }

    Ok(builder.build())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Handle the 'match' command
fn handle_match(
    engine: &SegmentEngine,
    book: &ContactBook,
    rules_path: &Path,
    explain: bool,
    json: bool,
) -> Result<()> {
    let rules = loader::load_rules(rules_path)
        .with_context(|| format!("Failed to load rules from {}", rules_path.display()))?;

    let mut ids: Vec<_> = engine.matching_ids(book.contacts(), &rules).into_iter().collect();
    ids.sort();

    let matched: Vec<&Contact> = ids.iter().filter_map(|id| book.get(id)).collect();

    if json {
        if explain {
            let explanations: Vec<Explanation> = matched
                .iter()
                .map(|contact| engine.explain(contact, &rules))
                .collect();
            return print_json(&explanations);
        }
        return print_json(&ids);
    }

    println!(
        "{}",
        format!("{} of {} contacts match {} rules:", ids.len(), book.len(), rules.len())
            .bold()
            .blue()
    );
    for contact in matched {
        println!("  {} {}", "•".green(), describe(contact));
        if explain {
            print_outcomes(&engine.explain(contact, &rules), "      ");
        }
    }
    Ok(())
}

/// Handle the 'segments' command
fn handle_segments(
    engine: &SegmentEngine,
    book: &ContactBook,
    file: &Path,
    out: Option<&Path>,
    json: bool,
) -> Result<()> {
    let definitions = loader::load_segments(file)
        .with_context(|| format!("Failed to load segments from {}", file.display()))?;

    let materialized: Vec<MaterializedSegment> = definitions
        .iter()
        .map(|segment| engine.materialize(book.contacts(), segment))
        .collect();

    if let Some(out) = out {
        loader::write_segments(out, &materialized)
            .with_context(|| format!("Failed to write segments to {}", out.display()))?;
        tracing::info!("Wrote {} segments to {}", materialized.len(), out.display());
    }

    if json {
        return print_json(&materialized);
    }

    println!("{}", "Segments:".bold().blue());
    for (definition, segment) in definitions.iter().zip(&materialized) {
        println!(
            "{} {} ({} rules) - {} contacts",
            "•".green(),
            segment.name.bold(),
            definition.rules.len(),
            segment.contact_ids.len()
        );
        if definition.rules.is_empty() {
            println!("    {}", "no rules, segment is empty".yellow());
        }
    }
    Ok(())
}

/// Handle the 'explain' command
fn handle_explain(
    engine: &SegmentEngine,
    book: &ContactBook,
    rules_path: &Path,
    contact_id: &str,
    json: bool,
) -> Result<()> {
    let rules = loader::load_rules(rules_path)
        .with_context(|| format!("Failed to load rules from {}", rules_path.display()))?;
    let contact = book
        .get(contact_id)
        .ok_or_else(|| anyhow!("Contact {} not found", contact_id))?;

    let explanation = engine.explain(contact, &rules);
    if json {
        return print_json(&explanation);
    }

    println!("{}", format!("Contact {}", describe(contact)).bold().blue());
    print_outcomes(&explanation, "  ");
    if explanation.matched {
        println!("{}", "Contact matches the rule-set".green().bold());
    } else if rules.is_empty() {
        println!("{}", "Empty rule-set matches no contacts".yellow());
    } else {
        println!("{}", "Contact does not match the rule-set".red().bold());
    }
    Ok(())
}

#[derive(Serialize)]
struct Stats {
    total: usize,
    by_channel: BTreeMap<String, usize>,
    by_country: BTreeMap<String, usize>,
}

/// Handle the 'stats' command
fn handle_stats(book: &ContactBook, json: bool) -> Result<()> {
    let stats = Stats {
        total: book.len(),
        by_channel: book.counts_by(|c| c.channel.as_deref()),
        by_country: book.counts_by(|c| c.country_iso.as_deref()),
    };

    if json {
        return print_json(&stats);
    }

    println!("{}", format!("{} contacts", stats.total).bold().blue());
    print_counts("By channel:", &stats.by_channel);
    print_counts("By country:", &stats.by_country);
    Ok(())
}

fn print_counts(title: &str, counts: &BTreeMap<String, usize>) {
    println!("{}", title.bold());
    let mut sorted: Vec<_> = counts.iter().collect();
    sorted.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));
    for (key, count) in sorted {
        println!("  {} {}: {}", "•".cyan(), key, count);
    }
}

/// One-line summary of a contact: id, name and phone when present
fn describe(contact: &Contact) -> String {
    let name = [contact.first_name.as_deref(), contact.last_name.as_deref()]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(" ");

    let mut line = contact.id.clone();
    if !name.is_empty() {
        line.push_str(&format!(" ({name})"));
    }
    if let Some(phone) = contact.phone_number.as_deref().filter(|p| !p.is_empty()) {
        line.push_str(&format!(" {phone}"));
    }
    line
}

fn print_outcomes(explanation: &Explanation, indent: &str) {
    for outcome in &explanation.outcomes {
        let mark = if outcome.matched {
            "✓".green()
        } else {
            "✗".red()
        };
        println!(
            "{indent}{} {} {}",
            mark,
            outcome.rule,
            format!("[{}]", outcome.matcher).dimmed()
        );
    }
}
