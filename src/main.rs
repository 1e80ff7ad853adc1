use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;

use journal_mirror::api::ApiClient;
use journal_mirror::logger;
use journal_mirror::mirror;
use journal_mirror::settings::Settings;

#[derive(Parser)]
#[command(name = "journal-mirror")]
#[command(about = "Mirror a family journal's moments to a local directory tree", long_about = None)]
#[command(version)]
struct Cli {
    /// Settings file to use instead of the default location
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create the mirror root and save connection settings
    Init {
        /// Directory the journal content will be mirrored into
        #[arg(short, long)]
        root: PathBuf,

        /// Base URL of the journal service API
        #[arg(long)]
        api_url: String,

        /// Name of the authorization header
        #[arg(long)]
        auth_key: String,

        /// Value of the authorization header
        #[arg(long)]
        auth_value: String,

        /// Number of concurrent download workers (1-8)
        #[arg(long, default_value_t = 4)]
        threads: usize,
    },

    /// List the journals the configured token can see
    Journals,

    /// List the entries displayed on a single day
    Day {
        /// Journal id
        #[arg(short, long)]
        journal: String,

        /// Calendar date (yyyy-mm-dd)
        #[arg(short, long)]
        date: NaiveDate,
    },

    /// Mirror all entries in a date range to the local tree
    Sync {
        /// Journal id
        #[arg(short, long)]
        journal: String,

        /// First day of the range (yyyy-mm-dd)
        #[arg(long)]
        from: NaiveDate,

        /// Last day of the range, inclusive (yyyy-mm-dd)
        #[arg(long)]
        to: NaiveDate,
    },

    /// List dates whose remote content differs from the mirror
    Changed {
        /// Journal id
        #[arg(short, long)]
        journal: String,
    },

    /// Show or update settings
    Config {
        /// Show current settings
        #[arg(long)]
        show: bool,

        /// Update the API base URL
        #[arg(long)]
        api_url: Option<String>,

        /// Update the number of download workers (1-8)
        #[arg(long)]
        threads: Option<usize>,
    },
}

fn main() -> Result<()> {
    logger::init_logger()?;
    logger::rotate_log_if_needed()?;

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();

    match cli.command {
        Commands::Init {
            root,
            api_url,
            auth_key,
            auth_value,
            threads,
        } => {
            let settings = Settings {
                api_base_url: api_url,
                auth_header_key: auth_key,
                auth_header_value: auth_value,
                max_thread_count: threads,
                mirror_root: root.clone(),
            };
            settings.validate()?;

            std::fs::create_dir_all(&root)
                .with_context(|| format!("Failed to create mirror root: {}", root.display()))?;
            settings.save(config_path)?;

            println!(
                "{} Mirror root ready at {}",
                "✓".green(),
                root.display()
            );
            println!("{}", "Settings saved".green().bold());
        }

        Commands::Journals => {
            let settings = Settings::load(config_path)?;
            let client = ApiClient::new(&settings)?;
            let journals = client.get_journal_summaries()?;

            if journals.is_empty() {
                println!("No journals visible to this token");
            }
            for journal in &journals {
                println!(
                    "{} {} {}",
                    journal.title.bold(),
                    format!("(id {})", journal.id).cyan(),
                    format!("created {}", journal.created.format("%Y-%m-%d")).dimmed()
                );
                for child in &journal.children {
                    println!(
                        "    {} ({}, born {})",
                        child.full_name(),
                        child.gender.as_str(),
                        child.dob
                    );
                }
            }
        }

        Commands::Day { journal, date } => {
            let settings = Settings::load(config_path)?;
            let client = ApiClient::new(&settings)?;
            let journal_id: u64 = journal
                .trim()
                .parse()
                .with_context(|| format!("Journal id must be numeric, got {journal:?}"))?;

            let entries = client.get_entries_by_date(date, journal_id)?;
            println!(
                "{} entries on {}",
                format!("{}", entries.len()).bold(),
                date
            );
            for entry in &entries {
                println!(
                    "  [{}] {} {}",
                    entry.sort_position,
                    entry.archive_type.as_str().cyan(),
                    entry.caption.as_deref().unwrap_or("").dimmed()
                );
            }
        }

        Commands::Sync { journal, from, to } => {
            let settings = Settings::load(config_path)?;
            println!(
                "{}",
                format!("Mirroring journal {journal} from {from} to {to}...")
                    .cyan()
                    .bold()
            );

            let report = mirror::sync_range(&settings, &journal, from, to)?;
            report.print_summary();

            logger::log_to_file(&format!(
                "sync journal={journal} range={from}..{to} fetched={} written={} failed={}",
                report.fetched, report.written, report.failed
            ))?;
        }

        Commands::Changed { journal } => {
            let settings = Settings::load(config_path)?;
            let client = ApiClient::new(&settings)?;

            let dates = mirror::find_dates_with_recent_changes(&client, &settings, &journal)?;
            if dates.is_empty() {
                println!("{}", "Mirror is up to date".green());
            } else {
                println!("{}", "Dates with remote changes:".bold());
                for date in dates {
                    println!("  {date}");
                }
            }
        }

        Commands::Config {
            show,
            api_url,
            threads,
        } => {
            if show {
                let settings = Settings::load(config_path)?;
                settings.show();
            } else {
                let mut settings = Settings::load(config_path)?;
                if let Some(url) = api_url {
                    settings.api_base_url = url;
                    println!("{}", "Updated API base URL".green());
                }
                if let Some(count) = threads {
                    settings.max_thread_count = count;
                    println!("{}", format!("Set download workers to {count}").green());
                }
                settings.save(config_path)?;
                println!("{}", "Settings saved".green().bold());
            }
        }
    }

    Ok(())
}
