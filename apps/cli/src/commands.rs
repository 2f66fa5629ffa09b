//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::{Result, eyre};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;

use videosync_core::{ProgressReporter, SyncConfig, SyncReport, SyncSource};
use videosync_shared::{AppConfig, SiteConfig, init_config, load_config, resolve_api_key};

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// videosync — keep a static site's video sitemap entries current.
#[derive(Parser)]
#[command(
    name = "videosync",
    version,
    about = "Sync video sitemap entries from channel uploads into static sitemap files.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Where the sync pulls its video metadata from.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum SourceArg {
    /// The video platform API (needs a key in the environment).
    Api,
    /// A JSON-LD ItemList embedded in a local HTML page.
    Local,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// Fetch uploads and rewrite the video entries in each sitemap.
    Sync {
        /// Sitemap files to patch (defaults to the configured list).
        sitemaps: Vec<PathBuf>,

        /// Metadata source.
        #[arg(long, value_enum, default_value = "api")]
        source: SourceArg,

        /// Channel to sync from (overrides config and YOUTUBE_CHANNEL_ID).
        #[arg(long, env = "YOUTUBE_CHANNEL_ID")]
        channel_id: Option<String>,

        /// HTML page to read in local mode (defaults to the configured page).
        #[arg(long)]
        local_page: Option<PathBuf>,

        /// Render the entries but do not write any file.
        #[arg(long)]
        dry_run: bool,

        /// Skip writing .bak backups before overwriting sitemaps.
        #[arg(long)]
        no_backup: bool,
    },

    /// Check a video sitemap against the entry rules.
    Validate {
        /// Sitemap file to check.
        file: PathBuf,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "videosync=info",
        1 => "videosync=debug",
        _ => "videosync=trace",
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt().with_env_filter(env_filter).with_target(false).init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::Sync {
            sitemaps,
            source,
            channel_id,
            local_page,
            dry_run,
            no_backup,
        } => {
            cmd_sync(
                sitemaps,
                source,
                channel_id,
                local_page,
                dry_run,
                no_backup,
            )
            .await
        }
        Command::Validate { file } => {
            if cmd_validate(&file)? {
                Ok(())
            } else {
                std::process::exit(1)
            }
        }
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init(),
            ConfigAction::Show => cmd_config_show(),
        },
    }
}

// ---------------------------------------------------------------------------
// sync
// ---------------------------------------------------------------------------

async fn cmd_sync(
    sitemaps: Vec<PathBuf>,
    source: SourceArg,
    channel_id: Option<String>,
    local_page: Option<PathBuf>,
    dry_run: bool,
    no_backup: bool,
) -> Result<()> {
    let config = load_config()?;

    let mut site = SiteConfig::from(&config);
    if let Some(id) = channel_id {
        site.channel_id = id;
    }

    let sitemaps = if sitemaps.is_empty() {
        config.sync.sitemaps.iter().map(PathBuf::from).collect()
    } else {
        sitemaps
    };
    if sitemaps.is_empty() {
        return Err(eyre!("no sitemap files given and none configured"));
    }

    // Resolve the credential before any work happens; local mode never
    // touches the network and needs no key.
    let sync_source = match source {
        SourceArg::Api => SyncSource::Api {
            api_key: resolve_api_key(&config)?,
        },
        SourceArg::Local => SyncSource::Local {
            page: local_page.unwrap_or_else(|| PathBuf::from(&config.sync.local_page)),
        },
    };

    info!(
        channel = %site.channel_id,
        sitemaps = sitemaps.len(),
        dry_run,
        "starting sync"
    );

    let sync_config = SyncConfig {
        source: sync_source,
        site,
        sitemaps,
        dry_run,
        backup: !no_backup,
        api_base_url: None,
    };

    let reporter = CliProgress::new();
    let report = videosync_core::sync(&sync_config, &reporter).await?;

    if dry_run {
        for fragment in &report.fragments {
            println!("{fragment}");
            println!();
        }
    }

    println!();
    println!("  Sync complete");
    println!("  Videos:   {}", report.record_count);
    if dry_run {
        println!("  Sitemaps: (dry run, nothing written)");
    } else {
        for outcome in &report.patched {
            let suffix = match &outcome.backup {
                Some(bak) => format!(" (backup: {})", bak.display()),
                None => String::new(),
            };
            println!(
                "  Patched:  {} — {} entries{suffix}",
                outcome.path.display(),
                outcome.entry_count
            );
        }
    }
    println!("  Time:     {:.1}s", report.elapsed.as_secs_f64());
    println!();

    Ok(())
}

// ---------------------------------------------------------------------------
// validate
// ---------------------------------------------------------------------------

/// Returns `true` when the file passes all entry rules.
fn cmd_validate(file: &PathBuf) -> Result<bool> {
    let violations = videosync_sitemap::validate_file(file)?;

    if violations.is_empty() {
        println!("{}: OK", file.display());
        return Ok(true);
    }

    eprintln!(
        "{}: {} violation(s)",
        file.display(),
        violations.len()
    );
    for violation in &violations {
        eprintln!("  {violation}");
    }
    Ok(false)
}

// ---------------------------------------------------------------------------
// config
// ---------------------------------------------------------------------------

fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

/// CLI progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        let spinner = ProgressBar::new_spinner();
        spinner.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {msg}")
                .unwrap()
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
        );
        spinner.enable_steady_tick(std::time::Duration::from_millis(80));
        Self { spinner }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn sitemap_patched(&self, path: &std::path::Path, entries: usize) {
        self.spinner
            .set_message(format!("Patched {} ({entries} entries)", path.display()));
    }

    fn done(&self, _report: &SyncReport) {
        self.spinner.finish_and_clear();
    }
}
