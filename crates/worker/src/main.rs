use anyhow::Context;
use clap::Parser;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use mauzo_core::forecast::DuplicatePolicy;

mod ingest;
mod run;

#[derive(Debug, Parser)]
#[command(name = "mauzo_worker", about = "Forecast daily sales from a history file")]
struct Args {
    /// Sales history: CSV with date and total columns (`-` for stdin), or a JSON ledger with
    /// `--ledger`.
    #[arg(long)]
    input: PathBuf,

    /// Treat `--input` as a JSON list of till sales and aggregate it per day.
    #[arg(long)]
    ledger: bool,

    /// Days to forecast. Defaults to MAUZO_DEFAULT_HORIZON_DAYS.
    #[arg(long)]
    horizon_days: Option<u32>,

    /// Date treated as today (YYYY-MM-DD). Defaults to the shop's local date.
    #[arg(long)]
    today: Option<String>,

    /// Duplicate-date handling: reject, keep-last or sum. Overrides MAUZO_DUPLICATE_POLICY.
    #[arg(long)]
    duplicates: Option<DuplicatePolicy>,

    /// Also emit the weekday profile of the trailing four weeks.
    #[arg(long)]
    show_profile: bool,

    /// Write the JSON here instead of stdout.
    #[arg(long)]
    output: Option<PathBuf>,
}

fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let mut settings = mauzo_core::config::Settings::from_env()?;
    let _sentry_guard = init_sentry(&settings);

    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer())
        .init();

    let args = Args::parse();
    if let Some(policy) = args.duplicates {
        settings.duplicate_policy = policy;
    }

    let job = run::Job {
        source: if args.ledger {
            ingest::HistorySource::Ledger(args.input)
        } else {
            ingest::HistorySource::Csv(args.input)
        },
        horizon_days: args.horizon_days,
        today: args.today,
        show_profile: args.show_profile,
    };

    let report = match run::run(&job, &settings, chrono::Utc::now()) {
        Ok(report) => report,
        Err(err) => {
            sentry_anyhow::capture_anyhow(&err);
            return Err(err);
        }
    };

    let doc = report.to_json(job.show_profile)?;
    let rendered = serde_json::to_string_pretty(&doc)?;
    match &args.output {
        Some(path) => std::fs::write(path, rendered + "\n")
            .with_context(|| format!("failed to write {}", path.display()))?,
        None => println!("{rendered}"),
    }

    if !report.is_ok() {
        let code = report
            .outcome
            .failure()
            .map(|f| f.code.as_str())
            .unwrap_or("unknown");
        anyhow::bail!("forecast failed: {code}");
    }
    Ok(())
}

fn init_sentry(settings: &mauzo_core::config::Settings) -> Option<sentry::ClientInitGuard> {
    let dsn = settings.sentry_dsn.as_deref()?;
    Some(sentry::init((
        dsn,
        sentry::ClientOptions {
            release: sentry::release_name!(),
            ..Default::default()
        },
    )))
}
