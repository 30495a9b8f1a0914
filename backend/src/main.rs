//! Scorecard CLI - assessment workbooks to dashboard views
//!
//! # Commands
//!
//! ```bash
//! scorecard parse results.xlsx                 # Canonical records as JSON
//! scorecard dashboard results.xlsx -m percentile
//! scorecard export results.xlsx --view heatmap -o heatmap.csv
//! scorecard quartile-gap results.xlsx -q 1
//! scorecard serve                              # HTTP server (port 3000)
//! scorecard session show                       # Stored session
//! ```
//!
//! `dashboard` and `quartile-gap` read the stored session when no workbook
//! is given. Logs go to stderr; results go to stdout or `--output`.

use clap::{Parser, Subcommand};
use scorecard::{
    ingest_file, quartile_gap, view_to_string, Dashboard, DashboardQuery,
    Metric, Quartile, Record, ServerConfig, SessionStore, View,
};
use std::fs;
use std::path::{Path, PathBuf};

#[derive(Parser)]
#[command(name = "scorecard")]
#[command(about = "Student assessment workbook ingestion and dashboard aggregation", long_about = None)]
struct Cli {
    /// Session store directory (default: SCORECARD_DATA_DIR or .scorecard)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Read a workbook and output canonical records as JSON
    Parse {
        /// Input workbook (.xlsx, .xls, .ods)
        input: PathBuf,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Also store the records as the current session
        #[arg(long)]
        save: bool,
    },

    /// Compute every dashboard view as JSON
    Dashboard {
        /// Input workbook (default: stored session)
        input: Option<PathBuf>,

        /// score, scaledScore or percentile
        #[arg(short, long, default_value = "scaledScore")]
        metric: Metric,

        /// Only this school (comparison still covers all schools)
        #[arg(short, long)]
        school: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Export one tabular view as CSV
    Export {
        /// Input workbook
        input: PathBuf,

        /// trend, heatmap, ranking, comparison or records
        #[arg(long)]
        view: View,

        #[arg(short, long, default_value = "scaledScore")]
        metric: Metric,

        #[arg(short, long)]
        school: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Gap between one rank quartile and the overall average, per date
    QuartileGap {
        /// Input workbook (default: stored session)
        input: Option<PathBuf>,

        /// 1 (bottom) to 4 (top)
        #[arg(short, long, default_value = "1")]
        quartile: Quartile,

        #[arg(short, long, default_value = "scaledScore")]
        metric: Metric,

        #[arg(short, long)]
        school: Option<String>,

        /// Output file (default: stdout)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Start HTTP server
    Serve {
        /// Port to listen on (default: SCORECARD_PORT or 3000)
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Manage the stored session
    Session {
        #[command(subcommand)]
        action: SessionAction,
    },
}

#[derive(Subcommand)]
enum SessionAction {
    /// Show what the session holds
    Show,

    /// Replace the session with a JSON record array
    Import {
        /// JSON file (array of canonical records)
        file: PathBuf,
    },

    /// Delete the stored session
    Clear,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let config = ServerConfig::from_env().with_overrides(None, cli.data_dir);
    let store = SessionStore::with_dir(&config.data_dir);

    let result = match cli.command {
        Commands::Parse { input, output, save } => {
            cmd_parse(&input, output.as_deref(), save, &store).await
        }

        Commands::Dashboard {
            input,
            metric,
            school,
            output,
        } => {
            let query = DashboardQuery::new(metric, school);
            cmd_dashboard(input.as_deref(), &query, output.as_deref(), &store).await
        }

        Commands::Export {
            input,
            view,
            metric,
            school,
            output,
        } => {
            let query = DashboardQuery::new(metric, school);
            cmd_export(&input, view, &query, output.as_deref()).await
        }

        Commands::QuartileGap {
            input,
            quartile,
            metric,
            school,
            output,
        } => {
            let query = DashboardQuery::new(metric, school);
            cmd_quartile_gap(input.as_deref(), quartile, &query, output.as_deref(), &store).await
        }

        Commands::Serve { port } => cmd_serve(config.with_overrides(port, None)).await,

        Commands::Session { action } => cmd_session(action, &store),
    };

    if let Err(e) = result {
        eprintln!("❌ Error: {}", e);
        std::process::exit(1);
    }
}

/// Records from a workbook, or from the session when none is given.
async fn load_records(
    input: Option<&Path>,
    store: &SessionStore,
) -> Result<Vec<Record>, Box<dyn std::error::Error>> {
    match input {
        Some(path) => Ok(ingest_file(path).await?.records),
        None => {
            let records = store.load()?.ok_or(
                "No stored session. Pass a workbook or run 'scorecard parse <file> --save'",
            )?;
            eprintln!("📂 Using stored session ({} records)", records.len());
            Ok(records)
        }
    }
}

async fn cmd_parse(
    input: &Path,
    output: Option<&Path>,
    save: bool,
    store: &SessionStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let ingested = ingest_file(input).await?;

    if save {
        let path = store.save(&ingested.records)?;
        eprintln!("💾 Session saved to: {}", path.display());
    }

    let json = serde_json::to_string_pretty(&ingested.records)?;
    write_output(&json, output)
}

async fn cmd_dashboard(
    input: Option<&Path>,
    query: &DashboardQuery,
    output: Option<&Path>,
    store: &SessionStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_records(input, store).await?;
    let dashboard = Dashboard::build(&records, query);

    eprintln!(
        "📊 {} · {} · {} schools · latest {}",
        dashboard.metric_label,
        dashboard.selected_school.as_deref().unwrap_or("All Schools"),
        dashboard.schools.len(),
        dashboard.header.latest_date_display
    );
    if let Some(best) = dashboard.ranking.top.first() {
        eprintln!(
            "🏆 Best: class {} {} at {}",
            best.class_name,
            best.subject,
            query.metric.display_value(best.avg_val)
        );
    }

    let json = serde_json::to_string_pretty(&dashboard)?;
    write_output(&json, output)
}

async fn cmd_export(
    input: &Path,
    view: View,
    query: &DashboardQuery,
    output: Option<&Path>,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = ingest_file(input).await?.records;
    let csv = view_to_string(&records, view, query)?;
    eprintln!("📤 Exporting {} ({})", view, query.metric);
    write_output(csv.trim_end(), output)
}

async fn cmd_quartile_gap(
    input: Option<&Path>,
    quartile: Quartile,
    query: &DashboardQuery,
    output: Option<&Path>,
    store: &SessionStore,
) -> Result<(), Box<dyn std::error::Error>> {
    let records = load_records(input, store).await?;
    let filtered = scorecard::aggregate::filter_by_school(&records, query.school_filter());
    let gap = quartile_gap(&filtered, quartile, query.metric);

    match gap.latest_gap {
        Some(latest) => eprintln!("📉 {} latest gap: {:+}", quartile, latest),
        None => eprintln!("📉 {} has no gap on any date", quartile),
    }

    let json = serde_json::to_string_pretty(&gap)?;
    write_output(&json, output)
}

async fn cmd_serve(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    scorecard::server::start_server(config).await
}

fn cmd_session(action: SessionAction, store: &SessionStore) -> Result<(), Box<dyn std::error::Error>> {
    match action {
        SessionAction::Show => match store.load()? {
            Some(records) => {
                let schools = scorecard::unique_schools(&records);
                let dates = scorecard::unique_dates(&records);
                println!("📂 Session: {}", store.path().display());
                println!("   Records: {}", records.len());
                println!("   Schools: {}", schools.join(", "));
                println!("   Dates:   {}", dates.join(", "));
            }
            None => {
                eprintln!("📋 No stored session at {}", store.path().display());
                eprintln!("   Use 'scorecard parse <file> --save' to create one.");
            }
        },

        SessionAction::Import { file } => {
            eprintln!("📥 Importing session from: {}", file.display());
            let records = store.import(&file)?;
            eprintln!("✅ Stored {} records", records.len());
        }

        SessionAction::Clear => {
            if store.clear()? {
                eprintln!("🗑️  Session cleared");
            } else {
                eprintln!("📋 Nothing to clear");
            }
        }
    }

    Ok(())
}

fn write_output(content: &str, path: Option<&Path>) -> Result<(), Box<dyn std::error::Error>> {
    match path {
        Some(p) => {
            fs::write(p, content)?;
            eprintln!("💾 Output written to: {}", p.display());
        }
        None => {
            println!("{}", content);
        }
    }
    Ok(())
}
