use benchdash::buckets::ScatterBucket;
use benchdash::dashboard::{self, DashboardView, DEFAULT_ROW_LIMIT};
use benchdash::summary::Trend;
use benchdash::{Criteria, Dataset, Grouping, Loader, ScenarioSelection, Selection, VarianceMetric};
use clap::{Args as ClapArgs, Parser, Subcommand};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "benchdash")]
#[command(author, version, about = "Explore daily benchmark results: filters, scenario averages, scatter and variance")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Directory holding benchmark_summary.csv (or results/benchmark_summary.csv)
    #[arg(long, default_value = ".", global = true)]
    root: PathBuf,

    /// Read this CSV file instead of searching the root
    #[arg(long, global = true)]
    csv: Option<PathBuf>,

    /// Pick the CSV file with a file dialog
    #[arg(long, global = true)]
    gui: bool,

    #[command(flatten)]
    filters: FilterArgs,

    /// Table rows to print
    #[arg(short, long, default_value_t = DEFAULT_ROW_LIMIT, global = true)]
    limit: usize,

    /// Show debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Only show summary
    #[arg(short, long, global = true)]
    quiet: bool,
}

#[derive(ClapArgs, Debug)]
struct FilterArgs {
    /// Only this model
    #[arg(long, global = true)]
    model: Option<String>,

    /// Only this scenario class
    #[arg(long, global = true, conflicts_with = "average")]
    scenario: Option<String>,

    /// Average across all scenarios instead of picking one
    #[arg(long, global = true)]
    average: bool,

    /// Only this metric
    #[arg(long, global = true)]
    metric: Option<String>,

    /// Only this split
    #[arg(long, global = true)]
    split: Option<String>,
}

impl FilterArgs {
    fn criteria(&self) -> Criteria {
        let plain = |v: &Option<String>| v.as_deref().map(Selection::from_param).unwrap_or_default();
        let scenario = if self.average {
            ScenarioSelection::Average
        } else {
            self.scenario
                .as_deref()
                .map(ScenarioSelection::from_param)
                .unwrap_or_default()
        };

        Criteria {
            model: plain(&self.model),
            scenario,
            metric: plain(&self.metric),
            split: plain(&self.split),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the interactive dashboard in the browser
    Serve {
        /// Port to listen on
        #[arg(short, long, default_value = "8000")]
        port: u16,

        /// Don't open the browser
        #[arg(long)]
        no_open: bool,
    },

    /// Run-to-run variance per model
    Variance {
        /// Statistic: std, variance, range
        #[arg(long, default_value = "std")]
        stat: VarianceMetric,

        /// Grouping: overall, daily, weekly
        #[arg(long, default_value = "overall")]
        grouping: Grouping,
    },

    /// Runs placed by time of day or time of week
    Scatter {
        /// Bucket: daily, weekly
        #[arg(long, default_value = "daily")]
        bucket: ScatterBucket,
    },

    /// Write the current view as a report (.html, .json, .csv)
    Report {
        /// Output report file
        #[arg(short, long)]
        output: PathBuf,

        /// Open the report when done
        #[arg(long)]
        open: bool,
    },
}

fn init_tracing(verbose: bool) {
    let level = if verbose { "benchdash=debug" } else { "benchdash=warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

fn main() {
    let args = Args::parse();
    init_tracing(args.verbose);

    // The server loads (and reloads) on its own
    if let Some(Command::Serve { port, no_open }) = args.command {
        if let Err(e) = benchdash::serve::start(port, args.root.clone(), !no_open) {
            eprintln!("Server error: {}", e);
            std::process::exit(1);
        }
        return;
    }

    let loader = match pick_loader(&args) {
        Some(loader) => loader,
        None => {
            eprintln!("No file selected.");
            std::process::exit(0);
        }
    };

    let dataset = match loader.load() {
        Ok(dataset) => dataset,
        Err(e) => {
            eprintln!("\x1b[31m{}\x1b[0m", e);
            eprintln!("Run the extractor to generate benchmark_summary.csv in results/.");
            std::process::exit(1);
        }
    };

    if !args.quiet {
        eprintln!("\x1b[1mbenchdash - Benchmark Dashboard\x1b[0m");
        eprintln!("{}", "─".repeat(70));
        eprintln!(
            "Loaded {} record(s) from {}\n",
            dataset.records.len(),
            dataset.source.display()
        );
    }

    let criteria = args.filters.criteria();

    match args.command {
        None => show_view(&dataset, &criteria, &args),
        Some(Command::Variance { stat, grouping }) => show_variance(&dataset, &criteria, stat, grouping),
        Some(Command::Scatter { bucket }) => show_scatter(&dataset, &criteria, bucket),
        Some(Command::Report { ref output, open }) => {
            let view = dashboard::build(&dataset.records, &criteria, Some(args.limit));
            if let Err(e) = benchdash::report::generate(output, &view) {
                eprintln!("Failed to write report: {}", e);
                std::process::exit(1);
            }
            if !args.quiet {
                eprintln!("\x1b[32mReport saved: {}\x1b[0m", output.display());
            }
            if open {
                if let Err(e) = open::that(output) {
                    eprintln!("Failed to open report: {}", e);
                }
            }
        }
        Some(Command::Serve { .. }) => unreachable!("serve handled above"),
    }
}

fn pick_loader(args: &Args) -> Option<Loader> {
    if args.gui {
        return pick_csv_gui().map(|p| Loader::new(vec![p]));
    }
    Some(match &args.csv {
        Some(path) => Loader::new(vec![path.clone()]),
        None => Loader::for_root(&args.root),
    })
}

#[cfg(feature = "gui")]
fn pick_csv_gui() -> Option<PathBuf> {
    rfd::FileDialog::new()
        .set_title("Select benchmark summary CSV")
        .add_filter("CSV files", &["csv"])
        .pick_file()
}

#[cfg(not(feature = "gui"))]
fn pick_csv_gui() -> Option<PathBuf> {
    eprintln!("Note: GUI mode not available in this build.");
    None
}

fn fmt_value(v: Option<f64>) -> String {
    v.map(|v| format!("{:.4}", v)).unwrap_or_else(|| "-".to_string())
}

fn truncate(s: &str, max_len: usize) -> String {
    if s.chars().count() <= max_len {
        s.to_string()
    } else {
        let cut: String = s.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", cut)
    }
}

fn show_view(dataset: &Dataset, criteria: &Criteria, args: &Args) {
    let view = dashboard::build(&dataset.records, criteria, Some(args.limit));
    print_summary(&view);

    if args.quiet {
        return;
    }
    if view.table.is_empty() {
        println!("No data found for the selected filters.");
        return;
    }

    println!(
        "\n{:<28} {:<26} {:<18} {:<10} {:<19} {:>8} {:>8}",
        "MODEL", "SCENARIO", "METRIC", "SPLIT", "TIMESTAMP", "MEAN", "STD"
    );
    println!("{}", "-".repeat(122));
    for r in &view.table {
        println!(
            "{:<28} {:<26} {:<18} {:<10} {:<19} {:>8} {:>8}",
            truncate(&r.model, 28),
            truncate(&r.scenario_class, 26),
            truncate(&r.metric_name, 18),
            truncate(if r.split.is_empty() { "-" } else { r.split.as_str() }, 10),
            r.run_timestamp
                .map(|ts| ts.format("%Y-%m-%d %H:%M:%S").to_string())
                .unwrap_or_else(|| "-".to_string()),
            fmt_value(r.stats.mean),
            fmt_value(r.stats.std),
        );
    }
}

fn print_summary(view: &DashboardView) {
    let s = &view.summary;
    if s.is_empty() {
        eprintln!("No data available for the selected filters.");
        return;
    }

    let color = match s.trend {
        Some(Trend::Up) => "\x1b[32m",   // Green
        Some(Trend::Down) => "\x1b[31m", // Red
        _ => "",
    };
    let reset = "\x1b[0m";

    eprintln!("\x1b[1mSummary:\x1b[0m");
    eprintln!("  Latest:      {}{}{}", color, fmt_value(s.latest), reset);
    eprintln!("  Average:     {}", fmt_value(s.mean));
    eprintln!("  Min / Max:   {} / {}", fmt_value(s.min), fmt_value(s.max));
    eprintln!("  Total runs:  {}", s.unique_runs);
    eprintln!("  Data points: {}", s.count);
    if let Some(days) = s.days_tracked {
        eprintln!("  Days:        {}", days);
    }
    if let Some(n) = s.scenarios_averaged {
        eprintln!("  Scenarios averaged: {}", n);
    }
}

fn show_variance(dataset: &Dataset, criteria: &Criteria, stat: VarianceMetric, grouping: Grouping) {
    let view = dashboard::variance_view(&dataset.records, criteria, stat, grouping);
    if view.result.is_empty() {
        println!("No model has two or more data points in any bucket.");
        return;
    }

    println!("{:<36} {:<12} {:>10} {:>7}", "MODEL", "BUCKET", stat.label().to_uppercase(), "POINTS");
    println!("{}", "-".repeat(68));
    for m in &view.result.models {
        for v in &m.values {
            println!(
                "{:<36} {:<12} {:>10.4} {:>7}",
                truncate(&m.model, 36),
                v.bucket.map(|d| d.to_string()).unwrap_or_else(|| "overall".to_string()),
                v.value,
                v.points
            );
        }
    }
}

fn show_scatter(dataset: &Dataset, criteria: &Criteria, bucket: ScatterBucket) {
    let series = dashboard::scatter_view(&dataset.records, criteria, bucket);
    if series.is_empty() {
        println!("No timestamped data found for the selected filters.");
        return;
    }

    let axis = match bucket {
        ScatterBucket::Daily => "HOUR",
        ScatterBucket::Weekly => "WEEKPOS",
    };
    println!("{:<36} {:>8} {:>10}", "MODEL", axis, "MEAN");
    println!("{}", "-".repeat(56));
    for s in &series {
        for p in &s.points {
            if let benchdash::series::X::Position(x) = p.x {
                println!("{:<36} {:>8.3} {:>10.4}", truncate(&s.name, 36), x, p.y);
            }
        }
    }
}
