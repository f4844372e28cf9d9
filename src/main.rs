use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::NaiveDate;
use clap::{Args, Parser, Subcommand, ValueEnum};
use tracing::info;

mod charts;
mod cleaner;
mod config;
mod dates;
mod error;
mod loader;
mod metrics;
mod models;
mod report;

use charts::{ChartRenderer, PngChartRenderer};
use config::AnalysisConfig;
use models::CleanedTable;
use report::{ConsoleSummarizer, ReportInput, Summarizer};

const DEFAULT_HEAD: usize = 5;
const DEFAULT_CHARTS_DIR: &str = ".";
const DEFAULT_REPORT_HEAD: usize = 10;

#[derive(Parser)]
#[command(name = "sales-insights")]
#[command(about = "Exploratory sales analytics: RFM, CLV and top sellers", long_about = None)]
struct Cli {
    /// Delimited sales export to analyze
    #[arg(long, global = true, env = "SALES_INPUT", default_value = "amazon.csv")]
    input: PathBuf,
    /// Date that recency is measured from (YYYY-MM-DD)
    #[arg(long, global = true, default_value = "2025-03-07")]
    reference_date: NaiveDate,
    /// chrono format for the Date column; repeat to try several in order
    #[arg(long = "date-format", global = true)]
    date_formats: Vec<String>,
    /// Field delimiter of the input file
    #[arg(long, global = true, default_value_t = ',')]
    delimiter: char,
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Summary, charts and every metric, in that order
    Run(RunArgs),
    /// First rows, column info and descriptive statistics
    Summary {
        #[arg(long, default_value_t = DEFAULT_HEAD)]
        head: usize,
    },
    /// Recency, frequency and monetary value per order
    Rfm {
        #[arg(long, default_value_t = DEFAULT_HEAD)]
        limit: usize,
    },
    /// Lifetime value per order
    Clv {
        #[arg(long, default_value_t = DEFAULT_HEAD)]
        limit: usize,
    },
    /// Best-selling styles by quantity
    TopProducts {
        #[arg(long, default_value_t = config::DEFAULT_TOP_PRODUCTS)]
        count: usize,
    },
    /// Render the descriptive charts as PNG files
    Charts {
        #[arg(long, default_value = DEFAULT_CHARTS_DIR)]
        out_dir: PathBuf,
    },
    /// Write a report file
    Report {
        #[arg(long, default_value = "sales_report.md")]
        out: PathBuf,
        #[arg(long, value_enum, default_value_t = ReportFormat::Markdown)]
        format: ReportFormat,
        /// Rows shown per RFM and CLV section (markdown only)
        #[arg(long, default_value_t = DEFAULT_REPORT_HEAD)]
        head: usize,
    },
}

/// Options of the full pipeline; also used when no subcommand is given.
#[derive(Args, Debug, PartialEq, Eq)]
struct RunArgs {
    #[arg(long, default_value = DEFAULT_CHARTS_DIR)]
    charts_dir: PathBuf,
    #[arg(long)]
    no_charts: bool,
    #[arg(long, default_value_t = DEFAULT_HEAD)]
    head: usize,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            charts_dir: PathBuf::from(DEFAULT_CHARTS_DIR),
            no_charts: false,
            head: DEFAULT_HEAD,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum ReportFormat {
    Markdown,
    Json,
}

impl Cli {
    fn analysis_config(&self) -> anyhow::Result<AnalysisConfig> {
        let mut config = AnalysisConfig {
            reference_date: self.reference_date,
            ..AnalysisConfig::default()
        };
        if !self.date_formats.is_empty() {
            config.date_formats = self.date_formats.clone();
        }
        config.delimiter =
            u8::try_from(self.delimiter).context("delimiter must be a single-byte character")?;
        Ok(config)
    }
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    let config = cli.analysis_config()?;
    let table = load_table(&cli.input, &config)?;

    let command = cli
        .command
        .unwrap_or_else(|| Commands::Run(RunArgs::default()));

    match command {
        Commands::Run(RunArgs {
            charts_dir,
            no_charts,
            head,
        }) => {
            let renderer = PngChartRenderer::new(charts_dir, config.date_formats.clone());
            let renderer: Option<&dyn ChartRenderer> = if no_charts { None } else { Some(&renderer) };
            let summarizer = ConsoleSummarizer { head };
            print!("{}", run_pipeline(&table, &config, &summarizer, renderer, head)?);
        }
        Commands::Summary { head } => {
            print!("{}", ConsoleSummarizer { head }.summarize(&table));
        }
        Commands::Rfm { limit } => {
            let rfm = metrics::compute_rfm(
                &table,
                config.reference_date,
                &config.date_formats(),
            )
            .context("failed to compute RFM")?;
            print!("{}", report::format_rfm(&rfm, limit));
        }
        Commands::Clv { limit } => {
            let clv = metrics::compute_clv(&table).context("failed to compute CLV")?;
            print!("{}", report::format_clv(&clv, limit));
        }
        Commands::TopProducts { count } => {
            let top = metrics::compute_top_products(&table, count)
                .context("failed to rank products")?;
            print!("{}", report::format_top_products(&top));
        }
        Commands::Charts { out_dir } => {
            let renderer = PngChartRenderer::new(out_dir, config.date_formats.clone());
            let artifacts = renderer.render(&table).context("failed to render charts")?;
            for artifact in artifacts {
                println!("{} saved to {}.", artifact.title, artifact.path.display());
            }
        }
        Commands::Report { out, format, head } => {
            let rfm = metrics::compute_rfm(
                &table,
                config.reference_date,
                &config.date_formats(),
            )
            .context("failed to compute RFM")?;
            let clv = metrics::compute_clv(&table).context("failed to compute CLV")?;
            let top = metrics::compute_top_products(&table, config.top_products)
                .context("failed to rank products")?;
            let input = ReportInput {
                table: &table,
                reference_date: config.reference_date,
                rfm: &rfm,
                clv: &clv,
                top_products: &top,
            };
            let contents = match format {
                ReportFormat::Markdown => report::build_report(&input, head)?,
                ReportFormat::Json => {
                    serde_json::to_string_pretty(&report::build_json_report(&input)?)?
                }
            };
            std::fs::write(&out, contents)
                .with_context(|| format!("failed to write {}", out.display()))?;
            println!("Report written to {}.", out.display());
        }
    }

    Ok(())
}

fn load_table(input: &Path, config: &AnalysisConfig) -> anyhow::Result<CleanedTable> {
    let rows = loader::load_sales(input, config.delimiter)
        .with_context(|| format!("cannot load {}", input.display()))?;
    let (table, _) = cleaner::clean(rows);
    Ok(table)
}

/// Everything the analysis prints, in the order it is printed.
fn run_pipeline(
    table: &[models::SalesRecord],
    config: &AnalysisConfig,
    summarizer: &dyn Summarizer,
    renderer: Option<&dyn ChartRenderer>,
    head: usize,
) -> anyhow::Result<String> {
    let mut output = summarizer.summarize(table).to_string();

    if let Some(renderer) = renderer {
        let artifacts = renderer.render(table).context("failed to render charts")?;
        info!(charts = artifacts.len(), "charts rendered");
    }

    let rfm = metrics::compute_rfm(table, config.reference_date, &config.date_formats())
        .context("failed to compute RFM")?;
    output.push_str("\nRFM:\n");
    output.push_str(&report::format_rfm(&rfm, head));

    let clv = metrics::compute_clv(table).context("failed to compute CLV")?;
    output.push_str("\nCLV:\n");
    output.push_str(&report::format_clv(&clv, head));

    let top = metrics::compute_top_products(table, config.top_products)
        .context("failed to rank products")?;
    output.push_str("\nTop products:\n");
    output.push_str(&report::format_top_products(&top));

    Ok(output)
}
