use anyhow::Result;
use chrono::{NaiveDate, Utc};
use clap::{Args, Parser, Subcommand};
use serde::Serialize;
use std::path::PathBuf;
use tracing::{error, info};

use ccp_monitor::config::{self, Config, Thresholds};
use ccp_monitor::logging;
use ccp_monitor::observability::metrics;
use ccp_monitor::pipeline::ingestion::source_from_config;
use ccp_monitor::pipeline::processing::aggregate::RiskTier;
use ccp_monitor::pipeline::processing::table::{SortConfig, SortDirection, TablePage};
use ccp_monitor::pipeline::{DashboardView, Dataset, RecordImages};
use ccp_monitor::types::{ComplianceFlag, NormalizedRecord, RecordField};
use ccp_monitor::{DateRangePreset, DefaultNormalizer, FilterCriteria};

#[derive(Parser)]
#[command(name = "ccp_monitor")]
#[command(about = "Critical control point compliance monitor")]
#[command(version = "0.1.0")]
struct Cli {
    /// Configuration file
    #[arg(long, global = true, default_value = config::DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Read rows from a JSON export instead of the configured feed
    #[arg(long, global = true)]
    file: Option<PathBuf>,

    /// Fetch rows from this endpoint instead of the configured feed
    #[arg(long, global = true)]
    url: Option<String>,

    /// Print machine-readable JSON
    #[arg(long, global = true)]
    json: bool,

    /// Print Prometheus metrics after the command
    #[arg(long, global = true)]
    metrics: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// KPIs, category risk ranking, failure trend and shift breakdown
    Summary {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Sorted, paginated record table
    Records {
        #[command(flatten)]
        filters: FilterArgs,
        /// Column to sort by (date, time, shift, category, status, created-by, ...)
        #[arg(long, default_value = "date")]
        sort: RecordField,
        /// Sort ascending instead of newest/highest first
        #[arg(long)]
        asc: bool,
        /// 1-based page number
        #[arg(long, default_value_t = 1)]
        page: usize,
    },
    /// Failed checks only
    Failed {
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Directly viewable image links per record
    Images {
        #[command(flatten)]
        filters: FilterArgs,
        /// Search every column of the raw row, not just the image column
        #[arg(long)]
        scan: bool,
    },
    /// Values available for the shift, category and created-by filters
    Options,
}

#[derive(Args, Debug, Clone, Default)]
struct FilterArgs {
    /// Inclusive start date (YYYY-MM-DD)
    #[arg(long)]
    start: Option<NaiveDate>,
    /// Inclusive end date (YYYY-MM-DD)
    #[arg(long)]
    end: Option<NaiveDate>,
    /// Quick range: today, yesterday or last7
    #[arg(long)]
    range: Option<DateRangePreset>,
    #[arg(long)]
    shift: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// pass/fail (or yes/no)
    #[arg(long)]
    status: Option<ComplianceFlag>,
    #[arg(long)]
    created_by: Option<String>,
}

impl FilterArgs {
    /// A preset fills both bounds; explicit --start/--end override it
    fn criteria(&self, today: NaiveDate) -> FilterCriteria {
        let mut criteria = FilterCriteria::default();
        if let Some(preset) = self.range {
            criteria = criteria.with_preset(preset, today);
        }
        if self.start.is_some() {
            criteria.start_date = self.start;
        }
        if self.end.is_some() {
            criteria.end_date = self.end;
        }
        criteria.shift = self.shift.clone();
        criteria.category = self.category.clone();
        criteria.compliance = self.status;
        criteria.created_by = self.created_by.clone();
        criteria
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    let _log_guard = logging::init_logging();

    let cli = Cli::parse();

    if cli.metrics {
        metrics::init()?;
    }

    let mut config = Config::load_from(&cli.config)?;
    if let Some(file) = &cli.file {
        config.feed.path = Some(file.display().to_string());
    }
    if let Some(url) = &cli.url {
        config.feed.url = Some(url.clone());
        config.feed.path = None;
    }

    let source = source_from_config(&config.feed)?;
    let normalizer = DefaultNormalizer::with_config(&config.normalize);
    let dataset = match Dataset::load(source.as_ref(), &normalizer).await {
        Ok(dataset) => dataset,
        Err(e) => {
            error!("Failed to load feed: {}", e);
            return Err(e.into());
        }
    };
    info!("Loaded {} records", dataset.len());

    let today = Utc::now().date_naive();
    let thresholds = &config.thresholds;

    match cli.command {
        Commands::Summary { filters } => {
            let view = DashboardView::build(&dataset, &filters.criteria(today), thresholds);
            if cli.json {
                print_json(&view)?;
            } else {
                print_summary(&view, thresholds);
            }
        }
        Commands::Records { filters, sort, asc, page } => {
            let sort = SortConfig {
                field: sort,
                direction: if asc { SortDirection::Asc } else { SortDirection::Desc },
            };
            let table = dataset.table(&filters.criteria(today), sort, page, thresholds);
            if cli.json {
                print_json(&table)?;
            } else {
                print_table(&table);
            }
        }
        Commands::Failed { filters } => {
            let view = DashboardView::build(&dataset, &filters.criteria(today), thresholds);
            if cli.json {
                print_json(&view.failed)?;
            } else {
                print_failed(&view.failed);
            }
        }
        Commands::Images { filters, scan } => {
            let links = dataset.image_links(&filters.criteria(today), scan);
            if cli.json {
                print_json(&links)?;
            } else {
                print_images(&links);
            }
        }
        Commands::Options => {
            let options = dataset.filter_options();
            if cli.json {
                print_json(&options)?;
            } else {
                println!("Shifts:     {}", options.shifts.join(", "));
                println!("Categories: {}", options.categories.join(", "));
                println!("Created by: {}", options.creators.join(", "));
            }
        }
    }

    if cli.metrics {
        if let Some(text) = metrics::render() {
            println!("\n{}", text);
        }
    }

    Ok(())
}

fn print_json<T: Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_summary(view: &DashboardView, thresholds: &Thresholds) {
    let kpis = &view.kpis;
    println!("\n📊 CCP Monitor ({} active filters)", view.active_filters);
    println!("   Total records:  {}", kpis.total);
    println!("   Compliant:      {}", kpis.compliant);
    println!("   Non-compliant:  {}", kpis.non_compliant);
    if kpis.is_critical {
        println!(
            "   Critical breach: {:.1}% ⚠️  CRITICAL LEVEL (>{}%)",
            kpis.risk_percentage, thresholds.critical_risk_percent
        );
    } else {
        println!("   Critical breach: {:.1}% (monitor closely)", kpis.risk_percentage);
    }

    println!("\n🏷️  Category risk");
    for risk in &view.category_risk {
        let marker = match risk.tier {
            RiskTier::Critical => "🔴",
            RiskTier::Caution => "🟠",
            RiskTier::Healthy => "🟢",
        };
        println!(
            "   {} {} ({} failed of {}, {:.1}% compliant)",
            marker, risk.category, risk.failed, risk.total, risk.compliance_percent
        );
    }

    println!("\n📈 Failure trend");
    for point in &view.trend {
        println!("   {}  {}", point.date, point.failures);
    }

    println!("\n🕒 Shifts");
    for shift in &view.shifts {
        println!("   {}: {} pass / {} fail", shift.shift, shift.pass, shift.fail);
    }
}

fn print_table(table: &TablePage) {
    println!(
        "\nPage {} of {} ({} records)",
        table.page, table.total_pages, table.total_records
    );
    for record in &table.records {
        print_record(record);
    }
}

fn print_failed(failed: &[NormalizedRecord]) {
    if failed.is_empty() {
        println!("✅ No failed checks");
        return;
    }
    println!("\n⚠️  {} incidents", failed.len());
    for record in failed {
        println!(
            "   {} | {} | {} | {} | {}",
            record.date, record.shift, record.particulars, record.description, record.remarks
        );
    }
}

fn print_record(record: &NormalizedRecord) {
    let status = record.compliance.map(|c| c.as_str()).unwrap_or("-");
    println!(
        "   {} {} | {} | {} | {} | {} | {} | {}",
        record.date,
        record.time,
        record.shift,
        record.category,
        record.particulars,
        status,
        record.remarks,
        record.created_by
    );
}

fn print_images(links: &[RecordImages]) {
    for entry in links {
        if entry.urls.is_empty() {
            println!("   row {} ({} {}): -", entry.row, entry.date, entry.particulars);
        } else {
            println!("   row {} ({} {}):", entry.row, entry.date, entry.particulars);
            for url in &entry.urls {
                println!("      {}", url);
            }
        }
    }
}
