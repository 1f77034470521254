#![cfg(not(tarpaulin_include))]

use calltrack::aggregator::{group_by_entity, group_by_period, rate_over_last_periods};
use calltrack::dashboard::{
    AnswerRateView, CompanyRanking, FilterOptions, GlobalStats, SpamOverview, WeekdayHourGrid,
};
use calltrack::export::{to_csv, write_csv};
use calltrack::record::{AGENCY, RateSummary};
use calltrack::snapshot::load_snapshot;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "calltrack", about = "Summaries from a call tracking snapshot")]
struct Cli {
    /// Path to dashboard_data.json
    snapshot: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Monthly answer rate, optionally filtered
    AnswerRate {
        #[arg(long, default_value = "all")]
        agence: String,
        #[arg(long, default_value = "all")]
        canal: String,
    },
    /// Agencies and channels accepted by the filters
    Filters,
    /// Monthly spam rate
    SpamRate,
    /// Pages Jaunes spam breakdown
    SpamPj,
    /// Answer rate per weekday and opening hour
    WeekdayHour,
    /// Answer rate over the last N months
    LastPeriods {
        #[arg(short, default_value_t = 2)]
        n: usize,
    },
    /// Answer rate per agency, channel suffixes merged
    Agencies,
    /// Companies ranked by volume
    Ranking {
        #[arg(long)]
        search: Option<String>,
    },
    /// Headline figures
    Stats,
    /// Filtered answer-rate series as CSV
    Export {
        #[arg(long, default_value = "all")]
        agence: String,
        #[arg(long, default_value = "all")]
        canal: String,
        /// Output file, stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },
}

fn format_rate(rate: Option<f64>) -> String {
    match rate {
        Some(rate) => format!("{:.2}%", rate),
        None => "-".to_string(),
    }
}

fn print_summaries(summaries: &[RateSummary]) {
    if summaries.is_empty() {
        println!("(no data)");
        return;
    }
    for s in summaries {
        println!("{:<30} {:>8}/{:<8} {}", s.key, s.answered, s.total, format_rate(s.rate));
    }
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();

    let cli = Cli::parse();
    let snapshot = load_snapshot(&cli.snapshot)?;

    match cli.command {
        Command::AnswerRate { agence, canal } => {
            let view = AnswerRateView::new(&agence, &canal);
            print_summaries(&view.series(&snapshot));
            let stats = view.stats(&snapshot);
            println!("Total: {}/{} {}", stats.answered, stats.total, format_rate(stats.rate));
        }
        Command::Filters => {
            let options = FilterOptions::from_snapshot(&snapshot);
            println!("Agencies: {}", options.agencies.join(", "));
            println!("Channels: {}", options.channels.join(", "));
        }
        Command::SpamRate => print_summaries(&group_by_period(&snapshot.spam_by_month())),
        Command::SpamPj => match SpamOverview::from_snapshot(&snapshot) {
            Some(overview) => {
                println!("Nature:");
                for n in &overview.natures {
                    println!("  {:<30} {:>8} ({}%)", n.nature, n.count, n.percentage);
                }
                println!("Number type:");
                for t in &overview.number_types {
                    println!("  {:<30} {:>8} ({}%)", t.kind, t.count, t.percentage);
                }
                println!(
                    "Durations: conversation {:.2}s, ringing {:.2}s, total {:.2}s",
                    overview.durations.conversation_moy,
                    overview.durations.sonnerie_moy,
                    overview.durations.totale_moy
                );
                println!("Peak hours:");
                for peak in &overview.peak_hours {
                    println!("  {:<30} {:>8} calls", peak.label, peak.count);
                }
                println!("Top numbers:");
                for top in &overview.top_numbers {
                    println!("  #{:<3} {:<25} {:>8} ({}%)", top.rank, top.number, top.count, top.percentage);
                }
            }
            None => println!("(no data)"),
        },
        Command::WeekdayHour => {
            let grid = WeekdayHourGrid::build(&snapshot.decroche_jour_heure);
            let header: Vec<String> = grid.hours.iter().map(|h| format!("{:>7}", format!("{}h", h))).collect();
            println!("{:<10}{}", "", header.join(""));
            for day in &grid.days {
                let cells: Vec<String> = day
                    .rates
                    .iter()
                    .map(|rate| match rate {
                        Some(rate) => format!("{:>7.1}", rate),
                        None => format!("{:>7}", "-"),
                    })
                    .collect();
                println!("{:<10}{}", day.label, cells.join(""));
            }
        }
        Command::LastPeriods { n } => match rate_over_last_periods(&snapshot.answered_by_month(), n) {
            Some(summary) => print_summaries(&[summary]),
            None => println!("(no data)"),
        },
        Command::Agencies => {
            print_summaries(&group_by_entity(&snapshot.answered_by_agency_channel(), AGENCY))
        }
        Command::Ranking { search } => {
            let ranking = CompanyRanking::build(&snapshot.hierarchy_combined);
            for company in ranking.search(search.as_deref().unwrap_or("")) {
                println!(
                    "#{:<3} {:<30} {:>8} {:.1}% ({})",
                    company.rank,
                    company.name,
                    company.volume,
                    company.rate,
                    company.class.css_class()
                );
                for agency in &company.agencies {
                    println!("       {:<28} {:>8} {:.1}%", agency.name, agency.volume, agency.rate);
                }
            }
        }
        Command::Stats => {
            let stats = GlobalStats::compute(&snapshot);
            println!("Spam rate:      {}", format_rate(stats.spam_rate));
            println!("Total calls:    {}", stats.total_calls);
            println!("Answer rate:    {}", format_rate(stats.answer_rate));
            println!("Non-spam calls: {}", stats.non_spam_calls);
        }
        Command::Export { agence, canal, out } => {
            let series = AnswerRateView::new(&agence, &canal).series(&snapshot);
            match out {
                Some(path) => write_csv(&series, path)?,
                None => print!("{}", to_csv(&series)),
            }
        }
    }

    Ok(())
}
