use std::net::SocketAddr;

use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use epargne::config::{Settings, settle_from_millis};
use epargne::core::{RawValue, SimulationResult, brackets, simulate};
use epargne::form::{RawParameters, assemble};

#[derive(Parser, Debug)]
#[command(
    name = "epargne",
    about = "Monthly savings simulator with income-based savings recommendations"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Run the HTTP JSON API.
    Serve {
        #[arg(long, help = "Bind address, defaults to EPARGNE_HOST or 0.0.0.0")]
        host: Option<std::net::IpAddr>,
        #[arg(long, help = "Port, defaults to PORT or 8080")]
        port: Option<u16>,
    },
    /// Simulate one savings plan and print the result.
    Simulate(SimulateArgs),
    /// List the income brackets and their recommendations.
    Brackets,
    /// Read JSON form edits from stdin, one per line, and print a result line
    /// once edits settle.
    Watch {
        #[arg(long, help = "Quiet period in ms, defaults to EPARGNE_SETTLE_MS or 300")]
        settle_ms: Option<u64>,
    },
}

#[derive(Args, Debug)]
struct SimulateArgs {
    #[arg(long, help = "Starting capital; negative or non-numeric values are clamped to 0")]
    initial_capital: Option<String>,
    #[arg(long, help = "Amount deposited at the start of each month")]
    monthly_contribution: Option<String>,
    #[arg(long, help = "Nominal annual interest rate in percent, 0 to 100")]
    rate: Option<String>,
    #[arg(long, help = "Duration in whole years, 1 to 50")]
    years: Option<String>,
    #[arg(long, help = "Income bracket id, e.g. moins-2000")]
    bracket: Option<String>,
    #[arg(long, help = "Monthly income used to pick a bracket when --bracket is absent")]
    monthly_income: Option<String>,
    #[arg(long, help = "Print a yearly table instead of JSON")]
    table: bool,
}

impl From<SimulateArgs> for RawParameters {
    fn from(args: SimulateArgs) -> Self {
        RawParameters {
            initial_capital: args.initial_capital.map(RawValue::Text),
            monthly_contribution: args.monthly_contribution.map(RawValue::Text),
            annual_rate_percent: args.rate.map(RawValue::Text),
            years: args.years.map(RawValue::Text),
            income_bracket_id: args.bracket,
            monthly_income: args.monthly_income.map(RawValue::Text),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::from_env();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(&settings.log_filter))
        .with_writer(std::io::stderr)
        .init();

    match Cli::parse().command {
        Command::Serve { host, port } => {
            let addr = SocketAddr::new(
                host.unwrap_or(settings.host),
                port.unwrap_or(settings.port),
            );
            epargne::api::run_http_server(addr).await?;
        }
        Command::Simulate(args) => {
            let table = args.table;
            let assembled = assemble(&args.into());
            for (field, message) in &assembled.messages {
                eprintln!("warning: {} ({message})", field.wire_name());
            }
            let result = simulate(&assembled.parameters);
            if let Some(notice) = &result.bracket_notice {
                eprintln!("warning: {notice}");
            }
            if table {
                print_table(&result);
            } else {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Command::Brackets => {
            for bracket in brackets() {
                let recommendation = bracket.recommendation();
                println!(
                    "{:<12} {:<24} {:>5.0}% {:>8.0}",
                    bracket.id,
                    bracket.label,
                    recommendation.percentage_of_income,
                    recommendation.recommended_monthly_amount
                );
            }
        }
        Command::Watch { settle_ms } => {
            let settle = settle_ms.map(settle_from_millis).unwrap_or(settings.settle);
            let stdin = tokio::io::BufReader::new(tokio::io::stdin());
            let written = epargne::watch::run_watch(stdin, std::io::stdout(), settle).await?;
            tracing::info!(written, "input closed");
        }
    }

    Ok(())
}

fn print_table(result: &SimulationResult) {
    println!("{:>5} {:>16} {:>16}", "year", "contributed", "total");
    for point in result.yearly_points() {
        println!(
            "{:>5} {:>16.2} {:>16.2}",
            point.period_index / 12,
            point.cumulative_contributed,
            point.cumulative_total
        );
    }
    println!();
    println!("final total:       {:.2}", result.final_total);
    println!("total contributed: {:.2}", result.total_contributed);
    println!("total gain:        {:.2}", result.total_gain);
    println!(
        "recommended saving: {:.0} per month ({:.0}% of income)",
        result.recommendation.recommended_monthly_amount,
        result.recommendation.percentage_of_income
    );
}
