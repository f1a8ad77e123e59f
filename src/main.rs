use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use top_stocks::config::RankingConfig;
use top_stocks::database::{self, load_current_prices};
use top_stocks::models::ValuationLabel;
use top_stocks::trading;
use top_stocks::valuation::{revalue_universe, ValuationParams};
use top_stocks::{rank_top_stocks, RankingParams, WorkflowGate};

static GATE: WorkflowGate = WorkflowGate::new();

#[derive(Parser)]
#[command(name = "top-stocks", about = "Stock-picking pipeline: valuation, sentiment, ranking")]
struct Cli {
    /// Path to the SQLite database (overrides DB_PATH)
    #[arg(long)]
    db: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Create the database tables if they do not exist
    InitDb,
    /// Recompute intrinsic values and valuation labels for the whole table
    Revalue {
        #[arg(long, default_value_t = 0.03)]
        risk_free_rate: f64,
        #[arg(long, default_value_t = 0.08)]
        market_return: f64,
    },
    /// Train the ranking model and print the top picks
    Rank {
        /// Number of picks (overrides TOP_N_STOCKS)
        #[arg(long)]
        top_n: Option<usize>,
        /// Valuation filter: overvalued or undervalued (overrides VALUATION)
        #[arg(long, value_parser = parse_valuation)]
        valuation: Option<ValuationLabel>,
        /// Print the picks as JSON instead of a table
        #[arg(long)]
        json: bool,
    },
    /// Rank and open one paper buy per pick
    PaperBuy {
        #[arg(long, default_value_t = 1)]
        quantity: i64,
    },
    /// Close all open paper trades and archive the week into the portfolio
    PaperSell,
    /// Show the portfolio rows covering a date (default: today)
    Portfolio {
        #[arg(long)]
        date: Option<chrono::NaiveDate>,
    },
}

fn parse_valuation(raw: &str) -> Result<ValuationLabel, String> {
    raw.parse()
}

/// One ranking workflow at a time; a second invocation in the same process
/// is rejected rather than queued.
fn acquire_gate() -> Result<top_stocks::gate::WorkflowGuard<'static>> {
    GATE.try_acquire()
        .ok_or_else(|| anyhow::anyhow!("a ranking workflow is already running"))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let cli = Cli::parse();
    let config = RankingConfig::from_env();

    let db_path = match (&cli.db, &config) {
        (Some(db), _) => db.clone(),
        (None, Ok(config)) => config.db_path.clone(),
        (None, Err(_)) => anyhow::bail!("no database given: pass --db or set DB_PATH"),
    };
    let pool = database::connect(&db_path).await?;

    match cli.command {
        Command::InitDb => {
            database::init_schema(&pool).await?;
            println!("database initialized at {}", db_path);
        }
        Command::Revalue {
            risk_free_rate,
            market_return,
        } => {
            let params = ValuationParams {
                risk_free_rate,
                market_return,
            };
            let survivors = revalue_universe(&pool, &params).await?;
            println!("{} stocks survived valuation cleaning", survivors);
        }
        Command::Rank {
            top_n,
            valuation,
            json,
        } => {
            let _guard = acquire_gate()?;
            let params = ranking_params(&config, top_n, valuation)?;
            let picks = rank_top_stocks(&pool, &params).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&picks)?);
            } else {
                println!(
                    "Top {} {} stocks by predicted future return:",
                    picks.len(),
                    params.valuation
                );
                for (rank, pick) in picks.iter().enumerate() {
                    println!(
                        "{:>3}. {:<6} predicted {:+.4}  price {}",
                        rank + 1,
                        pick.symbol,
                        pick.predicted_return,
                        pick.current_price
                            .map_or_else(|| "n/a".to_string(), |p| format!("{:.2}", p)),
                    );
                }
            }
        }
        Command::PaperBuy { quantity } => {
            let _guard = acquire_gate()?;
            let params = ranking_params(&config, None, None)?;
            let picks = rank_top_stocks(&pool, &params).await?;
            let opened = trading::open_trades_for_picks(&pool, &picks, quantity).await?;
            println!("opened {} paper trades (quantity {} each)", opened, quantity);
        }
        Command::PaperSell => {
            let prices = load_current_prices(&pool).await?;
            let closed = trading::close_all_open_trades(&pool, &prices).await?;
            println!("closed {} paper positions:", closed.len());
            for position in &closed {
                println!(
                    "  {:<6} qty {:>4} @ {:.2} -> {:.2}  P/L {:+.2}",
                    position.stock_symbol,
                    position.quantity,
                    position.entry_price,
                    position.current_price,
                    position.gain_loss,
                );
            }
        }
        Command::Portfolio { date } => {
            let date = date.unwrap_or_else(|| chrono::Local::now().date_naive());
            let entries = trading::portfolio_for_week(&pool, date).await?;
            println!("portfolio entries covering {}:", date);
            for entry in &entries {
                println!(
                    "  {:<6} {} -> {}  qty {:>4}  cost {:.2}  weekly P/L {:+.2}",
                    entry.stock_symbol,
                    entry.week_start_date,
                    entry.week_end_date,
                    entry.total_quantity,
                    entry.total_cost,
                    entry.weekly_profit_loss,
                );
            }
        }
    }

    Ok(())
}

fn ranking_params(
    config: &Result<RankingConfig>,
    top_n: Option<usize>,
    valuation: Option<ValuationLabel>,
) -> Result<RankingParams> {
    let defaults = RankingParams::default();
    let (env_top_n, env_valuation) = match config {
        Ok(config) => (Some(config.top_n), Some(config.valuation)),
        Err(_) => (None, None),
    };
    Ok(RankingParams {
        top_n: top_n.or(env_top_n).unwrap_or(defaults.top_n),
        valuation: valuation.or(env_valuation).unwrap_or(defaults.valuation),
    })
}
