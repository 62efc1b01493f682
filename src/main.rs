use clap::Parser;
use fxrates::{
    RateError, SortKey, TableMode, fetch_pair, fetch_pairs, render_conversion, render_pair,
    render_table, sort_pairs,
};
use log::error;

/// Daily currency exchange tables from the floatrates.com JSON feed.
///
/// With only SOURCE, prints the full exchange table for that currency, sorted
/// by currency name. Pass `demo` as SOURCE for the USD table sorted by
/// currency code.
#[derive(Parser)]
struct Cli {
    /// Source (local) currency code, e.g. `usd`, or `demo`
    #[arg(value_name = "SOURCE")]
    source: String,
    /// Target currency code for a single-pair report
    #[arg(
        value_name = "TARGET",
        conflicts_with_all = ["buy", "sell", "show_in_local_currency", "sort_by_currency_code"]
    )]
    target: Option<String>,
    /// Amount of the source currency to convert
    #[arg(value_name = "AMOUNT", requires = "target")]
    amount: Option<f64>,

    /// Show only the buy column (price of one unit of each currency in SOURCE)
    #[arg(long, conflicts_with_all = ["sell", "show_in_local_currency"])]
    buy: bool,
    /// Show only the sell column (what one unit of SOURCE buys of each currency)
    #[arg(long, conflicts_with = "show_in_local_currency")]
    sell: bool,
    /// Put the local-currency (buy) column first in the full table
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    show_in_local_currency: Option<bool>,
    /// Sort the table by currency code instead of currency name
    #[arg(
        long,
        value_name = "BOOL",
        num_args = 0..=1,
        require_equals = true,
        default_missing_value = "true"
    )]
    sort_by_currency_code: Option<bool>,
}

fn main() {
    env_logger::init();
    let args = Cli::parse();

    if let Err(err) = run(&args) {
        error!("{err}");
        if matches!(err, RateError::InvalidArguments(_)) {
            eprintln!("invalid parameters, see --help");
        }
        std::process::exit(1);
    }
}

fn run(args: &Cli) -> Result<(), RateError> {
    if args.source == "demo" {
        let mut pairs = fetch_pairs("usd")?;
        sort_pairs(&mut pairs, SortKey::Code, false);
        print!(
            "{}",
            render_table(&pairs, "usd", TableMode::Full { local_first: false })
        );
        return Ok(());
    }

    match (args.target.as_deref(), args.amount) {
        (Some(target), None) => {
            let pair = fetch_pair(&args.source, target)?;
            print!("{}", render_pair(&pair));
        }
        (Some(target), Some(amount)) => {
            if !amount.is_finite() || amount <= 0.0 {
                return Err(RateError::InvalidArguments(format!(
                    "amount must be a positive number, got {amount}"
                )));
            }
            let pair = fetch_pair(&args.source, target)?;
            print!("{}", render_conversion(&pair, amount));
        }
        (None, _) => {
            let key = if args.sort_by_currency_code.unwrap_or(false) {
                SortKey::Code
            } else {
                SortKey::Name
            };
            let mode = if args.buy {
                TableMode::BuyOnly
            } else if args.sell {
                TableMode::SellOnly
            } else {
                TableMode::Full {
                    local_first: args.show_in_local_currency.unwrap_or(false),
                }
            };

            let mut pairs = fetch_pairs(&args.source)?;
            sort_pairs(&mut pairs, key, false);
            print!("{}", render_table(&pairs, &args.source, mode));
        }
    }
    Ok(())
}
