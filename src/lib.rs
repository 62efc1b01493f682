use std::cmp::Ordering;
use std::collections::BTreeMap;

use log::debug;
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

/// Daily feed URL, one JSON document per source currency. The `####` token is
/// replaced with the lowercase currency code before the request is made.
pub const FEED_URL_TEMPLATE: &str = "http://www.floatrates.com/daily/####.json";

/// Placeholder token for the JSON file name in a feed URL template.
const FILENAME_TOKEN: &str = "####";

#[derive(Debug, Error)]
pub enum RateError {
    /// Template is missing the `http(s)://` scheme or the `/####.json` tail.
    #[error("malformed feed URL template: {0}")]
    InvalidTemplate(String),
    #[error("failed to reach the rate feed")]
    Network(#[from] ureq::Error),
    #[error("failed to decode the rate feed")]
    Decode(#[from] serde_json::Error),
    #[error("no rate published for {0}")]
    NotFound(String),
    #[error("invalid parameters: {0}")]
    InvalidArguments(String),
}

/// Substitute a JSON file name into a feed URL template.
///
/// The template must use the `http://` or `https://` scheme and end its path
/// with `/####.json` (a double slash before the token is rejected).
pub fn fill_template(template: &str, file_name: &str) -> Result<String, RateError> {
    let tail = format!("/{FILENAME_TOKEN}.json");
    if (template.starts_with("http://") || template.starts_with("https://"))
        && template.contains(&tail)
        && !template.contains(&format!("/{tail}"))
    {
        Ok(template.replace(FILENAME_TOKEN, file_name))
    } else {
        Err(RateError::InvalidTemplate(template.to_string()))
    }
}

/// One quote from the daily feed: a unit of the base (local) currency against
/// one target currency.
#[derive(Debug, Clone, PartialEq)]
pub struct CurrencyPair {
    /// Target currency display name
    pub name: String,
    /// Base (local) currency code, uppercase
    pub base: String,
    /// Target currency code, uppercase
    pub code: String,
    /// Units of target currency per one unit of base currency
    pub rate: f64,
    /// Units of base currency per one unit of target currency
    pub inverse_rate: f64,
}

impl CurrencyPair {
    /// Convert an amount of the base currency into the target currency.
    pub fn convert(&self, amount: f64) -> f64 {
        amount * self.rate
    }
}

#[derive(Deserialize)]
struct FeedEntry {
    name: String,
    code: String,
    rate: f64,
    #[serde(rename = "inverseRate")]
    inverse_rate: f64,
}

impl FeedEntry {
    fn into_pair(self, base: &str) -> CurrencyPair {
        CurrencyPair {
            // A few feed names embed tabs and a "convertible " qualifier
            name: self.name.replace('\t', "").replace("convertible ", ""),
            base: base.to_uppercase(),
            code: self.code.to_uppercase(),
            rate: self.rate,
            inverse_rate: self.inverse_rate,
        }
    }
}

fn fetch_body(source: &str) -> Result<String, RateError> {
    let url = fill_template(FEED_URL_TEMPLATE, &source.to_lowercase())?;
    debug!("fetching {url}");
    let body = ureq::get(&url).call()?.body_mut().read_to_string()?;
    Ok(body)
}

/// Fetch the daily feed for `source` and decode every published pair.
pub fn fetch_pairs(source: &str) -> Result<Vec<CurrencyPair>, RateError> {
    decode_pairs(&fetch_body(source)?, source)
}

/// Fetch the daily feed for `source` and decode the single `target` entry.
pub fn fetch_pair(source: &str, target: &str) -> Result<CurrencyPair, RateError> {
    decode_pair(&fetch_body(source)?, source, target)
}

/// Decode a feed document into one pair per entry. The feed is an object
/// keyed by lowercase target code; rate values are kept verbatim.
pub fn decode_pairs(body: &str, source: &str) -> Result<Vec<CurrencyPair>, RateError> {
    let feed: BTreeMap<String, FeedEntry> = serde_json::from_str(body)?;
    Ok(feed
        .into_values()
        .map(|entry| entry.into_pair(source))
        .collect())
}

/// Decode the single `target` entry out of a feed document.
pub fn decode_pair(body: &str, source: &str, target: &str) -> Result<CurrencyPair, RateError> {
    let mut feed: Value = serde_json::from_str(body)?;
    let entry = feed
        .get_mut(target.to_lowercase())
        .map(Value::take)
        .ok_or_else(|| RateError::NotFound(target.to_uppercase()))?;
    let entry: FeedEntry = serde_json::from_value(entry)?;
    Ok(entry.into_pair(source))
}

/// Field of [`CurrencyPair`] a table is ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    /// Target currency display name
    Name,
    /// Target currency code
    Code,
}

/// Stable, case-insensitive sort by the selected key.
pub fn sort_pairs(pairs: &mut [CurrencyPair], key: SortKey, descending: bool) {
    pairs.sort_by(|a, b| {
        let ord = match key {
            SortKey::Name => cmp_caseless(&a.name, &b.name),
            SortKey::Code => cmp_caseless(&a.code, &b.code),
        };
        if descending { ord.reverse() } else { ord }
    });
}

fn cmp_caseless(a: &str, b: &str) -> Ordering {
    a.to_uppercase().cmp(&b.to_uppercase())
}

/// Which rate columns a table report carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableMode {
    /// Both columns; `local_first` puts the buy (reverse-rate) column first
    Full { local_first: bool },
    /// Only the buy column: base code and reverse rate
    BuyOnly,
    /// Only the sell column: target code and forward rate
    SellOnly,
}

/// Render the single-pair report for `pair`.
pub fn render_pair(pair: &CurrencyPair) -> String {
    format!(
        "{base} <--> {code} exchange information:\n\
         ---------------------------------------------------\n\
         [!] Target currency : {name}\n\
         [B] {base} to {code} rate : {code} {rate:15.5}\n\
         [S] {code} to {base} rate : {base} {inverse:15.5}\n",
        base = pair.base,
        code = pair.code,
        name = pair.name,
        rate = pair.rate,
        inverse = pair.inverse_rate,
    )
}

/// Render the conversion report for `amount` of the base currency.
pub fn render_conversion(pair: &CurrencyPair, amount: f64) -> String {
    format!(
        "{base} {amount:.2} to {code} exchange rate:\n\
         ---------------------------------------------------\n\
         [!] Target currency : {name}\n\
         [B] {base} to {code} rate : {code} {total:15.5}\n",
        base = pair.base,
        code = pair.code,
        name = pair.name,
        total = pair.convert(amount),
    )
}

/// Render the exchange table for `source`, one row per pair, with the rate
/// column(s) selected by `mode`. Rows are printed in slice order.
pub fn render_table(pairs: &[CurrencyPair], source: &str, mode: TableMode) -> String {
    let source = source.to_uppercase();
    let mut out = match mode {
        TableMode::Full { local_first: true } => {
            format!("{source} exchange information: (buy / sell)\n")
        }
        TableMode::Full { local_first: false } => {
            format!("{source} exchange information: (sell / buy)\n")
        }
        TableMode::BuyOnly => format!("{source} currency buy information:\n"),
        TableMode::SellOnly => format!("{source} currency sell information:\n"),
    };
    out.push_str(&"-".repeat(74));
    out.push('\n');

    for pair in pairs {
        let row = match mode {
            TableMode::Full { local_first: true } => format!(
                "{:<30} : {} {:15.5} | {} {:15.5}\n",
                pair.name, pair.base, pair.inverse_rate, pair.code, pair.rate
            ),
            TableMode::Full { local_first: false } => format!(
                "{:<30} : {} {:15.5} | {} {:15.5}\n",
                pair.name, pair.code, pair.rate, pair.base, pair.inverse_rate
            ),
            TableMode::BuyOnly => format!(
                "{:<30} : {} {:15.5}\n",
                pair.name, pair.base, pair.inverse_rate
            ),
            TableMode::SellOnly => {
                format!("{:<30} : {} {:15.5}\n", pair.name, pair.code, pair.rate)
            }
        };
        out.push_str(&row);
    }
    out
}
