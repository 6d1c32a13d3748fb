//! Per-model token prices, used to log an estimated cost for each call.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;

/// Prices are quoted per million tokens.
fn per_million(price: Decimal) -> Decimal {
    price / dec!(1000000)
}

/// (input, output) USD cost per token for a known model.
///
/// Matches on prefix; longer prefixes come first so `gpt-4o-mini` does not
/// resolve to `gpt-4o`.
pub fn model_cost(model: &str) -> Option<(Decimal, Decimal)> {
    let (input, output) = match model {
        m if m.starts_with("gemini-2.0-flash-lite") => (dec!(0.075), dec!(0.30)),
        m if m.starts_with("gemini-2.0-flash") => (dec!(0.10), dec!(0.40)),
        m if m.starts_with("gemini-1.5-flash") => (dec!(0.075), dec!(0.30)),
        m if m.starts_with("gemini-1.5-pro") => (dec!(1.25), dec!(5.00)),
        m if m.starts_with("gemini-pro") => (dec!(0.50), dec!(1.50)),
        m if m.starts_with("gpt-4o-mini") => (dec!(0.15), dec!(0.60)),
        m if m.starts_with("gpt-4o") => (dec!(2.50), dec!(10.00)),
        m if m.starts_with("gpt-3.5-turbo") => (dec!(0.50), dec!(1.50)),
        _ => return None,
    };
    Some((per_million(input), per_million(output)))
}

/// Cost for unknown models: free, so estimates never overstate.
pub fn default_cost() -> (Decimal, Decimal) {
    (Decimal::ZERO, Decimal::ZERO)
}

/// Estimated USD cost of one call.
pub fn estimate(cost: (Decimal, Decimal), input_tokens: u32, output_tokens: u32) -> Decimal {
    cost.0 * Decimal::from(input_tokens) + cost.1 * Decimal::from(output_tokens)
}
