//! Money and percentage rendering for reports.
//!
//! Amounts are always shown as Indian rupees with two decimals and Indian
//! digit grouping (`₹12,34,567.89`), whatever currency the request names.

const RUPEE: char = '₹';

/// Group an integer digit string the Indian way: the last three digits,
/// then pairs.
fn group_indian(digits: &str) -> String {
    if digits.len() <= 3 {
        return digits.to_string();
    }
    let (head, tail) = digits.split_at(digits.len() - 3);
    let mut groups: Vec<&str> = Vec::new();
    let mut end = head.len();
    while end > 0 {
        let start = end.saturating_sub(2);
        groups.push(&head[start..end]);
        end = start;
    }
    groups.reverse();
    format!("{},{}", groups.join(","), tail)
}

pub fn format_inr(amount: f64) -> String {
    if amount.is_nan() {
        return format!("{RUPEE}NaN");
    }
    if amount.is_infinite() {
        let sign = if amount < 0.0 { "-" } else { "" };
        return format!("{sign}{RUPEE}∞");
    }

    let fixed = format!("{:.2}", amount.abs());
    let (whole, fraction) = fixed.split_once('.').unwrap_or((fixed.as_str(), "00"));
    // "-0.00" is shown without a sign.
    let sign = if amount < 0.0 && fixed != "0.00" { "-" } else { "" };
    format!("{sign}{RUPEE}{}.{fraction}", group_indian(whole))
}

/// One decimal place, e.g. `15.5`.
pub fn format_percent(value: f64) -> String {
    format!("{value:.1}")
}
