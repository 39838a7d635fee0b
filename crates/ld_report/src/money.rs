//! Prize value arithmetic. Values are display strings such as "5.000.000đ";
//! the amount is their digits. Integer only.

use ld_algo::PrizeSchedule;
use ld_core::PrizeTier;

/// Digits of a display value, e.g. `"5.000.000đ"` → `5000000`. `None` without digits.
pub fn prize_value_amount(value: &str) -> Option<u64> {
    let digits: String = value.chars().filter(char::is_ascii_digit).collect();
    digits.parse().ok()
}

/// Dot-grouped amount with the đồng sign: `1500000` → `"1.500.000đ"`.
pub fn format_vnd(amount: u64) -> String {
    let digits = amount.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3 + 3);
    for (i, ch) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push('.');
        }
        out.push(ch);
    }
    out.push('đ');
    out
}

/// Amount × nominal quantity.
pub fn tier_total(tier: &PrizeTier) -> Option<u64> {
    prize_value_amount(&tier.value).map(|a| a.saturating_mul(u64::from(tier.quantity)))
}

/// Sum of `tier_total` over tiers with a parsable value.
pub fn schedule_total(schedule: &PrizeSchedule) -> u64 {
    schedule
        .iter()
        .filter_map(tier_total)
        .fold(0u64, u64::saturating_add)
}
