//! Presentation formatters shared by dashboard views.

/// Format `value` as Brazilian real, e.g. `1234.5` → `R$ 1.234,50`.
///
/// Non-finite input formats as zero.
#[must_use]
pub fn format_currency(value: f64) -> String {
    let value = if value.is_finite() { value } else { 0.0 };
    let cents = (value.abs() * 100.0).round();
    let units = (cents / 100.0).trunc();
    let fraction = (cents - units * 100.0).clamp(0.0, 99.0) as u8;

    let digits = format!("{units:.0}");
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(digit);
    }

    let sign = if value < 0.0 && cents > 0.0 { "-" } else { "" };
    format!("{sign}R$ {grouped},{fraction:02}")
}
