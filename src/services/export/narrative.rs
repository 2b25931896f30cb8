use crate::schemas::DashboardData;

/// `1234567.891` -> `"$1,234,567.89"`.
pub fn format_currency(symbol: &str, value: f64) -> String {
    let sign = if value < 0.0 { "-" } else { "" };
    let cents = (value.abs() * 100.0).round() as u64;
    format!(
        "{sign}{symbol}{}.{:02}",
        group_thousands(cents / 100),
        cents % 100
    )
}

pub fn format_count(value: i64) -> String {
    let sign = if value < 0 { "-" } else { "" };
    format!("{sign}{}", group_thousands(value.unsigned_abs()))
}

pub fn format_change(value: f64) -> String {
    format!("{value:+.1}%")
}

fn group_thousands(value: u64) -> String {
    let digits = value.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (index, digit) in digits.chars().enumerate() {
        if index > 0 && (digits.len() - index) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(digit);
    }
    grouped
}

/// Share of each visitor slice, in percent with one decimal. Both zero when
/// there are no visitors at all.
pub fn visitor_split(data: &DashboardData) -> Vec<(String, f64)> {
    let total: i64 = data.visitor_data.iter().map(|slice| slice.visitors).sum();
    data.visitor_data
        .iter()
        .map(|slice| {
            let share = if total > 0 {
                (slice.visitors as f64 / total as f64 * 1000.0).round() / 10.0
            } else {
                0.0
            };
            (slice.name.clone(), share)
        })
        .collect()
}

/// Closing paragraph restating the headline numbers.
pub fn summary_paragraph(data: &DashboardData, currency_symbol: &str) -> String {
    let range = &data.date_range;
    let split = visitor_split(data)
        .into_iter()
        .map(|(name, share)| format!("{} reservations {share:.1}%", name.to_lowercase()))
        .collect::<Vec<_>>()
        .join(" and ");

    format!(
        "Between {} and {} the venue recorded {} bookings ({} against {} to {}) \
         and {} in revenue ({}). {} distinct guests stayed or held events ({}). \
         {} rooms and {} venue spaces remained available. \
         Visitors split into {}, a {} trend overall.",
        range.start_date,
        range.end_date,
        format_count(data.total_bookings),
        format_change(data.total_bookings_change),
        range.previous_start_date,
        range.previous_end_date,
        format_currency(currency_symbol, data.total_revenue),
        format_change(data.total_revenue_change),
        format_count(data.total_guests),
        format_change(data.total_guests_change),
        format_count(data.available_rooms),
        format_count(data.available_spaces),
        split,
        format_change(data.visitor_trending),
    )
}

/// Greedy word wrap on character count.
pub fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    for word in text.split_whitespace() {
        if !current.is_empty() && current.chars().count() + 1 + word.chars().count() > max_chars {
            lines.push(std::mem::take(&mut current));
        }
        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(word);
    }
    if !current.is_empty() {
        lines.push(current);
    }
    lines
}
