/// Formats an optional f64 to 4 decimal places, or returns "—" if None or non-finite.
pub fn fmt_opt(v: Option<f64>) -> String {
    match v {
        Some(x) if x.is_finite() => format!("{x:.4}"),
        _ => "—".to_owned(),
    }
}

/// Formats a float with thousands separators and two decimals, e.g. `12,345.60`.
pub fn fmt_amount(v: f64) -> String {
    if !v.is_finite() {
        return "—".to_owned();
    }
    let formatted = format!("{:.2}", v.abs());
    let (int_part, frac_part) = formatted.split_once('.').unwrap_or((formatted.as_str(), "00"));

    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(ch);
    }

    // Sign follows the rounded digits, so -0.004 prints as 0.00
    let rounds_to_zero = !formatted.bytes().any(|b| matches!(b, b'1'..=b'9'));
    let sign = if v < 0.0 && !rounds_to_zero { "-" } else { "" };
    format!("{sign}{grouped}.{frac_part}")
}

pub fn fmt_bytes(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut unit = 0;
    while size >= 1024.0 && unit < UNITS.len() - 1 {
        size /= 1024.0;
        unit += 1;
    }
    if unit == 0 {
        format!("{bytes} B")
    } else {
        format!("{size:.1} {}", UNITS.get(unit).copied().unwrap_or("GB"))
    }
}
