/// Round `value` to `precision` decimal places
pub fn round_to(value: f64, precision: u32) -> f64 {
    let factor = 10f64.powi(precision as i32);
    let rounded = (value * factor).round() / factor;
    // normalise -0.0 so it never renders as "-0"
    if rounded == 0.0 {
        0.0
    } else {
        rounded
    }
}

/// Render a number with at most `precision` decimals and no trailing zeros
pub fn format_number(value: f64, precision: u32) -> String {
    format!("{}", round_to(value, precision))
}

/// Parse the leading numeric token of a free-text answer ("12.5 m/s" -> 12.5)
pub fn parse_leading_number(text: &str) -> Option<f64> {
    let token = text.split_whitespace().next()?;
    let end = token
        .char_indices()
        .take_while(|&(i, c)| {
            c.is_ascii_digit() || c == '.' || c == 'e' || c == 'E' || ((c == '-' || c == '+') && i == 0)
        })
        .last()
        .map(|(i, c)| i + c.len_utf8())?;
    token[..end].parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Relative comparison used to grade free-response answers
pub fn within_tolerance(given: f64, expected: f64, relative: f64) -> bool {
    if expected == 0.0 {
        return given.abs() <= relative;
    }
    ((given - expected) / expected).abs() <= relative
}

pub fn mean(data: &[f64]) -> Option<f64> {
    let sum = data.iter().sum::<f64>();
    let count = data.len();

    match count {
        positive if positive > 0 => Some(sum / count as f64),
        _ => None,
    }
}
