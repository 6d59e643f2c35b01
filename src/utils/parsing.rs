use std::sync::OnceLock;

use regex::Regex;

fn number_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\d+").expect("valid number regex"))
}

fn range_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(\d+)\s*[-–]\s*(\d+)").expect("valid range regex"))
}

/// Mean of every integer in a budget string such as "₹1,000 - ₹1,500".
/// Strings without digits parse to 0.
pub fn parse_budget(budget: &str) -> f64 {
    let cleaned = budget.replace(',', "");
    let numbers: Vec<f64> = number_re()
        .find_iter(&cleaned)
        .filter_map(|m| m.as_str().parse::<f64>().ok())
        .collect();

    if numbers.is_empty() {
        return 0.0;
    }
    numbers.iter().sum::<f64>() / numbers.len() as f64
}

/// Experience bounds in years. "2-3 years" gives [2, 3], "6 months" gives
/// [0.5, 0.5] and "to" reads as a range separator.
pub fn parse_experience_level(level: &str) -> [f64; 2] {
    if level.trim().is_empty() {
        return [0.0, 0.0];
    }
    let level = level.to_lowercase().replace("to", "-");
    let in_months = level.contains("month");
    let scale = |v: f64| if in_months { v / 12.0 } else { v };

    if let Some(caps) = range_re().captures(&level) {
        let start = caps[1].parse::<f64>().unwrap_or(0.0);
        let end = caps[2].parse::<f64>().unwrap_or(0.0);
        return [scale(start), scale(end)];
    }

    if let Some(m) = number_re().find(&level) {
        let value = m.as_str().parse::<f64>().unwrap_or(0.0);
        return [scale(value), scale(value)];
    }

    [0.0, 0.0]
}
