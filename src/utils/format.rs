const UNITS: [&str; 5] = ["B", "KB", "MB", "GB", "TB"];

/// Human readable size using 1024 steps, `-` for zero.
pub fn format_bytes(bytes: u64) -> String {
    if bytes == 0 {
        return "-".to_string();
    }

    let mut value = bytes as f64;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }

    if unit == 0 {
        format!("{} {}", bytes, UNITS[0])
    } else {
        format!("{:.1} {}", value, UNITS[unit])
    }
}

/// Parameter count embedded in a model tag, e.g. `llama3:70b` -> `70B`.
///
/// Looks for the first run of digits (with an optional decimal point)
/// directly followed by `m`, `b` or `t`.
pub fn params_from_model_name(name: &str) -> Option<String> {
    let chars: Vec<char> = name.chars().collect();

    for (idx, ch) in chars.iter().enumerate().skip(1) {
        let unit = ch.to_ascii_uppercase();
        if !matches!(unit, 'M' | 'B' | 'T') {
            continue;
        }

        let start = chars[..idx]
            .iter()
            .rposition(|c| !(c.is_ascii_digit() || *c == '.'))
            .map(|p| p + 1)
            .unwrap_or(0);
        if start == idx {
            continue;
        }

        let digits: String = chars[start..idx].iter().collect();
        if let Ok(value) = digits.parse::<f64>() {
            return Some(format!("{}{}", trim_decimal(value), unit));
        }
    }
    None
}

fn trim_decimal(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bytes_in_human_units() {
        assert_eq!(format_bytes(0), "-");
        assert_eq!(format_bytes(512), "512 B");
        assert_eq!(format_bytes(274 * 1024 * 1024), "274.0 MB");
        assert_eq!(format_bytes(2_040_000_000), "1.9 GB");
    }

    #[test]
    fn model_params() {
        assert_eq!(params_from_model_name("llama3:70b").as_deref(), Some("70B"));
        assert_eq!(params_from_model_name("qwen2:1.5b").as_deref(), Some("1.5B"));
        assert_eq!(params_from_model_name("model-32m").as_deref(), Some("32M"));
        assert_eq!(params_from_model_name("granite4:micro-h"), None);
        assert_eq!(params_from_model_name("no-params"), None);
    }
}
