use std::error::Error;

pub fn now_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis() as u64
}

/// "just now" under 30 seconds, then coarse units.
pub fn format_age(age_ms: u64) -> String {
    let secs = age_ms / 1000;
    if secs < 30 {
        "just now".to_string()
    } else if secs < 60 {
        format!("{secs}s ago")
    } else if secs < 3600 {
        format!("{}m ago", secs / 60)
    } else {
        format!("{}h ago", secs / 3600)
    }
}

pub fn runtime() -> Result<tokio::runtime::Runtime, Box<dyn Error>> {
    Ok(tokio::runtime::Runtime::new()?)
}

/// `#RRGGBB` -> (r, g, b).
pub fn parse_hex_color(hex: &str) -> Option<(u8, u8, u8)> {
    let hex = hex.strip_prefix('#')?;
    if hex.len() != 6 {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some((r, g, b))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn age_formatting_buckets() {
        assert_eq!(format_age(5_000), "just now");
        assert_eq!(format_age(45_000), "45s ago");
        assert_eq!(format_age(3 * 60 * 1000), "3m ago");
        assert_eq!(format_age(2 * 3600 * 1000), "2h ago");
    }

    #[test]
    fn hex_colors_parse() {
        assert_eq!(parse_hex_color("#10B981"), Some((0x10, 0xB9, 0x81)));
        assert_eq!(parse_hex_color("#FFFFFF"), Some((255, 255, 255)));
        assert_eq!(parse_hex_color("10B981"), None);
        assert_eq!(parse_hex_color("#XYZ"), None);
    }
}
