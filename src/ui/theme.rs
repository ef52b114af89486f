use ratatui::style::Color;
use crate::app::Config;

pub fn parse_color(hex: &str) -> Color {
    if hex.starts_with('#') && hex.len() == 7 {
        if let (Ok(r), Ok(g), Ok(b)) = (
            u8::from_str_radix(&hex[1..3], 16),
            u8::from_str_radix(&hex[3..5], 16),
            u8::from_str_radix(&hex[5..7], 16),
        ) {
            return Color::Rgb(r, g, b);
        }
    }
    Color::White
}

/// Theme helper that provides colors from the config
pub struct Theme {
    pub background: Color,
    pub foreground: Color,
    pub accent: Color,
    pub ollama: Color,
    pub warning: Color,
    pub error: Color,
    pub success: Color,
    pub muted: Color,
}

impl Theme {
    pub fn from_config(config: &Config) -> Self {
        let dark_theme = &config.theme.dark;

        Self {
            background: parse_color(&dark_theme.background),
            foreground: parse_color(&dark_theme.foreground),
            accent: parse_color(&dark_theme.accent_color),
            ollama: parse_color(&dark_theme.ollama_color),
            warning: parse_color(&dark_theme.warning_color),
            error: parse_color(&dark_theme.error_color),
            success: parse_color(&dark_theme.success_color),
            muted: parse_color(&dark_theme.muted_color),
        }
    }

    /// Green for a healthy flag, red otherwise.
    pub fn flag(&self, ok: bool) -> Color {
        if ok {
            self.success
        } else {
            self.error
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hex_colors() {
        assert_eq!(parse_color("#1e1e2e"), Color::Rgb(0x1e, 0x1e, 0x2e));
        assert_eq!(parse_color("1e1e2e"), Color::White);
        assert_eq!(parse_color("#zzzzzz"), Color::White);
    }
}
