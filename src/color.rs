use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

use crate::style::LineStyleParams;

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// This is the dashboard's `get_palette`: callers always receive at least as
/// many colours as requested series.
pub fn get_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.75, 0.55);
            let rgb: Srgb = hsl.into_color();
            Color32::from_rgb(
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            )
        })
        .collect()
}

// ---------------------------------------------------------------------------
// Style color resolution
// ---------------------------------------------------------------------------

/// Parse a style color: `"#rrggbb"` hex or a handful of common names.
pub fn parse_color(s: &str) -> Option<Color32> {
    if s.starts_with('#') {
        return Color32::from_hex(s).ok();
    }
    let named = match s.to_ascii_lowercase().as_str() {
        "black" => Color32::BLACK,
        "white" => Color32::WHITE,
        "red" => Color32::RED,
        "green" => Color32::GREEN,
        "blue" => Color32::BLUE,
        "orange" => Color32::from_rgb(0xff, 0xa5, 0x00),
        "yellow" => Color32::YELLOW,
        "purple" => Color32::from_rgb(0x80, 0x00, 0x80),
        "brown" => Color32::from_rgb(0xa5, 0x2a, 0x2a),
        "gray" | "grey" => Color32::GRAY,
        "cyan" => Color32::from_rgb(0x00, 0xbf, 0xbf),
        "magenta" => Color32::from_rgb(0xbf, 0x00, 0xbf),
        _ => return None,
    };
    Some(named)
}

/// Colour for the i-th series of a panel: an explicit style color when the
/// resolved params carry one, otherwise the palette entry for that slot.
pub fn series_color(params: &LineStyleParams, palette: &[Color32], i: usize) -> Color32 {
    params
        .color
        .as_deref()
        .and_then(parse_color)
        .or_else(|| palette.get(i).copied())
        .unwrap_or(Color32::LIGHT_BLUE)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn palette_has_requested_length_and_distinct_colors() {
        let colors = get_palette(12);
        assert_eq!(colors.len(), 12);
        for (i, a) in colors.iter().enumerate() {
            for b in &colors[i + 1..] {
                assert_ne!(a, b);
            }
        }
        assert!(get_palette(0).is_empty());
    }

    #[test]
    fn color_parsing() {
        assert_eq!(parse_color("blue"), Some(Color32::BLUE));
        assert_eq!(parse_color("#ff8800"), Some(Color32::from_rgb(0xff, 0x88, 0x00)));
        assert_eq!(parse_color("not-a-color"), None);
    }

    #[test]
    fn explicit_color_wins_over_palette() {
        let palette = get_palette(3);
        let plain = LineStyleParams::default();
        assert_eq!(series_color(&plain, &palette, 1), palette[1]);

        let styled = LineStyleParams {
            color: Some("blue".into()),
            ..Default::default()
        };
        assert_eq!(series_color(&styled, &palette, 1), Color32::BLUE);
    }
}
