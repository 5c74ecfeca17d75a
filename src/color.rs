use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
/// Dark mode gets slightly lighter tones so they stand out on the
/// dark background.
pub fn generate_palette(n: usize, dark_mode: bool) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    let lightness = if dark_mode { 0.62 } else { 0.50 };
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.70, lightness);
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
// Color mapping: chart label → Color32
// ---------------------------------------------------------------------------

/// Maps the labels (or series names) of one chart to distinct colours.
#[derive(Debug, Clone)]
pub struct ColorMap {
    mapping: BTreeMap<String, Color32>,
    default_color: Color32,
}

impl ColorMap {
    /// Colours are assigned in the order the labels are given, so the
    /// same chart always gets the same colours.
    pub fn new<S: AsRef<str>>(labels: &[S], dark_mode: bool) -> Self {
        let palette = generate_palette(labels.len(), dark_mode);
        let mapping = labels
            .iter()
            .zip(palette)
            .map(|(l, c)| (l.as_ref().to_string(), c))
            .collect();

        ColorMap {
            mapping,
            default_color: if dark_mode {
                Color32::LIGHT_BLUE
            } else {
                Color32::from_rgb(30, 136, 229)
            },
        }
    }

    /// Look up the colour for a label.
    pub fn color_for(&self, label: &str) -> Color32 {
        self.mapping
            .get(label)
            .copied()
            .unwrap_or(self.default_color)
    }

    pub fn default_color(&self) -> Color32 {
        self.default_color
    }
}
