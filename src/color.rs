use std::collections::BTreeMap;

use eframe::egui::Color32;
use palette::{Hsl, IntoColor, Srgb};

// ---------------------------------------------------------------------------
// Color palette generator
// ---------------------------------------------------------------------------

/// Generates `n` visually distinct colours using evenly spaced hues.
pub fn generate_palette(n: usize) -> Vec<Color32> {
    if n == 0 {
        return Vec::new();
    }
    (0..n)
        .map(|i| {
            let hue = (i as f32 / n as f32) * 360.0;
            let hsl = Hsl::new(hue, 0.65, 0.45);
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
// Provider colours: provenance label → Color32
// ---------------------------------------------------------------------------

/// Assigns each provenance label a distinct colour for the table and legend.
#[derive(Debug, Clone)]
pub struct ProviderPalette {
    mapping: BTreeMap<String, Color32>,
    /// Labels in first-seen order, for the legend.
    order: Vec<String>,
    default_color: Color32,
}

impl ProviderPalette {
    pub fn new(providers: &[String]) -> Self {
        let mapping = providers
            .iter()
            .cloned()
            .zip(generate_palette(providers.len()))
            .collect();

        ProviderPalette {
            mapping,
            order: providers.to_vec(),
            default_color: Color32::GRAY,
        }
    }

    pub fn color_for(&self, provider: &str) -> Color32 {
        self.mapping
            .get(provider)
            .copied()
            .unwrap_or(self.default_color)
    }

    /// Legend entries (label → colour) in first-seen order.
    pub fn legend_entries(&self) -> Vec<(String, Color32)> {
        self.order
            .iter()
            .map(|p| (p.clone(), self.color_for(p)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn providers_get_distinct_colours() {
        let palette = ProviderPalette::new(&["BSNL".into(), "Airtel".into(), "VI".into()]);
        let entries = palette.legend_entries();
        assert_eq!(entries.len(), 3);
        assert_eq!(entries[0].0, "BSNL");
        assert_ne!(entries[0].1, entries[1].1);
        assert_ne!(entries[1].1, entries[2].1);
        assert_eq!(palette.color_for("Jio"), Color32::GRAY);
    }

    #[test]
    fn empty_palette() {
        assert!(generate_palette(0).is_empty());
        assert!(ProviderPalette::new(&[]).legend_entries().is_empty());
    }
}
