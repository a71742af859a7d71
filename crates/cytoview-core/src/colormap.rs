//! Colors and color ramps for density rendering
//!
//! Density panels map values low→high onto a fixed ramp. The default
//! ramp runs blue → yellow → red; viridis and magma are available for
//! figures that need a perceptually uniform alternative.

use serde::{Deserialize, Serialize};

/// Name of the ramp used when a panel does not pick one
pub const DEFAULT_COLORMAP: &str = "density";

/// A color in RGBA format (0.0 to 1.0)
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Color {
    /// Create a new color
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create a color from RGB (alpha = 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b, a: 1.0 }
    }

    /// Parse `#RRGGBB` (the leading `#` is optional)
    pub fn from_hex(hex: &str) -> Option<Self> {
        let digits = hex.strip_prefix('#').unwrap_or(hex);
        if digits.len() != 6 || !digits.is_ascii() {
            return None;
        }
        let channel = |i: usize| {
            u8::from_str_radix(&digits[i..i + 2], 16)
                .ok()
                .map(|v| v as f32 / 255.0)
        };
        Some(Self::rgb(channel(0)?, channel(2)?, channel(4)?))
    }

    /// Same color with a different opacity
    pub fn with_alpha(mut self, alpha: f32) -> Self {
        self.a = alpha.clamp(0.0, 1.0);
        self
    }

    /// Blend from `a` (t = 0) to `b` (t = 1)
    pub fn lerp(a: &Color, b: &Color, t: f32) -> Color {
        let t = t.clamp(0.0, 1.0);
        let mix = |x: f32, y: f32| x + (y - x) * t;
        Color::new(mix(a.r, b.r), mix(a.g, b.g), mix(a.b, b.b), mix(a.a, b.a))
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::rgb(0.5, 0.5, 0.5)
    }
}

/// Named color ramp with evenly spaced stops
#[derive(Clone, Debug)]
pub struct Colormap {
    pub name: String,
    colors: Vec<Color>,
    flipped: bool,
}

impl Colormap {
    /// Build a ramp whose stops are spread evenly over [0, 1]
    pub fn from_colors(name: impl Into<String>, colors: Vec<Color>) -> Self {
        Self {
            name: name.into(),
            colors,
            flipped: false,
        }
    }

    /// Same ramp traversed high → low
    pub fn reversed(self) -> Self {
        Self {
            flipped: !self.flipped,
            ..self
        }
    }

    /// Color at position `t`; values outside [0, 1] are clamped
    pub fn sample(&self, t: f32) -> Color {
        let mut pos = t.clamp(0.0, 1.0);
        if self.flipped {
            pos = 1.0 - pos;
        }

        let segments = match self.colors.len() {
            0 => return Color::default(),
            1 => return self.colors[0],
            n => n - 1,
        };
        let scaled = pos * segments as f32;
        let lower = (scaled.floor() as usize).min(segments - 1);
        Color::lerp(
            &self.colors[lower],
            &self.colors[lower + 1],
            scaled - lower as f32,
        )
    }
}

fn ramp(name: &str, stops: &[&str]) -> Colormap {
    Colormap::from_colors(
        name,
        stops
            .iter()
            .map(|hex| Color::from_hex(hex).unwrap_or_default())
            .collect(),
    )
}

/// Blue → cyan → yellow → red ramp used for density maps
pub fn density() -> Colormap {
    ramp("density", &["#0000FF", "#0080FF", "#FFFF00", "#FF8000", "#FF0000"])
}

/// Perceptually uniform dark-blue → green → yellow ramp
pub fn viridis() -> Colormap {
    ramp("viridis", &["#440154", "#3B528B", "#21918C", "#5EC962", "#FDE725"])
}

/// Black → purple → orange → pale yellow ramp
pub fn magma() -> Colormap {
    ramp("magma", &["#000004", "#51127C", "#B73779", "#FC8961", "#FCFDBF"])
}

/// Names accepted by [`get_colormap`], without the `_r` suffix
pub fn builtin_colormap_names() -> &'static [&'static str] {
    &["density", "viridis", "magma"]
}

/// Get a built-in colormap by name; a `_r` suffix reverses it
pub fn get_colormap(name: &str) -> Option<Colormap> {
    let name = name.to_lowercase();
    let (base, reversed) = match name.strip_suffix("_r") {
        Some(base) => (base, true),
        None => (name.as_str(), false),
    };

    let cmap = match base {
        "density" => Some(density()),
        "viridis" => Some(viridis()),
        "magma" => Some(magma()),
        _ => None,
    }?;
    Some(if reversed { cmap.reversed() } else { cmap })
}

/// Default face colors for overlaid histograms, cycled by dataset
pub fn default_palette() -> Vec<String> {
    ["#1F77B4", "#FF7F0E", "#2CA02C", "#D62728", "#9467BD", "#8C564B"]
        .iter()
        .map(|hex| (*hex).to_owned())
        .collect()
}

/// Ramp name plus the value window mapped onto it
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ColormapConfig {
    pub name: String,
    /// Value drawn with the low end of the ramp
    pub min_value: f64,
    /// Value drawn with the high end of the ramp
    pub max_value: f64,
    /// Map through `ln` before normalizing
    pub log_scale: bool,
}

impl ColormapConfig {
    pub fn new(name: impl Into<String>, min_value: f64, max_value: f64) -> Self {
        Self {
            name: name.into(),
            min_value,
            max_value,
            log_scale: false,
        }
    }

    /// Map a value to a position on the ramp, clamped to [0, 1]
    pub fn normalize(&self, value: f64) -> f32 {
        let transform = |v: f64| {
            if self.log_scale && v > 0.0 {
                v.ln()
            } else {
                v
            }
        };
        let (value, min, max) = (
            transform(value),
            transform(self.min_value),
            transform(self.max_value),
        );

        if max <= min {
            return 0.5;
        }
        (((value - min) / (max - min)) as f32).clamp(0.0, 1.0)
    }

    /// Color for a value, falling back to the default ramp for unknown names
    pub fn color_for(&self, value: f64) -> Color {
        get_colormap(&self.name)
            .unwrap_or_else(density)
            .sample(self.normalize(value))
    }
}

impl Default for ColormapConfig {
    fn default() -> Self {
        Self::new(DEFAULT_COLORMAP, 0.0, 1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_color_from_hex() {
        let orange = Color::from_hex("FF8000").unwrap();
        assert_eq!(orange.r, 1.0);
        assert!((orange.g - 0.502).abs() < 0.01);
        assert_eq!(orange.b, 0.0);
        assert!(Color::from_hex("#FFF").is_none());
        assert!(Color::from_hex("zzzzzz").is_none());
    }

    #[test]
    fn test_density_ramp_endpoints() {
        let cmap = density();
        assert_eq!(cmap.sample(-1.0), Color::rgb(0.0, 0.0, 1.0));
        assert_eq!(cmap.sample(0.5), Color::rgb(1.0, 1.0, 0.0));
        assert_eq!(cmap.sample(1.0), Color::rgb(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_reversed_lookup() {
        let cmap = get_colormap("viridis_r").unwrap();
        let c = cmap.sample(1.0);
        let v0 = viridis().sample(0.0);
        assert!((c.r - v0.r).abs() < 1e-6);
        assert!(get_colormap("jet").is_none());
    }

    #[test]
    fn test_every_builtin_resolves() {
        for name in builtin_colormap_names() {
            assert!(get_colormap(name).is_some());
            assert!(get_colormap(&format!("{}_r", name.to_uppercase())).is_some());
        }
    }

    #[test]
    fn test_normalize_monotonic_and_clamped() {
        let config = ColormapConfig::new("density", 0.0, 100.0);
        assert_eq!(config.normalize(-5.0), 0.0);
        assert!((config.normalize(50.0) - 0.5).abs() < 1e-6);
        assert_eq!(config.normalize(500.0), 1.0);

        let mut last = -1.0;
        for v in 0..=100 {
            let t = config.normalize(v as f64);
            assert!(t >= last);
            last = t;
        }
    }

    #[test]
    fn test_log_normalize() {
        let config = ColormapConfig {
            log_scale: true,
            ..ColormapConfig::new("density", 1.0, 1000.0)
        };
        assert!((config.normalize(31.62) - 0.5).abs() < 0.01);
    }

    #[test]
    fn test_color_for_uses_named_ramp() {
        let config = ColormapConfig::new("density", 0.0, 1.0);
        assert_eq!(config.color_for(0.0), Color::rgb(0.0, 0.0, 1.0));
        assert_eq!(config.color_for(1.0), Color::rgb(1.0, 0.0, 0.0));
    }
}
