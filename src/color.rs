//! Random hex colors used to tag mapping entries.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};
use tracing::warn;

/// Which band of saturation/lightness a random color is drawn from.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Luminosity {
    Any,
    Bright,
    #[default]
    Dark,
    Pastel,
}

impl Luminosity {
    /// Inclusive (saturation, lightness) percentage ranges.
    fn bands(self) -> ((u32, u32), (u32, u32)) {
        match self {
            Luminosity::Bright => ((70, 100), (45, 65)),
            Luminosity::Dark => ((50, 90), (20, 40)),
            Luminosity::Pastel => ((40, 70), (70, 85)),
            Luminosity::Any => ((40, 100), (30, 80)),
        }
    }
}

/// Draws a `#rrggbb` color with a random hue in the requested luminosity band.
pub fn random_hex_color<R: Rng + ?Sized>(rng: &mut R, luminosity: Luminosity) -> String {
    let ((s_lo, s_hi), (l_lo, l_hi)) = luminosity.bands();

    let h = rng.random_range(0..=359);
    let s = rng.random_range(s_lo..=s_hi);
    let l = rng.random_range(l_lo..=l_hi);

    hsl_to_hex(h, s, l)
}

/// Hue in degrees, saturation and lightness in percent.
pub fn hsl_to_hex(h: u32, s: u32, l: u32) -> String {
    let h = h as f64;
    let s = s as f64 / 100.0;
    let l = l as f64 / 100.0;

    let a = s * l.min(1.0 - l);
    let channel = |n: f64| {
        let k = (n + h / 30.0) % 12.0;
        let v = l - a * (k - 3.0).min(9.0 - k).clamp(-1.0, 1.0);
        (v * 255.0).round() as u8
    };

    format!("#{:02x}{:02x}{:02x}", channel(0.0), channel(8.0), channel(4.0))
}

/// Picks a color not yet in `taken`, retrying up to `attempts` times.
///
/// Returns `None` when every attempt collided.
pub fn unique_color<R: Rng + ?Sized>(
    rng: &mut R,
    luminosity: Luminosity,
    attempts: usize,
    taken: impl Fn(&str) -> bool,
) -> Option<String> {
    (0..attempts)
        .map(|_| random_hex_color(rng, luminosity))
        .find(|color| !taken(color))
}

/// Hands out entry colors from an owned, injectable random source.
#[derive(Debug, Clone)]
pub struct ColorPicker<R = StdRng> {
    rng: R,
    luminosity: Luminosity,
    attempts: usize,
}

impl ColorPicker<StdRng> {
    /// Seeded pickers repeat the same sequence of colors; unseeded ones draw from the OS.
    pub fn from_seed(seed: Option<u64>, luminosity: Luminosity, attempts: usize) -> Self {
        let rng = match seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        Self::new(rng, luminosity, attempts)
    }
}

impl<R: Rng> ColorPicker<R> {
    pub fn new(rng: R, luminosity: Luminosity, attempts: usize) -> Self {
        Self {
            rng,
            luminosity,
            attempts: attempts.max(1),
        }
    }

    /// A color for which `taken` is false, or the last draw if every attempt collided.
    pub fn pick(&mut self, taken: impl Fn(&str) -> bool) -> String {
        if let Some(color) = unique_color(&mut self.rng, self.luminosity, self.attempts, &taken) {
            return color;
        }

        let color = random_hex_color(&mut self.rng, self.luminosity);
        warn!(
            attempts = self.attempts,
            %color,
            "no unused color found, reusing a taken one"
        );
        color
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn converts_primary_hues() {
        assert_eq!(hsl_to_hex(0, 100, 50), "#ff0000");
        assert_eq!(hsl_to_hex(120, 100, 50), "#00ff00");
        assert_eq!(hsl_to_hex(240, 100, 50), "#0000ff");
        assert_eq!(hsl_to_hex(0, 0, 100), "#ffffff");
        assert_eq!(hsl_to_hex(0, 0, 0), "#000000");
    }

    #[test]
    fn same_seed_same_colors() {
        let mut a = StdRng::seed_from_u64(7);
        let mut b = StdRng::seed_from_u64(7);

        for _ in 0..16 {
            assert_eq!(
                random_hex_color(&mut a, Luminosity::Dark),
                random_hex_color(&mut b, Luminosity::Dark)
            );
        }
    }

    #[test]
    fn dark_colors_stay_dark() {
        let mut rng = StdRng::seed_from_u64(99);
        for _ in 0..64 {
            let color = random_hex_color(&mut rng, Luminosity::Dark);
            assert_eq!(color.len(), 7);
            let max = (1..7)
                .step_by(2)
                .map(|i| u8::from_str_radix(&color[i..i + 2], 16).unwrap())
                .max()
                .unwrap();
            // lightness 40% at 90% saturation peaks at 0.76 * 255
            assert!(max <= 195, "{color} is too bright");
        }
    }

    #[test]
    fn unique_color_gives_up_after_attempts() {
        let mut rng = StdRng::seed_from_u64(1);
        assert_eq!(unique_color(&mut rng, Luminosity::Any, 8, |_| true), None);

        let picked = unique_color(&mut rng, Luminosity::Any, 8, |_| false);
        assert!(picked.is_some());
    }
}
