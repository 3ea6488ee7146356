use std::path::PathBuf;

use anyhow::{Context, Result};
use lsrm_spe::{SpeOptions, Spectrum, SpectrumInformation, save_file};

const CHANNELS: usize = 4096;
/// keV per channel
const GAIN: f64 = 0.75;

fn gaussian(x: f64, mu: f64, sigma: f64, amplitude: f64) -> f64 {
    amplitude * (-(x - mu).powi(2) / (2.0 * sigma.powi(2))).exp()
}

/// Expected counts: falling Compton continuum plus photopeaks.
fn expected_counts(energy: f64, peaks: &[(f64, f64, f64)]) -> f64 {
    let background = 800.0 * (-energy / 350.0).exp() + 15.0;
    let signal: f64 = peaks
        .iter()
        .map(|&(mu, sigma, amp)| gaussian(energy, mu, sigma, amp))
        .sum();
    background + signal
}

/// Deterministic counting noise: splitmix64 uniforms feeding a Poisson
/// sampler, so the sample file is identical on every run.
struct CountNoise(u64);

impl CountNoise {
    fn uniform(&mut self) -> f64 {
        self.0 = self.0.wrapping_add(0x9E37_79B9_7F4A_7C15);
        let mut z = self.0;
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        z ^= z >> 31;
        (z >> 11) as f64 / (1u64 << 53) as f64
    }

    /// Poisson draw: exact (Knuth) for small means, normal approximation above.
    fn counts(&mut self, mean: f64) -> i32 {
        if mean < 30.0 {
            let limit = (-mean).exp();
            let mut k = 0;
            let mut p = self.uniform();
            while p > limit {
                k += 1;
                p *= self.uniform();
            }
            return k;
        }
        let u1 = self.uniform().max(f64::MIN_POSITIVE);
        let u2 = self.uniform();
        let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
        (mean + mean.sqrt() * z).round().max(0.0) as i32
    }
}

fn main() -> Result<()> {
    env_logger::init();

    let output_path = std::env::args_os()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("sample.spe"));

    let mut noise = CountNoise(42);

    // (energy keV, sigma keV, height) – Am-241, Cs-137, K-40
    let peaks = [(59.5, 0.9, 4000.0), (661.7, 1.4, 2500.0), (1460.8, 2.0, 600.0)];

    let data: Vec<i32> = (0..CHANNELS)
        .map(|ch| {
            let energy = ch as f64 * GAIN;
            noise.counts(expected_counts(energy, &peaks))
        })
        .collect();

    let mut info = SpectrumInformation::default();
    info.apply_line("SHIFR", Some("Проба-42"));
    info.apply_line("TLIVE", Some("3580.25"));
    info.apply_line("TREAL", Some("3600"));
    info.apply_line("GEOMETRY", Some("Маринелли 1 л"));
    info.apply_line("DISTANCE", Some("0"));
    info.apply_line("MEASBEGIN", Some("2024-03-15 09:30:00"));
    info.apply_line("CALIBRATED", None);
    let spectrum = Spectrum::new(data, info);

    save_file(&spectrum, &output_path, &SpeOptions::default())
        .with_context(|| format!("writing {}", output_path.display()))?;

    println!(
        "Wrote {} channels to {}",
        spectrum.len(),
        output_path.display()
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn noise_is_deterministic_and_non_negative() {
        let draw = |seed| {
            let mut noise = CountNoise(seed);
            (0..200).map(|i| noise.counts(i as f64 * 0.5)).collect::<Vec<_>>()
        };
        let first = draw(7);
        assert_eq!(first, draw(7));
        assert!(first.iter().all(|&c| c >= 0));
        assert_eq!(CountNoise(1).counts(0.0), 0);
    }
}
