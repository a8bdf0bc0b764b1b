//! Synthetic cohort generator.
//!
//! Draws labelled appointments from a [`CohortConfig`] using a seeded
//! ChaCha20 stream. The draw order per record is fixed (hcp_type, appt_mode,
//! age, hour, day_of_week, lead_time, label), so a given seed always yields
//! the same dataset.

use rand::Rng;
use rand::SeedableRng;
use rand_chacha::ChaCha20Rng;

use crate::domain::{
    AppointmentRecord, CategoryRate, ClippedExponential, ClippedNormal, CohortConfig,
    CohortConfigError, LabelledAppointment,
};

/// Seeded generator of labelled appointments.
///
/// Single-threaded: records are drawn sequentially from one random stream.
pub struct CohortGenerator {
    config: CohortConfig,
    rng: ChaCha20Rng,
}

impl CohortGenerator {
    /// Create a generator after validating `config`.
    ///
    /// # Errors
    /// Returns the first invalid cohort parameter.
    pub fn new(config: CohortConfig, seed: u64) -> Result<Self, CohortConfigError> {
        config.validate()?;
        Ok(Self {
            config,
            rng: ChaCha20Rng::seed_from_u64(seed),
        })
    }

    #[must_use]
    pub fn config(&self) -> &CohortConfig {
        &self.config
    }

    /// Collect the next `n` records.
    pub fn generate(&mut self, n: usize) -> Vec<LabelledAppointment> {
        self.by_ref().take(n).collect()
    }

    fn next_labelled(&mut self) -> LabelledAppointment {
        let Self { config, rng } = self;

        let hcp = &config.hcp_types[draw_category(rng, &config.hcp_types)];
        let mode = &config.appt_modes[draw_category(rng, &config.appt_modes)];
        let age = draw_normal(rng, &config.age);
        let hour = rng.gen_range(config.hour.min..=config.hour.max);
        let day_of_week = rng.gen_range(config.day_of_week.min..=config.day_of_week.max);
        let lead_time = draw_exponential(rng, &config.lead_time);

        let record = AppointmentRecord {
            hcp_type: hcp.name.clone(),
            appt_mode: mode.name.clone(),
            age,
            hour,
            day_of_week,
            lead_time,
        };

        let p = config
            .label_model
            .dna_probability(hcp.base_rate, mode.base_rate, &record);
        let dna = u8::from(rng.gen::<f64>() < p);

        LabelledAppointment { record, dna }
    }
}

/// Categorical draw by cumulative weight; index into `categories`.
fn draw_category(rng: &mut ChaCha20Rng, categories: &[CategoryRate]) -> usize {
    let u: f64 = rng.gen();
    let mut acc = 0.0;
    for (i, c) in categories.iter().enumerate() {
        acc += c.weight;
        if u < acc {
            return i;
        }
    }
    // Weights summing to slightly under 1 leave a sliver; it goes to the last
    // category that can be drawn at all.
    categories
        .iter()
        .rposition(|c| c.weight > 0.0)
        .unwrap_or(categories.len() - 1)
}

/// Box-Muller transform; consumes two uniforms per sample.
fn draw_normal(rng: &mut ChaCha20Rng, dist: &ClippedNormal) -> i32 {
    let u1 = 1.0 - rng.gen::<f64>(); // (0, 1]
    let u2: f64 = rng.gen();
    let z = (-2.0 * u1.ln()).sqrt() * (std::f64::consts::TAU * u2).cos();
    let x = dist.mean + dist.std_dev * z;
    x.clamp(f64::from(dist.min), f64::from(dist.max)).trunc() as i32
}

/// Inverse-CDF exponential draw.
fn draw_exponential(rng: &mut ChaCha20Rng, dist: &ClippedExponential) -> i32 {
    let u = 1.0 - rng.gen::<f64>(); // (0, 1]
    let x = -dist.mean * u.ln();
    x.clamp(0.0, f64::from(dist.max)).trunc() as i32
}

impl Iterator for CohortGenerator {
    type Item = LabelledAppointment;

    fn next(&mut self) -> Option<Self::Item> {
        Some(self.next_labelled())
    }
}
