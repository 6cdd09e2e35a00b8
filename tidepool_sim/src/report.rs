//! Per-generation reports and the JSON run summary.

use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::Write;
use tidepool_core::Population;

/// Totals at one reporting point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationReport {
    /// Generations completed when the counts were taken
    pub generation: u64,

    pub prey: u64,

    pub predators: u64,

    /// ASCII frame, present when display is enabled
    #[serde(skip_serializing_if = "Option::is_none")]
    pub frame: Option<String>,
}

impl GenerationReport {
    pub fn new(generation: u64, population: Population) -> Self {
        Self {
            generation,
            prey: population.prey,
            predators: population.predators,
            frame: None,
        }
    }

    /// Totals as a `Population`.
    pub fn population(&self) -> Population {
        Population::new(self.prey, self.predators)
    }
}

/// Complete run export.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RunSummary {
    pub width: usize,
    pub height: usize,
    pub generations: u64,
    pub procs: usize,
    pub threads: usize,
    pub report_interval: u64,

    /// Seed used
    pub seed: u64,

    /// Wall time of the generation loop
    pub elapsed_secs: f64,

    /// Envelopes sent between ranks
    pub messages_sent: u64,

    /// Reports in generation order
    pub reports: Vec<GenerationReport>,

    /// Totals after the last generation
    pub final_population: Population,
}

impl RunSummary {
    /// Writes to a JSON file.
    pub fn write_to_file(&self, path: &str) -> std::io::Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        let mut file = File::create(path)?;
        file.write_all(json.as_bytes())?;
        Ok(())
    }

    /// Reports with the timing and traffic fields left out, for comparing runs.
    pub fn trajectory(&self) -> Vec<(u64, Population)> {
        self.reports
            .iter()
            .map(|r| (r.generation, r.population()))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_frame_omitted_when_absent() {
        let report = GenerationReport::new(10, Population::new(3, 2));
        let json = serde_json::to_string(&report).unwrap();
        assert_eq!(json, r#"{"generation":10,"prey":3,"predators":2}"#);

        let with_frame = GenerationReport {
            frame: Some("f-\n".into()),
            ..report
        };
        let json = serde_json::to_string(&with_frame).unwrap();
        assert!(json.contains(r#""frame":"f-\n""#));
    }
}
