//! # PSD Tables
//!
//! Power-spectral-density data products as they appear on disk: a plain
//! ASCII table of `frequency power` rows, one per line, optionally with
//! `#` comment lines. Line suppression blanks contaminated bins by forcing
//! their power to exactly `1.0` so downstream samplers ignore them.

use std::fs;
use std::path::Path;

use crate::error::{PipelineError, Result};

/// One frequency bin of a detector noise spectrum
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PsdRow {
    pub frequency: f64,
    pub power: f64,
}

/// Two-column ASCII PSD table
#[derive(Debug, Clone, PartialEq)]
pub struct PsdTable {
    rows: Vec<PsdRow>,
}

impl PsdTable {
    pub fn new(rows: Vec<PsdRow>) -> Self {
        Self { rows }
    }

    /// Parse a table from disk, skipping blank and `#` comment lines
    pub fn read(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path)?;
        let mut rows = Vec::new();
        for (index, line) in text.lines().enumerate() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let mut columns = line.split_whitespace();
            let frequency = columns.next().and_then(|c| c.parse::<f64>().ok());
            let power = columns.next().and_then(|c| c.parse::<f64>().ok());
            match (frequency, power) {
                (Some(frequency), Some(power)) => rows.push(PsdRow { frequency, power }),
                _ => {
                    return Err(PipelineError::PsdFormat {
                        path: path.display().to_string(),
                        reason: format!("line {} is not two numeric columns", index + 1),
                    })
                }
            }
        }
        Ok(Self { rows })
    }

    /// Write the table back in numeric text form
    pub fn write(&self, path: &Path) -> Result<()> {
        let mut text = String::with_capacity(self.rows.len() * 52);
        for row in &self.rows {
            text.push_str(&format!("{:.18e} {:.18e}\n", row.frequency, row.power));
        }
        fs::write(path, text)?;
        Ok(())
    }

    /// Force power to `1.0` for every bin with frequency in
    /// `[f_low, f_high]`, inclusive both ends; returns the bin count
    pub fn suppress(&mut self, f_low: f64, f_high: f64) -> usize {
        let mut suppressed = 0;
        for row in &mut self.rows {
            if row.frequency >= f_low && row.frequency <= f_high {
                row.power = 1.0;
                suppressed += 1;
            }
        }
        suppressed
    }

    pub fn rows(&self) -> &[PsdRow] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}
