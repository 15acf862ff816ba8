// src/report/producers.rs

//! Built-in results producers.

use std::io::Write;

use tracing::{info, warn};

use crate::errors::Result;
use crate::job::JobHandle;
use crate::report::{JobReport, ResultsProducer};

/// Plain-text summary: one line per job, then totals.
#[derive(Debug, Default)]
pub struct SummaryProducer {
    reports: Vec<JobReport>,
}

impl SummaryProducer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn reports(&self) -> &[JobReport] {
        &self.reports
    }
}

impl ResultsProducer for SummaryProducer {
    fn populate(&mut self, jobs: &[JobHandle]) -> Result<()> {
        self.reports = jobs.iter().map(JobReport::from_handle).collect();
        self.reports.sort_by(|a, b| a.id.cmp(&b.id));
        Ok(())
    }

    fn output(&self, out: &mut dyn Write) -> Result<()> {
        let mut failed = 0usize;

        for report in &self.reports {
            match report.failure_reason() {
                None => writeln!(out, "PASS {} ({})", report.id, report.job_type)?,
                Some(reason) => {
                    failed += 1;
                    writeln!(out, "FAIL {reason}")?;
                }
            }
        }

        writeln!(
            out,
            "{} passed, {} failed, {} total",
            self.reports.len() - failed,
            failed,
            self.reports.len()
        )?;
        Ok(())
    }
}

/// Emits one structured log event per job instead of writing text.
#[derive(Debug, Default)]
pub struct LogProducer {
    reports: Vec<JobReport>,
}

impl LogProducer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl ResultsProducer for LogProducer {
    fn populate(&mut self, jobs: &[JobHandle]) -> Result<()> {
        self.reports = jobs.iter().map(JobReport::from_handle).collect();
        Ok(())
    }

    fn output(&self, _out: &mut dyn Write) -> Result<()> {
        for report in &self.reports {
            match &report.error {
                None if report.passed => info!(
                    job = %report.id,
                    job_type = %report.job_type,
                    "job passed"
                ),
                _ => warn!(
                    job = %report.id,
                    job_type = %report.job_type,
                    completed = report.completed,
                    error = report.error.as_deref().unwrap_or(""),
                    "job did not pass"
                ),
            }
        }
        Ok(())
    }
}
