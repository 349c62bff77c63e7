// src/session.rs - Per-run dispatch log with CSV export and JSON summary
use anyhow::{Context, Result};
use chrono::Local;
use csv::Writer;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fs::File;
use std::path::{Path, PathBuf};
use tracing::info;
use uuid::Uuid;

use crate::actions::Action;
use crate::controller::{Dispatch, ModeFlags};
use crate::engine::{FrameReport, PerformanceMetrics};

#[derive(Debug, Serialize)]
struct DispatchRecord<'a> {
    frame: u64,
    timestamp: f64,
    role: &'static str,
    action: &'static str,
    channel: Option<&'static str>,
    success: bool,
    error: Option<&'a str>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SessionSummary {
    pub session: String,
    pub started_at: String,
    pub frames: u64,
    pub frames_with_hands: u64,
    pub skipped_hands: u64,
    pub dispatches: usize,
    pub failures: usize,
    pub per_action: BTreeMap<&'static str, usize>,
    pub final_flags: ModeFlags,
    pub metrics: PerformanceMetrics,
}

pub struct SessionLog {
    output_dir: PathBuf,
    session_name: String,
    started_at: String,
    frames: u64,
    frames_with_hands: u64,
    skipped_hands: u64,
    dispatches: Vec<(u64, Dispatch)>,
}

impl SessionLog {
    pub fn new(output_dir: impl AsRef<Path>, session_name: Option<String>) -> Self {
        let now = Local::now();
        let session_name = session_name.unwrap_or_else(|| {
            let suffix = Uuid::new_v4().simple().to_string();
            format!("session_{}_{}", now.format("%Y%m%d_%H%M%S"), &suffix[..8])
        });

        Self {
            output_dir: output_dir.as_ref().to_path_buf(),
            session_name,
            started_at: now.to_rfc3339(),
            frames: 0,
            frames_with_hands: 0,
            skipped_hands: 0,
            dispatches: Vec::new(),
        }
    }

    pub fn session_name(&self) -> &str {
        &self.session_name
    }

    pub fn session_dir(&self) -> PathBuf {
        self.output_dir.join(&self.session_name)
    }

    pub fn record(&mut self, report: &FrameReport) {
        self.frames += 1;
        if report.launcher.is_some() || report.controller.is_some() {
            self.frames_with_hands += 1;
        }
        self.skipped_hands += report.skipped_hands as u64;
        self.dispatches.extend(
            report
                .dispatched
                .iter()
                .cloned()
                .map(|dispatch| (report.frame, dispatch)),
        );
    }

    pub fn dispatch_count(&self) -> usize {
        self.dispatches.len()
    }

    pub fn export_csv(&self) -> Result<PathBuf> {
        let csv_path = self.session_dir().join("dispatch_log.csv");
        create_parent(&csv_path)?;

        let file = File::create(&csv_path)
            .with_context(|| format!("Failed to create {}", csv_path.display()))?;
        let mut writer = Writer::from_writer(file);

        for (frame, dispatch) in &self.dispatches {
            writer.serialize(DispatchRecord {
                frame: *frame,
                timestamp: dispatch.timestamp,
                role: dispatch.role.as_str(),
                action: dispatch.action.as_str(),
                channel: dispatch.action.channel().map(|c| c.as_str()),
                success: dispatch.succeeded(),
                error: dispatch.error.as_deref(),
            })?;
        }

        writer.flush()?;
        Ok(csv_path)
    }

    pub fn summary(&self, final_flags: ModeFlags, metrics: &PerformanceMetrics) -> SessionSummary {
        let mut per_action: BTreeMap<&'static str, usize> =
            Action::ALL.iter().map(|a| (a.as_str(), 0)).collect();
        for (_, dispatch) in &self.dispatches {
            *per_action.entry(dispatch.action.as_str()).or_default() += 1;
        }

        SessionSummary {
            session: self.session_name.clone(),
            started_at: self.started_at.clone(),
            frames: self.frames,
            frames_with_hands: self.frames_with_hands,
            skipped_hands: self.skipped_hands,
            dispatches: self.dispatches.len(),
            failures: self.dispatches.iter().filter(|(_, d)| !d.succeeded()).count(),
            per_action,
            final_flags,
            metrics: metrics.clone(),
        }
    }

    pub fn write_summary(&self, final_flags: ModeFlags, metrics: &PerformanceMetrics) -> Result<PathBuf> {
        let summary_path = self.session_dir().join("summary.json");
        create_parent(&summary_path)?;

        let json = serde_json::to_string_pretty(&self.summary(final_flags, metrics))?;
        std::fs::write(&summary_path, json)
            .with_context(|| format!("Failed to write {}", summary_path.display()))?;
        Ok(summary_path)
    }

    /// Writes both artifacts and returns the session directory.
    pub fn export(&self, final_flags: ModeFlags, metrics: &PerformanceMetrics) -> Result<PathBuf> {
        let csv_path = self.export_csv()?;
        let summary_path = self.write_summary(final_flags, metrics)?;
        info!(
            "Session {} exported: {} and {}",
            self.session_name,
            csv_path.display(),
            summary_path.display()
        );
        Ok(self.session_dir())
    }
}

fn create_parent(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    Ok(())
}
