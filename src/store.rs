use std::fs::{self, File, OpenOptions};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use serde_json::ser::PrettyFormatter;
use tracing::debug;
use uuid::Uuid;

use crate::config::RecordNaming;

/// One persisted plan: the planning prompt that produced it and the plan itself.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlanRecord {
    pub user_query: String,
    pub plan_data: Value,
}

/// Write-only directory of plan records, one JSON file per stored plan.
#[derive(Debug, Clone)]
pub struct PlanStore {
    dir: PathBuf,
    naming: RecordNaming,
}

impl PlanStore {
    pub fn open(dir: impl Into<PathBuf>, naming: RecordNaming) -> Result<Self> {
        let store = Self {
            dir: dir.into(),
            naming,
        };
        store.ensure_dir()?;
        Ok(store)
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn store(&self, user_query: &str, plan: &Value) -> Result<PathBuf> {
        let now = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .context("System clock is before the Unix epoch")?;
        self.store_at(user_query, plan, now.as_secs())
    }

    pub(crate) fn store_at(&self, user_query: &str, plan: &Value, unix_secs: u64) -> Result<PathBuf> {
        self.ensure_dir()?;

        let record = PlanRecord {
            user_query: user_query.to_string(),
            plan_data: plan.clone(),
        };

        let (path, file) = match self.naming {
            RecordNaming::Unique => {
                let path = self
                    .dir
                    .join(format!("{unix_secs}-{}.json", Uuid::now_v7().simple()));
                let file = OpenOptions::new()
                    .write(true)
                    .create_new(true)
                    .open(&path)
                    .with_context(|| format!("Failed to create plan record {}", path.display()))?;
                (path, file)
            }
            RecordNaming::Timestamp => {
                let path = self.dir.join(format!("{unix_secs}.json"));
                let file = File::create(&path)
                    .with_context(|| format!("Failed to create plan record {}", path.display()))?;
                (path, file)
            }
        };

        write_pretty(file, &record)
            .with_context(|| format!("Failed to write plan record {}", path.display()))?;

        debug!(path = %path.display(), "plan record written");
        Ok(path)
    }

    fn ensure_dir(&self) -> Result<()> {
        fs::create_dir_all(&self.dir)
            .with_context(|| format!("Unable to create plans directory {}", self.dir.display()))
    }
}

fn write_pretty(file: File, record: &PlanRecord) -> Result<()> {
    let mut writer = BufWriter::new(file);
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut writer, PrettyFormatter::with_indent(b"    "));
    record.serialize(&mut serializer)?;
    writer.flush()?;
    Ok(())
}
