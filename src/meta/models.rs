use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Processing status of a job. Values mirror the strings stored in the
/// metadata store and shown to polling clients.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum JobStatus {
    #[serde(rename = "Uploaded")]
    Uploaded,
    #[serde(rename = "Processing Started")]
    ProcessingStarted,
    #[serde(rename = "Image Resized")]
    ImageResized,
    #[serde(rename = "Creating Collage")]
    CreatingCollage,
    #[serde(rename = "Processing Done")]
    Done,
    #[serde(rename = "Failed")]
    Failed,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Uploaded => "Uploaded",
            JobStatus::ProcessingStarted => "Processing Started",
            JobStatus::ImageResized => "Image Resized",
            JobStatus::CreatingCollage => "Creating Collage",
            JobStatus::Done => "Processing Done",
            JobStatus::Failed => "Failed",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Done | JobStatus::Failed)
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Uploaded" => Ok(JobStatus::Uploaded),
            "Processing Started" => Ok(JobStatus::ProcessingStarted),
            "Image Resized" => Ok(JobStatus::ImageResized),
            "Creating Collage" => Ok(JobStatus::CreatingCollage),
            "Processing Done" => Ok(JobStatus::Done),
            "Failed" => Ok(JobStatus::Failed),
            other => Err(format!("Unknown job status: {other}")),
        }
    }
}

/// Effective processing options for a job. Stored on the record at creation
/// and overridable per field when processing is triggered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobOptions {
    pub resize_width: u32,
    pub resize_height: u32,
    pub collage_rows: u32,
    pub collage_cols: u32,
    pub output_width: u32,
    pub output_height: u32,
}

impl Default for JobOptions {
    fn default() -> Self {
        JobOptions {
            resize_width: 200,
            resize_height: 200,
            collage_rows: 6,
            collage_cols: 6,
            output_width: 1000,
            output_height: 1000,
        }
    }
}

impl JobOptions {
    /// Apply a per-field override set on top of these options.
    pub fn merged(&self, overrides: &JobOptionsPatch) -> JobOptions {
        JobOptions {
            resize_width: overrides.resize_width.unwrap_or(self.resize_width),
            resize_height: overrides.resize_height.unwrap_or(self.resize_height),
            collage_rows: overrides.collage_rows.unwrap_or(self.collage_rows),
            collage_cols: overrides.collage_cols.unwrap_or(self.collage_cols),
            output_width: overrides.output_width.unwrap_or(self.output_width),
            output_height: overrides.output_height.unwrap_or(self.output_height),
        }
    }

    pub fn tile_count(&self) -> u32 {
        self.collage_rows * self.collage_cols
    }
}

/// Per-field option overrides; a None leaves the stored value in place.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct JobOptionsPatch {
    pub resize_width: Option<u32>,
    pub resize_height: Option<u32>,
    pub collage_rows: Option<u32>,
    pub collage_cols: Option<u32>,
    pub output_width: Option<u32>,
    pub output_height: Option<u32>,
}

/// One upload-to-collage processing unit, the central entity of the system.
///
/// Artifact keys are assigned shortly after creation and never change. A
/// retrieval URL is either empty (not yet generated) or a previously valid
/// signed reference; staleness is tolerated and handled by regeneration on
/// read, not by invalidation tracking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Job {
    pub id: Uuid,
    pub owner: String,
    pub raw_key: String,
    pub resized_key: String,
    pub collage_key: String,
    pub uploaded_at: DateTime<Utc>,
    pub options: JobOptions,
    pub natural_width: Option<u32>,
    pub natural_height: Option<u32>,
    pub raw_size_bytes: Option<i64>,
    pub is_public: bool,
    pub status: JobStatus,
    pub progress: u8,
    pub raw_url: String,
    pub resized_url: String,
    pub collage_url: String,
}

impl Job {
    /// Create a fresh job record at upload start: no artifacts yet,
    /// status Uploaded, progress zero.
    pub fn new(owner: &str, options: JobOptions) -> Self {
        Job {
            id: Uuid::new_v4(),
            owner: owner.to_string(),
            raw_key: String::new(),
            resized_key: String::new(),
            collage_key: String::new(),
            uploaded_at: Utc::now(),
            options,
            natural_width: None,
            natural_height: None,
            raw_size_bytes: None,
            is_public: true,
            status: JobStatus::Uploaded,
            progress: 0,
            raw_url: String::new(),
            resized_url: String::new(),
            collage_url: String::new(),
        }
    }
}

/// Partial update applied to a stored job; only the set fields change.
/// Updates are last-write-wins, with no compare-and-swap.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct JobPatch {
    pub status: Option<JobStatus>,
    pub progress: Option<u8>,
    pub raw_key: Option<String>,
    pub resized_key: Option<String>,
    pub collage_key: Option<String>,
    pub natural_width: Option<u32>,
    pub natural_height: Option<u32>,
    pub raw_size_bytes: Option<i64>,
    pub raw_url: Option<String>,
    pub resized_url: Option<String>,
    pub collage_url: Option<String>,
}

impl JobPatch {
    pub fn is_empty(&self) -> bool {
        *self == JobPatch::default()
    }

    /// Return a copy of `job` with this patch applied.
    pub fn apply(&self, job: &Job) -> Job {
        let mut next = job.clone();
        if let Some(status) = self.status {
            next.status = status;
        }
        if let Some(progress) = self.progress {
            next.progress = progress;
        }
        if let Some(raw_key) = &self.raw_key {
            next.raw_key = raw_key.clone();
        }
        if let Some(resized_key) = &self.resized_key {
            next.resized_key = resized_key.clone();
        }
        if let Some(collage_key) = &self.collage_key {
            next.collage_key = collage_key.clone();
        }
        if let Some(width) = self.natural_width {
            next.natural_width = Some(width);
        }
        if let Some(height) = self.natural_height {
            next.natural_height = Some(height);
        }
        if let Some(size) = self.raw_size_bytes {
            next.raw_size_bytes = Some(size);
        }
        if let Some(url) = &self.raw_url {
            next.raw_url = url.clone();
        }
        if let Some(url) = &self.resized_url {
            next.resized_url = url.clone();
        }
        if let Some(url) = &self.collage_url {
            next.collage_url = url.clone();
        }
        next
    }
}
