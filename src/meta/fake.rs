use crate::meta::error::MetadataError;
use crate::meta::models::{Job, JobPatch, JobStatus};
use crate::meta::store::MetadataStore;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, RwLock};
use uuid::Uuid;

/// A fake in-memory implementation of the MetadataStore trait for testing.
///
/// Beyond plain storage, it records every patch applied to every job and
/// counts calls per method, so tests can assert on the exact sequence of
/// persisted checkpoints and on whether the store was consulted at all.
#[derive(Default)]
pub struct FakeMetadataStore {
    jobs: Arc<RwLock<HashMap<Uuid, Job>>>,
    history: Arc<RwLock<Vec<(Uuid, JobPatch)>>>,
    list_calls: Arc<RwLock<usize>>,
    update_calls: Arc<RwLock<usize>>,
}

#[allow(dead_code)]
impl FakeMetadataStore {
    /// Create a new empty FakeMetadataStore
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a job directly, bypassing call accounting
    pub fn fake_add_job(&self, job: Job) {
        self.jobs.write().unwrap().insert(job.id, job);
    }

    /// Current stored state of a job
    pub fn fake_job(&self, id: Uuid) -> Option<Job> {
        self.jobs.read().unwrap().get(&id).cloned()
    }

    pub fn fake_job_count(&self) -> usize {
        self.jobs.read().unwrap().len()
    }

    /// Jobs for an owner, bypassing call accounting
    pub fn fake_jobs_for_owner(&self, owner: &str) -> Vec<Job> {
        self.jobs
            .read()
            .unwrap()
            .values()
            .filter(|job| job.owner == owner)
            .cloned()
            .collect()
    }

    /// Every patch applied to the given job, in order
    pub fn fake_patch_history(&self, id: Uuid) -> Vec<JobPatch> {
        self.history
            .read()
            .unwrap()
            .iter()
            .filter(|(job_id, _)| *job_id == id)
            .map(|(_, patch)| patch.clone())
            .collect()
    }

    /// The persisted (status, progress) checkpoint sequence for a job,
    /// skipping patches that touched neither field
    pub fn fake_checkpoints(&self, id: Uuid) -> Vec<(JobStatus, u8)> {
        let mut checkpoints = Vec::new();
        let mut status = JobStatus::Uploaded;
        let mut progress = 0u8;
        for patch in self.fake_patch_history(id) {
            if patch.status.is_none() && patch.progress.is_none() {
                continue;
            }
            if let Some(next) = patch.status {
                status = next;
            }
            if let Some(next) = patch.progress {
                progress = next;
            }
            checkpoints.push((status, progress));
        }
        checkpoints
    }

    pub fn fake_list_calls(&self) -> usize {
        *self.list_calls.read().unwrap()
    }

    pub fn fake_update_calls(&self) -> usize {
        *self.update_calls.read().unwrap()
    }
}

#[async_trait]
impl MetadataStore for FakeMetadataStore {
    async fn create_job(&self, job: &Job) -> Result<(), MetadataError> {
        self.jobs.write().unwrap().insert(job.id, job.clone());
        Ok(())
    }

    async fn get_job(&self, id: Uuid) -> Result<Job, MetadataError> {
        self.jobs
            .read()
            .unwrap()
            .get(&id)
            .cloned()
            .ok_or(MetadataError::JobNotFound(id))
    }

    async fn update_job(&self, id: Uuid, patch: JobPatch) -> Result<(), MetadataError> {
        *self.update_calls.write().unwrap() += 1;

        let mut jobs = self.jobs.write().unwrap();
        let job = jobs.get_mut(&id).ok_or(MetadataError::JobNotFound(id))?;
        *job = patch.apply(job);
        self.history.write().unwrap().push((id, patch));
        Ok(())
    }

    async fn list_by_owner(&self, owner: &str) -> Result<Vec<Job>, MetadataError> {
        *self.list_calls.write().unwrap() += 1;

        let jobs = self.jobs.read().unwrap();
        let mut matching: Vec<Job> = jobs
            .values()
            .filter(|job| job.owner == owner)
            .cloned()
            .collect();
        // Sort by upload time to match the SQL ordering
        matching.sort_by_key(|job| job.uploaded_at);
        Ok(matching)
    }
}
