use log::{debug, error, info, warn};

use crate::{
    AnalysisError, AssetRepository, ExerciseID, ExerciseRecord, ExerciseRepository, MatchPolicy,
    Pacing, Pause, ReadError, ReviewQueue, UpdateError, UploadError, VisionAnalysis,
    VisionRepository,
};

pub struct Service<R> {
    repository: R,
}

impl<R> Service<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    pub fn repository(&self) -> &R {
        &self.repository
    }
}

macro_rules! log_on_error {
    ($func: expr, $error: ident, $action: literal, $entity: literal) => {{
        let result = $func.await;
        match result {
            Ok(_) => {}
            Err(ref err) => match err {
                $error::Storage(crate::StorageError::NoConnection) => {
                    debug!("failed to {} {}: {err}", $action, $entity);
                }
                _ => {
                    error!("failed to {} {}: {err}", $action, $entity);
                }
            },
        }
        result
    }};
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AnalysisSummary {
    pub analyzed: usize,
    pub failed: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct UploadSummary {
    pub uploaded: usize,
    pub failed: usize,
}

impl<R: ExerciseRepository> Service<R> {
    pub async fn get_exercises(&self) -> Result<Vec<ExerciseRecord>, ReadError> {
        log_on_error!(
            self.repository.read_exercises(),
            ReadError,
            "get",
            "exercises"
        )
    }
}

impl<R: VisionRepository + Pause> Service<R> {
    /// Analyzes the GIFs of the queue one after another.
    ///
    /// GIFs that are in flight or already uploaded are skipped.
    pub async fn analyze_with_vision(
        &self,
        queue: &mut ReviewQueue,
        exercises: &[ExerciseRecord],
        policy: &MatchPolicy,
        pacing: &Pacing,
    ) -> AnalysisSummary {
        let mut summary = AnalysisSummary::default();
        let count = queue.len();

        for index in 0..count {
            let Some(item) = queue.get_mut(index) else {
                continue;
            };

            if let Err(err) = item.start_vision_analysis() {
                debug!("skipping {}: {err}", item.original_name());
                continue;
            }

            let result = self
                .analyze_gif(item.original_name(), item.content(), pacing)
                .await;

            match result {
                Ok(analysis) => {
                    debug!(
                        "{} shows {} ({})",
                        item.original_name(),
                        analysis.exercise_name,
                        analysis.confidence
                    );
                    match item.apply_vision_analysis(analysis, exercises, policy) {
                        Ok(()) => summary.analyzed += 1,
                        Err(err) => {
                            error!("failed to apply analysis of {}: {err}", item.original_name());
                            summary.failed += 1;
                        }
                    }
                }
                Err(err) => {
                    let message = match err {
                        AnalysisError::RateLimited => {
                            "rate limit exceeded, wait a few minutes and try again".to_string()
                        }
                        err => err.to_string(),
                    };
                    if let Err(err) = item.fail(message) {
                        error!("failed to mark {} as failed: {err}", item.original_name());
                    }
                    summary.failed += 1;
                }
            }

            if index + 1 < count {
                debug!(
                    "waiting {}s before next analysis",
                    pacing.request_delay.as_secs()
                );
                self.repository.pause(pacing.request_delay).await;
            }
        }

        info!(
            "{} analyses completed, {} failed",
            summary.analyzed, summary.failed
        );

        summary
    }

    async fn analyze_gif(
        &self,
        file_name: &str,
        content: &[u8],
        pacing: &Pacing,
    ) -> Result<VisionAnalysis, AnalysisError> {
        let max_attempts = pacing.max_attempts.max(1);
        let mut attempt = 1;

        loop {
            let result = log_on_error!(
                self.repository.analyze_gif(file_name, content),
                AnalysisError,
                "analyze",
                "GIF"
            );

            match result {
                Ok(analysis) => return Ok(analysis),
                Err(err) if attempt >= max_attempts => return Err(err),
                Err(AnalysisError::RateLimited) => {
                    warn!(
                        "rate limit reached, waiting {}s",
                        pacing.rate_limit_delay.as_secs()
                    );
                    self.repository.pause(pacing.rate_limit_delay).await;
                }
                Err(_) => {
                    self.repository.pause(pacing.retry_delay).await;
                }
            }

            attempt += 1;
        }
    }
}

impl<R: AssetRepository + ExerciseRepository> Service<R> {
    /// Stores every approved GIF and links it to the selected exercise.
    pub async fn upload_approved(
        &self,
        queue: &mut ReviewQueue,
    ) -> Result<UploadSummary, UploadError> {
        let approved = queue.approved();

        if approved.is_empty() {
            return Err(UploadError::NothingApproved);
        }

        let mut summary = UploadSummary::default();

        for index in approved {
            let Some(item) = queue.get_mut(index) else {
                continue;
            };
            let Some(exercise_id) = item.selection().map(|s| s.exercise_id) else {
                continue;
            };

            if let Err(err) = item.start_upload() {
                error!("failed to upload {}: {err}", item.original_name());
                summary.failed += 1;
                continue;
            }

            let name = item.upload_name().to_string();

            let result = self.store_gif(&name, item.content(), exercise_id).await;

            match result {
                Ok(url) => {
                    info!("uploaded {name} to {url}");
                    if let Err(err) = item.finish_upload() {
                        error!("failed to finish upload of {name}: {err}");
                    }
                    summary.uploaded += 1;
                }
                Err(err) => {
                    if let Err(err) = item.fail(err.to_string()) {
                        error!("failed to mark {name} as failed: {err}");
                    }
                    summary.failed += 1;
                }
            }
        }

        info!(
            "{} GIFs uploaded, {} failed",
            summary.uploaded, summary.failed
        );

        Ok(summary)
    }

    async fn store_gif(
        &self,
        name: &str,
        content: &[u8],
        exercise_id: ExerciseID,
    ) -> Result<String, UpdateError> {
        let url = log_on_error!(
            self.repository.store_asset(name, content),
            UpdateError,
            "store",
            "GIF"
        )?;
        log_on_error!(
            self.repository.update_gif_url(exercise_id, url.clone()),
            UpdateError,
            "update",
            "exercise"
        )?;
        Ok(url)
    }
}
