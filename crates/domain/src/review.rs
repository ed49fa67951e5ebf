//! Review of uploaded GIFs before they are attached to catalog exercises.
//!
//! Each GIF moves through
//! `pending → analyzing → analyzed → (approved | error) → uploading → uploaded`.
//! Matching by file name is instantaneous and skips `analyzing`. A GIF whose
//! file name matches with high confidence is approved automatically.

use log::debug;

use crate::{
    Confidence, ExerciseID, ExerciseRecord, MatchCandidate, MatchPolicy, NameComparison,
    VisionAnalysis, compare_exercise_names, extract_name_from_file, find_best_match,
    generate_file_name,
};

#[derive(strum::Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Status {
    Pending,
    Analyzing,
    Analyzed,
    Approved,
    Uploading,
    Uploaded,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileNameAnalysis {
    pub extracted_name: String,
    pub best_match: MatchCandidate,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub exercise_id: ExerciseID,
    pub exercise_name: String,
}

impl Selection {
    fn from_match(candidate: &MatchCandidate) -> Option<Self> {
        candidate.exercise_id.map(|exercise_id| Self {
            exercise_id,
            exercise_name: candidate.matched_name.clone(),
        })
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum TransitionError {
    #[error("cannot {action} a GIF that is {status}")]
    Invalid {
        status: Status,
        action: &'static str,
    },
    #[error("no exercise selected")]
    NoSelection,
    #[error("unknown exercise {0}")]
    UnknownExercise(ExerciseID),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GifItem {
    original_name: String,
    content: Vec<u8>,
    status: Status,
    file_name_analysis: Option<FileNameAnalysis>,
    vision_analysis: Option<VisionAnalysis>,
    comparison: Option<NameComparison>,
    selection: Option<Selection>,
    final_name: Option<String>,
    error: Option<String>,
    approved_before_analysis: bool,
}

impl GifItem {
    #[must_use]
    pub fn new(original_name: String, content: Vec<u8>) -> Self {
        Self {
            original_name,
            content,
            status: Status::Pending,
            file_name_analysis: None,
            vision_analysis: None,
            comparison: None,
            selection: None,
            final_name: None,
            error: None,
            approved_before_analysis: false,
        }
    }

    #[must_use]
    pub fn original_name(&self) -> &str {
        &self.original_name
    }

    #[must_use]
    pub fn content(&self) -> &[u8] {
        &self.content
    }

    #[must_use]
    pub fn status(&self) -> Status {
        self.status
    }

    #[must_use]
    pub fn file_name_analysis(&self) -> Option<&FileNameAnalysis> {
        self.file_name_analysis.as_ref()
    }

    #[must_use]
    pub fn vision_analysis(&self) -> Option<&VisionAnalysis> {
        self.vision_analysis.as_ref()
    }

    #[must_use]
    pub fn comparison(&self) -> Option<&NameComparison> {
        self.comparison.as_ref()
    }

    #[must_use]
    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    #[must_use]
    pub fn final_name(&self) -> Option<&str> {
        self.final_name.as_deref()
    }

    #[must_use]
    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Name under which the GIF is stored.
    #[must_use]
    pub fn upload_name(&self) -> &str {
        self.final_name.as_deref().unwrap_or(&self.original_name)
    }

    /// Confidence of the most recent analysis, preferring the vision model's.
    #[must_use]
    pub fn confidence(&self) -> Option<Confidence> {
        self.vision_analysis
            .as_ref()
            .map(|a| a.confidence)
            .or_else(|| {
                self.file_name_analysis
                    .as_ref()
                    .map(|a| a.best_match.confidence)
            })
    }

    fn ensure(&self, allowed: &[Status], action: &'static str) -> Result<(), TransitionError> {
        if allowed.contains(&self.status) {
            Ok(())
        } else {
            Err(TransitionError::Invalid {
                status: self.status,
                action,
            })
        }
    }

    pub fn analyze_by_file_name(
        &mut self,
        exercises: &[ExerciseRecord],
        policy: &MatchPolicy,
    ) -> Result<Confidence, TransitionError> {
        self.ensure(
            &[
                Status::Pending,
                Status::Analyzed,
                Status::Approved,
                Status::Error,
            ],
            "analyze",
        )?;

        let extracted_name = extract_name_from_file(&self.original_name);
        let best_match = find_best_match(&extracted_name, None, exercises, policy);
        let confidence = best_match.confidence;

        self.selection = Selection::from_match(&best_match);
        self.status = if confidence == Confidence::High && self.selection.is_some() {
            Status::Approved
        } else {
            Status::Analyzed
        };
        self.file_name_analysis = Some(FileNameAnalysis {
            extracted_name,
            best_match,
        });
        self.error = None;

        Ok(confidence)
    }

    pub fn start_vision_analysis(&mut self) -> Result<(), TransitionError> {
        self.ensure(
            &[
                Status::Pending,
                Status::Analyzed,
                Status::Approved,
                Status::Error,
            ],
            "analyze",
        )?;
        self.approved_before_analysis = self.status == Status::Approved;
        self.status = Status::Analyzing;
        self.error = None;
        Ok(())
    }

    pub fn apply_vision_analysis(
        &mut self,
        analysis: VisionAnalysis,
        exercises: &[ExerciseRecord],
        policy: &MatchPolicy,
    ) -> Result<(), TransitionError> {
        self.ensure(&[Status::Analyzing], "complete the analysis of")?;

        let best_match = find_best_match(
            &analysis.exercise_name,
            Some(&analysis.muscle_group),
            exercises,
            policy,
        );

        self.comparison = Some(compare_exercise_names(
            &self.original_name,
            &analysis.exercise_name,
            analysis.confidence,
            policy,
        ));
        self.selection = Selection::from_match(&best_match);
        self.final_name = Some(generate_file_name(&analysis.exercise_name));
        self.vision_analysis = Some(analysis);
        self.status = if self.approved_before_analysis && self.selection.is_some() {
            Status::Approved
        } else {
            Status::Analyzed
        };
        self.approved_before_analysis = false;

        Ok(())
    }

    pub fn select_exercise(
        &mut self,
        exercise_id: ExerciseID,
        exercises: &[ExerciseRecord],
    ) -> Result<(), TransitionError> {
        self.ensure(
            &[
                Status::Pending,
                Status::Analyzed,
                Status::Approved,
                Status::Error,
            ],
            "select an exercise for",
        )?;

        let exercise = exercises
            .iter()
            .find(|e| e.id == exercise_id)
            .ok_or(TransitionError::UnknownExercise(exercise_id))?;

        self.selection = Some(Selection {
            exercise_id,
            exercise_name: exercise.name.to_string(),
        });

        Ok(())
    }

    pub fn approve(&mut self, approved: bool) -> Result<(), TransitionError> {
        if approved {
            self.ensure(&[Status::Analyzed, Status::Approved], "approve")?;
            if self.selection.is_none() {
                return Err(TransitionError::NoSelection);
            }
            self.status = Status::Approved;
        } else {
            self.ensure(&[Status::Analyzed, Status::Approved], "reject")?;
            self.status = Status::Analyzed;
        }
        Ok(())
    }

    pub fn start_upload(&mut self) -> Result<(), TransitionError> {
        self.ensure(&[Status::Approved], "upload")?;
        if self.selection.is_none() {
            return Err(TransitionError::NoSelection);
        }
        self.status = Status::Uploading;
        Ok(())
    }

    pub fn finish_upload(&mut self) -> Result<(), TransitionError> {
        self.ensure(&[Status::Uploading], "finish the upload of")?;
        self.status = Status::Uploaded;
        Ok(())
    }

    pub fn fail(&mut self, message: impl Into<String>) -> Result<(), TransitionError> {
        if self.status == Status::Uploaded {
            return Err(TransitionError::Invalid {
                status: self.status,
                action: "fail",
            });
        }
        self.status = Status::Error;
        self.error = Some(message.into());
        Ok(())
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct AddResult {
    pub added: usize,
    pub rejected: usize,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ReviewStats {
    pub total: usize,
    pub analyzed: usize,
    pub approved: usize,
    pub uploaded: usize,
    pub errors: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ReviewQueue {
    items: Vec<GifItem>,
}

impl ReviewQueue {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds the files with a `.gif` extension and rejects all others.
    pub fn add_files(&mut self, files: impl IntoIterator<Item = (String, Vec<u8>)>) -> AddResult {
        let mut result = AddResult::default();

        for (name, content) in files {
            let is_gif = name
                .rsplit_once('.')
                .is_some_and(|(_, extension)| extension.eq_ignore_ascii_case("gif"));
            if is_gif {
                self.items.push(GifItem::new(name, content));
                result.added += 1;
            } else {
                result.rejected += 1;
            }
        }

        result
    }

    pub fn remove(&mut self, index: usize) -> Option<GifItem> {
        (index < self.items.len()).then(|| self.items.remove(index))
    }

    #[must_use]
    pub fn items(&self) -> &[GifItem] {
        &self.items
    }

    pub fn get_mut(&mut self, index: usize) -> Option<&mut GifItem> {
        self.items.get_mut(index)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Matches every GIF that is not in flight or uploaded by its file name.
    pub fn analyze_by_file_name(
        &mut self,
        exercises: &[ExerciseRecord],
        policy: &MatchPolicy,
    ) -> ReviewStats {
        for item in &mut self.items {
            if let Err(err) = item.analyze_by_file_name(exercises, policy) {
                debug!("skipping {}: {err}", item.original_name());
            }
        }
        self.stats()
    }

    #[must_use]
    pub fn stats(&self) -> ReviewStats {
        let mut stats = ReviewStats {
            total: self.items.len(),
            ..ReviewStats::default()
        };

        for item in &self.items {
            match item.status {
                Status::Analyzed => stats.analyzed += 1,
                Status::Approved => stats.approved += 1,
                Status::Uploaded => stats.uploaded += 1,
                Status::Error => stats.errors += 1,
                Status::Pending | Status::Analyzing | Status::Uploading => {}
            }
            match item.confidence() {
                Some(Confidence::High) => stats.high += 1,
                Some(Confidence::Medium) => stats.medium += 1,
                Some(Confidence::Low) => stats.low += 1,
                None => {}
            }
        }

        stats
    }

    /// Indices of the approved GIFs that have a selected exercise.
    #[must_use]
    pub fn approved(&self) -> Vec<usize> {
        self.items
            .iter()
            .enumerate()
            .filter(|(_, item)| item.status == Status::Approved && item.selection.is_some())
            .map(|(index, _)| index)
            .collect()
    }
}
