use std::{
    fs, io,
    path::{Path, PathBuf},
};

use gifmatch_domain::{AnalysisError, Confidence, VisionAnalysis, VisionRepository};
use serde::Deserialize;

/// Vision analyses produced ahead of time and stored as one JSON report per
/// GIF, named like the GIF with a `.json` extension.
pub struct VisionReports {
    dir: PathBuf,
}

impl VisionReports {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    fn report_path(&self, file_name: &str) -> PathBuf {
        let stem = Path::new(file_name)
            .file_stem()
            .map_or_else(|| file_name.into(), ToOwned::to_owned);
        self.dir.join(stem).with_extension("json")
    }
}

impl VisionRepository for VisionReports {
    async fn analyze_gif(
        &self,
        file_name: &str,
        _content: &[u8],
    ) -> Result<VisionAnalysis, AnalysisError> {
        let path = self.report_path(file_name);
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                return Err(AnalysisError::Failed(format!(
                    "no report for {file_name} in {}",
                    self.dir.display()
                )));
            }
            Err(err) => return Err(AnalysisError::Other(Box::new(err))),
        };
        let report: Report = serde_json::from_str(&content)
            .map_err(|err| AnalysisError::Failed(format!("malformed report: {err}")))?;
        Ok(report.into())
    }
}

#[derive(Deserialize)]
struct Report {
    exercise_name: String,
    #[serde(default)]
    muscle_group: String,
    #[serde(default)]
    equipment: Vec<String>,
    confidence: ReportConfidence,
    #[serde(default)]
    description: String,
}

#[derive(Deserialize, Clone, Copy)]
#[serde(rename_all = "lowercase")]
enum ReportConfidence {
    High,
    Medium,
    Low,
}

impl From<Report> for VisionAnalysis {
    fn from(value: Report) -> Self {
        VisionAnalysis {
            exercise_name: value.exercise_name,
            muscle_group: value.muscle_group,
            equipment: value.equipment,
            confidence: match value.confidence {
                ReportConfidence::High => Confidence::High,
                ReportConfidence::Medium => Confidence::Medium,
                ReportConfidence::Low => Confidence::Low,
            },
            description: value.description,
        }
    }
}
