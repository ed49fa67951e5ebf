use crate::{AnalysisError, Confidence};

#[allow(async_fn_in_trait)]
pub trait VisionRepository {
    async fn analyze_gif(
        &self,
        file_name: &str,
        content: &[u8],
    ) -> Result<VisionAnalysis, AnalysisError>;
}

/// Description of a GIF produced by a vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VisionAnalysis {
    pub exercise_name: String,
    pub muscle_group: String,
    pub equipment: Vec<String>,
    pub confidence: Confidence,
    pub description: String,
}
