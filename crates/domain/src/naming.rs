use crate::{
    Confidence, MatchPolicy, Similarity, matcher::strip_file_extension, normalize_exercise_name,
    similarity,
};

/// Name shown for an uploaded file: the stem without image extension and with
/// separators replaced by spaces. The original casing is kept.
#[must_use]
pub fn extract_name_from_file(file_name: &str) -> String {
    let stem = strip_file_extension(file_name).unwrap_or(file_name);
    stem.replace(['_', '-'], " ")
}

/// File name under which the GIF of an exercise is stored, e.g.
/// `Supino Reto` becomes `supino-reto.gif`.
#[must_use]
pub fn generate_file_name(exercise_name: &str) -> String {
    let slug = normalize_exercise_name(exercise_name)
        .chars()
        .filter_map(|c| match c {
            ' ' => Some('-'),
            'a'..='z' | '0'..='9' => Some(c),
            _ => None,
        })
        .collect::<String>();
    let slug = slug
        .split('-')
        .filter(|part| !part.is_empty())
        .collect::<Vec<_>>()
        .join("-");

    if slug.is_empty() {
        "exercise.gif".to_string()
    } else {
        format!("{slug}.gif")
    }
}

#[derive(strum::Display, Debug, Clone, Copy, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum ComparisonStatus {
    Correct,
    Incorrect,
    Uncertain,
}

/// Agreement between the name of an uploaded file and the exercise name
/// suggested by a vision model.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NameComparison {
    pub is_match: bool,
    pub similarity: Similarity,
    pub suggested_name: String,
    pub status: ComparisonStatus,
}

#[must_use]
pub fn compare_exercise_names(
    file_name: &str,
    suggested_name: &str,
    suggested_confidence: Confidence,
    policy: &MatchPolicy,
) -> NameComparison {
    let similarity = similarity(&extract_name_from_file(file_name), suggested_name);
    let status = match Confidence::from_similarity(similarity, policy) {
        Confidence::High => ComparisonStatus::Correct,
        Confidence::Low if suggested_confidence == Confidence::High => ComparisonStatus::Incorrect,
        Confidence::Medium | Confidence::Low => ComparisonStatus::Uncertain,
    };

    NameComparison {
        is_match: status == ComparisonStatus::Correct,
        similarity,
        suggested_name: generate_file_name(suggested_name),
        status,
    }
}
