//! Matching of free-text exercise names against the exercise catalog.
//!
//! Candidate texts are file name stems or labels produced by a vision model.
//! Both sides are normalized before they are compared, so casing, diacritics,
//! separators and image file extensions do not influence the result.

use std::collections::BTreeSet;

use derive_more::{Deref, Display};
use unicode_normalization::{UnicodeNormalization, char::is_combining_mark};

use crate::{ExerciseID, ExerciseRecord};

const FILE_EXTENSIONS: [&str; 5] = ["gif", "png", "jpg", "jpeg", "webp"];

/// Lower-cases the text, strips diacritics, turns `_` and `-` into spaces,
/// collapses whitespace and removes trailing image file extensions.
///
/// Applying the function to its own output yields the same string.
#[must_use]
pub fn normalize_exercise_name(text: &str) -> String {
    let folded = text
        .to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .map(|c| if c == '_' || c == '-' { ' ' } else { c })
        .collect::<String>();
    let mut normalized = folded.split_whitespace().collect::<Vec<_>>().join(" ");

    while let Some(stem) = strip_file_extension(&normalized) {
        normalized = stem.trim_end().to_string();
    }

    normalized
}

pub(crate) fn strip_file_extension(name: &str) -> Option<&str> {
    let (stem, extension) = name.rsplit_once('.')?;
    FILE_EXTENSIONS
        .iter()
        .any(|e| e.eq_ignore_ascii_case(extension))
        .then_some(stem)
}

/// Similarity of two texts, compared after normalization.
#[must_use]
pub fn similarity(a: &str, b: &str) -> Similarity {
    normalized_similarity(&normalize_exercise_name(a), &normalize_exercise_name(b))
}

/// Only identical strings reach 100. Otherwise the better of the normalized
/// Levenshtein similarity and the Dice coefficient of the word sets is used.
fn normalized_similarity(a: &str, b: &str) -> Similarity {
    if a.is_empty() || b.is_empty() {
        return Similarity::NONE;
    }

    if a == b {
        return Similarity::EXACT;
    }

    let edit = strsim::normalized_levenshtein(a, b);
    let overlap = word_overlap(a, b);

    Similarity::from_ratio(edit.max(overlap)).min(Similarity::ALMOST_EXACT)
}

#[allow(clippy::cast_precision_loss)]
fn word_overlap(a: &str, b: &str) -> f64 {
    let a = a.split(' ').collect::<BTreeSet<_>>();
    let b = b.split(' ').collect::<BTreeSet<_>>();
    let common = a.intersection(&b).count();

    (2 * common) as f64 / (a.len() + b.len()) as f64
}

#[derive(
    Deref, Display, Debug, Default, Clone, Copy, Hash, PartialEq, Eq, PartialOrd, Ord,
)]
pub struct Similarity(u8);

impl Similarity {
    pub const NONE: Similarity = Similarity(0);
    pub const ALMOST_EXACT: Similarity = Similarity(99);
    pub const EXACT: Similarity = Similarity(100);

    pub fn new(value: u8) -> Result<Self, SimilarityError> {
        if value > 100 {
            return Err(SimilarityError::OutOfRange(value));
        }
        Ok(Self(value))
    }

    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    fn from_ratio(ratio: f64) -> Self {
        Self((ratio.clamp(0.0, 1.0) * 100.0).round() as u8)
    }

    /// Raises the similarity by `boost`. Only an exact similarity stays at 100.
    #[must_use]
    pub fn boosted(self, boost: u8) -> Self {
        if self == Self::EXACT {
            return self;
        }
        Self(self.0.saturating_add(boost).min(Self::ALMOST_EXACT.0))
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum SimilarityError {
    #[error("Similarity must be 100 or less ({0} > 100)")]
    OutOfRange(u8),
}

#[derive(strum::Display, strum::AsRefStr, Debug, Clone, Copy, Hash, PartialEq, Eq)]
#[strum(serialize_all = "lowercase")]
pub enum Confidence {
    High,
    Medium,
    Low,
}

impl Confidence {
    #[must_use]
    pub fn from_similarity(similarity: Similarity, policy: &MatchPolicy) -> Self {
        if *similarity >= policy.high_threshold {
            Confidence::High
        } else if *similarity >= policy.medium_threshold {
            Confidence::Medium
        } else {
            Confidence::Low
        }
    }
}

/// Thresholds and weights used by the matcher.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MatchPolicy {
    /// Lowest similarity graded as [`Confidence::High`].
    pub high_threshold: u8,
    /// Lowest similarity graded as [`Confidence::Medium`].
    pub medium_threshold: u8,
    /// Added to the score of entries whose muscle group equals the hint.
    pub muscle_group_boost: u8,
    /// Best scores below this value are reported as no match.
    pub min_similarity: u8,
}

impl MatchPolicy {
    pub const DEFAULT_HIGH_THRESHOLD: u8 = 80;
    pub const DEFAULT_MEDIUM_THRESHOLD: u8 = 50;
    pub const DEFAULT_MUSCLE_GROUP_BOOST: u8 = 10;
    pub const DEFAULT_MIN_SIMILARITY: u8 = 50;

    pub fn new(
        high_threshold: u8,
        medium_threshold: u8,
        muscle_group_boost: u8,
        min_similarity: u8,
    ) -> Result<Self, MatchPolicyError> {
        if high_threshold > 100 {
            return Err(MatchPolicyError::OutOfRange(high_threshold));
        }
        if min_similarity > 100 {
            return Err(MatchPolicyError::OutOfRange(min_similarity));
        }
        if medium_threshold > high_threshold {
            return Err(MatchPolicyError::Unordered {
                medium: medium_threshold,
                high: high_threshold,
            });
        }
        Ok(Self {
            high_threshold,
            medium_threshold,
            muscle_group_boost,
            min_similarity,
        })
    }
}

impl Default for MatchPolicy {
    fn default() -> Self {
        Self {
            high_threshold: Self::DEFAULT_HIGH_THRESHOLD,
            medium_threshold: Self::DEFAULT_MEDIUM_THRESHOLD,
            muscle_group_boost: Self::DEFAULT_MUSCLE_GROUP_BOOST,
            min_similarity: Self::DEFAULT_MIN_SIMILARITY,
        }
    }
}

#[derive(thiserror::Error, Debug, PartialEq)]
pub enum MatchPolicyError {
    #[error("Threshold must be 100 or less ({0} > 100)")]
    OutOfRange(u8),
    #[error("Medium threshold must not exceed high threshold ({medium} > {high})")]
    Unordered { medium: u8, high: u8 },
}

/// Result of matching one candidate text against the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchCandidate {
    pub exercise_id: Option<ExerciseID>,
    pub matched_name: String,
    pub similarity: Similarity,
    pub confidence: Confidence,
}

impl MatchCandidate {
    #[must_use]
    pub fn none() -> Self {
        Self {
            exercise_id: None,
            matched_name: String::new(),
            similarity: Similarity::NONE,
            confidence: Confidence::Low,
        }
    }

    #[must_use]
    pub fn is_match(&self) -> bool {
        self.exercise_id.is_some()
    }
}

/// Returns the catalog entry most similar to the candidate text.
///
/// Entries whose muscle group equals the hint get their score raised by
/// [`MatchPolicy::muscle_group_boost`]. On equal scores the entry listed first
/// wins. [`MatchCandidate::none`] is returned if the catalog is empty or the
/// best score is 0 or below [`MatchPolicy::min_similarity`].
#[must_use]
pub fn find_best_match(
    candidate: &str,
    muscle_group_hint: Option<&str>,
    exercises: &[ExerciseRecord],
    policy: &MatchPolicy,
) -> MatchCandidate {
    let candidate = normalize_exercise_name(candidate);

    let mut best: Option<(&ExerciseRecord, Similarity)> = None;

    for exercise in exercises {
        let mut score =
            normalized_similarity(&candidate, &normalize_exercise_name(&exercise.name));

        if score > Similarity::NONE
            && muscle_group_hint.is_some_and(|h| exercise.has_muscle_group(h))
        {
            score = score.boosted(policy.muscle_group_boost);
        }

        if best.is_none_or(|(_, best_score)| score > best_score) {
            best = Some((exercise, score));
        }
    }

    match best {
        Some((exercise, similarity))
            if similarity > Similarity::NONE && *similarity >= policy.min_similarity =>
        {
            MatchCandidate {
                exercise_id: Some(exercise.id),
                matched_name: exercise.name.to_string(),
                similarity,
                confidence: Confidence::from_similarity(similarity, policy),
            }
        }
        _ => MatchCandidate::none(),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;
    use proptest::prelude::*;
    use rstest::rstest;

    use super::*;
    use crate::Name;

    fn record(id: u128, name: &str, muscle_group: &str) -> ExerciseRecord {
        ExerciseRecord {
            id: id.into(),
            name: Name::new(name).unwrap(),
            muscle_group: muscle_group.to_string(),
            gif_url: None,
        }
    }

    fn catalog() -> Vec<ExerciseRecord> {
        vec![
            record(1, "Barbell Bench Press", "Chest"),
            record(2, "Lat Pulldown", "Back"),
            record(3, "Bicep Curl", "Arms"),
        ]
    }

    #[rstest]
    #[case("barbell_bench-press", "barbell bench press")]
    #[case("Supino_Inclinado.GIF", "supino inclinado")]
    #[case("Elevação Lateral", "elevacao lateral")]
    #[case("  Rosca   Direta\t", "rosca direta")]
    #[case("agachamento.gif.png", "agachamento")]
    #[case("remada - curvada .webp", "remada curvada")]
    #[case("leg.press.v2", "leg.press.v2")]
    #[case("", "")]
    #[case(".gif", "")]
    fn test_normalize_exercise_name(#[case] text: &str, #[case] expected: &str) {
        assert_eq!(normalize_exercise_name(text), expected);
    }

    #[rstest]
    #[case("Barbell_Bench-Press.gif")]
    #[case("x.gif -")]
    #[case("a..gif")]
    #[case("Crucifixo  Máquina .JPEG")]
    #[case("İstanbul Squat")]
    #[case("__--__")]
    fn test_normalize_exercise_name_idempotent(#[case] text: &str) {
        let normalized = normalize_exercise_name(text);
        assert_eq!(normalize_exercise_name(&normalized), normalized);
    }

    proptest! {
        #[test]
        fn test_normalize_exercise_name_is_idempotent(
            text in "[\\p{L}\\p{N}\\p{Mn} ._-]{0,30}(\\.(gif|GIF|png|jpeg|webp))?",
        ) {
            let normalized = normalize_exercise_name(&text);
            prop_assert_eq!(normalize_exercise_name(&normalized), normalized);
        }

        #[test]
        fn test_similarity_to_normalized_name_is_exact(text in "[a-zA-Zà-ü_ -]{0,30}") {
            let normalized = normalize_exercise_name(&text);
            let expected = if normalized.is_empty() {
                Similarity::NONE
            } else {
                Similarity::EXACT
            };
            prop_assert_eq!(similarity(&text, &normalized), expected);
        }
    }

    #[rstest]
    #[case("Bench Press", "bench_press.gif", Similarity::EXACT)]
    #[case("bench press", "press bench", Similarity::ALMOST_EXACT)]
    #[case("", "bench press", Similarity::NONE)]
    #[case("bench press", "", Similarity::NONE)]
    #[case("", "", Similarity::NONE)]
    fn test_similarity(#[case] a: &str, #[case] b: &str, #[case] expected: Similarity) {
        assert_eq!(similarity(a, b), expected);
    }

    #[test]
    fn test_similarity_symmetric_and_bounded() {
        for (a, b) in [
            ("barbell bench press", "bench press"),
            ("lat pulldown", "pull down"),
            ("squat", "squat jump"),
        ] {
            assert_eq!(similarity(a, b), similarity(b, a));
            assert!(similarity(a, b) < Similarity::EXACT);
        }
    }

    #[test]
    fn test_similarity_word_overlap() {
        assert_eq!(
            similarity("barbell bench press", "bench press"),
            Similarity(80)
        );
    }

    #[rstest]
    #[case(0, Ok(Similarity::NONE))]
    #[case(100, Ok(Similarity::EXACT))]
    #[case(101, Err(SimilarityError::OutOfRange(101)))]
    fn test_similarity_new(#[case] value: u8, #[case] expected: Result<Similarity, SimilarityError>) {
        assert_eq!(Similarity::new(value), expected);
    }

    #[rstest]
    #[case(Similarity(60), 10, Similarity(70))]
    #[case(Similarity(95), 10, Similarity::ALMOST_EXACT)]
    #[case(Similarity(90), u8::MAX, Similarity::ALMOST_EXACT)]
    #[case(Similarity::EXACT, 10, Similarity::EXACT)]
    fn test_similarity_boosted(
        #[case] similarity: Similarity,
        #[case] boost: u8,
        #[case] expected: Similarity,
    ) {
        assert_eq!(similarity.boosted(boost), expected);
    }

    #[rstest]
    #[case(100, Confidence::High)]
    #[case(80, Confidence::High)]
    #[case(79, Confidence::Medium)]
    #[case(50, Confidence::Medium)]
    #[case(49, Confidence::Low)]
    #[case(0, Confidence::Low)]
    fn test_confidence_from_similarity(#[case] value: u8, #[case] expected: Confidence) {
        assert_eq!(
            Confidence::from_similarity(Similarity::new(value).unwrap(), &MatchPolicy::default()),
            expected
        );
    }

    #[test]
    fn test_confidence_monotonic() {
        let policy = MatchPolicy::default();
        let rank = |c: Confidence| match c {
            Confidence::Low => 0,
            Confidence::Medium => 1,
            Confidence::High => 2,
        };
        for value in 0..100 {
            assert!(
                rank(Confidence::from_similarity(Similarity(value), &policy))
                    <= rank(Confidence::from_similarity(Similarity(value + 1), &policy))
            );
        }
    }

    #[test]
    fn test_confidence_display() {
        assert_eq!(Confidence::High.to_string(), "high");
        assert_eq!(Confidence::Medium.as_ref(), "medium");
    }

    #[rstest]
    #[case(80, 50, 10, 50, Ok(MatchPolicy::default()))]
    #[case(101, 50, 10, 50, Err(MatchPolicyError::OutOfRange(101)))]
    #[case(80, 50, 10, 120, Err(MatchPolicyError::OutOfRange(120)))]
    #[case(60, 70, 10, 50, Err(MatchPolicyError::Unordered { medium: 70, high: 60 }))]
    fn test_match_policy_new(
        #[case] high: u8,
        #[case] medium: u8,
        #[case] boost: u8,
        #[case] min: u8,
        #[case] expected: Result<MatchPolicy, MatchPolicyError>,
    ) {
        assert_eq!(MatchPolicy::new(high, medium, boost, min), expected);
    }

    #[test]
    fn test_find_best_match_exact() {
        assert_eq!(
            find_best_match(
                "barbell_bench-press",
                None,
                &catalog(),
                &MatchPolicy::default()
            ),
            MatchCandidate {
                exercise_id: Some(1.into()),
                matched_name: "Barbell Bench Press".to_string(),
                similarity: Similarity::EXACT,
                confidence: Confidence::High,
            }
        );
    }

    #[test]
    fn test_find_best_match_no_close_entry() {
        let result = find_best_match(
            "squat variant xyz",
            None,
            &catalog(),
            &MatchPolicy::default(),
        );

        assert_eq!(result, MatchCandidate::none());
        assert!(*result.similarity < 50);
        assert_eq!(result.confidence, Confidence::Low);
        assert!(!result.is_match());
    }

    #[test]
    fn test_find_best_match_empty_catalog() {
        for candidate in ["barbell bench press", "", "anything"] {
            assert_eq!(
                find_best_match(candidate, Some("Chest"), &[], &MatchPolicy::default()),
                MatchCandidate::none()
            );
        }
    }

    #[test]
    fn test_find_best_match_empty_candidate() {
        assert_eq!(
            find_best_match("", Some("Chest"), &catalog(), &MatchPolicy::default()),
            MatchCandidate::none()
        );
        assert_eq!(
            find_best_match(".gif", None, &catalog(), &MatchPolicy::default()),
            MatchCandidate::none()
        );
    }

    #[test]
    fn test_find_best_match_partial() {
        let result = find_best_match(
            "bench_press.gif",
            None,
            &catalog(),
            &MatchPolicy::default(),
        );

        assert_eq!(result.exercise_id, Some(1.into()));
        assert_eq!(result.similarity, Similarity(80));
        assert_eq!(result.confidence, Confidence::High);
    }

    #[test]
    fn test_find_best_match_first_entry_wins_tie() {
        let exercises = vec![
            record(1, "Leg Press", "Legs"),
            record(2, "Leg Press", "Glutes"),
        ];

        assert_eq!(
            find_best_match("leg press", None, &exercises, &MatchPolicy::default()).exercise_id,
            Some(1.into())
        );
    }

    #[test]
    fn test_find_best_match_muscle_group_hint() {
        let exercises = vec![
            record(1, "Cable Fly", "Chest"),
            record(2, "Cable Row", "Back"),
        ];
        let policy = MatchPolicy::default();

        let without_hint = find_best_match("cable", None, &exercises, &policy);
        let with_hint = find_best_match("cable", Some("back"), &exercises, &policy);

        assert_eq!(without_hint.exercise_id, Some(1.into()));
        assert_eq!(with_hint.exercise_id, Some(2.into()));
        assert_eq!(
            with_hint.similarity,
            without_hint.similarity.boosted(policy.muscle_group_boost)
        );
    }

    #[test]
    fn test_find_best_match_boost_does_not_beat_exact_match() {
        let exercises = vec![
            record(1, "Barbell Bench Presses", "Chest"),
            record(2, "Barbell Bench Press", "Triceps"),
        ];

        let candidate = find_best_match(
            "barbell bench press",
            Some("chest"),
            &exercises,
            &MatchPolicy::default(),
        );

        assert_eq!(candidate.exercise_id, Some(2.into()));
        assert_eq!(candidate.similarity, Similarity::EXACT);
    }

    #[test]
    fn test_find_best_match_empty_hint_is_ignored() {
        let exercises = vec![record(1, "Cable Fly", "")];

        assert_eq!(
            find_best_match("cable flys", Some(""), &exercises, &MatchPolicy::default()),
            find_best_match("cable flys", None, &exercises, &MatchPolicy::default())
        );
    }

    #[test]
    fn test_find_best_match_min_similarity() {
        let policy = MatchPolicy::new(80, 50, 10, 1).unwrap();
        let result = find_best_match("squat variant xyz", None, &catalog(), &policy);

        assert!(result.is_match());
        assert!(*result.similarity < 50);
        assert_eq!(result.confidence, Confidence::Low);
    }
}
