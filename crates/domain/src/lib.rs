#![warn(clippy::pedantic)]
#![allow(clippy::missing_errors_doc)]

mod asset;
mod error;
mod exercise;
mod matcher;
mod name;
mod naming;
mod pacing;
mod review;
mod service;
mod vision;

pub use asset::*;
pub use error::*;
pub use exercise::*;
pub use matcher::{
    Confidence, MatchCandidate, MatchPolicy, MatchPolicyError, Similarity, SimilarityError,
    find_best_match, normalize_exercise_name, similarity,
};
pub use name::*;
pub use naming::*;
pub use pacing::*;
pub use review::*;
pub use service::*;
pub use vision::*;
