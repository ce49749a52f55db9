//! Database module for the study companion server
//!
//! Row models and the data access layer over the PostgreSQL pool.

pub mod models;
pub mod operations;

pub use models::{
    BlindSpot, BuddyMatch, Flashcard, MatchStatus, MatchWithPartner, NewFlashcard, ProfileUpdate, PublicUser,
    TopicAssessment, User,
};
pub use operations::{DbOperations, DbPoolStatus};
