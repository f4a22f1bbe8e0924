pub mod models;
pub mod queries;

pub use models::{Follow, Identified, Post, PostEmbedding, User};
