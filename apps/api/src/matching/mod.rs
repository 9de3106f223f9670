pub mod cache;
pub mod embeddings;
pub mod insights;
pub mod ranking;
pub mod similarity;
pub mod strategy;
pub mod suggestions;
