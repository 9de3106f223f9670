pub mod extract;
pub mod handlers;
pub mod normalizer;
pub mod skills;
