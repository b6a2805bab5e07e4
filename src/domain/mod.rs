// Domain layer - Core business types and policies

pub mod errors;
pub mod model;
pub mod rules;
