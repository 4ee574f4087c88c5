pub mod mood;
pub mod quote;
