pub mod actions;
pub mod assessments;
pub mod progress;
pub mod reviews;
pub mod words;
