pub mod actions;
pub mod history;
pub mod review;
pub mod sessions;
