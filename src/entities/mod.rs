pub mod prelude;
pub mod submission;
