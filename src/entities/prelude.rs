#![allow(unused_imports)]

pub use super::submission::Entity as Submission;
