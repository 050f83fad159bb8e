pub mod extraction;
pub mod formatting;
