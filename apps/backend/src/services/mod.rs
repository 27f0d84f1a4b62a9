pub mod extraction;
pub mod generation;
pub mod llm;
