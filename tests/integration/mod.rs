//! Integration tests for sqlward.

pub mod eval_test;
pub mod pipeline_test;
pub mod safety_test;
