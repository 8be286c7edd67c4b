//! Answer quality evaluation for WebScout.
//!
//! A grading model reads the question, the answer and a rubric, and replies
//! with loosely tagged text. Parsing is lenient: malformed grader output
//! degrades to placeholder values and never fails the evaluation.

pub mod evaluator;
pub mod parse;

pub use evaluator::{DEFAULT_RUBRIC, EvaluationRequest, Evaluator};
pub use parse::{EvaluationResult, parse_evaluation};
