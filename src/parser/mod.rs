//! Visual C++ solution and project file parsing.
//!
//! The parser extracts only what the orchestrator and quality tools need:
//! project identity and solution membership, output directory, include
//! directories, preprocessor definitions, sources and headers.

pub mod condition;
pub mod errors;
pub mod project;
pub mod properties;
pub mod solution;

pub use errors::ParseError;
pub use project::{parse_project, parse_solution_project};
pub use properties::Properties;
pub use solution::{parse_solution, parse_solution_file, Solution, SolutionProject};
