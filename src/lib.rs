//! # repofacts
//!
//! Structural fact extraction and file dependency analysis for source trees.
//!
//! Each supported file is reduced to a normalized fact record (imports,
//! functions, classes, documentation, and for TypeScript interfaces, type
//! aliases and decorators). Imports are resolved against a repository-wide
//! module index into a file-to-file dependency graph, which is then mined
//! for key modules, import cycles, connectivity metrics and a size-bounded
//! visualization graph.
//!
//! ## Supported Languages
//!
//! Python, JavaScript, TypeScript

pub mod core;
pub mod formatters;
pub mod parsers;

pub use crate::core::{Analysis, AnalysisConfig, CodebaseAnalyzer};
