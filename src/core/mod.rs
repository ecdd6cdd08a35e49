pub mod analytics;
pub mod analyzer;
pub mod config;
pub mod cycles;
pub mod error;
pub mod facts;
pub mod graph;
pub mod module_index;
pub mod paths;
pub mod resolver;
pub mod scanner;
pub mod visual;

pub use analytics::{key_modules, DegreeLeader, KeyModule, Metrics};
pub use analyzer::{Analysis, CodebaseAnalyzer};
pub use config::AnalysisConfig;
pub use cycles::{find_cycles, CycleReport};
pub use error::AnalysisError;
pub use facts::{
    ClassFact, ComponentFact, DecoratedKind, DecoratedTarget, DecoratorFact, FactRecord, FieldFact, FileFacts,
    FileRecord, FunctionFact, ImportKind, ImportRef, InterfaceFact, LineSpan, Parameter,
    ParseFailure, PropertyFact, TypeAliasFact, UnreadableFile,
};
pub use graph::{DependencyEdge, DependencyGraph, FileGraph, GraphBuilder};
pub use module_index::ModuleIndex;
pub use resolver::{ImportResolver, Resolution, ResolutionStats};
pub use scanner::FileScanner;
pub use visual::{VisualGraph, VisualLevel, VisualNode};
