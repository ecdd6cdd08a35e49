use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One scanned source file. Paths are repository-relative and always use `/`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub struct FileRecord {
    pub path: String,
    pub language: String,
    pub size: u64,
}

impl FileRecord {
    pub fn new(path: impl Into<String>, language: impl Into<String>, size: u64) -> Self {
        Self {
            path: path.into(),
            language: language.into(),
            size,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum ImportKind {
    Plain,
    Aliased,
    Namespace,
    SideEffect,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ImportRef {
    pub kind: ImportKind,
    /// Raw module token exactly as written (`./util`, `..models`, `os.path`).
    pub target: String,
    pub line: usize,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub names: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub alias: Option<String>,
}

impl ImportRef {
    pub fn new(kind: ImportKind, target: impl Into<String>, line: usize) -> Self {
        Self {
            kind,
            target: target.into(),
            line,
            names: Vec::new(),
            alias: None,
        }
    }

    pub fn with_names(mut self, names: Vec<String>) -> Self {
        self.names = names;
        self
    }

    pub fn with_alias(mut self, alias: String) -> Self {
        self.alias = Some(alias);
        self
    }
}

/// Inclusive, 1-based line range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parameter {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
}

impl Parameter {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_hint: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FunctionFact {
    pub name: String,
    pub params: Vec<Parameter>,
    pub return_type: Option<String>,
    pub doc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    #[serde(default)]
    pub is_async: bool,
    pub span: LineSpan,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct FieldFact {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub type_hint: Option<String>,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClassFact {
    pub name: String,
    pub bases: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub implements: Vec<String>,
    pub methods: Vec<FunctionFact>,
    pub fields: Vec<FieldFact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<String>,
    pub doc: Option<String>,
    pub span: LineSpan,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PropertyFact {
    pub name: String,
    pub type_hint: Option<String>,
    pub optional: bool,
    pub line: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct InterfaceFact {
    pub name: String,
    pub extends: Vec<String>,
    pub properties: Vec<PropertyFact>,
    pub doc: Option<String>,
    pub span: LineSpan,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TypeAliasFact {
    pub name: String,
    pub definition: String,
    pub doc: Option<String>,
    pub span: LineSpan,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DecoratedKind {
    Class,
    Method,
    Property,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecoratedTarget {
    pub kind: DecoratedKind,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DecoratorFact {
    pub name: String,
    pub arguments: Option<String>,
    pub line: usize,
    pub target: Option<DecoratedTarget>,
}

/// A function component in a file that imports React.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ComponentFact {
    pub name: String,
    pub line: usize,
    pub doc: Option<String>,
    /// Keys of a `Name.propTypes = { ... }` assignment.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub prop_types: Vec<String>,
}

/// Normalized structural summary of one source file.
///
/// Language-specific collections (`interfaces`, `type_aliases`,
/// `decorators`, `components`) are additive: adapters for languages without those
/// constructs leave them empty and they are omitted when serialized.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct FactRecord {
    pub language: String,
    pub imports: Vec<ImportRef>,
    pub functions: Vec<FunctionFact>,
    pub classes: Vec<ClassFact>,
    pub module_doc: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<InterfaceFact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub type_aliases: Vec<TypeAliasFact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub decorators: Vec<DecoratorFact>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub components: Vec<ComponentFact>,
}

impl FactRecord {
    pub fn new(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Error, Serialize, Deserialize, PartialEq, Eq)]
#[error("parse failure: {reason}")]
pub struct ParseFailure {
    pub reason: String,
}

impl ParseFailure {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Extraction outcome stored for every file whose language has an adapter.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum FileFacts {
    Parsed(FactRecord),
    Failed(ParseFailure),
}

impl FileFacts {
    pub fn record(&self) -> Option<&FactRecord> {
        match self {
            FileFacts::Parsed(record) => Some(record),
            FileFacts::Failed(_) => None,
        }
    }

    pub fn failure(&self) -> Option<&ParseFailure> {
        match self {
            FileFacts::Parsed(_) => None,
            FileFacts::Failed(failure) => Some(failure),
        }
    }
}

impl From<Result<FactRecord, ParseFailure>> for FileFacts {
    fn from(result: Result<FactRecord, ParseFailure>) -> Self {
        match result {
            Ok(record) => FileFacts::Parsed(record),
            Err(failure) => FileFacts::Failed(failure),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UnreadableFile {
    pub path: String,
    pub reason: String,
}
