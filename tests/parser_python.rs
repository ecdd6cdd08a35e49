use repofacts::core::ImportKind;
use repofacts::parsers::python::PythonAdapter;
use repofacts::parsers::{LanguageAdapter, ModuleSyntax};

const SAMPLE: &str = r#""""Service layer for orders."""
import os
import numpy as np
from .models import Order, Item as LineItem
from . import helpers
from ..core import *

# Base type for all services.
class OrderService(BaseService, mixins.Audit):
    """Coordinates order operations."""
    retries: int = 3
    name = "orders"

    def __init__(self, repo):
        self.repo = repo

    @staticmethod
    def validate(order: Order, *args, strict: bool = False, **kwargs) -> bool:
        return True


# Builds a service.
# Uses the default repository.
def build(repo=None) -> "OrderService":
    return OrderService(repo)


async def refresh(service):
    """Refresh caches."""
    return None
"#;

#[test]
fn python_adapter_extracts_imports() {
    let record = PythonAdapter::new().extract(SAMPLE).unwrap();
    let imports = &record.imports;
    assert_eq!(imports.len(), 5);

    assert_eq!(imports[0].target, "os");
    assert_eq!(imports[0].kind, ImportKind::Plain);
    assert_eq!(imports[0].line, 2);

    assert_eq!(imports[1].target, "numpy");
    assert_eq!(imports[1].kind, ImportKind::Aliased);
    assert_eq!(imports[1].alias.as_deref(), Some("np"));

    assert_eq!(imports[2].target, ".models");
    assert_eq!(imports[2].kind, ImportKind::Aliased);
    assert_eq!(imports[2].names, vec!["Order", "Item"]);
    assert_eq!(imports[2].alias.as_deref(), Some("LineItem"));

    assert_eq!(imports[3].target, ".helpers");
    assert_eq!(imports[3].kind, ImportKind::Plain);

    assert_eq!(imports[4].target, "..core");
    assert_eq!(imports[4].kind, ImportKind::Namespace);
    assert_eq!(imports[4].names, vec!["*"]);
}

#[test]
fn python_adapter_extracts_classes_and_methods() {
    let record = PythonAdapter::new().extract(SAMPLE).unwrap();
    assert_eq!(record.classes.len(), 1);

    let class = &record.classes[0];
    assert_eq!(class.name, "OrderService");
    assert_eq!(class.bases, vec!["BaseService", "mixins.Audit"]);
    assert_eq!(class.doc.as_deref(), Some("Coordinates order operations."));
    assert_eq!(class.span.start, 9);

    let field_names: Vec<&str> = class.fields.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(field_names, vec!["retries", "name"]);
    assert_eq!(class.fields[0].type_hint.as_deref(), Some("int"));

    let method_names: Vec<&str> = class.methods.iter().map(|m| m.name.as_str()).collect();
    assert_eq!(method_names, vec!["__init__", "validate"]);

    let validate = &class.methods[1];
    assert_eq!(validate.decorators, vec!["staticmethod"]);
    assert_eq!(validate.return_type.as_deref(), Some("bool"));
    let params: Vec<&str> = validate.params.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(params, vec!["order", "*args", "strict", "**kwargs"]);
    assert_eq!(validate.params[0].type_hint.as_deref(), Some("Order"));
    assert_eq!(validate.params[2].type_hint.as_deref(), Some("bool"));
}

#[test]
fn python_adapter_extracts_functions_and_docs() {
    let record = PythonAdapter::new().extract(SAMPLE).unwrap();
    assert_eq!(
        record.module_doc.as_deref(),
        Some("Service layer for orders.")
    );

    let names: Vec<&str> = record.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["build", "refresh"]);

    let build = &record.functions[0];
    assert_eq!(
        build.doc.as_deref(),
        Some("Builds a service.\nUses the default repository.")
    );
    assert_eq!(build.params[0].name, "repo");
    assert!(!build.is_async);

    let refresh = &record.functions[1];
    assert!(refresh.is_async);
    assert_eq!(refresh.doc.as_deref(), Some("Refresh caches."));
}

#[test]
fn python_adapter_reports_parse_failure() {
    let failure = PythonAdapter::new()
        .extract("def broken(:\n    pass\n")
        .unwrap_err();
    assert!(failure.reason.contains("syntax error"));
}

#[test]
fn python_adapter_conventions() {
    let adapter = PythonAdapter::new();
    assert_eq!(adapter.language_name(), "python");
    assert!(adapter.is_entry_point("__init__.py"));
    assert!(!adapter.is_entry_point("main.py"));
    assert_eq!(adapter.module_syntax(), ModuleSyntax::Dotted);
}
