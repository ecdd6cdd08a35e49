use tree_sitter::Node as TSNode;

use super::common::{
    collect_descendants_by_kind, decorator_name, extract_text, field_text, find_child_by_kind,
    first_statement, line_span, named_children, parse_source, squash_whitespace, unquote,
};
use super::docs::{clean_docstring, preceding_doc, HASH_COMMENTS};
use super::{LanguageAdapter, ModuleSyntax};
use crate::core::{
    ClassFact, FactRecord, FieldFact, FunctionFact, ImportKind, ImportRef, Parameter,
    ParseFailure,
};

pub struct PythonAdapter;

struct Source<'a> {
    bytes: &'a [u8],
    lines: Vec<&'a str>,
}

impl PythonAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Imports anywhere in the module, including ones nested in
    /// `try`/`if` blocks and function bodies.
    fn extract_imports(&self, root: &TSNode, src: &Source) -> Vec<ImportRef> {
        let mut imports = Vec::new();
        for node in
            collect_descendants_by_kind(root, &["import_statement", "import_from_statement"])
        {
            match node.kind() {
                "import_statement" => self.process_import(&node, src, &mut imports),
                _ => self.process_from_import(&node, src, &mut imports),
            }
        }
        imports
    }

    fn process_import(&self, node: &TSNode, src: &Source, imports: &mut Vec<ImportRef>) {
        let line = node.start_position().row + 1;
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            match name.kind() {
                "aliased_import" => {
                    let Some(module) = field_text(&name, "name", src.bytes) else {
                        continue;
                    };
                    let mut import = ImportRef::new(ImportKind::Aliased, module, line);
                    if let Some(alias) = field_text(&name, "alias", src.bytes) {
                        import = import.with_alias(alias.to_string());
                    }
                    imports.push(import);
                }
                _ => {
                    let module = extract_text(&name, src.bytes);
                    imports.push(ImportRef::new(ImportKind::Plain, module, line));
                }
            }
        }
    }

    fn process_from_import(&self, node: &TSNode, src: &Source, imports: &mut Vec<ImportRef>) {
        let line = node.start_position().row + 1;
        let Some(module) = field_text(node, "module_name", src.bytes) else {
            return;
        };

        if find_child_by_kind(node, "wildcard_import").is_some() {
            imports.push(ImportRef::new(ImportKind::Namespace, module, line).with_names(vec![
                "*".to_string(),
            ]));
            return;
        }

        let mut names = Vec::new();
        let mut aliased = Vec::new();
        let mut cursor = node.walk();
        for name in node.children_by_field_name("name", &mut cursor) {
            if name.kind() == "aliased_import" {
                if let Some(original) = field_text(&name, "name", src.bytes) {
                    names.push(original.to_string());
                    aliased.push(field_text(&name, "alias", src.bytes).map(str::to_string));
                }
            } else {
                names.push(extract_text(&name, src.bytes).to_string());
                aliased.push(None);
            }
        }

        // `from . import sibling` names the module itself.
        if module.chars().all(|c| c == '.') {
            for (name, alias) in names.into_iter().zip(aliased) {
                let target = format!("{module}{name}");
                let import = match alias {
                    Some(alias) => ImportRef::new(ImportKind::Aliased, target, line)
                        .with_names(vec![name])
                        .with_alias(alias),
                    None => ImportRef::new(ImportKind::Plain, target, line).with_names(vec![name]),
                };
                imports.push(import);
            }
            return;
        }

        let kind = if aliased.iter().any(Option::is_some) {
            ImportKind::Aliased
        } else {
            ImportKind::Plain
        };
        let mut import = ImportRef::new(kind, module, line).with_names(names);
        let mut aliases = aliased.into_iter().flatten();
        if let (Some(alias), None) = (aliases.next(), aliases.next()) {
            import = import.with_alias(alias);
        }
        imports.push(import);
    }

    fn extract_classes(&self, root: &TSNode, src: &Source) -> Vec<ClassFact> {
        named_children(root)
            .into_iter()
            .filter_map(|child| {
                let (definition, decorators) = unwrap_decorated(&child, src);
                (definition.kind() == "class_definition")
                    .then(|| self.process_class(&child, &definition, decorators, src))
                    .flatten()
            })
            .collect()
    }

    fn process_class(
        &self,
        outer: &TSNode,
        class_node: &TSNode,
        decorators: Vec<String>,
        src: &Source,
    ) -> Option<ClassFact> {
        let name = field_text(class_node, "name", src.bytes)?;

        let mut bases = Vec::new();
        if let Some(superclasses) = class_node.child_by_field_name("superclasses") {
            for arg in named_children(&superclasses) {
                if matches!(arg.kind(), "identifier" | "attribute" | "subscript") {
                    bases.push(extract_text(&arg, src.bytes).to_string());
                }
            }
        }

        let mut methods = Vec::new();
        let mut fields = Vec::new();
        if let Some(body) = class_node.child_by_field_name("body") {
            for member in named_children(&body) {
                let (definition, member_decorators) = unwrap_decorated(&member, src);
                match definition.kind() {
                    "function_definition" => {
                        if let Some(method) =
                            self.process_function(&member, &definition, member_decorators, src)
                        {
                            methods.push(method);
                        }
                    }
                    "expression_statement" => {
                        if let Some(field) = class_field(&definition, src) {
                            fields.push(field);
                        }
                    }
                    _ => {}
                }
            }
        }

        Some(ClassFact {
            name: name.to_string(),
            bases,
            implements: Vec::new(),
            methods,
            fields,
            decorators,
            doc: self.documentation(outer, class_node, src),
            span: line_span(class_node),
        })
    }

    fn extract_functions(&self, root: &TSNode, src: &Source) -> Vec<FunctionFact> {
        named_children(root)
            .into_iter()
            .filter_map(|child| {
                let (definition, decorators) = unwrap_decorated(&child, src);
                (definition.kind() == "function_definition")
                    .then(|| self.process_function(&child, &definition, decorators, src))
                    .flatten()
            })
            .collect()
    }

    fn process_function(
        &self,
        outer: &TSNode,
        func_node: &TSNode,
        decorators: Vec<String>,
        src: &Source,
    ) -> Option<FunctionFact> {
        let name = field_text(func_node, "name", src.bytes)?;

        let params = func_node
            .child_by_field_name("parameters")
            .map(|params| {
                named_children(&params)
                    .iter()
                    .filter_map(|param| parameter(param, src))
                    .collect()
            })
            .unwrap_or_default();

        let return_type =
            field_text(func_node, "return_type", src.bytes).map(squash_whitespace);

        let is_async = func_node
            .child(0)
            .map(|first| first.kind() == "async")
            .unwrap_or(false);

        Some(FunctionFact {
            name: name.to_string(),
            params,
            return_type,
            doc: self.documentation(outer, func_node, src),
            decorators,
            is_async,
            span: line_span(func_node),
        })
    }

    /// Docstring first, then a `#` comment block directly above the
    /// declaration (or its decorators).
    fn documentation(&self, outer: &TSNode, definition: &TSNode, src: &Source) -> Option<String> {
        definition
            .child_by_field_name("body")
            .and_then(|body| docstring(&body, src))
            .or_else(|| preceding_doc(&src.lines, outer.start_position().row, HASH_COMMENTS))
    }
}

/// Splits a `decorated_definition` into its inner definition and the
/// decorator names; other nodes pass through unchanged.
fn unwrap_decorated<'t>(node: &TSNode<'t>, src: &Source) -> (TSNode<'t>, Vec<String>) {
    if node.kind() != "decorated_definition" {
        return (*node, Vec::new());
    }
    let decorators = named_children(node)
        .iter()
        .filter(|child| child.kind() == "decorator")
        .map(|decorator| decorator_name(extract_text(decorator, src.bytes)))
        .collect();
    let definition = node.child_by_field_name("definition").unwrap_or(*node);
    (definition, decorators)
}

fn docstring(body: &TSNode, src: &Source) -> Option<String> {
    let first = first_statement(body)?;
    if first.kind() != "expression_statement" {
        return None;
    }
    let string = first.named_child(0)?;
    if string.kind() != "string" {
        return None;
    }
    clean_docstring(unquote(extract_text(&string, src.bytes)))
}

fn parameter(param: &TSNode, src: &Source) -> Option<Parameter> {
    let text = |node: &TSNode| extract_text(node, src.bytes).to_string();
    match param.kind() {
        "identifier" | "list_splat_pattern" | "dictionary_splat_pattern" => {
            Some(Parameter::named(text(param)))
        }
        "default_parameter" => param
            .child_by_field_name("name")
            .map(|name| Parameter::named(text(&name))),
        "typed_parameter" | "typed_default_parameter" => {
            let name = param
                .child_by_field_name("name")
                .or_else(|| param.named_child(0))?;
            Some(Parameter {
                name: text(&name),
                type_hint: field_text(param, "type", src.bytes).map(squash_whitespace),
            })
        }
        _ => None,
    }
}

/// `x = 1` or `x: int = 1` directly inside a class body.
fn class_field(statement: &TSNode, src: &Source) -> Option<FieldFact> {
    let assignment = statement.named_child(0)?;
    if assignment.kind() != "assignment" {
        return None;
    }
    let left = assignment.child_by_field_name("left")?;
    if left.kind() != "identifier" {
        return None;
    }
    Some(FieldFact {
        name: extract_text(&left, src.bytes).to_string(),
        type_hint: field_text(&assignment, "type", src.bytes).map(squash_whitespace),
        line: assignment.start_position().row + 1,
    })
}

impl LanguageAdapter for PythonAdapter {
    fn language_name(&self) -> &str {
        "python"
    }

    fn extract(&self, source: &str) -> Result<FactRecord, ParseFailure> {
        let tree = parse_source(tree_sitter_python::language(), source)?;
        let root = tree.root_node();
        let src = Source {
            bytes: source.as_bytes(),
            lines: source.lines().collect(),
        };

        let mut record = FactRecord::new("python");
        record.imports = self.extract_imports(&root, &src);
        record.classes = self.extract_classes(&root, &src);
        record.functions = self.extract_functions(&root, &src);
        record.module_doc = docstring(&root, &src);
        Ok(record)
    }

    fn is_entry_point(&self, file_name: &str) -> bool {
        file_name == "__init__.py"
    }

    fn module_syntax(&self) -> ModuleSyntax {
        ModuleSyntax::Dotted
    }
}

impl Default for PythonAdapter {
    fn default() -> Self {
        Self::new()
    }
}
