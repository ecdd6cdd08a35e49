use std::collections::HashMap;
use tree_sitter::Node as TSNode;

use super::common::{
    decorator_name, descendants_of_kind, extract_text, field_text, find_child_by_kind,
    line_span, named_children, parse_source_tolerant, squash_whitespace, unquote,
};
use super::docs::{preceding_doc, C_COMMENTS};
use super::{LanguageAdapter, ModuleSyntax};
use crate::core::{
    ClassFact, ComponentFact, FactRecord, FieldFact, FunctionFact, ImportKind, ImportRef, Parameter,
    ParseFailure,
};

const ENTRY_POINTS: &[&str] = &["index.js", "index.jsx", "index.mjs", "index.cjs"];

const FUNCTION_VALUES: &[&str] = &[
    "arrow_function",
    "function",
    "function_expression",
    "generator_function",
];

/// Baseline adapter for the ECMAScript family. The TypeScript adapter
/// runs this extraction over its own tree and layers typed facts on top.
pub struct JavaScriptAdapter;

pub(crate) struct Source<'a> {
    pub bytes: &'a [u8],
    pub lines: Vec<&'a str>,
}

impl<'a> Source<'a> {
    pub fn new(source: &'a str) -> Self {
        Self {
            bytes: source.as_bytes(),
            lines: source.lines().collect(),
        }
    }

    pub fn text(&self, node: &TSNode) -> &'a str {
        extract_text(node, self.bytes)
    }
}

/// A top-level declaration together with the statement that carries it
/// (`export_statement` for exported declarations, otherwise itself).
pub(crate) struct Declaration<'t> {
    pub outer: TSNode<'t>,
    pub node: TSNode<'t>,
}

pub(crate) fn top_level_declarations<'t>(root: &TSNode<'t>) -> Vec<Declaration<'t>> {
    named_children(root)
        .into_iter()
        .filter_map(|child| {
            if child.kind() == "export_statement" {
                child
                    .child_by_field_name("declaration")
                    .map(|node| Declaration { outer: child, node })
            } else {
                Some(Declaration {
                    outer: child,
                    node: child,
                })
            }
        })
        .collect()
}

/// Declarators of a `const`/`let`/`var` statement whose value is a function.
pub(crate) fn function_declarators<'t>(statement: &TSNode<'t>) -> Vec<(TSNode<'t>, TSNode<'t>)> {
    if !matches!(statement.kind(), "lexical_declaration" | "variable_declaration") {
        return Vec::new();
    }
    named_children(statement)
        .into_iter()
        .filter(|child| child.kind() == "variable_declarator")
        .filter_map(|declarator| {
            let value = declarator.child_by_field_name("value")?;
            FUNCTION_VALUES
                .contains(&value.kind())
                .then_some((declarator, value))
        })
        .collect()
}

/// Decorators attached to `node`: its own `decorator` children, the ones
/// stacked directly before it in a class body, and those on an enclosing
/// `export` statement.
pub(crate) fn decorator_nodes<'t>(node: &TSNode<'t>, outer: Option<&TSNode<'t>>) -> Vec<TSNode<'t>> {
    let mut found = Vec::new();

    let mut sibling = node.prev_named_sibling();
    while let Some(prev) = sibling {
        if prev.kind() != "decorator" {
            break;
        }
        found.push(prev);
        sibling = prev.prev_named_sibling();
    }
    found.reverse();

    if let Some(outer) = outer {
        if outer.id() != node.id() {
            found.extend(
                named_children(outer)
                    .into_iter()
                    .filter(|child| child.kind() == "decorator"),
            );
        }
    }
    found.extend(
        named_children(node)
            .into_iter()
            .filter(|child| child.kind() == "decorator"),
    );
    // Decorators on an `export` statement are also siblings of its declaration.
    found.sort_by_key(|decorator| decorator.start_byte());
    found.dedup_by_key(|decorator| decorator.id());
    found
}

/// Row used for documentation lookup: the earliest of the statement and
/// its decorators.
fn anchor_row(outer: &TSNode, decorators: &[TSNode]) -> usize {
    decorators
        .iter()
        .map(|d| d.start_position().row)
        .chain(std::iter::once(outer.start_position().row))
        .min()
        .unwrap_or(0)
}

impl JavaScriptAdapter {
    pub fn new() -> Self {
        Self
    }

    /// Shared extraction over an ECMAScript-shaped tree.
    pub(crate) fn collect_facts(&self, root: &TSNode, src: &Source, language: &str) -> FactRecord {
        let mut record = FactRecord::new(language);
        record.imports = self.extract_imports(root, src);
        record.module_doc = module_doc(root, src);

        for decl in top_level_declarations(root) {
            match decl.node.kind() {
                "function_declaration" | "generator_function_declaration" => {
                    if let Some(function) = self.process_function(&decl.outer, &decl.node, src) {
                        record.functions.push(function);
                    }
                }
                "lexical_declaration" | "variable_declaration" => {
                    for (declarator, value) in function_declarators(&decl.node) {
                        if let Some(function) =
                            self.process_bound_function(&decl.outer, &declarator, &value, src)
                        {
                            record.functions.push(function);
                        }
                    }
                }
                "class_declaration" | "abstract_class_declaration" => {
                    if let Some(class) = self.process_class(&decl.outer, &decl.node, src) {
                        record.classes.push(class);
                    }
                }
                _ => {}
            }
        }
        record.components = react_components(root, &record, src);
        record
    }

    fn extract_imports(&self, root: &TSNode, src: &Source) -> Vec<ImportRef> {
        let mut imports = Vec::new();

        for child in named_children(root) {
            match child.kind() {
                "import_statement" => {
                    if let Some(import) = self.process_import(&child, src) {
                        imports.push(import);
                    }
                }
                "export_statement" => {
                    if let Some(import) = self.process_reexport(&child, src) {
                        imports.push(import);
                    }
                }
                _ => {}
            }
        }

        for call in descendants_of_kind(root, "call_expression") {
            if let Some(import) = self.check_require_call(&call, src) {
                imports.push(import);
            }
        }

        imports.sort_by_key(|import| import.line);
        imports
    }

    fn process_import(&self, node: &TSNode, src: &Source) -> Option<ImportRef> {
        let line = node.start_position().row + 1;

        // TypeScript `import x = require("y")`.
        if let Some(clause) = find_child_by_kind(node, "import_require_clause") {
            let source = field_text(&clause, "source", src.bytes)?;
            let mut import = ImportRef::new(ImportKind::Plain, unquote(source), line);
            if let Some(binding) = find_child_by_kind(&clause, "identifier") {
                import = import.with_names(vec![src.text(&binding).to_string()]);
            }
            return Some(import);
        }

        let source = unquote(field_text(node, "source", src.bytes)?);
        let Some(clause) = find_child_by_kind(node, "import_clause") else {
            return Some(ImportRef::new(ImportKind::SideEffect, source, line));
        };

        let mut names = Vec::new();
        let mut aliases = Vec::new();
        let mut namespace = None;
        for part in named_children(&clause) {
            match part.kind() {
                "identifier" => names.push(src.text(&part).to_string()),
                "namespace_import" => {
                    namespace = find_child_by_kind(&part, "identifier")
                        .map(|ident| src.text(&ident).to_string());
                }
                "named_imports" => {
                    for specifier in named_children(&part) {
                        if specifier.kind() != "import_specifier" {
                            continue;
                        }
                        if let Some(name) = field_text(&specifier, "name", src.bytes) {
                            names.push(unquote(name).to_string());
                        }
                        if let Some(alias) = field_text(&specifier, "alias", src.bytes) {
                            aliases.push(alias.to_string());
                        }
                    }
                }
                _ => {}
            }
        }

        let import = if let Some(namespace) = namespace {
            ImportRef::new(ImportKind::Namespace, source, line)
                .with_names(names)
                .with_alias(namespace)
        } else if aliases.is_empty() {
            ImportRef::new(ImportKind::Plain, source, line).with_names(names)
        } else {
            let mut import = ImportRef::new(ImportKind::Aliased, source, line).with_names(names);
            if let [alias] = aliases.as_slice() {
                import = import.with_alias(alias.clone());
            }
            import
        };
        Some(import)
    }

    /// `export * from "m"` and `export { a } from "m"`.
    fn process_reexport(&self, node: &TSNode, src: &Source) -> Option<ImportRef> {
        let source = unquote(field_text(node, "source", src.bytes)?);
        let line = node.start_position().row + 1;

        let Some(clause) = find_child_by_kind(node, "export_clause") else {
            return Some(ImportRef::new(ImportKind::Namespace, source, line));
        };
        let names = named_children(&clause)
            .iter()
            .filter(|spec| spec.kind() == "export_specifier")
            .filter_map(|spec| field_text(spec, "name", src.bytes))
            .map(|name| unquote(name).to_string())
            .collect();
        Some(ImportRef::new(ImportKind::Plain, source, line).with_names(names))
    }

    /// `const x = require("m")` binds, a bare `require("m");` is a side effect.
    fn check_require_call(&self, call: &TSNode, src: &Source) -> Option<ImportRef> {
        let function = call.child_by_field_name("function")?;
        if function.kind() != "identifier" || src.text(&function) != "require" {
            return None;
        }
        let arguments = call.child_by_field_name("arguments")?;
        let first = arguments.named_child(0)?;
        if first.kind() != "string" {
            return None;
        }
        let target = unquote(src.text(&first));
        let line = call.start_position().row + 1;

        let parent = call.parent();
        match parent.map(|p| p.kind()) {
            Some("expression_statement") => {
                Some(ImportRef::new(ImportKind::SideEffect, target, line))
            }
            Some("variable_declarator") => {
                let mut import = ImportRef::new(ImportKind::Plain, target, line);
                if let Some(name) = parent.and_then(|p| field_text(&p, "name", src.bytes)) {
                    import = import.with_names(vec![squash_whitespace(name)]);
                }
                Some(import)
            }
            _ => Some(ImportRef::new(ImportKind::Plain, target, line)),
        }
    }

    fn process_function(&self, outer: &TSNode, func_node: &TSNode, src: &Source) -> Option<FunctionFact> {
        let name = field_text(func_node, "name", src.bytes)?;
        let decorators = decorator_nodes(func_node, Some(outer));
        Some(FunctionFact {
            name: name.to_string(),
            params: parameters(func_node, src),
            return_type: annotation(func_node, "return_type", src),
            doc: preceding_doc(&src.lines, anchor_row(outer, &decorators), C_COMMENTS),
            decorators: decorator_names(&decorators, src),
            is_async: has_token(func_node, "async"),
            span: line_span(func_node),
        })
    }

    /// `const name = (a, b) => ...` and `const name = function (...) {...}`.
    fn process_bound_function(
        &self,
        outer: &TSNode,
        declarator: &TSNode,
        value: &TSNode,
        src: &Source,
    ) -> Option<FunctionFact> {
        let name_node = declarator.child_by_field_name("name")?;
        if name_node.kind() != "identifier" {
            return None;
        }
        Some(FunctionFact {
            name: src.text(&name_node).to_string(),
            params: parameters(value, src),
            return_type: annotation(value, "return_type", src),
            doc: preceding_doc(&src.lines, outer.start_position().row, C_COMMENTS),
            decorators: Vec::new(),
            is_async: has_token(value, "async"),
            span: line_span(declarator),
        })
    }

    fn process_class(&self, outer: &TSNode, class_node: &TSNode, src: &Source) -> Option<ClassFact> {
        let name = field_text(class_node, "name", src.bytes)?;

        let mut bases = Vec::new();
        let mut implements = Vec::new();
        if let Some(heritage) = find_child_by_kind(class_node, "class_heritage") {
            for clause in named_children(&heritage) {
                match clause.kind() {
                    "extends_clause" => bases.extend(
                        named_children(&clause)
                            .iter()
                            .filter(|n| n.kind() != "type_arguments")
                            .map(|n| squash_whitespace(src.text(n))),
                    ),
                    "implements_clause" => implements.extend(
                        named_children(&clause)
                            .iter()
                            .map(|n| squash_whitespace(src.text(n))),
                    ),
                    _ => bases.push(squash_whitespace(src.text(&clause))),
                }
            }
        }

        let mut methods = Vec::new();
        let mut fields = Vec::new();
        if let Some(body) = class_node.child_by_field_name("body") {
            for member in named_children(&body) {
                match member.kind() {
                    "method_definition" => {
                        if let Some(method) = self.process_method(&member, src) {
                            methods.push(method);
                        }
                    }
                    "field_definition" | "public_field_definition" => {
                        let name = member
                            .child_by_field_name("property")
                            .or_else(|| member.child_by_field_name("name"));
                        if let Some(name) = name {
                            fields.push(FieldFact {
                                name: src.text(&name).to_string(),
                                type_hint: annotation(&member, "type", src),
                                line: member.start_position().row + 1,
                            });
                        }
                    }
                    _ => {}
                }
            }
        }

        let decorators = decorator_nodes(class_node, Some(outer));
        Some(ClassFact {
            name: name.to_string(),
            bases,
            implements,
            methods,
            fields,
            decorators: decorator_names(&decorators, src),
            doc: preceding_doc(&src.lines, anchor_row(outer, &decorators), C_COMMENTS),
            span: line_span(class_node),
        })
    }

    fn process_method(&self, method_node: &TSNode, src: &Source) -> Option<FunctionFact> {
        let name = field_text(method_node, "name", src.bytes)?;
        let decorators = decorator_nodes(method_node, None);
        Some(FunctionFact {
            name: name.to_string(),
            params: parameters(method_node, src),
            return_type: annotation(method_node, "return_type", src),
            doc: preceding_doc(&src.lines, anchor_row(method_node, &decorators), C_COMMENTS),
            decorators: decorator_names(&decorators, src),
            is_async: has_token(method_node, "async"),
            span: line_span(method_node),
        })
    }
}

fn decorator_names(decorators: &[TSNode], src: &Source) -> Vec<String> {
    decorators
        .iter()
        .map(|decorator| decorator_name(src.text(decorator)))
        .collect()
}

fn has_token(node: &TSNode, token: &str) -> bool {
    let mut cursor = node.walk();
    let found = node.children(&mut cursor).any(|child| child.kind() == token);
    found
}

/// Parameter names of a function-like node (`parameters` list or the
/// single bare `parameter` of an arrow function).
pub(crate) fn parameters(func_node: &TSNode, src: &Source) -> Vec<Parameter> {
    if let Some(single) = func_node.child_by_field_name("parameter") {
        return vec![Parameter::named(src.text(&single))];
    }
    let Some(list) = func_node.child_by_field_name("parameters") else {
        return Vec::new();
    };
    named_children(&list)
        .iter()
        .filter_map(|param| parameter(param, src))
        .collect()
}

fn parameter(param: &TSNode, src: &Source) -> Option<Parameter> {
    let name = match param.kind() {
        "identifier" | "rest_pattern" | "object_pattern" | "array_pattern" => *param,
        "assignment_pattern" => param.child_by_field_name("left")?,
        "required_parameter" | "optional_parameter" => param.child_by_field_name("pattern")?,
        _ => return None,
    };
    Some(Parameter {
        name: squash_whitespace(src.text(&name)),
        type_hint: annotation(param, "type", src),
    })
}

/// Text of a `: T` annotation stored under `field`, without the colon.
/// Plain JavaScript trees never carry these fields.
pub(crate) fn annotation(node: &TSNode, field: &str, src: &Source) -> Option<String> {
    let text = field_text(node, field, src.bytes)?;
    let text = squash_whitespace(text.trim_start().trim_start_matches(':'));
    (!text.is_empty()).then_some(text)
}

/// Top-level functions named like a component whose first parameter is
/// `props` or a destructuring pattern, in files that import React.
fn react_components(root: &TSNode, record: &FactRecord, src: &Source) -> Vec<ComponentFact> {
    if !record.imports.iter().any(|import| import.target == "react") {
        return Vec::new();
    }
    let mut prop_types = prop_type_assignments(root, src);
    record
        .functions
        .iter()
        .filter(|function| function.name.starts_with(|c: char| c.is_ascii_uppercase()))
        .filter(|function| {
            function
                .params
                .first()
                .is_some_and(|param| param.name == "props" || param.name.starts_with('{'))
        })
        .map(|function| ComponentFact {
            name: function.name.clone(),
            line: function.span.start,
            doc: function.doc.clone(),
            prop_types: prop_types.remove(&function.name).unwrap_or_default(),
        })
        .collect()
}

/// `Name.propTypes = { a: ..., b: ... }` statements, keyed by `Name`.
fn prop_type_assignments(root: &TSNode, src: &Source) -> HashMap<String, Vec<String>> {
    let mut found = HashMap::new();
    for statement in named_children(root) {
        if statement.kind() != "expression_statement" {
            continue;
        }
        let Some(assignment) = statement.named_child(0) else {
            continue;
        };
        if assignment.kind() != "assignment_expression" {
            continue;
        }
        let (Some(left), Some(right)) = (
            assignment.child_by_field_name("left"),
            assignment.child_by_field_name("right"),
        ) else {
            continue;
        };
        if left.kind() != "member_expression" || right.kind() != "object" {
            continue;
        }
        if field_text(&left, "property", src.bytes) != Some("propTypes") {
            continue;
        }
        let Some(component) = field_text(&left, "object", src.bytes) else {
            continue;
        };
        let keys = named_children(&right)
            .iter()
            .filter_map(|entry| match entry.kind() {
                "pair" => field_text(entry, "key", src.bytes).map(|key| unquote(key).to_string()),
                "shorthand_property_identifier" => Some(src.text(entry).to_string()),
                _ => None,
            })
            .collect();
        found.insert(component.to_string(), keys);
    }
    found
}

/// A leading `/** ... */` block at the top of the file.
fn module_doc(root: &TSNode, src: &Source) -> Option<String> {
    let first = root.named_child(0)?;
    if first.kind() != "comment" {
        return None;
    }
    let text = src.text(&first).trim();
    if !text.starts_with("/**") {
        return None;
    }
    let end_row = first.end_position().row;
    preceding_doc(&src.lines, end_row + 1, C_COMMENTS)
}

impl LanguageAdapter for JavaScriptAdapter {
    fn language_name(&self) -> &str {
        "javascript"
    }

    fn extract(&self, source: &str) -> Result<FactRecord, ParseFailure> {
        let tree = parse_source_tolerant(tree_sitter_javascript::language(), source)?;
        let src = Source::new(source);
        Ok(self.collect_facts(&tree.root_node(), &src, "javascript"))
    }

    fn is_entry_point(&self, file_name: &str) -> bool {
        ENTRY_POINTS.contains(&file_name)
    }

    fn module_syntax(&self) -> ModuleSyntax {
        ModuleSyntax::Slashed
    }
}

impl Default for JavaScriptAdapter {
    fn default() -> Self {
        Self::new()
    }
}
