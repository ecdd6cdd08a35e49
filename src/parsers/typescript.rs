use tree_sitter::Node as TSNode;

use super::common::{
    field_text, line_span, named_children, parse_source, parse_source_tolerant, squash_whitespace,
};
use super::docs::{preceding_doc, C_COMMENTS};
use super::javascript::{
    annotation, decorator_nodes, top_level_declarations, JavaScriptAdapter, Source,
};
use super::{LanguageAdapter, ModuleSyntax};
use crate::core::{
    DecoratedKind, DecoratedTarget, DecoratorFact, FactRecord, InterfaceFact, ParseFailure,
    PropertyFact, TypeAliasFact,
};

const ENTRY_POINTS: &[&str] = &["index.ts", "index.tsx"];

/// TypeScript extraction: everything the JavaScript baseline reports
/// (with parameter, return and field types filled in from annotations),
/// plus interfaces, type aliases and decorator metadata.
pub struct TypeScriptAdapter {
    baseline: JavaScriptAdapter,
}

impl TypeScriptAdapter {
    pub fn new() -> Self {
        Self {
            baseline: JavaScriptAdapter::new(),
        }
    }

    fn extract_interfaces(&self, root: &TSNode, src: &Source) -> Vec<InterfaceFact> {
        top_level_declarations(root)
            .into_iter()
            .filter(|decl| decl.node.kind() == "interface_declaration")
            .filter_map(|decl| self.process_interface(&decl.outer, &decl.node, src))
            .collect()
    }

    fn process_interface(&self, outer: &TSNode, node: &TSNode, src: &Source) -> Option<InterfaceFact> {
        let name = field_text(node, "name", src.bytes)?;

        // `extends_type_clause` in current grammars, `extends_clause` in older ones.
        let extends = named_children(node)
            .iter()
            .filter(|child| child.kind().starts_with("extends"))
            .flat_map(|clause| named_children(clause))
            .map(|parent| squash_whitespace(src.text(&parent)))
            .collect();

        let properties = node
            .child_by_field_name("body")
            .map(|body| {
                named_children(&body)
                    .iter()
                    .filter(|member| member.kind() == "property_signature")
                    .filter_map(|member| property(member, src))
                    .collect()
            })
            .unwrap_or_default();

        Some(InterfaceFact {
            name: name.to_string(),
            extends,
            properties,
            doc: preceding_doc(&src.lines, outer.start_position().row, C_COMMENTS),
            span: line_span(node),
        })
    }

    fn extract_type_aliases(&self, root: &TSNode, src: &Source) -> Vec<TypeAliasFact> {
        top_level_declarations(root)
            .into_iter()
            .filter(|decl| decl.node.kind() == "type_alias_declaration")
            .filter_map(|decl| {
                let name = field_text(&decl.node, "name", src.bytes)?;
                let definition = field_text(&decl.node, "value", src.bytes)?;
                Some(TypeAliasFact {
                    name: name.to_string(),
                    definition: squash_whitespace(definition),
                    doc: preceding_doc(&src.lines, decl.outer.start_position().row, C_COMMENTS),
                    span: line_span(&decl.node),
                })
            })
            .collect()
    }

    /// Every decorator on a top-level class or its members, tagged with
    /// what it decorates.
    fn extract_decorators(&self, root: &TSNode, src: &Source) -> Vec<DecoratorFact> {
        let mut decorators = Vec::new();

        for decl in top_level_declarations(root) {
            if !matches!(
                decl.node.kind(),
                "class_declaration" | "abstract_class_declaration"
            ) {
                continue;
            }
            let class_name = field_text(&decl.node, "name", src.bytes).unwrap_or_default();
            for decorator in decorator_nodes(&decl.node, Some(&decl.outer)) {
                decorators.push(decorator_fact(
                    &decorator,
                    DecoratedKind::Class,
                    class_name,
                    src,
                ));
            }

            let Some(body) = decl.node.child_by_field_name("body") else {
                continue;
            };
            for member in named_children(&body) {
                let (kind, name_field) = match member.kind() {
                    "method_definition" | "abstract_method_signature" => {
                        (DecoratedKind::Method, "name")
                    }
                    "public_field_definition" => (DecoratedKind::Property, "name"),
                    _ => continue,
                };
                let member_name = field_text(&member, name_field, src.bytes).unwrap_or_default();
                for decorator in decorator_nodes(&member, None) {
                    decorators.push(decorator_fact(&decorator, kind, member_name, src));
                }
            }
        }

        decorators.sort_by_key(|decorator| decorator.line);
        decorators
    }
}

fn property(member: &TSNode, src: &Source) -> Option<PropertyFact> {
    let name = field_text(member, "name", src.bytes)?;
    let mut cursor = member.walk();
    let optional = member.children(&mut cursor).any(|child| child.kind() == "?");
    Some(PropertyFact {
        name: name.to_string(),
        type_hint: annotation(member, "type", src),
        optional,
        line: member.start_position().row + 1,
    })
}

fn decorator_fact(decorator: &TSNode, kind: DecoratedKind, target: &str, src: &Source) -> DecoratorFact {
    let expression = decorator.named_child(0);
    let (name, arguments) = match expression {
        Some(call) if call.kind() == "call_expression" => {
            let name = field_text(&call, "function", src.bytes).unwrap_or_default();
            let arguments = field_text(&call, "arguments", src.bytes).map(|args| {
                let inner = args.trim();
                let inner = inner.strip_prefix('(').unwrap_or(inner);
                let inner = inner.strip_suffix(')').unwrap_or(inner);
                squash_whitespace(inner)
            });
            (squash_whitespace(name), arguments)
        }
        Some(other) => (squash_whitespace(src.text(&other)), None),
        None => (String::new(), None),
    };

    DecoratorFact {
        name,
        arguments,
        line: decorator.start_position().row + 1,
        target: (!target.is_empty()).then(|| DecoratedTarget {
            kind,
            name: target.to_string(),
        }),
    }
}

impl LanguageAdapter for TypeScriptAdapter {
    fn language_name(&self) -> &str {
        "typescript"
    }

    fn extract(&self, source: &str) -> Result<FactRecord, ParseFailure> {
        // JSX in a `.ts` file is a syntax error, in `.tsx` it is not. A clean
        // parse under either grammar wins over a tolerated partial one.
        let typescript = tree_sitter_typescript::language_typescript();
        let tsx = tree_sitter_typescript::language_tsx();
        let tree = parse_source(typescript, source)
            .or_else(|_| parse_source(tsx, source))
            .or_else(|_| parse_source_tolerant(typescript, source))
            .or_else(|_| parse_source_tolerant(tsx, source))?;
        let root = tree.root_node();
        let src = Source::new(source);

        let mut record = self.baseline.collect_facts(&root, &src, "typescript");
        record.interfaces = self.extract_interfaces(&root, &src);
        record.type_aliases = self.extract_type_aliases(&root, &src);
        record.decorators = self.extract_decorators(&root, &src);
        Ok(record)
    }

    fn is_entry_point(&self, file_name: &str) -> bool {
        ENTRY_POINTS.contains(&file_name)
    }

    fn module_syntax(&self) -> ModuleSyntax {
        ModuleSyntax::Slashed
    }
}

impl Default for TypeScriptAdapter {
    fn default() -> Self {
        Self::new()
    }
}
