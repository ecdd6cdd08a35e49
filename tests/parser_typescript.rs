use repofacts::core::{DecoratedKind, ImportKind};
use repofacts::parsers::typescript::TypeScriptAdapter;
use repofacts::parsers::{LanguageAdapter, ModuleSyntax};

const SAMPLE: &str = r#"import { Injectable } from '@angular/core';
import { User } from './models/user';
import fs = require('fs');

/** A user with audit fields. */
export interface AuditedUser extends User, Timestamped {
  id: number;
  nickname?: string;
}

// Identifier of a user.
export type UserId = string | number;

@Injectable({ providedIn: 'root' })
export class UserService implements Repository<User> {
  private cache: Map<UserId, User>;

  constructor(private readonly http: HttpClient) {}

  @Memoize()
  async find(id: UserId, force?: boolean): Promise<User | undefined> {
    return this.cache.get(id);
  }
}

export function toId(value: string, radix = 10): number {
  return parseInt(value, radix);
}

export const isAdmin = (user: User): boolean => user.role === 'admin';
"#;

#[test]
fn typescript_adapter_reuses_baseline_imports() {
    let record = TypeScriptAdapter::new().extract(SAMPLE).unwrap();
    assert_eq!(record.language, "typescript");

    let targets: Vec<&str> = record.imports.iter().map(|i| i.target.as_str()).collect();
    assert_eq!(targets, vec!["@angular/core", "./models/user", "fs"]);
    assert_eq!(record.imports[0].kind, ImportKind::Plain);
    assert_eq!(record.imports[0].names, vec!["Injectable"]);
    assert_eq!(record.imports[2].names, vec!["fs"]);
}

#[test]
fn typescript_adapter_extracts_interfaces_and_type_aliases() {
    let record = TypeScriptAdapter::new().extract(SAMPLE).unwrap();

    assert_eq!(record.interfaces.len(), 1);
    let interface = &record.interfaces[0];
    assert_eq!(interface.name, "AuditedUser");
    assert_eq!(interface.extends, vec!["User", "Timestamped"]);
    assert_eq!(interface.doc.as_deref(), Some("A user with audit fields."));
    assert_eq!(interface.properties.len(), 2);
    assert_eq!(interface.properties[0].name, "id");
    assert_eq!(interface.properties[0].type_hint.as_deref(), Some("number"));
    assert!(!interface.properties[0].optional);
    assert_eq!(interface.properties[1].name, "nickname");
    assert!(interface.properties[1].optional);

    assert_eq!(record.type_aliases.len(), 1);
    let alias = &record.type_aliases[0];
    assert_eq!(alias.name, "UserId");
    assert_eq!(alias.definition, "string | number");
    assert_eq!(alias.doc.as_deref(), Some("Identifier of a user."));
}

#[test]
fn typescript_adapter_layers_types_on_functions() {
    let record = TypeScriptAdapter::new().extract(SAMPLE).unwrap();
    let names: Vec<&str> = record.functions.iter().map(|f| f.name.as_str()).collect();
    assert_eq!(names, vec!["toId", "isAdmin"]);

    let to_id = &record.functions[0];
    assert_eq!(to_id.return_type.as_deref(), Some("number"));
    assert_eq!(to_id.params[0].name, "value");
    assert_eq!(to_id.params[0].type_hint.as_deref(), Some("string"));
    assert_eq!(to_id.params[1].name, "radix");
    assert!(to_id.params[1].type_hint.is_none());

    let is_admin = &record.functions[1];
    assert_eq!(is_admin.return_type.as_deref(), Some("boolean"));
    assert_eq!(is_admin.params[0].type_hint.as_deref(), Some("User"));
}

#[test]
fn typescript_adapter_extracts_classes_with_types() {
    let record = TypeScriptAdapter::new().extract(SAMPLE).unwrap();
    assert_eq!(record.classes.len(), 1);

    let class = &record.classes[0];
    assert_eq!(class.name, "UserService");
    assert!(class.bases.is_empty());
    assert_eq!(class.implements, vec!["Repository<User>"]);
    assert_eq!(class.decorators, vec!["Injectable"]);

    assert_eq!(class.fields.len(), 1);
    assert_eq!(class.fields[0].name, "cache");
    assert_eq!(class.fields[0].type_hint.as_deref(), Some("Map<UserId, User>"));

    let find = class.methods.iter().find(|m| m.name == "find").unwrap();
    assert!(find.is_async);
    assert_eq!(find.decorators, vec!["Memoize"]);
    assert_eq!(find.return_type.as_deref(), Some("Promise<User | undefined>"));
    let params: Vec<(&str, Option<&str>)> = find
        .params
        .iter()
        .map(|p| (p.name.as_str(), p.type_hint.as_deref()))
        .collect();
    assert_eq!(params, vec![("id", Some("UserId")), ("force", Some("boolean"))]);
}

#[test]
fn typescript_adapter_records_decorator_metadata() {
    let record = TypeScriptAdapter::new().extract(SAMPLE).unwrap();
    assert_eq!(record.decorators.len(), 2);

    let injectable = &record.decorators[0];
    assert_eq!(injectable.name, "Injectable");
    assert_eq!(injectable.arguments.as_deref(), Some("{ providedIn: 'root' }"));
    assert_eq!(injectable.line, 14);
    let target = injectable.target.as_ref().unwrap();
    assert_eq!(target.kind, DecoratedKind::Class);
    assert_eq!(target.name, "UserService");

    let memoize = &record.decorators[1];
    assert_eq!(memoize.name, "Memoize");
    assert_eq!(memoize.arguments.as_deref(), Some(""));
    let target = memoize.target.as_ref().unwrap();
    assert_eq!(target.kind, DecoratedKind::Method);
    assert_eq!(target.name, "find");
}

#[test]
fn typescript_adapter_falls_back_to_tsx() {
    let source = "export const App = () => <div className=\"app\">hello</div>;\n";
    let record = TypeScriptAdapter::new().extract(source).unwrap();
    assert_eq!(record.functions.len(), 1);
    assert_eq!(record.functions[0].name, "App");
}

#[test]
fn typescript_adapter_conventions() {
    let adapter = TypeScriptAdapter::new();
    assert_eq!(adapter.language_name(), "typescript");
    assert!(adapter.is_entry_point("index.ts"));
    assert!(adapter.is_entry_point("index.tsx"));
    assert!(!adapter.is_entry_point("index.js"));
    assert_eq!(adapter.module_syntax(), ModuleSyntax::Slashed);
    assert!(adapter.extract(")))\n}}}\n").is_err());
}

#[test]
fn typescript_adapter_tolerates_unsupported_member_syntax() {
    let source = r#"import { Store } from './store';
import { api } from './api';

export class Counter {
  accessor count = 0;
}

export function increment(value: number): number {
  return value + 1;
}
"#;
    let record = TypeScriptAdapter::new().extract(source).unwrap();
    let targets: Vec<&str> = record.imports.iter().map(|i| i.target.as_str()).collect();
    assert_eq!(targets, vec!["./store", "./api"]);
    let increment = record
        .functions
        .iter()
        .find(|f| f.name == "increment")
        .unwrap();
    assert_eq!(increment.return_type.as_deref(), Some("number"));
}
