use repofacts::core::resolver::{is_external, relative_base};
use repofacts::core::{FileRecord, ImportResolver, ModuleIndex, Resolution};
use repofacts::parsers::AdapterRegistry;

fn files() -> Vec<FileRecord> {
    [
        ("app/__init__.py", "python"),
        ("app/models.py", "python"),
        ("app/services/__init__.py", "python"),
        ("app/services/billing.py", "python"),
        ("app/services/logging.py", "python"),
        ("app/core/db.py", "python"),
        ("web/src/index.ts", "typescript"),
        ("web/src/api/client.ts", "typescript"),
        ("web/src/api/index.ts", "typescript"),
        ("web/src/components/Button.tsx", "typescript"),
        ("web/src/lib/format.js", "javascript"),
        ("web/src/main.ts", "typescript"),
    ]
    .iter()
    .map(|(path, language)| FileRecord::new(*path, *language, 1))
    .collect()
}

fn find<'a>(files: &'a [FileRecord], path: &str) -> &'a FileRecord {
    files.iter().find(|f| f.path == path).unwrap()
}

fn resolved(path: &str) -> Resolution {
    Resolution::Resolved(path.to_string())
}

#[test]
fn python_relative_imports_walk_up_per_extra_dot() {
    let files = files();
    let registry = AdapterRegistry::new();
    let index = ModuleIndex::build(&files, &registry);
    let resolver = ImportResolver::new(&index, &registry);
    let billing = find(&files, "app/services/billing.py");

    assert_eq!(resolver.resolve(billing, ".logging"), resolved("app/services/logging.py"));
    assert_eq!(resolver.resolve(billing, "..models"), resolved("app/models.py"));
    assert_eq!(resolver.resolve(billing, "..core.db"), resolved("app/core/db.py"));
    assert_eq!(resolver.resolve(billing, "..services"), resolved("app/services/__init__.py"));
    assert_eq!(resolver.resolve(billing, ".missing"), Resolution::Unresolved);
}

#[test]
fn python_absolute_imports_use_names_then_anchored_paths() {
    let files = files();
    let registry = AdapterRegistry::new();
    let index = ModuleIndex::build(&files, &registry);
    let resolver = ImportResolver::new(&index, &registry);
    let models = find(&files, "app/models.py");

    assert_eq!(resolver.resolve(models, "billing"), resolved("app/services/billing.py"));
    assert_eq!(resolver.resolve(models, "app.core.db"), resolved("app/core/db.py"));
    assert_eq!(resolver.resolve(models, "app.services.billing"), resolved("app/services/billing.py"));
    assert_eq!(resolver.resolve(models, "app"), resolved("app/__init__.py"));
    assert_eq!(resolver.resolve(models, "requests"), Resolution::Unresolved);
}

#[test]
fn slash_relative_imports_resolve_files_and_packages() {
    let files = files();
    let registry = AdapterRegistry::new();
    let index = ModuleIndex::build(&files, &registry);
    let resolver = ImportResolver::new(&index, &registry);
    let button = find(&files, "web/src/components/Button.tsx");
    let app = find(&files, "web/src/main.ts");

    assert_eq!(resolver.resolve(button, "../api/client"), resolved("web/src/api/client.ts"));
    assert_eq!(resolver.resolve(button, "../api"), resolved("web/src/api/index.ts"));
    assert_eq!(resolver.resolve(button, "../lib/format.js"), resolved("web/src/lib/format.js"));
    assert_eq!(resolver.resolve(app, "./api/client.js"), resolved("web/src/api/client.ts"));
    assert_eq!(resolver.resolve(app, "."), resolved("web/src/index.ts"));
    assert_eq!(resolver.resolve(app, "./nowhere"), Resolution::Unresolved);
}

#[test]
fn external_tokens_are_never_looked_up() {
    let files = files();
    let registry = AdapterRegistry::new();
    let index = ModuleIndex::build(&files, &registry);
    let resolver = ImportResolver::new(&index, &registry);
    let app = find(&files, "web/src/main.ts");

    assert_eq!(resolver.resolve(app, "@angular/core"), Resolution::External);
    assert_eq!(resolver.resolve(app, "https://cdn.example.com/client.js"), Resolution::External);
    assert_eq!(resolver.resolve(app, "node:fs"), Resolution::External);
    assert!(is_external("@scope/client"));
    assert!(!is_external("client"));
    assert!(!is_external("./client"));
}

#[test]
fn short_name_hit_on_the_importing_file_is_discarded() {
    let files = files();
    let registry = AdapterRegistry::new();
    let index = ModuleIndex::build(&files, &registry);
    let resolver = ImportResolver::new(&index, &registry);
    let logging = find(&files, "app/services/logging.py");

    // `import logging` inside logging.py means the standard library.
    assert_eq!(resolver.resolve(logging, "logging"), Resolution::Unresolved);
    // An explicit path to itself is a genuine self-import.
    assert_eq!(resolver.resolve(logging, ".logging"), resolved("app/services/logging.py"));
}

#[test]
fn relative_base_walks_markers_minus_one_directories() {
    let path = "a/b/c/d/file.py";
    let expected = ["a/b/c/d", "a/b/c", "a/b", "a", ""];
    for (k, dir) in expected.iter().enumerate() {
        assert_eq!(relative_base(path, k + 1), *dir, "markers = {}", k + 1);
    }
}

#[test]
fn relative_marker_count_matches_both_syntaxes() {
    use repofacts::parsers::ModuleSyntax;
    assert_eq!(ModuleSyntax::Dotted.split_relative("...pkg.mod"), Some((3, "pkg.mod")));
    assert_eq!(ModuleSyntax::Dotted.split_relative("pkg.mod"), None);
    assert_eq!(ModuleSyntax::Slashed.split_relative("./x"), Some((1, "x")));
    assert_eq!(ModuleSyntax::Slashed.split_relative("../../x/y"), Some((3, "x/y")));
    assert_eq!(ModuleSyntax::Slashed.split_relative(".."), Some((2, "")));
    assert_eq!(ModuleSyntax::Slashed.split_relative("x/y"), None);
}
