use repofacts::core::{AnalysisConfig, CodebaseAnalyzer, FileRecord, VisualLevel};
use std::collections::HashMap;
use std::fs;
use std::path::Path;

fn write(root: &Path, rel: &str, content: &str) {
    let path = root.join(rel);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn python_project(root: &Path) {
    write(root, "shop/__init__.py", "\"\"\"Shop package.\"\"\"\nfrom .orders import place\n");
    write(
        root,
        "shop/orders.py",
        "\"\"\"Order handling.\"\"\"\nfrom .inventory import reserve\nfrom . import billing\n\ndef place(item):\n    return reserve(item)\n",
    );
    write(
        root,
        "shop/inventory.py",
        "import logging\nfrom shop.orders import place\n\ndef reserve(item):\n    return item\n",
    );
    write(root, "shop/billing.py", "import requests\n\nclass Invoice:\n    pass\n");
    write(root, "main.py", "import shop\nfrom shop import orders\n");
    write(root, "broken.py", "def broken(:\n    pass\n");
    write(root, "notes/readme.md", "# not code\n");
}

#[test]
fn analyzer_end_to_end_on_python_tree() {
    let dir = tempfile::TempDir::new().unwrap();
    python_project(dir.path());

    let analyzer = CodebaseAnalyzer::new();
    let analysis = analyzer.analyze(dir.path()).unwrap();

    let paths: Vec<&str> = analysis.files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(
        paths,
        vec![
            "broken.py",
            "main.py",
            "shop/__init__.py",
            "shop/billing.py",
            "shop/inventory.py",
            "shop/orders.py",
        ]
    );

    // Every scanned file has facts; the broken one carries its failure.
    assert_eq!(analysis.facts.len(), 6);
    let failures: Vec<&str> = analysis.parse_failures().map(|(p, _)| p).collect();
    assert_eq!(failures, vec!["broken.py"]);
    assert!(analysis.unreadable.is_empty());

    let graph = &analysis.graph;
    assert!(graph.has_edge("shop/__init__.py", "shop/orders.py"));
    assert!(graph.has_edge("shop/orders.py", "shop/inventory.py"));
    assert!(graph.has_edge("shop/orders.py", "shop/billing.py"));
    assert!(graph.has_edge("shop/inventory.py", "shop/orders.py"));
    assert!(graph.has_edge("main.py", "shop/__init__.py"));
    assert!(!graph.has_edge("shop/inventory.py", "shop/inventory.py"));

    assert_eq!(
        analysis.cycles.cycles,
        vec![vec![
            "shop/inventory.py".to_string(),
            "shop/orders.py".to_string(),
            "shop/inventory.py".to_string(),
        ]]
    );

    assert_eq!(analysis.metrics.total_files, 6);
    assert_eq!(analysis.metrics.isolated_files, 1);
    assert_eq!(analysis.visualization.level, VisualLevel::File);
    assert_eq!(analysis.resolution.unresolved, 2);
}

#[test]
fn key_modules_respect_configured_threshold() {
    let dir = tempfile::TempDir::new().unwrap();
    python_project(dir.path());

    let config = AnalysisConfig::default()
        .with_key_module_threshold(2)
        .with_parallel(false);
    let analysis = CodebaseAnalyzer::with_config(config)
        .unwrap()
        .analyze(dir.path())
        .unwrap();

    let keys: Vec<(&str, usize)> = analysis
        .key_modules
        .iter()
        .map(|k| (k.path.as_str(), k.dependents))
        .collect();
    assert_eq!(keys, vec![("shop/orders.py", 2)]);
    assert_eq!(
        analysis.key_modules[0].description.as_deref(),
        Some("Order handling.")
    );
}

#[test]
fn analyze_sources_runs_in_memory() {
    let files = vec![
        FileRecord::new("web/index.ts", "typescript", 0),
        FileRecord::new("web/api.ts", "typescript", 0),
        FileRecord::new("web/legacy.js", "javascript", 0),
        FileRecord::new("web/ghost.ts", "typescript", 0),
    ];
    let mut sources = HashMap::new();
    sources.insert(
        "web/index.ts".to_string(),
        "import { get } from './api';\nimport './legacy';\nimport React from 'react';\n".to_string(),
    );
    sources.insert(
        "web/api.ts".to_string(),
        "export function get(url: string): Promise<Response> {\n  return fetch(url);\n}\n".to_string(),
    );
    sources.insert(
        "web/legacy.js".to_string(),
        "const api = require('./api.js');\nmodule.exports = api;\n".to_string(),
    );

    let analysis = CodebaseAnalyzer::new()
        .analyze_sources(files, &sources)
        .unwrap();

    assert_eq!(analysis.unreadable.len(), 1);
    assert_eq!(analysis.unreadable[0].path, "web/ghost.ts");
    assert_eq!(analysis.facts.len(), 3);

    let deps: Vec<&str> = analysis.graph.dependencies("web/index.ts").collect();
    assert_eq!(deps, vec!["web/api.ts", "web/legacy.js"]);
    assert!(analysis.graph.has_edge("web/legacy.js", "web/api.ts"));
    assert_eq!(analysis.resolution.unresolved, 1);

    let api = analysis.facts["web/api.ts"].record().unwrap();
    assert_eq!(api.functions[0].return_type.as_deref(), Some("Promise<Response>"));
}

#[test]
fn large_trees_collapse_the_visualization() {
    let files: Vec<FileRecord> = (0..60)
        .map(|i| FileRecord::new(format!("d{}/m{i}.py", i % 4), "python", 0))
        .collect();
    let sources: HashMap<String, String> = files
        .iter()
        .map(|f| {
            let text = if f.path.starts_with("d0/") {
                "import m1\n".to_string()
            } else {
                String::new()
            };
            (f.path.clone(), text)
        })
        .collect();

    let analysis = CodebaseAnalyzer::new().analyze_sources(files, &sources).unwrap();
    assert_eq!(analysis.visualization.level, VisualLevel::Directory);
    assert_eq!(analysis.visualization.nodes.len(), 4);
    let edges: Vec<(&str, &str)> = analysis
        .visualization
        .edges
        .iter()
        .map(|e| (e.source.as_str(), e.target.as_str()))
        .collect();
    assert_eq!(edges, vec![("d0", "d1")]);
}
