use repofacts::core::scanner::{language_for_path, relative_path, FileScanner};
use repofacts::core::AnalysisConfig;
use std::fs;
use std::path::Path;

fn touch<P: AsRef<Path>>(p: P) {
    fs::write(p, "// test").unwrap();
}

fn languages(list: &[&str]) -> Vec<String> {
    list.iter().map(|l| l.to_string()).collect()
}

#[test]
fn scanner_filters_by_language_extensions() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("a")).unwrap();
    fs::create_dir_all(root.join("b")).unwrap();

    touch(root.join("a/lib.rs"));
    touch(root.join("a/main.py"));
    touch(root.join("a/types.pyi"));
    touch(root.join("b/app.js"));
    touch(root.join("b/view.tsx"));
    touch(root.join("b/readme.txt"));

    let scanner = FileScanner::new();
    let files = scanner
        .scan_directory(root, &languages(&["python", "javascript"]))
        .unwrap();

    let found: Vec<(&str, &str)> = files
        .iter()
        .map(|f| (f.path.as_str(), f.language.as_str()))
        .collect();
    assert_eq!(
        found,
        vec![
            ("a/main.py", "python"),
            ("a/types.pyi", "python"),
            ("b/app.js", "javascript"),
        ]
    );
}

#[test]
fn scanner_prunes_skip_dirs_and_oversized_files() {
    let dir = tempfile::TempDir::new().unwrap();
    let root = dir.path();
    fs::create_dir_all(root.join("node_modules/pkg")).unwrap();
    fs::create_dir_all(root.join("src/__pycache__")).unwrap();
    fs::create_dir_all(root.join("src/big")).unwrap();

    touch(root.join("node_modules/pkg/index.js"));
    touch(root.join("src/__pycache__/mod.py"));
    touch(root.join("src/mod.py"));
    fs::write(root.join("src/big/huge.py"), "x = 1\n".repeat(100)).unwrap();

    let mut config = AnalysisConfig::default();
    config.max_file_size = 64;
    let scanner = FileScanner::from_config(&config);
    let files = scanner.scan_directory(root, &config.languages).unwrap();

    let paths: Vec<&str> = files.iter().map(|f| f.path.as_str()).collect();
    assert_eq!(paths, vec!["src/mod.py"]);
    assert_eq!(files[0].size, 7);
}

#[test]
fn scanner_accepts_short_language_names() {
    let dir = tempfile::TempDir::new().unwrap();
    touch(dir.path().join("a.ts"));
    touch(dir.path().join("b.py"));

    let files = FileScanner::new()
        .scan_directory(dir.path(), &languages(&["ts"]))
        .unwrap();
    assert_eq!(files.len(), 1);
    assert_eq!(files[0].language, "typescript");
}

#[test]
fn scanner_rejects_missing_root() {
    let dir = tempfile::TempDir::new().unwrap();
    let missing = dir.path().join("nope");
    assert!(FileScanner::new()
        .scan_directory(&missing, &languages(&["python"]))
        .is_err());
}

#[test]
fn path_helpers() {
    assert_eq!(language_for_path("x/y.mjs"), Some("javascript"));
    assert_eq!(language_for_path("x/y.pyx"), Some("python"));
    assert_eq!(language_for_path("x/y.rs"), None);
    assert_eq!(
        relative_path(Path::new("/repo"), Path::new("/repo/src/a.py")).as_deref(),
        Some("src/a.py")
    );
    assert_eq!(relative_path(Path::new("/repo"), Path::new("/other/a.py")), None);
}
