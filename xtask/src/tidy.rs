use std::{
    fs,
    path::{Path, PathBuf},
};

fn project_root() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).ancestors().nth(1).unwrap_or(Path::new(".")).to_path_buf()
}

fn rust_files(dir: &Path, acc: &mut Vec<PathBuf>) {
    let entries = match fs::read_dir(dir) {
        Ok(it) => it,
        Err(_) => return,
    };
    for entry in entries.flatten() {
        let path = entry.path();
        if path.is_dir() {
            if path.file_name().map_or(false, |it| it == "target") {
                continue;
            }
            rust_files(&path, acc);
        } else if path.extension().map_or(false, |it| it == "rs") {
            acc.push(path);
        }
    }
}

#[test]
fn whitespace() {
    let root = project_root();
    let mut files = Vec::new();
    for dir in ["src", "tests", "argtree-macros", "xtask"] {
        rust_files(&root.join(dir), &mut files);
    }

    let mut bad = Vec::new();
    for file in &files {
        let text = fs::read_to_string(file).unwrap();
        for (i, line) in text.lines().enumerate() {
            if line.ends_with(' ') || line.contains('\t') {
                bad.push(format!("{}:{}", file.strip_prefix(&root).unwrap().display(), i + 1));
            }
        }
    }
    assert!(bad.is_empty(), "trailing whitespace or tabs:\n{}", bad.join("\n"));
}
