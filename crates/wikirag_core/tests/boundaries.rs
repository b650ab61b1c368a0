use std::fs;
use std::path::{Path, PathBuf};

fn collect_rs_files(root: &Path) -> Vec<PathBuf> {
    let mut out = Vec::new();
    let mut stack = vec![root.to_path_buf()];
    while let Some(p) = stack.pop() {
        let entries = match fs::read_dir(&p) {
            Ok(e) => e,
            Err(_) => continue,
        };
        for ent in entries.flatten() {
            let path = ent.path();
            if path.is_dir() {
                stack.push(path);
            } else if path.extension().and_then(|s| s.to_str()) == Some("rs") {
                out.push(path);
            }
        }
    }
    out.sort();
    out
}

#[test]
fn wikirag_core_stays_free_of_network_and_model_code() {
    // Guardrail: chunking, ranking inputs and config must be testable offline.
    // HTTP clients and capability adapters belong in wikirag_ai.
    let src_root = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("src");
    let files = collect_rs_files(&src_root);
    assert!(!files.is_empty());

    for f in files {
        let text = fs::read_to_string(&f).unwrap_or_default();
        for forbidden in ["ureq::", "wikirag_ai", "std::net", "std::process"] {
            assert!(
                !text.contains(forbidden),
                "forbidden dependency `{forbidden}` found in {}",
                f.display()
            );
        }
    }
}
