//! Integration Test: Separation of Concerns
//!
//! - The core has no terminal UI dependencies (manifest or source)
//! - The view renders published records; it never merges enrichments itself
//! - The view never reaches into the gateway or backend

use std::fs;

use architectural_enforcement::{rust_sources, violation, workspace_root};

const UI_CRATES: [&str; 2] = ["ratatui", "crossterm"];

#[test]
fn test_core_manifest_has_no_ui_crates() {
    let manifest = fs::read_to_string(workspace_root().join("conductor/core/Cargo.toml"))
        .expect("core manifest readable");

    for krate in UI_CRATES {
        let declared = manifest
            .lines()
            .map(str::trim_start)
            .any(|line| line.starts_with(krate));
        assert!(!declared, "atelier-core must not depend on {krate}");
    }
}

#[test]
fn test_core_source_has_no_ui_imports() {
    let mut violations = Vec::new();
    for file in rust_sources("conductor/core/src") {
        for (line, code) in file.code_lines() {
            for krate in UI_CRATES {
                if code.contains(&format!("{krate}::")) {
                    violations.push(violation(&file, line, krate));
                }
            }
        }
    }
    assert!(violations.is_empty(), "{violations:#?}");
}

#[test]
fn test_view_never_merges_records() {
    let mut violations = Vec::new();
    for file in rust_sources("tui/src") {
        for (line, code) in file.code_lines() {
            if code.contains(".merged(") || code.contains("Completion::") {
                violations.push(violation(&file, line, "record merging belongs to the conductor"));
            }
        }
    }
    assert!(violations.is_empty(), "{violations:#?}");
}

#[test]
fn test_view_does_not_call_capabilities() {
    let forbidden = [
        "synthesize_concept(",
        "synthesize_illustration(",
        "find_leads(",
        "synthesize_mood_board(",
        ".generate(",
    ];
    let mut violations = Vec::new();
    for file in rust_sources("tui/src") {
        for (line, code) in file.code_lines() {
            for call in forbidden {
                if code.contains(call) {
                    violations.push(violation(&file, line, call));
                }
            }
        }
    }
    assert!(violations.is_empty(), "{violations:#?}");
}
