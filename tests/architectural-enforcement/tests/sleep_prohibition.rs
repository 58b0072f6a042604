//! Integration Test: Sleep Prohibition
//!
//! **Policy**: Production code in the TUI and the core MUST NOT block a thread
//! with `std::thread::sleep`. The core must not sleep at all: every wait is a
//! wait on a completion.
//! **Exceptions**: Frame rate limiting in `tui/src/app.rs`, test code.

use architectural_enforcement::{rust_sources, violation};

#[test]
fn test_no_thread_sleep_in_production_code() {
    let mut violations = Vec::new();
    for dir in ["conductor/core/src", "tui/src"] {
        for file in rust_sources(dir) {
            for (line, code) in file.code_lines() {
                if code.contains("thread::sleep(") {
                    violations.push(violation(&file, line, "std::thread::sleep"));
                }
            }
        }
    }

    if !violations.is_empty() {
        for v in &violations {
            eprintln!("  ❌ {v}");
        }
        panic!("Found {} blocking sleep(s) in production code", violations.len());
    }
}

#[test]
fn test_core_never_sleeps() {
    let mut violations = Vec::new();
    for file in rust_sources("conductor/core/src") {
        for (line, code) in file.code_lines() {
            if code.contains("::sleep(") || code.contains(".sleep(") {
                violations.push(violation(&file, line, "sleep in the core"));
            }
        }
    }

    if !violations.is_empty() {
        for v in &violations {
            eprintln!("  ❌ {v}");
        }
        eprintln!("\n✅ Wait on a completion channel instead of sleeping.");
        panic!("Found {} sleep call(s) in the core", violations.len());
    }
}

#[test]
fn test_tui_sleeps_only_for_frame_limiting() {
    let mut violations = Vec::new();
    for file in rust_sources("tui/src") {
        let frame_limited = file.path.ends_with("tui/src/app.rs");
        for (line, code) in file.code_lines() {
            let sleeps = code.contains("::sleep(") || code.contains(".sleep(");
            let framed = frame_limited && code.contains("FRAME_DURATION");
            if sleeps && !framed {
                violations.push(violation(&file, line, "sleep outside frame limiting"));
            }
        }
    }

    assert!(violations.is_empty(), "{violations:#?}");
}
