//! Stamps the binary with the commit, build time and cargo profile it was
//! built from. `main` logs them at startup through `build_info()`.

use chrono::{DateTime, SecondsFormat, Utc};
use std::process::Command;

/// Run git with `args`, returning trimmed stdout on success
fn git(args: &[&str]) -> Option<String> {
    let output = Command::new("git").args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    String::from_utf8(output.stdout)
        .ok()
        .map(|out| out.trim().to_string())
}

/// Short commit hash, suffixed with `-dirty` when the tree has local edits
fn commit() -> String {
    let Some(hash) = git(&["rev-parse", "--short=8", "HEAD"]) else {
        return "unknown".to_string();
    };
    match git(&["status", "--porcelain", "--untracked-files=no"]) {
        Some(changes) if !changes.is_empty() => format!("{}-dirty", hash),
        _ => hash,
    }
}

/// SOURCE_DATE_EPOCH wins over the wall clock for reproducible builds
fn built_at() -> String {
    let pinned = std::env::var("SOURCE_DATE_EPOCH")
        .ok()
        .and_then(|secs| secs.parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0));
    pinned
        .unwrap_or_else(Utc::now)
        .to_rfc3339_opts(SecondsFormat::Secs, true)
}

fn main() {
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", commit());
    println!("cargo:rustc-env=BUILD_TIMESTAMP={}", built_at());
    println!("cargo:rustc-env=BUILD_PROFILE={}", profile);

    // Any rerun-if directive would freeze the stamp between builds
}
