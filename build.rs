//! Build script for docscore - embeds version information.
//!
//! `BUILD_INFO_HUMAN` is shown by `docscore --version` and is made of:
//!
//! 1. the Cargo package version;
//! 2. in parentheses, `git describe --tags --always --dirty` when a tag is
//!    reachable, otherwise `v{version}-{commit date}-{short sha}[+dirty]`;
//! 3. the `rustc --version` line.
//!
//! Outside a git checkout only the package version and rustc are reported.

use std::{env, process::Command};

use chrono::{DateTime, Utc};

fn main() {
    for path in ["src", "build.rs", "Cargo.toml", "Cargo.lock"] {
        println!("cargo:rerun-if-changed={path}");
    }

    let version = env::var("CARGO_PKG_VERSION").unwrap_or_default();
    let build_info = [
        Some(version.clone()),
        describe_checkout(&version).map(|desc| format!("({desc})")),
        run("rustc", &["--version"]),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join(" ");

    println!("cargo:rustc-env=BUILD_INFO_HUMAN={build_info}");
}

fn run(program: &str, args: &[&str]) -> Option<String> {
    Command::new(program)
        .args(args)
        .output()
        .ok()
        .filter(|output| output.status.success())
        .and_then(|output| String::from_utf8(output.stdout).ok())
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

fn describe_checkout(version: &str) -> Option<String> {
    let described = run("git", &["describe", "--tags", "--always", "--dirty"])?;
    if described.contains('v') || described.contains("-g") {
        return Some(described);
    }

    // No tag reachable: synthesise a pseudo-version from the commit itself.
    let sha = run("git", &["rev-parse", "--short=12", "HEAD"])?;
    let dirty = described.ends_with("-dirty");
    let stamp = run("git", &["log", "-1", "--format=%ct"])
        .and_then(|s| s.parse::<i64>().ok())
        .and_then(|secs| DateTime::<Utc>::from_timestamp(secs, 0))
        .unwrap_or_else(Utc::now)
        .format("%Y%m%d%H%M%S");
    let suffix = if dirty { "+dirty" } else { "" };

    Some(format!("v{version}-{stamp}-{sha}{suffix}"))
}
