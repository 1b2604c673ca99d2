use std::process::Command;

fn main() {
    println!("cargo:rerun-if-env-changed=GLYPHFALL_BUILD");
    println!("cargo:rerun-if-env-changed=GITHUB_SHA");

    let target = match std::env::var("GLYPHFALL_BUILD") {
        Ok(v) if !v.trim().is_empty() => v,
        _ => target_label(),
    };
    let build_id = match short_sha() {
        Some(sha) => format!("{target} ({sha})"),
        None => target,
    };

    println!("cargo:rustc-env=GLYPHFALL_BUILD={}", build_id);
}

fn target_label() -> String {
    let os = std::env::var("CARGO_CFG_TARGET_OS").unwrap_or_else(|_| "unknown".to_string());
    let arch = std::env::var("CARGO_CFG_TARGET_ARCH").unwrap_or_else(|_| "unknown".to_string());
    let os = if os == "macos" { "darwin".to_string() } else { os };
    format!("{os}-{arch}")
}

fn is_short_sha(s: &str) -> bool {
    !s.is_empty() && s.chars().all(|c| c.is_ascii_hexdigit())
}

fn short_sha() -> Option<String> {
    let from_git = Command::new("git")
        .args(["rev-parse", "--short=7", "HEAD"])
        .output()
        .ok()
        .filter(|out| out.status.success())
        .and_then(|out| String::from_utf8(out.stdout).ok())
        .map(|s| s.trim().to_ascii_lowercase());
    if let Some(sha) = from_git.filter(|s| is_short_sha(s)) {
        return Some(sha);
    }

    let env = std::env::var("GITHUB_SHA").ok()?;
    let short: String = env.trim().chars().take(7).collect();
    is_short_sha(&short).then(|| short.to_ascii_lowercase())
}
