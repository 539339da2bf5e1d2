use std::process::Command;

fn main() {
    // Packaged builds without a .git directory can pass the hash explicitly
    println!("cargo:rerun-if-env-changed=TRACKSTATS_GIT_HASH");
    if let Ok(hash) = std::env::var("TRACKSTATS_GIT_HASH") {
        println!("cargo:rustc-env=GIT_HASH={}", hash.trim());
        return;
    }

    let git_hash = Command::new("git")
        .args(["rev-parse", "--short", "HEAD"])
        .output()
        .ok()
        .filter(|o| o.status.success())
        .and_then(|o| String::from_utf8(o.stdout).ok())
        .map(|s| s.trim().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    println!("cargo:rustc-env=GIT_HASH={}", git_hash);

    println!("cargo:rerun-if-changed=.git/HEAD");
    println!("cargo:rerun-if-changed=.git/refs/heads/");
}
