use std::process::Command;

/// Full commit hash: `GIT_COMMIT_SHA` from CI, else `git rev-parse`, else "unknown".
fn commit_hash() -> String {
    if let Ok(sha) = std::env::var("GIT_COMMIT_SHA") {
        return sha;
    }
    Command::new("git")
        .args(["rev-parse", "HEAD"])
        .output()
        .ok()
        .filter(|output| output.status.success())
        .map(|output| String::from_utf8_lossy(&output.stdout).trim().to_owned())
        .unwrap_or_else(|| "unknown".to_owned())
}

fn main() {
    let hash = commit_hash();
    let short = hash.get(..7).filter(|_| hash != "unknown").unwrap_or(&hash);

    println!("cargo:rustc-env=GIT_COMMIT_HASH={hash}");
    println!("cargo:rustc-env=GIT_COMMIT_SHORT={short}");
    // Reported in the startup log next to the commit.
    let profile = std::env::var("PROFILE").unwrap_or_else(|_| "unknown".to_owned());
    println!("cargo:rustc-env=DBPROBE_BUILD_PROFILE={profile}");

    println!("cargo:rerun-if-env-changed=GIT_COMMIT_SHA");
    if std::path::Path::new(".git/HEAD").exists() {
        println!("cargo:rerun-if-changed=.git/HEAD");
        println!("cargo:rerun-if-changed=.git/refs/heads");
    }
}
