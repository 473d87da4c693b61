//! Embeds the nearest git tag, when there is one, as `GIT_TAG` so the
//! binary can report the release it was built from.

use std::process::Command;

fn git_tag() -> Option<String> {
    let output = Command::new("git")
        .args(["describe", "--tags", "--abbrev=0"])
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let tag = String::from_utf8(output.stdout).ok()?;
    let tag = tag.trim();
    (!tag.is_empty()).then(|| tag.to_string())
}

fn main() {
    println!("cargo:rerun-if-changed=build.rs");
    println!("cargo:rerun-if-changed=.git/HEAD");
    if let Some(tag) = git_tag() {
        println!("cargo:rustc-env=GIT_TAG={tag}");
    }
}
