//! Build script for Trivo
//!
//! Embeds the build timestamp and the git-less build label.

fn main() {
    println!("cargo:rerun-if-changed=src");
    println!("cargo:rerun-if-env-changed=TRIVO_BUILD_LABEL");

    let timestamp = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%SZ").to_string();
    let label = std::env::var("TRIVO_BUILD_LABEL").unwrap_or_else(|_| "local".to_string());

    println!("cargo:rustc-env=TRIVO_BUILD_TIMESTAMP={}", timestamp);
    println!("cargo:rustc-env=TRIVO_BUILD_LABEL={}", label);
}
