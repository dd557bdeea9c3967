use std::fs;
use std::path::Path;

/// Exposes the workspace `VERSION` file as `QR_REDIRECT_VERSION`, falling back
/// to the crate version when the file is absent (e.g. packaged builds).
fn main() {
    let manifest_dir = std::env::var("CARGO_MANIFEST_DIR").expect("manifest dir");
    let version_path = Path::new(&manifest_dir).join("../../VERSION");
    println!("cargo:rerun-if-changed={}", version_path.display());

    let version = match fs::read_to_string(&version_path) {
        Ok(raw) => {
            let trimmed = raw.trim().to_string();
            assert!(!trimmed.is_empty(), "VERSION file must not be empty");
            trimmed
        }
        Err(_) => std::env::var("CARGO_PKG_VERSION").expect("package version"),
    };

    println!("cargo:rustc-env=QR_REDIRECT_VERSION={version}");
}
