use std::error::Error;
use std::fs;

// Releases bump VERSION and Cargo.toml together; refuse to build when they drift.
fn main() -> Result<(), Box<dyn Error>> {
    println!("cargo:rerun-if-changed=VERSION");

    let recorded = fs::read_to_string("VERSION")
        .map_err(|e| format!("cannot read VERSION next to Cargo.toml: {}", e))?;
    let recorded = recorded.trim();
    let package = env!("CARGO_PKG_VERSION");

    if recorded != package {
        return Err(format!(
            "VERSION says {} but Cargo.toml says {}; set both to the release being cut",
            recorded, package
        )
        .into());
    }

    Ok(())
}
