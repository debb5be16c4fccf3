//! `gridpack version` — show the packager version.

use anyhow::Result;

/// Print the version, as JSON when requested.
///
/// # Errors
///
/// Currently infallible.
pub fn run(json: bool) -> Result<()> {
    let version = env!("CARGO_PKG_VERSION");
    if json {
        println!("{}", serde_json::json!({ "version": version }));
    } else {
        println!("gridpack {version}");
    }
    Ok(())
}
