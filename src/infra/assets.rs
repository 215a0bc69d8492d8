//! Embedded built-in topology descriptors.
//!
//! At compile time, `include_dir!` embeds everything under
//! `assets/topologies/`. Each file is one YAML deployment descriptor; the
//! file stem is the name `stratus deploy <name>` resolves.

use anyhow::Result;
use include_dir::{Dir, include_dir};

/// All built-in topology descriptors, compiled in at build time.
static EMBEDDED_TOPOLOGIES: Dir<'_> = include_dir!("$CARGO_MANIFEST_DIR/assets/topologies");

/// Return the YAML text of a built-in topology.
///
/// # Errors
///
/// Returns an error naming the available topologies when `name` is unknown.
pub fn builtin_topology(name: &str) -> Result<&'static str> {
    EMBEDDED_TOPOLOGIES
        .get_file(format!("{name}.yaml"))
        .and_then(include_dir::File::contents_utf8)
        .ok_or_else(|| {
            anyhow::anyhow!(
                "unknown topology '{name}' (built-in topologies: {})",
                builtin_names().join(", ")
            )
        })
}

/// Names of all built-in topologies, sorted.
#[must_use]
pub fn builtin_names() -> Vec<&'static str> {
    let mut names: Vec<&'static str> = EMBEDDED_TOPOLOGIES
        .files()
        .filter_map(|f| f.path().file_stem().and_then(|s| s.to_str()))
        .collect();
    names.sort_unstable();
    names
}
