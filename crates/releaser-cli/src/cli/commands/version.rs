//! `plugin-releaser version`: tag and version for a ref, as `key=value`
//! lines that can be appended to `$GITHUB_OUTPUT`.

use anyhow::Result;
use releaser_core::version::{resolve_tag_name, resolve_version, PROJECT_MANIFEST};
use std::path::Path;

use crate::cli::RefArgs;

pub fn run_version(args: &RefArgs) -> Result<()> {
    let tag = resolve_tag_name(&args.git_ref)?;
    let version = resolve_version(&tag, Path::new(PROJECT_MANIFEST))?;
    println!("tag_name={}", tag);
    println!("version={}", version);
    Ok(())
}
