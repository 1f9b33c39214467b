//! CLI command handlers, one file per subcommand.

mod checksum;
mod completions;
mod release;
mod render;
mod version;

pub use checksum::run_checksum;
pub use completions::{run_completions, run_man};
pub use release::run_release;
pub use render::run_render;
pub use version::run_version;

use releaser_core::config::ReleaserConfig;
use std::path::PathBuf;

use crate::cli::TemplateArgs;

/// Template path and indent, flags over config.
fn template_settings(cfg: &ReleaserConfig, args: &TemplateArgs) -> (PathBuf, usize) {
    (
        args.template.clone().unwrap_or_else(|| cfg.template_file.clone()),
        args.indent.unwrap_or(cfg.indent),
    )
}
