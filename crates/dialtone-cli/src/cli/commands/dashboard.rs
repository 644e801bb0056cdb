//! Default command: the full-screen dashboard.

use anyhow::Result;
use dialtone_core::config::Config;

pub fn run(config: &Config) -> Result<()> {
    dialtone_tui::run_interactive(config)
}
