//! Run command - extract, index and serve in one go.

use super::{extract, index, serve};
use crate::sequencer::Sequencer;
use anyhow::Result;
use docflow_config::Config;

pub fn run(config: &Config, strict: bool, bind: Option<String>) -> Result<()> {
    Sequencer::new()
        .stage("extract", || extract::run(config, strict))
        .stage("index", || index::run(config, strict))
        .stage("serve", move || serve::run(config, bind))
        .run()
}
