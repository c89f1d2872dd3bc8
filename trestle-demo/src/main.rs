//! Interactive showcase for the trestle grid widgets.
//!
//! Runs a filterable, sortable, paged table over a fake staff dataset.
//! Logs go to `trestle-demo.log`; the export control writes
//! `trestle-export.csv` next to it.

mod app;
mod data;
mod term;

use std::fs::File;

use simplelog::{Config, LevelFilter, WriteLogger};

use crate::app::App;

#[tokio::main]
async fn main() -> std::io::Result<()> {
    let log_file = File::create("trestle-demo.log")?;
    WriteLogger::init(LevelFilter::Debug, Config::default(), log_file)
        .expect("Failed to initialize logger");

    App::new().run().await
}
