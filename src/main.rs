//! `desk-scene` binary: opens the viewer, optionally with a TOML options file.

use std::process::ExitCode;

use desk_scene::{Options, Viewer};

fn main() -> ExitCode {
    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or("info"),
    )
    .init();

    let options = match std::env::args().nth(1) {
        Some(path) => match Options::load(std::path::Path::new(&path)) {
            Ok(options) => options,
            Err(e) => {
                log::error!("Failed to load options from {path}: {e}");
                return ExitCode::FAILURE;
            }
        },
        None => Options::default(),
    };

    match Viewer::builder().with_options(options).build().run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}
