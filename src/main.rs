//! `gridscape [classic|enhanced|path/to/options.toml]`
//!
//! Opens a window with the animated grid. With no argument the classic
//! preset is shown.

use std::path::Path;

use gridscape::{GridError, Options, Viewer};

fn resolve_options(arg: Option<&str>) -> Result<Options, GridError> {
    let Some(arg) = arg else {
        return Ok(Options::classic());
    };
    if let Some(preset) = Options::preset(arg) {
        return Ok(preset);
    }
    let path = Path::new(arg);
    if path.exists() {
        return Options::load(path);
    }
    Err(GridError::InvalidOptions(format!(
        "{arg} is neither a preset (classic, enhanced) nor an options file"
    )))
}

fn main() {
    env_logger::init();

    let arg = std::env::args().nth(1);
    let options = match resolve_options(arg.as_deref()) {
        Ok(options) => options,
        Err(e) => {
            log::error!("{e}");
            log::error!("Usage: gridscape [classic|enhanced|options.toml]");
            std::process::exit(1);
        }
    };

    if let Err(e) = Viewer::builder().with_options(options).build().run() {
        log::error!("{e}");
        std::process::exit(1);
    }
}
