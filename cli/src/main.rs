mod app;
mod args;

use dbextract_core::fault;

fn main() {
    if let Err(e) = fault::install() {
        fault::fail_fast(&e.into());
    }

    if let Err(e) = app::run(std::env::args_os().collect()) {
        fault::fail_fast(&e);
    }
}
