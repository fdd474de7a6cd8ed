use env_logger::Env;

mod app;
mod config;
mod filter;
mod forest;
mod prelude;
mod prepare;
mod render;
mod session;
mod snapshot;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() {
    env_logger::Builder::from_env(Env::default().default_filter_or("info")).init();
    let res = crate::app::run();
    if let Err(err) = res {
        eprintln!("Error: {}", err);
        std::process::exit(1);
    }
}
