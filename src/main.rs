mod anim;
mod app;
mod cards;
mod choreo;
mod interact;
mod options;
mod overlay;
mod quality;
mod render;
mod sim;
mod util;

fn main() {
    env_logger::init();
    log::info!("herofx starting up");

    if let Err(e) = app::run() {
        log::error!("Fatal error: {e}");
        std::process::exit(1);
    }
}
