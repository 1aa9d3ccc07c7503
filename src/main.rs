use flare_predict::config::Config;
use flare_predict::ui::App;
use tracing::{info, Level};

fn main() {
    let level = Config::embedded()
        .and_then(|config| config.log_level())
        .unwrap_or(Level::INFO);
    dioxus_logger::init(level).expect("failed to init logger");

    info!("flare-predict v{} starting", env!("CARGO_PKG_VERSION"));
    dioxus::launch(App);
}
