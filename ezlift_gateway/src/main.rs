use ezlift_gateway::{config::Config, start_server};
use tracing::error;

#[tokio::main]
async fn main() {
    ezlift_core::logging::init();

    if let Err(e) = start_server(Config::load()).await {
        error!("Gateway stopped: {e}");
        std::process::exit(1);
    }
}
