//! Notification Dispatcher
//!
//! Binary entry point.

#[tokio::main]
async fn main() {
    core_config::tracing::install_color_eyre();

    if let Err(e) = notifications_dispatcher::run().await {
        eprintln!("Fatal error: {:#}", e);
        std::process::exit(1);
    }
}
