mod adapters;
mod app;
mod core;
mod global_constants;
mod ports;
mod presentation;

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    log::info!("[MAIN] Starting {}", global_constants::APPLICATION_NAME);
    println!("{}", global_constants::STARTUP_BANNER);

    app::ScannerApp::build().run().await
}
