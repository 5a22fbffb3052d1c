use std::env;
use std::time::Duration;

use streamer_rs::models::SessionState;
use streamer_rs::services;
use streamer_rs::settings::StreamerSettings;

// Records a few seconds from a simulated board and uploads the session when an endpoint
// is configured. Usage: cargo run --example record_simulated [settings.toml]
#[tokio::main]
async fn main() {
    env_logger::init();

    let settings = match env::args().nth(1) {
        Some(path) => StreamerSettings::from_file(path).unwrap(),
        None => StreamerSettings::default().with_data_root(env::temp_dir().join("imu-sessions")),
    };
    let config = settings.sensors;
    let has_upload = settings.upload.is_some();

    let (handle, streamer) = services::run_simulated_service(
        settings,
        "D4:5E:82:E1:15:01",
        config,
        true,
        Duration::from_secs(5),
    )
    .unwrap();

    let mut ticker = tokio::time::interval(Duration::from_millis(500));
    while !handle.is_finished() {
        ticker.tick().await;
        if streamer.session_state() == SessionState::Active {
            println!("{:?}", streamer.sample_counts());
        }
    }

    let session_dir = handle.await.unwrap().unwrap();
    println!("Session stored in {}", session_dir.display());

    if has_upload {
        let report = streamer.upload(session_dir).unwrap().await.unwrap().unwrap();
        println!("Uploaded {:?}", report.uploaded);
    }
    streamer.shutdown().await;
}
