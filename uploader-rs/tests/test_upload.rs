use std::fs;
use tempfile::tempdir;
use uploader_rs::{UploadError, UploadRelay, UploadSettings};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const SESSION: &str = "2024_03_07_09_05_02";

fn session_dir(root: &std::path::Path) -> std::path::PathBuf {
    let dir = root.join(SESSION);
    fs::create_dir(&dir).unwrap();
    for name in ["magnetometer.csv", "accelerometer.csv", "gyroscope.csv"] {
        fs::write(dir.join(name), "timestamp,x,y,z\n1,0.1,0.2,0.3\n").unwrap();
    }
    fs::create_dir(dir.join("nested")).unwrap();
    dir
}

#[tokio::test]
async fn test_upload_puts_every_file() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(header("authorization", "Bearer secret"))
        .respond_with(ResponseTemplate::new(200))
        .expect(3)
        .mount(&mock_server)
        .await;

    let root = tempdir().unwrap();
    let dir = session_dir(root.path());
    let mut settings = UploadSettings::new(&format!("{}/bucket/", mock_server.uri()));
    settings.prefix = Some("lab".to_string());
    settings.token = Some("secret".to_string());

    let relay = UploadRelay::new(&settings).unwrap();
    let report = relay.upload(dir.clone()).await.unwrap().unwrap();

    assert_eq!(report.directory, dir);
    assert_eq!(
        report.uploaded,
        vec![
            format!("lab/{SESSION}/accelerometer.csv"),
            format!("lab/{SESSION}/gyroscope.csv"),
            format!("lab/{SESSION}/magnetometer.csv"),
        ]
    );

    let received = mock_server.received_requests().await.unwrap();
    let mut paths: Vec<String> = received.iter().map(|r| r.url.path().to_string()).collect();
    paths.sort();
    assert_eq!(paths[0], format!("/bucket/lab/{SESSION}/accelerometer.csv"));
    assert!(received
        .iter()
        .all(|r| r.body == b"timestamp,x,y,z\n1,0.1,0.2,0.3\n".to_vec()));
}

#[tokio::test]
async fn test_upload_reports_failed_keys() {
    let mock_server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path(format!("/{SESSION}/gyroscope.csv")))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;
    Mock::given(method("PUT"))
        .respond_with(ResponseTemplate::new(201))
        .mount(&mock_server)
        .await;

    let root = tempdir().unwrap();
    let dir = session_dir(root.path());
    let relay = UploadRelay::new(&UploadSettings::new(&mock_server.uri())).unwrap();

    match relay.upload(dir).await.unwrap() {
        Err(UploadError::Upload(failed)) => {
            assert_eq!(failed, vec![format!("{SESSION}/gyroscope.csv")])
        }
        other => panic!("unexpected result: {:?}", other),
    }
    // every file was attempted
    assert_eq!(mock_server.received_requests().await.unwrap().len(), 3);
}

#[tokio::test]
async fn test_upload_rejects_invalid_directory() {
    let root = tempdir().unwrap();
    let relay = UploadRelay::new(&UploadSettings::new("http://localhost:1")).unwrap();

    let missing = relay.upload(root.path().join("missing")).await.unwrap();
    assert!(matches!(missing, Err(UploadError::InvalidPath(_))));

    let file = root.path().join("file.csv");
    fs::write(&file, "timestamp,x,y,z\n").unwrap();
    let not_a_dir = relay.upload(file).await.unwrap();
    assert!(matches!(not_a_dir, Err(UploadError::InvalidPath(_))));
}

#[tokio::test]
async fn test_upload_empty_directory_succeeds() {
    let root = tempdir().unwrap();
    let dir = root.path().join(SESSION);
    fs::create_dir(&dir).unwrap();
    let relay = UploadRelay::new(&UploadSettings::new("http://localhost:1")).unwrap();

    let report = relay.upload(dir).await.unwrap().unwrap();
    assert!(report.uploaded.is_empty());
}
