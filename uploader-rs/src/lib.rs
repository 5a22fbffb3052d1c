//! # Crate uploader-rs
//!
//! Hands finalized session directories to an object store over HTTP. Every regular
//! file directly inside the directory is sent with a `PUT` to
//! `{endpoint}/{prefix}/{directory name}/{file name}`. Uploads run on a spawned task
//! and never block the caller.
//!
//! ```no_run
//! use uploader_rs::{UploadRelay, UploadSettings};
//!
//! # async fn run() -> Result<(), uploader_rs::UploadError> {
//! let relay = UploadRelay::new(&UploadSettings::new("http://localhost:9000/imu"))?;
//! let report = relay
//!     .upload("/data/sessions/2024_03_07_09_05_02")
//!     .await
//!     .expect("upload task panicked")?;
//! println!("uploaded {:?}", report.uploaded);
//! # Ok(())
//! # }
//! ```

pub mod errors;
mod http_client;
pub mod relay;

pub use errors::UploadError;
pub use relay::{object_key, UploadRelay, UploadReport, UploadSettings};
