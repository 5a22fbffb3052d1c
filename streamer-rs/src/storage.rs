//! Session directory layout under the data root.
//!
//! Every session lives in `<data_root>/<YYYY_MM_DD_HH_mm_ss>`, with a `_NN` suffix
//! when two sessions start within the same second.

use chrono::{DateTime, Local, NaiveDateTime, TimeZone};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use crate::models::StreamerError;

const SESSION_NAME_FORMAT: &str = "%Y_%m_%d_%H_%M_%S";
const MAX_COLLISION_SUFFIX: u32 = 99;

/// Folder name for a session created at `created_at`.
pub fn session_name<Tz: TimeZone>(created_at: &DateTime<Tz>) -> String
where
    Tz::Offset: std::fmt::Display,
{
    created_at.format(SESSION_NAME_FORMAT).to_string()
}

/// True if `name` was produced by [`session_name`], with or without a collision suffix.
pub fn is_session_name(name: &str) -> bool {
    let base = match name.rsplit_once('_') {
        Some((base, suffix))
            if suffix.len() == 2
                && suffix.chars().all(|c| c.is_ascii_digit())
                && NaiveDateTime::parse_from_str(name, SESSION_NAME_FORMAT).is_err() =>
        {
            base
        }
        _ => name,
    };
    NaiveDateTime::parse_from_str(base, SESSION_NAME_FORMAT).is_ok()
}

/// Creates a fresh session directory under `data_root`, named after the current local
/// time. Returns the directory name and its full path.
pub fn create_session_dir(data_root: &Path) -> Result<(String, PathBuf), StreamerError> {
    create_session_dir_at(data_root, &Local::now())
}

pub(crate) fn create_session_dir_at<Tz: TimeZone>(
    data_root: &Path,
    created_at: &DateTime<Tz>,
) -> Result<(String, PathBuf), StreamerError>
where
    Tz::Offset: std::fmt::Display,
{
    fs::create_dir_all(data_root)?;
    let base = session_name(created_at);

    for attempt in 0..=MAX_COLLISION_SUFFIX {
        let name = match attempt {
            0 => base.clone(),
            n => format!("{base}_{n:02}"),
        };
        let path = data_root.join(&name);
        match fs::create_dir(&path) {
            Ok(()) => return Ok((name, path)),
            Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
            Err(e) => return Err(e.into()),
        }
    }
    Err(StreamerError::Io(io::Error::new(
        io::ErrorKind::AlreadyExists,
        format!("too many sessions named {base} in {}", data_root.display()),
    )))
}

/// Lexicographically greatest session directory under `data_root`. Entries that are
/// not directories, or whose name is not a session name, are ignored.
pub fn latest_session_directory(data_root: &Path) -> Result<PathBuf, StreamerError> {
    let no_sessions = || StreamerError::NoSessions(data_root.display().to_string());

    let entries = match fs::read_dir(data_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(no_sessions()),
        Err(e) => return Err(e.into()),
    };

    let mut latest: Option<(String, PathBuf)> = None;
    for entry in entries {
        let entry = entry?;
        if !entry.file_type()?.is_dir() {
            continue;
        }
        let Some(name) = entry.file_name().to_str().map(str::to_owned) else {
            continue;
        };
        if !is_session_name(&name) {
            continue;
        }
        if latest.as_ref().map_or(true, |(best, _)| name > *best) {
            latest = Some((name, entry.path()));
        }
    }

    latest.map(|(_, path)| path).ok_or_else(no_sessions)
}
