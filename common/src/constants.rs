/// Number of sensor subsystems streamed by a session
pub const N_SENSORS: usize = 3;

/// Number of axis in a vector sample
pub const N_XYZ_COORDINATES: usize = 3;

/// Header row of every per-sensor session file
pub const CSV_HEADER: [&str; 4] = ["timestamp", "x", "y", "z"];
