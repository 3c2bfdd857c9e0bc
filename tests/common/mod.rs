use std::fs;
use std::path::PathBuf;
use std::time::{SystemTime, UNIX_EPOCH};

/// Two always-available vehicles in district 1; district 2 has none.
pub const STEADY_SCENARIO: &str = r#"
[simulation]
start = "2023-01-01"
end = "2023-01-10"
iterations = 4
seed = 42

[model]
breakdown_probability = 0.0

[[vehicles]]
name = "A1"
district_id = 1

[[vehicles]]
name = "A2"
district_id = 1

[[requirements]]
district_id = 1
date = "2023-01-05"
vehicles = 3

[[requirements]]
district_id = 2
date = "2023-01-02"
vehicles = 1
"#;

pub fn write_temp_config(label: &str, contents: &str, extension: &str) -> PathBuf {
    let mut path = std::env::temp_dir();
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("time should be available")
        .as_nanos();
    path.push(format!("fleet-sim-{}-{}.{}", label, nanos, extension));
    fs::write(&path, contents).expect("config write should succeed");
    path
}
