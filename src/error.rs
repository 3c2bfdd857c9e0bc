use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("iterations must be greater than 0")]
    IterationsZero,
    #[error("breakdown probability must be within [0, 1] (got {0})")]
    InvalidBreakdownProbability(f64),
    #[error("repair days must be > 0 (got {0})")]
    InvalidRepairDays(u32),
    #[error("min repair days ({min}) must not exceed max repair days ({max})")]
    InvalidRepairRange { min: u32, max: u32 },
    #[error("vehicles must not contain empty names")]
    EmptyVehicleName,
    #[error("duplicate vehicle name '{0}'")]
    DuplicateVehicleName(String),
    #[error("invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),
    #[error("{0}")]
    ConfigIo(String),
    #[error("{0}")]
    ConfigParse(String),
    #[error("unsupported config format '{0}'")]
    UnsupportedConfigFormat(String),
    #[error("{0}")]
    Output(String),
    #[error("{0}")]
    Telemetry(String),
    #[error("{0}")]
    Cli(String),
}

pub type Result<T> = std::result::Result<T, Error>;
