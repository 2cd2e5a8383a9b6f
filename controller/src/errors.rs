use core::fmt;

use common_errors::{CellError, FormatError, RangeError};

pub static ERROR_UNKNOWN_RESERVE: &str = "Reserve is not part of this deployment.";

pub static ERROR_MISSING_PRICE: &str = "No price for reserve.";

pub static ERROR_UNEXPECTED_STACK_ENTRY: &str = "Unexpected get-method stack entry.";

pub static ERROR_PROVIDER_FAILURE: &str = "Chain provider failed.";

pub static ERROR_CONFIG_PARSE: &str = "Invalid deployment config.";

pub static ERROR_CONFIG_IO: &str = "Deployment config could not be read.";

pub static ERROR_DUPLICATE_RESERVE: &str = "Reserve id is listed twice.";

pub static ERROR_RESERVE_ID_OUT_OF_RANGE: &str = "Reserve id does not fit into 6 bits.";

pub static ERROR_INVALID_ORACLE_PAYLOAD: &str = "Oracle payload is not a valid bag of cells.";

/// Failure reported by, or while reading the answer of, a chain collaborator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainError {
    UnexpectedStackEntry {
        method: String,
        expected: &'static str,
    },
    Provider(String),
}

impl fmt::Display for ChainError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChainError::UnexpectedStackEntry { method, expected } => {
                write!(f, "{ERROR_UNEXPECTED_STACK_ENTRY} {method}: expected {expected}")
            },
            ChainError::Provider(reason) => write!(f, "{ERROR_PROVIDER_FAILURE} {reason}"),
        }
    }
}

impl std::error::Error for ChainError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Parse(String),
    Io(String),
    DuplicateReserve(u8),
    ReserveIdOutOfRange(u8),
    InvalidOraclePayload(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(reason) => write!(f, "{ERROR_CONFIG_PARSE} {reason}"),
            ConfigError::Io(reason) => write!(f, "{ERROR_CONFIG_IO} {reason}"),
            ConfigError::DuplicateReserve(id) => write!(f, "{ERROR_DUPLICATE_RESERVE} ({id})"),
            ConfigError::ReserveIdOutOfRange(id) => {
                write!(f, "{ERROR_RESERVE_ID_OUT_OF_RANGE} ({id})")
            },
            ConfigError::InvalidOraclePayload(reason) => {
                write!(f, "{ERROR_INVALID_ORACLE_PAYLOAD} {reason}")
            },
        }
    }
}

impl std::error::Error for ConfigError {}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    Range(RangeError),
    Cell(CellError),
    Format(FormatError),
    Chain(ChainError),
    Config(ConfigError),
    UnknownReserve(u8),
    MissingPrice(u8),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Range(err) => err.fmt(f),
            Error::Cell(err) => err.fmt(f),
            Error::Format(err) => err.fmt(f),
            Error::Chain(err) => err.fmt(f),
            Error::Config(err) => err.fmt(f),
            Error::UnknownReserve(id) => write!(f, "{ERROR_UNKNOWN_RESERVE} ({id})"),
            Error::MissingPrice(id) => write!(f, "{ERROR_MISSING_PRICE} ({id})"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Range(err) => Some(err),
            Error::Cell(err) => Some(err),
            Error::Format(err) => Some(err),
            Error::Chain(err) => Some(err),
            Error::Config(err) => Some(err),
            Error::UnknownReserve(_) | Error::MissingPrice(_) => None,
        }
    }
}

impl From<RangeError> for Error {
    fn from(err: RangeError) -> Self {
        Error::Range(err)
    }
}

impl From<CellError> for Error {
    fn from(err: CellError) -> Self {
        Error::Cell(err)
    }
}

impl From<FormatError> for Error {
    fn from(err: FormatError) -> Self {
        Error::Format(err)
    }
}

impl From<ChainError> for Error {
    fn from(err: ChainError) -> Self {
        Error::Chain(err)
    }
}

impl From<ConfigError> for Error {
    fn from(err: ConfigError) -> Self {
        Error::Config(err)
    }
}
