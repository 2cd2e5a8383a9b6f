use core::fmt;

pub static ERROR_RESULT_NEGATIVE: &str = "result must be gte 0";

pub static ERROR_RESULT_OVERFLOW: &str = "result must be less than or equal to MAX_UINT_257";

pub static ERROR_DIVISION_BY_ZERO: &str = "divisor must be greater than 0";

pub static ERROR_PERCENTAGE_OUT_OF_RANGE: &str = "pct must be less than or equal to 100";

pub static ERROR_TIME_WENT_BACKWARDS: &str = "target timestamp is older than the last update";

pub static ERROR_CELL_BITS_OVERFLOW: &str = "Cell can not hold more than 1023 bits.";

pub static ERROR_CELL_REFS_OVERFLOW: &str = "Cell can not hold more than 4 references.";

pub static ERROR_VALUE_DOES_NOT_FIT: &str = "Value does not fit into the requested bit width.";

pub static ERROR_READ_PAST_END: &str = "Not enough bits left in the slice.";

pub static ERROR_NO_MORE_REFS: &str = "No more references left in the slice.";

pub static ERROR_UNREAD_DATA: &str = "Slice was not fully consumed.";

pub static ERROR_INVALID_ADDRESS: &str = "Invalid address.";

pub static ERROR_INVALID_DICTIONARY: &str = "Invalid dictionary layout.";

pub static ERROR_INVALID_BOC: &str = "Invalid bag of cells.";

pub static ERROR_BOC_CRC_MISMATCH: &str = "Bag of cells checksum mismatch.";

pub static ERROR_EXOTIC_CELL: &str = "Exotic cells are not supported.";

pub static ERROR_INVALID_BOOLEAN: &str = "Invalid boolean value.";

pub static ERROR_INVALID_LOCK_STATE: &str = "Invalid lock state.";

pub static ERROR_UNEXPECTED_OPCODE: &str = "Unexpected op.";

pub static ERROR_INVALID_AMOUNT_STRING: &str = "Invalid decimal amount.";

/// Arithmetic failure. Always fatal for the computation that raised it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RangeError {
    NegativeResult,
    Overflow,
    DivisionByZero,
    PercentageOutOfRange(u8),
    TimeWentBackwards { last_update: u64, target: u64 },
}

impl fmt::Display for RangeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RangeError::NegativeResult => f.write_str(ERROR_RESULT_NEGATIVE),
            RangeError::Overflow => f.write_str(ERROR_RESULT_OVERFLOW),
            RangeError::DivisionByZero => f.write_str(ERROR_DIVISION_BY_ZERO),
            RangeError::PercentageOutOfRange(pct) => {
                write!(f, "{ERROR_PERCENTAGE_OUT_OF_RANGE} (got {pct})")
            },
            RangeError::TimeWentBackwards { last_update, target } => write!(
                f,
                "{ERROR_TIME_WENT_BACKWARDS} ({target} < {last_update})"
            ),
        }
    }
}

impl std::error::Error for RangeError {}

/// Bit-level failure while building or reading cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CellError {
    BitsOverflow { requested: usize },
    RefsOverflow,
    ValueDoesNotFit { bits: usize },
    ReadPastEnd { requested: usize, remaining: usize },
    NoMoreRefs,
    UnreadData { bits: usize, refs: usize },
    InvalidAddress(String),
    InvalidDictionary,
    InvalidBoc(&'static str),
    BocCrcMismatch,
    ExoticCell,
}

impl fmt::Display for CellError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellError::BitsOverflow { requested } => {
                write!(f, "{ERROR_CELL_BITS_OVERFLOW} (requested {requested})")
            },
            CellError::RefsOverflow => f.write_str(ERROR_CELL_REFS_OVERFLOW),
            CellError::ValueDoesNotFit { bits } => {
                write!(f, "{ERROR_VALUE_DOES_NOT_FIT} ({bits} bits)")
            },
            CellError::ReadPastEnd {
                requested,
                remaining,
            } => write!(
                f,
                "{ERROR_READ_PAST_END} (requested {requested}, remaining {remaining})"
            ),
            CellError::NoMoreRefs => f.write_str(ERROR_NO_MORE_REFS),
            CellError::UnreadData { bits, refs } => {
                write!(f, "{ERROR_UNREAD_DATA} ({bits} bits, {refs} refs left)")
            },
            CellError::InvalidAddress(reason) => write!(f, "{ERROR_INVALID_ADDRESS} {reason}"),
            CellError::InvalidDictionary => f.write_str(ERROR_INVALID_DICTIONARY),
            CellError::InvalidBoc(reason) => write!(f, "{ERROR_INVALID_BOC} {reason}"),
            CellError::BocCrcMismatch => f.write_str(ERROR_BOC_CRC_MISMATCH),
            CellError::ExoticCell => f.write_str(ERROR_EXOTIC_CELL),
        }
    }
}

impl std::error::Error for CellError {}

/// Record-level decoding failure. Signals a layout mismatch between this
/// library and the on-chain data, never something to retry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormatError {
    Cell(CellError),
    InvalidBoolean(i64),
    InvalidLockState(u8),
    UnexpectedOpcode { found: u8, expected: &'static str },
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FormatError::Cell(err) => err.fmt(f),
            FormatError::InvalidBoolean(value) => write!(f, "{ERROR_INVALID_BOOLEAN} ({value})"),
            FormatError::InvalidLockState(value) => {
                write!(f, "{ERROR_INVALID_LOCK_STATE} ({value})")
            },
            FormatError::UnexpectedOpcode { found, expected } => {
                write!(f, "{ERROR_UNEXPECTED_OPCODE} {found}. Expected: {expected}")
            },
        }
    }
}

impl std::error::Error for FormatError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            FormatError::Cell(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CellError> for FormatError {
    fn from(err: CellError) -> Self {
        FormatError::Cell(err)
    }
}

/// A human-readable amount that is not a plain non-negative decimal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountParseError {
    pub input: String,
}

impl fmt::Display for AmountParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{ERROR_INVALID_AMOUNT_STRING} ({:?})", self.input)
    }
}

impl std::error::Error for AmountParseError {}
