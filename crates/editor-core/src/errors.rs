pub type PieceTableResult<T> = Result<T, PieceTableError>;

#[derive(Debug)]
pub enum PieceTableError {
    /// `replace` was asked for `[start, end)` outside `[0, len]` or with
    /// `start > end`. The table is left untouched.
    InvalidRange { start: usize, end: usize, len: usize },
    /// Loading or saving the whole file failed.
    IoError(std::io::Error),
}

impl std::fmt::Display for PieceTableError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PieceTableError::InvalidRange { start, end, len } => {
                write!(f, "invalid range {start}..{end} (len={len})")
            }
            PieceTableError::IoError(e) => write!(f, "i/o error: {e}"),
        }
    }
}

impl std::error::Error for PieceTableError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            PieceTableError::IoError(e) => Some(e),
            PieceTableError::InvalidRange { .. } => None,
        }
    }
}

impl From<std::io::Error> for PieceTableError {
    fn from(value: std::io::Error) -> Self {
        PieceTableError::IoError(value)
    }
}
