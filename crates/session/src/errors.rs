pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    /// Loading or saving the document failed.
    Buffer(editor_core::errors::PieceTableError),
    /// The document actor thread could not be started.
    Spawn(std::io::Error),
    /// The document actor is gone.
    Disconnected,
    UnknownDocument(std::path::PathBuf),
    /// A thread panicked while holding the session registry.
    Poisoned,
}

impl std::fmt::Display for SessionError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionError::Buffer(e) => write!(f, "document error: {e}"),
            SessionError::Spawn(e) => write!(f, "could not start document actor: {e}"),
            SessionError::Disconnected => write!(f, "document actor disconnected"),
            SessionError::UnknownDocument(path) => {
                write!(f, "no open session for {}", path.display())
            }
            SessionError::Poisoned => write!(f, "session registry poisoned"),
        }
    }
}

impl std::error::Error for SessionError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            SessionError::Buffer(e) => Some(e),
            SessionError::Spawn(e) => Some(e),
            _ => None,
        }
    }
}

impl From<editor_core::errors::PieceTableError> for SessionError {
    fn from(value: editor_core::errors::PieceTableError) -> Self {
        SessionError::Buffer(value)
    }
}

impl<T> From<crossbeam_channel::SendError<T>> for SessionError {
    fn from(_: crossbeam_channel::SendError<T>) -> Self {
        SessionError::Disconnected
    }
}

impl From<crossbeam_channel::RecvError> for SessionError {
    fn from(_: crossbeam_channel::RecvError) -> Self {
        SessionError::Disconnected
    }
}
