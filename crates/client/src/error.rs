use std::fmt;

/// Error type for probe operations. Under the unbounded retry policy none
/// of these ever reach a caller; bounded policies surface `Exhausted` after
/// the last attempt.
#[derive(Debug)]
pub enum ClientError {
    /// Transport-level failure (connect, timeout, TLS).
    Network(String),
    /// Non-2xx HTTP status.
    Status(u16, String),
    /// Body was not valid JSON for the search contract.
    Parse(String),
    /// Bounded retry policy ran out of attempts.
    Exhausted { attempts: u32 },
}

impl fmt::Display for ClientError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Network(msg) => write!(f, "network error: {msg}"),
            Self::Status(code, msg) => write!(f, "HTTP {code}: {msg}"),
            Self::Parse(msg) => write!(f, "parse error: {msg}"),
            Self::Exhausted { attempts } => {
                write!(f, "gave up after {attempts} attempt(s)")
            }
        }
    }
}

impl std::error::Error for ClientError {}
