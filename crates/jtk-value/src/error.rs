use std::fmt;

/// Errors raised by the Document Model's typed accessors and container ops.
///
/// These replace the original `JsonException` throws (`"Значение не
/// является массивом"`, `"Индекс выходит за границы массива"`, ...) with
/// typed, non-panicking `Result`s.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// A typed accessor (`as_bool`, `as_array`, ...) was invoked on a
    /// `Value` of a different variant.
    TypeMismatch { expected: &'static str, found: &'static str },
    /// An array index was `>=` the array's length, or a required object key
    /// was absent.
    OutOfRange(String),
}

impl fmt::Display for ValueError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::TypeMismatch { expected, found } => {
                write!(f, "expected {expected}, found {found}")
            }
            Self::OutOfRange(message) => write!(f, "{message}"),
        }
    }
}

impl std::error::Error for ValueError {}
