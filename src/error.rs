/// Exit code for bad input: unreadable source, invalid CLI dates, failed exports.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for runtime failures: network, terminal.
pub const EXIT_RUNTIME: u8 = 4;

/// Process-level error carrying the exit code `main` should return.
#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    pub fn input(message: impl Into<String>) -> Self {
        Self::new(EXIT_INPUT, message)
    }

    pub fn runtime(message: impl Into<String>) -> Self {
        Self::new(EXIT_RUNTIME, message)
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn constructors_set_exit_codes() {
        assert_eq!(AppError::input("x").exit_code(), EXIT_INPUT);
        assert_eq!(AppError::runtime("x").exit_code(), EXIT_RUNTIME);
        let err = AppError::new(7, "boom");
        assert_eq!(err.to_string(), "boom");
        assert_eq!(err.message(), "boom");
    }
}
