use log::SetLoggerError;

#[derive(Debug, thiserror::Error)]
pub enum ApplicationError {
    #[error(transparent)]
    Io(#[from] std::io::Error),
    #[error("invalid value {value:?} for {key}")]
    Config { key: &'static str, value: String },
    #[error("logger already installed")]
    Logger(#[from] SetLoggerError),
    #[error("unknown command {0:?}, expected no arguments or `serve`")]
    Usage(String),
}
