use std::fmt;

// Scanning and parsing never fail on input; errors only come out of the
// registration and options entry points.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    InvalidScheme(String),
    UnknownPluginDependency { plugin: String, missing: String },
    InvalidOptionValue { field: &'static str, value: String },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::InvalidScheme(scheme) => {
                write!(f, "invalid scheme name: {:?}", scheme)
            }
            Error::UnknownPluginDependency { plugin, missing } => {
                write!(f, "plugin {:?} requires unregistered plugin {:?}", plugin, missing)
            }
            Error::InvalidOptionValue { field, value } => {
                write!(f, "invalid value for option {:?}: {:?}", field, value)
            }
        }
    }
}

impl std::error::Error for Error {}
