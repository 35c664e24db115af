//! Error types for the fry_colorscan library
//!
//! The analysis pipeline itself never fails: it degrades to documented
//! defaults. Errors only come from the adapters around it (image loading,
//! configuration files) and from constructing an invalid [`ImageSample`].
//!
//! [`ImageSample`]: crate::ImageSample

use thiserror::Error;

/// Result type alias for fry_colorscan operations
pub type Result<T> = std::result::Result<T, AnalysisError>;

/// Error types for the adapters around the analysis pipeline
#[derive(Error, Debug)]
pub enum AnalysisError {
    /// Image file could not be loaded or decoded
    #[error("Failed to load image: {message}")]
    ImageLoadError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Pixel buffer does not describe a valid RGBA image
    #[error("Invalid image: {reason}")]
    InvalidImage { reason: String },

    /// Invalid input parameters
    #[error("Invalid parameter: {parameter} = {value}")]
    InvalidParameter { parameter: String, value: String },

    /// Configuration file could not be read, parsed or written
    #[error("Configuration error: {message}")]
    ConfigError {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl AnalysisError {
    /// Create an image load error with context
    pub fn image_load<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ImageLoadError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a configuration error with context
    pub fn config<E>(message: impl Into<String>, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        Self::ConfigError {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create an invalid parameter error
    pub fn invalid_parameter(parameter: impl Into<String>, value: impl ToString) -> Self {
        Self::InvalidParameter {
            parameter: parameter.into(),
            value: value.to_string(),
        }
    }

    /// Get user-friendly error description for application display
    pub fn user_message(&self) -> String {
        match self {
            AnalysisError::ImageLoadError { .. } => {
                "Could not load the image. Please check the file format and try again.".to_string()
            }
            AnalysisError::InvalidImage { reason } => {
                format!("The image data is not usable: {}.", reason)
            }
            AnalysisError::InvalidParameter { parameter, value } => {
                format!("Setting '{}' has an unsupported value ({}).", parameter, value)
            }
            AnalysisError::ConfigError { .. } => {
                "Could not read the analysis configuration. Please check the file.".to_string()
            }
        }
    }
}
