//! Run configuration and credentials.

mod credentials;
mod uploader;

pub use credentials::{
    Credentials, ACCESS_SECRET_VAR, ACCESS_TOKEN_VAR, CONSUMER_KEY_VAR, CONSUMER_SECRET_VAR,
};
pub use uploader::{RunPaths, UploaderConfig, DEFAULT_API_BASE, DEFAULT_PROPERTY_ID};
