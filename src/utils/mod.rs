pub mod data_uri;
pub mod time;
pub mod validation;
