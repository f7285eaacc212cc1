pub mod dynamodb;
pub mod http;
pub mod json_file;
pub mod persistence;
