pub mod notify_api;
pub mod s3_adapter;
