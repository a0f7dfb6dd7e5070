pub mod api_errors;
pub mod http;
pub mod lightspeed_client;
