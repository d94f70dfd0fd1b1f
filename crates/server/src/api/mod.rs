pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod transcode;

pub use routes::create_router;
