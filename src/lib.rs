pub mod config;
pub mod edge;
pub mod export;
pub mod fake_feed;
pub mod feed;
pub mod http_client;
pub mod model;
pub mod normalize;
pub mod pipeline;
pub mod provider;
pub mod settle;
pub mod state;
