//! HelixDB quickstart: a typed client for the social-graph queries, a gateway
//! API in front of HelixDB, a scripted walkthrough and a server-rendered UI.

pub mod client;
pub mod config;
pub mod core;
pub mod follow;
pub mod gateway;
pub mod handlers;
pub mod listing;
pub mod logging;
pub mod models;
pub mod notify;
pub mod posts;
pub mod search;
pub mod static_server;
pub mod templates;
pub mod users;
pub mod walkthrough;
