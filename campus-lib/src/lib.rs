#[macro_use(get, post, delete)]
extern crate actix_web;

pub mod config;
pub mod course;
pub mod error;
pub mod health;
pub mod payment;
pub mod tls;
pub mod tracing;
