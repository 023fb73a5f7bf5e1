#![doc = "The `todo_api` library crate."]
#![doc = ""]
#![doc = "This crate contains the domain models, the generic repository layer"]
#![doc = "(filter translation, pagination, record mutation), authentication"]
#![doc = "mechanisms, routing configuration, and error handling for the todo-api"]
#![doc = "application. It is used by the main binary (`main.rs`) to construct and"]
#![doc = "run the application."]

pub mod auth;
pub mod config;
pub mod error;
pub mod models;
pub mod repository;
pub mod request_id;
pub mod routes;
