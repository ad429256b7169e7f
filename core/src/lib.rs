pub mod aggregation;
pub mod calculations;
pub mod commentary;
pub mod db;
pub mod error;
pub mod gate;
pub mod models;
pub mod service;
pub mod validation;
