//! HTTP front end for the vehicle price predictor

pub mod api;
pub mod config;
pub mod form;
