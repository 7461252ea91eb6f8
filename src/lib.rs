//! # IQX Garage Door
//!
//! A simulated garage door for smart-home hosts: a timed state machine with configurable travel and
//! auto-close durations whose settled position survives restarts.

pub mod config;
pub mod controllers;
pub mod errors;
pub mod init;
pub mod models;
pub mod repositories;
pub mod state_management;
pub mod utils;
