//! Vehicle fleet registry
//!
//! A small registry of vehicles behind one repository contract, with a JSON
//! document and a PostgreSQL table as interchangeable storage backends. The
//! `fleet` binary and the `fleet-web` server are thin front ends over it.

pub mod cli;
pub mod config;
pub mod controllers;
pub mod dto;
pub mod middleware;
pub mod models;
pub mod repositories;
pub mod routes;
pub mod state;
pub mod utils;
