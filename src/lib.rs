// src/lib.rs — Library root for majlis

pub mod api;
pub mod app;
pub mod bot;
pub mod catalog;
pub mod cli;
pub mod game;
pub mod infra;
pub mod ledger;
pub mod provider;
pub mod store;
pub mod sweeper;
pub mod verify;
