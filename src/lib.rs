//! A terminal maze where the player walks around collecting the letters of
//! a hidden phrase.

pub mod app;
pub mod config;
pub mod error;
pub mod game;
pub mod input;
pub mod logging;
pub mod maze;
pub mod render;
