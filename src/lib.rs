pub mod api;

pub mod app;

pub mod award_grid;

pub mod config;

pub mod gate;

pub mod logging;

pub mod marquee;

pub mod refresh;

pub mod sequencer;

pub mod wheel;
