pub mod cli;
pub mod controller;
pub mod error;
pub mod gpx;
pub mod input;
pub mod map;
pub mod storage;
pub mod types;
pub mod utils;
pub mod view;
