// Library exports for the heuristic Battlesnake
// This allows the server, the replay tool and other utilities to share the decision pipeline

pub mod bot;
pub mod config;
pub mod debug_logger;
pub mod engine;
pub mod food;
pub mod grid;
pub mod observer;
pub mod replay;
pub mod safety;
pub mod selector;
pub mod space;
pub mod types;
