pub mod services;

pub use services::{WalkPorts, WalkServices};
