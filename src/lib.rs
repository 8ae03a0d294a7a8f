pub mod buffer;
pub mod clock;
pub mod config;
pub mod feed;
pub mod logging;
pub mod random;
pub mod reading;
pub mod render;
pub mod timer;
pub mod twin;
pub mod view;
