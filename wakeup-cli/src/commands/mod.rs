pub mod interval;
pub mod logs;
pub mod resources;
pub mod serve;
pub mod settings;
