pub mod analyzers;
pub mod config;
pub mod model;
pub mod output;
pub mod recorder;
pub mod script;
pub mod store;
