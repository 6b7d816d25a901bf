pub mod cli;
pub mod config;
pub mod ctx;
pub mod error;
pub mod io;
pub mod par;
pub mod pipeline;
pub mod recist;
pub mod reference;
pub mod schema;
pub mod sim;
