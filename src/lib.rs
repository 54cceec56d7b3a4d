pub mod console_interface;
pub mod core;
pub mod levels;
pub mod models;
pub mod scores;
pub mod session;

#[cfg(test)]
mod test;
