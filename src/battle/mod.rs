pub mod ai;
pub mod engine;
pub mod manager;
pub mod state;

#[cfg(test)]
mod tests;
