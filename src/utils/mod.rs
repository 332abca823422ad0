mod polling;
pub use polling::*;

mod time;
pub use time::*;

#[cfg(test)]
pub mod mocks;
