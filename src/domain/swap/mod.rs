pub mod abi;

mod token;
pub use token::*;

mod amount;
pub use amount::*;

mod allowance;
pub use allowance::*;

mod balance;
pub use balance::*;

mod path;
pub use path::*;

mod executor;
pub use executor::*;

mod batch;
pub use batch::*;
