mod logging;
pub use logging::*;

mod rpc;
pub use rpc::*;

mod swap;
pub use swap::*;
