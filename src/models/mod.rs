mod asset;
pub use asset::*;

mod intent;
pub use intent::*;

mod route;
pub use route::*;

mod attempt;
pub use attempt::*;

mod error;
pub use error::*;

mod policy;
pub use policy::*;
