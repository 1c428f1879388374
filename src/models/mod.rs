pub mod account;
pub mod fund;
pub mod price;
pub mod response;

pub use account::*;
pub use fund::*;
pub use price::*;
pub use response::*;
