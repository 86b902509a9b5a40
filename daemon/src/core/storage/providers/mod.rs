mod balance;
mod file;
mod rates;
mod snapshot;
mod user;
mod view;
mod withdrawal;

pub use balance::*;
pub use file::*;
pub use rates::*;
pub use snapshot::*;
pub use user::*;
pub use view::*;
pub use withdrawal::*;
