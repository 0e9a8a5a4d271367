pub mod health;
pub mod diagnostics;
pub mod insight;
pub mod room;
pub mod session;
pub mod messages;
pub mod error;

pub use health::*;
pub use diagnostics::*;
pub use insight::*;
pub use room::*;
pub use session::*;
pub use messages::*;
pub use error::*;
