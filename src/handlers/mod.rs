pub mod health;
pub mod diagnostics;
pub mod room_list;
pub mod room_detail;
pub mod room_delete;
pub mod session_list;
pub mod session_insights;
pub mod session_delete;

pub use health::*;
pub use diagnostics::*;
pub use room_list::*;
pub use room_detail::*;
pub use room_delete::*;
pub use session_list::*;
pub use session_insights::*;
pub use session_delete::*;
