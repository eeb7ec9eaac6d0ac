pub mod formation;
pub mod gesture;
pub mod mailbox;
pub mod session;

pub use formation::*;
pub use gesture::*;
pub use mailbox::*;
pub use session::*;
