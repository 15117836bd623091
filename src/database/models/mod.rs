pub mod subscriber;
pub mod sent_notification;

pub use subscriber::*;
pub use sent_notification::*;
