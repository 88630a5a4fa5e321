//! Collaborator contracts the core depends on.

pub mod authority;
pub mod clock;
pub mod notifier;
pub mod store;
pub mod submissions;

pub use authority::{RouteAuthority, ScopedRouteAuthority};
pub use clock::{Clock, ManualClock, SystemClock};
pub use notifier::{Notification, NotifyError, Notifier, spawn_notification};
pub use store::{WalkStore, WalkTransaction};
pub use submissions::SubmissionRegistry;
