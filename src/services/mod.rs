pub mod notifications;
pub mod sweep;

pub use notifications::NotificationService;
pub use sweep::{SweepRun, SweepService};
