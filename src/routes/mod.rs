pub mod notifications;

pub mod sweep;

pub mod system;

pub use notifications::configure_notification_routes;
pub use sweep::configure_sweep_routes;
pub use system::configure_system_routes;
