pub mod state_manager;
pub mod command_processor;
pub mod event_dispatcher;
pub mod state_manager_lifecycle;
pub mod transition_scheduler;

pub use state_manager::GarageDoorStateManager;
pub use event_dispatcher::{EventDispatcher, NotificationSink, RecordingSink};
