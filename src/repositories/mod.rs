pub mod repository_trait;
pub mod file_state_repository;
pub mod memory_state_repository;

pub use repository_trait::StateStore;
pub use file_state_repository::FileStateRepository;
pub use memory_state_repository::MemoryStateRepository;
