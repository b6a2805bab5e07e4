// Application layer - Use case interactors

pub mod batch_interactor;
pub mod container;
pub mod task_interactor;

// Re-export interactors
pub use batch_interactor::TaskOrchestrator;
pub use container::AppContainer;
pub use task_interactor::TaskInteractor;
