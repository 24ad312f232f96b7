// Application layer - Use case interactors

pub mod concat_interactor;
pub mod container;
pub mod fanout;
pub mod render_interactor;
pub mod resolve_interactor;

// Re-export interactors
pub use concat_interactor::{ConcatInteractor, ConcatRequest, PipelineSettings};
pub use container::{AppContainer, DefaultAppContainer};
pub use resolve_interactor::ClipResolver;
