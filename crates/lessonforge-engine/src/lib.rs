pub mod content;
pub mod editing;
pub mod markdown;
pub mod models;
pub mod render;
pub mod store;
pub mod xp;

// Re-export key types for easier usage
pub use content::{ContentEntry, DecodedContent, UnsupportedEntry};
pub use editing::{LessonEditor, MoveDirection};
pub use models::{block::*, lesson::*};
pub use render::{RenderInstruction, Renderer, languages::*};
pub use store::{
    CompletionTracker, LessonService, LessonStore, MemoryStore, ServiceError, StoreError,
};
