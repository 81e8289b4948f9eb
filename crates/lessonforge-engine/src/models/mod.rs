pub mod block;
pub mod lesson;

pub use block::{Block, BlockId, BlockType, HeadingLevel, Language, DEFAULT_PRACTICE_XP};
pub use lesson::{CourseAggregates, CourseId, Lesson, LessonId, UserId};
