mod memory;

pub use memory::MemoryStore;

use crate::content::{self, ContentEntry, ContentError, DecodedContent};
use crate::editing::LessonEditor;
use crate::models::{Block, BlockId, CourseAggregates, CourseId, Lesson, LessonId, UserId};
use crate::render::{RenderInstruction, Renderer};
use crate::xp;
use std::collections::HashSet;

/// Errors surfaced by lesson stores and completion trackers.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Lesson not found: {0}")]
    LessonNotFound(LessonId),
    #[error("Storage backend error: {0}")]
    Backend(#[from] anyhow::Error),
}

/// Persistence boundary for lesson records and course aggregates.
///
/// Backend failures pass through as [`StoreError`] untranslated; the engine
/// adds no retry or remapping layer on top.
pub trait LessonStore {
    fn get_lesson(&self, id: &LessonId) -> Result<Lesson, StoreError>;

    /// Overwrite an existing lesson's content payload and XP reward. Lesson
    /// records themselves are created and deleted by the catalog, outside
    /// this subsystem.
    fn save_lesson(
        &mut self,
        id: &LessonId,
        content: &str,
        xp_reward: u32,
    ) -> Result<(), StoreError>;

    fn list_lessons_for_course(&self, course_id: &CourseId) -> Result<Vec<Lesson>, StoreError>;

    fn save_course_aggregates(
        &mut self,
        course_id: &CourseId,
        aggregates: CourseAggregates,
    ) -> Result<(), StoreError>;
}

/// Read-side lookup of the practice blocks a learner has completed.
pub trait CompletionTracker {
    fn completed_practice_blocks(
        &self,
        user: &UserId,
        lesson: &LessonId,
    ) -> Result<HashSet<BlockId>, StoreError>;
}

/// Errors from the lesson workflows.
#[derive(Debug, thiserror::Error)]
pub enum ServiceError {
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("Failed to encode lesson content: {0}")]
    Content(#[from] ContentError),
    #[error("Lesson {0} still has legacy content; migrate it before block editing")]
    LegacyContent(LessonId),
    #[error("Lesson {lesson} has unsupported entries {type_tags:?}; editing would drop them")]
    UnsupportedEntries {
        lesson: LessonId,
        type_tags: Vec<String>,
    },
}

/// Orchestrates the lesson workflows over injected storage: save with XP
/// derivation, aggregate recomputation, editor loading, and per-learner
/// rendering.
///
/// Mutating workflows take `&mut self`, so any service value has exactly one
/// writer by construction; sharing one across tasks requires an explicit
/// wrapper rather than quietly racing through `&self`.
pub struct LessonService<S, C> {
    store: S,
    completions: C,
    renderer: Renderer,
}

impl<S: LessonStore, C: CompletionTracker> LessonService<S, C> {
    pub fn new(store: S, completions: C, renderer: Renderer) -> Self {
        Self {
            store,
            completions,
            renderer,
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut S {
        &mut self.store
    }

    /// Persist an edited block sequence: encode it, derive the lesson's XP
    /// reward, write the record, then rebuild the owning course's
    /// aggregates. Returns the stored XP reward.
    pub fn save_lesson(&mut self, id: &LessonId, blocks: &[Block]) -> Result<u32, ServiceError> {
        let lesson = self.store.get_lesson(id)?;
        let content = content::serialize(blocks)?;
        let xp_reward = xp::lesson_xp(blocks);
        self.store.save_lesson(id, &content, xp_reward)?;
        tracing::debug!(lesson = %id, xp_reward, "saved lesson content");
        self.recompute_course_aggregates(&lesson.course_id)?;
        Ok(xp_reward)
    }

    /// Rebuild one course's aggregates from its current lessons and persist
    /// them. Called after every lesson save here; the catalog is expected to
    /// call it after creating or deleting lesson records too.
    pub fn recompute_course_aggregates(
        &mut self,
        course_id: &CourseId,
    ) -> Result<CourseAggregates, ServiceError> {
        let lessons = self.store.list_lessons_for_course(course_id)?;
        let aggregates = xp::course_aggregates(&lessons);
        self.store.save_course_aggregates(course_id, aggregates)?;
        tracing::debug!(
            course = %course_id,
            total_lessons = aggregates.total_lessons,
            xp_reward = aggregates.xp_reward,
            "recomputed course aggregates"
        );
        Ok(aggregates)
    }

    /// Load a lesson into an editor.
    ///
    /// Refuses payloads the editor could not round-trip losslessly: legacy
    /// documents, and sequences with unsupported entries (a later save would
    /// silently drop them).
    pub fn load_editor(&self, id: &LessonId) -> Result<LessonEditor, ServiceError> {
        let lesson = self.store.get_lesson(id)?;
        match content::deserialize(&lesson.content) {
            DecodedContent::Legacy(_) => Err(ServiceError::LegacyContent(id.clone())),
            DecodedContent::Structured(entries) => {
                let mut blocks = Vec::with_capacity(entries.len());
                let mut type_tags = Vec::new();
                for entry in entries {
                    match entry {
                        ContentEntry::Block(block) => blocks.push(block),
                        ContentEntry::Unsupported(entry) => type_tags.push(entry.type_tag),
                    }
                }
                if type_tags.is_empty() {
                    Ok(LessonEditor::from_blocks(blocks))
                } else {
                    Err(ServiceError::UnsupportedEntries {
                        lesson: id.clone(),
                        type_tags,
                    })
                }
            }
        }
    }

    /// Render a lesson for one learner, with their practice completions
    /// resolved into the instructions.
    pub fn render_for_user(
        &self,
        user: &UserId,
        id: &LessonId,
    ) -> Result<Vec<RenderInstruction>, ServiceError> {
        let lesson = self.store.get_lesson(id)?;
        let completed = self.completions.completed_practice_blocks(user, id)?;
        Ok(self.renderer.render(&lesson.content, &completed).collect())
    }
}
