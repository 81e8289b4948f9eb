use super::{CompletionTracker, LessonStore, StoreError};
use crate::models::{BlockId, CourseAggregates, CourseId, Lesson, LessonId, UserId};
use std::collections::{HashMap, HashSet};

/// In-memory store backing tests and the inspection CLI. It holds just
/// enough state to drive the lesson workflows end to end; it is not a model
/// of the platform's real persistence.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    lessons: HashMap<LessonId, Lesson>,
    aggregates: HashMap<CourseId, CourseAggregates>,
    completions: HashMap<(UserId, LessonId), HashSet<BlockId>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed a lesson record, standing in for the catalog's create flow.
    pub fn insert_lesson(&mut self, lesson: Lesson) {
        self.lessons.insert(lesson.id.clone(), lesson);
    }

    /// Drop a lesson record, standing in for the catalog's delete flow.
    /// Callers recompute the course aggregates afterwards, as the catalog
    /// does.
    pub fn remove_lesson(&mut self, id: &LessonId) {
        self.lessons.remove(id);
    }

    pub fn mark_completed(&mut self, user: &UserId, lesson: &LessonId, block: BlockId) {
        self.completions
            .entry((user.clone(), lesson.clone()))
            .or_default()
            .insert(block);
    }

    /// The aggregates as last persisted for `course_id`, if any.
    pub fn aggregates_for(&self, course_id: &CourseId) -> Option<CourseAggregates> {
        self.aggregates.get(course_id).copied()
    }
}

impl LessonStore for MemoryStore {
    fn get_lesson(&self, id: &LessonId) -> Result<Lesson, StoreError> {
        self.lessons
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::LessonNotFound(id.clone()))
    }

    fn save_lesson(
        &mut self,
        id: &LessonId,
        content: &str,
        xp_reward: u32,
    ) -> Result<(), StoreError> {
        let lesson = self
            .lessons
            .get_mut(id)
            .ok_or_else(|| StoreError::LessonNotFound(id.clone()))?;
        lesson.content = content.to_string();
        lesson.xp_reward = xp_reward;
        Ok(())
    }

    fn list_lessons_for_course(&self, course_id: &CourseId) -> Result<Vec<Lesson>, StoreError> {
        let mut lessons: Vec<Lesson> = self
            .lessons
            .values()
            .filter(|lesson| &lesson.course_id == course_id)
            .cloned()
            .collect();
        // HashMap iteration order is arbitrary; keep listings stable.
        lessons.sort_by(|a, b| a.id.as_str().cmp(b.id.as_str()));
        Ok(lessons)
    }

    fn save_course_aggregates(
        &mut self,
        course_id: &CourseId,
        aggregates: CourseAggregates,
    ) -> Result<(), StoreError> {
        self.aggregates.insert(course_id.clone(), aggregates);
        Ok(())
    }
}

impl CompletionTracker for MemoryStore {
    fn completed_practice_blocks(
        &self,
        user: &UserId,
        lesson: &LessonId,
    ) -> Result<HashSet<BlockId>, StoreError> {
        Ok(self
            .completions
            .get(&(user.clone(), lesson.clone()))
            .cloned()
            .unwrap_or_default())
    }
}
