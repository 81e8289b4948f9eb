use crate::models::{Block, CourseAggregates, Lesson};

/// XP every lesson awards on completion, before practice bonuses.
pub const LESSON_BASE_XP: u32 = 25;

/// Total XP a lesson is worth: the completion base plus every practice
/// block's value. No other block variant contributes. Practice values come
/// straight off the wire, so the sum clamps at `u32::MAX` instead of
/// overflowing.
pub fn lesson_xp(blocks: &[Block]) -> u32 {
    let practice_total = blocks.iter().fold(0u32, |total, block| match block {
        Block::Practice { xp_value, .. } => total.saturating_add(*xp_value),
        _ => total,
    });
    LESSON_BASE_XP.saturating_add(practice_total)
}

/// Recompute a course's totals from scratch over its lessons. Aggregates are
/// always rebuilt whole, never adjusted incrementally, so they cannot drift
/// from the lessons they summarise.
pub fn course_aggregates<'a, I>(lessons: I) -> CourseAggregates
where
    I: IntoIterator<Item = &'a Lesson>,
{
    let mut aggregates = CourseAggregates::default();
    for lesson in lessons {
        aggregates.total_lessons += 1;
        aggregates.xp_reward = aggregates.xp_reward.saturating_add(lesson.xp_reward);
    }
    aggregates
}
