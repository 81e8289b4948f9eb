use crate::models::{Block, BlockId, BlockType, HeadingLevel, Language, DEFAULT_PRACTICE_XP};

/// Direction for [`move_block`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// In-memory editing surface over one lesson's block sequence.
///
/// Every mutation hands back the full updated sequence, matching the
/// autosave flow: the caller persists whatever it receives and never
/// reasons about deltas. Operations on ids that are no longer present are
/// no-ops rather than errors, which absorbs races against stale UI state.
///
/// The operations themselves are the module-level pure functions below; the
/// editor just owns the working copy and threads it through them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct LessonEditor {
    blocks: Vec<Block>,
}

impl LessonEditor {
    /// Editor over an empty sequence, for authoring from scratch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Editor over an existing sequence, typically decoded from a saved
    /// lesson.
    pub fn from_blocks(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn into_blocks(self) -> Vec<Block> {
        self.blocks
    }

    pub fn add_block(&mut self, block_type: BlockType) -> &[Block] {
        self.blocks = add_block(&self.blocks, block_type);
        &self.blocks
    }

    pub fn update_block(&mut self, id: &BlockId, updated: Block) -> &[Block] {
        self.blocks = update_block(&self.blocks, id, updated);
        &self.blocks
    }

    pub fn delete_block(&mut self, id: &BlockId) -> &[Block] {
        self.blocks = delete_block(&self.blocks, id);
        &self.blocks
    }

    pub fn move_block(&mut self, id: &BlockId, direction: MoveDirection) -> &[Block] {
        self.blocks = move_block(&self.blocks, id, direction);
        &self.blocks
    }
}

/// Append a fresh block carrying the variant's authoring defaults and a
/// newly generated id.
pub fn add_block(blocks: &[Block], block_type: BlockType) -> Vec<Block> {
    let mut next = blocks.to_vec();
    next.push(default_block(block_type, BlockId::new()));
    next
}

/// Replace the fields of the block matching `id`.
///
/// The matched block keeps its identity no matter what id the replacement
/// value carries, and the replacement must be the same variant; a missing id
/// or a variant mismatch leaves the sequence unchanged.
pub fn update_block(blocks: &[Block], id: &BlockId, updated: Block) -> Vec<Block> {
    let mut next = blocks.to_vec();
    if let Some(slot) = next.iter_mut().find(|block| block.id() == id)
        && slot.block_type() == updated.block_type()
    {
        *slot = with_id(updated, id.clone());
    }
    next
}

/// Remove the block matching `id`; a missing id is a no-op. Output blocks
/// linking to the removed block keep their link; it dangles until render
/// time drops it.
pub fn delete_block(blocks: &[Block], id: &BlockId) -> Vec<Block> {
    blocks
        .iter()
        .filter(|block| block.id() != id)
        .cloned()
        .collect()
}

/// Swap the block matching `id` with its neighbour in the given direction.
/// At the boundary, or for a missing id, the sequence is unchanged.
pub fn move_block(blocks: &[Block], id: &BlockId, direction: MoveDirection) -> Vec<Block> {
    let mut next = blocks.to_vec();
    let Some(index) = next.iter().position(|block| block.id() == id) else {
        return next;
    };
    match direction {
        MoveDirection::Up if index > 0 => next.swap(index, index - 1),
        MoveDirection::Down if index + 1 < next.len() => next.swap(index, index + 1),
        _ => {}
    }
    next
}

fn default_block(block_type: BlockType, id: BlockId) -> Block {
    match block_type {
        BlockType::Text => Block::Text {
            id,
            content: String::new(),
            heading: HeadingLevel::Paragraph,
        },
        BlockType::Code => Block::Code {
            id,
            language: Language::default(),
            code: String::new(),
            title: None,
            show_line_numbers: true,
        },
        BlockType::Output => Block::Output {
            id,
            output: String::new(),
            linked_code_block_id: None,
        },
        BlockType::Explanation => Block::Explanation {
            id,
            content: String::new(),
        },
        BlockType::Practice => Block::Practice {
            id,
            question: String::new(),
            expected_output: None,
            validation_rule: String::new(),
            xp_value: DEFAULT_PRACTICE_XP,
            hints: Vec::new(),
        },
    }
}

fn with_id(block: Block, id: BlockId) -> Block {
    match block {
        Block::Text {
            content, heading, ..
        } => Block::Text {
            id,
            content,
            heading,
        },
        Block::Code {
            language,
            code,
            title,
            show_line_numbers,
            ..
        } => Block::Code {
            id,
            language,
            code,
            title,
            show_line_numbers,
        },
        Block::Output {
            output,
            linked_code_block_id,
            ..
        } => Block::Output {
            id,
            output,
            linked_code_block_id,
        },
        Block::Explanation { content, .. } => Block::Explanation { id, content },
        Block::Practice {
            question,
            expected_output,
            validation_rule,
            xp_value,
            hints,
            ..
        } => Block::Practice {
            id,
            question,
            expected_output,
            validation_rule,
            xp_value,
            hints,
        },
    }
}
