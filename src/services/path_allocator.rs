//! Structural identity of a reply: id, materialized path, depth and thread.
//!
//! Roots are allocated entirely in process. A child's position depends on its parent and on
//! the per-parent counter, so it is computed by SurrealQL statements appended to the same
//! transaction that inserts the reply. Two writers under one parent both write the same
//! counter record; the store lets only one of them commit with a given sequence value.

use uuid::Uuid;

use crate::database::query_builder::SurrealQueryBuilder;
use crate::database::surrdb_utils::{THROW_MAX_DEPTH_EXCEEDED, THROW_PARENT_NOT_FOUND};
use crate::database::table_names::{REPLY_COUNTER_TABLE_NAME, REPLY_TABLE_NAME};

/// Width of each zero-padded child segment; wider sequence numbers are kept as they are.
pub const SEGMENT_WIDTH: usize = 4;
pub const PATH_SEPARATOR: char = '/';

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Allocation {
    pub id: String,
    pub path: String,
    pub depth: u8,
    pub thread_id: String,
}

pub fn generate_reply_id() -> String {
    Uuid::now_v7().to_string()
}

#[derive(Debug, Clone, Copy)]
pub struct PathAllocator {
    pub max_depth: u8,
}

impl PathAllocator {
    pub fn new(max_depth: u8) -> Self {
        Self { max_depth }
    }

    pub fn allocate_root(&self) -> Allocation {
        let id = generate_reply_id();
        Allocation {
            path: id.clone(),
            depth: 0,
            thread_id: id.clone(),
            id,
        }
    }

    /// Binds `$reply_id`, `$parent_id`, `$path`, `$depth` and `$thread_id` for a root.
    pub fn build_root_query(
        &self,
        query: SurrealQueryBuilder,
        allocation: &Allocation,
    ) -> SurrealQueryBuilder {
        query
            .query("LET $parent_id = NONE;")
            .bind_var("reply_id", allocation.id.clone())
            .bind_var("path", allocation.path.clone())
            .bind_var("depth", allocation.depth)
            .bind_var("thread_id", allocation.thread_id.clone())
    }

    /// Appends the child allocation statements. Expects `$post_id` to be bound; leaves
    /// `$parent_rec`, `$path`, `$depth` and `$thread_id` defined for the insert that follows.
    pub fn build_child_query(
        &self,
        query: SurrealQueryBuilder,
        reply_id: &str,
        parent_id: &str,
    ) -> SurrealQueryBuilder {
        let sep = PATH_SEPARATOR;
        query
            .query(format!(
                "LET $parent_rec = type::thing(\"{REPLY_TABLE_NAME}\", $parent_id);
LET $parent_reply = (SELECT * FROM $parent_rec WHERE post_id = $post_id)[0];
IF $parent_reply == NONE {{ THROW \"{THROW_PARENT_NOT_FOUND}\"; }};
LET $depth = $parent_reply.depth + 1;
IF $depth > $max_depth {{ THROW \"{THROW_MAX_DEPTH_EXCEEDED}\"; }};
LET $counter_rec = type::thing(\"{REPLY_COUNTER_TABLE_NAME}\", [$post_id, $parent_id]);
LET $seq = (SELECT VALUE next FROM $counter_rec)[0] ?? 1;
UPSERT $counter_rec SET post_id = $post_id, parent_id = $parent_id, next = $seq + 1, updated_at = $now;
LET $seq_str = <string> $seq;
LET $segment = IF string::len($seq_str) >= {SEGMENT_WIDTH} THEN $seq_str ELSE string::repeat(\"0\", {SEGMENT_WIDTH} - string::len($seq_str)) + $seq_str END;
LET $path = $parent_reply.path + \"{sep}\" + $segment;
LET $thread_id = $parent_reply.thread_id;"
            ))
            .bind_var("reply_id", reply_id)
            .bind_var("parent_id", parent_id)
            .bind_var("max_depth", self.max_depth)
    }
}
