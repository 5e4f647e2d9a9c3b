//! Recursive primitives over a field forest.
//!
//! Every mutating operation takes the forest by value and returns the new
//! forest; the path down to a change is rebuilt while untouched subtrees are
//! moved as-is. Field ids are assumed unique across the whole tree — a forest
//! with duplicate ids is invalid input, and lookups settle for the first
//! match without trying to detect the violation.

use super::model::{FieldPatch, FormField};

/// Cursor naming the column of a row container where the next insert lands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InsertTarget {
    pub parent_row_id: String,
    pub column_index: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveDirection {
    Up,
    Down,
}

/// Depth-first search through every column of every row node.
pub fn find_by_id<'a>(fields: &'a [FormField], id: &str) -> Option<&'a FormField> {
    for field in fields {
        if field.id == id {
            return Some(field);
        }
        for column in &field.columns {
            if let Some(found) = find_by_id(column, id) {
                return Some(found);
            }
        }
    }
    None
}

/// Insert `new_field` at `target`, or append to the root sequence when no
/// target is set. A target naming a row or column that no longer exists is
/// silently absorbed: the forest comes back unchanged. That keeps a stale
/// insertion cursor (pointing at a since-deleted row) from breaking the
/// caller's flow.
pub fn insert_at(
    fields: Vec<FormField>,
    target: Option<&InsertTarget>,
    new_field: FormField,
) -> Vec<FormField> {
    match target {
        None => {
            let mut fields = fields;
            fields.push(new_field);
            fields
        }
        Some(target) => insert_into_target(fields, target, &new_field),
    }
}

fn insert_into_target(
    fields: Vec<FormField>,
    target: &InsertTarget,
    new_field: &FormField,
) -> Vec<FormField> {
    fields
        .into_iter()
        .map(|mut field| {
            if field.id == target.parent_row_id && field.field_type.is_container() {
                if let Some(column) = field.columns.get_mut(target.column_index) {
                    column.push(new_field.clone());
                }
            } else {
                field.columns = field
                    .columns
                    .into_iter()
                    .map(|column| insert_into_target(column, target, new_field))
                    .collect();
            }
            field
        })
        .collect()
}

/// Rewrite the node matching `id` by merging the patch into it, recursing
/// through every row's columns.
pub fn update_by_id(fields: Vec<FormField>, id: &str, patch: &FieldPatch) -> Vec<FormField> {
    fields
        .into_iter()
        .map(|mut field| {
            if field.id == id {
                field.apply(patch);
            } else {
                field.columns = field
                    .columns
                    .into_iter()
                    .map(|column| update_by_id(column, id, patch))
                    .collect();
            }
            field
        })
        .collect()
}

/// Filter the node out of whichever sequence contains it. Removing a row
/// takes its whole subtree with it — the columns are owned by the node value.
pub fn remove_by_id(fields: Vec<FormField>, id: &str) -> Vec<FormField> {
    fields
        .into_iter()
        .filter(|field| field.id != id)
        .map(|mut field| {
            field.columns = field
                .columns
                .into_iter()
                .map(|column| remove_by_id(column, id))
                .collect();
            field
        })
        .collect()
}

/// Swap the element at `index` with its neighbor in the given direction.
/// No-op at either boundary or for an out-of-range index.
pub fn move_within_siblings<T>(mut list: Vec<T>, index: usize, direction: MoveDirection) -> Vec<T> {
    match direction {
        MoveDirection::Up if index > 0 && index < list.len() => list.swap(index, index - 1),
        MoveDirection::Down if index + 1 < list.len() => list.swap(index, index + 1),
        _ => {}
    }
    list
}

/// Locate the sibling list containing `id` (the root sequence or one row
/// column) and reorder within it. Cross-container moves are not a thing.
pub fn move_by_id(fields: Vec<FormField>, id: &str, direction: MoveDirection) -> Vec<FormField> {
    if let Some(index) = fields.iter().position(|field| field.id == id) {
        return move_within_siblings(fields, index, direction);
    }
    fields
        .into_iter()
        .map(|mut field| {
            field.columns = field
                .columns
                .into_iter()
                .map(|column| move_by_id(column, id, direction))
                .collect();
            field
        })
        .collect()
}

/// Pre-order traversal descending into every column of every row, yielding
/// all leaf and container nodes in order. This is the order key collisions
/// resolve in: the later field wins.
pub fn flatten(fields: &[FormField]) -> Vec<&FormField> {
    let mut out = Vec::new();
    flatten_into(fields, &mut out);
    out
}

fn flatten_into<'a>(fields: &'a [FormField], out: &mut Vec<&'a FormField>) {
    for field in fields {
        out.push(field);
        for column in &field.columns {
            flatten_into(column, out);
        }
    }
}
