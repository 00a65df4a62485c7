mod cursor;
mod move_list;

pub use move_list::{format_line, move_list, MoveListEntry};
