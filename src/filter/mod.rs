//! Filter compilation and matching
//!
//! A filter is written as a JSON object in a MongoDB-like operator language
//! and compiled once into a tree of [`FilterNode`]s, which can then be matched
//! against any number of documents.
//!
//! # Syntax
//!
//! ```text
//! {"field": value}                  field equals value (implicit $eq)
//! {"field": [a, b]}                 field is one of the values (implicit $in)
//! {"field": [{...}, {...}]}         any of the conditions on field (implicit $ctxOr)
//! {"field": {"$op": operand, ...}}  every condition on field (implicit $ctxAnd)
//! {"$op": operand}                  operator on the inherited context
//! [{...}, {...}]                    any of the filters (implicit $or)
//! ```
//!
//! # Examples
//!
//! ```text
//! {"user.level": {"$gt": 10, "$lt": 20}}          # 10 < level < 20
//! {"user.race": ["elf", "ork"]}                    # race is elf or ork
//! {"user.age": {"$gt": {"$val": "user.level"}}}    # age above the user's level
//! {"avg": {"$floor": {"$gt": 1}}}                  # floor(avg) > 1
//! {"$or": [{"a": 1}, {"$not": {"b": {"$regex": "/x/i"}}}]}
//! ```

mod compiled;
mod matcher;
mod node;
pub mod parser;

pub use compiled::Filter;
pub use node::{FilterNode, Operand};
pub use parser::{decode_text, parse, parse_node, parse_operand};
