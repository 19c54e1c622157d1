//! Query ORM Layer
//!
//! Building blocks for filtered entity listings:
//! - [`SqlValue`]: the only parameter type bound to SQL
//! - [`Condition`]: boolean tree compiled into a parameterized expression
//! - [`EntityDef`]: static description of an entity table, its relations and
//!   derived "missing" fields
//! - [`clause`]: one filter criterion in, one [`Clause`] out
//! - [`builder`]: clauses plus sort and pagination in, id and count statements out
//!
//! ```rust,ignore
//! let assembled = SelectQuery::new("movies")
//!     .clause(is_missing_clause(&MOVIES, "front_image")?)
//!     .order_by(sort_clause(&MOVIES, &find))
//!     .paginate(find.pagination())
//!     .assemble();
//! ```

pub mod builder;
pub mod clause;
pub mod condition;
pub mod entity;
pub mod value;

pub use builder::{sort_clause, AssembledQuery, SelectQuery, Statement};
pub use clause::{is_missing_clause, multi_criterion_clause, search_clause, Clause, Scope};
pub use condition::Condition;
pub use entity::{EntityDef, MissingField, Relation, RelationLink};
pub use value::{bind_all, SqlValue};
