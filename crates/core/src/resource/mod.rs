//! Generic resource screens and the per-entity configuration they run on.

mod entities;
pub mod form;
pub mod forms;
mod kind;
mod lookup;
mod screen;

pub use entities::Resource;
pub use form::{EntityForm, FieldKind, FieldSpec, FormMode, FormSession};
pub use kind::ResourceKind;
pub use lookup::{Lookup, LookupEntry, Lookups};
pub use screen::{LoadState, Notice, NoticeLevel, Overlay, ResourceScreen, Submit};
