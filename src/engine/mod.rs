//! The form engine: schema model, recursive tree operations, the builder
//! state machine and the viewer/submission pipeline.
//!
//! Everything in here is synchronous and value-oriented: tree operations take
//! a forest by value and return a new one, so cursors held elsewhere (the
//! builder's selection and insertion target) can never point into stale
//! shared structure. Persistence is delegated to [`crate::store`].

pub mod builder;
pub mod model;
pub mod tree;
pub mod viewer;

pub use builder::FormBuilder;
pub use model::{AnswerValue, FieldPatch, FieldType, FormField, FormResponse, FormSchema};
pub use tree::{InsertTarget, MoveDirection};
pub use viewer::{FormViewer, SubmitOutcome, ViewerPhase};
