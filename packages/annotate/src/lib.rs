//! # Marginalia Annotate
//!
//! Named, decorated annotations over regions of an editable HTML document.
//!
//! ## Architecture
//!
//! ```text
//! selection
//!     ↓
//! range_walk → segments of sibling nodes
//!     ↓
//! classify (per node) → ChildContext
//!     ↓
//! wrap: inline runs share one wrapper, direct blocks are marked in place,
//!       wrap blocks get a wrapper of their own
//!     ↓
//! markers: class + uid + name (+ bookkeeping on direct blocks)
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use marginalia_annotate::{Annotator, AnnotatorConfig, AnnotatorSettings, DecoratorData};
//! use marginalia_editor::Editor;
//!
//! let mut annotator = Annotator::new(AnnotatorConfig::default())?;
//! annotator.register("comment", AnnotatorSettings::default());
//!
//! let mut editor = Editor::from_html("<p>hello world</p>")?;
//! annotator.setup(&mut editor);
//! editor.select_all();
//!
//! let state = annotator.annotate(&mut editor, "comment", DecoratorData::new())?;
//! println!("{} -> {} elements", state.uid, state.nodes.len());
//! ```

mod annotator;
pub mod changes;
pub mod config;
pub mod context;
pub mod decorator;
mod errors;
pub mod identification;
pub mod markings;
pub mod registry;
pub mod remove;
pub mod uid;
pub mod wrapping;

pub use annotator::{Annotator, UID_KEY};
pub use changes::{AnnotationState, ChangeCallback};
pub use config::{AnnotatorConfig, ClassifierRules};
pub use context::{classify, ChildContext};
pub use decorator::{Decoration, Decorator, DecoratorData, PlainDecorator};
pub use errors::{AnnotateError, AnnotateResult, DecorateError};
pub use identification::IdentifiedAnnotation;
pub use registry::{AnnotationsRegistry, AnnotatorSettings};
pub use uid::UidGenerator;
