//! # Annotator
//!
//! The per-session entry point: owns the registry, the uid generator and the
//! change tracker, and drives the editor through annotate and remove.
//!
//! ## Flow
//!
//! ```text
//! annotate(name, data)
//!   → lookup (UnknownAnnotation before anything is touched)
//!   → uid + decoration
//!   → transaction { word grab | placeholder | bookmark + wrap per range }
//!   → node_changed
//! ```

use crate::changes::{AnnotationState, ChangeCallback, ChangeTracker};
use crate::config::{AnnotatorConfig, ClassifierRules};
use crate::decorator::DecoratorData;
use crate::errors::{AnnotateError, AnnotateResult};
use crate::identification::{find_all, find_markers, identify, IdentifiedAnnotation};
use crate::markings::{Marker, DATA_ANNOTATION_ACTIVE};
use crate::registry::{AnnotationsRegistry, AnnotatorSettings};
use crate::remove::{remove_annotations, remove_named};
use crate::uid::UidGenerator;
use crate::wrapping::annotate_with_bookmark;
use marginalia_dom::NodeId;
use marginalia_editor::{bookmark, Editor};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, info, instrument};

/// Data key that pins the uid of an annotate call
pub const UID_KEY: &str = "uid";

#[derive(Debug)]
pub struct Annotator {
    config: AnnotatorConfig,
    rules: ClassifierRules,
    registry: AnnotationsRegistry,
    changes: ChangeTracker,
    uids: UidGenerator,
}

impl Annotator {
    pub fn new(config: AnnotatorConfig) -> AnnotateResult<Self> {
        let rules = config.rules()?;
        let uids = UidGenerator::new(config.uid_prefix.clone());
        Ok(Self {
            config,
            rules,
            registry: AnnotationsRegistry::new(),
            changes: ChangeTracker::new(),
            uids,
        })
    }

    pub fn with_uids(mut self, uids: UidGenerator) -> Self {
        self.uids = uids;
        self
    }

    /// Prepare `editor` for annotations: the active flag is never serialized
    /// and the configured schema entries are added
    pub fn setup(&self, editor: &mut Editor) {
        editor.add_temp_attr(DATA_ANNOTATION_ACTIVE);
        self.config.extend_schema(editor.schema_mut());
    }

    pub fn register(&mut self, name: impl Into<String>, settings: AnnotatorSettings) {
        let name = name.into();
        debug!(name = %name, persistent = settings.persistent, "registered annotation");
        self.registry.register(name, settings);
    }

    pub fn registry(&self) -> &AnnotationsRegistry {
        &self.registry
    }

    pub fn config(&self) -> &AnnotatorConfig {
        &self.config
    }

    fn settings(&self, name: &str) -> AnnotateResult<&AnnotatorSettings> {
        self.registry
            .lookup(name)
            .ok_or_else(|| AnnotateError::UnknownAnnotation(name.to_string()))
    }

    /// Annotate the current selection with `name`.
    ///
    /// A string `uid` entry in `data` is used as the uid instead of a
    /// generated one and is not passed on to the decorator.
    #[instrument(skip(self, editor, data))]
    pub fn annotate(
        &mut self,
        editor: &mut Editor,
        name: &str,
        mut data: DecoratorData,
    ) -> AnnotateResult<AnnotationState> {
        let settings = self
            .registry
            .lookup(name)
            .ok_or_else(|| AnnotateError::UnknownAnnotation(name.to_string()))?;

        let uid = match data.remove(UID_KEY) {
            Some(Value::String(uid)) => uid,
            Some(other) => other.to_string(),
            None => self.uids.next_uid(),
        };
        let decoration = settings.decorator.decorate(&uid, &data)?;
        let marker = Marker {
            uid: &uid,
            name,
            decoration: &decoration,
        };

        info!(uid = %uid, "Starting annotate");
        let created = annotate_with_bookmark(editor, &self.rules, &marker)?;
        let nodes = find_markers(editor.document(), &uid);
        info!(uid = %uid, wrappers = created.len(), nodes = nodes.len(), "Annotate complete");

        self.node_changed(editor)?;
        Ok(AnnotationState { uid, nodes })
    }

    /// Remove the innermost `name` annotation at the selection start,
    /// everywhere its uid occurs. Returns false when there was none.
    #[instrument(skip(self, editor))]
    pub fn remove(&mut self, editor: &mut Editor, name: &str) -> AnnotateResult<bool> {
        self.settings(name)?;
        let Some(found) = identify(editor.document(), editor.selection(), Some(name)) else {
            debug!("nothing to remove at selection");
            return Ok(false);
        };

        let rules = &self.rules;
        let unwrap = self.config.unwrap_on_remove;
        editor.transact(&format!("Remove {}", name), |editor| {
            bookmark::preserve(editor, false, |editor| {
                remove_annotations(editor.document_mut(), &found.elements, rules, unwrap)?;
                Ok::<_, AnnotateError>(())
            })
        })?;
        info!(uid = %found.uid, elements = found.elements.len(), "Removed annotation");

        self.node_changed(editor)?;
        Ok(true)
    }

    /// Remove every `name` annotation in the document; returns how many uids
    /// were removed
    #[instrument(skip(self, editor))]
    pub fn remove_all(&mut self, editor: &mut Editor, name: &str) -> AnnotateResult<usize> {
        self.settings(name)?;

        let rules = &self.rules;
        let unwrap = self.config.unwrap_on_remove;
        let removed = editor.transact(&format!("Remove all {}", name), |editor| {
            bookmark::preserve(editor, false, |editor| {
                Ok::<_, AnnotateError>(remove_named(
                    editor.document_mut(),
                    name,
                    rules,
                    unwrap,
                )?)
            })
        })?;
        info!(removed, "Removed all annotations");

        self.node_changed(editor)?;
        Ok(removed)
    }

    pub fn annotation_changed(&mut self, name: impl Into<String>, callback: ChangeCallback) {
        self.changes.annotation_changed(name, callback);
    }

    /// Re-check which annotations the selection is inside; call after every
    /// selection change
    pub fn node_changed(&mut self, editor: &mut Editor) -> AnnotateResult<()> {
        let range = *editor.selection();
        let names = self.registry.names();
        self.changes
            .node_changed(editor.document_mut(), &range, &names)?;
        Ok(())
    }

    /// Innermost annotation at the selection start, of any name when `name`
    /// is `None`
    pub fn identify(&self, editor: &Editor, name: Option<&str>) -> Option<IdentifiedAnnotation> {
        identify(editor.document(), editor.selection(), name)
    }

    /// Every `name` annotation in the document, grouped by uid
    pub fn get_all(&self, editor: &Editor, name: &str) -> BTreeMap<String, Vec<NodeId>> {
        find_all(editor.document(), name)
    }

    /// Serialized content without temporary attributes and without
    /// annotations registered as non-persistent
    pub fn get_content(&self, editor: &Editor) -> AnnotateResult<String> {
        let rules = &self.rules;
        let transient: Vec<&str> = self
            .registry
            .iter()
            .filter(|(_, settings)| !settings.persistent)
            .map(|(name, _)| name)
            .collect();

        editor.get_content_with(|doc| {
            for name in &transient {
                remove_named(doc, name, rules, true)?;
            }
            Ok::<_, AnnotateError>(())
        })
    }
}
