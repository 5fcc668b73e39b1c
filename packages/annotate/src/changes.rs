//! # Change Notifications
//!
//! Tracks, per annotation name, which annotation the selection is inside and
//! tells listeners when that changes.
//!
//! ## Design
//!
//! - One remembered uid per name; nothing fires while it stays the same
//! - The active flag moves with the remembered uid, so at most one
//!   annotation per name is flagged active
//! - Listeners run after the flags are updated

use crate::identification::{find_markers, identify};
use crate::markings::set_active;
use marginalia_dom::{Document, DomResult, NodeId};
use marginalia_editor::Range;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use tracing::debug;

/// The annotation a change notification refers to
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AnnotationState {
    pub uid: String,

    /// Every element sharing `uid`
    pub nodes: Vec<NodeId>,
}

/// Called with `(inside, name, state)`; `state` is `None` on leaving
pub type ChangeCallback = Box<dyn FnMut(bool, &str, Option<&AnnotationState>)>;

#[derive(Default)]
pub struct ChangeTracker {
    listeners: BTreeMap<String, Vec<ChangeCallback>>,
    previous: BTreeMap<String, String>,
}

impl fmt::Debug for ChangeTracker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeTracker")
            .field("listeners", &self.listeners.keys().collect::<Vec<_>>())
            .field("previous", &self.previous)
            .finish()
    }
}

fn toggle_active(doc: &mut Document, uid: &str, active: bool) -> DomResult<()> {
    for node in find_markers(doc, uid) {
        set_active(doc, node, active)?;
    }
    Ok(())
}

impl ChangeTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn annotation_changed(&mut self, name: impl Into<String>, callback: ChangeCallback) {
        self.listeners.entry(name.into()).or_default().push(callback);
    }

    /// Uid the selection was last seen inside for `name`
    pub fn current(&self, name: &str) -> Option<&str> {
        self.previous.get(name).map(String::as_str)
    }

    fn fire(&mut self, name: &str, inside: bool, state: Option<&AnnotationState>) {
        if let Some(listeners) = self.listeners.get_mut(name) {
            for listener in listeners.iter_mut() {
                listener(inside, name, state);
            }
        }
    }

    /// Compare the annotations around `range` with the last call and notify
    pub fn node_changed(&mut self, doc: &mut Document, range: &Range, names: &[&str]) -> DomResult<()> {
        for &name in names {
            let previous = self.previous.get(name).cloned();

            match identify(doc, range, Some(name)) {
                None => {
                    if let Some(uid) = previous {
                        toggle_active(doc, &uid, false)?;
                        self.previous.remove(name);
                        debug!(name, uid = %uid, "selection left annotation");
                        self.fire(name, false, None);
                    }
                }
                Some(found) => {
                    if previous.as_deref() == Some(found.uid.as_str()) {
                        continue;
                    }
                    if let Some(uid) = previous {
                        toggle_active(doc, &uid, false)?;
                    }
                    for &node in &found.elements {
                        set_active(doc, node, true)?;
                    }
                    debug!(name, uid = %found.uid, nodes = found.elements.len(), "selection entered annotation");

                    let state = AnnotationState {
                        uid: found.uid,
                        nodes: found.elements,
                    };
                    self.previous.insert(name.to_string(), state.uid.clone());
                    self.fire(name, true, Some(&state));
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::markings::DATA_ANNOTATION_ACTIVE;
    use marginalia_dom::parse_html;
    use std::cell::RefCell;
    use std::rc::Rc;

    type Log = Rc<RefCell<Vec<(bool, String, Option<String>)>>>;

    fn recorder(log: &Log) -> ChangeCallback {
        let log = Rc::clone(log);
        Box::new(move |inside: bool, name: &str, state: Option<&AnnotationState>| {
            log.borrow_mut()
                .push((inside, name.to_string(), state.map(|s| s.uid.clone())));
        })
    }

    const HTML: &str = concat!(
        r#"<p><span class="mce-annotation" data-mce-annotation-uid="a" data-mce-annotation="c">x</span>"#,
        r#"<span class="mce-annotation" data-mce-annotation-uid="b" data-mce-annotation="c">y</span>z</p>"#,
    );

    #[test]
    fn test_enter_move_and_leave() {
        let mut doc = parse_html(HTML).unwrap();
        let p = doc.children(doc.root())[0];
        let (a, b) = (doc.children(p)[0], doc.children(p)[1]);
        let x = doc.children(a)[0];
        let y = doc.children(b)[0];
        let z = doc.children(p)[2];

        let log: Log = Rc::default();
        let mut tracker = ChangeTracker::new();
        tracker.annotation_changed("c", recorder(&log));

        tracker.node_changed(&mut doc, &Range::caret(x, 0), &["c"]).unwrap();
        assert_eq!(doc.attr(a, DATA_ANNOTATION_ACTIVE), Some("true"));

        // Same annotation again fires nothing
        tracker.node_changed(&mut doc, &Range::caret(x, 1), &["c"]).unwrap();

        tracker.node_changed(&mut doc, &Range::caret(y, 0), &["c"]).unwrap();
        assert!(!doc.has_attr(a, DATA_ANNOTATION_ACTIVE));
        assert_eq!(doc.attr(b, DATA_ANNOTATION_ACTIVE), Some("true"));
        assert_eq!(tracker.current("c"), Some("b"));

        tracker.node_changed(&mut doc, &Range::caret(z, 0), &["c"]).unwrap();
        assert!(!doc.has_attr(b, DATA_ANNOTATION_ACTIVE));
        assert_eq!(tracker.current("c"), None);

        assert_eq!(
            *log.borrow(),
            vec![
                (true, "c".to_string(), Some("a".to_string())),
                (true, "c".to_string(), Some("b".to_string())),
                (false, "c".to_string(), None),
            ]
        );
    }

    #[test]
    fn test_other_names_are_not_notified() {
        let mut doc = parse_html(HTML).unwrap();
        let p = doc.children(doc.root())[0];
        let x = doc.children(doc.children(p)[0])[0];

        let log: Log = Rc::default();
        let mut tracker = ChangeTracker::new();
        tracker.annotation_changed("other", recorder(&log));
        tracker
            .node_changed(&mut doc, &Range::caret(x, 0), &["c", "other"])
            .unwrap();

        assert!(log.borrow().is_empty());
        assert_eq!(tracker.current("c"), Some("a"));
    }
}
