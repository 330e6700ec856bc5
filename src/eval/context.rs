use std::{fmt, sync::Arc};

use dashmap::DashMap;

use crate::env::Env;

use super::value::Value;

/// A scope of template properties.
///
/// Contexts form a chain: lookups that miss locally continue in the
/// parent. Children hold their parent through an `Arc`. Properties are
/// writable through a shared reference, so the root can take global
/// properties one by one while closures rendered from earlier ones already
/// hold it; those closures see every property added later.
///
/// The instant is captured once when the root is created and inherited
/// verbatim by every descendant, so all time functions within one run agree
/// on "now".
#[derive(Clone)]
pub struct Context {
    properties: DashMap<String, Value>,
    parent: Option<Arc<Context>>,
    instant: i64,
    env: Arc<Env>,
}

impl Context {
    /// Creates a root context, reading the current time from `env`.
    pub fn new(env: Arc<Env>) -> Self {
        Self {
            properties: DashMap::new(),
            parent: None,
            instant: env.current_time_millis(),
            env,
        }
    }

    pub fn create_child(self: &Arc<Self>) -> Context {
        Context {
            properties: DashMap::new(),
            parent: Some(self.clone()),
            instant: self.instant,
            env: self.env.clone(),
        }
    }

    pub fn set_property(&self, name: impl Into<String>, value: impl Into<Value>) {
        self.properties.insert(name.into(), value.into());
    }

    pub fn get_property(&self, name: &str) -> Option<Value> {
        // 現在のスコープで検索し、なければ親へ
        if let Some(value) = self.properties.get(name) {
            return Some(value.value().clone());
        }
        self.parent.as_ref().and_then(|p| p.get_property(name))
    }

    /// Drops every local property. A closure stored in the context it
    /// captured keeps that context alive, so a finished run clears its root.
    pub fn clear(&self) {
        self.properties.clear();
    }

    /// Epoch milliseconds fixed at root creation.
    pub fn instant(&self) -> i64 {
        self.instant
    }

    pub fn env(&self) -> &Arc<Env> {
        &self.env
    }

    // スコープチェーンの深さ（デバッグ用）
    pub fn depth(&self) -> usize {
        1 + self.parent.as_ref().map_or(0, |p| p.depth())
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names: Vec<String> = self
            .properties
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        f.debug_struct("Context")
            .field("properties", &names)
            .field("depth", &self.depth())
            .field("instant", &self.instant)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn root() -> Context {
        Context::new(Arc::new(Env::builder().with_current_time(1_000).build()))
    }

    #[test]
    fn test_child_shadows_without_mutating_parent() {
        let global = root();
        global.set_property("x", "global");
        global.set_property("y", 1);
        let global = Arc::new(global);

        let child = global.create_child();
        child.set_property("x", "child");

        assert_eq!(child.get_property("x"), Some(Value::from("child")));
        assert_eq!(child.get_property("y"), Some(Value::from(1)));
        assert_eq!(global.get_property("x"), Some(Value::from("global")));
        assert_eq!(child.get_property("z"), None);
    }

    #[test]
    fn test_shared_root_sees_later_properties() {
        let global = Arc::new(root());
        let child = Arc::new(global.create_child());
        assert_eq!(child.get_property("late"), None);

        global.set_property("late", "added");
        assert_eq!(child.get_property("late"), Some(Value::from("added")));
    }

    #[test]
    fn test_clear_releases_captured_context() {
        let global = Arc::new(root());
        let closure = crate::eval::render("<%=fn() -> 1%>", &global).unwrap();
        global.set_property("f", closure);
        assert_eq!(Arc::strong_count(&global), 2);

        global.clear();
        assert_eq!(Arc::strong_count(&global), 1);
        assert_eq!(global.get_property("f"), None);
    }

    #[test]
    fn test_instant_is_inherited() {
        let global = Arc::new(root());
        let child = Arc::new(global.create_child());
        let grandchild = child.create_child();

        assert_eq!(grandchild.instant(), 1_000);
        assert_eq!(grandchild.instant(), global.instant());
        assert_eq!(grandchild.depth(), 3);
    }
}
