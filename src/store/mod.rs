use chrono::{DateTime, Local};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use crate::integrations::release::ReleaseItem;

/// Installation status of the local Ollama service.
///
/// A plain bag of fields: nothing ties them together, `started` may well be
/// true while `installed` is false if that is what an updater reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OllamaStatus {
    pub installed: bool,
    pub started: bool,
    pub can_start: bool,
    pub version: String,
    pub upgrade: bool,
    pub last_version: Option<ReleaseItem>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatusField {
    Installed,
    Started,
    CanStart,
    Version,
    Upgrade,
    LastVersion,
}

impl StatusField {
    pub fn as_str(&self) -> &str {
        match self {
            StatusField::Installed => "installed",
            StatusField::Started => "started",
            StatusField::CanStart => "canStart",
            StatusField::Version => "version",
            StatusField::Upgrade => "upgrade",
            StatusField::LastVersion => "lastVersion",
        }
    }
}

pub type SubscriptionId = u64;

type Listener = Arc<dyn Fn(StatusField, &OllamaStatus) + Send + Sync>;

struct StoreInner {
    status: RwLock<OllamaStatus>,
    updated_at: RwLock<Option<DateTime<Local>>>,
    listeners: RwLock<Vec<(SubscriptionId, Listener)>>,
    next_id: AtomicU64,
}

/// Shared, session-scoped holder of [`OllamaStatus`].
///
/// Cloning is cheap and every clone observes the same record. Listeners are
/// called after the write lock is released, once per field that actually
/// changed.
#[derive(Clone)]
pub struct StatusStore {
    inner: Arc<StoreInner>,
}

impl Default for StatusStore {
    fn default() -> Self {
        Self::new()
    }
}

impl StatusStore {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                status: RwLock::new(OllamaStatus::default()),
                updated_at: RwLock::new(None),
                listeners: RwLock::new(Vec::new()),
                next_id: AtomicU64::new(1),
            }),
        }
    }

    pub fn snapshot(&self) -> OllamaStatus {
        self.inner.status.read().clone()
    }

    pub fn updated_at(&self) -> Option<DateTime<Local>> {
        *self.inner.updated_at.read()
    }

    pub fn installed(&self) -> bool {
        self.inner.status.read().installed
    }

    pub fn started(&self) -> bool {
        self.inner.status.read().started
    }

    pub fn can_start(&self) -> bool {
        self.inner.status.read().can_start
    }

    pub fn version(&self) -> String {
        self.inner.status.read().version.clone()
    }

    pub fn upgrade(&self) -> bool {
        self.inner.status.read().upgrade
    }

    pub fn last_version(&self) -> Option<ReleaseItem> {
        self.inner.status.read().last_version.clone()
    }
}

// Field setters for holders other than the heartbeat, which uses `apply`.
#[allow(dead_code)]
impl StatusStore {
    pub fn set_installed(&self, value: bool) {
        self.update(StatusField::Installed, |s| replace(&mut s.installed, value));
    }

    pub fn set_started(&self, value: bool) {
        self.update(StatusField::Started, |s| replace(&mut s.started, value));
    }

    pub fn set_can_start(&self, value: bool) {
        self.update(StatusField::CanStart, |s| replace(&mut s.can_start, value));
    }

    pub fn set_version(&self, value: impl Into<String>) {
        let value = value.into();
        self.update(StatusField::Version, |s| replace(&mut s.version, value));
    }

    pub fn set_upgrade(&self, value: bool) {
        self.update(StatusField::Upgrade, |s| replace(&mut s.upgrade, value));
    }

    pub fn set_last_version(&self, value: Option<ReleaseItem>) {
        self.update(StatusField::LastVersion, |s| {
            replace(&mut s.last_version, value)
        });
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut listeners = self.inner.listeners.write();
        let before = listeners.len();
        listeners.retain(|(existing, _)| *existing != id);
        listeners.len() != before
    }
}

impl StatusStore {
    /// Replaces the whole record, notifying for each field that differs.
    pub fn apply(&self, next: OllamaStatus) {
        let (changed, snapshot) = {
            let mut status = self.inner.status.write();
            let changed = diff(&status, &next);
            *status = next;
            (changed, status.clone())
        };
        *self.inner.updated_at.write() = Some(Local::now());

        for field in changed {
            self.notify(field, &snapshot);
        }
    }

    pub fn subscribe<F>(&self, listener: F) -> SubscriptionId
    where
        F: Fn(StatusField, &OllamaStatus) + Send + Sync + 'static,
    {
        let id = self.inner.next_id.fetch_add(1, Ordering::Relaxed);
        self.inner.listeners.write().push((id, Arc::new(listener)));
        id
    }

    fn update<F>(&self, field: StatusField, mutate: F)
    where
        F: FnOnce(&mut OllamaStatus) -> bool,
    {
        let snapshot = {
            let mut status = self.inner.status.write();
            if !mutate(&mut *status) {
                return;
            }
            status.clone()
        };
        *self.inner.updated_at.write() = Some(Local::now());
        self.notify(field, &snapshot);
    }

    fn notify(&self, field: StatusField, snapshot: &OllamaStatus) {
        let listeners: Vec<Listener> = self
            .inner
            .listeners
            .read()
            .iter()
            .map(|(_, listener)| Arc::clone(listener))
            .collect();

        for listener in listeners {
            listener(field, snapshot);
        }
    }
}

fn replace<T: PartialEq>(slot: &mut T, value: T) -> bool {
    if *slot == value {
        false
    } else {
        *slot = value;
        true
    }
}

fn diff(old: &OllamaStatus, new: &OllamaStatus) -> Vec<StatusField> {
    let mut changed = Vec::new();
    if old.installed != new.installed {
        changed.push(StatusField::Installed);
    }
    if old.started != new.started {
        changed.push(StatusField::Started);
    }
    if old.can_start != new.can_start {
        changed.push(StatusField::CanStart);
    }
    if old.version != new.version {
        changed.push(StatusField::Version);
    }
    if old.upgrade != new.upgrade {
        changed.push(StatusField::Upgrade);
    }
    if old.last_version != new.last_version {
        changed.push(StatusField::LastVersion);
    }
    changed
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;

    fn recorder(store: &StatusStore) -> (SubscriptionId, Arc<Mutex<Vec<StatusField>>>) {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let id = store.subscribe(move |field, _| sink.lock().push(field));
        (id, seen)
    }

    #[test]
    fn fresh_store_has_defaults() {
        let store = StatusStore::new();
        assert!(!store.installed());
        assert!(!store.started());
        assert!(!store.can_start());
        assert_eq!(store.version(), "");
        assert!(!store.upgrade());
        assert_eq!(store.last_version(), None);
        assert_eq!(store.updated_at(), None);
    }

    #[test]
    fn setting_one_field_leaves_the_rest_alone() {
        let store = StatusStore::new();
        store.set_version("0.5.7");
        let before = store.snapshot();

        store.set_installed(true);

        let after = store.snapshot();
        assert!(after.installed);
        assert_eq!(
            OllamaStatus {
                installed: before.installed,
                ..after
            },
            before
        );
    }

    #[test]
    fn no_cross_field_validation() {
        let store = StatusStore::new();
        store.set_started(true);
        assert!(store.started());
        assert!(!store.installed());
    }

    #[test]
    fn clones_share_state() {
        let store = StatusStore::new();
        let view = store.clone();
        store.set_can_start(true);
        assert!(view.can_start());
    }

    #[test]
    fn listeners_fire_only_on_change() {
        let store = StatusStore::new();
        let (_, seen) = recorder(&store);

        store.set_installed(true);
        store.set_installed(true);
        store.set_version("");
        store.set_version("0.6.0");

        assert_eq!(
            *seen.lock(),
            vec![StatusField::Installed, StatusField::Version]
        );
    }

    #[test]
    fn apply_reports_each_changed_field() {
        let store = StatusStore::new();
        store.set_installed(true);
        let (_, seen) = recorder(&store);

        store.apply(OllamaStatus {
            installed: true,
            started: true,
            can_start: false,
            version: "0.5.7".into(),
            upgrade: false,
            last_version: Some(ReleaseItem {
                name: "v0.6.0".into(),
                ..ReleaseItem::default()
            }),
        });

        assert_eq!(
            *seen.lock(),
            vec![
                StatusField::Started,
                StatusField::Version,
                StatusField::LastVersion
            ]
        );
        assert!(store.updated_at().is_some());
    }

    #[test]
    fn unsubscribed_listeners_stop_firing() {
        let store = StatusStore::new();
        let (id, seen) = recorder(&store);

        assert!(store.unsubscribe(id));
        assert!(!store.unsubscribe(id));
        store.set_upgrade(true);

        assert!(seen.lock().is_empty());
    }

    #[test]
    fn listener_may_read_the_store() {
        let store = StatusStore::new();
        let reader = store.clone();
        let seen = Arc::new(Mutex::new(None));
        let sink = Arc::clone(&seen);
        store.subscribe(move |_, _| *sink.lock() = Some(reader.started()));

        store.set_started(true);

        assert_eq!(*seen.lock(), Some(true));
    }
}
