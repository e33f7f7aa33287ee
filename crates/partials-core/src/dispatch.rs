//! Post-load dispatcher.
//!
//! After a fragment is rendered the dispatcher schedules the follow-up pass
//! that fragment needs and notifies every registered [`ComponentListener`].
//! Passes are queued for the next frame; [`PostLoadDispatcher::run_frame`]
//! drains the queue once the current batch of injections has landed.

use crate::dom::Document;
use crate::mobile_nav::{MobileNavHandle, MobileNavToggle};
use crate::passes::{self, DeferredPass, PageLocation};
use crate::registry::{FOOTER_COMPONENT, HEADER_COMPONENT, MOBILE_NAV_COMPONENT};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::debug;

/// Notification emitted after a fragment is rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ComponentLoaded {
    /// Placeholder that received the fragment.
    pub element_id: String,
    /// Fragment path that was rendered.
    pub path: String,
}

/// Observer of `componentLoaded` notifications.
pub trait ComponentListener: Send + Sync {
    /// Get the name of the listener.
    fn name(&self) -> &str;

    /// Called once per rendered fragment.
    fn on_component_loaded(&self, event: &ComponentLoaded);
}

/// Listener built from a closure.
pub struct FnListener<F> {
    name: String,
    callback: F,
}

impl<F> FnListener<F>
where
    F: Fn(&ComponentLoaded) + Send + Sync,
{
    /// Wrap `callback` as a listener called `name`.
    pub fn new(name: impl Into<String>, callback: F) -> Self {
        Self { name: name.into(), callback }
    }
}

impl<F> ComponentListener for FnListener<F>
where
    F: Fn(&ComponentLoaded) + Send + Sync,
{
    fn name(&self) -> &str {
        &self.name
    }

    fn on_component_loaded(&self, event: &ComponentLoaded) {
        (self.callback)(event);
    }
}

/// Registration token returned by [`PostLoadDispatcher::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Dispatches post-load passes and notifications.
pub struct PostLoadDispatcher {
    location: PageLocation,
    listeners: RwLock<Vec<(ListenerId, Arc<dyn ComponentListener>)>>,
    next_listener: AtomicU64,
    frame: Mutex<Vec<DeferredPass>>,
    mobile_nav: Option<MobileNavToggle>,
}

impl std::fmt::Debug for PostLoadDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PostLoadDispatcher")
            .field("location", &self.location)
            .field("mobile_nav", &self.mobile_nav)
            .finish_non_exhaustive()
    }
}

impl PostLoadDispatcher {
    /// Create a dispatcher for a page at `location`.
    ///
    /// With `mobile_nav_toggle` set, the mobile navigation pass also installs
    /// the drawer toggle.
    pub fn new(location: PageLocation, mobile_nav_toggle: bool) -> Self {
        Self {
            location,
            listeners: RwLock::new(Vec::new()),
            next_listener: AtomicU64::new(0),
            frame: Mutex::new(Vec::new()),
            mobile_nav: mobile_nav_toggle.then(MobileNavToggle::new),
        }
    }

    /// The page location passes are evaluated against.
    pub fn location(&self) -> &PageLocation {
        &self.location
    }

    /// Register a listener.
    pub async fn subscribe(&self, listener: Arc<dyn ComponentListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::Relaxed));
        self.listeners.write().await.push((id, listener));
        id
    }

    /// Remove a listener. Returns false if it was not registered.
    pub async fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.write().await;
        let before = listeners.len();
        listeners.retain(|(listener_id, _)| *listener_id != id);
        listeners.len() != before
    }

    /// Names of the registered listeners, in registration order.
    pub async fn listener_names(&self) -> Vec<String> {
        self.listeners.read().await.iter().map(|(_, l)| l.name().to_string()).collect()
    }

    /// Number of registered listeners.
    pub async fn listener_count(&self) -> usize {
        self.listeners.read().await.len()
    }

    /// Handle the completion of one load.
    pub async fn dispatch(&self, element_id: &str, path: &str) {
        let pass = match element_id {
            HEADER_COMPONENT => Some(DeferredPass::ActivateNavigation),
            MOBILE_NAV_COMPONENT => Some(DeferredPass::CloneMobileNavigation),
            FOOTER_COMPONENT => Some(DeferredPass::UpdateDynamicYear),
            _ => None,
        };
        if let Some(pass) = pass {
            debug!(element_id, pass = pass.as_str(), "Scheduled deferred pass");
            self.frame.lock().await.push(pass);
        }

        let event = ComponentLoaded { element_id: element_id.to_string(), path: path.to_string() };
        let listeners: Vec<_> =
            self.listeners.read().await.iter().map(|(_, l)| Arc::clone(l)).collect();
        for listener in listeners {
            listener.on_component_loaded(&event);
        }
    }

    /// Passes waiting for the next frame.
    pub async fn pending_passes(&self) -> Vec<DeferredPass> {
        self.frame.lock().await.clone()
    }

    /// Run every queued pass against `document`, in scheduling order.
    ///
    /// Returns the number of passes run.
    pub async fn run_frame(&self, document: &mut Document) -> usize {
        let queued = std::mem::take(&mut *self.frame.lock().await);
        for &pass in &queued {
            self.run_pass(pass, document);
        }
        queued.len()
    }

    /// The installed drawer toggle handle, if the mobile pass has run.
    pub fn mobile_nav(&self) -> Option<MobileNavHandle> {
        self.mobile_nav.as_ref().and_then(MobileNavToggle::handle)
    }

    fn run_pass(&self, pass: DeferredPass, document: &mut Document) {
        match pass {
            DeferredPass::ActivateNavigation => {
                let page = self.location.current_page();
                let active = passes::set_active_navigation(document, page);
                debug!(page, matched = active.is_some(), "Navigation highlighted");
            }
            DeferredPass::CloneMobileNavigation => {
                let cloned = passes::clone_mobile_navigation(document);
                debug!(cloned, "Mobile navigation prepared");
                if let Some(toggle) = &self.mobile_nav {
                    toggle.install(document);
                }
            }
            DeferredPass::UpdateDynamicYear => {
                let updated = passes::update_dynamic_year(document, passes::current_year());
                debug!(updated, "Dynamic year updated");
            }
        }
    }
}
