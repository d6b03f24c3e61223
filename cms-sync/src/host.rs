//! Host plugin context.
//!
//! Everything the sync code needs from the surrounding plugin runtime (mode,
//! capability checks, user notifications) is passed in explicitly through
//! [`PluginHost`], so the sync engine runs without a host.

use std::collections::HashSet;
use std::sync::Mutex;
use tracing::{error, info, warn};

/// How the host launched the plugin.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PluginMode {
    /// User opened the plugin to configure a collection
    ConfigureManagedCollection,
    /// Host asked for a non-interactive resync of an existing collection
    SyncManagedCollection,
}

/// Collection mutations the host gates behind a capability check.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProtectedMethod {
    AddItems,
    RemoveItems,
    SetFields,
    SetPluginData,
}

/// Methods a sync needs.
pub const SYNC_METHODS: &[ProtectedMethod] = &[
    ProtectedMethod::RemoveItems,
    ProtectedMethod::AddItems,
    ProtectedMethod::SetPluginData,
];

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NotifyVariant {
    Info,
    Success,
    Warning,
    Error,
}

pub trait PluginHost: Send + Sync {
    fn mode(&self) -> PluginMode;

    /// True only if every method in `methods` may be called.
    fn is_allowed_to(&self, methods: &[ProtectedMethod]) -> bool;

    /// Show a message to the user.
    fn notify(&self, message: &str, variant: NotifyVariant);
}

/// [`PluginHost`] with a fixed mode and permission set.
///
/// Notifications are logged and kept for inspection.
pub struct StaticHost {
    mode: PluginMode,
    allowed: HashSet<ProtectedMethod>,
    notifications: Mutex<Vec<(String, NotifyVariant)>>,
}

impl StaticHost {
    pub fn new(mode: PluginMode, allowed: &[ProtectedMethod]) -> Self {
        Self {
            mode,
            allowed: allowed.iter().copied().collect(),
            notifications: Mutex::new(Vec::new()),
        }
    }

    /// Host that permits every protected method.
    pub fn permissive(mode: PluginMode) -> Self {
        Self::new(
            mode,
            &[
                ProtectedMethod::AddItems,
                ProtectedMethod::RemoveItems,
                ProtectedMethod::SetFields,
                ProtectedMethod::SetPluginData,
            ],
        )
    }

    pub fn notifications(&self) -> Vec<(String, NotifyVariant)> {
        self.notifications.lock().unwrap().clone()
    }
}

impl PluginHost for StaticHost {
    fn mode(&self) -> PluginMode {
        self.mode
    }

    fn is_allowed_to(&self, methods: &[ProtectedMethod]) -> bool {
        methods.iter().all(|m| self.allowed.contains(m))
    }

    fn notify(&self, message: &str, variant: NotifyVariant) {
        match variant {
            NotifyVariant::Error => error!("{}", message),
            NotifyVariant::Warning => warn!("{}", message),
            NotifyVariant::Info | NotifyVariant::Success => info!("{}", message),
        }
        self.notifications
            .lock()
            .unwrap()
            .push((message.to_string(), variant));
    }
}
