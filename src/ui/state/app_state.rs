use std::sync::Arc;

use dioxus::prelude::{use_signal, ReadableExt, Signal, WritableExt};

use crate::infra::api::client::ApiClient;
use crate::usecase::ability::Ability;

/// Per-session collaborators shared through context: the API client and
/// the capability policy derived from the session's role claims.
#[derive(Clone)]
pub struct Session {
    pub api: Arc<ApiClient>,
    pub ability: Ability,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToastKind {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub kind: ToastKind,
    pub message: String,
}

/// App-wide signal bundle: dismissible notifications plus the data epoch
/// pages subscribe to. Bumping the epoch after a successful mutation is
/// what makes every dependent view refetch.
#[derive(Clone, Copy)]
pub struct AppState {
    pub toasts: Signal<Vec<Toast>>,
    pub data_epoch: Signal<u64>,
    next_toast_id: Signal<u64>,
}

impl AppState {
    pub fn new() -> Self {
        Self {
            toasts: use_signal(Vec::<Toast>::new),
            data_epoch: use_signal(|| 0_u64),
            next_toast_id: use_signal(|| 0_u64),
        }
    }

    pub fn notify(&mut self, kind: ToastKind, message: impl Into<String>) {
        let id = *self.next_toast_id.read();
        *self.next_toast_id.write() = id + 1;
        self.toasts.write().push(Toast {
            id,
            kind,
            message: message.into(),
        });
    }

    pub fn dismiss(&mut self, id: u64) {
        self.toasts.write().retain(|toast| toast.id != id);
    }

    pub fn invalidate_data(&mut self) {
        *self.data_epoch.write() += 1;
    }
}
