#![allow(dead_code)]

use musta_core::{
    AuthorizationStatus, Language, LanguageCatalog, NotificationCenter, NotificationRequest,
    NotifyError, NotifyResult, Phrase,
};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::sync::Arc;

/// One call observed by [`RecordingNotificationCenter`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CenterCall {
    RequestAuthorization,
    Add { id: String, body: String },
    Remove(String),
    RemoveAll,
}

/// In-memory center that records every call in order.
pub struct RecordingNotificationCenter {
    grant_on_request: bool,
    status: Cell<AuthorizationStatus>,
    failing: Cell<bool>,
    calls: RefCell<Vec<CenterCall>>,
    pending: RefCell<BTreeMap<String, NotificationRequest>>,
}

impl RecordingNotificationCenter {
    pub fn new(grant_on_request: bool) -> Self {
        Self {
            grant_on_request,
            status: Cell::new(AuthorizationStatus::NotDetermined),
            failing: Cell::new(false),
            calls: RefCell::new(Vec::new()),
            pending: RefCell::new(BTreeMap::new()),
        }
    }

    pub fn set_status(&self, status: AuthorizationStatus) {
        self.status.set(status);
    }

    /// While set, queue operations are recorded but rejected and leave the
    /// pending queue unchanged.
    pub fn set_failing(&self, failing: bool) {
        self.failing.set(failing);
    }

    fn check_failing(&self) -> NotifyResult<()> {
        if self.failing.get() {
            return Err(NotifyError::Rejected("center unavailable".to_string()));
        }
        Ok(())
    }

    pub fn calls(&self) -> Vec<CenterCall> {
        self.calls.borrow().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.borrow_mut().clear();
    }

    pub fn pending_ids(&self) -> Vec<String> {
        self.pending.borrow().keys().cloned().collect()
    }

    pub fn pending(&self, id: &str) -> Option<NotificationRequest> {
        self.pending.borrow().get(id).cloned()
    }

    /// Drops a registration behind the coordinator's back.
    pub fn drop_silently(&self, id: &str) {
        self.pending.borrow_mut().remove(id);
    }

    /// Adds a registration behind the coordinator's back.
    pub fn inject(&self, request: NotificationRequest) {
        self.pending
            .borrow_mut()
            .insert(request.id.clone(), request);
    }

    pub fn add_calls(&self) -> Vec<String> {
        self.calls()
            .into_iter()
            .filter_map(|call| match call {
                CenterCall::Add { id, .. } => Some(id),
                _ => None,
            })
            .collect()
    }
}

impl NotificationCenter for RecordingNotificationCenter {
    fn request_authorization(&self) -> NotifyResult<bool> {
        self.calls.borrow_mut().push(CenterCall::RequestAuthorization);
        self.status
            .set(AuthorizationStatus::from_granted(self.grant_on_request));
        Ok(self.grant_on_request)
    }

    fn authorization_status(&self) -> NotifyResult<AuthorizationStatus> {
        Ok(self.status.get())
    }

    fn add(&self, request: &NotificationRequest) -> NotifyResult<()> {
        self.calls.borrow_mut().push(CenterCall::Add {
            id: request.id.clone(),
            body: request.body.clone(),
        });
        self.check_failing()?;
        self.pending
            .borrow_mut()
            .insert(request.id.clone(), request.clone());
        Ok(())
    }

    fn remove_pending(&self, id: &str) -> NotifyResult<()> {
        self.calls
            .borrow_mut()
            .push(CenterCall::Remove(id.to_string()));
        self.check_failing()?;
        self.pending.borrow_mut().remove(id);
        Ok(())
    }

    fn remove_all_pending(&self) -> NotifyResult<()> {
        self.calls.borrow_mut().push(CenterCall::RemoveAll);
        self.check_failing()?;
        self.pending.borrow_mut().clear();
        Ok(())
    }

    fn pending_requests(&self) -> NotifyResult<Vec<NotificationRequest>> {
        Ok(self.pending.borrow().values().cloned().collect())
    }
}

pub const FILIPINO_BODIES: [&str; 2] = ["Salamat - Thank you", "Kumusta - How are you"];
pub const SPANISH_BODIES: [&str; 2] = ["Gracias - Thank you", "Hola - Hello"];

pub fn sample_catalog() -> Arc<LanguageCatalog> {
    Arc::new(LanguageCatalog::new(vec![
        language("fil", "Filipino", &[("Salamat", "Thank you"), ("Kumusta", "How are you")]),
        language("es", "Spanish", &[("Gracias", "Thank you"), ("Hola", "Hello")]),
    ]))
}

pub const SAMPLE_CATALOG_JSON: &str = r#"{
    "languages": [
        {"id": "fil", "name": "Filipino", "nativeName": "Filipino", "flag": "PH",
         "phrases": [{"phrase": "Salamat", "translation": "Thank you"},
                     {"phrase": "Kumusta", "translation": "How are you"}]},
        {"id": "es", "name": "Spanish", "nativeName": "Espanol", "flag": "ES",
         "phrases": [{"phrase": "Gracias", "translation": "Thank you"},
                     {"phrase": "Hola", "translation": "Hello"}]}
    ]
}"#;

fn language(id: &str, name: &str, phrases: &[(&str, &str)]) -> Language {
    Language {
        id: id.to_string(),
        name: name.to_string(),
        native_name: name.to_string(),
        flag: id.to_uppercase(),
        phrases: phrases
            .iter()
            .map(|(phrase, translation)| Phrase::new(*phrase, *translation))
            .collect(),
    }
}
