use async_trait::async_trait;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::company::CompanyEvent;
use super::{EventPublisher, PublishError};

/// Test double that keeps every event it is given and can be told to fail.
#[derive(Default)]
pub struct RecordingPublisher {
    attempts: Mutex<Vec<CompanyEvent>>,
    accepted: Mutex<Vec<CompanyEvent>>,
    failing: AtomicBool,
}

impl RecordingPublisher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    /// Events accepted so far, oldest first.
    pub fn events(&self) -> Vec<CompanyEvent> {
        self.accepted.lock().unwrap().clone()
    }

    /// Every publish call, including the ones that failed.
    pub fn attempts(&self) -> Vec<CompanyEvent> {
        self.attempts.lock().unwrap().clone()
    }
}

#[async_trait]
impl EventPublisher for RecordingPublisher {
    async fn publish(&self, event: CompanyEvent) -> Result<(), PublishError> {
        self.attempts.lock().unwrap().push(event.clone());

        if self.failing.load(Ordering::SeqCst) {
            return Err(PublishError::Handoff("broker unreachable".to_string()));
        }
        self.accepted.lock().unwrap().push(event);
        Ok(())
    }
}
