use std::sync::Mutex;

use crate::nav::Navigator;

/// Navigator that only records where it was sent.
#[derive(Default)]
pub struct RecordingNavigator {
    visits: Mutex<Vec<String>>,
}

impl RecordingNavigator {
    pub fn visits(&self) -> Vec<String> {
        self.visits.lock().unwrap().clone()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate_to(&self, path: &str) {
        self.visits.lock().unwrap().push(path.to_string());
    }
}
