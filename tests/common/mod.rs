#![allow(dead_code)]

use std::error::Error;
use std::sync::{Arc, Mutex};

pub use shellexec_test_utils::{
    BuiltOptions, CountingSignal, OptionsBuilder, init_tracing, with_timeout,
};

pub type TestResult = Result<(), Box<dyn Error>>;

/// Shared, clonable log of strings collected by callbacks.
#[derive(Clone, Default)]
pub struct Collected(Arc<Mutex<Vec<String>>>);

impl Collected {
    pub fn push(&self, item: impl Into<String>) {
        self.0.lock().unwrap().push(item.into());
    }

    pub fn items(&self) -> Vec<String> {
        self.0.lock().unwrap().clone()
    }

    pub fn joined(&self) -> String {
        self.items().concat()
    }
}
