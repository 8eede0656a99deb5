//! One-shot values read by the next page: flash messages and per-form state.

use std::collections::BTreeMap;

use crate::session::errors::SessionError;
use crate::session::types::{Flash, FlashKind, Session};

const FLASH_KEY: &str = "flash";

impl Session {
    pub fn flash(&mut self, kind: FlashKind, message: impl Into<String>) -> Result<(), SessionError> {
        let flash = Flash {
            kind,
            message: message.into(),
        };
        self.set(FLASH_KEY, &flash)
    }

    pub fn take_flash(&mut self) -> Option<Flash> {
        self.take(FLASH_KEY)
    }

    /// Stores validation errors and the submitted values of `form` for the redirected page.
    pub fn set_form_state(
        &mut self,
        form: &str,
        errors: &[String],
        data: &BTreeMap<String, String>,
    ) -> Result<(), SessionError> {
        self.set(&format!("{form}_errors"), errors)?;
        self.set(&format!("{form}_data"), data)
    }

    pub fn take_form_errors(&mut self, form: &str) -> Vec<String> {
        self.take(&format!("{form}_errors")).unwrap_or_default()
    }

    pub fn take_form_data(&mut self, form: &str) -> BTreeMap<String, String> {
        self.take(&format!("{form}_data")).unwrap_or_default()
    }
}
