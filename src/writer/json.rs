use super::Writer;
use crate::dashboard::types::Page;
use crate::error::{EdaError, Result};

#[derive(Clone, Copy, Debug, Default)]
pub struct JsonWriter {
    pretty: bool,
}

impl JsonWriter {
    pub fn compact() -> Self {
        Self { pretty: false }
    }

    pub fn pretty() -> Self {
        Self { pretty: true }
    }
}

impl Writer for JsonWriter {
    type Output = String;

    fn write(&self, page: &Page) -> Result<String> {
        let out = if self.pretty {
            serde_json::to_string_pretty(page)
        } else {
            serde_json::to_string(page)
        };
        out.map_err(|e| EdaError::Render(format!("Could not serialise page: {e}")))
    }
}
