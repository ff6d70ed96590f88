//! JSON Schema record validation.

use rf_error::{ParseError, Result};
use rf_traits::{RecordValidator, Validation};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::debug;

/// [`RecordValidator`] backed by a compiled JSON Schema.
pub struct JsonSchemaValidator {
    reference: String,
    validator: jsonschema::Validator,
}

impl std::fmt::Debug for JsonSchemaValidator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonSchemaValidator")
            .field("reference", &self.reference)
            .finish_non_exhaustive()
    }
}

impl JsonSchemaValidator {
    /// Compile a schema document.
    pub fn from_value(schema: &Value) -> Result<Self> {
        Self::compile("<inline>".to_string(), schema)
    }

    /// Load and compile a schema from a file path or `file://` URL.
    pub fn from_reference(reference: &str) -> Result<Self> {
        let path = reference_path(reference);
        let text = std::fs::read_to_string(&path).map_err(|e| {
            ParseError::Schema(format!("cannot read schema '{}': {e}", path.display()))
        })?;
        let schema: Value = serde_json::from_str(&text)
            .map_err(|e| ParseError::Schema(format!("schema '{reference}' is not JSON: {e}")))?;

        debug!(schema = %reference, "Loaded record schema");
        Self::compile(reference.to_string(), &schema)
    }

    /// The reference this validator was loaded from.
    pub fn reference(&self) -> &str {
        &self.reference
    }

    fn compile(reference: String, schema: &Value) -> Result<Self> {
        let validator = jsonschema::validator_for(schema)
            .map_err(|e| ParseError::Schema(format!("invalid schema '{reference}': {e}")))?;
        Ok(Self {
            reference,
            validator,
        })
    }
}

impl RecordValidator for JsonSchemaValidator {
    fn validate(&self, raw: &str) -> Result<Validation> {
        let instance: Value =
            serde_json::from_str(raw).map_err(|e| ParseError::Validation(e.to_string()))?;

        let errors: Vec<String> = self
            .validator
            .iter_errors(&instance)
            .map(|e| format!("{}: {e}", e.instance_path))
            .collect();

        if errors.is_empty() {
            Ok(Validation::Valid)
        } else {
            Ok(Validation::Invalid(errors))
        }
    }
}

fn reference_path(reference: &str) -> PathBuf {
    match reference.strip_prefix("file://") {
        Some(path) => PathBuf::from(path),
        None => Path::new(reference).to_path_buf(),
    }
}
