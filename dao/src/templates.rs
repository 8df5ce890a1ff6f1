use crate::errors::DaoError;
use shared::substitute::{first_unresolved, substitute};
use std::collections::HashMap;

/// Mapping from logical fetch name to a URL template with `:name:`
/// placeholders. Immutable after construction.
#[derive(Debug, Clone, Default)]
pub struct UrlTemplates {
    templates: HashMap<String, String>,
}

impl UrlTemplates {
    pub fn new(templates: HashMap<String, String>) -> Self {
        UrlTemplates { templates }
    }

    pub fn resolve(&self, key: &str) -> Result<&str, DaoError> {
        self.templates
            .get(key)
            .map(String::as_str)
            .ok_or_else(|| DaoError::EndpointUrlNotDefined {
                key: key.to_string(),
            })
    }

    /// Resolve `key` and substitute every placeholder from `params`.
    /// Fails before any network call if a placeholder has no value.
    pub fn assemble(
        &self,
        key: &str,
        params: &HashMap<String, String>,
    ) -> Result<String, DaoError> {
        let template = self.resolve(key)?;
        let url = substitute(template, params);

        if let Some(placeholder) = first_unresolved(&url).map(str::to_owned) {
            return Err(DaoError::EndpointUrlNotAssembled { placeholder, url });
        }

        Ok(url)
    }
}
