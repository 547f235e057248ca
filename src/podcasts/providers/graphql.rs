//! GraphQL response envelope shared by the Taddy and Podchaser clients.

use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlResponse<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<GraphQlError>>,
}

#[derive(Debug, Deserialize)]
pub(crate) struct GraphQlError {
    #[serde(default)]
    pub message: String,
}

impl<T> GraphQlResponse<T> {
    /// Message of the first reported error, if the response carries any.
    ///
    /// An `errors` key with an empty array still counts as an error.
    pub fn first_error(&self) -> Option<&str> {
        self.errors
            .as_ref()
            .map(|errors| errors.first().map(|e| e.message.as_str()).unwrap_or(""))
    }
}

/// `{ data: [...] }` wrapper used by Podchaser's paginated fields.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct Page<T> {
    #[serde(default = "Vec::new")]
    pub data: Vec<T>,
}
