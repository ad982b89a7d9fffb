pub(crate) mod error;
pub(crate) mod web_api_client;

pub use error::{ClientError, Result as CliClientResult};
pub use web_api_client::{WebApiClient, entity_id_from_uri};
#[cfg(test)]
pub(crate) use web_api_client::with_page;
