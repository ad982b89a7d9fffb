use crate::data_client::{DataClient, OptionSetDefinition};
use crate::{BoardError, BoardResult};

use pk_core::{AttributeKind, AttributeSchema, EntityMetadata, STATE_FIELD};

use std::str::FromStr;
use std::sync::Arc;

use log::debug;

/// Resolves entity metadata and swim-lane discriminators.
#[derive(Clone)]
pub struct MetadataResolver {
    client: Arc<dyn DataClient>,
}

impl MetadataResolver {
    pub fn new(client: Arc<dyn DataClient>) -> Self {
        Self { client }
    }

    pub async fn entity_metadata(&self, entity: &str) -> BoardResult<EntityMetadata> {
        debug!("Resolving metadata of {entity}");
        self.client.retrieve_entity_metadata(entity).await
    }

    /// Resolve `attribute` on an entity whose metadata is already known.
    ///
    /// Fails with `UnsupportedAttributeKind` when the attribute cannot separate lanes.
    pub async fn attribute_schema(
        &self,
        metadata: &EntityMetadata,
        attribute: &str,
    ) -> BoardResult<AttributeSchema> {
        let descriptor = metadata.attribute(attribute).ok_or_else(|| {
            BoardError::configuration(format!(
                "attribute {attribute} does not exist on {}",
                metadata.logical_name
            ))
        })?;

        let kind = AttributeKind::from_str(&descriptor.attribute_type)?;
        let logical_name = descriptor.logical_name.as_str();
        debug!(
            "Resolving {} option set of {}.{logical_name}",
            kind.as_str(),
            metadata.logical_name
        );

        let definition = self
            .client
            .retrieve_option_set(&metadata.logical_name, logical_name, kind)
            .await?;

        let schema = match (kind, definition) {
            (
                AttributeKind::Boolean,
                OptionSetDefinition::TwoOptions {
                    false_option,
                    true_option,
                },
            ) => AttributeSchema::boolean(
                &metadata.logical_name,
                logical_name,
                false_option,
                true_option,
            )?,
            (AttributeKind::Boolean, OptionSetDefinition::Options(_)) => {
                return Err(BoardError::configuration(format!(
                    "boolean attribute {logical_name} came back without true/false options"
                )));
            }
            (kind, OptionSetDefinition::Options(options)) => {
                AttributeSchema::new(&metadata.logical_name, logical_name, kind, options)?
            }
            (_, OptionSetDefinition::TwoOptions { .. }) => {
                return Err(BoardError::configuration(format!(
                    "attribute {logical_name} came back as a two-option set"
                )));
            }
        };

        Ok(schema)
    }

    /// Metadata and discriminator schema in one go.
    pub async fn resolve(
        &self,
        entity: &str,
        attribute: &str,
    ) -> BoardResult<(EntityMetadata, AttributeSchema)> {
        let metadata = self.entity_metadata(entity).await?;
        let schema = self.attribute_schema(&metadata, attribute).await?;
        Ok((metadata, schema))
    }

    /// The active/inactive state attribute, when the entity has one.
    pub async fn state_schema(
        &self,
        metadata: &EntityMetadata,
    ) -> BoardResult<Option<AttributeSchema>> {
        if metadata.attribute(STATE_FIELD).is_none() {
            debug!("{} has no {STATE_FIELD}", metadata.logical_name);
            return Ok(None);
        }

        self.attribute_schema(metadata, STATE_FIELD).await.map(Some)
    }
}
