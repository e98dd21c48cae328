//! CRUD over the five entity collections, plus enum metadata.

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

use assetctl_core::{RecordId, ServiceError, ServiceResult};

use crate::types::{Entity, EquipoEnums, ListQuery, UsuarioEnums};

use super::{ApiRequest, Gateway};

/// Operations scoped to one entity collection. A cheap `Copy` handle.
#[derive(Debug, Clone, Copy)]
pub struct Resource<'g> {
    gateway: &'g Gateway,
    entity: Entity,
}

impl Gateway {
    pub fn resource(&self, entity: Entity) -> Resource<'_> {
        Resource {
            gateway: self,
            entity,
        }
    }

    /// `GET /api/meta/equipos/enums`.
    pub async fn equipo_enums(&self) -> ServiceResult<EquipoEnums> {
        self.metadata("/api/meta/equipos/enums").await
    }

    /// `GET /api/meta/usuarios/enums`.
    pub async fn usuario_enums(&self) -> ServiceResult<UsuarioEnums> {
        self.metadata("/api/meta/usuarios/enums").await
    }

    async fn metadata<T: DeserializeOwned + Default>(&self, path: &str) -> ServiceResult<T> {
        let body = self.send_json(ApiRequest::get(path)).await?;
        Ok(body
            .and_then(|v| match serde_json::from_value(v) {
                Ok(parsed) => Some(parsed),
                Err(err) => {
                    tracing::warn!(path, error = %err, "unexpected metadata shape; using empty lists");
                    None
                }
            })
            .unwrap_or_default())
    }
}

impl<'g> Resource<'g> {
    pub fn entity(self) -> Entity {
        self.entity
    }

    /// `GET /api/<entity>` with the filter's non-empty parameters.
    pub async fn list(self, filter: &impl ListQuery) -> ServiceResult<Option<Value>> {
        let request = ApiRequest::get(self.entity.collection_path()).query(filter.params());
        self.gateway.send_json(request).await
    }

    /// Like [`list`](Self::list) but yields the rows, or nothing when the body
    /// is not an array.
    pub async fn list_items(self, filter: &impl ListQuery) -> ServiceResult<Vec<Value>> {
        Ok(match self.list(filter).await? {
            Some(Value::Array(items)) => items,
            _ => Vec::new(),
        })
    }

    pub async fn get(self, id: RecordId) -> ServiceResult<Option<Value>> {
        let request = ApiRequest::get(self.entity.item_path(id));
        self.gateway.send_json(request).await
    }

    pub async fn create(self, body: &impl Serialize) -> ServiceResult<Option<Value>> {
        let request = ApiRequest::post(self.entity.collection_path()).json(to_body(body)?);
        self.gateway.send_json(request).await
    }

    pub async fn update(self, id: RecordId, body: &impl Serialize) -> ServiceResult<Option<Value>> {
        let request = ApiRequest::put(self.entity.item_path(id)).json(to_body(body)?);
        self.gateway.send_json(request).await
    }

    pub async fn delete(self, id: RecordId) -> ServiceResult<Option<Value>> {
        let request = ApiRequest::delete(self.entity.item_path(id));
        self.gateway.send_json(request).await
    }
}

fn to_body(body: &impl Serialize) -> ServiceResult<Value> {
    serde_json::to_value(body)
        .map_err(|e| ServiceError::local(format!("request body is not serializable: {e}")))
}
