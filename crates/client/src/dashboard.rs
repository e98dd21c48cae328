//! Signed-in landing view: counts and recent activity across all entities.

use serde::Serialize;
use serde_json::Value;

use assetctl_core::ServiceResult;

use crate::gateway::Gateway;
use crate::types::Entity;

/// How many equipos the recent list shows.
pub const RECENT_EQUIPOS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EntityCounts {
    pub empresas: usize,
    pub ubicaciones: usize,
    pub responsables: usize,
    pub equipos: usize,
    pub usuarios: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardSummary {
    pub counts: EntityCounts,
    /// Equipos with a non-blank `doc_ingreso`.
    pub equipos_con_documento: usize,
    pub equipos_sin_documento: usize,
    /// Newest first, by descending `id`.
    pub recent_equipos: Vec<Value>,
}

/// Fetch all five collections concurrently and summarize them.
///
/// Fails as a whole on the first failing list.
pub async fn load_summary(gateway: &Gateway) -> ServiceResult<DashboardSummary> {
    let (empresas, ubicaciones, responsables, equipos, usuarios) = tokio::try_join!(
        gateway.resource(Entity::Empresas).list_items(&()),
        gateway.resource(Entity::Ubicaciones).list_items(&()),
        gateway.resource(Entity::Responsables).list_items(&()),
        gateway.resource(Entity::Equipos).list_items(&()),
        gateway.resource(Entity::Usuarios).list_items(&()),
    )?;

    let counts = EntityCounts {
        empresas: empresas.len(),
        ubicaciones: ubicaciones.len(),
        responsables: responsables.len(),
        equipos: equipos.len(),
        usuarios: usuarios.len(),
    };
    let summary = summarize(counts, equipos);
    tracing::debug!(
        equipos = summary.counts.equipos,
        con_documento = summary.equipos_con_documento,
        "dashboard summary loaded"
    );
    Ok(summary)
}

fn summarize(counts: EntityCounts, mut equipos: Vec<Value>) -> DashboardSummary {
    let equipos_con_documento = equipos.iter().filter(|e| has_document(e)).count();
    let equipos_sin_documento = equipos.len() - equipos_con_documento;

    // Rows without a numeric id sort last.
    equipos.sort_by_key(|e| std::cmp::Reverse(e.get("id").and_then(Value::as_i64)));
    equipos.truncate(RECENT_EQUIPOS);

    DashboardSummary {
        counts,
        equipos_con_documento,
        equipos_sin_documento,
        recent_equipos: equipos,
    }
}

fn has_document(equipo: &Value) -> bool {
    equipo
        .get("doc_ingreso")
        .and_then(Value::as_str)
        .is_some_and(|d| !d.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn splits_equipos_by_document_and_keeps_newest_five() {
        let equipos: Vec<Value> = (1..=7)
            .map(|id| {
                let doc = if id % 2 == 0 { json!("uploads/acta.pdf") } else { json!("  ") };
                json!({ "id": id, "doc_ingreso": doc })
            })
            .chain([json!({ "nombre": "sin id" })])
            .collect();

        let summary = summarize(EntityCounts::default(), equipos);
        assert_eq!(summary.equipos_con_documento, 3);
        assert_eq!(summary.equipos_sin_documento, 5);

        let ids: Vec<i64> = summary
            .recent_equipos
            .iter()
            .filter_map(|e| e["id"].as_i64())
            .collect();
        assert_eq!(ids, vec![7, 6, 5, 4, 3]);
    }

    #[test]
    fn null_document_counts_as_missing() {
        let summary = summarize(
            EntityCounts::default(),
            vec![json!({ "id": 1, "doc_ingreso": null })],
        );
        assert_eq!(summary.equipos_sin_documento, 1);
    }
}
