//! Resource types shared by the gateway and its callers.

use core::str::FromStr;

use bytes::Bytes;
use serde::{Deserialize, Serialize};

use crate::session::View;

// ─────────────────────────────────────────────────────────────────────────────
// Entities
// ─────────────────────────────────────────────────────────────────────────────

/// The five resource collections exposed by the remote service.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Entity {
    Empresas,
    Ubicaciones,
    Responsables,
    Equipos,
    Usuarios,
}

impl Entity {
    pub const ALL: [Entity; 5] = [
        Entity::Empresas,
        Entity::Ubicaciones,
        Entity::Responsables,
        Entity::Equipos,
        Entity::Usuarios,
    ];

    /// Collection path segment under `/api/`.
    pub fn slug(&self) -> &'static str {
        match self {
            Entity::Empresas => "empresas",
            Entity::Ubicaciones => "ubicaciones",
            Entity::Responsables => "responsables-entrega",
            Entity::Equipos => "equipos",
            Entity::Usuarios => "usuarios",
        }
    }

    pub fn collection_path(&self) -> String {
        format!("/api/{}", self.slug())
    }

    pub fn item_path(&self, id: impl core::fmt::Display) -> String {
        format!("/api/{}/{}", self.slug(), id)
    }

    /// Whether the service renders downloadable reports for this entity.
    pub fn has_report(&self) -> bool {
        matches!(self, Entity::Empresas | Entity::Equipos | Entity::Usuarios)
    }

    /// The signed-in view that lists this entity.
    pub fn view(&self) -> View {
        match self {
            Entity::Empresas => View::Empresas,
            Entity::Ubicaciones => View::Ubicaciones,
            Entity::Responsables => View::Responsables,
            Entity::Equipos => View::Equipos,
            Entity::Usuarios => View::Usuarios,
        }
    }
}

impl FromStr for Entity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "empresas" => Ok(Entity::Empresas),
            "ubicaciones" => Ok(Entity::Ubicaciones),
            "responsables" | "responsables-entrega" => Ok(Entity::Responsables),
            "equipos" => Ok(Entity::Equipos),
            "usuarios" => Ok(Entity::Usuarios),
            other => Err(format!("unknown entity '{other}'")),
        }
    }
}

impl core::fmt::Display for Entity {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.slug())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// List filters
// ─────────────────────────────────────────────────────────────────────────────

/// Something that renders to list query parameters.
///
/// Empty values are left out entirely.
pub trait ListQuery {
    fn params(&self) -> Vec<(&'static str, String)>;
}

fn push(params: &mut Vec<(&'static str, String)>, name: &'static str, value: &Option<String>) {
    if let Some(v) = value.as_deref().map(str::trim).filter(|v| !v.is_empty()) {
        params.push((name, v.to_string()));
    }
}

fn push_id(params: &mut Vec<(&'static str, String)>, name: &'static str, value: Option<i64>) {
    if let Some(v) = value {
        params.push((name, v.to_string()));
    }
}

impl ListQuery for () {
    fn params(&self) -> Vec<(&'static str, String)> {
        Vec::new()
    }
}

/// Free-text search (`q`), used by empresas and ubicaciones.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TextFilter {
    pub q: Option<String>,
}

impl TextFilter {
    pub fn new(q: impl Into<String>) -> Self {
        Self { q: Some(q.into()) }
    }
}

impl ListQuery for TextFilter {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut p = Vec::new();
        push(&mut p, "q", &self.q);
        p
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResponsableFilter {
    pub q: Option<String>,
    pub documento: Option<String>,
}

impl ListQuery for ResponsableFilter {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut p = Vec::new();
        push(&mut p, "q", &self.q);
        push(&mut p, "documento", &self.documento);
        p
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsuarioFilter {
    pub q: Option<String>,
    pub role: Option<String>,
}

impl ListQuery for UsuarioFilter {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut p = Vec::new();
        push(&mut p, "q", &self.q);
        push(&mut p, "role", &self.role);
        p
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipoFilter {
    pub tipo: Option<String>,
    pub estado: Option<String>,
    /// Free text, sent as `q`.
    pub texto: Option<String>,
    pub empresa_id: Option<i64>,
    pub responsable_entrega_id: Option<i64>,
    pub ubicacion_id: Option<i64>,
    pub usuario_autoriza_id: Option<i64>,
    pub registrado_por_id: Option<i64>,
}

impl ListQuery for EquipoFilter {
    fn params(&self) -> Vec<(&'static str, String)> {
        let mut p = Vec::new();
        push(&mut p, "tipo", &self.tipo);
        push(&mut p, "estado", &self.estado);
        push(&mut p, "q", &self.texto);
        push_id(&mut p, "empresa_id", self.empresa_id);
        push_id(&mut p, "responsable_entrega_id", self.responsable_entrega_id);
        push_id(&mut p, "ubicacion_id", self.ubicacion_id);
        push_id(&mut p, "usuario_autoriza_id", self.usuario_autoriza_id);
        push_id(&mut p, "registrado_por_id", self.registrado_por_id);
        p
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Metadata
// ─────────────────────────────────────────────────────────────────────────────

/// Allowed values for equipo fields, used to populate selects.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EquipoEnums {
    #[serde(default)]
    pub tipos: Vec<String>,
    #[serde(default)]
    pub estados: Vec<String>,
    #[serde(default)]
    pub categorias: Vec<String>,
    #[serde(default)]
    pub condiciones: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UsuarioEnums {
    #[serde(default)]
    pub roles: Vec<String>,
    #[serde(default)]
    pub estados: Vec<String>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Files
// ─────────────────────────────────────────────────────────────────────────────

/// A file to send to `/api/upload`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub bytes: Bytes,
    pub mime: Option<String>,
}

impl UploadFile {
    pub fn new(file_name: impl Into<String>, bytes: impl Into<Bytes>) -> Self {
        Self {
            file_name: file_name.into(),
            bytes: bytes.into(),
            mime: None,
        }
    }

    pub fn with_mime(mut self, mime: impl Into<String>) -> Self {
        self.mime = Some(mime.into());
        self
    }
}

/// Upload response: `file` is a server-relative path.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadedFile {
    #[serde(default)]
    pub ok: bool,
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    #[default]
    Pdf,
    Xlsx,
}

impl ReportFormat {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportFormat::Pdf => "pdf",
            ReportFormat::Xlsx => "xlsx",
        }
    }
}

impl FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pdf" => Ok(ReportFormat::Pdf),
            "xlsx" => Ok(ReportFormat::Xlsx),
            other => Err(format!("unknown report format '{other}'")),
        }
    }
}

impl core::fmt::Display for ReportFormat {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn responsables_live_under_their_own_path() {
        assert_eq!(Entity::Responsables.collection_path(), "/api/responsables-entrega");
        assert_eq!(Entity::Equipos.item_path(4), "/api/equipos/4");
        assert_eq!("responsables".parse::<Entity>().unwrap(), Entity::Responsables);
    }

    #[test]
    fn blank_filter_values_are_dropped() {
        let filter = EquipoFilter {
            tipo: Some("biomedico".into()),
            estado: Some("   ".into()),
            texto: Some("monitor".into()),
            ubicacion_id: Some(3),
            ..Default::default()
        };
        assert_eq!(
            filter.params(),
            vec![
                ("tipo", "biomedico".to_string()),
                ("q", "monitor".to_string()),
                ("ubicacion_id", "3".to_string()),
            ]
        );
        assert!(TextFilter::default().params().is_empty());
    }

    #[test]
    fn metadata_lists_default_to_empty() {
        let enums: EquipoEnums = serde_json::from_str(r#"{"tipos":["tecnologico"]}"#).unwrap();
        assert_eq!(enums.tipos, vec!["tecnologico"]);
        assert!(enums.condiciones.is_empty());
    }

    #[test]
    fn only_some_entities_have_reports() {
        let reported: Vec<Entity> = Entity::ALL.into_iter().filter(Entity::has_report).collect();
        assert_eq!(reported, vec![Entity::Empresas, Entity::Equipos, Entity::Usuarios]);
    }

    #[test]
    fn entities_map_to_their_views() {
        for entity in Entity::ALL {
            assert_eq!(entity.view().as_str(), entity.to_string().split('-').next().unwrap());
        }
    }
}
