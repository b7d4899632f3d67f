//! Establishment Model

use serde::{Deserialize, Serialize};

/// Establishment kind as stored in the `tipo` column
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum EstablishmentKind {
    #[default]
    Supermercado,
    Mayorista,
}

impl EstablishmentKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            EstablishmentKind::Supermercado => "supermercado",
            EstablishmentKind::Mayorista => "mayorista",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "supermercado" => Some(EstablishmentKind::Supermercado),
            "mayorista" => Some(EstablishmentKind::Mayorista),
            _ => None,
        }
    }
}

impl std::fmt::Display for EstablishmentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Establishment entity (row in the `establishments` table)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Establishment {
    pub id: i64,
    pub nombre: String,
    #[serde(default)]
    pub direccion: Option<String>,
    #[serde(default)]
    pub telefono: Option<String>,
    pub tipo: EstablishmentKind,
    /// Operating hours, free text (e.g. "Lun-Dom 8:00-22:00")
    #[serde(default)]
    pub horarios: Option<String>,
    #[serde(default)]
    pub imagen_url: Option<String>,
    #[serde(default)]
    pub user_id: Option<String>,
}

/// Create establishment payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstablishmentCreate {
    pub nombre: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    pub tipo: EstablishmentKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horarios: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagen_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
}

/// Update establishment payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EstablishmentUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nombre: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub direccion: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub telefono: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tipo: Option<EstablishmentKind>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub horarios: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub imagen_url: Option<String>,
}
