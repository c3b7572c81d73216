//! Element property entity

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{KernelError, KernelResult};
use crate::sets::{Entity, Id};

/// Property type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// Shell property (`PSHELL`)
    Shell,
}

impl PropertyKind {
    pub fn from_card(card: &str) -> KernelResult<Self> {
        match card {
            "PSHELL" => Ok(PropertyKind::Shell),
            other => Err(KernelError::UnknownPropertyType(other.to_string())),
        }
    }
}

/// Raw property attributes as supplied by a data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PropertyParams {
    pub id: Id,
    /// Card name, e.g. `PSHELL`
    pub card: String,
    #[serde(default)]
    pub data: Value,
}

/// Element property
#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    id: Id,
    kind: PropertyKind,
    data: Value,
}

impl Entity for Property {
    const KIND: &'static str = "property";

    fn id(&self) -> Id {
        self.id
    }
}

impl Property {
    pub fn new(params: PropertyParams) -> KernelResult<Self> {
        Ok(Self {
            id: params.id,
            kind: PropertyKind::from_card(&params.card)?,
            data: params.data,
        })
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> PropertyKind {
        self.kind
    }

    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Material referenced by the membrane field (`MID1`)
    pub fn material_id(&self) -> Option<Id> {
        self.data
            .get("MID1")
            .and_then(Value::as_u64)
            .and_then(|v| Id::try_from(v).ok())
    }

    /// Shell thickness (`T`)
    pub fn thickness(&self) -> Option<f64> {
        self.data.get("T").and_then(Value::as_f64)
    }
}
