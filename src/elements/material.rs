//! Material entity

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{KernelError, KernelResult};
use crate::sets::{Entity, Id};

/// Material symmetry class
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MaterialKind {
    Isotropic,
    Orthotropic,
    Anisotropic,
}

impl MaterialKind {
    /// Symmetry class of a material card (`MAT1`, `MAT8`, ...)
    pub fn from_card(card: &str) -> KernelResult<Self> {
        match card {
            "MAT1" | "MAT4" => Ok(MaterialKind::Isotropic),
            "MAT2" | "MAT5" | "MAT9" => Ok(MaterialKind::Anisotropic),
            "MAT3" | "MAT8" => Ok(MaterialKind::Orthotropic),
            other => Err(KernelError::UnknownMaterialType(other.to_string())),
        }
    }
}

/// Raw material attributes as supplied by a data source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MaterialParams {
    pub id: Id,
    /// Card name, e.g. `MAT1`
    pub card: String,
    /// Card fields not modelled structurally
    #[serde(default)]
    pub data: Value,
}

/// Material properties
#[derive(Debug, Clone, PartialEq)]
pub struct Material {
    id: Id,
    kind: MaterialKind,
    card: String,
    data: Value,
}

impl Entity for Material {
    const KIND: &'static str = "material";

    fn id(&self) -> Id {
        self.id
    }
}

impl Material {
    pub fn new(params: MaterialParams) -> KernelResult<Self> {
        let kind = MaterialKind::from_card(&params.card)?;
        Ok(Self {
            id: params.id,
            kind,
            card: params.card,
            data: params.data,
        })
    }

    pub fn id(&self) -> Id {
        self.id
    }

    pub fn kind(&self) -> MaterialKind {
        self.kind
    }

    pub fn card(&self) -> &str {
        &self.card
    }

    /// Raw card fields
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Numeric card field by name
    pub fn field(&self, name: &str) -> Option<f64> {
        self.data.get(name).and_then(Value::as_f64)
    }

    /// Modulus of elasticity (`E`)
    pub fn elastic_modulus(&self) -> Option<f64> {
        self.field("E")
    }

    /// Shear modulus (`G`), derived from `E` and `NU` when absent
    pub fn shear_modulus(&self) -> Option<f64> {
        self.field("G").or_else(|| {
            let e = self.elastic_modulus()?;
            let nu = self.poisson_ratio()?;
            Some(e / (2.0 * (1.0 + nu)))
        })
    }

    /// Poisson's ratio (`NU`)
    pub fn poisson_ratio(&self) -> Option<f64> {
        self.field("NU")
    }

    /// Mass density (`RHO`)
    pub fn density(&self) -> Option<f64> {
        self.field("RHO")
    }
}
