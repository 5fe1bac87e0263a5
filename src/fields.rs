//! The values a staff member types into the signature form.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::department::{self, Department};

/// One form input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Field {
    Name,
    Role,
    Department,
    Phone,
    Address,
}

impl Field {
    pub const ALL: [Field; 5] = [
        Field::Name,
        Field::Role,
        Field::Department,
        Field::Phone,
        Field::Address,
    ];

    /// Form label.
    pub fn label(self) -> &'static str {
        match self {
            Field::Name => "Nome Completo",
            Field::Role => "Cargo",
            Field::Department => "Departamento",
            Field::Phone => "Telefone",
            Field::Address => "Endereço",
        }
    }

    /// Text shown in the preview while the field is empty.
    pub fn placeholder(self) -> &'static str {
        match self {
            Field::Role => "Cargo/Função",
            other => other.label(),
        }
    }
}

impl fmt::Display for Field {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Raw identity fields for one signature.
///
/// Free text except `department`, which is either unset or one of the
/// official labels. Nothing here is normalized; see [`crate::format`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SignatureFields {
    pub name: String,
    pub role: String,
    #[serde(deserialize_with = "department::deserialize_optional")]
    pub department: Option<Department>,
    pub phone: String,
    pub address: String,
}

impl SignatureFields {
    /// Raw text of a free-text field; the department yields its label or `""`.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Role => &self.role,
            Field::Department => self.department.map(Department::label).unwrap_or(""),
            Field::Phone => &self.phone,
            Field::Address => &self.address,
        }
    }

    /// Fields that are still empty (whitespace counts as empty), in form order.
    pub fn missing(&self) -> Vec<Field> {
        Field::ALL
            .iter()
            .copied()
            .filter(|f| self.get(*f).trim().is_empty())
            .collect()
    }

    pub fn is_complete(&self) -> bool {
        self.missing().is_empty()
    }
}
