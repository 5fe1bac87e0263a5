//! Official organizational units a signature may name.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::{Error, Result};

/// One of the fixed organizational unit labels offered by the department
/// selector. Serialized as its full label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Department {
    #[serde(rename = "GP - Gabinete do Prefeito")]
    Gp,
    #[serde(rename = "VP - Gabinete do Vice-Prefeito")]
    Vp,
    #[serde(rename = "PGM - Procuradoria Geral do Município")]
    Pgm,
    #[serde(rename = "CGM - Controladoria Geral do Governo")]
    Cgm,
    #[serde(rename = "SMGOV - Secretaria Municipal de Governo")]
    Smgov,
    #[serde(rename = "SMADM - Secretaria Municipal de Administração")]
    Smadm,
    #[serde(rename = "SMALIC - Secretaria Municipal de Licitações e Contratos")]
    Smalic,
    #[serde(rename = "SMEDU - Secretaria Municipal de Educação")]
    Smedu,
    #[serde(rename = "SMSAU - Secretaria Municipal de Saúde")]
    Smsau,
    #[serde(rename = "SMAAS - Secretaria Municipal de Assistência Social")]
    Smaas,
    #[serde(rename = "SMOPLU - Secretaria Municipal de Ordem Pública e Limpeza Urbana")]
    Smoplu,
    #[serde(rename = "SMTMU - Secretaria Municipal de Transportes e Mobilidade Urbana")]
    Smtmu,
    #[serde(rename = "SMCUL - Secretaria Municipal de Cultura")]
    Smcul,
    #[serde(rename = "SMESP - Secretaria Municipal de Esportes")]
    Smesp,
    #[serde(rename = "SMAMCPA - Secretaria Municipal do Ambiente, Mudanças do Clima e Bem-Estar Animal")]
    Smamcpa,
    #[serde(rename = "SMAPA - Secretaria Municipal de Agricultura, Pesca e Abastecimento")]
    Smapa,
    #[serde(rename = "SMCTIC - Secretaria Municipal de Ciência, Tecnologia, Inovação e Comunicação")]
    Smctic,
    #[serde(rename = "SMFPL - Secretaria Municipal de Fazenda e Planejamento")]
    Smfpl,
    #[serde(rename = "SMOU - Secretaria Municipal de Obras e Urbanismo")]
    Smou,
    #[serde(rename = "SMSPDT - Secretaria Municipal de Defesa Civil, Defesa e Trânsito")]
    Smspdt,
    #[serde(rename = "SMSEG - Secretaria Municipal de Segurança Pública")]
    Smseg,
    #[serde(rename = "SMEV - Secretaria Municipal de Eventos")]
    Smev,
    #[serde(rename = "SMDE - Secretaria Municipal de Desenvolvimento Econômico")]
    Smde,
    #[serde(rename = "CIAITA - CODUITA - Companhia Municipal de Desenvolvimento Urbano de Itaguaí")]
    Ciaita,
}

impl Department {
    /// Every unit, in the order the selector lists them.
    pub const ALL: [Department; 24] = [
        Department::Gp,
        Department::Vp,
        Department::Pgm,
        Department::Cgm,
        Department::Smgov,
        Department::Smadm,
        Department::Smalic,
        Department::Smedu,
        Department::Smsau,
        Department::Smaas,
        Department::Smoplu,
        Department::Smtmu,
        Department::Smcul,
        Department::Smesp,
        Department::Smamcpa,
        Department::Smapa,
        Department::Smctic,
        Department::Smfpl,
        Department::Smou,
        Department::Smspdt,
        Department::Smseg,
        Department::Smev,
        Department::Smde,
        Department::Ciaita,
    ];

    /// Prompt shown by the selector while nothing is chosen.
    pub const PROMPT: &'static str = "Selecione o departamento";

    /// Full label, e.g. `"SMEDU - Secretaria Municipal de Educação"`.
    pub fn label(self) -> &'static str {
        match self {
            Department::Gp => "GP - Gabinete do Prefeito",
            Department::Vp => "VP - Gabinete do Vice-Prefeito",
            Department::Pgm => "PGM - Procuradoria Geral do Município",
            Department::Cgm => "CGM - Controladoria Geral do Governo",
            Department::Smgov => "SMGOV - Secretaria Municipal de Governo",
            Department::Smadm => "SMADM - Secretaria Municipal de Administração",
            Department::Smalic => "SMALIC - Secretaria Municipal de Licitações e Contratos",
            Department::Smedu => "SMEDU - Secretaria Municipal de Educação",
            Department::Smsau => "SMSAU - Secretaria Municipal de Saúde",
            Department::Smaas => "SMAAS - Secretaria Municipal de Assistência Social",
            Department::Smoplu => "SMOPLU - Secretaria Municipal de Ordem Pública e Limpeza Urbana",
            Department::Smtmu => "SMTMU - Secretaria Municipal de Transportes e Mobilidade Urbana",
            Department::Smcul => "SMCUL - Secretaria Municipal de Cultura",
            Department::Smesp => "SMESP - Secretaria Municipal de Esportes",
            Department::Smamcpa => {
                "SMAMCPA - Secretaria Municipal do Ambiente, Mudanças do Clima e Bem-Estar Animal"
            }
            Department::Smapa => "SMAPA - Secretaria Municipal de Agricultura, Pesca e Abastecimento",
            Department::Smctic => {
                "SMCTIC - Secretaria Municipal de Ciência, Tecnologia, Inovação e Comunicação"
            }
            Department::Smfpl => "SMFPL - Secretaria Municipal de Fazenda e Planejamento",
            Department::Smou => "SMOU - Secretaria Municipal de Obras e Urbanismo",
            Department::Smspdt => "SMSPDT - Secretaria Municipal de Defesa Civil, Defesa e Trânsito",
            Department::Smseg => "SMSEG - Secretaria Municipal de Segurança Pública",
            Department::Smev => "SMEV - Secretaria Municipal de Eventos",
            Department::Smde => "SMDE - Secretaria Municipal de Desenvolvimento Econômico",
            Department::Ciaita => {
                "CIAITA - CODUITA - Companhia Municipal de Desenvolvimento Urbano de Itaguaí"
            }
        }
    }

    /// Short acronym before the first ` - `, e.g. `"SMEDU"`.
    pub fn acronym(self) -> &'static str {
        self.label().split(" - ").next().unwrap_or_default()
    }

    /// Parse a selector value where the empty string means "unset".
    pub fn parse_optional(value: &str) -> Result<Option<Department>> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(None);
        }
        value.parse().map(Some)
    }
}

impl FromStr for Department {
    type Err = Error;

    /// Accepts the full label or, case-insensitively, the acronym alone.
    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        Department::ALL
            .iter()
            .copied()
            .find(|d| d.label() == s || d.acronym().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::InvalidDepartment(s.to_string()))
    }
}

impl fmt::Display for Department {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Serde helper for `Option<Department>` fields that arrive as `""` when unset.
pub fn deserialize_optional<'de, D>(deserializer: D) -> std::result::Result<Option<Department>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    match raw {
        None => Ok(None),
        Some(s) => Department::parse_optional(&s).map_err(serde::de::Error::custom),
    }
}
