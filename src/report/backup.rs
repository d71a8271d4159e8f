use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;

use crate::domain::{DueDate, Error, Money, MonthKey};
use crate::report::{Artifact, ReportRequest, report_base_name};

/// Persisted backup of a distribution. Field names are an external contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackupDocument {
    pub monto_original: Money,
    #[serde(default)]
    pub fechas_ordenadas: Vec<DueDate>,
    pub montos_asignados: BTreeMap<DueDate, Money>,
    pub resumen_mensual: BTreeMap<MonthKey, Money>,
    #[serde(default)]
    pub razon_social: String,
    #[serde(default)]
    pub linea: String,
    #[serde(default)]
    pub pedido: String,
    #[serde(default)]
    pub ruc: String,
    #[serde(default)]
    pub codigo_cliente: String,
}

impl BackupDocument {
    pub fn from_request(request: &ReportRequest) -> Result<Self, Error> {
        let data = request.require_amounts()?;
        let (Some(razon_social), Some(linea), Some(pedido)) = (
            request.razon_social.as_ref(),
            request.linea.as_ref(),
            request.pedido.as_ref(),
        ) else {
            return Err(Error::validation(
                "Missing data required to generate the JSON report: razonSocial, linea, pedido",
            ));
        };

        Ok(Self {
            monto_original: data.monto_original,
            fechas_ordenadas: request.fechas_ordenadas.clone(),
            montos_asignados: data.montos_asignados.clone(),
            resumen_mensual: data.resumen_mensual.clone(),
            razon_social: razon_social.clone(),
            linea: linea.clone(),
            pedido: pedido.clone(),
            ruc: request.ruc.clone().unwrap_or_default(),
            codigo_cliente: request.codigo_cliente.clone().unwrap_or_default(),
        })
    }

    pub fn into_request(self) -> ReportRequest {
        ReportRequest {
            monto_original: Some(self.monto_original),
            fechas_ordenadas: self.fechas_ordenadas,
            montos_asignados: Some(self.montos_asignados),
            resumen_mensual: Some(self.resumen_mensual),
            razon_social: Some(self.razon_social),
            linea: Some(self.linea),
            pedido: Some(self.pedido),
            ruc: Some(self.ruc),
            codigo_cliente: Some(self.codigo_cliente),
            is_restored: true,
        }
    }
}

/// Pretty-printed backup; always dated `today` so successive backups version.
pub fn render_backup(request: &ReportRequest, today: NaiveDate) -> Result<Artifact, Error> {
    let document = BackupDocument::from_request(request)?;

    let mut bytes = Vec::new();
    let mut serializer =
        serde_json::Serializer::with_formatter(&mut bytes, PrettyFormatter::with_indent(b"    "));
    document
        .serialize(&mut serializer)
        .map_err(|e| Error::Internal(format!("Failed to encode backup: {}", e)))?;

    Ok(Artifact {
        filename: format!("respaldo_{}.json", report_base_name(request, today, false)),
        content_type: "application/json",
        bytes,
    })
}

/// Rebuilds report context from a previously emitted backup.
pub fn restore_backup(bytes: &[u8]) -> Result<ReportRequest, Error> {
    let document: BackupDocument = serde_json::from_slice(bytes)
        .map_err(|e| Error::validation(format!("Invalid backup document: {}", e)))?;
    Ok(document.into_request())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributor::distribute_raw;

    fn request() -> ReportRequest {
        let dates = ["15/08/2024", "16/08/2024", "02/09/2024"];
        let distribution = distribute_raw("1000.00", &dates).unwrap();
        ReportRequest {
            monto_original: Some(Money(100000)),
            fechas_ordenadas: dates.iter().map(|d| DueDate::parse(d).unwrap()).collect(),
            montos_asignados: Some(distribution.per_date),
            resumen_mensual: Some(distribution.per_month),
            razon_social: Some("Mi Empresa S.A.C.".to_string()),
            linea: Some("Vinifan".to_string()),
            pedido: Some("PED-001".to_string()),
            ruc: None,
            codigo_cliente: Some("C-77".to_string()),
            is_restored: false,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 9).unwrap()
    }

    #[test]
    fn backup_has_contract_fields_and_name() {
        let artifact = render_backup(&request(), today()).unwrap();
        assert_eq!(artifact.filename, "respaldo_PED-001-Mi_Empresa_SAC-01_25.json");
        assert_eq!(artifact.content_type, "application/json");

        let text = String::from_utf8(artifact.bytes).unwrap();
        assert!(text.contains("\n    \"montoOriginal\": 1000.0"));

        let json: serde_json::Value = serde_json::from_str(&text).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        for key in [
            "montoOriginal",
            "fechasOrdenadas",
            "montosAsignados",
            "resumenMensual",
            "razonSocial",
            "linea",
            "pedido",
            "ruc",
            "codigoCliente",
        ] {
            assert!(keys.contains(&key), "missing {}", key);
        }
        assert_eq!(keys.len(), 9);
        assert_eq!(json["ruc"], "");
        assert_eq!(json["razonSocial"], "Mi Empresa S.A.C.");
        assert_eq!(json["montosAsignados"]["15/08/2024"], 333.34);
        assert_eq!(json["resumenMensual"]["2024-09"], 333.33);
        assert_eq!(json["fechasOrdenadas"][2], "02/09/2024");
    }

    #[test]
    fn backup_requires_client_fields() {
        let mut incomplete = request();
        incomplete.linea = None;
        assert!(matches!(render_backup(&incomplete, today()), Err(Error::Validation(_))));
    }

    #[test]
    fn restored_backup_is_flagged_and_keeps_amounts() {
        let original = request();
        let artifact = render_backup(&original, today()).unwrap();

        let restored = restore_backup(&artifact.bytes).unwrap();
        assert!(restored.is_restored);
        assert_eq!(restored.montos_asignados, original.montos_asignados);
        assert_eq!(restored.resumen_mensual, original.resumen_mensual);
        assert_eq!(restored.fechas_ordenadas, original.fechas_ordenadas);
        assert_eq!(restored.ruc.as_deref(), Some(""));
    }

    #[test]
    fn garbage_backup_is_rejected() {
        assert!(matches!(restore_backup(b"{not json"), Err(Error::Validation(_))));
        assert!(matches!(
            restore_backup(br#"{"montoOriginal": 10}"#),
            Err(Error::Validation(_))
        ));
    }
}
