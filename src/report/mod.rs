//! Artifacts derived from a distribution: the JSON backup document and the
//! CSV report.

pub mod backup;
pub mod sheet;

use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::{DueDate, Error, Money, MonthKey};

pub use backup::{BackupDocument, render_backup, restore_backup};
pub use sheet::render_csv;

/// Payload sent by the client to build a report or a backup.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportRequest {
    pub monto_original: Option<Money>,
    #[serde(default)]
    pub fechas_ordenadas: Vec<DueDate>,
    pub montos_asignados: Option<BTreeMap<DueDate, Money>>,
    pub resumen_mensual: Option<BTreeMap<MonthKey, Money>>,
    pub razon_social: Option<String>,
    pub linea: Option<String>,
    pub pedido: Option<String>,
    pub ruc: Option<String>,
    pub codigo_cliente: Option<String>,
    #[serde(default)]
    pub is_restored: bool,
}

/// Rendered file ready to be sent as an attachment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifact {
    pub filename: String,
    pub content_type: &'static str,
    pub bytes: Vec<u8>,
}

/// The required core of a [`ReportRequest`], checked once.
pub(crate) struct ReportData<'a> {
    pub monto_original: Money,
    pub montos_asignados: &'a BTreeMap<DueDate, Money>,
    pub resumen_mensual: &'a BTreeMap<MonthKey, Money>,
}

impl ReportRequest {
    pub(crate) fn require_amounts(&self) -> Result<ReportData<'_>, Error> {
        match (
            self.monto_original,
            self.montos_asignados.as_ref(),
            self.resumen_mensual.as_ref(),
        ) {
            (Some(monto_original), Some(montos_asignados), Some(resumen_mensual)) => Ok(ReportData {
                monto_original,
                montos_asignados,
                resumen_mensual,
            }),
            _ => Err(Error::validation(
                "Missing data required to generate the report: montoOriginal, montosAsignados, resumenMensual",
            )),
        }
    }

    /// Due dates in report order: the client's ordering when given, otherwise
    /// the distributed dates.
    pub fn due_dates(&self) -> Vec<DueDate> {
        if !self.fechas_ordenadas.is_empty() {
            return self.fechas_ordenadas.clone();
        }
        self.montos_asignados
            .as_ref()
            .map(|m| m.keys().copied().collect())
            .unwrap_or_default()
    }
}

/// Keeps alphanumerics, spaces, `_` and `-`, then joins words with `_`.
pub fn sanitize_filename(name: &str) -> String {
    let kept: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '_' | '-'))
        .collect();
    kept.split_whitespace().collect::<Vec<_>>().join("_")
}

/// `{pedido}-{cliente}-{MM_YY}`. Restored reports may be dated by their first
/// due date instead of `today`.
pub fn report_base_name(request: &ReportRequest, today: NaiveDate, use_restored_date: bool) -> String {
    let cliente = sanitize_filename(request.razon_social.as_deref().unwrap_or_default());
    let pedido = sanitize_filename(request.pedido.as_deref().unwrap_or_default());

    let reference = if use_restored_date && request.is_restored {
        request
            .fechas_ordenadas
            .first()
            .map(DueDate::date)
            .unwrap_or(today)
    } else {
        today
    };

    format!("{}-{}-{}", pedido, cliente, reference.format("%m_%y"))
}
