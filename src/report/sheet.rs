//! CSV rendition of the dashboard report: general information, the monthly
//! summary with percentages, the per-month date grid and the numbered payment
//! detail.

use std::collections::BTreeMap;
use std::io::Write;

use chrono::NaiveDate;
use rust_decimal::{Decimal, RoundingStrategy};

use crate::domain::{DueDate, Error, Money, MonthKey};
use crate::report::{Artifact, ReportRequest, report_base_name};

pub fn render_csv(request: &ReportRequest, today: NaiveDate) -> Result<Artifact, Error> {
    let data = request.require_amounts()?;

    let mut writer = csv::WriterBuilder::new()
        .flexible(true)
        .from_writer(Vec::new());

    // Información General
    writer.write_record(["Información General"])?;
    if request.is_restored {
        writer.write_record(["Origen:", "Restaurado desde respaldo"])?;
    }
    let due_dates = request.due_dates();
    let info = [
        ("Cód. Cliente:", request.codigo_cliente.clone().unwrap_or_default()),
        ("RUC:", request.ruc.clone().unwrap_or_default()),
        ("Cliente:", request.razon_social.clone().unwrap_or_default()),
        ("Línea:", request.linea.clone().unwrap_or_default()),
        ("Cód. Pedido:", request.pedido.clone().unwrap_or_default()),
        ("Monto Total:", data.monto_original.to_string()),
        ("Total Letras:", due_dates.len().to_string()),
    ];
    for (label, value) in &info {
        writer.write_record([*label, value.as_str()])?;
    }

    // Resumen Mensual
    writer.write_record(["Resumen Mensual"])?;
    writer.write_record(["Mes", "Monto (S/)", "Porcentaje"])?;
    for (month, amount) in data.resumen_mensual {
        writer.write_record([
            month.label_es(),
            amount.to_string(),
            percentage(*amount, data.monto_original),
        ])?;
    }
    let summary_total = checked_total(data.resumen_mensual.values())?.to_string();
    writer.write_record(["Totales", summary_total.as_str(), "100.00%"])?;

    write_month_grid(&mut writer, data.montos_asignados, data.monto_original)?;

    // Detalle de Pagos
    writer.write_record(["Detalle de Pagos"])?;
    writer.write_record(["N°", "Fecha de Vencimiento", "Monto (S/)"])?;
    let mut detail_amounts = Vec::with_capacity(due_dates.len());
    for (idx, date) in due_dates.iter().enumerate() {
        let amount = data
            .montos_asignados
            .get(date)
            .copied()
            .unwrap_or_default();
        detail_amounts.push(amount);
        writer.write_record([(idx + 1).to_string(), date.to_string(), amount.to_string()])?;
    }
    let detail_total = checked_total(&detail_amounts)?.to_string();
    writer.write_record(["Monto Total", "", detail_total.as_str()])?;

    let bytes = writer
        .into_inner()
        .map_err(|e| Error::Internal(format!("Failed to finish CSV report: {}", e)))?;

    Ok(Artifact {
        filename: format!("reporte_{}.csv", report_base_name(request, today, true)),
        content_type: "text/csv; charset=utf-8",
        bytes,
    })
}

/// "Detalle por Mes": one column pair per month, dates in order down each
/// pair, closed by a "Total Mes" row.
fn write_month_grid<W: Write>(
    writer: &mut csv::Writer<W>,
    amounts: &BTreeMap<DueDate, Money>,
    monto_original: Money,
) -> Result<(), Error> {
    let mut by_month: BTreeMap<MonthKey, Vec<(DueDate, Money)>> = BTreeMap::new();
    for (date, amount) in amounts {
        by_month
            .entry(date.month_key())
            .or_default()
            .push((*date, *amount));
    }
    let mut month_totals = Vec::with_capacity(by_month.len());
    for entries in by_month.values() {
        month_totals.push(checked_total(entries.iter().map(|(_, amount)| amount))?);
    }

    writer.write_record(["Detalle por Mes"])?;

    let mut titles = Vec::with_capacity(by_month.len() * 2);
    let mut columns = Vec::with_capacity(by_month.len() * 2);
    for (month, total) in by_month.keys().zip(&month_totals) {
        titles.push(month.label_es());
        titles.push(percentage(*total, monto_original));
        columns.push("Fechas".to_string());
        columns.push("Monto (S/)".to_string());
    }
    writer.write_record(&titles)?;
    writer.write_record(&columns)?;

    let depth = by_month.values().map(Vec::len).max().unwrap_or(0);
    for row in 0..depth {
        let mut record = Vec::with_capacity(by_month.len() * 2);
        for entries in by_month.values() {
            match entries.get(row) {
                Some((date, amount)) => {
                    record.push(date.to_string());
                    record.push(amount.to_string());
                }
                None => {
                    record.push(String::new());
                    record.push(String::new());
                }
            }
        }
        writer.write_record(&record)?;
    }

    let mut closing = Vec::with_capacity(by_month.len() * 2);
    for total in &month_totals {
        closing.push("Total Mes".to_string());
        closing.push(total.to_string());
    }
    writer.write_record(&closing)?;
    Ok(())
}

/// Sums client-supplied amounts, rejecting totals beyond the representable range.
fn checked_total<'a>(amounts: impl IntoIterator<Item = &'a Money>) -> Result<Money, Error> {
    amounts
        .into_iter()
        .try_fold(Money::zero(), |acc, amount| acc.checked_add(*amount))
        .ok_or_else(|| Error::validation("amounts out of range"))
}

/// Share of `total` as `12.34%`; zero when the total is zero.
fn percentage(part: Money, total: Money) -> String {
    if total.as_minor() == 0 {
        return "0.00%".to_string();
    }
    let pct = (part.to_decimal() * Decimal::ONE_HUNDRED / total.to_decimal())
        .round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    format!("{:.2}%", pct)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::distributor::distribute_raw;

    fn request(dates: &[&str], total: &str) -> ReportRequest {
        let distribution = distribute_raw(total, dates).unwrap();
        ReportRequest {
            monto_original: Money::from_decimal_str(total),
            fechas_ordenadas: dates.iter().map(|d| DueDate::parse(d).unwrap()).collect(),
            montos_asignados: Some(distribution.per_date),
            resumen_mensual: Some(distribution.per_month),
            razon_social: Some("Mi Empresa S.A.C.".to_string()),
            linea: Some("Viniball".to_string()),
            pedido: Some("PED-9".to_string()),
            ruc: Some("20123456789".to_string()),
            codigo_cliente: None,
            is_restored: false,
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 6, 2).unwrap()
    }

    fn rows(artifact: &Artifact) -> Vec<Vec<String>> {
        csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .from_reader(artifact.bytes.as_slice())
            .records()
            .map(|r| r.unwrap().iter().map(str::to_string).collect())
            .collect()
    }

    #[test]
    fn renders_summary_and_detail_sections() {
        let req = request(&["15/08/2024", "16/08/2024", "02/09/2024"], "1000.00");
        let artifact = render_csv(&req, today()).unwrap();
        assert_eq!(artifact.filename, "reporte_PED-9-Mi_Empresa_SAC-06_25.csv");

        let rows = rows(&artifact);
        assert!(rows.contains(&vec!["Monto Total:".to_string(), "1000.00".to_string()]));
        assert!(rows.contains(&vec!["Total Letras:".to_string(), "3".to_string()]));
        assert!(rows.contains(&vec![
            "Agosto 2024".to_string(),
            "666.67".to_string(),
            "66.67%".to_string()
        ]));
        assert!(rows.contains(&vec![
            "Septiembre 2024".to_string(),
            "333.33".to_string(),
            "33.33%".to_string()
        ]));
        assert!(rows.contains(&vec![
            "Totales".to_string(),
            "1000.00".to_string(),
            "100.00%".to_string()
        ]));
        assert!(rows.contains(&vec![
            "1".to_string(),
            "15/08/2024".to_string(),
            "333.34".to_string()
        ]));
        assert_eq!(
            rows.last().unwrap(),
            &vec!["Monto Total".to_string(), String::new(), "1000.00".to_string()]
        );
    }

    #[test]
    fn restored_report_is_marked_and_dated_by_first_due_date() {
        let mut req = request(&["10/10/2025"], "150.50");
        req.is_restored = true;
        let artifact = render_csv(&req, today()).unwrap();

        assert_eq!(artifact.filename, "reporte_PED-9-Mi_Empresa_SAC-10_25.csv");
        let rows = rows(&artifact);
        assert_eq!(rows[1], vec!["Origen:".to_string(), "Restaurado desde respaldo".to_string()]);
    }

    #[test]
    fn percentages_round_half_away_from_zero() {
        assert_eq!(percentage(Money(1), Money(8)), "12.50%");
        assert_eq!(percentage(Money(1), Money(3)), "33.33%");
        assert_eq!(percentage(Money(2), Money(3)), "66.67%");
        assert_eq!(percentage(Money(5), Money(0)), "0.00%");
    }

    #[test]
    fn month_grid_lists_dates_under_their_month() {
        let req = request(&["15/08/2024", "16/08/2024", "02/09/2024"], "1000.00");
        let rows = rows(&render_csv(&req, today()).unwrap());

        let start = rows
            .iter()
            .position(|r| r == &vec!["Detalle por Mes".to_string()])
            .unwrap();
        let owned = |cells: &[&str]| cells.iter().map(|c| c.to_string()).collect::<Vec<_>>();
        assert_eq!(rows[start + 1], owned(&["Agosto 2024", "66.67%", "Septiembre 2024", "33.33%"]));
        assert_eq!(rows[start + 2], owned(&["Fechas", "Monto (S/)", "Fechas", "Monto (S/)"]));
        assert_eq!(rows[start + 3], owned(&["15/08/2024", "333.34", "02/09/2024", "333.33"]));
        assert_eq!(rows[start + 4], owned(&["16/08/2024", "333.33", "", ""]));
        assert_eq!(rows[start + 5], owned(&["Total Mes", "666.67", "Total Mes", "333.33"]));
        assert_eq!(rows[start + 6], owned(&["Detalle de Pagos"]));
    }

    #[test]
    fn overflowing_client_amounts_are_rejected() {
        let huge = Money::from_decimal_str("90000000000000000.00").unwrap();
        let req = ReportRequest {
            monto_original: Some(Money(100)),
            montos_asignados: Some(BTreeMap::new()),
            resumen_mensual: Some(BTreeMap::from([
                (MonthKey::parse("2024-01").unwrap(), huge),
                (MonthKey::parse("2024-02").unwrap(), huge),
            ])),
            ..Default::default()
        };

        match render_csv(&req, today()) {
            Err(Error::Validation(msg)) => assert_eq!(msg, "amounts out of range"),
            other => panic!("expected validation error, got {:?}", other),
        }

        let date = |s: &str| DueDate::parse(s).unwrap();
        let req = ReportRequest {
            monto_original: Some(Money(100)),
            montos_asignados: Some(BTreeMap::from([
                (date("01/01/2024"), huge),
                (date("02/01/2024"), huge),
            ])),
            resumen_mensual: Some(BTreeMap::new()),
            ..Default::default()
        };
        assert!(matches!(render_csv(&req, today()), Err(Error::Validation(_))));
    }

    #[test]
    fn missing_amounts_are_rejected() {
        let req = ReportRequest::default();
        assert!(matches!(render_csv(&req, today()), Err(Error::Validation(_))));
    }
}
