//! CSV exports of the per-system tables.

use std::path::Path;

use csv::Writer;
use engine::{CommissionRunResult, Money, SystemsSummary};
use serde::Serialize;

use crate::error::Result;

#[derive(Serialize)]
struct BanqueoRow {
    lottery_system_id: String,
    commission_percentage: String,
    sales_bs: Money,
    prizes_bs: Money,
    cuadre_bs: Money,
    commission_bs: Money,
    subtotal_bs: Money,
    participation_bs: Money,
    final_bs: Money,
    sales_usd: Money,
    prizes_usd: Money,
    cuadre_usd: Money,
    commission_usd: Money,
    subtotal_usd: Money,
    participation_usd: Money,
    final_usd: Money,
}

#[derive(Serialize)]
struct SystemRow<'a> {
    system_id: String,
    name: &'a str,
    code: &'a str,
    has_sublevels: bool,
    sales_bs: Money,
    prizes_bs: Money,
    sales_usd: Money,
    prizes_usd: Money,
}

pub fn banqueo_csv(run: &CommissionRunResult) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(vec![]);
    for system in &run.systems {
        writer.serialize(BanqueoRow {
            lottery_system_id: system.lottery_system_id.to_string(),
            commission_percentage: system.commission_percentage.to_string(),
            sales_bs: system.bs.sales,
            prizes_bs: system.bs.prizes,
            cuadre_bs: system.bs.cuadre,
            commission_bs: system.bs.commission,
            subtotal_bs: system.bs.subtotal,
            participation_bs: system.bs.participation,
            final_bs: system.bs.final_total,
            sales_usd: system.usd.sales,
            prizes_usd: system.usd.prizes,
            cuadre_usd: system.usd.cuadre,
            commission_usd: system.usd.commission,
            subtotal_usd: system.usd.subtotal,
            participation_usd: system.usd.participation,
            final_usd: system.usd.final_total,
        })?;
    }
    finish(writer)
}

pub fn systems_csv(summary: &SystemsSummary) -> Result<Vec<u8>> {
    let mut writer = Writer::from_writer(vec![]);
    for row in &summary.rows {
        writer.serialize(SystemRow {
            system_id: row.system_id.to_string(),
            name: &row.name,
            code: &row.code,
            has_sublevels: row.has_sublevels,
            sales_bs: row.sales.bs,
            prizes_bs: row.prizes.bs,
            sales_usd: row.sales.usd,
            prizes_usd: row.prizes.usd,
        })?;
    }
    finish(writer)
}

fn finish(writer: Writer<Vec<u8>>) -> Result<Vec<u8>> {
    writer.into_inner().map_err(|err| err.into_error().into())
}

pub async fn write(path: &Path, data: Vec<u8>) -> Result<()> {
    tokio::fs::write(path, data).await?;
    tracing::info!("exported {}", path.display());
    Ok(())
}
