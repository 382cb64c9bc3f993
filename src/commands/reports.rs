use chrono::{Datelike, Local, NaiveDate};
use clap::{Args, Subcommand};

use super::{money, Context};
use crate::reports;

#[derive(Debug, Args)]
pub struct ReportArgs {
    #[command(subcommand)]
    pub command: ReportCmds,
}

#[derive(Debug, Subcommand)]
pub enum ReportCmds {
    /// Sales per day for one month (defaults to the current month)
    Day {
        #[arg(long)]
        year: Option<i32>,
        #[arg(long)]
        month: Option<u32>,
    },
    /// Sales per month for one year (defaults to the current year)
    Month {
        #[arg(long)]
        year: Option<i32>,
    },
    /// Paid bills between two dates (defaults to the current month)
    Bills {
        #[arg(long, value_name = "YYYY-MM-DD")]
        from: Option<NaiveDate>,
        #[arg(long, value_name = "YYYY-MM-DD")]
        to: Option<NaiveDate>,
    },
    /// Cancel a paid bill
    CancelBill { id: i64 },
}

pub async fn run(ctx: &Context, args: ReportArgs) -> anyhow::Result<()> {
    let today = Local::now().date_naive();
    match args.command {
        ReportCmds::Day { year, month } => {
            let year = year.unwrap_or(today.year());
            let month = month.unwrap_or(today.month());
            let report = reports::sales_per_day(&ctx.api, year, month).await?;
            println!("sales per day, {year}-{month:02}");
            for row in &report.rows {
                println!("  {:<12} {:>12}", row.date, money(row.amount));
            }
            println!(
                "  total {} over {} day(s) with sales",
                money(report.total),
                report.days_with_sales
            );
            if let Some(best) = &report.best_day {
                println!("  best day {} ({})", best.date, money(best.amount));
            }
        }
        ReportCmds::Month { year } => {
            let year = year.unwrap_or(today.year());
            let report = reports::sales_per_month(&ctx.api, year).await?;
            println!("sales per month, {year}");
            for row in &report.rows {
                println!("  {:<12} {:>12}", row.month, money(row.amount));
            }
            println!("  total {}", money(report.total));
            if let Some(best) = &report.best_month {
                println!("  best month {} ({})", best.month, money(best.amount));
            }
        }
        ReportCmds::Bills { from, to } => {
            let (first, last) = reports::month_bounds(today);
            let history =
                reports::list_bills(&ctx.api, from.unwrap_or(first), to.unwrap_or(last)).await?;
            println!("bills {} .. {}", history.from, history.to);
            for bill in &history.bills {
                let cashier = bill.user.as_ref().map(|u| u.name.as_str()).unwrap_or("-");
                println!(
                    "  #{:<6} {:<20} table {:<3} {:<10} {:>12}  {cashier}",
                    bill.id,
                    bill.pay_date.as_deref().unwrap_or(&bill.created_date),
                    bill.table_no,
                    bill.pay_type.as_str(),
                    money(bill.amount),
                );
            }
            println!("  {} bill(s), total {}", history.bills.len(), money(history.total));
        }
        ReportCmds::CancelBill { id } => {
            reports::cancel_bill(&ctx.api, id).await?;
            println!("bill #{id} cancelled");
        }
    }
    Ok(())
}
