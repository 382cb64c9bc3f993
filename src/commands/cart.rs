use anyhow::Context as _;
use clap::{Args, Subcommand};

use super::{money, Context};
use crate::api::ApiClient;
use crate::cart::CartView;
use crate::error::CartError;
use crate::models::PayType;

#[derive(Debug, Args)]
pub struct CartArgs {
    #[arg(long, short = 't', help = "Table number", value_parser = clap::value_parser!(i64).range(1..))]
    pub table: i64,
    #[command(subcommand)]
    pub command: CartCmds,
}

#[derive(Debug, Subcommand)]
pub enum CartCmds {
    /// Show the table's lines and total
    Show,
    /// Add one unit of a food to the table
    Add { food_id: i64 },
    /// Set a line's quantity
    Qty { line_id: i64, qty: i64 },
    /// Increase a line's quantity by one
    Inc { line_id: i64 },
    /// Decrease a line's quantity by one
    Dec { line_id: i64 },
    /// Remove one line
    Remove { line_id: i64 },
    /// Remove every line this operator has on the table
    Clear,
    /// Show a line's detail slots and the tastes/sizes on offer
    Detail { line_id: i64 },
    /// Add a detail slot to a line
    AddDetail { line_id: i64 },
    /// Remove a detail slot from a line
    RemoveDetail { line_id: i64, detail_id: i64 },
    /// Select a taste for a detail slot; omit TASTE_ID to clear it
    Taste {
        line_id: i64,
        detail_id: i64,
        taste_id: Option<i64>,
    },
    /// Select a size for a detail slot; omit SIZE_ID to clear it
    Size {
        line_id: i64,
        detail_id: i64,
        size_id: Option<i64>,
    },
    /// Print the unpaid bill
    Draft,
    /// End the sale and print the receipt
    Checkout {
        #[arg(long, default_value = "cash", value_parser = parse_pay_type)]
        pay_type: PayType,
        #[arg(long, help = "Amount handed over by the customer")]
        tendered: f64,
    },
}

fn parse_pay_type(raw: &str) -> Result<PayType, String> {
    raw.parse()
}

pub async fn run(ctx: &Context, args: CartArgs) -> anyhow::Result<()> {
    let mut view = CartView::new(ctx.api.clone(), ctx.session.clone(), args.table);
    let outcome = execute(&mut view, args.command).await;
    for notice in view.drain_notices() {
        eprintln!("{notice}");
    }
    outcome.with_context(|| format!("cart operation on table {} failed", args.table))
}

async fn execute(view: &mut CartView<ApiClient>, cmd: CartCmds) -> Result<(), CartError> {
    view.refresh().await?;
    match cmd {
        CartCmds::Show => {}
        CartCmds::Add { food_id } => view.add_item(food_id).await?,
        CartCmds::Qty { line_id, qty } => view.change_qty(line_id, qty).await?,
        CartCmds::Inc { line_id } => view.increment(line_id).await?,
        CartCmds::Dec { line_id } => view.decrement(line_id).await?,
        CartCmds::Remove { line_id } => view.remove_line(line_id).await?,
        CartCmds::Clear => view.clear_table().await?,
        CartCmds::Detail { line_id } => {
            view.open_detail(line_id).await?;
            print_editor(view);
            return Ok(());
        }
        CartCmds::AddDetail { line_id } => {
            view.open_detail(line_id).await?;
            view.add_detail_slot().await?;
            print_editor(view);
        }
        CartCmds::RemoveDetail { line_id, detail_id } => {
            view.open_detail(line_id).await?;
            view.remove_detail_slot(detail_id).await?;
            print_editor(view);
        }
        CartCmds::Taste {
            line_id,
            detail_id,
            taste_id,
        } => {
            view.open_detail(line_id).await?;
            match taste_id {
                Some(id) => view.select_taste(detail_id, id).await?,
                None => view.unselect_taste(detail_id).await?,
            }
            print_editor(view);
        }
        CartCmds::Size {
            line_id,
            detail_id,
            size_id,
        } => {
            view.open_detail(line_id).await?;
            match size_id {
                Some(id) => view.select_size(detail_id, id).await?,
                None => view.unselect_size(detail_id).await?,
            }
            print_editor(view);
        }
        CartCmds::Draft => {
            let file = view.print_draft().await?;
            println!("bill: {file}");
            return Ok(());
        }
        CartCmds::Checkout { pay_type, tendered } => {
            let outcome = view.checkout(pay_type, tendered).await?;
            println!(
                "paid {} by {}, tendered {}, change {}",
                money(outcome.amount),
                pay_type.as_str(),
                money(outcome.tendered),
                money(outcome.change)
            );
            if let Some(receipt) = outcome.receipt {
                println!("receipt: {receipt}");
            }
            return Ok(());
        }
    }
    print_cart(view);
    Ok(())
}

fn print_cart(view: &CartView<ApiClient>) {
    println!("table {}", view.table_no());
    if view.is_empty() {
        println!("  (empty)");
        return;
    }
    for line in view.lines() {
        let lock = if view.can_edit_qty(line.id) { "" } else { " [customised]" };
        println!(
            "  #{:<5} {:<24} {} x {:<3} = {}{lock}",
            line.id,
            line.food.name,
            money(line.unit_price()),
            line.qty,
            money(line.unit_price() * line.qty as f64),
        );
    }
    let totals = view.totals();
    if totals.surcharges > 0.0 {
        println!("  surcharges: {}", money(totals.surcharges));
    }
    println!("  total: {}", money(totals.total()));
}

fn print_editor(view: &CartView<ApiClient>) {
    let Some(editor) = view.editor() else {
        return;
    };
    println!("line #{} {}", editor.line_id(), editor.line.food.name);
    if editor.details().is_empty() {
        println!("  no detail slots");
    }
    for detail in editor.details() {
        let taste = detail.taste.as_ref().map(|t| t.name.as_str()).unwrap_or("-");
        let size = detail
            .food_size
            .as_ref()
            .map(|s| format!("{} (+{})", s.name, money(s.money_added)))
            .unwrap_or_else(|| "-".into());
        println!("  detail #{:<5} taste: {:<12} size: {size}", detail.id, taste);
    }
    if !editor.tastes.is_empty() {
        let offered: Vec<String> = editor
            .tastes
            .iter()
            .map(|t| format!("{}={}", t.id, t.name))
            .collect();
        println!("  tastes: {}", offered.join(", "));
    }
    if !editor.sizes.is_empty() {
        let offered: Vec<String> = editor
            .sizes
            .iter()
            .map(|s| format!("{}={} (+{})", s.id, s.name, money(s.money_added)))
            .collect();
        println!("  sizes: {}", offered.join(", "));
    }
    println!("  cart total: {}", money(view.total()));
}
