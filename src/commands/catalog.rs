use std::path::PathBuf;

use clap::{Args, Subcommand};

use super::{money, read_upload, Context};
use crate::catalog::{self, FoodDraft, FoodPage, FoodSizeDraft, FoodTypeDraft, TasteDraft};
use crate::models::{Food, FoodKind};

#[derive(Debug, Args)]
pub struct FoodArgs {
    #[command(subcommand)]
    pub command: FoodCmds,
}

#[derive(Debug, Subcommand)]
pub enum FoodCmds {
    /// List foods, optionally only food or drink
    List {
        #[arg(long, value_parser = parse_kind)]
        kind: Option<FoodKind>,
    },
    /// One page of foods
    Page {
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = catalog::DEFAULT_PAGE_SIZE)]
        limit: u32,
    },
    /// Create a food, or update it when --id is given
    Save {
        #[arg(long, default_value_t = 0)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        price: f64,
        #[arg(long, value_parser = parse_kind, default_value = "food")]
        kind: FoodKind,
        #[arg(long)]
        food_type_id: i64,
        #[arg(long, default_value = "")]
        remark: String,
        /// Stored image file name to keep
        #[arg(long, default_value = "")]
        img: String,
        /// Upload this picture and use it as the image
        #[arg(long, value_name = "PATH", conflicts_with = "img")]
        image_file: Option<PathBuf>,
    },
    /// Delete a food
    Delete { id: i64 },
    /// Delete a food from a listing page and show the page to continue on
    PageDelete {
        id: i64,
        #[arg(long, default_value_t = 1)]
        page: u32,
        #[arg(long, default_value_t = catalog::DEFAULT_PAGE_SIZE)]
        limit: u32,
    },
    /// Upload a food picture and print its stored name
    UploadImage { path: PathBuf },
    /// List food types
    Types,
    /// Create or update a food type
    SaveType {
        #[arg(long, default_value_t = 0)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long, default_value = "")]
        remark: String,
    },
    /// Delete a food type
    DeleteType { id: i64 },
    /// List sizes with their surcharge
    Sizes,
    /// Create or update a size
    SaveSize {
        #[arg(long, default_value_t = 0)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        food_type_id: i64,
        #[arg(long, default_value_t = 0.0)]
        money_added: f64,
        #[arg(long, default_value = "")]
        remark: String,
    },
    /// Delete a size
    DeleteSize { id: i64 },
    /// List tastes
    Tastes,
    /// Create or update a taste
    SaveTaste {
        #[arg(long, default_value_t = 0)]
        id: i64,
        #[arg(long)]
        name: String,
        #[arg(long)]
        food_type_id: i64,
        #[arg(long, default_value = "")]
        remark: String,
    },
    /// Delete a taste
    DeleteTaste { id: i64 },
}

fn parse_kind(raw: &str) -> Result<FoodKind, String> {
    raw.parse()
}

fn print_page(page: &FoodPage) {
    print_foods(&page.foods);
    println!(
        "page {}/{} ({} items)",
        page.page, page.total_pages, page.total_items
    );
}

fn print_foods(foods: &[Food]) {
    if foods.is_empty() {
        println!("(no foods)");
    }
    for food in foods {
        println!(
            "#{:<5} {:<24} {:>10}  {}",
            food.id,
            food.name,
            money(food.price),
            food.food_type
        );
    }
}

pub async fn run(ctx: &Context, args: FoodArgs) -> anyhow::Result<()> {
    let api = &ctx.api;
    match args.command {
        FoodCmds::List { kind } => {
            let foods = match kind {
                Some(kind) => catalog::filter_foods(api, kind).await?,
                None => catalog::list_foods(api).await?,
            };
            print_foods(&foods);
        }
        FoodCmds::Page { page, limit } => {
            print_page(&catalog::paginate_foods(api, page, limit).await?);
        }
        FoodCmds::Save {
            id,
            name,
            price,
            kind,
            food_type_id,
            remark,
            img,
            image_file,
        } => {
            let img = match image_file {
                Some(path) => {
                    let (file_name, bytes) = read_upload(&path).await?;
                    catalog::upload_food_image(api, &file_name, bytes).await?
                }
                None => img,
            };
            catalog::save_food(
                api,
                FoodDraft {
                    id,
                    name,
                    remark,
                    price,
                    img,
                    food_type: kind,
                    food_type_id,
                },
            )
            .await?;
            println!("food saved");
        }
        FoodCmds::Delete { id } => {
            catalog::delete_food(api, id).await?;
            println!("food #{id} deleted");
        }
        FoodCmds::PageDelete { id, page, limit } => {
            let current = catalog::paginate_foods(api, page, limit).await?;
            let next = catalog::delete_food_on_page(api, id, &current).await?;
            println!("food #{id} deleted");
            print_page(&next);
        }
        FoodCmds::UploadImage { path } => {
            let (file_name, bytes) = read_upload(&path).await?;
            let stored = catalog::upload_food_image(api, &file_name, bytes).await?;
            println!("{stored}");
        }
        FoodCmds::Types => {
            for t in catalog::list_food_types(api).await? {
                println!("#{:<5} {:<24} {}", t.id, t.name, t.remark);
            }
        }
        FoodCmds::SaveType { id, name, remark } => {
            catalog::save_food_type(api, FoodTypeDraft { id, name, remark }).await?;
            println!("food type saved");
        }
        FoodCmds::DeleteType { id } => {
            catalog::delete_food_type(api, id).await?;
            println!("food type #{id} deleted");
        }
        FoodCmds::Sizes => {
            for s in catalog::list_food_sizes(api).await? {
                println!(
                    "#{:<5} {:<16} +{:<10} type #{}",
                    s.id,
                    s.name,
                    money(s.money_added),
                    s.food_type_id
                );
            }
        }
        FoodCmds::SaveSize {
            id,
            name,
            food_type_id,
            money_added,
            remark,
        } => {
            catalog::save_food_size(
                api,
                FoodSizeDraft {
                    id,
                    name,
                    remark,
                    food_type_id,
                    money_added,
                },
            )
            .await?;
            println!("size saved");
        }
        FoodCmds::DeleteSize { id } => {
            catalog::delete_food_size(api, id).await?;
            println!("size #{id} deleted");
        }
        FoodCmds::Tastes => {
            for t in catalog::list_tastes(api).await? {
                println!("#{:<5} {:<16} type #{}", t.id, t.name, t.food_type_id);
            }
        }
        FoodCmds::SaveTaste {
            id,
            name,
            food_type_id,
            remark,
        } => {
            catalog::save_taste(
                api,
                TasteDraft {
                    id,
                    name,
                    remark,
                    food_type_id,
                },
            )
            .await?;
            println!("taste saved");
        }
        FoodCmds::DeleteTaste { id } => {
            catalog::delete_taste(api, id).await?;
            println!("taste #{id} deleted");
        }
    }
    Ok(())
}
