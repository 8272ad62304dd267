use anyhow::{bail, Context, Result};
use catalog_search_sync::catalog::sample_products;
use clap::{Parser, Subcommand};
use reqwest::{Client, Response};
use serde_json::{json, Value};

#[derive(Parser)]
#[command(name = "catalog-cli")]
#[command(about = "Catalog search sync CLI", long_about = None)]
struct Cli {
    #[arg(short, long, env = "CATALOG_ENDPOINT", default_value = "http://localhost:4000")]
    endpoint: String,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check server, store and search engine health
    Health,

    /// Get a product
    Get {
        #[arg(value_name = "PRODUCT_ID")]
        id: i64,
    },

    /// List products, newest first
    List {
        #[arg(short, long, default_value = "1")]
        page: u64,

        #[arg(short, long, default_value = "10")]
        limit: u64,
    },

    /// Create a product
    Create {
        #[arg(short, long)]
        name: String,

        #[arg(short, long)]
        brand: String,

        #[arg(short, long)]
        category: String,

        #[arg(short, long)]
        price: f64,

        #[arg(short, long)]
        description: Option<String>,

        #[arg(short, long)]
        rating: Option<f64>,

        /// Mark the product as out of stock
        #[arg(long)]
        out_of_stock: bool,
    },

    /// Delete a product
    Delete {
        #[arg(value_name = "PRODUCT_ID")]
        id: i64,
    },

    /// Search products
    Search {
        /// Free text
        #[arg(short, long)]
        q: Option<String>,

        #[arg(long)]
        brand: Option<String>,

        #[arg(long)]
        category: Option<String>,

        #[arg(long)]
        min_price: Option<f64>,

        #[arg(long)]
        max_price: Option<f64>,

        #[arg(long)]
        in_stock: Option<bool>,

        /// relevance, price_asc, price_desc or newest
        #[arg(short, long)]
        sort: Option<String>,

        #[arg(short, long)]
        page: Option<u64>,

        #[arg(short, long)]
        limit: Option<u64>,
    },

    /// Rebuild the search index from the catalog store
    Reindex,

    /// Create the sample catalog through the API
    Seed,
}

async fn print_body(response: Response) -> Result<Value> {
    let status = response.status();
    let body: Value = response
        .json()
        .await
        .with_context(|| format!("Server answered {} without a JSON body", status))?;
    println!("{}", serde_json::to_string_pretty(&body)?);
    Ok(body)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let client = Client::new();
    let endpoint = cli.endpoint.trim_end_matches('/');

    match cli.command {
        Commands::Health => {
            let response = client
                .get(format!("{}/api/health", endpoint))
                .send()
                .await?;
            print_body(response).await?;
        }

        Commands::Get { id } => {
            let response = client
                .get(format!("{}/api/products/{}", endpoint, id))
                .send()
                .await?;
            print_body(response).await?;
        }

        Commands::List { page, limit } => {
            let response = client
                .get(format!("{}/api/products", endpoint))
                .query(&[("page", page), ("limit", limit)])
                .send()
                .await?;
            print_body(response).await?;
        }

        Commands::Create {
            name,
            brand,
            category,
            price,
            description,
            rating,
            out_of_stock,
        } => {
            let response = client
                .post(format!("{}/api/products", endpoint))
                .json(&json!({
                    "name": name,
                    "brand": brand,
                    "category": category,
                    "price": price,
                    "description": description,
                    "rating": rating,
                    "inStock": !out_of_stock,
                }))
                .send()
                .await?;
            print_body(response).await?;
        }

        Commands::Delete { id } => {
            let response = client
                .delete(format!("{}/api/products/{}", endpoint, id))
                .send()
                .await?;
            print_body(response).await?;
        }

        Commands::Search {
            q,
            brand,
            category,
            min_price,
            max_price,
            in_stock,
            sort,
            page,
            limit,
        } => {
            let mut params: Vec<(&str, String)> = Vec::new();
            let optional = [
                ("q", q),
                ("brand", brand),
                ("category", category),
                ("minPrice", min_price.map(|v| v.to_string())),
                ("maxPrice", max_price.map(|v| v.to_string())),
                ("inStock", in_stock.map(|v| v.to_string())),
                ("sort", sort),
                ("page", page.map(|v| v.to_string())),
                ("limit", limit.map(|v| v.to_string())),
            ];
            for (key, value) in optional {
                if let Some(value) = value {
                    params.push((key, value));
                }
            }

            let response = client
                .get(format!("{}/api/search/products", endpoint))
                .query(&params)
                .send()
                .await?;
            print_body(response).await?;
        }

        Commands::Reindex => {
            let response = client
                .post(format!("{}/api/search/reindex", endpoint))
                .send()
                .await?;
            let body = print_body(response).await?;
            if body["success"] != json!(true) {
                bail!("Reindex reported a mismatch between the catalog store and the index");
            }
        }

        Commands::Seed => {
            let products = sample_products();
            let total = products.len();
            let mut warnings = 0;

            for product in products {
                let response = client
                    .post(format!("{}/api/products", endpoint))
                    .json(&product)
                    .send()
                    .await?;

                let status = response.status();
                let body: Value = response.json().await?;
                if !status.is_success() {
                    bail!("Failed to create '{}': {} {}", product.name, status, body["message"]);
                }
                if !body["warning"].is_null() {
                    warnings += 1;
                }
                println!("Created #{} {}", body["data"]["id"], product.name);
            }

            println!("Seeded {} products ({} without search indexing)", total, warnings);
            if warnings > 0 {
                println!("Run `catalog-cli reindex` to repair the search index");
            }
        }
    }

    Ok(())
}
