//! QPrint CLI - Command-line client for the QPrint print-shop API

mod client;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use serde::Deserialize;
use serde_json::json;
use std::path::PathBuf;
use tabled::{Table, Tabled};

use crate::client::{ApiClient, UploadForm};

const DEFAULT_SERVER_URL: &str = "http://127.0.0.1:8080";

#[derive(Parser)]
#[command(name = "qprint")]
#[command(about = "QPrint - print without standing in queue", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Server base URL
    #[arg(long, env = "QPRINT_SERVER", default_value = DEFAULT_SERVER_URL)]
    server: String,

    /// Bearer token from `qprint login`
    #[arg(long, env = "QPRINT_TOKEN", hide_env_values = true)]
    token: Option<String>,
}

#[derive(Clone, Copy, ValueEnum)]
enum RoleArg {
    Customer,
    Shopkeeper,
}

#[derive(Subcommand)]
enum Commands {
    /// Create an account
    Register {
        username: String,
        #[arg(long)]
        password: String,
        #[arg(long, value_enum, default_value = "customer")]
        role: RoleArg,
        #[arg(long, requires = "long", allow_hyphen_values = true)]
        lat: Option<f64>,
        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        long: Option<f64>,
        #[arg(long)]
        address: Option<String>,
    },

    /// Log in and print a bearer token
    Login {
        username: String,
        #[arg(long)]
        password: String,
    },

    /// Upload a document (customer)
    Upload {
        file: PathBuf,

        /// Join a shop's queue instead of printing privately
        #[arg(long, requires = "shop_id")]
        queue: bool,

        #[arg(long)]
        shop_id: Option<i64>,

        #[arg(long, default_value_t = 1)]
        copies: u32,

        /// single or double
        #[arg(long, default_value = "single")]
        print_mode: String,

        /// bw or color
        #[arg(long, default_value = "bw")]
        color_mode: String,

        #[arg(long, default_value = "A4")]
        paper_size: String,
    },

    /// Show the status of a redemption code
    Status { code: String },

    /// Nearest shops (customer)
    Shops,

    /// Your uploads (customer)
    MyFiles,

    /// Your shop's queue (shopkeeper)
    Queue,

    /// Redeem a private code and save the document (shopkeeper)
    Redeem {
        code: String,
        #[arg(short, long)]
        output: PathBuf,
    },

    /// Confirm a private job as printed (shopkeeper)
    ConfirmCode { code: String },

    /// Confirm a queued job as printed (shopkeeper)
    ConfirmJob { id: i64 },

    /// Jobs your shop has confirmed (shopkeeper)
    History,

    /// Update your coordinates
    SetLocation {
        #[arg(long, allow_hyphen_values = true)]
        lat: f64,
        #[arg(long, allow_hyphen_values = true)]
        long: f64,
        #[arg(long)]
        address: Option<String>,
    },
}

#[derive(Deserialize)]
struct RegisterResult {
    user_id: i64,
}

#[derive(Deserialize)]
struct LoginResult {
    token: String,
    role: String,
    username: String,
}

#[derive(Deserialize, Tabled)]
struct UploadResult {
    id: i64,
    code: String,
    print_type: String,
    num_pages: u32,
    total_cost: f64,
    #[tabled(display_with = "display_position")]
    queue_position: Option<i64>,
}

#[derive(Deserialize)]
struct StatusResult {
    code: String,
    status: String,
    print_type: String,
    queue_position: Option<i64>,
}

#[derive(Deserialize, Tabled)]
struct ShopRow {
    id: i64,
    name: String,
    #[tabled(display_with = "display_text")]
    address: Option<String>,
    lat: f64,
    long: f64,
    #[tabled(display_with = "display_km")]
    distance_km: f64,
}

#[derive(Deserialize)]
struct ShopSummary {
    name: String,
}

#[derive(Deserialize)]
struct MyFile {
    id: i64,
    code: String,
    print_type: String,
    status: String,
    num_pages: u32,
    copies: u32,
    total_cost: f64,
    created_at: String,
    shop: Option<ShopSummary>,
    queue_position: Option<i64>,
}

#[derive(Tabled)]
struct MyFileRow {
    id: i64,
    code: String,
    #[tabled(rename = "type")]
    print_type: String,
    status: String,
    pages: u32,
    copies: u32,
    cost: f64,
    shop: String,
    position: String,
    created: String,
}

impl From<MyFile> for MyFileRow {
    fn from(file: MyFile) -> Self {
        Self {
            id: file.id,
            code: file.code,
            print_type: file.print_type,
            status: colored_status(&file.status),
            pages: file.num_pages,
            copies: file.copies,
            cost: file.total_cost,
            shop: file.shop.map(|s| s.name).unwrap_or_else(|| "-".to_string()),
            position: display_position(&file.queue_position),
            created: file.created_at,
        }
    }
}

#[derive(Deserialize, Tabled)]
struct QueueRow {
    #[tabled(rename = "#")]
    queue_position: i64,
    id: i64,
    customer_name: String,
    filename: String,
    num_pages: u32,
    copies: u32,
    print_mode: String,
    color_mode: String,
    paper_size: String,
    total_cost: f64,
    created_at: String,
}

#[derive(Deserialize, Tabled)]
struct HistoryRow {
    id: i64,
    date: String,
    code: String,
    #[serde(rename = "type")]
    #[tabled(rename = "type")]
    kind: String,
    pages: u32,
    copies: u32,
    cost: f64,
}

#[derive(Deserialize)]
struct ConfirmResult {
    id: i64,
    code: String,
    status: String,
}

#[derive(Deserialize)]
struct LocationResult {
    lat: f64,
    long: f64,
}

fn display_position(position: &Option<i64>) -> String {
    position.map_or_else(|| "-".to_string(), |p| p.to_string())
}

fn display_text(text: &Option<String>) -> String {
    text.clone().unwrap_or_else(|| "-".to_string())
}

fn display_km(km: &f64) -> String {
    format!("{:.2} km", km)
}

fn colored_status(status: &str) -> String {
    match status {
        "uploaded" => status.yellow().to_string(),
        "downloaded" => status.green().to_string(),
        other => other.to_string(),
    }
}

fn print_table<T: Tabled>(rows: Vec<T>, empty: &str) {
    if rows.is_empty() {
        println!("{}", empty.yellow());
    } else {
        println!("{}", Table::new(rows));
    }
}

fn role_name(role: RoleArg) -> &'static str {
    match role {
        RoleArg::Customer => "customer",
        RoleArg::Shopkeeper => "shopkeeper",
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let api = ApiClient::new(&cli.server, cli.token);

    match cli.command {
        Commands::Register {
            username,
            password,
            role,
            lat,
            long,
            address,
        } => {
            let body = json!({
                "username": username,
                "password": password,
                "role": role_name(role),
                "lat": lat,
                "long": long,
                "address": address,
            });
            let result: RegisterResult = api.post_public("/register", &body).await?;
            println!(
                "{}",
                format!("✓ Registered {} (user id {})", username, result.user_id)
                    .green()
                    .bold()
            );
        }

        Commands::Login { username, password } => {
            let body = json!({ "username": username, "password": password });
            let result: LoginResult = api.post_public("/login", &body).await?;
            eprintln!(
                "{}",
                format!("✓ Logged in as {} ({})", result.username, result.role)
                    .green()
                    .bold()
            );
            println!("{}", result.token);
        }

        Commands::Upload {
            file,
            queue,
            shop_id,
            copies,
            print_mode,
            color_mode,
            paper_size,
        } => {
            let data = tokio::fs::read(&file)
                .await
                .with_context(|| format!("Failed to read {}", file.display()))?;
            let file_name = file
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_default();

            let form = UploadForm {
                file_name,
                data,
                print_type: if queue { "queue" } else { "private" },
                shop_id: if queue { shop_id } else { None },
                copies,
                print_mode,
                color_mode,
                paper_size,
            };
            let result: UploadResult = api.upload(form).await?;

            println!("{}", "✓ Document uploaded".green().bold());
            println!();
            println!(
                "  {} {}",
                "Redemption code:".bold(),
                result.code.cyan().bold()
            );
            println!();
            println!("{}", Table::new(vec![result]));
        }

        Commands::Status { code } => {
            let result: StatusResult = api.get_public(&format!("/file/{}/status", code)).await?;
            println!("  {} {}", "Code:".bold(), result.code);
            println!("  {} {}", "Type:".bold(), result.print_type);
            println!("  {} {}", "Status:".bold(), colored_status(&result.status));
            if let Some(position) = result.queue_position {
                println!("  {} {}", "Queue position:".bold(), position);
            }
        }

        Commands::Shops => {
            let rows: Vec<ShopRow> = api.get("/shops").await?;
            print_table(rows, "No shops with a known location");
        }

        Commands::MyFiles => {
            let files: Vec<MyFile> = api.get("/my-files").await?;
            print_table(
                files.into_iter().map(MyFileRow::from).collect(),
                "No uploads yet",
            );
        }

        Commands::Queue => {
            let rows: Vec<QueueRow> = api.get("/queue").await?;
            print_table(rows, "Queue is empty");
        }

        Commands::Redeem { code, output } => {
            let data = api.download(&format!("/file/{}", code)).await?;
            tokio::fs::write(&output, &data)
                .await
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!(
                "{}",
                format!("✓ Saved {} bytes to {}", data.len(), output.display())
                    .green()
                    .bold()
            );
            println!("  Run `qprint confirm-code {}` once printed", code);
        }

        Commands::ConfirmCode { code } => {
            let result: ConfirmResult = api.post(&format!("/file/{}/confirm", code)).await?;
            println!(
                "{}",
                format!("✓ Job {} ({}) confirmed", result.id, result.code)
                    .green()
                    .bold()
            );
            println!("  {} {}", "Status:".bold(), colored_status(&result.status));
        }

        Commands::ConfirmJob { id } => {
            let result: ConfirmResult = api.post(&format!("/queue/{}/confirm", id)).await?;
            println!(
                "{}",
                format!("✓ Queued job {} ({}) confirmed", result.id, result.code)
                    .green()
                    .bold()
            );
            println!("  {} {}", "Status:".bold(), colored_status(&result.status));
        }

        Commands::History => {
            let rows: Vec<HistoryRow> = api.get("/shop-history").await?;
            print_table(rows, "No confirmed jobs yet");
        }

        Commands::SetLocation { lat, long, address } => {
            let body = json!({ "lat": lat, "long": long, "address": address });
            let result: LocationResult = api.put("/location", &body).await?;
            println!(
                "{}",
                format!("✓ Location set to ({}, {})", result.lat, result.long)
                    .green()
                    .bold()
            );
        }
    }

    Ok(())
}
