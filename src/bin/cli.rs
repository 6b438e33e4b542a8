use clap::{Parser, Subcommand};
use dialoguer::{Input, Password};
use dotenvy::dotenv;

use seitech_cache::CacheConfig;
use seitech_cli::{check_odoo, flush_cms_cache, hash_password, issue_token};
use seitech_config::{OdooConfig, SessionConfig};

#[derive(Parser)]
#[command(name = "seitech-cli")]
#[command(about = "SEI Tech CLI - Operator tools for the SEI Tech gateway", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Check the ERP is reachable and log in with the service account
    CheckOdoo {
        /// Override ODOO_URL
        #[arg(short = 'u', long)]
        url: Option<String>,
    },
    /// Hash a password for a demo account
    HashPassword {
        /// Password (will be prompted securely if not provided)
        #[arg(short = 'p', long)]
        password: Option<String>,

        /// bcrypt cost
        #[arg(long, default_value = "12")]
        cost: u32,
    },
    /// Sign a demo session token for local testing
    IssueToken {
        /// Email address
        #[arg(short = 'e', long)]
        email: Option<String>,

        /// Role: student, student_admin, instructor, manager or admin
        #[arg(short = 'r', long, default_value = "student")]
        role: String,
    },
    /// Drop cached CMS payloads from Redis
    FlushCache,
}

#[tokio::main]
async fn main() {
    dotenv().ok();

    let cli = Cli::parse();

    match cli.command {
        Commands::CheckOdoo { url } => handle_check_odoo(url).await,
        Commands::HashPassword { password, cost } => handle_hash_password(password, cost),
        Commands::IssueToken { email, role } => handle_issue_token(email, &role),
        Commands::FlushCache => handle_flush_cache().await,
    }
}

fn fail(message: &str, e: impl std::fmt::Display) -> ! {
    eprintln!("\n❌ {message}: {e}");
    std::process::exit(1);
}

async fn handle_check_odoo(url: Option<String>) {
    let mut config = OdooConfig::from_env();
    if let Some(url) = url {
        config.url = url;
    }

    match check_odoo(config).await {
        Ok(report) => {
            let status = if report.reachable && report.service_login { "✅" } else { "⚠️" };
            println!("\n{status} ERP at {} ({})", report.url, report.database);
            println!("   Reachable: {}", report.reachable);
            println!("   Service login: {}", report.service_login);
            if let Some(count) = report.published_courses {
                println!("   Published courses: {count}");
            }
            if !report.reachable {
                std::process::exit(1);
            }
        }
        Err(e) => fail("Error checking ERP", e),
    }
}

fn handle_hash_password(password: Option<String>, cost: u32) {
    let password = match password {
        Some(password) => password,
        None => Password::new()
            .with_prompt("Password")
            .with_confirmation("Confirm password", "Passwords don't match")
            .interact()
            .unwrap_or_else(|e| fail("Failed to read password", e)),
    };

    match hash_password(&password, cost) {
        Ok(hash) => println!("{hash}"),
        Err(e) => fail("Error hashing password", e),
    }
}

fn handle_issue_token(email: Option<String>, role: &str) {
    let email = match email {
        Some(email) => email,
        None => Input::new()
            .with_prompt("Email address")
            .interact_text()
            .unwrap_or_else(|e| fail("Failed to read email", e)),
    };

    match issue_token(&email, role, &SessionConfig::from_env()) {
        Ok(token) => println!("{token}"),
        Err(e) => fail("Error issuing token", e),
    }
}

async fn handle_flush_cache() {
    match flush_cms_cache(&CacheConfig::from_env()).await {
        Ok(Some(deleted)) => println!("\n✅ Removed {deleted} cached CMS entries"),
        Ok(None) => println!("\n⚠️ Redis is not configured; nothing to flush"),
        Err(e) => fail("Error flushing cache", e),
    }
}
