//! OpenSuite CLI
//!
//! Demo interface over the in-process platform facade.
//!
//! # Usage
//!
//! ```bash
//! opensuite demo
//! opensuite demo --user bob --context study
//! opensuite suites
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use colored::Colorize;
use rand::rngs::OsRng;
use rand::RngCore;
use std::collections::HashMap;
use std::sync::Arc;
use suite_common::{CryptoConfig, Environment, PlatformConfig, Request, SuiteType};
use suite_platform::{
    Credential, LocalUserStore, Platform, RecommendationHandler, RECOMMENDATION_TYPE,
};

#[derive(Parser)]
#[command(name = "opensuite")]
#[command(version = "0.1.0")]
#[command(about = "OpenSuite platform demo CLI", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full session lifecycle against an in-process platform
    Demo {
        /// Demo user to authenticate as
        #[arg(long, default_value = "alice")]
        user: String,
        /// Recommendation context
        #[arg(long, default_value = "work")]
        context: String,
        /// Maximum recommendations to request
        #[arg(long, default_value_t = 5)]
        limit: u64,
    },
    /// List suite tiers and their features
    Suites,
}

/// Demo-only configuration: secrets are generated per process and never
/// leave it.
fn demo_config() -> PlatformConfig {
    let mut jwt_secret = [0u8; 32];
    OsRng.fill_bytes(&mut jwt_secret);
    let mut encryption_key = vec![0u8; 32];
    OsRng.fill_bytes(&mut encryption_key);

    PlatformConfig {
        environment: Environment::Development,
        crypto: CryptoConfig {
            jwt_secret: hex_string(&jwt_secret),
            encryption_key,
            ..CryptoConfig::default()
        },
        ..PlatformConfig::default()
    }
}

fn hex_string(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

const DEMO_PASSWORD: &str = "demo-password";

fn demo_platform() -> anyhow::Result<Platform> {
    let users = LocalUserStore::new(None);
    users
        .add_user("alice", DEMO_PASSWORD, SuiteType::Enterprise, HashMap::new())
        .context("seeding alice")?;
    users
        .add_user("bob", DEMO_PASSWORD, SuiteType::Student, HashMap::new())
        .context("seeding bob")?;

    let platform = Platform::new(demo_config(), Arc::new(users)).context("platform startup")?;

    let profiles = platform.profiles();
    let mut demographics = HashMap::new();
    demographics.insert("industry".to_string(), "technology".to_string());
    profiles.create("alice", SuiteType::Enterprise, demographics, HashMap::new());
    profiles.create("bob", SuiteType::Student, HashMap::new(), HashMap::new());

    let handler = RecommendationHandler::new(platform.profiles(), platform.cache());
    platform
        .register_handler(RECOMMENDATION_TYPE, Arc::new(handler))
        .context("registering recommendation handler")?;
    Ok(platform)
}

fn step(label: &str) {
    println!("{} {}", "==>".cyan().bold(), label.bold());
}

async fn run_demo(user: &str, context: &str, limit: u64) -> anyhow::Result<()> {
    let platform = demo_platform()?;

    step(&format!("create_session as {user}"));
    let credential = Credential::Password {
        username: user.to_string(),
        password: DEMO_PASSWORD.to_string(),
    };
    let token = platform.create_session(user, &credential).await?;
    println!("    token: {}", token.green());

    step(&format!("process_request type=recommendation context={context}"));
    let request: Request = serde_json::from_value(serde_json::json!({
        "type": RECOMMENDATION_TYPE,
        "parameters": { "context": context, "limit": limit },
    }))
    .context("building request")?;
    let result = platform.process_request(&token, &request).await?;
    println!("{}", serde_json::to_string_pretty(&result)?);

    step("refresh_session");
    let rotated = platform.refresh_session(&token)?;
    println!("    new token: {}", rotated.green());
    match platform.process_request(&token, &request).await {
        Err(err) => println!("    old token now: {}", err.to_string().yellow()),
        Ok(_) => anyhow::bail!("old token unexpectedly still valid"),
    }

    step("revoke_session (logout)");
    platform.revoke_session(&rotated)?;
    match platform.process_request(&rotated, &request).await {
        Err(err) => println!("    after logout: {}", err.to_string().yellow()),
        Ok(_) => anyhow::bail!("revoked token unexpectedly still valid"),
    }

    let stats = platform.session_stats();
    println!(
        "\n{} total={} active={} revoked={}",
        "session table:".bold(),
        stats.total,
        stats.active,
        stats.revoked
    );
    Ok(())
}

fn list_suites() {
    let tiers = [
        SuiteType::Enterprise,
        SuiteType::Business,
        SuiteType::Professional,
        SuiteType::Tech,
        SuiteType::Education,
        SuiteType::Student,
        SuiteType::Personal,
        SuiteType::Lifestyle,
    ];
    for tier in tiers {
        println!(
            "{:<14} max_recommendations={}",
            format!("{tier:?}").bold(),
            tier.max_recommendations()
        );
        for feature in tier.features() {
            println!("    - {feature}");
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match cli.command {
        Commands::Demo {
            user,
            context,
            limit,
        } => run_demo(&user, &context, limit).await,
        Commands::Suites => {
            list_suites();
            Ok(())
        }
    }
}
