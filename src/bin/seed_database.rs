#!/usr/bin/env cargo
//! Zebrafish Facility Seeder
//!
//! Registers every rack position of the facility as an empty tank through the
//! API, skipping labels that already exist, and optionally places a few demo
//! strains into free tanks.
//!
//! Usage:
//!   `cargo run --bin seed_database -- --url http://localhost:3000 --token YOUR_JWT_TOKEN`

use clap::{Arg, ArgAction, Command};
use console::style;
use futures::future::join_all;
use indicatif::{ProgressBar, ProgressStyle};
use reqwest::Client;
use serde_json::{Value, json};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::time::Duration;

const RACKS: usize = 6;
const ROWS: [&str; 6] = ["A", "B", "C", "D", "E", "F"];
const COLUMNS: u32 = 10;
const MAX_CONCURRENT: usize = 8;

type SeedResult<T> = Result<T, Box<dyn std::error::Error>>;

#[derive(Debug, Clone)]
pub struct SeedingConfig {
    pub base_url: String,
    pub jwt_token: String,
    pub client: Client,
}

/// Every `{RACK}-{ROW}-{COL}` label of the default facility layout
fn facility_labels() -> Vec<String> {
    (1..=RACKS)
        .flat_map(|rack| {
            ROWS.iter().flat_map(move |row| {
                (1..=COLUMNS).map(move |column| format!("ARF{rack}-{row}-{column}"))
            })
        })
        .collect()
}

fn demo_strains() -> Vec<Value> {
    vec![
        json!({
            "name": "AB wild type",
            "genotype": "+/+",
            "strain_id_number": "ZF-0001",
            "notes": "Reference background line"
        }),
        json!({
            "name": "casper",
            "genotype": "mitfa(w2/w2); mpv17(a9/a9)",
            "strain_id_number": "ZF-0002",
            "notes": "Transparent adults for imaging"
        }),
        json!({
            "name": "Tg(fli1:EGFP)",
            "genotype": "Tg(fli1:EGFP)y1",
            "strain_id_number": "ZF-0003"
        }),
    ]
}

fn progress_bar(len: usize) -> ProgressBar {
    let pb = ProgressBar::new(len as u64);
    if let Ok(bar_style) = ProgressStyle::default_bar()
        .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos:>7}/{len:7} {msg}")
    {
        pb.set_style(bar_style.progress_chars("##-"));
    }
    pb
}

pub struct FacilitySeeder {
    config: SeedingConfig,
}

impl FacilitySeeder {
    pub fn new(base_url: &str, jwt_token: String) -> SeedResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;

        Ok(Self {
            config: SeedingConfig {
                base_url: base_url.trim_end_matches('/').to_string(),
                jwt_token,
                client,
            },
        })
    }

    async fn get(config: &SeedingConfig, endpoint: &str) -> Result<Value, String> {
        let url = format!("{}{endpoint}", config.base_url);
        let response = config
            .client
            .get(&url)
            .header("authorization", format!("Bearer {}", config.jwt_token))
            .send()
            .await
            .map_err(|e| format!("Request error {endpoint}: {e}"))?;
        Self::read_json(response, endpoint).await
    }

    async fn post(config: &SeedingConfig, endpoint: &str, body: Value) -> Result<Value, String> {
        let url = format!("{}{endpoint}", config.base_url);
        let response = config
            .client
            .post(&url)
            .header("authorization", format!("Bearer {}", config.jwt_token))
            .json(&body)
            .send()
            .await
            .map_err(|e| format!("Request error {endpoint}: {e}"))?;
        Self::read_json(response, endpoint).await
    }

    async fn read_json(response: reqwest::Response, endpoint: &str) -> Result<Value, String> {
        if response.status().is_success() {
            response
                .json::<Value>()
                .await
                .map_err(|e| format!("JSON parse error: {e}"))
        } else {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            Err(format!("HTTP {status} {endpoint}: {error_text}"))
        }
    }

    async fn existing_labels(&self) -> Result<HashSet<String>, String> {
        let tanks = Self::get(&self.config, "/api/tanks").await?;
        Ok(tanks
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|tank| tank["tank_id"].as_str().map(String::from))
            .collect())
    }

    /// Create the missing rack positions, a bounded number at a time
    pub async fn create_tanks(&self) -> SeedResult<usize> {
        println!("{} Registering rack positions...", style("[1/2]").bold().dim());

        let existing = self.existing_labels().await?;
        let missing: Vec<String> = facility_labels()
            .into_iter()
            .filter(|label| !existing.contains(label))
            .collect();

        if missing.is_empty() {
            println!("{} All rack positions already exist", style("✅").green());
            return Ok(0);
        }

        let pb = progress_bar(missing.len());
        let semaphore = Arc::new(Semaphore::new(MAX_CONCURRENT));
        let tasks = missing.into_iter().map(|label| {
            let semaphore = Arc::clone(&semaphore);
            let config = self.config.clone();
            let pb = pb.clone();
            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire()
                    .await
                    .map_err(|e| format!("Semaphore closed: {e}"))?;
                let result = Self::post(&config, "/api/tanks", json!({ "tank_id": label })).await;
                pb.inc(1);
                result
            })
        });

        let mut created = 0;
        let mut failures = Vec::new();
        for outcome in join_all(tasks).await {
            match outcome {
                Ok(Ok(_)) => created += 1,
                Ok(Err(e)) => failures.push(e),
                Err(e) => failures.push(format!("Task join error: {e}")),
            }
        }
        pb.finish_with_message("Tanks registered!");

        for failure in &failures {
            println!("{} {failure}", style("⚠️").yellow());
        }
        println!("{} Created {created} tanks", style("✅").green());
        Ok(created)
    }

    /// Create demo strains, each assigned to the next free tank
    pub async fn create_demo_strains(&self) -> SeedResult<usize> {
        println!("{} Creating demo strains...", style("[2/2]").bold().dim());

        let available = Self::get(&self.config, "/api/tanks/available").await?;
        let free_tanks: Vec<String> = available
            .as_array()
            .into_iter()
            .flatten()
            .filter_map(|tank| tank["id"].as_str().map(String::from))
            .collect();

        let strains = demo_strains();
        let pb = progress_bar(strains.len());
        let mut created = 0;
        for (index, mut strain) in strains.into_iter().enumerate() {
            pb.set_message(format!("Creating: {}", strain["name"].as_str().unwrap_or_default()));
            if let Some(tank) = free_tanks.get(index) {
                strain["assign_to_tank"] = json!(tank);
            }
            match Self::post(&self.config, "/api/strains", strain).await {
                Ok(_) => created += 1,
                Err(e) => println!("{} {e}", style("⚠️").yellow()),
            }
            pb.inc(1);
        }
        pb.finish_with_message("Strains created!");

        println!("{} Created {created} strains", style("✅").green());
        Ok(created)
    }
}

#[tokio::main]
async fn main() -> SeedResult<()> {
    let matches = Command::new("Zebrafish Facility Seeder")
        .version("1.0")
        .about("Registers the facility's rack positions as tanks and adds demo strains")
        .arg(
            Arg::new("url")
                .short('u')
                .long("url")
                .value_name("URL")
                .help("API base URL")
                .default_value("http://localhost:3000"),
        )
        .arg(
            Arg::new("token")
                .short('t')
                .long("token")
                .value_name("JWT_TOKEN")
                .help("JWT authentication token")
                .required(true),
        )
        .arg(
            Arg::new("with-demo-strains")
                .long("with-demo-strains")
                .help("Also create a few strains and assign them to free tanks")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let base_url = matches
        .get_one::<String>("url")
        .cloned()
        .unwrap_or_default();
    let jwt_token = matches
        .get_one::<String>("token")
        .cloned()
        .unwrap_or_default();

    println!("{}", style("Zebrafish Facility Seeder v1.0").bold());
    println!("{}", style("━".repeat(40)).dim());
    println!("API URL: {}", style(&base_url).cyan());

    let seeder = FacilitySeeder::new(&base_url, jwt_token)?;
    let tanks = seeder.create_tanks().await?;
    let strains = if matches.get_flag("with-demo-strains") {
        seeder.create_demo_strains().await?
    } else {
        0
    };

    println!("{}", style("━".repeat(40)).dim());
    println!(
        "{} tanks and {} strains created",
        style(tanks).bold().green(),
        style(strains).bold().green()
    );
    Ok(())
}
