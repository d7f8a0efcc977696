// src/main.rs

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::error::Error;

// Request/response types
#[derive(Debug, Serialize)]
struct PunchRequest<'a> {
    momento: &'a str,
}

#[derive(Debug, Deserialize)]
struct HealthResponse {
    status: String,
}

#[derive(Debug, Deserialize)]
struct WorkdayEntry {
    dia: String,
    pontos: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MonthlyReport {
    mes: String,
    horas_devidas: String,
    horas_trabalhadas: String,
    horas_excedentes: String,
    expedientes: Vec<WorkdayEntry>,
}

const DAY: &str = "2023-11-29";
const MONTH: &str = "2023-11";

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let base_url =
        std::env::var("PONTO_BASE_URL").unwrap_or_else(|_| "http://localhost:3000".to_string());
    let client = Client::new();

    // Test 1: Health check
    println!("\n🔍 Testing health check endpoint...");
    let health_response = client
        .get(format!("{}/health", base_url))
        .send()
        .await?
        .json::<HealthResponse>()
        .await?;
    println!("Health check status: {}", health_response.status);

    // Test 2: A full working day
    println!("\n🔍 Recording four punches for {}...", DAY);
    for hour in ["08:00:00", "12:00:00", "13:00:00", "17:00:00"] {
        let momento = format!("{}T{}", DAY, hour);
        let response = client
            .post(format!("{}/batidas", base_url))
            .json(&PunchRequest { momento: &momento })
            .send()
            .await?;

        match response.status() {
            StatusCode::CREATED => {
                let entry = response.json::<WorkdayEntry>().await?;
                println!("  {} -> {} now has {:?}", momento, entry.dia, entry.pontos);
            }
            status => {
                // A re-run against the same store hits the duplicate/limit rules.
                println!("  {} rejected ({}): {}", momento, status, response.text().await?);
            }
        }
    }

    // Test 3: Rejections
    println!("\n🔍 Testing rejected punches...");
    for body in [
        serde_json::json!({}),
        serde_json::json!({ "momento": "mdasdasdas" }),
        serde_json::json!({ "momento": "2023-12-02T08:00:00" }),
    ] {
        let response = client
            .post(format!("{}/batidas", base_url))
            .json(&body)
            .send()
            .await?;
        println!(
            "  {} -> {} {}",
            body,
            response.status(),
            response.text().await?
        );
    }

    // Test 4: Monthly report
    println!("\n🔍 Fetching report for {}...", MONTH);
    let response = client
        .get(format!("{}/folhas-de-ponto/{}", base_url, MONTH))
        .send()
        .await?;

    if response.status().is_success() {
        let report = response.json::<MonthlyReport>().await?;
        println!("Month: {}", report.mes);
        println!("  Worked:   {}", report.horas_trabalhadas);
        println!("  Owed:     {}", report.horas_devidas);
        println!("  Exceeded: {}", report.horas_excedentes);
        for entry in &report.expedientes {
            println!("  {} {:?}", entry.dia, entry.pontos);
        }
    } else {
        println!(
            "Failed to get report ({}): {}",
            response.status(),
            response.text().await?
        );
    }

    println!("\n✅ Testing complete!");

    Ok(())
}
