//! # Bistro Counter Terminal Entry Point
//!
//! ```text
//! $ bistro cart add 1
//! $ bistro checkout
//! Order placed successfully!
//!
//! Order #ORD-001
//! Total: ₹250
//! Date: 05/03/2026, 18:00:00
//! ```
//!
//! The setup lives in lib.rs so it can be tested.

use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    bistro_cli::init_tracing();

    let args: Vec<String> = std::env::args().skip(1).collect();
    match bistro_cli::run(&args).await {
        Ok(output) => {
            println!("{}", output);
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}
