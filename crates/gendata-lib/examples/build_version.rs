use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;

use gendata_lib::{build_generated_data, BuildSpec, ProgressReporter};

struct ConsoleReporter;

impl ProgressReporter for ConsoleReporter {
    fn start_step(&self, name: &str, total_steps: Option<u32>) {
        println!("[STEP START] {} (total: {:?})", name, total_steps);
    }

    fn update_bytes(&self, transferred: u64, total: Option<u64>) {
        if let Some(t) = total {
            println!("[BYTES] {}/{}", transferred, t);
        } else {
            println!("[BYTES] {}", transferred);
        }
    }

    fn set_percent(&self, percent: i32) {
        println!("[PROGRESS] {}%", percent);
    }

    fn set_message(&self, message: &str) {
        println!("[MSG] {}", message);
    }

    fn set_step_count(&self, current: u32, total: Option<u32>) {
        println!("[STEP COUNT] {}/{:?}", current, total);
    }

    fn done(&self, success: bool, message: Option<&str>) {
        println!("[DONE] success={} message={:?}", success, message);
    }
}

// Usage: build_version [version|release|snapshot] [output dir]
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let mut spec = BuildSpec::new(args.next().unwrap_or_else(|| "release".to_string()));
    spec.output_path = args.next().map(PathBuf::from);
    spec.zip = true;

    match build_generated_data(spec, Arc::new(ConsoleReporter)).await {
        Ok(output) => println!("Generated data written to {}", output.display()),
        Err(e) => {
            println!("Build failed: {:?}", e);
            std::process::exit(1);
        }
    }

    Ok(())
}
