use std::path::PathBuf;

use clap::Parser;
use sb_tool::{assert_case, discover_cases};

#[derive(Debug, Parser)]
#[command(name = "sb-tool")]
#[command(about = "Runs sprite behavior demo test cases")]
struct Cli {
    /// Directory searched for `testcase.json` files.
    #[arg(default_value = "demos")]
    root: PathBuf,
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let cases = discover_cases(&cli.root);
    if cases.is_empty() {
        println!("RESULT:ERROR");
        println!("ERROR_MSG:no testcase.json under {}", cli.root.display());
        std::process::exit(1);
    }

    let mut failed = 0usize;
    for demo_dir in &cases {
        match assert_case(demo_dir, &demo_dir.join("testcase.json")) {
            Ok(report) => println!("PASS:{}|ticks={}", demo_dir.display(), report.ticks),
            Err(error) => {
                failed += 1;
                println!("FAIL:{}|{}", demo_dir.display(), error);
            }
        }
    }

    println!("SUMMARY:{} passed, {} failed", cases.len() - failed, failed);
    if failed > 0 {
        println!("RESULT:ERROR");
        std::process::exit(1);
    }
    println!("RESULT:OK");
}
