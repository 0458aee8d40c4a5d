// src/main.rs

use dagrun::{cli, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();

    match run(args).await {
        Ok(Some(report)) if !report.is_success() => std::process::exit(1),
        Ok(_) => {}
        Err(err) => {
            eprintln!("dagrun error: {err:?}");
            std::process::exit(2);
        }
    }
}
