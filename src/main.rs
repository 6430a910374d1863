// src/main.rs

use mqttwatch::{cli, logging, run};

#[tokio::main]
async fn main() {
    let args = cli::parse();
    if let Err(err) = logging::init_logging(args.log_level) {
        eprintln!("mqttwatch: {err:?}");
    }

    if let Err(err) = run(args).await {
        eprintln!("mqttwatch error: {err}");
        std::process::exit(err.exit_code());
    }
}
