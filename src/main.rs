use clap::Parser;
use kubesage::{
    analyzer::CancelToken,
    cli::{Cli, Commands},
    config, handle_analyze, handle_filters,
};
use log::warn;
use std::io::Write;
use std::process;

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

async fn run() -> kubesage::Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    cli.init_logging();

    // kube's rustls transport needs a process-wide crypto provider
    let _ = rustls::crypto::ring::default_provider().install_default();

    let config = config::load_config(cli.config.as_deref())?;

    let output = match cli.command {
        Commands::Analyze(args) => {
            let cancel = CancelToken::new();
            let on_interrupt = cancel.clone();
            tokio::spawn(async move {
                if tokio::signal::ctrl_c().await.is_ok() {
                    warn!("Interrupted, waiting for running analyzers to finish");
                    on_interrupt.cancel();
                }
            });
            handle_analyze(args, &config, cancel).await?
        }
        Commands::Filters { command } => handle_filters(command, cli.config.as_deref())?,
    };

    let mut stdout = std::io::stdout().lock();
    stdout.write_all(output.as_bytes())?;
    if !output.ends_with('\n') {
        writeln!(stdout)?;
    }
    Ok(())
}
