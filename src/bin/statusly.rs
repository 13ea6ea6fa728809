use clap::Parser;
use statusly::cli::{self, Cli};
use statusly::context::StandardContext;
use std::process::ExitCode;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    let ctx = StandardContext::new(cli.root.clone());
    statusly::logging::init(&ctx, cli.verbose);

    let env = |name: &str| std::env::var(name).ok();
    let mut stdout = std::io::stdout();

    match cli::run(cli, &ctx, &env, &mut stdout).await {
        Ok(outcome) => outcome.into(),
        Err(e) => {
            log::debug!("command failed: {:?}", e);
            eprintln!("❌ {:#}", e);
            ExitCode::FAILURE
        }
    }
}
