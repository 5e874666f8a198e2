use flowgate::config::RunnerConfig;
use flowgate::error::RunnerError;
use rootcause::prelude::{Report, ResultExt};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> ExitCode {
    match try_main().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("{report}");
            ExitCode::FAILURE
        }
    }
}

async fn try_main() -> Result<(), Report<RunnerError>> {
    let config = RunnerConfig::from_env().context(RunnerError::Config)?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| config.log_filter.as_str().into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let mut args = std::env::args_os().skip(1);
    let (Some(workflow_path), Some(trigger_path), None) = (args.next(), args.next(), args.next())
    else {
        return Err(RunnerError::Usage.into());
    };
    let (workflow_path, trigger_path) = (PathBuf::from(workflow_path), PathBuf::from(trigger_path));

    tracing::info!(workflow = %workflow_path.display(), trigger = %trigger_path.display(), "starting run");
    let result = flowgate::run(&config, &workflow_path, &trigger_path).await?;

    let json = serde_json::to_string_pretty(&result).context(RunnerError::Execution)?;
    println!("{json}");
    Ok(())
}
