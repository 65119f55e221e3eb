use anyhow::Result;
use tokio::sync::oneshot;

use gcp_pricing_automation::utils::{init_log_file, pipe_to_file};
use gcp_pricing_automation::{logger, App, BatchTrigger, Config};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Configuration first, it decides the log level
    let config = Config::from_env();

    let log_stream = logger::init(config.verbose_logging);
    init_log_file(&config.output_log_file)?;

    // Mirror every event into the run log
    let (stop_pipe, shutdown) = oneshot::channel();
    let pipe = log_stream.map(|stream| {
        tokio::spawn(pipe_to_file(
            stream.subscribe(),
            config.output_log_file.clone(),
            shutdown,
        ))
    });

    let trigger = BatchTrigger::from_env();
    let outcome = match App::initialize(config) {
        Ok(app) => app.run(&trigger).await.map(|_| ()),
        Err(e) => Err(e),
    };

    if let Err(e) = &outcome {
        tracing::error!("❌ Run failed: {:#}", e);
    }

    let _ = stop_pipe.send(());
    if let Some(pipe) = pipe {
        if let Ok(Err(e)) = pipe.await {
            eprintln!("run log incomplete: {}", e);
        }
    }

    outcome
}
