use std::sync::Arc;

use anyhow::Context;
use image_agent::{
    agent::types::{Agent, RunOptions},
    config::Config,
    session::Session,
};
use tokio::io::BufReader;
use tracing_subscriber::EnvFilter;

const SYSTEM_PROMPT: &str = "You are a helpful assistant that finds, describes and shows images. \
Use the tools to look up weather, search the web, search Flickr, describe pictures and open an image gallery.";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let config = Config::from_env().context("cannot start without configuration")?;
    let mut agent = Agent::from_config("image-agent", &config).context("cannot build agent")?;
    if agent.system_prompt.is_none() {
        agent.set_system_prompt(SYSTEM_PROMPT);
    }

    let mut session = Session::new(Arc::new(agent), RunOptions::from(&config.agent), std::io::stdout());
    session.run(BufReader::new(tokio::io::stdin())).await?;
    Ok(())
}
