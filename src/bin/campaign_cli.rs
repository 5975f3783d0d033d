//! Campaign CLI - run a single campaign from the terminal.
//!
//! Uses the same configuration as the API server, without the campaign store.

use anyhow::Context;
use campaign_agent::{agent::CampaignAgent, config::Config};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader, Lines, Stdin};

async fn prompt(lines: &mut Lines<BufReader<Stdin>>, question: &str) -> anyhow::Result<String> {
    let mut stdout = tokio::io::stdout();
    stdout.write_all(question.as_bytes()).await?;
    stdout.flush().await?;

    let line = lines
        .next_line()
        .await?
        .context("stdin closed before an answer was given")?;
    Ok(line.trim().to_string())
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    campaign_agent::init_tracing();

    let config = Config::from_env()?;
    let agent = CampaignAgent::from_config(&config);

    println!("Asistente de Campañas para Redes Sociales");
    println!("-----------------------------------------");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    let producto = prompt(&mut lines, "Nombre del producto: ").await?;
    let publico = prompt(&mut lines, "Público objetivo: ").await?;

    println!("\nGenerando la campaña...\n");
    let result = agent
        .generate_campaign(&producto, &publico)
        .await
        .map_err(|e| {
            tracing::error!("Campaign run failed: {}", e);
            e
        })?;

    println!("Campaña completada.");
    println!("Tweets generados:");
    for (idx, tweet) in result.tweets.iter().enumerate() {
        println!("  {}. {}", idx + 1, tweet);
    }
    if let Some(post) = &result.linkedin_post {
        println!("\nPost de LinkedIn:\n{}", post);
    }
    if let Some(caption) = &result.instagram_post {
        println!("\nDescripción de Instagram:\n{}", caption);
    }
    if let Some(resumen) = result.resumen.as_deref().filter(|r| !r.is_empty()) {
        println!("\nResumen del agente:\n{}", resumen);
    }

    Ok(())
}
