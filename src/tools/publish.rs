//! Simulated social media publishing tools.
//!
//! None of these reach a real network. Each logs the payload and returns a
//! confirmation for the model to read.

use async_trait::async_trait;
use serde_json::{json, Value};

use super::{content_arg, Tool, INSTAGRAM_TOOL, LINKEDIN_TOOL, TWEET_TOOL};

/// Characters of a tweet echoed back in the confirmation.
const TWEET_PREVIEW_CHARS: usize = 30;

fn content_schema(description: &str) -> Value {
    json!({
        "type": "object",
        "properties": {
            "contenido": {
                "type": "string",
                "description": description
            }
        },
        "required": ["contenido"]
    })
}

/// Publish a single tweet.
pub struct SubirTweet;

#[async_trait]
impl Tool for SubirTweet {
    fn name(&self) -> &str {
        TWEET_TOOL
    }

    fn description(&self) -> &str {
        "Publica un único tweet en la plataforma X (anteriormente Twitter). Debe ser llamado por cada tweet individualmente en un hilo."
    }

    fn parameters_schema(&self) -> Value {
        content_schema("El texto del tweet a publicar. Debe ser conciso y directo.")
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let contenido = content_arg(&args)?;
        tracing::info!(tool = TWEET_TOOL, "Tweet published (simulated): {}", contenido);

        let preview: String = contenido.chars().take(TWEET_PREVIEW_CHARS).collect();
        Ok(format!(
            "El tweet que comienza con '{}...' fue publicado exitosamente.",
            preview
        ))
    }
}

/// Publish a professional LinkedIn post.
pub struct SubirPostLinkedin;

#[async_trait]
impl Tool for SubirPostLinkedin {
    fn name(&self) -> &str {
        LINKEDIN_TOOL
    }

    fn description(&self) -> &str {
        "Publica un post de formato profesional en la plataforma LinkedIn."
    }

    fn parameters_schema(&self) -> Value {
        content_schema(
            "El texto del post para LinkedIn. Debe tener un tono profesional y estar bien estructurado.",
        )
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let contenido = content_arg(&args)?;
        tracing::info!(tool = LINKEDIN_TOOL, "LinkedIn post published (simulated):\n{}", contenido);
        Ok("Post de LinkedIn publicado exitosamente.".to_string())
    }
}

/// Publish an Instagram caption.
pub struct SubirPublicacionInstagram;

#[async_trait]
impl Tool for SubirPublicacionInstagram {
    fn name(&self) -> &str {
        INSTAGRAM_TOOL
    }

    fn description(&self) -> &str {
        "Publica una descripción para una foto o video en Instagram."
    }

    fn parameters_schema(&self) -> Value {
        content_schema(
            "La descripción para la publicación de Instagram. Debe ser atractiva, usar emojis y hashtags relevantes.",
        )
    }

    async fn execute(&self, args: Value) -> anyhow::Result<String> {
        let contenido = content_arg(&args)?;
        tracing::info!(
            tool = INSTAGRAM_TOOL,
            "Instagram caption published (simulated):\n{}",
            contenido
        );
        Ok("Publicación de Instagram realizada exitosamente.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn tweet_confirmation_previews_first_thirty_chars() {
        let text = "¡Corre más lejos con EcoRun! Zapatillas hechas con materiales reciclados.";
        let reply = SubirTweet
            .execute(json!({ "contenido": text }))
            .await
            .unwrap();
        let preview: String = text.chars().take(30).collect();
        assert_eq!(
            reply,
            format!("El tweet que comienza con '{}...' fue publicado exitosamente.", preview)
        );
    }

    #[tokio::test]
    async fn short_tweet_is_echoed_whole() {
        let reply = SubirTweet.execute(json!({ "contenido": "Hola" })).await.unwrap();
        assert_eq!(reply, "El tweet que comienza con 'Hola...' fue publicado exitosamente.");
    }

    #[tokio::test]
    async fn missing_content_is_an_error() {
        assert!(SubirPostLinkedin.execute(json!({})).await.is_err());
        assert!(SubirPublicacionInstagram
            .execute(json!({ "contenido": 42 }))
            .await
            .is_err());
    }

    #[tokio::test]
    async fn linkedin_and_instagram_confirm() {
        assert_eq!(
            SubirPostLinkedin.execute(json!({ "contenido": "post" })).await.unwrap(),
            "Post de LinkedIn publicado exitosamente."
        );
        assert_eq!(
            SubirPublicacionInstagram
                .execute(json!({ "contenido": "caption #eco" }))
                .await
                .unwrap(),
            "Publicación de Instagram realizada exitosamente."
        );
    }
}
