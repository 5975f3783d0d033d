//! Prompt templates for the campaign agent.

use crate::tools::{INSTAGRAM_TOOL, LINKEDIN_TOOL, TWEET_TOOL};

/// Persona and the authorized tool names.
pub fn build_system_prompt() -> String {
    format!(
        "Eres un experto Community Manager. Tu tarea es generar y publicar una campaña \
completa en redes sociales usando las herramientas disponibles. Debes seguir \
las instrucciones del usuario al pie de la letra, usando las herramientas \
`{TWEET_TOOL}`, `{LINKEDIN_TOOL}` y `{INSTAGRAM_TOOL}`."
    )
}

/// Concrete product/audience plus the four mandatory steps.
pub fn build_user_prompt(producto: &str, publico: &str) -> String {
    format!(
        r#"Genera y publica una campaña completa para el siguiente caso:
- Producto: {producto}
- Público Objetivo: {publico}

Sigue estos pasos OBLIGATORIAMENTE:
1. Genera un hilo de TRES tweets creativos y atractivos. Llama a la herramienta `{TWEET_TOOL}` UNA VEZ POR CADA TWEET. Deben ser tres llamadas separadas.
2. Genera UN post profesional y bien estructurado para LinkedIn. Llama a la herramienta `{LINKEDIN_TOOL}` para publicarlo.
3. Genera UNA descripción llamativa para Instagram, incluyendo emojis relevantes y al menos 3 hashtags. Llama a la herramienta `{INSTAGRAM_TOOL}` para publicarla.
4. Al finalizar todas las publicaciones, responde con un resumen de lo que hiciste, sin llamar a ninguna herramienta más."#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn system_prompt_names_every_tool() {
        let prompt = build_system_prompt();
        for tool in crate::tools::CAMPAIGN_TOOLS {
            assert!(prompt.contains(tool), "missing {tool}");
        }
    }

    #[test]
    fn user_prompt_embeds_product_and_audience() {
        let prompt = build_user_prompt("Zapatillas EcoRun", "corredores urbanos 25-40 anos");
        assert!(prompt.contains("- Producto: Zapatillas EcoRun"));
        assert!(prompt.contains("- Público Objetivo: corredores urbanos 25-40 anos"));
        assert!(prompt.contains("4. Al finalizar"));
    }
}
