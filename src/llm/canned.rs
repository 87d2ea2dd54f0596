use super::*;
use rand::seq::IndexedRandom;

/// Answers handed out when no real provider is configured
const CANNED_ANSWERS: &[&str] = &[
    "Na minha experiência, o ideal é focar em automação de processos repetitivos. \
     Isso pode aumentar a produtividade em até 30% nos primeiros 6 meses. \
     Recomendo começar mapeando as tarefas que consomem mais tempo e implementar \
     ferramentas específicas para cada uma.",
    "Acredito que investir em capacitação da equipe traz retorno significativo. \
     Estudos mostram que empresas que destinam pelo menos 5% do orçamento para \
     treinamento veem um aumento de 20% no engajamento. É fundamental criar uma \
     cultura de aprendizado contínuo.",
    "Uma abordagem prática seria implementar metodologias ágeis. Cerca de 70% das \
     empresas que adotaram Scrum reportaram melhoria na entrega de projetos. O \
     segredo está em adaptar o framework à realidade da sua equipe, sem seguir \
     regras rígidas.",
];

/// Offline provider that answers every prompt with a random canned text
#[derive(Debug, Default)]
pub struct CannedProvider;

impl CannedProvider {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl LlmProvider for CannedProvider {
    async fn generate(&self, _request: GenerateRequest) -> LlmResult<GenerateResponse> {
        let text = CANNED_ANSWERS
            .choose(&mut rand::rng())
            .copied()
            .unwrap_or_default();

        Ok(GenerateResponse {
            text: text.to_string(),
            metadata: ResponseMetadata {
                provider: "canned".to_string(),
                model: "canned".to_string(),
                tokens_used: None,
                latency_ms: 0,
            },
        })
    }

    fn name(&self) -> &str {
        "canned"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_canned_answer_is_from_the_list() {
        let provider = CannedProvider::new();
        let request = LlmConfig::default().request("qualquer coisa".into());

        let response = provider.generate(request).await.unwrap();

        assert!(CANNED_ANSWERS.contains(&response.text.as_str()));
        assert_eq!(response.metadata.provider, "canned");
    }
}
