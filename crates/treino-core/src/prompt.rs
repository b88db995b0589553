//! Prompt construction for plan generation.
//!
//! Pure logic: the same [`TrainingProfile`] always yields the same prompt
//! text. No I/O happens here.

use crate::model::{GenerationRequest, OutputShape};
use crate::profile::TrainingProfile;

// ---------------------------------------------------------------------------
// Fixed instruction blocks
// ---------------------------------------------------------------------------

/// Role and tone constraints.
const ROLE_AND_TONE: &str = "Você é um personal trainer experiente, especialista em montar \
rotinas de treino personalizadas. Com base nas informações do usuário abaixo, crie um plano \
de treino detalhado. Seja respeitoso e profissional: não use palavrões, conteúdo sexual, \
assédio ou qualquer outra linguagem imprópria.\n";

/// The output-shape contract, as an example object.
const OUTPUT_CONTRACT: &str = r#"Responda ESTRITAMENTE com um único objeto JSON no formato abaixo, sem nenhum texto antes ou depois:

{
    "plano_markdown": "string com o plano de treino completo formatado em markdown",
    "avisos_importantes": [
        "string com o aviso 1",
        "string com o aviso 2, se houver"
    ],
    "sugestoes_adicionais": "string com sugestões gerais sobre progressão, nutrição e descanso"
}
"#;

/// Content rules for the `plano_markdown` field.
const PLAN_BODY_RULES: &str = r#"Regras para o conteúdo de "plano_markdown":
1. Deve ser uma única string com o plano de treino completo.
2. Use apenas este subconjunto de markdown: títulos (## Título), **negrito**, *itálico* e listas (- item).
3. Inclua a distribuição semanal dos treinos (ex: Segunda, Quarta, Sexta).
4. Para cada dia de treino: aquecimento, lista de exercícios (com séries, repetições e descanso) e desaquecimento/alongamento.
5. Adapte os exercícios às restrições físicas e aos equipamentos disponíveis.
6. Respeite a especificação do treino informada pelo usuário (ex: adaptação para jogadores de basquete).
7. Mantenha a resposta respeitosa, sem qualquer forma de linguagem inadequada.
"#;

// ---------------------------------------------------------------------------
// Builder
// ---------------------------------------------------------------------------

/// Placeholder used for an absent optional field.
const NULL_PLACEHOLDER: &str = "null";

/// Build the full generation request for a validated profile.
///
/// All five profile fields are embedded verbatim; an absent `restricoes`
/// appears as `null` and an absent `especificacao` as an empty value.
pub fn build_prompt(profile: &TrainingProfile) -> GenerationRequest {
    GenerationRequest {
        prompt: build_prompt_text(profile),
        shape: OutputShape::plan_record(),
    }
}

fn build_prompt_text(profile: &TrainingProfile) -> String {
    let mut prompt = String::with_capacity(2048);

    prompt.push_str(ROLE_AND_TONE);
    prompt.push('\n');
    prompt.push_str(OUTPUT_CONTRACT);
    prompt.push('\n');

    prompt.push_str("Informações do usuário:\n");
    prompt.push_str(&format!("- Objetivo: {}\n", profile.objetivo));
    prompt.push_str(&format!("- Nível de experiência: {}\n", profile.nivel));
    prompt.push_str(&format!(
        "- Acesso a equipamentos: {}\n",
        profile.acesso_equipamentos
    ));
    prompt.push_str(&format!(
        "- Restrições físicas: {}\n",
        profile.restricoes.as_deref().unwrap_or(NULL_PLACEHOLDER)
    ));
    prompt.push_str(&format!(
        "- Especificação do treino (pedido específico do usuário, como \"adaptação para \
         jogadores de basquete\"): {}\n",
        profile.especificacao
    ));
    prompt.push('\n');

    prompt.push_str(PLAN_BODY_RULES);

    prompt
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile() -> TrainingProfile {
        TrainingProfile {
            objetivo: "hipertrofia".to_string(),
            nivel: "iniciante".to_string(),
            acesso_equipamentos: "casa, apenas halteres".to_string(),
            restricoes: None,
            especificacao: String::new(),
        }
    }

    #[test]
    fn prompt_embeds_all_fields() {
        let mut p = profile();
        p.restricoes = Some("dor no joelho esquerdo".to_string());
        p.especificacao = "adaptação para basquete".to_string();
        let req = build_prompt(&p);

        assert!(req.prompt.contains("- Objetivo: hipertrofia\n"));
        assert!(req.prompt.contains("- Nível de experiência: iniciante\n"));
        assert!(req.prompt.contains("- Acesso a equipamentos: casa, apenas halteres\n"));
        assert!(req.prompt.contains("- Restrições físicas: dor no joelho esquerdo\n"));
        assert!(req.prompt.contains("): adaptação para basquete\n"));
    }

    #[test]
    fn absent_optional_fields_use_placeholders() {
        let req = build_prompt(&profile());
        assert!(req.prompt.contains("- Restrições físicas: null\n"));
        assert!(req.prompt.contains("basquete\"): \n"));
    }

    #[test]
    fn prompt_is_deterministic() {
        assert_eq!(build_prompt(&profile()), build_prompt(&profile()));
    }

    #[test]
    fn prompt_names_the_three_output_fields() {
        let req = build_prompt(&profile());
        for field in ["plano_markdown", "avisos_importantes", "sugestoes_adicionais"] {
            assert!(req.prompt.contains(field), "prompt should mention {field}");
        }
        assert_eq!(req.shape, OutputShape::plan_record());
    }

    #[test]
    fn prompt_carries_content_and_tone_rules() {
        let req = build_prompt(&profile());
        assert!(req.prompt.contains("aquecimento"));
        assert!(req.prompt.contains("séries, repetições e descanso"));
        assert!(req.prompt.contains("alongamento"));
        assert!(req.prompt.contains("distribuição semanal"));
        assert!(req.prompt.contains("palavrões"));
        assert!(req.prompt.contains("**negrito**"));
    }

    #[test]
    fn field_values_are_not_escaped_or_trimmed() {
        let mut p = profile();
        p.objetivo = "  força {máxima} ".to_string();
        let req = build_prompt(&p);
        assert!(req.prompt.contains("- Objetivo:   força {máxima} \n"));
    }
}
